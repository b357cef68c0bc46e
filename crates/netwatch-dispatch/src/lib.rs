//! Entity classification and combat-event dispatch.
//!
//! Bridges decoded schema records ([`netwatch_net::schema`]) to an
//! injected [`sink::Sink`] collaborator. UI rendering and cross-entity
//! aggregation are the sink's concern, not this crate's.

pub mod dispatcher;
pub mod recording_sink;
pub mod sink;

pub use dispatcher::EntityDispatcher;
pub use sink::{LocalPosition, NewEnemy, Sink};
