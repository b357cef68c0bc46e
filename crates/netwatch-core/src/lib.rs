//! Core types for the netwatch capture-to-event pipeline.
//!
//! This crate provides the data model, error taxonomy, and static lookup
//! tables shared by the capture/parsing layer (`netwatch-net`) and the
//! entity/event dispatcher (`netwatch-dispatch`). It has no networking or
//! capture-backend dependency of its own.
//!
//! # Modules
//!
//! - [`error`]: per-boundary error kinds (capture, reassembly, decode)
//! - [`device`]: capture device identity and default-selection rule
//! - [`entity`]: entity UUID classification
//! - [`attrs`]: attribute blob kinds and their decoding
//! - [`damage`]: damage/heal event shape and element labels
//! - [`profession`]: player profession id -> name table
//! - [`stats`]: observability counters
//! - [`config`]: pipeline configuration knobs

pub mod attrs;
pub mod config;
pub mod damage;
pub mod device;
pub mod entity;
pub mod error;
pub mod profession;
pub mod stats;

pub use error::{Error, Result};
