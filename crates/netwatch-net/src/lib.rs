//! Networking and framing primitives for the netwatch capture pipeline.
//!
//! This crate provides:
//! - Link-layer capture device management ([`capture`])
//! - Ethernet/IPv4/TCP flow demultiplexing ([`flow`])
//! - Per-flow stream reassembly into length-delimited frames ([`reassembler`])
//! - The two-tier outer framing grammar, with bounded container recursion
//!   ([`outer_frame`])
//! - Zstandard block decompression ([`codec`])
//! - Notify envelope routing by service-id/method-id ([`router`])
//! - Schema-based message decoding ([`schema`])
//! - The nested attribute blob encoding ([`attr_blob`])
//! - The opportunistic movement-decode fallback ([`movement`])

pub mod attr_blob;
pub mod capture;
pub mod codec;
pub mod flow;
pub mod movement;
pub mod outer_frame;
pub mod reassembler;
pub mod router;
pub mod schema;

pub use capture::{CaptureError, CaptureSource};
pub use flow::FlowKey;
pub use outer_frame::{MessageType, OuterFrame};
pub use reassembler::Reassembler;
