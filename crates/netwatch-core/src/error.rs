//! Error taxonomy for the capture pipeline.
//!
//! Each boundary in the pipeline gets its own variant set so callers can
//! match on what actually happened without stringly-typed errors. None of
//! these are fatal to the capture loop except the `CaptureSource`
//! variants, which are surfaced to the operator at device-open time.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type. Only the `Capture*` variants can end a capture
/// session; everything else is recoverable per-frame and is
/// normally consumed via [`crate::stats::PipelineStats`] rather than
/// propagated.
#[derive(Debug, Error)]
pub enum Error {
    /// The platform capture backend (libpcap or equivalent) is not
    /// installed or could not be loaded.
    #[error("capture backend not available: {0}")]
    CaptureBackendMissing(String),

    /// No capture devices were found during enumeration.
    #[error("no capture devices available")]
    DeviceUnavailable,

    /// The requested device index or name does not exist.
    #[error("invalid capture device: {0}")]
    DeviceInvalid(String),

    /// A frame's declared size exceeded `max_frame_bytes`.
    #[error("frame oversize: {size} bytes exceeds cap of {max}")]
    FrameOversize { size: u32, max: u32 },

    /// A frame's declared size was below the minimum possible outer frame
    /// (6 bytes: u32 size + u16 type_and_flags).
    #[error("frame too short: declared size {0} bytes")]
    FrameTooShort(u32),

    /// Zstandard decompression of a frame body failed.
    #[error("decompression failed: {0}")]
    DecompressionFailure(String),

    /// The schema decoder could not make sense of a message body.
    #[error("schema decode failed for method 0x{method_id:08x}: {reason}")]
    SchemaDecodeFailure { method_id: u32, reason: String },

    /// A single attribute's `attr_data` could not be decoded. Siblings in
    /// the same attribute blob are unaffected.
    #[error("attribute decode failed for attr_id 0x{attr_id:x}: {reason}")]
    AttributeDecodeFailure { attr_id: u64, reason: String },

    /// An entity UUID's low 16 bits did not match any known classification.
    #[error("classification unknown for low16=0x{0:04x}")]
    ClassificationUnknown(u16),
}
