//! The two-tier outer framing grammar.

use bytes::{Buf, Bytes};
use netwatch_core::error::Error;
use netwatch_core::stats::PipelineStats;
use tracing::{debug, trace};

use crate::codec;

/// Message type, low 15 bits of `type_and_flags`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    None,
    Call,
    Notify,
    Return,
    Echo,
    FrameUp,
    FrameDown,
    /// Any value not in the above set.
    Other(u16),
}

impl MessageType {
    fn from_u16(v: u16) -> Self {
        match v {
            0 => MessageType::None,
            1 => MessageType::Call,
            2 => MessageType::Notify,
            3 => MessageType::Return,
            4 => MessageType::Echo,
            5 => MessageType::FrameUp,
            6 => MessageType::FrameDown,
            other => MessageType::Other(other),
        }
    }

    /// Whether this type's body is itself exactly one nested outer frame
    /// to be unwrapped recursively.
    fn is_container(self) -> bool {
        matches!(
            self,
            MessageType::Call | MessageType::Echo | MessageType::FrameUp | MessageType::FrameDown
        )
    }
}

/// A decoded outer frame: its message type, compression flag, and the raw
/// body bytes that follow the envelope header (not yet decompressed).
#[derive(Debug)]
pub struct OuterFrame {
    pub message_type: MessageType,
    pub compressed: bool,
    pub body: Bytes,
}

/// Parse one complete frame (as sliced by the [`crate::reassembler::Reassembler`])
/// into its envelope plus body, unwrapping bounded container nesting
/// and applying decompression along the way.
///
/// Returns `None` when the frame should be silently dropped (reserved
/// `Return` type, unknown type, or decompression/parse failure at any
/// nesting level) - these are not propagated as errors.
pub fn parse(mut frame: Bytes, max_nesting: u8, stats: &PipelineStats) -> Option<OuterFrame> {
    let mut depth = 0u8;
    loop {
        if frame.len() < 6 {
            return None;
        }
        // `size` was already validated by the reassembler; skip it here.
        frame.advance(4);
        let type_and_flags = frame.get_u16();
        let compressed = type_and_flags & 0x8000 != 0;
        let message_type = MessageType::from_u16(type_and_flags & 0x7fff);

        match message_type {
            MessageType::Notify => {
                return Some(OuterFrame {
                    message_type,
                    compressed,
                    body: frame,
                });
            }
            MessageType::Return => {
                trace!("Return envelope acknowledged, not decoded");
                return None;
            }
            other if other.is_container() => {
                depth += 1;
                if depth > max_nesting {
                    debug!(depth, "container envelope nesting exceeded bound, dropping");
                    return None;
                }
                let nested = if compressed {
                    match codec::decompress(&frame) {
                        Ok(bytes) => Bytes::from(bytes),
                        Err(e) => {
                            debug!(error = %e, "nested envelope decompression failed");
                            stats.decompression_failures();
                            return None;
                        }
                    }
                } else {
                    frame
                };
                frame = nested;
                continue;
            }
            MessageType::Other(code) => {
                trace!(code, "unknown outer frame type, dropping");
                return None;
            }
            MessageType::None => {
                trace!("None envelope type, dropping");
                return None;
            }
            // Call/Echo/FrameUp/FrameDown are always containers and were
            // handled by the guard above.
            MessageType::Call | MessageType::Echo | MessageType::FrameUp | MessageType::FrameDown => {
                unreachable!("container types are always caught by the is_container guard")
            }
        }
    }
}

/// Decompress a Notify body if the envelope's compression bit was set.
/// Returns `Err` on failure so the caller can drop just this frame.
pub fn decompress_notify_body(body: &[u8], compressed: bool) -> Result<Bytes, Error> {
    if !compressed {
        return Ok(Bytes::copy_from_slice(body));
    }
    codec::decompress(body)
        .map(Bytes::from)
        .map_err(|e| Error::DecompressionFailure(e.to_string()))
}
