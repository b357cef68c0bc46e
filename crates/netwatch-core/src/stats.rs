//! Observability counters.
//!
//! Per-frame errors must never propagate to the sink, but they still need
//! to be counted for observability. `PipelineStats` is a set of atomic
//! counters any thread may increment and any thread may snapshot; it
//! mirrors the `ServerStats` snapshot-struct pattern used elsewhere in
//! this codebase's daemon binaries.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, safe to share behind an `Arc` and poll from outside the
/// capture thread.
#[derive(Debug, Default)]
pub struct PipelineStats {
    frames_parsed: AtomicU64,
    frames_resynced: AtomicU64,
    frame_oversize: AtomicU64,
    frame_too_short: AtomicU64,
    bytes_captured: AtomicU64,
    flows_reaped_idle: AtomicU64,
    flows_reaped_oversize: AtomicU64,
    decompression_failures: AtomicU64,
    schema_decode_failures: AtomicU64,
    attribute_decode_failures: AtomicU64,
    classification_unknown: AtomicU64,
    unexpected_type_flag_bits: AtomicU64,
}

/// Plain, cheap-to-copy point-in-time view of [`PipelineStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames_parsed: u64,
    pub frames_resynced: u64,
    pub frame_oversize: u64,
    pub frame_too_short: u64,
    pub bytes_captured: u64,
    pub flows_reaped_idle: u64,
    pub flows_reaped_oversize: u64,
    pub decompression_failures: u64,
    pub schema_decode_failures: u64,
    pub attribute_decode_failures: u64,
    pub classification_unknown: u64,
    pub unexpected_type_flag_bits: u64,
}

macro_rules! counter_methods {
    ($($field:ident),* $(,)?) => {
        $(
            pub fn $field(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
            }
        )*
    };
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    counter_methods!(
        frames_parsed,
        frames_resynced,
        frame_oversize,
        frame_too_short,
        flows_reaped_idle,
        flows_reaped_oversize,
        decompression_failures,
        schema_decode_failures,
        attribute_decode_failures,
        classification_unknown,
        unexpected_type_flag_bits,
    );

    pub fn bytes_captured(&self, n: u64) {
        self.bytes_captured.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_parsed: self.frames_parsed.load(Ordering::Relaxed),
            frames_resynced: self.frames_resynced.load(Ordering::Relaxed),
            frame_oversize: self.frame_oversize.load(Ordering::Relaxed),
            frame_too_short: self.frame_too_short.load(Ordering::Relaxed),
            bytes_captured: self.bytes_captured.load(Ordering::Relaxed),
            flows_reaped_idle: self.flows_reaped_idle.load(Ordering::Relaxed),
            flows_reaped_oversize: self.flows_reaped_oversize.load(Ordering::Relaxed),
            decompression_failures: self.decompression_failures.load(Ordering::Relaxed),
            schema_decode_failures: self.schema_decode_failures.load(Ordering::Relaxed),
            attribute_decode_failures: self.attribute_decode_failures.load(Ordering::Relaxed),
            classification_unknown: self.classification_unknown.load(Ordering::Relaxed),
            unexpected_type_flag_bits: self.unexpected_type_flag_bits.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = PipelineStats::new();
        stats.frames_parsed();
        stats.frames_parsed();
        stats.frames_resynced();
        stats.frame_oversize();
        stats.frame_too_short();
        stats.frame_too_short();
        stats.bytes_captured(128);

        let snap = stats.snapshot();
        assert_eq!(snap.frames_parsed, 2);
        assert_eq!(snap.frames_resynced, 1);
        assert_eq!(snap.frame_oversize, 1);
        assert_eq!(snap.frame_too_short, 2);
        assert_eq!(snap.bytes_captured, 128);
        assert_eq!(snap.schema_decode_failures, 0);
    }
}
