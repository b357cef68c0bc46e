//! Pipeline configuration knobs.

/// Runtime knobs for the capture/reassembly pipeline. This is the
/// in-process configuration consumed by `netwatch-net`; the binary's CLI
/// (`netwatchd::config::Config`) is parsed into this shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Safety cap for the reassembler. Default 2 MiB.
    pub max_frame_bytes: u32,
    /// Per-flow buffer cap. Default 4 MiB.
    pub max_flow_buffer_bytes: usize,
    /// Recursion bound for nested container envelopes.
    /// Default 4.
    pub max_envelope_nesting: u8,
    /// Idle duration before an untouched flow buffer is reaped.
    /// Default 120s.
    pub flow_idle_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: 2 * 1024 * 1024,
            max_flow_buffer_bytes: 4 * 1024 * 1024,
            max_envelope_nesting: 4,
            flow_idle_timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.max_frame_bytes, 2 * 1024 * 1024);
        assert_eq!(cfg.max_flow_buffer_bytes, 4 * 1024 * 1024);
        assert_eq!(cfg.max_envelope_nesting, 4);
        assert_eq!(cfg.flow_idle_timeout_secs, 120);
    }
}
