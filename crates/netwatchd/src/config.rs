//! Configuration for netwatchd

use clap::Parser;
use netwatch_core::config::PipelineConfig;

/// netwatchd - passive capture and combat-event dispatch daemon
#[derive(Parser, Debug, Clone)]
#[command(name = "netwatchd")]
#[command(about = "Promiscuous capture -> reassembly -> schema decode -> entity dispatch")]
pub struct Config {
    /// Capture device index (from `--list-devices`). If unset, the first
    /// non-loopback device with an IPv4 address is used.
    #[arg(long)]
    pub selected_device: Option<usize>,

    /// List capture devices and exit.
    #[arg(long)]
    pub list_devices: bool,

    /// Safety cap on a single reassembled outer frame, in bytes.
    #[arg(long, default_value = "2097152")]
    pub max_frame_bytes: u32,

    /// Per-flow reassembly buffer cap, in bytes.
    #[arg(long, default_value = "4194304")]
    pub max_flow_buffer_bytes: usize,

    /// Recursion bound for nested container envelopes.
    #[arg(long, default_value = "4")]
    pub max_envelope_nesting: u8,

    /// Idle duration, in seconds, before an untouched flow buffer is reaped.
    #[arg(long, default_value = "120")]
    pub flow_idle_timeout_secs: u64,

    /// Interval, in seconds, between periodic stats log lines. 0 disables.
    #[arg(long, default_value = "60")]
    pub stats_interval_secs: u64,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_envelope_nesting == 0 {
            anyhow::bail!("max-envelope-nesting must be at least 1");
        }
        if self.max_frame_bytes < 6 {
            anyhow::bail!("max-frame-bytes must be at least 6 (the minimum outer frame size)");
        }
        if (self.max_flow_buffer_bytes as u64) < self.max_frame_bytes as u64 {
            anyhow::bail!(
                "max-flow-buffer-bytes ({}) must be at least max-frame-bytes ({}), \
                 or every frame at the cap gets reaped before it can be reassembled",
                self.max_flow_buffer_bytes,
                self.max_frame_bytes
            );
        }
        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_frame_bytes: self.max_frame_bytes,
            max_flow_buffer_bytes: self.max_flow_buffer_bytes,
            max_envelope_nesting: self.max_envelope_nesting,
            flow_idle_timeout_secs: self.flow_idle_timeout_secs,
        }
    }
}
