//! netwatchd - promiscuous capture, reassembly, and combat-event dispatch

mod config;
mod logging_sink;
mod pipeline;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use config::Config;
use logging_sink::LoggingSink;
use netwatch_core::stats::PipelineStats;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("netwatchd=info".parse().unwrap()))
        .init();

    let config = Config::parse();
    if let Err(e) = config.validate() {
        error!("invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    info!(
        "netwatchd v{} - passive capture and combat-event dispatch daemon",
        env!("CARGO_PKG_VERSION")
    );

    if config.list_devices {
        return list_devices_and_exit();
    }

    let devices = match pipeline::list_devices() {
        Ok(devices) => devices,
        Err(e) => {
            error!("device enumeration failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    let device = match pipeline::resolve_device(&devices, config.selected_device) {
        Ok(device) => device.clone(),
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let stats = Arc::new(PipelineStats::new());
    let running = Arc::new(AtomicBool::new(true));

    {
        let running = running.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("received shutdown signal");
            running.store(false, Ordering::Relaxed);
        });
    }

    if config.stats_interval_secs > 0 {
        let stats = stats.clone();
        let interval = Duration::from_secs(config.stats_interval_secs);
        let running = running.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                info!(stats = ?stats.snapshot(), "pipeline stats");
            }
        });
    }

    let pipeline_config = config.pipeline_config();
    let handle = {
        let stats = stats.clone();
        let running = running.clone();
        std::thread::spawn(move || {
            let mut sink = LoggingSink;
            pipeline::run(&device, &pipeline_config, &mut sink, &stats, &running)
        })
    };

    match handle.join() {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            error!("pipeline error: {e}");
            ExitCode::FAILURE
        }
        Err(_) => {
            error!("capture thread panicked");
            ExitCode::FAILURE
        }
    }
}

fn list_devices_and_exit() -> ExitCode {
    match pipeline::list_devices() {
        Ok(devices) => {
            for device in &devices.devices {
                println!(
                    "{:>3}  {:<16} {}",
                    device.index,
                    device.name,
                    device.description.as_deref().unwrap_or("")
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("device enumeration failed: {e}");
            ExitCode::FAILURE
        }
    }
}
