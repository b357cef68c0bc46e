//! Wires capture through reassembly, framing, routing, and schema decode
//! into the entity dispatcher, on a single synchronous producer thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use netwatch_core::config::PipelineConfig;
use netwatch_core::device::{Device, DeviceList};
use netwatch_core::stats::PipelineStats;
use netwatch_dispatch::sink::Sink;
use netwatch_dispatch::EntityDispatcher;
use netwatch_net::capture::{self, CaptureError, CaptureSource};
use netwatch_net::outer_frame;
use netwatch_net::reassembler::Reassembler;
use netwatch_net::router::{self, Method};
use netwatch_net::{flow, movement, schema};
use thiserror::Error;
use tracing::{debug, info, warn};

const IDLE_REAP_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("capture device error: {0}")]
    Capture(#[from] CaptureError),
    #[error("no suitable capture device found")]
    NoDeviceSelected,
}

/// Resolve which device to open: an explicit index if given, otherwise the
/// first non-loopback device with an IPv4 address.
pub fn resolve_device(
    devices: &DeviceList,
    selected_device: Option<usize>,
) -> Result<&Device, PipelineError> {
    match selected_device {
        Some(index) => devices.get(index).ok_or(PipelineError::NoDeviceSelected),
        None => devices.default_device().ok_or(PipelineError::NoDeviceSelected),
    }
}

/// Run the capture-to-dispatch loop against `device` until `running` is
/// cleared. Blocks the calling thread; the binary spawns this on a plain
/// `std::thread` and uses `running` as the only cross-thread signal.
pub fn run(
    device: &Device,
    config: &PipelineConfig,
    sink: &mut dyn Sink,
    stats: &Arc<PipelineStats>,
    running: &Arc<AtomicBool>,
) -> Result<(), PipelineError> {
    let mut capture = CaptureSource::open(device)?;
    let mut reassembler = Reassembler::new(config);
    let mut dispatcher = EntityDispatcher::new();
    let no_override = |_: &str| -> Option<String> { None };
    let mut last_reap = Instant::now();

    info!(device = capture.device_name(), "pipeline started");

    while running.load(Ordering::Relaxed) {
        let Some(link_frame) = capture.next_frame() else {
            break;
        };
        if link_frame.is_empty() {
            continue;
        }
        stats.bytes_captured(link_frame.len() as u64);

        let Some(demuxed) = flow::demux(&link_frame) else {
            continue;
        };
        let key = demuxed.key;
        let payload = demuxed.payload;

        for frame in reassembler.push(key, payload, stats) {
            process_frame(frame, config, &mut dispatcher, sink, stats, &no_override);
        }

        if last_reap.elapsed() >= IDLE_REAP_INTERVAL {
            reassembler.reap_idle(stats);
            last_reap = Instant::now();
        }
    }

    info!(device = capture.device_name(), "pipeline stopped");
    Ok(())
}

fn process_frame(
    frame: Bytes,
    config: &PipelineConfig,
    dispatcher: &mut EntityDispatcher,
    sink: &mut dyn Sink,
    stats: &PipelineStats,
    monster_name_overrides: &dyn Fn(&str) -> Option<String>,
) {
    let Some(outer) = outer_frame::parse(frame, config.max_envelope_nesting, stats) else {
        return;
    };

    let body = match outer_frame::decompress_notify_body(&outer.body, outer.compressed) {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "notify body decompression failed");
            stats.decompression_failures();
            return;
        }
    };

    let Some(routed) = router::route(body) else {
        return;
    };

    dispatch_routed(routed.method, routed.body, dispatcher, sink, stats, monster_name_overrides);
}

fn dispatch_routed(
    method: Method,
    body: Bytes,
    dispatcher: &mut EntityDispatcher,
    sink: &mut dyn Sink,
    stats: &PipelineStats,
    monster_name_overrides: &dyn Fn(&str) -> Option<String>,
) {
    match method {
        Method::SyncNearEntities => match schema::decode_sync_near_entities(body) {
            Ok(msg) => dispatcher.handle_sync_near_entities(&msg, sink, stats, monster_name_overrides),
            Err(e) => log_schema_failure("SyncNearEntities", e, stats),
        },
        Method::SyncContainerData | Method::SyncContainerDirtyData => {
            match schema::decode_sync_container(body) {
                Ok(msg) => dispatcher.handle_sync_container(&msg, sink, stats, monster_name_overrides),
                Err(e) => log_schema_failure("SyncContainer", e, stats),
            }
        }
        Method::SyncServerTime => match schema::decode_sync_server_time(body) {
            Ok(msg) => dispatcher.handle_sync_server_time(&msg, sink, stats, monster_name_overrides),
            Err(e) => log_schema_failure("SyncServerTime", e, stats),
        },
        Method::SyncNearDeltaInfo => match schema::decode_sync_near_delta_info(body) {
            Ok(msg) => dispatcher.handle_sync_near_delta_info(&msg, sink, stats, monster_name_overrides),
            Err(e) => log_schema_failure("SyncNearDeltaInfo", e, stats),
        },
        Method::SyncToMeDeltaInfo => match schema::decode_sync_to_me_delta_info(body) {
            Ok(msg) => dispatcher.handle_sync_to_me_delta_info(&msg, sink, stats, monster_name_overrides),
            Err(e) => log_schema_failure("SyncToMeDeltaInfo", e, stats),
        },
        Method::Unrecognized(_) => {
            if let Some((_uuid, position)) = movement::decode_position(&body) {
                dispatcher.handle_position(&position, sink);
            }
        }
    }
}

fn log_schema_failure(label: &str, error: schema::SchemaError, stats: &PipelineStats) {
    warn!(method = label, error = %error, "schema decode failed, dropping frame");
    stats.schema_decode_failures();
}

/// List capture devices, for the `--list-devices` CLI path.
pub fn list_devices() -> Result<DeviceList, CaptureError> {
    capture::list_devices()
}
