//! Live link-layer packet capture, wrapping the `pcap` crate.

use std::net::IpAddr;

use netwatch_core::device::{Device, DeviceList};
use pcap::{Active, Capture, Device as PcapDevice};
use thiserror::Error;
use tracing::{info, warn};

const SNAPLEN: i32 = 65535;
const MIN_BUFFER_BYTES: i32 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no capture backend available: {0}")]
    BackendMissing(String),
    #[error("capture device unavailable")]
    DeviceUnavailable,
    #[error("capture device invalid: {0}")]
    DeviceInvalid(String),
}

impl From<pcap::Error> for CaptureError {
    fn from(e: pcap::Error) -> Self {
        CaptureError::BackendMissing(e.to_string())
    }
}

/// Enumerate available capture devices via the platform's pcap backend.
pub fn list_devices() -> Result<DeviceList, CaptureError> {
    let devices = PcapDevice::list().map_err(|e| CaptureError::BackendMissing(e.to_string()))?;
    let mapped = devices
        .into_iter()
        .enumerate()
        .map(|(index, d)| Device {
            index,
            name: d.name,
            description: d.desc,
            addresses: d
                .addresses
                .iter()
                .map(|a| a.addr)
                .collect::<Vec<IpAddr>>(),
            is_loopback: d.flags.is_loopback(),
        })
        .collect();
    Ok(DeviceList::new(mapped))
}

/// An open, promiscuous capture handle on one device. Switching devices
/// means building a new `CaptureSource` and discarding all flow state in
/// the caller.
pub struct CaptureSource {
    device_name: String,
    capture: Capture<Active>,
}

impl CaptureSource {
    /// Open `device` in promiscuous mode with a `tcp` BPF filter and a
    /// buffer of at least 10MiB.
    pub fn open(device: &Device) -> Result<Self, CaptureError> {
        let pcap_device = PcapDevice::list()
            .map_err(|e| CaptureError::BackendMissing(e.to_string()))?
            .into_iter()
            .find(|d| d.name == device.name)
            .ok_or(CaptureError::DeviceUnavailable)?;

        let mut capture = Capture::from_device(pcap_device)
            .map_err(|e| CaptureError::DeviceInvalid(e.to_string()))?
            .promisc(true)
            .snaplen(SNAPLEN)
            .buffer_size(MIN_BUFFER_BYTES)
            .immediate_mode(true)
            .open()
            .map_err(|e| CaptureError::DeviceInvalid(e.to_string()))?;

        capture
            .filter("tcp", true)
            .map_err(|e| CaptureError::DeviceInvalid(e.to_string()))?;

        info!(device = %device.name, "capture device opened");

        Ok(Self {
            device_name: device.name.clone(),
            capture,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Block for the next captured link-layer frame. Returns `None` when
    /// the underlying capture handle is exhausted (e.g. reading from a
    /// savefile); a live device capture never returns `None` under normal
    /// operation.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        match self.capture.next_packet() {
            Ok(packet) => Some(packet.data.to_vec()),
            Err(pcap::Error::NoMorePackets) => None,
            Err(e) => {
                warn!(error = %e, device = %self.device_name, "capture read error, skipping frame");
                Some(Vec::new())
            }
        }
    }
}
