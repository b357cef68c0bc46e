//! Capture device identity.

use std::net::IpAddr;

/// A single link-layer capture device as reported by the platform's
/// enumeration call. `index` is only stable within one [`DeviceList`]
/// snapshot — re-enumerating may renumber devices if the OS adds or
/// removes interfaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Device {
    /// Stable index within this enumeration snapshot.
    pub index: usize,
    /// OS-level identifier used to open the device (e.g. `eth0`, `\Device\NPF_{...}`).
    pub name: String,
    /// Human-readable description, if the platform provides one.
    pub description: Option<String>,
    /// Addresses bound to this interface.
    pub addresses: Vec<IpAddr>,
    /// Whether the platform marks this as a loopback interface.
    pub is_loopback: bool,
}

/// An enumeration snapshot. Indices are stable only within the same
/// `DeviceList`.
#[derive(Clone, Debug, Default)]
pub struct DeviceList {
    pub devices: Vec<Device>,
}

impl DeviceList {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    pub fn get(&self, index: usize) -> Option<&Device> {
        self.devices.iter().find(|d| d.index == index)
    }

    pub fn by_name(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Default device selection rule: the first device with
    /// an IPv4 address that is not marked loopback.
    pub fn default_device(&self) -> Option<&Device> {
        self.devices.iter().find(|d| {
            !d.is_loopback && d.addresses.iter().any(|a| a.is_ipv4())
        })
    }
}
