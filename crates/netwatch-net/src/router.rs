//! Notify envelope routing by service-id / method-id.

use bytes::{Buf, Bytes};
use tracing::trace;

/// The only service id this pipeline cares about. Kept as a constant
/// rather than a config knob.
pub const INTERESTING_SERVICE_ID: u64 = 0x0000000063335342;

/// The header fields read from the front of every Notify body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotifyHeader {
    pub service_id: u64,
    pub stub_id: u32,
    pub method_id: u32,
}

/// The schema a method-id maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    SyncNearEntities,
    SyncContainerData,
    SyncContainerDirtyData,
    SyncServerTime,
    SyncNearDeltaInfo,
    SyncToMeDeltaInfo,
    /// Any method id not in the table; handled by the opportunistic
    /// movement decoder.
    Unrecognized(u32),
}

impl Method {
    pub fn from_method_id(method_id: u32) -> Self {
        match method_id {
            0x00000006 => Method::SyncNearEntities,
            0x00000015 => Method::SyncContainerData,
            0x00000016 => Method::SyncContainerDirtyData,
            0x0000002b => Method::SyncServerTime,
            0x0000002d => Method::SyncNearDeltaInfo,
            0x0000002e => Method::SyncToMeDeltaInfo,
            other => Method::Unrecognized(other),
        }
    }
}

/// A Notify envelope whose service id matched [`INTERESTING_SERVICE_ID`],
/// with its header parsed out and its schema body remaining.
#[derive(Debug)]
pub struct RoutedNotify {
    pub header: NotifyHeader,
    pub method: Method,
    pub body: Bytes,
}

/// Read the Notify header and, if `service_id` matches, resolve the
/// method and return the remaining schema-encoded body. Any other
/// service id is a silent drop.
pub fn route(mut notify_body: Bytes) -> Option<RoutedNotify> {
    if notify_body.len() < 16 {
        return None;
    }
    let service_id = notify_body.get_u64();
    let stub_id = notify_body.get_u32();
    let method_id = notify_body.get_u32();

    if service_id != INTERESTING_SERVICE_ID {
        trace!(service_id, "discarding notify for uninteresting service");
        return None;
    }

    Some(RoutedNotify {
        header: NotifyHeader {
            service_id,
            stub_id,
            method_id,
        },
        method: Method::from_method_id(method_id),
        body: notify_body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(service_id: u64, stub_id: u32, method_id: u32, rest: &[u8]) -> Bytes {
        let mut out = service_id.to_be_bytes().to_vec();
        out.extend_from_slice(&stub_id.to_be_bytes());
        out.extend_from_slice(&method_id.to_be_bytes());
        out.extend_from_slice(rest);
        Bytes::from(out)
    }

    #[test]
    fn routes_interesting_service() {
        let body = build(INTERESTING_SERVICE_ID, 7, 0x2d, b"payload");
        let routed = route(body).expect("should route");
        assert_eq!(routed.header.stub_id, 7);
        assert_eq!(routed.method, Method::SyncNearDeltaInfo);
        assert_eq!(routed.body.as_ref(), b"payload");
    }

    #[test]
    fn drops_other_service_ids() {
        let body = build(1, 7, 0x2d, b"payload");
        assert!(route(body).is_none());
    }

    #[test]
    fn unrecognized_method_falls_through() {
        let body = build(INTERESTING_SERVICE_ID, 0, 0xffffffff, b"");
        let routed = route(body).expect("should route");
        assert_eq!(routed.method, Method::Unrecognized(0xffffffff));
    }

    #[test]
    fn too_short_is_dropped() {
        assert!(route(Bytes::from_static(b"short")).is_none());
    }
}
