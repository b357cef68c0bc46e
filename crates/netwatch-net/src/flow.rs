//! Ethernet/IPv4/TCP demultiplexing.
//!
//! Hand-rolled fixed-offset parsing: payload length is always
//! `ip.totallen - ip.hdrlen - tcp.hdrlen`, so there is nothing a general
//! packet-parsing crate buys here that a direct field read doesn't
//! already give.

use std::net::Ipv4Addr;

const ETHERTYPE_IPV4: u16 = 0x0800;
const IPPROTO_TCP: u8 = 6;
const ETHERNET_HEADER_LEN: usize = 14;

/// The directed 4-tuple identifying one TCP flow.
/// Each direction of a connection is a distinct flow - this type does not
/// normalize (src, dst) ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub src_ip: Ipv4Addr,
    pub src_port: u16,
    pub dst_ip: Ipv4Addr,
    pub dst_port: u16,
}

/// One demultiplexed TCP payload, ready for the reassembler.
#[derive(Debug)]
pub struct FlowPayload<'a> {
    pub key: FlowKey,
    pub payload: &'a [u8],
}

/// Parse one captured Ethernet-II frame down to its TCP payload. Returns
/// `None` for anything that isn't a well-formed IPv4-over-Ethernet TCP
/// segment with a positive-length payload - these are
/// silent drops, not errors, so this returns `Option` rather than
/// `Result`.
pub fn demux(link_frame: &[u8]) -> Option<FlowPayload<'_>> {
    if link_frame.len() < ETHERNET_HEADER_LEN {
        return None;
    }
    let ethertype = u16::from_be_bytes([link_frame[12], link_frame[13]]);
    if ethertype != ETHERTYPE_IPV4 {
        return None;
    }

    let ip = &link_frame[ETHERNET_HEADER_LEN..];
    if ip.len() < 20 {
        return None;
    }

    let version_ihl = ip[0];
    let version = version_ihl >> 4;
    if version != 4 {
        return None;
    }
    let ip_hdr_len = (version_ihl & 0x0f) as usize * 4;
    if ip_hdr_len < 20 || ip.len() < ip_hdr_len {
        return None;
    }

    let protocol = ip[9];
    if protocol != IPPROTO_TCP {
        return None;
    }

    let total_len = u16::from_be_bytes([ip[2], ip[3]]) as usize;
    let src_ip = Ipv4Addr::new(ip[12], ip[13], ip[14], ip[15]);
    let dst_ip = Ipv4Addr::new(ip[16], ip[17], ip[18], ip[19]);

    if ip.len() < total_len {
        // Captured fewer bytes than the IP header claims; don't read past
        // what we actually have.
        return None;
    }

    let tcp = &ip[ip_hdr_len..];
    if tcp.len() < 20 {
        return None;
    }
    let src_port = u16::from_be_bytes([tcp[0], tcp[1]]);
    let dst_port = u16::from_be_bytes([tcp[2], tcp[3]]);
    let tcp_hdr_len = ((tcp[12] >> 4) as usize) * 4;
    if tcp_hdr_len < 20 {
        return None;
    }

    // payload length = ip.totallen - ip.hdrlen - tcp.hdrlen, starting at
    // tcp.offset + tcp.hdrlen.
    let payload_len = total_len
        .checked_sub(ip_hdr_len)
        .and_then(|v| v.checked_sub(tcp_hdr_len));
    let payload_len = match payload_len {
        Some(n) if n > 0 => n,
        _ => return None,
    };

    if tcp.len() < tcp_hdr_len + payload_len {
        return None;
    }
    let payload = &tcp[tcp_hdr_len..tcp_hdr_len + payload_len];

    Some(FlowPayload {
        key: FlowKey {
            src_ip,
            src_port,
            dst_ip,
            dst_port,
        },
        payload,
    })
}
