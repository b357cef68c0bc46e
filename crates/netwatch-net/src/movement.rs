//! Opportunistic position decoding for movement-shaped Notify bodies that
//! fall outside the recognized method table.
//!
//! Movement updates are high-frequency and loosely structured; rather than
//! add them to the method table and treat a shape mismatch as an error,
//! this is a best-effort decoder the router can try on
//! `Method::Unrecognized` bodies. A failure here is never logged above
//! trace level - it just means the body wasn't a movement update.

use bytes::{Buf, Bytes};

/// A decoded position/orientation sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub dir: f32,
    pub move_version: u32,
}

/// Try to decode a `NewMove`/`UserControlInfo`-shaped body: uuid (u64 BE),
/// then X/Y/Z/Dir as big-endian f32, then a move_version (u32 BE). Returns
/// `None` if the body is too short - this is opportunistic, not a schema
/// decode failure worth reporting.
pub fn decode_position(body: &Bytes) -> Option<(u64, Position)> {
    let mut buf = body.clone();
    if buf.remaining() < 8 + 4 * 4 + 4 {
        return None;
    }
    let uuid = buf.get_u64();
    let x = buf.get_f32();
    let y = buf.get_f32();
    let z = buf.get_f32();
    let dir = buf.get_f32();
    let move_version = buf.get_u32();

    Some((
        uuid,
        Position {
            x,
            y,
            z,
            dir,
            move_version,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(uuid: u64, x: f32, y: f32, z: f32, dir: f32, move_version: u32) -> Bytes {
        let mut out = uuid.to_be_bytes().to_vec();
        out.extend_from_slice(&x.to_be_bytes());
        out.extend_from_slice(&y.to_be_bytes());
        out.extend_from_slice(&z.to_be_bytes());
        out.extend_from_slice(&dir.to_be_bytes());
        out.extend_from_slice(&move_version.to_be_bytes());
        Bytes::from(out)
    }

    #[test]
    fn decodes_a_well_formed_position_update() {
        let body = build((1u64 << 16) | 1, 1.0, 2.0, 3.0, 0.5, 42);
        let (uuid, pos) = decode_position(&body).expect("should decode");
        assert_eq!(uuid, (1u64 << 16) | 1);
        assert_eq!(pos.x, 1.0);
        assert_eq!(pos.move_version, 42);
    }

    #[test]
    fn too_short_is_none_not_a_panic() {
        let body = Bytes::from_static(&[1, 2, 3]);
        assert!(decode_position(&body).is_none());
    }
}
