//! Attribute blob decoding: turning a `RawAttr`'s opaque bytes into a typed
//! value once the attribute id's encoding is known.

use bytes::{Buf, Bytes};
use netwatch_core::attrs::{AttrEncoding, AttrKind, AttrValue};
use netwatch_core::error::Error;

use crate::schema::RawAttr;

/// Decode one attribute's payload according to the encoding its id
/// implies. An unrecognized attr_id or malformed payload is reported as
/// an error scoped to this single attribute - the caller is expected to
/// skip it and keep processing the rest of the entity's attributes.
pub fn decode(attr: &RawAttr) -> Result<AttrValue, Error> {
    let kind = AttrKind::from_attr_id(attr.attr_id).ok_or_else(|| Error::AttributeDecodeFailure {
        attr_id: attr.attr_id,
        reason: "unrecognized attribute id".to_string(),
    })?;

    match kind.encoding() {
        AttrEncoding::String => decode_string(&attr.attr_data).map(AttrValue::Text).map_err(|reason| {
            Error::AttributeDecodeFailure {
                attr_id: attr.attr_id,
                reason,
            }
        }),
        AttrEncoding::NumericU32Be => decode_numeric(&attr.attr_data).map(AttrValue::Number).map_err(|reason| {
            Error::AttributeDecodeFailure {
                attr_id: attr.attr_id,
                reason,
            }
        }),
    }
}

/// String layout: 4-byte LE length, 4 reserved bytes, UTF-8 payload, 4
/// trailing reserved bytes.
fn decode_string(data: &[u8]) -> Result<String, String> {
    let mut buf = Bytes::copy_from_slice(data);
    if buf.remaining() < 8 {
        return Err("too short for string header".to_string());
    }
    let len = buf.get_u32_le() as usize;
    buf.advance(4); // reserved
    if buf.remaining() < len + 4 {
        return Err("declared length exceeds available bytes".to_string());
    }
    let text_bytes = buf.copy_to_bytes(len);
    String::from_utf8(text_bytes.to_vec()).map_err(|e| e.to_string())
}

/// Numeric layout: a plain big-endian u32.
fn decode_numeric(data: &[u8]) -> Result<u32, String> {
    let mut buf = Bytes::copy_from_slice(data);
    if buf.remaining() < 4 {
        return Err("too short for numeric attribute".to_string());
    }
    Ok(buf.get_u32())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_attr_bytes(text: &str) -> Vec<u8> {
        let mut out = (text.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(text.as_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out
    }

    #[test]
    fn decodes_a_name_attribute() {
        let raw = RawAttr {
            attr_id: 0x01,
            attr_data: Bytes::from(string_attr_bytes("Alice")),
        };
        let value = decode(&raw).unwrap();
        assert_eq!(value, AttrValue::Text("Alice".to_string()));
    }

    #[test]
    fn decodes_a_numeric_attribute() {
        let raw = RawAttr {
            attr_id: 0x2c2e,
            attr_data: Bytes::copy_from_slice(&777u32.to_be_bytes()),
        };
        let value = decode(&raw).unwrap();
        assert_eq!(value, AttrValue::Number(777));
    }

    #[test]
    fn unrecognized_attr_id_is_an_isolated_error() {
        let raw = RawAttr {
            attr_id: 0xdead_beef,
            attr_data: Bytes::new(),
        };
        assert!(decode(&raw).is_err());
    }

    #[test]
    fn truncated_string_payload_is_an_error() {
        let raw = RawAttr {
            attr_id: 0x01,
            attr_data: Bytes::from_static(&[1, 0, 0, 0]),
        };
        assert!(decode(&raw).is_err());
    }
}
