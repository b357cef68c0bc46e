//! Schema-based message decoding.
//!
//! The wire schema language these messages use is never fully pinned
//! down; this module implements a minimal tag/length-delimited reader
//! that tolerates unknown fields by skipping them and surfaces missing
//! required fields as a decode error scoped to the current frame, then
//! layers the concrete message shapes on top of that reader.

use bytes::{Buf, Bytes};
use std::fmt;

/// A schema decode failure, scoped to the current frame. Never propagates past the frame that produced
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    Truncated,
    MissingField(&'static str),
    Malformed(&'static str),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Truncated => write!(f, "truncated message"),
            SchemaError::MissingField(name) => write!(f, "missing required field: {name}"),
            SchemaError::Malformed(what) => write!(f, "malformed {what}"),
        }
    }
}

impl std::error::Error for SchemaError {}

type Result<T> = std::result::Result<T, SchemaError>;

/// One field's decoded wire value. The wire type is implied by which
/// variant this is - readers match on the variant they expect for a given
/// field number and treat a mismatch as malformed.
#[derive(Debug, Clone)]
enum WireValue {
    Varint(u64),
    Fixed64(u64),
    LengthDelimited(Bytes),
}

/// Read a ULEB128 varint from the front of `buf`.
fn read_varint(buf: &mut Bytes) -> Result<u64> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    loop {
        if !buf.has_remaining() {
            return Err(SchemaError::Truncated);
        }
        if shift >= 64 {
            return Err(SchemaError::Malformed("varint"));
        }
        let byte = buf.get_u8();
        result |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    Ok(result)
}

/// Cursor over a length-delimited message body, yielding `(field_number,
/// value)` pairs. Unknown field numbers are simply never matched by a
/// caller's `match`, which satisfies "tolerate unknown fields by skipping
/// them" - there is nothing to explicitly skip since every value is fully
/// consumed from the buffer as it's read.
struct FieldReader {
    buf: Bytes,
}

/// Wire type tag, encoded in the low 2 bits of the field tag.
const WIRE_VARINT: u64 = 0;
const WIRE_FIXED64: u64 = 1;
const WIRE_LENGTH_DELIMITED: u64 = 2;

impl FieldReader {
    fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    fn next(&mut self) -> Result<Option<(u32, WireValue)>> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        let tag = read_varint(&mut self.buf)?;
        let field_number = (tag >> 3) as u32;
        let wire_type = tag & 0x7;

        let value = match wire_type {
            WIRE_VARINT => WireValue::Varint(read_varint(&mut self.buf)?),
            WIRE_FIXED64 => {
                if self.buf.remaining() < 8 {
                    return Err(SchemaError::Truncated);
                }
                WireValue::Fixed64(self.buf.get_u64())
            }
            WIRE_LENGTH_DELIMITED => {
                let len = read_varint(&mut self.buf)? as usize;
                if self.buf.remaining() < len {
                    return Err(SchemaError::Truncated);
                }
                WireValue::LengthDelimited(self.buf.split_to(len))
            }
            _ => return Err(SchemaError::Malformed("wire type")),
        };

        Ok(Some((field_number, value)))
    }
}

fn as_varint(v: WireValue) -> Result<u64> {
    match v {
        WireValue::Varint(n) => Ok(n),
        _ => Err(SchemaError::Malformed("expected varint field")),
    }
}

fn as_fixed64(v: WireValue) -> Result<i64> {
    match v {
        WireValue::Fixed64(n) => Ok(n as i64),
        _ => Err(SchemaError::Malformed("expected fixed64 field")),
    }
}

fn as_bytes(v: WireValue) -> Result<Bytes> {
    match v {
        WireValue::LengthDelimited(b) => Ok(b),
        _ => Err(SchemaError::Malformed("expected length-delimited field")),
    }
}

/// One raw `{ attr_id, attr_data }` pair, still undecoded - decoding
/// `attr_data` happens in
/// [`crate::attr_blob`], which needs to know the attr_id first to choose
/// string vs. numeric decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttr {
    pub attr_id: u64,
    pub attr_data: Bytes,
}

fn decode_attrs(body: Bytes) -> Result<Vec<RawAttr>> {
    let mut reader = FieldReader::new(body);
    let mut attrs = Vec::new();
    while let Some((field, value)) = reader.next()? {
        match field {
            1 => {
                let entry = as_bytes(value)?;
                attrs.push(decode_one_attr(entry)?);
            }
            _ => { /* unknown field, ignored */ }
        }
    }
    Ok(attrs)
}

fn decode_one_attr(body: Bytes) -> Result<RawAttr> {
    let mut reader = FieldReader::new(body);
    let mut attr_id = None;
    let mut attr_data = None;
    while let Some((field, value)) = reader.next()? {
        match field {
            1 => attr_id = Some(as_varint(value)?),
            2 => attr_data = Some(as_bytes(value)?),
            _ => {}
        }
    }
    Ok(RawAttr {
        attr_id: attr_id.ok_or(SchemaError::MissingField("attr_id"))?,
        attr_data: attr_data.unwrap_or_default(),
    })
}

/// One entity's `{ Uuid, Attrs.Attrs[] }`. `CharBaseData`/`MonsterBaseData` carry
/// no fields this pipeline consumes - classification is derived from the
/// uuid itself, not from these schema-level type tags - so
/// they are not modeled as separate Rust fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub uuid: u64,
    pub attrs: Vec<RawAttr>,
}

fn decode_entity_record(body: Bytes) -> Result<EntityRecord> {
    let mut reader = FieldReader::new(body);
    let mut uuid = None;
    let mut attrs = Vec::new();
    while let Some((field, value)) = reader.next()? {
        match field {
            1 => uuid = Some(as_varint(value)?),
            2 => attrs = decode_attrs(as_bytes(value)?)?,
            _ => {}
        }
    }
    Ok(EntityRecord {
        uuid: uuid.ok_or(SchemaError::MissingField("uuid"))?,
        attrs,
    })
}

/// `SyncNearEntities` (method 0x00000006): bulk entity registration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncNearEntities {
    pub entities: Vec<EntityRecord>,
}

pub fn decode_sync_near_entities(body: Bytes) -> Result<SyncNearEntities> {
    let mut reader = FieldReader::new(body);
    let mut msg = SyncNearEntities::default();
    while let Some((field, value)) = reader.next()? {
        if field == 1 {
            msg.entities.push(decode_entity_record(as_bytes(value)?)?);
        }
    }
    Ok(msg)
}

/// `SyncContainerData` / `SyncContainerDirtyData` (methods 0x15, 0x16):
/// single-entity snapshot / patch. Identical wire shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContainer {
    pub entity: EntityRecord,
}

pub fn decode_sync_container(body: Bytes) -> Result<SyncContainer> {
    let mut reader = FieldReader::new(body);
    let mut entity = None;
    while let Some((field, value)) = reader.next()? {
        if field == 1 {
            entity = Some(decode_entity_record(as_bytes(value)?)?);
        }
    }
    Ok(SyncContainer {
        entity: entity.ok_or(SchemaError::MissingField("entity"))?,
    })
}

/// `Type` field values distinguishing damage from healing.
pub const TYPE_CODE_DAMAGE: u32 = 0;
pub const TYPE_CODE_HEAL: u32 = 1;

/// A decoded damage/heal record before domain interpretation. `value` and
/// `lucky_value` are `None` when the corresponding field was absent from
/// the wire rather than present with a null payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDamageEvent {
    pub owner_id: u64,
    pub attacker_uuid: u64,
    pub top_summoner_id: u64,
    pub value: Option<i64>,
    pub lucky_value: Option<i64>,
    pub type_flag: u32,
    pub type_code: u32,
    pub is_miss: bool,
    pub is_dead: bool,
    pub hp_lessen_value: i64,
    pub property: u32,
    pub damage_source: u32,
}

fn decode_damage_event(body: Bytes) -> Result<RawDamageEvent> {
    let mut reader = FieldReader::new(body);
    let mut owner_id = 0u64;
    let mut attacker_uuid = None;
    let mut top_summoner_id = 0u64;
    let mut value = None;
    let mut lucky_value = None;
    let mut type_flag = 0u32;
    let mut type_code = 0u32;
    let mut is_miss = false;
    let mut is_dead = false;
    let mut hp_lessen_value = 0i64;
    let mut property = 0u32;
    let mut damage_source = 0u32;

    while let Some((field, value_wire)) = reader.next()? {
        match field {
            1 => owner_id = as_varint(value_wire)?,
            2 => attacker_uuid = Some(as_varint(value_wire)?),
            3 => top_summoner_id = as_varint(value_wire)?,
            4 => value = Some(as_fixed64(value_wire)?),
            5 => lucky_value = Some(as_fixed64(value_wire)?),
            6 => type_flag = as_varint(value_wire)? as u32,
            7 => type_code = as_varint(value_wire)? as u32,
            8 => is_miss = as_varint(value_wire)? != 0,
            9 => is_dead = as_varint(value_wire)? != 0,
            10 => hp_lessen_value = as_fixed64(value_wire)?,
            11 => property = as_varint(value_wire)? as u32,
            12 => damage_source = as_varint(value_wire)? as u32,
            _ => {}
        }
    }

    Ok(RawDamageEvent {
        owner_id,
        attacker_uuid: attacker_uuid.ok_or(SchemaError::MissingField("attacker_uuid"))?,
        top_summoner_id,
        value,
        lucky_value,
        type_flag,
        type_code,
        is_miss,
        is_dead,
        hp_lessen_value,
        property,
        damage_source,
    })
}

/// One AoI delta: `{ Uuid, Attrs.Attrs[], DamageEvents.Events[] }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AoiDelta {
    pub uuid: u64,
    pub attrs: Vec<RawAttr>,
    pub damage_events: Vec<RawDamageEvent>,
}

fn decode_aoi_delta(body: Bytes) -> Result<AoiDelta> {
    let mut reader = FieldReader::new(body);
    let mut uuid = None;
    let mut attrs = Vec::new();
    let mut damage_events = Vec::new();
    while let Some((field, value)) = reader.next()? {
        match field {
            1 => uuid = Some(as_varint(value)?),
            2 => attrs = decode_attrs(as_bytes(value)?)?,
            3 => damage_events.push(decode_damage_event(as_bytes(value)?)?),
            _ => {}
        }
    }
    Ok(AoiDelta {
        uuid: uuid.ok_or(SchemaError::MissingField("uuid"))?,
        attrs,
        damage_events,
    })
}

/// `SyncServerTime` (method 0x0000002b): wraps exactly one AoI delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncServerTime {
    pub delta: AoiDelta,
}

pub fn decode_sync_server_time(body: Bytes) -> Result<SyncServerTime> {
    let mut reader = FieldReader::new(body);
    let mut delta = None;
    while let Some((field, value)) = reader.next()? {
        if field == 1 {
            delta = Some(decode_aoi_delta(as_bytes(value)?)?);
        }
    }
    Ok(SyncServerTime {
        delta: delta.ok_or(SchemaError::MissingField("delta"))?,
    })
}

/// `SyncNearDeltaInfo` (method 0x0000002d): list of AoI deltas.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncNearDeltaInfo {
    pub deltas: Vec<AoiDelta>,
}

pub fn decode_sync_near_delta_info(body: Bytes) -> Result<SyncNearDeltaInfo> {
    let mut reader = FieldReader::new(body);
    let mut msg = SyncNearDeltaInfo::default();
    while let Some((field, value)) = reader.next()? {
        if field == 1 {
            msg.deltas.push(decode_aoi_delta(as_bytes(value)?)?);
        }
    }
    Ok(msg)
}

/// `SyncToMeDeltaInfo` (method 0x0000002e): local-player AoI delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncToMeDeltaInfo {
    pub delta: AoiDelta,
}

pub fn decode_sync_to_me_delta_info(body: Bytes) -> Result<SyncToMeDeltaInfo> {
    let mut reader = FieldReader::new(body);
    let mut delta = None;
    while let Some((field, value)) = reader.next()? {
        if field == 1 {
            delta = Some(decode_aoi_delta(as_bytes(value)?)?);
        }
    }
    Ok(SyncToMeDeltaInfo {
        delta: delta.ok_or(SchemaError::MissingField("delta"))?,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Manual wire encoders, used only by tests in this crate and
    //! `netwatch-dispatch`'s integration tests, to build schema-encoded
    //! fixtures the way `decode_*` above expects to read them.
    use bytes::{BufMut, Bytes, BytesMut};

    pub fn write_varint(out: &mut BytesMut, mut v: u64) {
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                out.put_u8(byte);
                break;
            } else {
                out.put_u8(byte | 0x80);
            }
        }
    }

    pub fn field_varint(out: &mut BytesMut, field: u32, v: u64) {
        write_varint(out, ((field as u64) << 3) | 0);
        write_varint(out, v);
    }

    pub fn field_fixed64(out: &mut BytesMut, field: u32, v: i64) {
        write_varint(out, ((field as u64) << 3) | 1);
        out.put_u64(v as u64);
    }

    pub fn field_bytes(out: &mut BytesMut, field: u32, bytes: &[u8]) {
        write_varint(out, ((field as u64) << 3) | 2);
        write_varint(out, bytes.len() as u64);
        out.extend_from_slice(bytes);
    }

    pub fn attr(attr_id: u64, attr_data: &[u8]) -> Bytes {
        let mut out = BytesMut::new();
        field_varint(&mut out, 1, attr_id);
        field_bytes(&mut out, 2, attr_data);
        out.freeze()
    }

    pub fn attrs_field(attrs: &[Bytes]) -> Bytes {
        let mut out = BytesMut::new();
        for a in attrs {
            field_bytes(&mut out, 1, a);
        }
        out.freeze()
    }

    pub fn entity_record(uuid: u64, attrs: &[Bytes]) -> Bytes {
        let mut out = BytesMut::new();
        field_varint(&mut out, 1, uuid);
        field_bytes(&mut out, 2, &attrs_field(attrs));
        out.freeze()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn damage_event(
        owner_id: u64,
        attacker_uuid: u64,
        top_summoner_id: u64,
        value: Option<i64>,
        lucky_value: Option<i64>,
        type_flag: u32,
        type_code: u32,
        is_miss: bool,
        is_dead: bool,
        hp_lessen_value: i64,
        property: u32,
        damage_source: u32,
    ) -> Bytes {
        let mut out = BytesMut::new();
        field_varint(&mut out, 1, owner_id);
        field_varint(&mut out, 2, attacker_uuid);
        field_varint(&mut out, 3, top_summoner_id);
        if let Some(v) = value {
            field_fixed64(&mut out, 4, v);
        }
        if let Some(v) = lucky_value {
            field_fixed64(&mut out, 5, v);
        }
        field_varint(&mut out, 6, type_flag as u64);
        field_varint(&mut out, 7, type_code as u64);
        field_varint(&mut out, 8, is_miss as u64);
        field_varint(&mut out, 9, is_dead as u64);
        field_fixed64(&mut out, 10, hp_lessen_value);
        field_varint(&mut out, 11, property as u64);
        field_varint(&mut out, 12, damage_source as u64);
        out.freeze()
    }

    pub fn aoi_delta(uuid: u64, attrs: &[Bytes], damage_events: &[Bytes]) -> Bytes {
        let mut out = BytesMut::new();
        field_varint(&mut out, 1, uuid);
        field_bytes(&mut out, 2, &attrs_field(attrs));
        for d in damage_events {
            field_bytes(&mut out, 3, d);
        }
        out.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use fixtures::*;

    #[test]
    fn decodes_sync_near_entities() {
        let name_attr = attr(0x01, b"Alice");
        let entity = entity_record((7u64 << 16) | 1, &[name_attr]);
        let mut body = BytesMut::new();
        field_bytes(&mut body, 1, &entity);

        let msg = decode_sync_near_entities(body.freeze()).unwrap();
        assert_eq!(msg.entities.len(), 1);
        assert_eq!(msg.entities[0].uuid, (7u64 << 16) | 1);
        assert_eq!(msg.entities[0].attrs.len(), 1);
        assert_eq!(msg.entities[0].attrs[0].attr_id, 0x01);
    }

    #[test]
    fn decodes_sync_container_with_attrs() {
        let hp_attr = attr(0x2c2e, &500u32.to_be_bytes());
        let entity = entity_record((3u64 << 16) | 2, &[hp_attr]);
        let mut body = BytesMut::new();
        field_bytes(&mut body, 1, &entity);

        let msg = decode_sync_container(body.freeze()).unwrap();
        assert_eq!(msg.entity.uuid, (3u64 << 16) | 2);
        assert_eq!(msg.entity.attrs[0].attr_id, 0x2c2e);
    }

    #[test]
    fn decodes_aoi_delta_with_damage_event() {
        let dmg = damage_event(42, (1u64 << 16) | 1, 0, Some(1234), None, 1, 0, false, false, 1234, 4, 0);
        let delta = aoi_delta((1u64 << 16) | 2, &[], &[dmg]);
        let mut body = BytesMut::new();
        field_bytes(&mut body, 1, &delta);

        let msg = decode_sync_near_delta_info(body.freeze()).unwrap();
        assert_eq!(msg.deltas.len(), 1);
        assert_eq!(msg.deltas[0].uuid, (1u64 << 16) | 2);
        assert_eq!(msg.deltas[0].damage_events.len(), 1);
        let ev = &msg.deltas[0].damage_events[0];
        assert_eq!(ev.value, Some(1234));
        assert_eq!(ev.lucky_value, None);
        assert_eq!(ev.type_flag, 1);
        assert_eq!(ev.property, 4);
    }

    #[test]
    fn unknown_fields_are_skipped_not_errors() {
        let mut body = BytesMut::new();
        field_varint(&mut body, 99, 12345); // unknown field number
        let entity = entity_record(1, &[]);
        field_bytes(&mut body, 1, &entity);

        let msg = decode_sync_container(body.freeze()).unwrap();
        assert_eq!(msg.entity.uuid, 1);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let body = Bytes::new(); // no entity field at all
        assert!(matches!(
            decode_sync_container(body),
            Err(SchemaError::MissingField("entity"))
        ));
    }

    #[test]
    fn truncated_varint_is_an_error() {
        let body = Bytes::from_static(&[0x80, 0x80, 0x80]); // never terminates
        assert!(decode_sync_near_entities(body).is_err());
    }
}
