//! Attribute blob kinds.
//!
//! The wire encoding of `attr_data` (string vs. numeric) lives in
//! `netwatch-net::attr_blob`, which depends on this table to know which
//! decoder to apply. This module only defines *what the attributes mean*,
//! not how their bytes are laid out.

/// A recognized attribute kind, keyed by `attr_id`. Unrecognized attr_ids
/// are not an error — the schema decoder simply has nothing to map them
/// to, so the caller should skip them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrKind {
    /// 0x01 - entity display name (string)
    DisplayName,
    /// 0x0a - monster type id (u32 BE)
    MonsterTypeId,
    /// 0xdc - player profession id (u32 BE)
    ProfessionId,
    /// 0x272e - player combat rating (u32 BE)
    CombatRating,
    /// 0x2710 - player level (u32 BE)
    Level,
    /// 0x274c - player rank level (u32 BE)
    RankLevel,
    /// 0x2c2e - current hit points (u32 BE)
    CurrentHp,
    /// 0x2c38 - maximum hit points (u32 BE)
    MaxHp,
    /// 0x64696d - reduction level (u32 BE)
    ReductionLevel,
    /// 0x6f6c65 - reduction id (u32 BE)
    ReductionId,
    /// 0x646d6c - elemental affinity tag (u32 BE)
    ElementalAffinity,
}

/// The wire shape of an attribute's `attr_data`, independent of its
/// meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrEncoding {
    String,
    NumericU32Be,
}

impl AttrKind {
    /// Look up the kind for a raw attr_id. Returns `None` for unrecognized
    /// ids, which callers should skip rather than error on.
    pub fn from_attr_id(attr_id: u64) -> Option<Self> {
        Some(match attr_id {
            0x01 => AttrKind::DisplayName,
            0x0a => AttrKind::MonsterTypeId,
            0xdc => AttrKind::ProfessionId,
            0x272e => AttrKind::CombatRating,
            0x2710 => AttrKind::Level,
            0x274c => AttrKind::RankLevel,
            0x2c2e => AttrKind::CurrentHp,
            0x2c38 => AttrKind::MaxHp,
            0x64696d => AttrKind::ReductionLevel,
            0x6f6c65 => AttrKind::ReductionId,
            0x646d6c => AttrKind::ElementalAffinity,
            _ => return None,
        })
    }

    pub fn encoding(self) -> AttrEncoding {
        match self {
            AttrKind::DisplayName => AttrEncoding::String,
            _ => AttrEncoding::NumericU32Be,
        }
    }
}

/// A decoded attribute value, post-decode (string or number).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Number(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_attr_ids_map_to_expected_kinds() {
        assert_eq!(AttrKind::from_attr_id(0x01), Some(AttrKind::DisplayName));
        assert_eq!(AttrKind::from_attr_id(0xdc), Some(AttrKind::ProfessionId));
        assert_eq!(AttrKind::from_attr_id(0x2c38), Some(AttrKind::MaxHp));
        assert_eq!(
            AttrKind::from_attr_id(0x646d6c),
            Some(AttrKind::ElementalAffinity)
        );
    }

    #[test]
    fn unknown_attr_id_is_none() {
        assert_eq!(AttrKind::from_attr_id(0xdeadbeef), None);
    }

    #[test]
    fn encodings_match_spec_table() {
        assert_eq!(AttrKind::DisplayName.encoding(), AttrEncoding::String);
        assert_eq!(AttrKind::MaxHp.encoding(), AttrEncoding::NumericU32Be);
        assert_eq!(AttrKind::ProfessionId.encoding(), AttrEncoding::NumericU32Be);
    }
}
