//! Damage/heal event shape and element labels.

/// A decoded damage or heal record, ready for the sink.
/// Integers stay 64-bit end to end; narrowing to a sink's native number
/// type is the sink's concern, not this crate's.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageEvent {
    pub attacker_short_id: u64,
    pub target_short_id: u64,
    pub skill_id: u64,
    pub value: i64,
    pub lucky_value: Option<i64>,
    pub is_crit: bool,
    pub is_cause_lucky: bool,
    pub is_miss: bool,
    pub is_heal: bool,
    pub is_dead: bool,
    pub is_lucky: bool,
    pub hp_lessen_value: i64,
    pub damage_element: DamageElement,
    pub damage_source: u32,
}

/// Element tag resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageElement {
    None,
    Fire,
    Ice,
    Poison,
    Thunder,
    Wind,
    Rock,
    Light,
    Dark,
    Unknown,
}

impl DamageElement {
    pub fn from_tag(tag: u32) -> Self {
        match tag {
            0 => DamageElement::None,
            1 => DamageElement::Fire,
            2 => DamageElement::Ice,
            3 => DamageElement::Poison,
            4 => DamageElement::Thunder,
            5 => DamageElement::Wind,
            6 => DamageElement::Rock,
            7 => DamageElement::Light,
            8 => DamageElement::Dark,
            _ => DamageElement::Unknown,
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            DamageElement::None => "None",
            DamageElement::Fire => "Fire",
            DamageElement::Ice => "Ice",
            DamageElement::Poison => "Poison",
            DamageElement::Thunder => "Thunder",
            DamageElement::Wind => "Wind",
            DamageElement::Rock => "Rock",
            DamageElement::Light => "Light",
            DamageElement::Dark => "Dark",
            DamageElement::Unknown => "Unknown",
        }
    }
}

/// Crit/lucky bit derivation from a record's `TypeFlag`. Bits other than
/// 1, 2, and 4 have no documented meaning; callers should count them via
/// [`crate::stats::PipelineStats::unexpected_type_flag_bits`].
pub fn is_crit(type_flag: u32) -> bool {
    type_flag & 1 != 0
}

pub fn is_cause_lucky(type_flag: u32) -> bool {
    type_flag & 4 != 0
}

/// Bits with a documented meaning; anything else set is logged as an
/// anomaly.
pub const KNOWN_TYPE_FLAG_BITS: u32 = 0b111;
