//! An in-memory [`Sink`] that records every call it receives, for tests.

use netwatch_core::damage::DamageEvent;

use crate::sink::{LocalPosition, NewEnemy, Sink};

/// Every call a `RecordingSink` has observed, in call order per field.
/// This is deliberately not an aggregation layer - it is a flat log, kept
/// simple enough that tests can assert on it directly.
#[derive(Default, Debug)]
pub struct RecordingSink {
    pub names: Vec<(u64, String)>,
    pub professions: Vec<(u64, String)>,
    pub fight_points: Vec<(u64, u32)>,
    pub levels: Vec<(u64, u32)>,

    pub enemy_names: Vec<(u64, String)>,
    pub enemy_ids: Vec<(u64, u32)>,
    pub enemy_hps: Vec<(u64, u32)>,
    pub enemy_max_hps: Vec<(u64, u32)>,
    pub enemy_reduction_levels: Vec<(u64, u32)>,
    pub enemy_reduction_ids: Vec<(u64, u32)>,
    pub enemy_elements: Vec<(u64, String)>,
    pub enemies_added: Vec<(u64, NewEnemy)>,

    pub player_damage: Vec<DamageEvent>,
    pub damage_to_player: Vec<DamageEvent>,

    pub positions: Vec<LocalPosition>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for RecordingSink {
    fn set_name(&mut self, uid: u64, name: &str) {
        self.names.push((uid, name.to_string()));
    }

    fn set_profession(&mut self, uid: u64, profession_name: &str) {
        self.professions.push((uid, profession_name.to_string()));
    }

    fn set_fight_point(&mut self, uid: u64, value: u32) {
        self.fight_points.push((uid, value));
    }

    fn set_level(&mut self, uid: u64, value: u32) {
        self.levels.push((uid, value));
    }

    fn set_enemy_name(&mut self, uid: u64, name: &str) {
        self.enemy_names.push((uid, name.to_string()));
    }

    fn set_enemy_id(&mut self, uid: u64, id: u32) {
        self.enemy_ids.push((uid, id));
    }

    fn set_enemy_hp(&mut self, uid: u64, hp: u32) {
        self.enemy_hps.push((uid, hp));
    }

    fn set_enemy_max_hp(&mut self, uid: u64, max_hp: u32) {
        self.enemy_max_hps.push((uid, max_hp));
    }

    fn set_enemy_reduction_level(&mut self, uid: u64, value: u32) {
        self.enemy_reduction_levels.push((uid, value));
    }

    fn set_enemy_reduction_id(&mut self, uid: u64, value: u32) {
        self.enemy_reduction_ids.push((uid, value));
    }

    fn set_enemy_element(&mut self, uid: u64, element_label: &str) {
        self.enemy_elements.push((uid, element_label.to_string()));
    }

    fn add_enemy(&mut self, uid: u64, enemy: NewEnemy) {
        self.enemies_added.push((uid, enemy));
    }

    fn process_player_damage(&mut self, event: &DamageEvent) {
        self.player_damage.push(event.clone());
    }

    fn process_damage_to_player(&mut self, event: &DamageEvent) {
        self.damage_to_player.push(event.clone());
    }

    fn set_local_position(&mut self, position: LocalPosition) {
        self.positions.push(position);
    }
}
