//! Default [`Sink`] implementation: logs every update via `tracing`.
//!
//! The real aggregation/UI layer is out of scope for this crate; this sink
//! exists so the binary is useful standalone (e.g. piped through `journalctl`
//! or a log aggregator) and so the wiring in [`crate::pipeline`] has
//! something concrete to drive.

use netwatch_core::damage::DamageEvent;
use netwatch_dispatch::sink::{LocalPosition, NewEnemy, Sink};
use tracing::info;

#[derive(Debug, Default)]
pub struct LoggingSink;

impl Sink for LoggingSink {
    fn set_name(&mut self, uid: u64, name: &str) {
        info!(uid, name, "player name");
    }

    fn set_profession(&mut self, uid: u64, profession_name: &str) {
        info!(uid, profession = profession_name, "player profession");
    }

    fn set_fight_point(&mut self, uid: u64, value: u32) {
        info!(uid, value, "player fight point");
    }

    fn set_level(&mut self, uid: u64, value: u32) {
        info!(uid, value, "player level");
    }

    fn set_enemy_name(&mut self, uid: u64, name: &str) {
        info!(uid, name, "enemy name");
    }

    fn set_enemy_id(&mut self, uid: u64, id: u32) {
        info!(uid, id, "enemy type id");
    }

    fn set_enemy_hp(&mut self, uid: u64, hp: u32) {
        info!(uid, hp, "enemy hp");
    }

    fn set_enemy_max_hp(&mut self, uid: u64, max_hp: u32) {
        info!(uid, max_hp, "enemy max hp");
    }

    fn set_enemy_reduction_level(&mut self, uid: u64, value: u32) {
        info!(uid, value, "enemy reduction level");
    }

    fn set_enemy_reduction_id(&mut self, uid: u64, value: u32) {
        info!(uid, value, "enemy reduction id");
    }

    fn set_enemy_element(&mut self, uid: u64, element_label: &str) {
        info!(uid, element = element_label, "enemy element");
    }

    fn add_enemy(&mut self, uid: u64, enemy: NewEnemy) {
        info!(
            uid,
            name = %enemy.name,
            hp = enemy.hp,
            max_hp = enemy.max_hp,
            "new enemy registered"
        );
    }

    fn process_player_damage(&mut self, event: &DamageEvent) {
        log_damage_event("player damage", event);
    }

    fn process_damage_to_player(&mut self, event: &DamageEvent) {
        log_damage_event("damage to player", event);
    }

    fn set_local_position(&mut self, position: LocalPosition) {
        info!(
            uid = position.uid,
            x = position.x,
            y = position.y,
            z = position.z,
            dir = position.dir,
            move_version = position.move_version,
            "local position"
        );
    }
}

fn log_damage_event(label: &str, event: &DamageEvent) {
    info!(
        attacker = event.attacker_short_id,
        target = event.target_short_id,
        skill_id = event.skill_id,
        value = event.value,
        lucky_value = ?event.lucky_value,
        is_crit = event.is_crit,
        is_heal = event.is_heal,
        is_miss = event.is_miss,
        is_dead = event.is_dead,
        element = event.damage_element.as_label(),
        "{label}"
    );
}
