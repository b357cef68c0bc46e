//! Entity classification and attribute/combat-event dispatch to a [`Sink`].

use netwatch_core::attrs::{AttrKind, AttrValue};
use netwatch_core::damage::{self, DamageElement, DamageEvent};
use netwatch_core::entity::{classify, Classification};
use netwatch_core::profession;
use netwatch_core::stats::PipelineStats;
use netwatch_net::attr_blob;
use netwatch_net::movement::Position;
use netwatch_net::schema::{
    self, AoiDelta, EntityRecord, RawDamageEvent, SyncContainer, SyncNearDeltaInfo,
    SyncNearEntities, SyncServerTime, SyncToMeDeltaInfo,
};
use tracing::{debug, info, warn};

use crate::sink::{LocalPosition, NewEnemy, Sink};

/// Tracks the identity of the local player across updates and dispatches
/// every decoded entity/combat unit to a [`Sink`].
pub struct EntityDispatcher {
    local_player_short_id: Option<u64>,
}

impl Default for EntityDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityDispatcher {
    pub fn new() -> Self {
        Self {
            local_player_short_id: None,
        }
    }

    /// Currently tracked local-player short id, if any uuid has been
    /// observed yet.
    pub fn local_player_short_id(&self) -> Option<u64> {
        self.local_player_short_id
    }

    /// Record `uuid` as the local player if it classifies as a player,
    /// logging a change notice if this replaces a different,
    /// already-known player. Monster uuids are ignored here.
    fn note_local_player(&mut self, uuid: u64) {
        let short_id = match classify(uuid) {
            Classification::Player { short_id } => short_id,
            _ => return,
        };
        if self.local_player_short_id != Some(short_id) {
            if let Some(previous) = self.local_player_short_id {
                info!(previous, new = short_id, "local player changed");
            }
            self.local_player_short_id = Some(short_id);
        }
    }

    /// Dispatch a bulk entity registration. Every player uuid observed
    /// here is a candidate for local-player tracking.
    pub fn handle_sync_near_entities(
        &mut self,
        msg: &SyncNearEntities,
        sink: &mut dyn Sink,
        stats: &PipelineStats,
        monster_name_overrides: &dyn Fn(&str) -> Option<String>,
    ) {
        for entity in &msg.entities {
            self.note_local_player(entity.uuid);
            self.dispatch_entity(entity, sink, stats, monster_name_overrides);
        }
    }

    /// Dispatch a single-entity snapshot or patch (`SyncContainerData` /
    /// `SyncContainerDirtyData` share this handler - identical shape).
    pub fn handle_sync_container(
        &mut self,
        msg: &SyncContainer,
        sink: &mut dyn Sink,
        stats: &PipelineStats,
        monster_name_overrides: &dyn Fn(&str) -> Option<String>,
    ) {
        self.dispatch_entity(&msg.entity, sink, stats, monster_name_overrides);
    }

    /// Dispatch the local player's own AoI delta (`SyncToMeDeltaInfo`).
    /// Its uuid is always a local-player tracking candidate.
    pub fn handle_sync_to_me_delta_info(
        &mut self,
        msg: &SyncToMeDeltaInfo,
        sink: &mut dyn Sink,
        stats: &PipelineStats,
        monster_name_overrides: &dyn Fn(&str) -> Option<String>,
    ) {
        self.note_local_player(msg.delta.uuid);
        self.dispatch_delta(&msg.delta, sink, stats, monster_name_overrides);
    }

    /// Dispatch a `SyncServerTime` delta - shape-identical to
    /// `SyncNearDeltaInfo`'s single entry.
    pub fn handle_sync_server_time(
        &mut self,
        msg: &SyncServerTime,
        sink: &mut dyn Sink,
        stats: &PipelineStats,
        monster_name_overrides: &dyn Fn(&str) -> Option<String>,
    ) {
        self.dispatch_delta(&msg.delta, sink, stats, monster_name_overrides);
    }

    /// Dispatch every delta in a `SyncNearDeltaInfo` batch.
    pub fn handle_sync_near_delta_info(
        &mut self,
        msg: &SyncNearDeltaInfo,
        sink: &mut dyn Sink,
        stats: &PipelineStats,
        monster_name_overrides: &dyn Fn(&str) -> Option<String>,
    ) {
        for delta in &msg.deltas {
            self.dispatch_delta(delta, sink, stats, monster_name_overrides);
        }
    }

    /// Publish an opportunistically-decoded position sample as the local
    /// player's position, keyed by the currently tracked local-player
    /// short id. A no-op if no local player has been observed yet.
    pub fn handle_position(&mut self, position: &Position, sink: &mut dyn Sink) {
        let Some(uid) = self.local_player_short_id else {
            return;
        };
        sink.set_local_position(LocalPosition {
            uid,
            x: position.x,
            y: position.y,
            z: position.z,
            dir: position.dir,
            move_version: position.move_version,
        });
    }

    /// Dispatch one entity record's attributes to the sink, patching
    /// player or monster fields depending on classification. Monster
    /// display names are remapped through `monster_name_overrides` when a
    /// mapping exists.
    fn dispatch_entity(
        &mut self,
        entity: &EntityRecord,
        sink: &mut dyn Sink,
        stats: &PipelineStats,
        monster_name_overrides: &dyn Fn(&str) -> Option<String>,
    ) {
        let classification = classify(entity.uuid);
        let short_id = match classification {
            Classification::Player { short_id } => short_id,
            Classification::Monster { short_id } => short_id,
            Classification::Unknown { low16 } => {
                debug!(low16, uuid = entity.uuid, "classification unknown, dropping entity");
                stats.classification_unknown();
                return;
            }
        };

        let mut monster_name: Option<String> = None;
        let mut monster_max_hp: u32 = 0;
        let mut monster_hp: u32 = 0;
        let mut monster_reduction_level: u32 = 0;
        let mut monster_reduction_id: u32 = 0;
        let mut monster_element_flag: u32 = 0;

        for raw_attr in &entity.attrs {
            // Unrecognized attr_ids are not an error - the schema decoder
            // simply has nothing to map them to, so skip before even
            // attempting to decode the payload.
            let kind = match AttrKind::from_attr_id(raw_attr.attr_id) {
                Some(k) => k,
                None => continue,
            };

            let value = match attr_blob::decode(raw_attr) {
                Ok(v) => v,
                Err(e) => {
                    warn!(attr_id = raw_attr.attr_id, error = %e, "attribute decode failed, skipping");
                    stats.attribute_decode_failures();
                    continue;
                }
            };

            match (classification, kind, value) {
                (Classification::Player { .. }, AttrKind::DisplayName, AttrValue::Text(name)) => {
                    sink.set_name(short_id, &name);
                }
                (Classification::Player { .. }, AttrKind::ProfessionId, AttrValue::Number(id)) => {
                    sink.set_profession(short_id, profession::profession_name(id));
                }
                (Classification::Player { .. }, AttrKind::CombatRating, AttrValue::Number(v)) => {
                    sink.set_fight_point(short_id, v);
                }
                (Classification::Player { .. }, AttrKind::Level, AttrValue::Number(v)) => {
                    sink.set_level(short_id, v);
                }

                (Classification::Monster { .. }, AttrKind::DisplayName, AttrValue::Text(name)) => {
                    let display = monster_name_overrides(&name).unwrap_or(name);
                    sink.set_enemy_name(short_id, &display);
                    monster_name = Some(display);
                }
                (Classification::Monster { .. }, AttrKind::MonsterTypeId, AttrValue::Number(v)) => {
                    sink.set_enemy_id(short_id, v);
                }
                (Classification::Monster { .. }, AttrKind::CurrentHp, AttrValue::Number(v)) => {
                    sink.set_enemy_hp(short_id, v);
                    monster_hp = v;
                }
                (Classification::Monster { .. }, AttrKind::MaxHp, AttrValue::Number(v)) => {
                    sink.set_enemy_max_hp(short_id, v);
                    monster_max_hp = v;
                }
                (Classification::Monster { .. }, AttrKind::ReductionLevel, AttrValue::Number(v)) => {
                    sink.set_enemy_reduction_level(short_id, v);
                    monster_reduction_level = v;
                }
                (Classification::Monster { .. }, AttrKind::ReductionId, AttrValue::Number(v)) => {
                    sink.set_enemy_reduction_id(short_id, v);
                    monster_reduction_id = v;
                }
                (Classification::Monster { .. }, AttrKind::ElementalAffinity, AttrValue::Number(v)) => {
                    sink.set_enemy_element(short_id, damage::DamageElement::from_tag(v).as_label());
                    monster_element_flag = v;
                }
                _ => {}
            }
        }

        if let Classification::Monster { .. } = classification {
            if let Some(name) = monster_name {
                if monster_max_hp > 0 {
                    sink.add_enemy(
                        short_id,
                        NewEnemy {
                            name,
                            hp: monster_hp,
                            max_hp: monster_max_hp,
                            reduction_level: monster_reduction_level,
                            reduction_id: monster_reduction_id,
                            element_flag: monster_element_flag,
                        },
                    );
                }
            }
        }
    }

    /// Dispatch one AoI delta: its attribute patches and every damage
    /// event it carries, in schema-declared order.
    fn dispatch_delta(
        &mut self,
        delta: &AoiDelta,
        sink: &mut dyn Sink,
        stats: &PipelineStats,
        monster_name_overrides: &dyn Fn(&str) -> Option<String>,
    ) {
        let entity_record = EntityRecord {
            uuid: delta.uuid,
            attrs: delta.attrs.clone(),
        };
        self.dispatch_entity(&entity_record, sink, stats, monster_name_overrides);

        for raw_event in &delta.damage_events {
            self.dispatch_damage_event(delta.uuid, raw_event, sink, stats);
        }
    }

    /// `delta_uuid` is the entity this AoI delta describes - the implicit
    /// target of every damage event it carries. `AttackerUuid` (or
    /// `TopSummonerId`, when non-zero) identifies who dealt it.
    fn dispatch_damage_event(
        &mut self,
        delta_uuid: u64,
        raw: &RawDamageEvent,
        sink: &mut dyn Sink,
        stats: &PipelineStats,
    ) {
        if raw.type_flag & !damage::KNOWN_TYPE_FLAG_BITS != 0 {
            warn!(type_flag = raw.type_flag, "type_flag has bits outside the known set");
            stats.unexpected_type_flag_bits();
        }

        let attacker_uuid = if raw.top_summoner_id != 0 {
            raw.top_summoner_id
        } else {
            raw.attacker_uuid
        };

        let attacker = classify(attacker_uuid);
        let target = classify(delta_uuid);

        let value = match raw.value.or(raw.lucky_value) {
            Some(v) if v != 0 => v,
            _ => return,
        };

        let event = DamageEvent {
            attacker_short_id: attacker.short_id().unwrap_or(0),
            target_short_id: target.short_id().unwrap_or(0),
            skill_id: raw.owner_id,
            value,
            lucky_value: raw.lucky_value,
            is_crit: damage::is_crit(raw.type_flag),
            is_cause_lucky: damage::is_cause_lucky(raw.type_flag),
            is_miss: raw.is_miss,
            is_heal: raw.type_code == schema::TYPE_CODE_HEAL,
            is_dead: raw.is_dead,
            is_lucky: raw.lucky_value.is_some(),
            hp_lessen_value: raw.hp_lessen_value,
            damage_element: DamageElement::from_tag(raw.property),
            damage_source: raw.damage_source,
        };

        match (attacker, target) {
            (Classification::Player { .. }, Classification::Monster { .. }) => {
                sink.process_player_damage(&event);
            }
            (Classification::Monster { .. }, Classification::Player { .. }) => {
                sink.process_damage_to_player(&event);
            }
            _ => { /* player-player, monster-monster, or unknown: drop */ }
        }
    }
}
