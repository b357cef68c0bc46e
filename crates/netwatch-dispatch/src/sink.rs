//! The collaborator the dispatcher publishes entity and combat updates to.

use netwatch_core::damage::DamageEvent;

/// A UI/aggregation collaborator the dispatcher drives. Implementations
/// decide what to do with each update - render it, aggregate it, log it,
/// record it for a test. The dispatcher only knows this trait; it is
/// never aware of what's on the other side.
///
/// All methods take `&mut self`: the dispatcher runs on a single capture
/// thread and calls these synchronously, so a sink needs no internal
/// synchronization unless it is also accessed from elsewhere, which is
/// the sink implementation's own concern.
pub trait Sink {
    fn set_name(&mut self, uid: u64, name: &str);
    fn set_profession(&mut self, uid: u64, profession_name: &str);
    fn set_fight_point(&mut self, uid: u64, value: u32);
    fn set_level(&mut self, uid: u64, value: u32);

    fn set_enemy_name(&mut self, uid: u64, name: &str);
    fn set_enemy_id(&mut self, uid: u64, id: u32);
    fn set_enemy_hp(&mut self, uid: u64, hp: u32);
    fn set_enemy_max_hp(&mut self, uid: u64, max_hp: u32);
    fn set_enemy_reduction_level(&mut self, uid: u64, value: u32);
    fn set_enemy_reduction_id(&mut self, uid: u64, value: u32);
    fn set_enemy_element(&mut self, uid: u64, element_label: &str);
    fn add_enemy(&mut self, uid: u64, enemy: NewEnemy);

    fn process_player_damage(&mut self, event: &DamageEvent);
    fn process_damage_to_player(&mut self, event: &DamageEvent);

    fn set_local_position(&mut self, position: LocalPosition);
}

/// Snapshot passed to [`Sink::add_enemy`] once a monster has both a
/// non-default name and a positive max hp.
#[derive(Clone, Debug, PartialEq)]
pub struct NewEnemy {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub reduction_level: u32,
    pub reduction_id: u32,
    pub element_flag: u32,
}

/// A local-player position sample, published by the opportunistic
/// movement decoder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalPosition {
    pub uid: u64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub dir: f32,
    pub move_version: u32,
}
