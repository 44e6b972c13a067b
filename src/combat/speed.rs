//! Swing timing

use crate::combat::attack::WeaponAttack;
use crate::core::config::GameConfig;
use crate::core::types::CharId;
use crate::entity::character::Character;
use crate::entity::flags::{AffFlag, Tech};
use crate::world::{ObjKind, WearSlot, World};

/// Fastest any attack can repeat, in seconds
pub const MIN_COMBAT_SPEED: f64 = 0.1;

/// Seconds between swings of `attack` for this character
pub fn combat_speed_for(config: &GameConfig, ch: &Character, attack: WeaponAttack) -> f64 {
    let info = attack.info();
    let mut speed = info.base_speed;

    let speed_tech = if info.ranged {
        Tech::FastRangedCombat
    } else {
        Tech::FastMeleeCombat
    };
    if ch.has_tech(speed_tech) {
        speed *= 1.0 - config.fast_combat_reduction;
    }

    if ch.has_aff(AffFlag::Haste) {
        speed *= config.haste_speed_multiplier;
    }
    if ch.has_aff(AffFlag::Slow) {
        speed *= config.slow_speed_multiplier;
    }

    if !ch.has_tech(Tech::FastCasting) {
        let fours = (ch.wits().max(0) / 4) as f64;
        speed *= 1.0 - config.speed_per_four_wits * fours;
    }

    ((speed * 10.0).round() / 10.0).max(MIN_COMBAT_SPEED)
}

/// The attack a character makes from a slot
///
/// Empty hands fall back to the NPC's natural attack, or a plain hit.
pub fn slot_attack(world: &World, ch: CharId, slot: WearSlot) -> WeaponAttack {
    let natural = world
        .ch(ch)
        .and_then(|c| c.mob())
        .map(|m| m.attack)
        .unwrap_or(WeaponAttack::Hit);
    match world.equipped(ch, slot).map(|o| &o.kind) {
        Some(ObjKind::Weapon { attack, .. }) => *attack,
        Some(ObjKind::Missile { attack, .. }) => *attack,
        _ => natural,
    }
}

/// Seconds between swings from one slot
pub fn get_combat_speed(world: &World, ch: CharId, slot: WearSlot) -> f64 {
    let attack = slot_attack(world, ch, slot);
    match world.ch(ch) {
        Some(c) => combat_speed_for(&world.config, c, attack),
        None => attack.info().base_speed,
    }
}

/// Speed in clock microseconds
pub fn speed_micros(speed: f64) -> u64 {
    (speed * 1_000_000.0).round() as u64
}
