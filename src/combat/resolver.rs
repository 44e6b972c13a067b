//! Hit, dodge and block resolution
//!
//! The formulas are pure functions of two characters; the world-level
//! checks add the roll and any skill experience. NPC and player attackers
//! use different hit formulas, and both are kept as they are.

use crate::core::config::GameConfig;
use crate::core::types::{round_to_int, CharId};
use crate::entity::character::Character;
use crate::entity::flags::{Ability, MobFlag, Role, Tech};
use crate::entity::position::Position;
use crate::world::{WearSlot, World};

/// Experience per successful dodge or block attempt
const DEFENSE_EXP: f64 = 1.0;

/// Attacker's to-hit against this victim
pub fn get_to_hit(config: &GameConfig, attacker: &Character, victim: &Character, off_hand: bool) -> i32 {
    let mut to_hit =
        config.to_hit_base + attacker.to_hit() + attacker.dexterity() * config.to_hit_per_dex;
    if off_hand {
        to_hit -= 50;
    }
    if !attacker.can_see(victim) {
        to_hit -= 50;
    }
    if let Some(mob) = attacker.mob() {
        to_hit += mob.to_hit_bonus;
    }
    to_hit
}

/// Defender's dodge against this attacker
pub fn get_dodge_modifier(config: &GameConfig, defender: &Character, attacker: &Character) -> i32 {
    let mut dodge = defender.dodge() + defender.dexterity() * config.dodge_per_dex;
    if let Some(mob) = defender.mob() {
        dodge += mob.dodge_bonus;
    }
    if !defender.can_see(attacker) {
        dodge -= 50;
    }
    dodge
}

/// Chance to hit, and how much is taken off the roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOdds {
    pub chance: i32,
    pub roll_penalty: i32,
}

impl HitOdds {
    /// `roll` is 1-100
    pub fn succeeds(&self, roll: i32) -> bool {
        roll - self.roll_penalty <= self.chance
    }
}

/// Minimum hit chance for this pairing, before the level-tolerance gate
fn minimum_to_hit(config: &GameConfig, attacker: &Character, victim: &Character) -> i32 {
    let mut min = if attacker.is_npc() {
        config.min_npc_to_hit
    } else {
        config.min_pc_to_hit
    };
    if !victim.is_npc() {
        if victim.role() != Role::Tank {
            min += 20;
        }
        if !victim.has_tech(Tech::Dodge) {
            min += 20;
        }
    }
    min
}

pub fn hit_odds(
    config: &GameConfig,
    attacker: &Character,
    victim: &Character,
    to_hit: i32,
    dodge: i32,
) -> HitOdds {
    let within_tolerance = (attacker.level - victim.level).abs() <= config.to_hit_level_tolerance;
    let min = minimum_to_hit(config, attacker, victim);

    if attacker.is_npc() {
        let mut chance = to_hit - dodge;
        if within_tolerance {
            chance = chance.max(min);
        }
        HitOdds {
            chance,
            roll_penalty: 0,
        }
    } else {
        let max = to_hit.max(dodge) + 100;
        HitOdds {
            chance: to_hit.max(0) * 100 / max,
            roll_penalty: if within_tolerance { min } else { 0 },
        }
    }
}

/// Whether beating `opponent` is worth skill experience to `ch`
pub fn can_gain_exp_from(config: &GameConfig, ch: &Character, opponent: &Character) -> bool {
    !ch.is_npc()
        && opponent.position > Position::Stunned
        && opponent.level + config.to_hit_level_tolerance >= ch.level
}

/// Roll attacker's hit against victim's dodge
pub fn check_hit_vs_dodge(
    world: &mut World,
    attacker: CharId,
    victim: CharId,
    off_hand: bool,
    can_gain_skill: bool,
) -> bool {
    let (odds, exp_ok) = {
        let (Some(a), Some(v)) = (world.ch(attacker), world.ch(victim)) else {
            return false;
        };
        if !v.is_awake() {
            return true;
        }
        let to_hit = get_to_hit(&world.config, a, v, off_hand);
        let dodge = get_dodge_modifier(&world.config, v, a);
        (
            hit_odds(&world.config, a, v, to_hit, dodge),
            can_gain_skill
                && v.can_use_ability(Ability::Dodge)
                && can_gain_exp_from(&world.config, v, a),
        )
    };

    let roll = world.roll(1, 100);
    let hit = odds.succeeds(roll);
    if !hit && exp_ok {
        world
            .hooks()
            .gain_ability_exp(world, victim, Ability::Dodge, DEFENSE_EXP);
    }
    hit
}

/// Block chance for a given rating, capped at the configured maximum
pub fn block_chance(config: &GameConfig, attacker: &Character, rating: i32) -> i32 {
    let mut target = attacker.level.max(1) as f64 * config.block_rating_per_level;
    if attacker.has_mob_flag(MobFlag::Hard) {
        target *= 1.0 + config.block_hard_adjustment;
    }
    if attacker.has_mob_flag(MobFlag::Group) {
        target *= 1.0 + config.block_group_adjustment;
    }
    let scaled = rating.max(0) as f64 * config.max_block_chance as f64 / target;
    round_to_int(scaled).min(config.max_block_chance)
}

/// Roll the victim's shield block
pub fn check_block(world: &mut World, attacker: CharId, victim: CharId, can_gain_skill: bool) -> bool {
    let has_shield = world
        .equipped(victim, WearSlot::Hold)
        .is_some_and(|o| o.is_shield());
    let (chance, exp_ok) = {
        let (Some(a), Some(v)) = (world.ch(attacker), world.ch(victim)) else {
            return false;
        };
        if !has_shield || !v.has_tech(Tech::Block) || !v.is_awake() {
            return false;
        }
        let mut rating = v.block();
        if !v.can_see(a) {
            rating -= 50;
        }
        (
            block_chance(&world.config, a, rating),
            can_gain_skill
                && v.can_use_ability(Ability::Block)
                && can_gain_exp_from(&world.config, v, a),
        )
    };

    if exp_ok {
        world
            .hooks()
            .gain_ability_exp(world, victim, Ability::Block, DEFENSE_EXP);
    }
    world.roll(1, 100) <= chance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig::default()
    }

    #[test]
    fn test_player_formula_at_fifty_percent() {
        let config = config();
        let attacker = Character::player("Ana", 50);
        let victim = Character::npc("wolf", 1, 50);
        let odds = hit_odds(&config, &attacker, &victim, 100, 0);
        assert_eq!(odds.chance, 50);
    }

    #[test]
    fn test_player_floor_only_within_tolerance() {
        let config = config();
        let attacker = Character::player("Ana", 50);
        let near = Character::npc("wolf", 1, 60);
        let far = Character::npc("dragon", 2, 200);

        let within = hit_odds(&config, &attacker, &near, 100, 0);
        let outside = hit_odds(&config, &attacker, &far, 100, 0);
        assert_eq!(within.roll_penalty, config.min_pc_to_hit);
        assert_eq!(outside.roll_penalty, 0);
        // A roll of 70 hits only with the floor
        assert!(within.succeeds(70));
        assert!(!outside.succeeds(70));
    }

    #[test]
    fn test_npc_floor_only_within_tolerance() {
        let config = config();
        let mob = Character::npc("wolf", 1, 100);
        let near = Character::npc("rabbit", 2, 90);
        let far = Character::npc("rabbit", 2, 1);
        assert_eq!(hit_odds(&config, &mob, &near, 10, 60).chance, config.min_npc_to_hit);
        assert_eq!(hit_odds(&config, &mob, &far, 10, 60).chance, -50);
    }

    #[test]
    fn test_floor_escalates_for_soft_player_victims() {
        let config = config();
        let mob = Character::npc("wolf", 1, 50);
        let mut tank = Character::player("Ana", 50);
        if let Some(p) = tank.player_data_mut() {
            p.role = Role::Tank;
        }
        tank.techs.insert(Tech::Dodge);
        let soft = Character::player("Bo", 50);

        assert_eq!(hit_odds(&config, &mob, &tank, 0, 100).chance, config.min_npc_to_hit);
        assert_eq!(hit_odds(&config, &mob, &soft, 0, 100).chance, config.min_npc_to_hit + 40);
    }

    #[test]
    fn test_to_hit_penalties() {
        let config = config();
        let attacker = Character::player("Ana", 50);
        let mut victim = Character::player("Bo", 50);
        let base = get_to_hit(&config, &attacker, &victim, false);
        assert_eq!(get_to_hit(&config, &attacker, &victim, true), base - 50);
        victim.aff_flags.set(crate::entity::flags::AffFlag::Invisible);
        assert_eq!(get_to_hit(&config, &attacker, &victim, false), base - 50);
    }

    #[test]
    fn test_block_target_adjustments() {
        let config = config();
        let plain = Character::npc("orc", 1, 100);
        let mut hard = Character::npc("orc", 1, 100);
        if let Some(m) = hard.mob_mut() {
            m.flags.set(MobFlag::Hard);
        }
        let mut group = Character::npc("orc", 1, 100);
        if let Some(m) = group.mob_mut() {
            m.flags.set(MobFlag::Group);
        }
        // rating 100 vs target 100: capped at max
        assert_eq!(block_chance(&config, &plain, 100), 50);
        assert_eq!(block_chance(&config, &plain, 50), 25);
        // 50 * 50 / 110
        assert_eq!(block_chance(&config, &hard, 50), 23);
        // 50 * 50 / 130
        assert_eq!(block_chance(&config, &group, 50), 19);
    }
}
