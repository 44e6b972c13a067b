//! Seams to the ability layer, the scripting layer and execution policy
//!
//! The engine calls these at fixed points and never implements their logic
//! itself. Hooks get `&mut World` and may do anything a command could,
//! including killing the characters involved, so every caller revalidates
//! its handles afterwards.

use crate::combat::attack::{AttackType, DamageType, WeaponAttack};
use crate::core::types::CharId;
use crate::entity::flags::{Ability, MobFlag, Pref};
use crate::entity::position::Position;
use crate::world::{Audience, World};

/// Ability-hook points fired on a character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityHook {
    /// Dealt any damage
    AnyDamage,
    /// Dealt damage of this type
    DamageType(DamageType),
    /// About to take a lethal hit
    Dying,
    /// Killed someone
    Kill,
}

pub trait CombatHooks {
    /// Skill experience from combat
    fn gain_ability_exp(&self, world: &mut World, ch: CharId, ability: Ability, amount: f64) {
        if let Some(c) = world.ch_mut(ch) {
            if !c.is_npc() {
                *c.skill_exp.entry(ability).or_insert(0.0) += amount;
            }
        }
    }

    fn run_ability_hooks(&self, _world: &mut World, _ch: CharId, _hook: AbilityHook, _other: CharId) {}

    /// Once per NPC round; false skips the swing
    fn fight_trigger(&self, _world: &mut World, _mob: CharId, _victim: CharId) -> bool {
        true
    }

    /// After an NPC takes damage
    fn hitprcnt_trigger(&self, _world: &mut World, _mob: CharId, _attacker: CharId) {}

    /// NPC death script; false suppresses the death cry
    fn death_trigger(&self, _world: &mut World, _victim: CharId, _killer: CharId) -> bool {
        true
    }

    /// Kill scripts in the room; false suppresses the death cry
    fn kill_triggers(&self, _world: &mut World, _victim: CharId, _killer: CharId) -> bool {
        true
    }

    /// Whether `ch` finishes off a helpless `victim` instead of knocking it out
    fn would_execute(&self, world: &World, ch: CharId, victim: CharId) -> bool {
        let Some(attacker) = world.ch(ch) else {
            return true;
        };
        if attacker.is_npc() {
            return true;
        }
        // Mobs are always finished off
        if world.ch(victim).is_some_and(|v| v.is_npc()) {
            return true;
        }
        attacker.has_pref(Pref::AutoKill)
    }

    /// Turn a lethal hit into some other state; true means the victim lives
    ///
    /// The stock behavior turns a killing vampire bite into feeding.
    fn convert_lethal_hit(
        &self,
        world: &mut World,
        ch: CharId,
        victim: CharId,
        attack: AttackType,
    ) -> bool {
        if attack != AttackType::Weapon(WeaponAttack::VampireBite) || ch == victim {
            return false;
        }
        if !world.ch(ch).is_some_and(|c| c.is_vampire()) {
            return false;
        }
        if let Some(v) = world.ch_mut(victim) {
            v.pools.health = 0;
            v.position = Position::Stunned;
            v.fed_on_by = Some(ch);
        }
        if let Some(c) = world.ch_mut(ch) {
            c.feeding_from = Some(victim);
        }
        world.act("You sink your teeth into $N and begin to feed.", ch, Some(victim), Audience::Actor);
        world.act("$n sinks $s teeth into you!", ch, Some(victim), Audience::Victim);
        world.act("$n sinks $s teeth into $N!", ch, Some(victim), Audience::Room);
        true
    }

    /// NPC AI, run on the point-update shard
    fn mobile_activity(&self, world: &mut World, mob: CharId) {
        if world.ch(mob).is_some_and(|m| m.has_mob_flag(MobFlag::Aggressive)) {
            crate::combat::engage::check_aggro(world, mob);
        }
    }
}

/// Stock hooks: no scripts, no ability content
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl CombatHooks for DefaultHooks {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::RoomId;
    use crate::entity::character::Character;
    use crate::world::room::Room;

    fn world() -> World {
        let mut world = World::new(GameConfig::default());
        world.add_room(Room::new(RoomId(1), "field"));
        world
    }

    #[test]
    fn test_would_execute_follows_autokill() {
        let mut world = world();
        let mut pc = Character::player("Ana", 50);
        if let Some(p) = pc.player_data_mut() {
            p.prefs.set(Pref::AutoKill);
        }
        let a = world.spawn(pc, RoomId(1));
        let b = world.spawn(Character::player("Bo", 50), RoomId(1));
        let mob = world.spawn(Character::npc("wolf", 1, 10), RoomId(1));

        let hooks = DefaultHooks;
        assert!(hooks.would_execute(&world, a, b));
        assert!(!hooks.would_execute(&world, b, a));
        assert!(hooks.would_execute(&world, b, mob));
        assert!(hooks.would_execute(&world, mob, b));
    }

    #[test]
    fn test_npc_gains_no_exp() {
        let mut world = world();
        let mob = world.spawn(Character::npc("wolf", 1, 10), RoomId(1));
        DefaultHooks.gain_ability_exp(&mut world, mob, Ability::Dodge, 1.0);
        assert!(world.ch(mob).is_some_and(|m| m.skill_exp.is_empty()));
    }
}
