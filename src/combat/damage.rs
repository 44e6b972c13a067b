//! The damage engine
//!
//! Every source of harm (weapons, abilities, DoTs, suffering) comes through
//! [`damage`]. Side effects happen in a fixed order and are not rolled back
//! on an early exit. An `Err(TargetGone)` means the victim is dead, gone
//! or knocked out, and the caller must stop treating it as a live target.

use crate::combat::attack::{AttackType, DamageType};
use crate::combat::death::{execute, stop_combat_no_autokill};
use crate::combat::engage::{set_fighting, stop_fighting};
use crate::combat::hooks::AbilityHook;
use crate::combat::messages::{dam_message, skill_message, SkillMessages};
use crate::core::types::{round_to_int, CharId};
use crate::entity::character::FightMode;
use crate::entity::flags::{Ability, AffFlag, Tech};
use crate::entity::position::{Position, DEAD_HEALTH};
use crate::world::{ArmorType, Audience, ObjKind, WearSlot, World};
use thiserror::Error;

/// The victim can no longer be referenced as a live target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("target is gone")]
pub struct TargetGone;

/// Damage actually dealt, or the victim is gone
pub type Strike = Result<i32, TargetGone>;

/// Experience a player earns for their armor when hit
const ARMOR_EXP: f64 = 1.0;

pub fn damage(
    world: &mut World,
    ch: CharId,
    victim: CharId,
    dam: i32,
    attack: AttackType,
    damtype: DamageType,
) -> Strike {
    damage_with(world, ch, victim, dam, attack, damtype, None)
}

/// [`damage`] with content-supplied skill messages
pub fn damage_with(
    world: &mut World,
    ch: CharId,
    victim: CharId,
    mut dam: i32,
    attack: AttackType,
    damtype: DamageType,
    custom: Option<&SkillMessages>,
) -> Strike {
    let hooks = world.hooks();

    let Some(v) = world.ch(victim) else {
        return Err(TargetGone);
    };
    if v.position == Position::Dead {
        if v.is_npc() {
            tracing::error!(%victim, name = %v.name, "damage() called on a dead NPC still in the world");
            crate::combat::death::die(world, victim, ch);
        }
        return Err(TargetGone);
    }
    let prior_pos = v.position;
    // Anyone taking damage is alive, so any earlier death is settled
    if let Some(v) = world.ch_mut(victim) {
        v.death_handled = false;
    }
    // A departed attacker hurts the victim as if self-inflicted
    let ch = if world.is_present(ch) { ch } else { victim };
    let other = ch != victim;

    if other {
        lock_instance_level(world, ch);
    }

    if is_immune(world, ch, victim, damtype) {
        dam = 0;
    }

    if other && world.same_room(ch, victim) {
        if world
            .ch(ch)
            .is_some_and(|c| c.position > Position::Stunned && c.fighting.is_none())
        {
            set_fighting(world, ch, victim, FightMode::Melee);
        }
        if world
            .ch(victim)
            .is_some_and(|v| v.position > Position::Stunned && v.fighting.is_none())
        {
            set_fighting(world, victim, ch, FightMode::Melee);
        }
    }

    if other {
        break_leash(world, ch, victim);
        reveal(world, ch);
    }

    dam = reduce_damage_from_skills(world, dam, victim, ch, damtype);

    let lethal = other
        && world
            .ch(victim)
            .is_some_and(|v| v.pools.health - dam <= DEAD_HEALTH);
    if lethal {
        hooks.run_ability_hooks(world, victim, AbilityHook::Dying, ch);
        if !world.is_present(victim) {
            return Err(TargetGone);
        }
    }

    dam = dam.max(0);
    let now = world.clock.now_micros();
    let position = match world.ch_mut(victim) {
        Some(v) => {
            v.pools.health -= dam;
            v.update_pos();
            v.position
        }
        None => return Err(TargetGone),
    };

    if other {
        if let Some(c) = world.ch_mut(ch) {
            c.meters.record_dealt(dam, now);
        }
        if let Some(v) = world.ch_mut(victim) {
            v.meters.record_taken(dam, now);
        }
    }

    let killed = position == Position::Dead;
    match attack.weapon() {
        Some(weapon) if dam > 0 && !killed && other => dam_message(world, dam, ch, victim, weapon),
        _ => skill_message(world, dam, ch, victim, attack, killed, custom),
    }

    position_message(world, victim, dam, position);

    if dam > 0 && other {
        if let Some(v) = world.ch_mut(victim) {
            if !v.tagged_by.contains(&ch) {
                v.tagged_by.push(ch);
            }
        }
        if let Some(ability) = armor_ability(world, victim) {
            hooks.gain_ability_exp(world, victim, ability, ARMOR_EXP);
        }
    }

    if other {
        hooks.run_ability_hooks(world, ch, AbilityHook::AnyDamage, victim);
        hooks.run_ability_hooks(world, ch, AbilityHook::DamageType(damtype), victim);
        if dam > 0 && world.ch(victim).is_some_and(|v| v.is_npc()) {
            hooks.hitprcnt_trigger(world, victim, ch);
        }
    }
    // Hooks may have healed, moved or removed the victim
    let Some(v) = world.ch(victim) else {
        return Err(TargetGone);
    };
    let position = v.position;

    if other && !v.is_npc() && !v.is_connected() && position > Position::Stunned {
        auto_flee(world, victim);
    }

    if position <= Position::Stunned && world.ch(victim).is_some_and(|v| v.fighting.is_some()) {
        stop_fighting(world, victim);
    }

    if position == Position::Dead {
        if hooks.convert_lethal_hit(world, ch, victim, attack) {
            stop_fighting(world, ch);
            return Ok(dam);
        }
        execute(world, ch, victim, attack, damtype, prior_pos <= Position::Incapacitated);
        return Err(TargetGone);
    }

    if position < Position::Sleeping && other && !hooks.would_execute(world, ch, victim) {
        stop_combat_no_autokill(world, ch, victim);
        return Err(TargetGone);
    }

    Ok(dam)
}

/// Freeze an instance's difficulty at its first attacker's level
fn lock_instance_level(world: &mut World, ch: CharId) {
    let Some((room, level)) = world.ch(ch).map(|c| (c.room, c.level)) else {
        return;
    };
    let Some(instance) = world.room(room).and_then(|r| r.instance) else {
        return;
    };
    if let Some(inst) = world.instances.get_mut(&instance) {
        if inst.lock_level_on_combat && inst.level.is_none() {
            inst.level = Some(level);
            tracing::debug!(?instance, level, "instance level locked by combat");
        }
    }
}

fn is_immune(world: &World, ch: CharId, victim: CharId, damtype: DamageType) -> bool {
    let (Some(c), Some(v)) = (world.ch(ch), world.ch(victim)) else {
        return false;
    };
    v.has_aff(AffFlag::Immune)
        || (v.has_aff(AffFlag::ImmunePhysical) && damtype == DamageType::Physical)
        || (v.is_immortal() && !c.is_immortal())
}

/// Attacking whoever you follow, or who follows you, ends the following
fn break_leash(world: &mut World, ch: CharId, victim: CharId) {
    if let Some(v) = world.ch_mut(victim) {
        if v.leader == Some(ch) {
            v.leader = None;
        }
    }
    if let Some(c) = world.ch_mut(ch) {
        if c.leader == Some(victim) {
            c.leader = None;
        }
    }
}

/// Attacking breaks invisibility and hiding
fn reveal(world: &mut World, ch: CharId) {
    let Some(c) = world.ch_mut(ch) else {
        return;
    };
    if !c.has_aff(AffFlag::Invisible) && !c.has_aff(AffFlag::Hide) {
        return;
    }
    c.aff_flags.remove(AffFlag::Invisible);
    c.aff_flags.remove(AffFlag::Hide);
    c.affects
        .retain(|af| !af.flags.has(AffFlag::Invisible) && !af.flags.has(AffFlag::Hide));
    world.act("You step out of concealment.", ch, None, Audience::Actor);
    world.act("$n slowly fades into existence.", ch, None, Audience::Room);
}

/// Apply resistances and damage-absorbing techs
///
/// Resistance is capped at half the attacker's level; a capped resist cuts
/// damage by `max_resist_reduction`. Negative resistance amplifies damage
/// on a diminishing curve toward `max_resist_penalty`.
pub fn reduce_damage_from_skills(
    world: &mut World,
    dam: i32,
    victim: CharId,
    attacker: CharId,
    damtype: DamageType,
) -> i32 {
    if dam <= 0 {
        return dam;
    }
    let config = &world.config;
    let (max_reduction, max_penalty) = (config.max_resist_reduction, config.max_resist_penalty);
    let attacker_level = world.ch(attacker).map(|a| a.level).unwrap_or(1);
    let Some(v) = world.ch_mut(victim) else {
        return dam;
    };

    if damtype == DamageType::Poison && v.has_tech(Tech::PoisonImmunity) {
        return 0;
    }
    if attacker == victim {
        return dam;
    }

    let resist = match damtype {
        DamageType::Physical => v.resist_physical(),
        DamageType::Magical => v.resist_magical(),
        DamageType::Fire | DamageType::Poison => {
            if v.has_tech(Tech::ResistElements) {
                v.resist_physical()
            } else {
                0
            }
        }
    };
    let cap = (attacker_level / 2).max(1);
    let resist = resist.min(cap);

    let mut amount = dam as f64;
    if resist > 0 {
        amount *= 1.0 - max_reduction * resist as f64 / cap as f64;
    } else if resist < 0 {
        let penalty = -resist as f64;
        amount *= 1.0 + max_penalty * penalty / (penalty + cap as f64);
    }
    let mut dam = round_to_int(amount);

    if damtype == DamageType::Magical && v.has_tech(Tech::ManaShield) && v.pools.mana > 0 {
        let absorbed = (dam / 2).min(v.pools.mana);
        v.pools.mana -= absorbed;
        dam -= absorbed;
    }
    dam
}

fn position_message(world: &mut World, victim: CharId, dam: i32, position: Position) {
    match position {
        Position::MortallyWounded => {
            world.act("$n is mortally wounded, and will die soon, if not aided.", victim, None, Audience::Room);
            world.act("You are mortally wounded, and will die soon, if not aided.", victim, None, Audience::Actor);
        }
        Position::Incapacitated => {
            world.act("$n is incapacitated and will slowly die, if not aided.", victim, None, Audience::Room);
            world.act("You are incapacitated and will slowly die, if not aided.", victim, None, Audience::Actor);
        }
        Position::Stunned => {
            world.act("$n is stunned, but will probably regain consciousness again.", victim, None, Audience::Room);
            world.act("You're stunned, but will probably regain consciousness again.", victim, None, Audience::Actor);
        }
        Position::Dead => {}
        _ => {
            let Some((health, max)) = world.ch(victim).map(|v| (v.pools.health, v.pools.max_health)) else {
                return;
            };
            if dam > 0 && dam >= max / 10 {
                world.send(victim, "That really did HURT!");
            }
            if dam > 0 && health <= max / 20 {
                world.send(victim, "You wish that your wounds would stop BLEEDING so much!");
            }
        }
    }
}

fn armor_ability(world: &World, victim: CharId) -> Option<Ability> {
    if world.ch(victim)?.is_npc() {
        return None;
    }
    match world.equipped(victim, WearSlot::Body)?.kind {
        ObjKind::Armor(ArmorType::Light) => Some(Ability::LightArmor),
        ObjKind::Armor(ArmorType::Medium) => Some(Ability::MediumArmor),
        ObjKind::Armor(ArmorType::Heavy) => Some(Ability::HeavyArmor),
        ObjKind::Armor(ArmorType::Mage) => Some(Ability::MageArmor),
        _ => None,
    }
}

/// A linkless player bolts through a random exit
pub fn auto_flee(world: &mut World, ch: CharId) {
    let Some(room) = world.ch(ch).map(|c| c.room) else {
        return;
    };
    let exits = world.room(room).map(|r| r.exits.clone()).unwrap_or_default();
    if exits.is_empty() {
        return;
    }
    let pick = world.roll(0, exits.len() as i32 - 1) as usize;
    world.act("$n panics, and attempts to flee!", ch, None, Audience::Room);
    stop_fighting(world, ch);
    world.move_char(ch, exits[pick]);
    world.send(ch, "You flee head over heels.");
}
