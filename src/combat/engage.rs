//! Starting, stopping and joining fights
//!
//! `can_fight` is an ordered list of guards; the first that fails names the
//! reason. Callers decide whether to tell anyone.

use crate::combat::attack::DamageType;
use crate::combat::speed::slot_attack;
use crate::core::types::CharId;
use crate::entity::character::FightMode;
use crate::entity::flags::{AffFlag, MobFlag, Pref, RoomFlag};
use crate::entity::position::Position;
use crate::world::{Audience, WearSlot, World};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FightBlocked {
    #[error("You can't attack yourself.")]
    SelfTarget,
    #[error("They aren't here.")]
    NotHere,
    #[error("They're already dead.")]
    AlreadyDead,
    #[error("You feel too peaceful to contemplate violence.")]
    Peaceful,
    #[error("You can't attack that.")]
    NoAttack,
    #[error("You can't reach them.")]
    Earthmelded,
    #[error("You can't attack other players here.")]
    StartLocation,
    #[error("You can't attack an immortal.")]
    Immortal,
    #[error("They're already unconscious.")]
    Unconscious,
}

/// Whether `ch` may attack `victim` right now
pub fn can_fight(world: &World, ch: CharId, victim: CharId) -> Result<(), FightBlocked> {
    if ch == victim {
        return Err(FightBlocked::SelfTarget);
    }
    let (Some(c), Some(v)) = (world.ch(ch), world.ch(victim)) else {
        return Err(FightBlocked::NotHere);
    };
    if c.room != v.room {
        return Err(FightBlocked::NotHere);
    }
    if v.position == Position::Dead {
        return Err(FightBlocked::AlreadyDead);
    }
    let room_flags = world.room(c.room).map(|r| r.flags).unwrap_or_default();
    if room_flags.has(RoomFlag::Peaceful) && !c.is_immortal() {
        return Err(FightBlocked::Peaceful);
    }
    if v.has_mob_flag(MobFlag::NoAttack) || v.has_aff(AffFlag::NoAttack) || c.has_aff(AffFlag::NoAttack)
    {
        return Err(FightBlocked::NoAttack);
    }
    if v.has_aff(AffFlag::Earthmelded) || c.has_aff(AffFlag::Earthmelded) {
        return Err(FightBlocked::Earthmelded);
    }
    if room_flags.has(RoomFlag::StartLocation) && !c.is_npc() && !v.is_npc() {
        return Err(FightBlocked::StartLocation);
    }
    if v.is_immortal() && !c.is_immortal() {
        return Err(FightBlocked::Immortal);
    }
    if v.position <= Position::Incapacitated && !world.hooks().would_execute(world, ch, victim) {
        return Err(FightBlocked::Unconscious);
    }
    Ok(())
}

/// Set an NPC's level and health from its level range
pub fn scale_npc(world: &mut World, mob: CharId, level: i32) {
    let per_level = world.config.npc_health_per_level;
    let Some(c) = world.ch_mut(mob) else {
        return;
    };
    let Some((min, max)) = c.mob().map(|m| (m.min_level, m.max_level)) else {
        return;
    };
    let level = if max > 0 {
        level.clamp(min, max.max(min))
    } else {
        level.max(min)
    };
    let was_full = c.pools.health >= c.pools.max_health;
    let percent = c.health_percent();

    c.level = level;
    c.pools.max_health = (level * per_level).max(1);
    c.pools.health = if was_full {
        c.pools.max_health
    } else {
        c.pools.max_health * percent / 100
    };
    if let Some(m) = c.mob_mut() {
        m.scaled = true;
    }
}

/// Scale an unscaled NPC to whoever it is about to fight
pub fn check_scaling(world: &mut World, mob: CharId, other: CharId) {
    let unscaled = world
        .ch(mob)
        .and_then(|c| c.mob())
        .is_some_and(|m| !m.scaled);
    if !unscaled {
        return;
    }
    let level = match world.ch(other) {
        Some(o) if other != mob => o.level,
        _ => world
            .ch(mob)
            .and_then(|c| c.mob())
            .map(|m| m.min_level)
            .unwrap_or(1),
    };
    scale_npc(world, mob, level);
}

/// Start `ch` fighting `victim`; no-op if `ch` already has a target
pub fn set_fighting(world: &mut World, ch: CharId, victim: CharId, mode: FightMode) {
    if ch == victim || !world.is_present(victim) {
        return;
    }
    match world.ch(ch) {
        Some(c) if c.fighting.is_none() => {}
        _ => return,
    }
    check_scaling(world, ch, victim);
    check_scaling(world, victim, ch);

    if let Some(c) = world.ch_mut(ch) {
        c.fighting = Some(victim);
        c.fight_mode = mode;
        c.in_combat_list = true;
        if c.position == Position::Standing {
            c.position = Position::Fighting;
        }
    }
    world.combat.add(ch);
    tracing::debug!(%ch, %victim, ?mode, "joined combat");
}

/// Change fight mode mid-fight (kite, charge)
pub fn set_fight_mode(world: &mut World, ch: CharId, mode: FightMode) {
    if let Some(c) = world.ch_mut(ch) {
        if c.fighting.is_some() {
            c.fight_mode = mode;
        }
    }
}

fn is_targeted(world: &World, id: CharId) -> bool {
    world
        .combat
        .snapshot()
        .into_iter()
        .any(|m| world.ch(m).is_some_and(|c| c.fighting == Some(id)))
}

/// Close the meter session once nobody is fighting on either side
fn finish_meters_if_idle(world: &mut World, id: CharId) {
    let fighting = world.ch(id).is_some_and(|c| c.fighting.is_some());
    if fighting || is_targeted(world, id) {
        return;
    }
    let now = world.clock.now_micros();
    if let Some(c) = world.ch_mut(id) {
        c.meters.finish(now);
    }
}

/// Take `ch` out of combat; anyone fighting `ch` is left alone
pub fn stop_fighting(world: &mut World, ch: CharId) {
    world.combat.remove(ch);
    let Some(c) = world.ch_mut(ch) else {
        return;
    };
    let former = c.fighting.take();
    c.in_combat_list = false;
    c.fight_mode = FightMode::Melee;
    if c.position == Position::Fighting {
        c.position = Position::Standing;
    }
    tracing::debug!(%ch, "left combat");

    finish_meters_if_idle(world, ch);
    if let Some(f) = former {
        finish_meters_if_idle(world, f);
    }
}

/// Stop everyone (in the registry) who is fighting `victim`
pub fn stop_attackers(world: &mut World, victim: CharId) {
    for id in world.combat.snapshot() {
        if world.ch(id).is_some_and(|c| c.fighting == Some(victim)) {
            stop_fighting(world, id);
        }
    }
}

/// Both sides engage: the attacker in melee or missile mode, the victim
/// in melee, or closing distance if shot at
pub fn engage_combat(world: &mut World, ch: CharId, victim: CharId, ranged: bool) -> Result<(), FightBlocked> {
    can_fight(world, ch, victim)?;
    let mode = if ranged {
        FightMode::Missile
    } else {
        FightMode::Melee
    };
    set_fighting(world, ch, victim, mode);

    let victim_free = world
        .ch(victim)
        .is_some_and(|v| v.fighting.is_none() && v.is_awake());
    if victim_free {
        let reply = if ranged {
            FightMode::waiting(world.config.close_distance_rounds)
        } else {
            FightMode::Melee
        };
        set_fighting(world, victim, ch, reply);
    }
    Ok(())
}

/// On the same side: self, groupmates, leader and followers, empire-mates,
/// or two free NPCs. Open hostility between the pair overrides all of it.
pub fn is_fight_ally(world: &World, ch: CharId, other: CharId) -> bool {
    if ch == other {
        return true;
    }
    let (Some(a), Some(b)) = (world.ch(ch), world.ch(other)) else {
        return false;
    };
    if a.fighting == Some(other) || b.fighting == Some(ch) {
        return false;
    }
    if a.group.is_some() && a.group == b.group {
        return true;
    }
    if a.leader == Some(other) || b.leader == Some(ch) || (a.leader.is_some() && a.leader == b.leader) {
        return true;
    }
    if a.empire.is_some() && a.empire == b.empire {
        return true;
    }
    a.is_npc() && b.is_npc() && a.leader.is_none() && b.leader.is_none()
}

/// Fighting `ch`, fought by `ch`, or fighting one of `ch`'s allies
pub fn is_fight_enemy(world: &World, ch: CharId, other: CharId) -> bool {
    if is_fight_ally(world, ch, other) {
        return false;
    }
    let (Some(a), Some(b)) = (world.ch(ch), world.ch(other)) else {
        return false;
    };
    if b.fighting == Some(ch) || a.fighting == Some(other) {
        return true;
    }
    b.fighting
        .is_some_and(|target| target != other && is_fight_ally(world, ch, target))
}

/// `ch` takes over `vict`'s fight with `from`
pub fn perform_rescue(world: &mut World, ch: CharId, vict: CharId, from: CharId) {
    world.act("Banzai! You rescue $N!", ch, Some(vict), Audience::Actor);
    world.act("You are rescued by $n!", ch, Some(vict), Audience::Victim);
    world.act("$n heroically rescues $N!", ch, Some(vict), Audience::Room);

    if world.ch(vict).is_some_and(|v| v.fighting == Some(from)) {
        stop_fighting(world, vict);
    }
    if world.ch(from).is_some_and(|f| f.fighting.is_some()) {
        stop_fighting(world, from);
    }
    if world.ch(ch).is_some_and(|c| c.fighting.is_some()) {
        stop_fighting(world, ch);
    }
    set_fighting(world, ch, from, FightMode::Melee);
    set_fighting(world, from, ch, FightMode::Melee);
}

/// Bring idle allies in the room into `ch`'s fight
pub fn check_auto_assist(world: &mut World, ch: CharId) {
    let Some((target, room, empire, group, leader)) = world
        .ch(ch)
        .and_then(|c| Some((c.fighting?, c.room, c.empire, c.group, c.leader)))
    else {
        return;
    };

    for person in world.people_in(room) {
        if person == ch || person == target {
            continue;
        }
        let Some(p) = world.ch(person) else {
            continue;
        };
        if p.fighting.is_some() || p.position < Position::Standing {
            continue;
        }
        let assists = if p.is_npc() {
            p.leader == Some(ch)
                || (p.has_mob_flag(MobFlag::EmpireGuard) && p.empire.is_some() && p.empire == empire)
        } else {
            p.has_pref(Pref::AutoAssist)
                && ((group.is_some() && p.group == group)
                    || p.leader == Some(ch)
                    || leader == Some(person))
        };
        if !assists || is_fight_ally(world, person, target) {
            continue;
        }
        if engage_combat(world, person, target, false).is_ok() {
            world.act("You jump to $N's aid!", person, Some(ch), Audience::Actor);
            world.act("$n jumps to $N's aid!", person, Some(ch), Audience::Room);
        }
    }
}

/// Whether anything `attacker` does could hurt `victim`
pub fn can_damage(world: &World, attacker: CharId, victim: CharId) -> bool {
    let (Some(a), Some(v)) = (world.ch(attacker), world.ch(victim)) else {
        return false;
    };
    if v.has_aff(AffFlag::Immune) {
        return false;
    }
    if v.is_immortal() && !a.is_immortal() {
        return false;
    }
    if v.has_aff(AffFlag::ImmunePhysical) {
        let attack = slot_attack(world, attacker, WearSlot::Wield);
        if attack.info().damage_type == DamageType::Physical {
            return false;
        }
    }
    true
}

/// Cancel an NPC's fight when no one involved can hurt anyone
pub fn check_pointless_fight(world: &mut World, mob: CharId) -> bool {
    let Some((target, room)) = world
        .ch(mob)
        .filter(|m| m.is_npc())
        .and_then(|m| Some((m.fighting?, m.room)))
    else {
        return false;
    };
    if can_damage(world, mob, target) {
        return false;
    }
    let attackers: Vec<CharId> = world
        .people_in(room)
        .into_iter()
        .filter(|&p| world.ch(p).is_some_and(|c| c.fighting == Some(mob)))
        .collect();
    if attackers.iter().any(|&a| can_damage(world, a, mob)) {
        return false;
    }

    tracing::debug!(%mob, "cancelling pointless fight");
    stop_fighting(world, mob);
    for a in attackers {
        stop_fighting(world, a);
    }
    true
}

/// Aggressive NPCs pick the first visible mortal player in the room
pub fn check_aggro(world: &mut World, mob: CharId) {
    let Some(room) = world
        .ch(mob)
        .filter(|m| m.fighting.is_none() && m.is_awake() && m.leader.is_none())
        .map(|m| m.room)
    else {
        return;
    };
    for person in world.people_in(room) {
        let eligible = match (world.ch(mob), world.ch(person)) {
            (Some(m), Some(p)) => person != mob && !p.is_npc() && !p.is_immortal() && m.can_see(p),
            _ => false,
        };
        if eligible && engage_combat(world, mob, person, false).is_ok() {
            world.act("$n attacks you!", mob, Some(person), Audience::Victim);
            world.act("$n attacks $N!", mob, Some(person), Audience::Room);
            return;
        }
    }
}
