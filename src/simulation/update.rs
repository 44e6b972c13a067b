//! Real updates and point updates
//!
//! The real update runs every five seconds over every character. The point
//! update is the hourly bookkeeping pass; each real update runs it on one
//! shard of the characters so that everyone gets one per mud hour.

use crate::combat::attack::{AttackType, DamageType};
use crate::combat::damage::damage;
use crate::combat::death::{die, perform_execute};
use crate::combat::engage::check_pointless_fight;
use crate::core::clock::{REAL_UPDATES_PER_MUD_HOUR, SECS_PER_REAL_UPDATE};
use crate::core::types::{CharId, Handle, ObjId};
use crate::entity::affect::{Affect, AffectType, Apply};
use crate::entity::flags::{Ability, AffFlag, MobFlag, RoomFlag};
use crate::entity::position::Position;
use crate::world::{Audience, ObjLocation, World};

/// Experience a vampire earns per point update
const VAMPIRE_EXP: f64 = 1.0;

/// Run one real update
///
/// Order:
/// 1. Count the update (selects the point-update shard)
/// 2. Per character: DoTs, affects, feeding, player upkeep, regeneration
/// 3. Point update and NPC activity for this update's shard
/// 4. Expire old PK records
/// 5. Decay timed objects
pub fn real_update(world: &mut World) {
    world.clock.note_real_update();
    let shard = world.clock.real_updates() % REAL_UPDATES_PER_MUD_HOUR;
    let hooks = world.hooks();

    let ids: Vec<CharId> = world.chars.ids();
    for id in ids {
        if !world.is_present(id) {
            continue;
        }
        real_update_char(world, id);

        if !world.is_present(id) || id.shard() % REAL_UPDATES_PER_MUD_HOUR != shard {
            continue;
        }
        point_update_char(world, id);
        if world.ch(id).is_some_and(|c| c.is_npc() && c.position > Position::Stunned) {
            hooks.mobile_activity(world, id);
        }
    }

    prune_pk_records(world);
    decay_objects(world);
}

/// One character's share of the real update
pub fn real_update_char(world: &mut World, id: CharId) {
    if world.ch(id).map_or(true, |c| c.position == Position::Dead) {
        return;
    }
    if !tick_dots(world, id) {
        return;
    }
    expire_affects(world, id);
    continue_feeding(world, id);

    if world.ch(id).is_some_and(|c| !c.is_npc()) {
        update_conditions(world, id);
        strip_gear(world, id);
        if !check_swimming(world, id) || !check_blood_starvation(world, id) {
            return;
        }
        enforce_follower_cap(world, id);
        check_idle(world, id);
    }

    regenerate(world, id);
}

/// Apply every DoT once; false if the character did not survive
fn tick_dots(world: &mut World, id: CharId) -> bool {
    let Some(c) = world.ch_mut(id) else {
        return false;
    };
    let room = c.room;
    let ticks: Vec<(Option<CharId>, i32, DamageType)> = c
        .dots
        .iter()
        .map(|d| (d.caster, d.tick_damage(), d.damage_type))
        .collect();
    let mut ended = Vec::new();
    for dot in c.dots.iter_mut() {
        if dot.duration > 0 {
            dot.duration -= 1;
            if dot.duration == 0 {
                ended.push(dot.kind);
            }
        }
    }
    c.dots.retain(|d| d.duration != 0);
    for kind in ended {
        if let Some(msg) = kind.wear_off_message() {
            c.send(msg);
        }
    }

    for (caster, amount, damtype) in ticks {
        let attacker = match caster {
            Some(caster) if world.ch(caster).is_some_and(|c| c.room == room) => caster,
            Some(caster) => {
                tracing::debug!(%id, %caster, "DoT caster gone; ticking as self-inflicted");
                id
            }
            None => id,
        };
        if damage(world, attacker, id, amount, AttackType::Dot, damtype).is_err() {
            return false;
        }
    }
    world.is_present(id)
}

fn expire_affects(world: &mut World, id: CharId) {
    let immunity = world.config.stun_immunity_updates;
    let Some(c) = world.ch_mut(id) else {
        return;
    };
    let mut expired = Vec::new();
    for af in c.affects.iter_mut().filter(|af| !af.is_unlimited()) {
        af.duration -= 1;
        if af.duration <= 0 {
            expired.push(af.kind);
        }
    }
    c.affects.retain(|af| af.is_unlimited() || af.duration > 0);

    for kind in expired {
        if let Some(msg) = kind.wear_off_message() {
            c.send(msg);
        }
        // A stun that wears off leaves a short immunity behind
        if kind == AffectType::Stun && immunity > 0 {
            c.affects
                .push(Affect::new(AffectType::StunImmunity, immunity).with_flag(AffFlag::ImmuneStun));
        }
    }
}

/// Drain blood from whoever `id` is feeding on
fn continue_feeding(world: &mut World, id: CharId) {
    let Some(prey) = world.ch(id).and_then(|c| c.feeding_from) else {
        return;
    };
    if !world.same_room(id, prey) {
        if let Some(c) = world.ch_mut(id) {
            c.feeding_from = None;
        }
        if let Some(p) = world.ch_mut(prey) {
            p.fed_on_by = None;
        }
        return;
    }

    let want = world.config.feed_drain;
    let drained = match world.ch_mut(prey) {
        Some(p) => {
            let amount = want.min(p.pools.blood.max(0));
            p.pools.blood -= amount;
            amount
        }
        None => return,
    };
    if let Some(c) = world.ch_mut(id) {
        c.pools.blood = (c.pools.blood + drained).min(c.pools.max_blood);
    }
    world.act("You drink deeply from $N.", id, Some(prey), Audience::Actor);
    world.act("$n drinks your blood.", id, Some(prey), Audience::Victim);

    if world.ch(prey).is_some_and(|p| p.pools.blood <= 0) {
        if let Some(c) = world.ch_mut(id) {
            c.feeding_from = None;
        }
        world.act("$N falls limp in your arms.", id, Some(prey), Audience::Actor);
        die(world, prey, id);
    }
}

fn update_conditions(world: &mut World, id: CharId) {
    let max = world.config.max_condition;
    let Some(c) = world.ch_mut(id) else {
        return;
    };
    let Some(p) = c.player_data_mut() else {
        return;
    };
    let conditions = &mut p.conditions;
    for value in [&mut conditions.hunger, &mut conditions.thirst].into_iter().flatten() {
        *value = (*value + 1).min(max);
    }
    if let Some(drunk) = conditions.drunk.as_mut() {
        *drunk = (*drunk - 1).max(0);
    }
    let starving = conditions.hunger.is_some_and(|h| h >= max);
    let parched = conditions.thirst.is_some_and(|t| t >= max);
    if starving {
        c.send("You are starving!");
    }
    if parched {
        c.send("You are dying of thirst!");
    }
}

fn is_starving(world: &World, id: CharId) -> bool {
    let max = world.config.max_condition;
    world
        .ch(id)
        .and_then(|c| c.player_data())
        .is_some_and(|p| {
            p.conditions.hunger.is_some_and(|h| h >= max) || p.conditions.thirst.is_some_and(|t| t >= max)
        })
}

/// Take off gear the character is too weak to wear
fn strip_gear(world: &mut World, id: CharId) {
    let Some(c) = world.ch(id) else {
        return;
    };
    let strength = c.strength();
    let too_heavy: Vec<_> = c
        .equipment
        .iter()
        .filter(|(_, &obj)| world.obj(obj).is_some_and(|o| o.min_strength > strength))
        .map(|(&slot, &obj)| (slot, obj))
        .collect();
    for (slot, obj) in too_heavy {
        let name = world.obj(obj).map(|o| o.name.clone()).unwrap_or_default();
        world.unequip(id, slot);
        world.send(id, format!("You are too weak to keep using {name}."));
    }
}

/// Tiring swim; false if the character drowned
fn check_swimming(world: &mut World, id: CharId) -> bool {
    let (cost, percent) = (world.config.swim_move_cost, world.config.suffering_damage_percent);
    let Some(c) = world.ch(id) else {
        return false;
    };
    let in_water = world
        .room(c.room)
        .is_some_and(|r| r.flags.has(RoomFlag::Water));
    if !in_water || c.has_aff(AffFlag::Flying) || c.is_immortal() {
        return true;
    }
    let max_health = c.pools.max_health;
    let exhausted = match world.ch_mut(id) {
        Some(c) => {
            c.pools.move_points -= cost;
            if c.pools.move_points < 0 {
                c.pools.move_points = 0;
                true
            } else {
                false
            }
        }
        None => return false,
    };
    if !exhausted {
        return true;
    }
    world.send(id, "You are drowning!");
    let amount = (max_health * percent / 100).max(1);
    damage(world, id, id, amount, AttackType::Suffering, DamageType::Physical).is_ok()
}

/// Vampires with no blood left suffer; false if the character died
fn check_blood_starvation(world: &mut World, id: CharId) -> bool {
    let percent = world.config.suffering_damage_percent;
    let Some(c) = world.ch(id) else {
        return false;
    };
    if !c.is_vampire() || c.pools.blood > 0 {
        return true;
    }
    let amount = (c.pools.max_health * percent / 100).max(1);
    world.send(id, "You are starving for blood!");
    damage(world, id, id, amount, AttackType::Suffering, DamageType::Physical).is_ok()
}

/// NPC followers past the cap stop following
fn enforce_follower_cap(world: &mut World, id: CharId) {
    let limit = world.config.npc_follower_limit;
    let followers: Vec<CharId> = world
        .chars
        .iter()
        .filter(|(_, c)| c.is_npc() && c.leader == Some(id))
        .map(|(fid, _)| fid)
        .collect();
    for extra in followers.into_iter().skip(limit) {
        if let Some(f) = world.ch_mut(extra) {
            f.leader = None;
        }
        world.act("$n stops following you.", extra, Some(id), Audience::Victim);
    }
}

/// Disconnect idle players, unless they are in the middle of something
fn check_idle(world: &mut World, id: CharId) {
    let timeout = world.config.idle_timeout_updates;
    let Some(c) = world.ch_mut(id) else {
        return;
    };
    let busy = c.player_data().is_some_and(|p| p.action.is_some());
    let Some(desc) = c.desc.as_mut() else {
        return;
    };
    desc.idle_updates += 1;
    if desc.idle_updates <= timeout {
        return;
    }
    if busy {
        tracing::debug!(%id, "idle timeout deferred; player is busy");
        return;
    }
    c.desc = None;
    tracing::debug!(%id, name = %c.name, "idle player disconnected");
}

/// Per-update regeneration for one pool
///
/// Sleeping catches up so an empty pool refills within `sleep_refill_secs`.
fn regen_amount(base: i32, max: i32, position: Position, refill_secs: u64) -> i32 {
    match position {
        Position::Sleeping => {
            let updates = (refill_secs / SECS_PER_REAL_UPDATE).max(1) as i32;
            let catch_up = (max + updates - 1) / updates;
            base.max(catch_up)
        }
        Position::Resting => base * 2,
        Position::Sitting => base * 3 / 2,
        Position::Standing => base,
        _ => 0,
    }
}

fn regenerate(world: &mut World, id: CharId) {
    let config = &world.config;
    let (health, moves, mana, refill) = (
        config.health_regen,
        config.move_regen,
        config.mana_regen,
        config.sleep_refill_secs,
    );
    let starving = is_starving(world, id);
    let Some(c) = world.ch_mut(id) else {
        return;
    };
    if c.position == Position::Dead || c.has_aff(AffFlag::NoRegen) {
        return;
    }
    if c.fighting.is_some() || c.position == Position::Fighting {
        return;
    }
    if !c.is_npc() && starving {
        return;
    }

    // Downed characters claw back one point at a time; incapacitated NPCs
    // bleed in the point update instead
    if matches!(c.position, Position::Stunned | Position::Incapacitated) {
        if !c.is_npc() || c.position == Position::Stunned {
            c.pools.health += 1;
            c.recover_pos();
        }
        return;
    }

    let pos = c.position;
    let p = &mut c.pools;
    p.health = (p.health + regen_amount(health, p.max_health, pos, refill)).min(p.max_health);
    p.move_points = (p.move_points + regen_amount(moves, p.max_move, pos, refill)).min(p.max_move);
    p.mana = (p.mana + regen_amount(mana, p.max_mana, pos, refill)).min(p.max_mana);
}

/// One character's hourly bookkeeping
///
/// Order:
/// 1. Stable crowding (mounts wander off)
/// 2. Quest items of dropped quests vanish
/// 3. Overburdened players drop something
/// 4. Vampire experience
/// 5. Death-count decay
/// 6. Spawned NPCs with nobody nearby despawn
/// 7. Blood upkeep; running dry kills
/// 8. Downed NPCs and mortally wounded players bleed
/// 9. Pointless NPC fights end
pub fn point_update_char(world: &mut World, id: CharId) {
    let Some(c) = world.ch(id) else {
        return;
    };
    if c.position == Position::Dead {
        return;
    }
    let is_npc = c.is_npc();

    if is_npc {
        if check_stable_crowding(world, id) || check_spawn_despawn(world, id) {
            return;
        }
    } else {
        cleanup_quest_items(world, id);
        check_overburden(world, id);
        if world.ch(id).is_some_and(|c| c.is_vampire()) {
            world.hooks().gain_ability_exp(world, id, Ability::Vampire, VAMPIRE_EXP);
        }
        if let Some(p) = world.ch_mut(id).and_then(|c| c.player_data_mut()) {
            p.recent_deaths = (p.recent_deaths - 1).max(0);
        }
    }

    if !check_blood_upkeep(world, id) || !bleed_out(world, id) {
        return;
    }
    if is_npc {
        check_pointless_fight(world, id);
    }
}

/// Extra mounts in a full stable wander off; true if `id` left
fn check_stable_crowding(world: &mut World, id: CharId) -> bool {
    let capacity = world.config.stable_capacity;
    let Some(c) = world.ch(id).filter(|c| c.has_mob_flag(MobFlag::Mount) && c.leader.is_none()) else {
        return false;
    };
    let room = c.room;
    if !world.room(room).is_some_and(|r| r.flags.has(RoomFlag::Stable)) {
        return false;
    }
    let mounts = world
        .people_in(room)
        .into_iter()
        .filter(|&p| world.ch(p).is_some_and(|m| m.has_mob_flag(MobFlag::Mount)))
        .count();
    if mounts <= capacity {
        return false;
    }
    world.act("$n wanders off.", id, None, Audience::Room);
    world.extract_char(id);
    true
}

/// Spawned NPCs with no player in range despawn; true if `id` left
fn check_spawn_despawn(world: &mut World, id: CharId) -> bool {
    let range = world.config.spawn_despawn_distance;
    let Some(c) = world
        .ch(id)
        .filter(|c| c.has_mob_flag(MobFlag::Spawned) && c.fighting.is_none() && c.leader.is_none())
    else {
        return false;
    };
    let room = c.room;
    let player_near = world
        .chars
        .iter()
        .filter(|(_, p)| !p.is_npc())
        .any(|(_, p)| world.distance(room, p.room).is_some_and(|d| d <= range));
    if player_near {
        return false;
    }
    tracing::debug!(%id, "despawning spawned npc with no players nearby");
    world.extract_char(id);
    true
}

fn cleanup_quest_items(world: &mut World, id: CharId) {
    let Some(c) = world.ch(id) else {
        return;
    };
    let Some(quests) = c.player_data().map(|p| &p.quests) else {
        return;
    };
    let stale: Vec<ObjId> = c
        .inventory
        .iter()
        .chain(c.equipment.values())
        .copied()
        .filter(|&o| {
            world
                .obj(o)
                .and_then(|obj| obj.quest)
                .is_some_and(|q| !quests.contains(&q))
        })
        .collect();
    for obj in stale {
        let name = world.obj(obj).map(|o| o.name.clone()).unwrap_or_default();
        world.extract_obj(obj);
        world.send(id, format!("{name} vanishes."));
    }
}

/// Drop the most recently picked up item while carrying too much
fn check_overburden(world: &mut World, id: CharId) {
    let (base, per_str) = (world.config.carry_weight_base, world.config.carry_weight_per_strength);
    let Some(c) = world.ch(id) else {
        return;
    };
    let capacity = base + c.strength().max(0) * per_str;
    let room = c.room;
    if world.carried_weight(id) <= capacity {
        return;
    }
    let Some(&item) = world.ch(id).and_then(|c| c.inventory.last()) else {
        return;
    };
    let name = world.obj(item).map(|o| o.name.clone()).unwrap_or_default();
    world.obj_to_room(item, room);
    world.send(id, format!("You are overburdened and drop {name}."));
}

/// Pay blood upkeep; false if the character died of it
fn check_blood_upkeep(world: &mut World, id: CharId) -> bool {
    let Some(c) = world.ch_mut(id) else {
        return false;
    };
    let upkeep = c.apply_total(Apply::BloodUpkeep);
    if upkeep <= 0 {
        return true;
    }
    c.pools.blood -= upkeep;
    if c.pools.blood >= 0 {
        return true;
    }
    c.pools.blood = 0;
    world.send(id, "You have run out of blood!");
    perform_execute(world, id, id, AttackType::Suffering, DamageType::Physical);
    world.is_present(id) && world.ch(id).is_some_and(|c| c.position != Position::Dead)
}

/// Downed NPCs and mortally wounded players lose a point; false if dead
fn bleed_out(world: &mut World, id: CharId) -> bool {
    let bleeding = world.ch(id).is_some_and(|c| {
        (c.is_npc() && c.position < Position::Stunned) || c.position == Position::MortallyWounded
    });
    if !bleeding {
        return true;
    }
    damage(world, id, id, 1, AttackType::Suffering, DamageType::Physical).is_ok()
}

fn prune_pk_records(world: &mut World) {
    let now = world.clock.timestamp();
    let lifetime = world.config.pk_record_lifetime_secs;
    world.pk_records.retain(|_, records| {
        records.retain(|r| !r.is_expired(now, lifetime));
        !records.is_empty()
    });
}

/// Count down object timers; expired objects spill their contents
fn decay_objects(world: &mut World) {
    let mut expired = Vec::new();
    for id in world.objects.ids() {
        if let Some(timer) = world.obj_mut(id).and_then(|o| o.timer.as_mut()) {
            *timer -= 1;
            if *timer <= 0 {
                expired.push(id);
            }
        }
    }
    for id in expired {
        let Some((location, contents)) = world.obj(id).map(|o| (o.location, o.contents.clone())) else {
            continue;
        };
        if let ObjLocation::Room(room) = location {
            for inner in contents {
                world.obj_to_room(inner, room);
            }
        }
        world.extract_obj(id);
    }
}
