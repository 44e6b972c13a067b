//! Execution and death
//!
//! A fatal blow first goes through the execution policy, which may turn it
//! into a knockout. Only then does `die` run, and `die` tolerates being
//! called on characters that are already gone.

use crate::combat::attack::{AttackType, DamageType};
use crate::combat::engage::{check_scaling, stop_attackers, stop_fighting};
use crate::combat::hooks::AbilityHook;
use crate::core::types::{AccountId, CharId, ObjId};
use crate::entity::character::{Cooldown, LoreEntry, LoreKind};
use crate::entity::flags::MobFlag;
use crate::entity::position::Position;
use crate::world::{Audience, CorpseData, CorpseOwner, ObjKind, Object, PkRecord, World};

/// Longest leader chain walked when crediting a kill
const MAX_LEADER_DEPTH: usize = 8;

/// Knock `victim` out instead of killing it
///
/// Attackers who would finish the job keep fighting; everyone else stops.
pub fn stop_combat_no_autokill(world: &mut World, ch: CharId, victim: CharId) {
    let hooks = world.hooks();
    for id in world.combat.snapshot() {
        let attacking = world.ch(id).is_some_and(|c| c.fighting == Some(victim));
        if attacking && !hooks.would_execute(world, id, victim) {
            stop_fighting(world, id);
        }
    }
    stop_fighting(world, victim);

    if let Some(v) = world.ch_mut(victim) {
        v.pools.health = -1;
        v.position = Position::Incapacitated;
    }
    if ch != victim {
        world.act("You knock $N unconscious.", ch, Some(victim), Audience::Actor);
        world.act("$n knocks you unconscious!", ch, Some(victim), Audience::Victim);
        world.act("$n knocks $N unconscious.", ch, Some(victim), Audience::Room);
    } else {
        world.act("You fall unconscious.", victim, None, Audience::Actor);
        world.act("$n falls unconscious.", victim, None, Audience::Room);
    }
}

/// Decide whether a fatal blow kills; true if `victim` died
pub fn perform_execute(
    world: &mut World,
    ch: CharId,
    victim: CharId,
    attack: AttackType,
    damtype: DamageType,
) -> bool {
    let already_down = world
        .ch(victim)
        .is_some_and(|v| v.position <= Position::Incapacitated);
    execute(world, ch, victim, attack, damtype, already_down)
}

/// `already_down` is the victim's state before the blow landed
pub(crate) fn execute(
    world: &mut World,
    ch: CharId,
    victim: CharId,
    attack: AttackType,
    damtype: DamageType,
    already_down: bool,
) -> bool {
    let hooks = world.hooks();
    let Some(v) = world.ch(victim) else {
        return false;
    };
    let proceed = v.has_mob_flag(MobFlag::NoUnconscious)
        || ch == victim
        || attack.is_ability()
        || hooks.would_execute(world, ch, victim)
        || already_down
        || attack == AttackType::Undefined;
    if !proceed {
        stop_combat_no_autokill(world, ch, victim);
        return false;
    }

    revert_disguise(world, victim);
    for (hunter, prey) in [(ch, victim), (victim, ch)] {
        if let Some(h) = world.ch_mut(hunter) {
            if h.hunting == Some(prey) {
                h.hunting = None;
            }
        }
    }

    log_death(world, ch, victim, attack, damtype);

    for id in world.combat.snapshot() {
        if id == ch {
            continue;
        }
        let player_attacker = world
            .ch(id)
            .is_some_and(|c| !c.is_npc() && c.fighting == Some(victim));
        if player_attacker {
            stop_fighting(world, id);
        }
    }

    record_lore(world, ch, victim);
    die(world, victim, ch);
    true
}

fn revert_disguise(world: &mut World, victim: CharId) {
    let Some(v) = world.ch_mut(victim) else {
        return;
    };
    let morphed = v.morph.take().is_some();
    let disguised = v.disguise.take().is_some();
    if morphed || disguised {
        world.act("$n reverts to $s natural form.", victim, None, Audience::Room);
    }
}

fn log_death(world: &World, ch: CharId, victim: CharId, attack: AttackType, damtype: DamageType) {
    let Some(v) = world.ch(victim) else {
        return;
    };
    let killer = world.ch(ch);
    let room = v.room;
    if attack == AttackType::GuardTower {
        tracing::info!(victim = %v.name, %room, "killed by a guard tower");
    } else if ch == victim {
        tracing::info!(victim = %v.name, %room, cause = death_cause(attack, damtype), "died");
    } else if let Some(k) = killer.filter(|k| !k.is_npc() && !v.is_npc()) {
        tracing::info!(victim = %v.name, killer = %k.name, %room, ?damtype, "player killed by player");
    } else if !v.is_npc() {
        tracing::info!(victim = %v.name, killer = %world.name(ch), %room, ?damtype, "player killed");
    } else {
        tracing::debug!(victim = %v.name, killer = %world.name(ch), %room, ?damtype, "npc killed");
    }
}

/// What a self-inflicted or unattributed death is blamed on in the log
pub(crate) fn death_cause(attack: AttackType, damtype: DamageType) -> &'static str {
    match (attack, damtype) {
        (AttackType::Dot, DamageType::Poison) => "poison",
        (AttackType::Dot, DamageType::Fire) => "burns",
        (AttackType::Dot, _) => "lingering wounds",
        (AttackType::Suffering, _) => "suffering",
        _ => "wounds",
    }
}

fn record_lore(world: &mut World, ch: CharId, victim: CharId) {
    let now = world.clock.timestamp();
    let killer_name = world.name(ch);
    let victim_name = world.name(victim);
    if ch == victim {
        return;
    }
    if let Some(p) = world.ch_mut(victim).and_then(|v| v.player_data_mut()) {
        p.lore.push(LoreEntry {
            kind: LoreKind::Death,
            text: format!("Killed by {killer_name}"),
            timestamp: now,
        });
    }
    if let Some(p) = world.ch_mut(ch).and_then(|c| c.player_data_mut()) {
        p.lore.push(LoreEntry {
            kind: LoreKind::Kill,
            text: format!("Killed {victim_name}"),
            timestamp: now,
        });
    }
}

/// Walk pets and charmed followers up to the player who owns them
fn responsible_killer(world: &World, killer: CharId) -> CharId {
    let mut current = killer;
    for _ in 0..MAX_LEADER_DEPTH {
        match world.ch(current) {
            Some(c) if c.is_npc() => match c.leader {
                Some(leader) if world.is_present(leader) => current = leader,
                _ => break,
            },
            _ => break,
        }
    }
    current
}

/// Kill a character for good
///
/// Players stay in the world in the `Dead` position; NPCs are extracted
/// and their corpse, if any, is returned. Calling this on a character that
/// is already gone (or a player whose death was already processed) does
/// nothing.
pub fn die(world: &mut World, ch: CharId, killer: CharId) -> Option<ObjId> {
    let victim = world.ch(ch)?;
    if victim.death_handled && victim.position == Position::Dead {
        return None;
    }
    let hooks = world.hooks();
    let killer = if world.is_present(killer) { killer } else { ch };
    let responsible = responsible_killer(world, killer);

    check_scaling(world, ch, killer);
    if let Some(v) = world.ch_mut(ch) {
        v.dots.clear();
    }

    if killer != ch {
        hooks.run_ability_hooks(world, killer, AbilityHook::Kill, ch);
        if !world.is_present(ch) {
            return None;
        }
    }

    if try_auto_resurrect(world, ch) {
        return None;
    }

    check_distrust(world, ch, responsible);
    notify_group(world, ch);

    // Nothing survives death: upkeep, mount, fights, affects, summons
    if let Some(v) = world.ch_mut(ch) {
        v.morph = None;
        v.disguise = None;
        v.affects.retain(|af| !af.kind.is_blood_upkeep());
        v.mount = None;
    }
    stop_fighting(world, ch);
    stop_attackers(world, ch);
    if let Some(v) = world.ch_mut(ch) {
        v.affects.clear();
        v.feeding_from = None;
    }
    despawn_summons(world, ch);

    if world.ch(ch).is_some_and(|v| v.is_npc()) {
        npc_death(world, ch, killer, responsible)
    } else {
        player_death(world, ch, killer, responsible);
        None
    }
}

fn try_auto_resurrect(world: &mut World, ch: CharId) -> bool {
    let Some(v) = world.ch_mut(ch) else {
        return false;
    };
    let Some(percent) = v.auto_resurrect.take() else {
        return false;
    };
    let percent = percent.clamp(1, 100);
    v.pools.health = (v.pools.max_health * percent / 100).max(1);
    v.pools.move_points = v.pools.max_move * percent / 100;
    v.pools.mana = v.pools.max_mana * percent / 100;
    v.position = Position::Standing;
    let name = v.name.clone();

    stop_fighting(world, ch);
    stop_attackers(world, ch);
    world.act("You are restored to life!", ch, None, Audience::Actor);
    world.act("$n is restored to life!", ch, None, Audience::Room);
    tracing::info!(victim = %name, percent, "auto-resurrected");
    true
}

/// A player killing another empire's member outside a war sours relations
fn check_distrust(world: &mut World, victim: CharId, responsible: CharId) {
    if responsible == victim {
        return;
    }
    let Some(killer_empire) = world
        .ch(responsible)
        .filter(|k| !k.is_npc())
        .and_then(|k| k.empire)
    else {
        return;
    };
    let Some((victim_empire, victim_target)) = world.ch(victim).and_then(|v| Some((v.empire?, v.fighting))) else {
        return;
    };
    if victim_empire == killer_empire {
        return;
    }
    let at_war = world
        .empires
        .get(&victim_empire)
        .is_some_and(|e| e.is_at_war_with(killer_empire));
    // The victim started it by attacking one of the killer's empire-mates
    let provoked = victim_target
        .and_then(|t| world.ch(t))
        .is_some_and(|t| t.empire == Some(killer_empire));
    if at_war || provoked {
        return;
    }
    if let Some(e) = world.empires.get_mut(&victim_empire) {
        if e.distrust.insert(killer_empire) {
            tracing::info!(empire = %victim_empire, toward = %killer_empire, "empire distrust raised");
        }
    }
}

fn notify_group(world: &mut World, ch: CharId) {
    let Some(group) = world.ch(ch).and_then(|c| c.group) else {
        return;
    };
    let members = world
        .groups
        .get(&group)
        .map(|g| g.members.clone())
        .unwrap_or_default();
    let text = format!("{} has died.", world.name(ch));
    for m in members.into_iter().filter(|&m| m != ch) {
        world.send(m, text.clone());
    }
}

fn despawn_summons(world: &mut World, ch: CharId) {
    let summons: Vec<CharId> = world
        .chars
        .iter()
        .filter(|(_, c)| c.leader == Some(ch) && c.has_mob_flag(MobFlag::Summoned))
        .map(|(id, _)| id)
        .collect();
    for pet in summons {
        world.act("$n fades away.", pet, None, Audience::Room);
        world.extract_char(pet);
    }
}

fn player_death(world: &mut World, ch: CharId, killer: CharId, responsible: CharId) {
    let hooks = world.hooks();
    world.send(ch, "You are dead! Sorry...");
    world.act("$n is dead! R.I.P.", ch, None, Audience::Room);

    let now = world.clock.timestamp();
    if killer != ch {
        record_pk(world, ch, responsible, now);
    }

    let sentinel = world.config.dead_health_sentinel;
    let respawn_at = now + world.config.respawn_cooldown_secs;
    if let Some(v) = world.ch_mut(ch) {
        v.cooldowns.insert(Cooldown::Respawn, respawn_at);
        if let Some(p) = v.player_data_mut() {
            p.recent_deaths += 1;
        }
        v.pools.health = sentinel;
        v.position = Position::Dead;
        v.death_handled = true;
    }
    hooks.kill_triggers(world, ch, killer);
}

/// Upsert the victim's PK record for this killer
fn record_pk(world: &mut World, victim: CharId, responsible: CharId, now: u64) {
    let Some(account) = world.ch(victim).and_then(|v| v.account()) else {
        return;
    };
    let Some(k) = world.ch(responsible) else {
        return;
    };
    let killer = k.account();
    let empire = k.empire;
    if killer.is_none() && empire.is_none() {
        return;
    }
    let records = world.pk_records.entry(account).or_default();
    match records
        .iter_mut()
        .find(|r| r.killer == killer && r.empire == empire)
    {
        Some(existing) => existing.timestamp = now,
        None => records.push(PkRecord {
            killer,
            empire,
            timestamp: now,
        }),
    }
}

/// Players credited with a kill: taggers and the players leading them,
/// plus groupmates standing in the room
fn expand_tags(world: &World, ch: CharId) -> Vec<CharId> {
    let Some(v) = world.ch(ch) else {
        return Vec::new();
    };
    let room = v.room;
    let mut credited: Vec<CharId> = Vec::new();
    for &tagger in &v.tagged_by {
        let player = responsible_killer(world, tagger);
        if world.ch(player).is_some_and(|p| !p.is_npc()) && !credited.contains(&player) {
            credited.push(player);
        }
    }
    let groups: Vec<_> = credited
        .iter()
        .filter_map(|&p| world.ch(p).and_then(|c| c.group))
        .collect();
    for person in world.people_in(room) {
        let in_group = world
            .ch(person)
            .is_some_and(|p| !p.is_npc() && p.group.is_some_and(|g| groups.contains(&g)));
        if in_group && !credited.contains(&person) {
            credited.push(person);
        }
    }
    credited
}

fn npc_death(world: &mut World, ch: CharId, killer: CharId, responsible: CharId) -> Option<ObjId> {
    let hooks = world.hooks();

    // Scripts only fire on a standing mob
    if let Some(v) = world.ch_mut(ch) {
        v.position = Position::Standing;
    }
    let cry = hooks.death_trigger(world, ch, killer) && hooks.kill_triggers(world, ch, killer);
    let v = world.ch_mut(ch)?;
    v.position = Position::Dead;
    if cry {
        world.act("$n is dead! R.I.P.", ch, None, Audience::Room);
        world.act("Your blood freezes as you hear $n's death cry.", ch, None, Audience::Room);
    }

    let (room, empire, faction, size, vnum, name, loot) = {
        let v = world.ch(ch)?;
        let mob = v.mob()?;
        (v.room, v.empire, mob.faction, mob.size, mob.vnum, v.name.clone(), mob.loot.clone())
    };

    if let Some(e) = empire.and_then(|e| world.empires.get_mut(&e)) {
        e.citizen_deaths += 1;
    }

    let credited = expand_tags(world, ch);
    if let Some(change) = faction.and_then(|f| world.factions.get(&f)).map(|f| (f.id, f.kill_reputation)) {
        for &player in &credited {
            let present = world.ch(player).is_some_and(|p| p.room == room);
            if let Some(p) = world.ch_mut(player).filter(|_| present).and_then(|p| p.player_data_mut()) {
                *p.reputation.entry(change.0).or_insert(0) += change.1;
            }
        }
    }

    for entry in loot {
        if world.roll(1, 100) <= entry.chance as i32 {
            let item = world.create_obj(Object::new(entry.vnum, &entry.name, ObjKind::Other));
            world.obj_to_char(item, ch);
        }
    }

    let carried: Vec<ObjId> = world
        .ch(ch)
        .map(|v| {
            let mut all = v.inventory.clone();
            all.extend(v.equipment.values().copied());
            all
        })
        .unwrap_or_default();

    let corpse = if world.ch(ch).is_some_and(|v| v.has_mob_flag(MobFlag::NoCorpse)) {
        for item in carried {
            world.obj_to_room(item, room);
        }
        None
    } else {
        let mut body = Object::new(
            vnum,
            &format!("the corpse of {name}"),
            ObjKind::Corpse(CorpseData {
                owner: CorpseOwner::Npc {
                    vnum,
                    name: name.clone(),
                },
                size,
            }),
        );
        body.timer = Some(world.config.npc_corpse_timer);
        body.bound_to = credited
            .iter()
            .filter_map(|&p| world.ch(p).and_then(|c| c.account()))
            .collect::<Vec<AccountId>>();
        let corpse = world.create_obj(body);
        for item in carried {
            world.obj_to_obj(item, corpse);
        }
        world.obj_to_room(corpse, room);
        Some(corpse)
    };

    world.extract_char(ch);
    corpse
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::{EmpireId, FactionId, RoomId};
    use crate::entity::character::{Character, LootEntry};
    use crate::entity::flags::Pref;
    use crate::world::{Empire, Faction, Room, WearSlot};

    fn world() -> World {
        let mut world = World::new(GameConfig::default());
        world.add_room(Room::new(RoomId(1), "field"));
        world
    }

    fn corpse_contents(world: &World, corpse: ObjId) -> Vec<String> {
        world
            .obj(corpse)
            .map(|c| {
                c.contents
                    .iter()
                    .filter_map(|&o| world.obj(o))
                    .map(|o| o.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_npc_death_leaves_corpse_with_gear() {
        let mut world = world();
        let killer = world.spawn(Character::player("Ana", 10), RoomId(1));
        let wolf = world.spawn(Character::npc("wolf", 7, 10), RoomId(1));
        let fang = world.create_obj(Object::weapon("a fang", crate::combat::attack::WeaponAttack::Bite, 3));
        world.equip(wolf, fang, WearSlot::Wield);
        if let Some(w) = world.ch_mut(wolf) {
            w.tagged_by.push(killer);
        }

        let corpse = die(&mut world, wolf, killer).expect("corpse");
        assert!(world.ch(wolf).is_none());
        let body = world.obj(corpse).expect("corpse object");
        assert!(body.is_corpse());
        assert_eq!(body.timer, Some(world.config.npc_corpse_timer));
        assert_eq!(body.bound_to, vec![world.ch(killer).and_then(|c| c.account()).expect("account")]);
        assert_eq!(corpse_contents(&world, corpse), vec!["a fang".to_string()]);
        assert!(world.room(RoomId(1)).is_some_and(|r| r.contents().contains(&corpse)));
    }

    #[test]
    fn test_die_twice_is_noop() {
        let mut world = world();
        let killer = world.spawn(Character::player("Ana", 10), RoomId(1));
        let wolf = world.spawn(Character::npc("wolf", 7, 10), RoomId(1));
        assert!(die(&mut world, wolf, killer).is_some());
        let objects = world.objects.len();
        assert!(die(&mut world, wolf, killer).is_none());
        assert_eq!(world.objects.len(), objects);
    }

    #[test]
    fn test_no_corpse_drops_gear_to_room() {
        let mut world = world();
        let killer = world.spawn(Character::player("Ana", 10), RoomId(1));
        let mut wisp = Character::npc("wisp", 8, 10);
        if let Some(m) = wisp.mob_mut() {
            m.flags.set(MobFlag::NoCorpse);
        }
        let wisp = world.spawn(wisp, RoomId(1));
        let gem = world.create_obj(Object::new(9, "a gem", ObjKind::Other));
        world.obj_to_char(gem, wisp);

        assert!(die(&mut world, wisp, killer).is_none());
        assert!(world.room(RoomId(1)).is_some_and(|r| r.contents() == [gem]));
    }

    #[test]
    fn test_loot_table_rolls_into_corpse() {
        let mut world = world();
        let killer = world.spawn(Character::player("Ana", 10), RoomId(1));
        let mut boar = Character::npc("boar", 9, 10);
        if let Some(m) = boar.mob_mut() {
            m.loot.push(LootEntry {
                vnum: 50,
                name: "a tusk".into(),
                chance: 100,
            });
        }
        let boar = world.spawn(boar, RoomId(1));
        let corpse = die(&mut world, boar, killer).expect("corpse");
        assert_eq!(corpse_contents(&world, corpse), vec!["a tusk".to_string()]);
    }

    #[test]
    fn test_player_death_stays_in_world() {
        let mut world = world();
        let wolf = world.spawn(Character::npc("wolf", 7, 10), RoomId(1));
        let pc = world.spawn(Character::player("Ana", 10), RoomId(1));
        assert!(die(&mut world, pc, wolf).is_none());

        let ana = world.ch(pc).expect("player persists");
        assert_eq!(ana.position, Position::Dead);
        assert_eq!(ana.pools.health, world.config.dead_health_sentinel);
        assert!(ana.cooldowns.contains_key(&Cooldown::Respawn));
        assert_eq!(ana.player_data().map(|p| p.recent_deaths), Some(1));
        // NPC without an empire leaves no PK record
        assert!(world.pk_records.is_empty());
    }

    #[test]
    fn test_pvp_death_records_pk_once_per_killer() {
        let mut world = world();
        let a = world.spawn(Character::player("Ana", 10), RoomId(1));
        let b = world.spawn(Character::player("Bo", 10), RoomId(1));
        die(&mut world, b, a);
        if let Some(v) = world.ch_mut(b) {
            v.position = Position::Standing;
            v.pools.health = 50;
        }
        world.clock.advance_micros(5_000_000);
        die(&mut world, b, a);

        let account = world.ch(b).and_then(|c| c.account()).expect("account");
        let records = &world.pk_records[&account];
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, world.clock.timestamp());
    }

    #[test]
    fn test_auto_resurrect_skips_death() {
        let mut world = world();
        let wolf = world.spawn(Character::npc("wolf", 7, 10), RoomId(1));
        let mut pc = Character::player("Ana", 10);
        pc.auto_resurrect = Some(50);
        pc.pools.health = -20;
        pc.position = Position::Dead;
        let pc = world.spawn(pc, RoomId(1));

        assert!(die(&mut world, pc, wolf).is_none());
        let ana = world.ch(pc).expect("alive");
        assert_eq!(ana.position, Position::Standing);
        assert_eq!(ana.pools.health, 50);
        assert!(ana.auto_resurrect.is_none());
    }

    #[test]
    fn test_distrust_outside_war() {
        let mut world = world();
        world.empires.insert(EmpireId(1), Empire::new(EmpireId(1), "North"));
        world.empires.insert(EmpireId(2), Empire::new(EmpireId(2), "South"));
        let mut a = Character::player("Ana", 10);
        a.empire = Some(EmpireId(1));
        let mut b = Character::player("Bo", 10);
        b.empire = Some(EmpireId(2));
        let a = world.spawn(a, RoomId(1));
        let b = world.spawn(b, RoomId(1));

        die(&mut world, b, a);
        assert!(world.empires[&EmpireId(2)].distrust.contains(&EmpireId(1)));
    }

    #[test]
    fn test_no_distrust_when_at_war() {
        let mut world = world();
        let mut south = Empire::new(EmpireId(2), "South");
        south.at_war_with.insert(EmpireId(1));
        world.empires.insert(EmpireId(2), south);
        let mut a = Character::player("Ana", 10);
        a.empire = Some(EmpireId(1));
        let mut b = Character::player("Bo", 10);
        b.empire = Some(EmpireId(2));
        let a = world.spawn(a, RoomId(1));
        let b = world.spawn(b, RoomId(1));

        die(&mut world, b, a);
        assert!(world.empires[&EmpireId(2)].distrust.is_empty());
    }

    #[test]
    fn test_faction_reputation_for_taggers() {
        let mut world = world();
        world.factions.insert(
            FactionId(3),
            Faction {
                id: FactionId(3),
                name: "Wolves".into(),
                kill_reputation: -5,
            },
        );
        let a = world.spawn(Character::player("Ana", 10), RoomId(1));
        let mut wolf = Character::npc("wolf", 7, 10);
        if let Some(m) = wolf.mob_mut() {
            m.faction = Some(FactionId(3));
        }
        wolf.tagged_by.push(a);
        let wolf = world.spawn(wolf, RoomId(1));

        die(&mut world, wolf, a);
        let rep = world
            .ch(a)
            .and_then(|c| c.player_data())
            .and_then(|p| p.reputation.get(&FactionId(3)).copied());
        assert_eq!(rep, Some(-5));
    }

    #[test]
    fn test_summons_vanish_with_master() {
        let mut world = world();
        let wolf = world.spawn(Character::npc("wolf", 7, 10), RoomId(1));
        let pc = world.spawn(Character::player("Ana", 10), RoomId(1));
        let mut imp = Character::npc("imp", 3, 10);
        if let Some(m) = imp.mob_mut() {
            m.flags.set(MobFlag::Summoned);
        }
        imp.leader = Some(pc);
        let imp = world.spawn(imp, RoomId(1));

        die(&mut world, pc, wolf);
        assert!(world.ch(imp).is_none());
    }

    #[test]
    fn test_execute_without_autokill_knocks_out() {
        let mut world = world();
        let a = world.spawn(Character::player("Ana", 10), RoomId(1));
        let b = world.spawn(Character::player("Bo", 10), RoomId(1));
        let killed = perform_execute(
            &mut world,
            a,
            b,
            AttackType::Weapon(crate::combat::attack::WeaponAttack::Slash),
            DamageType::Physical,
        );
        assert!(!killed);
        let bo = world.ch(b).expect("alive");
        assert_eq!(bo.position, Position::Incapacitated);
        assert_eq!(bo.pools.health, -1);
    }

    #[test]
    fn test_execute_with_autokill_records_lore() {
        let mut world = world();
        let mut ana = Character::player("Ana", 10);
        if let Some(p) = ana.player_data_mut() {
            p.prefs.set(Pref::AutoKill);
        }
        let a = world.spawn(ana, RoomId(1));
        let b = world.spawn(Character::player("Bo", 10), RoomId(1));
        let killed = perform_execute(&mut world, a, b, AttackType::Undefined, DamageType::Physical);
        assert!(killed);

        let death = world.ch(b).and_then(|c| c.player_data()).map(|p| p.lore.clone()).unwrap_or_default();
        let kill = world.ch(a).and_then(|c| c.player_data()).map(|p| p.lore.clone()).unwrap_or_default();
        assert_eq!(death[0].kind, LoreKind::Death);
        assert_eq!(kill[0].kind, LoreKind::Kill);
        assert_eq!(world.ch(b).map(|c| c.position), Some(Position::Dead));
    }

    #[test]
    fn test_death_cause_follows_damage_type() {
        assert_eq!(death_cause(AttackType::Dot, DamageType::Poison), "poison");
        assert_eq!(death_cause(AttackType::Dot, DamageType::Fire), "burns");
        assert_eq!(death_cause(AttackType::Dot, DamageType::Physical), "lingering wounds");
        assert_eq!(death_cause(AttackType::Suffering, DamageType::Physical), "suffering");
    }
}
