//! Death pipeline integration tests

use empire_mud::combat::{damage, die, perform_execute, AttackType, DamageType, WeaponAttack};
use empire_mud::core::config::GameConfig;
use empire_mud::core::types::RoomId;
use empire_mud::entity::{Character, Cooldown, LootEntry, LoreKind, Position, Pref};
use empire_mud::world::{Object, Room, WearSlot, World};
use proptest::prelude::*;

const ROOM: RoomId = RoomId(1);

fn world() -> World {
    let mut world = World::new(GameConfig::default());
    world.add_room(Room::new(ROOM, "a clearing"));
    world
}

#[test]
fn test_die_twice_is_a_noop() {
    let mut world = world();
    let hunter = world.spawn(Character::player("Aldric", 20), ROOM);
    let wolf = world.spawn(Character::npc("a wolf", 1, 10), ROOM);

    let corpse = die(&mut world, wolf, hunter);
    assert!(corpse.is_some());
    assert!(die(&mut world, wolf, hunter).is_none());

    let corpses = world
        .room(ROOM)
        .map(|r| r.contents().iter().filter(|&&o| world.obj(o).is_some_and(|o| o.is_corpse())).count())
        .unwrap_or(0);
    assert_eq!(corpses, 1);
}

#[test]
fn test_corpse_keeps_the_gear_and_binds_to_killer() {
    let mut world = world();
    let hunter = world.spawn(Character::player("Aldric", 20), ROOM);
    let mut bandit = Character::npc("a bandit", 5, 10);
    if let Some(mob) = bandit.mob_mut() {
        mob.loot.push(LootEntry {
            vnum: 900,
            name: "a silver coin".into(),
            chance: 100,
        });
    }
    let bandit = world.spawn(bandit, ROOM);
    let knife = world.create_obj(Object::weapon("a rusty knife", WeaponAttack::Stab, 4));
    world.equip(bandit, knife, WearSlot::Wield);

    assert!(damage(&mut world, hunter, bandit, 10_000, AttackType::Weapon(WeaponAttack::Slash), DamageType::Physical).is_err());

    let corpse_id = world.room(ROOM).and_then(|r| r.contents().first().copied()).expect("corpse");
    let corpse = world.obj(corpse_id).expect("corpse object");
    assert!(corpse.is_corpse());
    assert_eq!(corpse.timer, Some(world.config.npc_corpse_timer));
    assert_eq!(corpse.contents.len(), 2);
    assert!(corpse.contents.contains(&knife));
    let account = world.ch(hunter).and_then(|c| c.account());
    assert!(account.is_some_and(|acct| corpse.bound_to.contains(&acct)));
}

#[test]
fn test_player_death_keeps_the_character() {
    let mut world = world();
    let wolf = world.spawn(Character::npc("a wolf", 1, 30), ROOM);
    let pc = world.spawn(Character::player("Brena", 5), ROOM);

    assert!(damage(&mut world, wolf, pc, 10_000, AttackType::Weapon(WeaponAttack::Bite), DamageType::Physical).is_err());

    let brena = world.ch(pc).expect("players are not extracted");
    assert_eq!(brena.position, Position::Dead);
    assert_eq!(brena.pools.health, world.config.dead_health_sentinel);
    assert!(brena.cooldowns.contains_key(&Cooldown::Respawn));
    assert!(brena
        .player_data()
        .is_some_and(|p| p.recent_deaths == 1 && p.lore.iter().any(|l| l.kind == LoreKind::Death)));

    // Already dead: a second death changes nothing
    assert!(die(&mut world, pc, wolf).is_none());
    assert_eq!(world.ch(pc).and_then(|c| c.player_data()).map(|p| p.recent_deaths), Some(1));
}

#[test]
fn test_pvp_kill_records_pk_once() {
    let mut world = world();
    let mut killer = Character::player("Aldric", 30);
    if let Some(p) = killer.player_data_mut() {
        p.prefs.set(Pref::AutoKill);
    }
    let a = world.spawn(killer, ROOM);
    let b = world.spawn(Character::player("Brena", 30), ROOM);

    assert!(perform_execute(&mut world, a, b, AttackType::Weapon(WeaponAttack::Slash), DamageType::Physical));
    let victim_account = world.ch(b).and_then(|c| c.account()).expect("account");
    assert_eq!(world.pk_records.get(&victim_account).map(Vec::len), Some(1));

    let killer_lore = world
        .ch(a)
        .and_then(|c| c.player_data())
        .map(|p| p.lore.iter().filter(|l| l.kind == LoreKind::Kill).count());
    assert_eq!(killer_lore, Some(1));
}

#[test]
fn test_execute_without_autokill_spares_player() {
    let mut world = world();
    let a = world.spawn(Character::player("Aldric", 30), ROOM);
    let b = world.spawn(Character::player("Brena", 30), ROOM);

    assert!(!perform_execute(&mut world, a, b, AttackType::Weapon(WeaponAttack::Slash), DamageType::Physical));
    let brena = world.ch(b).expect("spared");
    assert_eq!(brena.position, Position::Incapacitated);
    assert_eq!(brena.pools.health, -1);
}

#[test]
fn test_overkill_blow_runs_the_full_player_death() {
    let mut world = world();
    let wolf = world.spawn(Character::npc("a wolf", 1, 30), ROOM);
    let pc = world.spawn(Character::player("Brena", 5), ROOM);
    let health = world.ch(pc).map(|c| c.pools.health).unwrap_or(0);
    let bite = AttackType::Weapon(WeaponAttack::Bite);

    damage(&mut world, wolf, pc, 1, bite, DamageType::Physical).unwrap();
    assert!(world.ch(wolf).is_some_and(|w| w.fighting == Some(pc)));

    // Well past the -100 resting value of the dead
    assert!(damage(&mut world, wolf, pc, health + 500, bite, DamageType::Physical).is_err());

    let brena = world.ch(pc).expect("players are not extracted");
    assert_eq!(brena.position, Position::Dead);
    assert_eq!(brena.pools.health, world.config.dead_health_sentinel);
    assert!(brena.cooldowns.contains_key(&Cooldown::Respawn));
    assert!(brena.affects.is_empty());
    assert_eq!(brena.player_data().map(|p| p.recent_deaths), Some(1));
    assert!(world.ch(wolf).is_some_and(|w| w.fighting.is_none()));
    assert!(!world.combat.contains(pc));
}

#[test]
fn test_revived_player_can_die_again() {
    let mut world = world();
    let wolf = world.spawn(Character::npc("a wolf", 1, 30), ROOM);
    let pc = world.spawn(Character::player("Brena", 5), ROOM);
    let bite = AttackType::Weapon(WeaponAttack::Bite);

    assert!(damage(&mut world, wolf, pc, 10_000, bite, DamageType::Physical).is_err());
    if let Some(c) = world.ch_mut(pc) {
        c.position = Position::Standing;
        c.pools.health = c.pools.max_health;
    }
    assert!(damage(&mut world, wolf, pc, 10_000, bite, DamageType::Physical).is_err());

    let brena = world.ch(pc).expect("players are not extracted");
    assert_eq!(brena.pools.health, world.config.dead_health_sentinel);
    assert_eq!(brena.player_data().map(|p| p.recent_deaths), Some(2));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_any_fatal_blow_settles_the_player_death(extra in 200i32..100_000) {
        let mut world = world();
        let wolf = world.spawn(Character::npc("a wolf", 1, 30), ROOM);
        let pc = world.spawn(Character::player("Brena", 5), ROOM);
        let health = world.ch(pc).map(|c| c.pools.health).unwrap_or(0);

        let result = damage(
            &mut world,
            wolf,
            pc,
            health + extra,
            AttackType::Weapon(WeaponAttack::Bite),
            DamageType::Physical,
        );
        prop_assert!(result.is_err());

        let brena = world.ch(pc).expect("players are not extracted");
        prop_assert_eq!(brena.position, Position::Dead);
        prop_assert_eq!(brena.pools.health, world.config.dead_health_sentinel);
        prop_assert!(brena.cooldowns.contains_key(&Cooldown::Respawn));
        prop_assert_eq!(brena.player_data().map(|p| p.recent_deaths), Some(1));
    }
}
