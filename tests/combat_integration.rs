//! Combat engine integration tests
//!
//! End-to-end checks of the damage engine, hit resolution and the combat
//! driver against a real world.

use empire_mud::combat::attack::SPEED_NORMAL;
use empire_mud::combat::messages::damage_tier;
use empire_mud::combat::resolver::hit_odds;
use empire_mud::combat::{
    can_fight, damage, engage_combat, get_combat_speed, is_fight_ally, is_fight_enemy, AttackType,
    DamageType, FightBlocked, WeaponAttack,
};
use empire_mud::core::config::GameConfig;
use empire_mud::core::types::{CharId, RoomId};
use empire_mud::entity::{Character, Position, Pref};
use empire_mud::simulation::run_for_seconds;
use empire_mud::world::{Object, Room, WearSlot, World};
use proptest::prelude::*;

const ROOM: RoomId = RoomId(1);

fn arena() -> World {
    let mut world = World::new(GameConfig {
        seed: 7,
        ..GameConfig::default()
    });
    world.add_room(Room::new(ROOM, "the arena"));
    world
}

fn assert_registry_consistent(world: &World) {
    for (id, ch) in world.chars.iter() {
        if ch.fighting.is_some() {
            assert!(world.combat.contains(id), "{} fights outside the registry", ch.name);
        }
    }
}

#[test]
fn test_plain_weapon_speed_is_unmodified() {
    let mut world = arena();
    let hero = world.spawn(Character::player("Aldric", 20), ROOM);
    let sword = world.create_obj(Object::weapon("a sword", WeaponAttack::Slash, 8));
    world.equip(hero, sword, WearSlot::Wield);

    assert_eq!(WeaponAttack::Slash.info().base_speed, SPEED_NORMAL);
    assert_eq!(get_combat_speed(&world, hero, WearSlot::Wield), 3.0);
}

#[test]
fn test_player_hit_chance_tolerance_branches() {
    let config = GameConfig::default();
    let attacker = Character::player("Aldric", 10);
    let near = Character::npc("a wolf", 1, 10);
    let far = Character::npc("an ancient wolf", 2, 10 + config.to_hit_level_tolerance + 1);

    let within = hit_odds(&config, &attacker, &near, 100, 0);
    let without = hit_odds(&config, &attacker, &far, 100, 0);

    // 100 * 100 / (100 + 100)
    assert_eq!(within.chance, 50);
    assert_eq!(without.chance, 50);
    assert_eq!(within.roll_penalty, config.min_pc_to_hit);
    assert_eq!(without.roll_penalty, 0);
    assert_ne!(within, without);
}

#[test]
fn test_npc_hit_floor_only_within_tolerance() {
    let config = GameConfig::default();
    let wolf = Character::npc("a wolf", 1, 10);
    let near = Character::npc("a deer", 2, 10);
    let far = Character::npc("a dragon", 3, 100);

    assert_eq!(hit_odds(&config, &wolf, &near, 10, 50).chance, config.min_npc_to_hit);
    assert_eq!(hit_odds(&config, &wolf, &far, 10, 50).chance, -40);
}

#[test]
fn test_enormous_damage_conquers() {
    assert!(damage_tier(10_000).actor.contains("CONQUER"));
}

#[test]
fn test_no_autokill_knocks_out_instead_of_killing() {
    let mut world = arena();
    let a = world.spawn(Character::player("Aldric", 20), ROOM);
    let mut victim = Character::player("Brena", 20);
    victim.pools.health = 5;
    let b = world.spawn(victim, ROOM);
    engage_combat(&mut world, a, b, false).expect("fight starts");

    let result = damage(&mut world, a, b, 8, AttackType::Weapon(WeaponAttack::Slash), DamageType::Physical);
    assert!(result.is_err());

    let brena = world.ch(b).expect("knocked out, not extracted");
    assert_eq!(brena.pools.health, -1);
    assert_eq!(brena.position, Position::Incapacitated);
    assert!(brena.fighting.is_none());
    assert!(world.ch(a).is_some_and(|c| c.fighting.is_none()));
    assert!(!world.combat.contains(a) && !world.combat.contains(b));
    assert_eq!(can_fight(&world, a, b), Err(FightBlocked::Unconscious));
}

#[test]
fn test_autokill_finishes_downed_player() {
    let mut world = arena();
    let mut killer = Character::player("Aldric", 20);
    if let Some(p) = killer.player_data_mut() {
        p.prefs.set(Pref::AutoKill);
    }
    let a = world.spawn(killer, ROOM);
    let mut victim = Character::player("Brena", 20);
    victim.pools.health = 5;
    let b = world.spawn(victim, ROOM);

    assert!(damage(&mut world, a, b, 20, AttackType::Weapon(WeaponAttack::Slash), DamageType::Physical).is_err());
    assert_eq!(world.ch(b).map(|c| c.position), Some(Position::Dead));
}

#[test]
fn test_killed_npc_leaves_the_world() {
    let mut world = arena();
    let a = world.spawn(Character::player("Aldric", 20), ROOM);
    let wolf = world.spawn(Character::npc("a wolf", 1, 10), ROOM);

    let result = damage(&mut world, a, wolf, 10_000, AttackType::Weapon(WeaponAttack::Slash), DamageType::Physical);
    assert!(result.is_err());
    assert!(world.ch(wolf).is_none());
    assert!(!world.combat.contains(wolf));
    assert_registry_consistent(&world);
}

#[test]
fn test_duel_runs_to_completion() {
    let mut world = arena();
    let hero = world.spawn(Character::player("Aldric", 30), ROOM);
    let sword = world.create_obj(Object::weapon("a sword", WeaponAttack::Slash, 15));
    world.equip(hero, sword, WearSlot::Wield);
    let wolf = world.spawn(Character::npc("a wolf", 1, 5), ROOM);
    engage_combat(&mut world, hero, wolf, false).expect("fight starts");

    for _ in 0..120 {
        run_for_seconds(&mut world, 1);
        assert_registry_consistent(&world);
        if world.ch(wolf).is_none() || world.ch(hero).map_or(true, |c| c.position <= Position::Incapacitated) {
            break;
        }
    }
    let meters = world.ch(hero).map(|c| c.meters.clone()).unwrap_or_default();
    assert!(meters.hits + meters.misses > 0);
}

fn brawl() -> (World, Vec<CharId>) {
    let mut world = arena();
    let mut hero = Character::player("Aldric", 20);
    if let Some(p) = hero.player_data_mut() {
        p.prefs.set(Pref::AutoKill);
    }
    let ids = vec![
        world.spawn(hero, ROOM),
        world.spawn(Character::player("Brena", 20), ROOM),
        world.spawn(Character::npc("a wolf", 1, 15), ROOM),
        world.spawn(Character::npc("a bear", 2, 25), ROOM),
    ];
    (world, ids)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_registry_tracks_every_fighter(
        blows in prop::collection::vec((0usize..4, 0usize..4, 0i32..60), 1..40)
    ) {
        let (mut world, ids) = brawl();
        for (from, to, dam) in blows {
            let (ch, victim) = (ids[from], ids[to]);
            if !world.is_present(ch) || !world.is_present(victim) {
                continue;
            }
            let result = damage(
                &mut world,
                ch,
                victim,
                dam,
                AttackType::Weapon(WeaponAttack::Hit),
                DamageType::Physical,
            );
            if result.is_err() {
                // Dead, extracted, or knocked out of the fight
                let out = world
                    .ch(victim)
                    .map_or(true, |v| v.position <= Position::Incapacitated && v.fighting.is_none());
                prop_assert!(out);
            }
            for (id, c) in world.chars.iter() {
                prop_assert!(c.fighting.is_none() || world.combat.contains(id));
            }
        }
    }

    #[test]
    fn prop_never_both_ally_and_enemy(
        fights in prop::collection::vec((0usize..4, 0usize..4), 0..6)
    ) {
        let (mut world, ids) = brawl();
        for (a, b) in fights {
            let _ = engage_combat(&mut world, ids[a], ids[b], false);
        }
        for &a in &ids {
            for &b in &ids {
                prop_assert!(!(is_fight_ally(&world, a, b) && is_fight_enemy(&world, a, b)));
            }
        }
    }

    #[test]
    fn prop_update_pos_only_degrades(
        start in -20i32..100,
        steps in prop::collection::vec(-30i32..30, 1..20)
    ) {
        let mut ch = Character::player("Aldric", 10);
        ch.pools.health = start;
        ch.update_pos();
        for delta in steps {
            let before = ch.position;
            ch.pools.health += delta;
            ch.update_pos();
            prop_assert!(ch.position <= before);
        }
    }
}
