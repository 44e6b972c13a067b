//! The combat round driver
//!
//! `frequent_combat` runs once per pulse. Each combatant swings on its own
//! timer, so fighters with different weapon speeds interleave naturally.

use crate::combat::attack::{AttackType, DamageType, WeaponAttack};
use crate::combat::damage::{damage, Strike, TargetGone};
use crate::combat::engage::{
    can_fight, check_auto_assist, check_pointless_fight, set_fight_mode, set_fighting, stop_fighting,
};
use crate::combat::resolver::{can_gain_exp_from, check_block, check_hit_vs_dodge};
use crate::combat::speed::{get_combat_speed, slot_attack, speed_micros};
use crate::core::config::GameConfig;
use crate::core::types::{round_to_int, CharId, ObjId};
use crate::entity::character::{Character, FightMode};
use crate::entity::flags::{Ability, AffFlag, MobFlag, Tech};
use crate::world::{Audience, ObjKind, WearSlot, World};

/// Experience per mastery bonus that landed
const MASTERY_EXP: f64 = 1.0;

/// Weapon properties that feed melee damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeaponProfile {
    pub damage: i32,
    pub two_handed: bool,
    pub staff: bool,
}

/// What a character strikes with from a slot; bare hands are all zero
pub fn weapon_profile(world: &World, ch: CharId, slot: WearSlot) -> WeaponProfile {
    match world.equipped(ch, slot).map(|o| &o.kind) {
        Some(ObjKind::Weapon {
            damage,
            two_handed,
            staff,
            ..
        }) => WeaponProfile {
            damage: *damage,
            two_handed: *two_handed,
            staff: *staff,
        },
        Some(ObjKind::Missile { damage, .. }) => WeaponProfile {
            damage: *damage,
            ..WeaponProfile::default()
        },
        _ => WeaponProfile::default(),
    }
}

/// Raw damage of one swing, and the masteries that boosted it
///
/// The attribute bonus is scaled by base/current speed, and then the whole
/// sum is scaled again, so faster attacks deal less per hit.
pub fn melee_damage(
    config: &GameConfig,
    ch: &Character,
    victim: &Character,
    attack: WeaponAttack,
    weapon: WeaponProfile,
    speed: f64,
) -> (i32, Vec<Ability>) {
    let info = attack.info();
    let attribute = if info.damage_type == DamageType::Physical {
        ch.strength() + ch.bonus_physical()
    } else {
        ch.intelligence() + ch.bonus_magical()
    };
    let ratio = info.base_speed / speed.max(f64::EPSILON);
    let npc_bonus = ch.mob().map(|m| m.damage_bonus).unwrap_or(0);

    let mut dam = (attribute as f64 * ratio + weapon.damage as f64 + npc_bonus as f64) * ratio;
    let mut boosted = Vec::new();

    if info.stabbing && ch.can_use_ability(Ability::DaggerMastery) {
        dam *= config.mastery_multiplier;
        boosted.push(Ability::DaggerMastery);
    }
    if weapon.two_handed && ch.can_use_ability(Ability::TwoHandedMastery) {
        dam *= config.mastery_multiplier;
        boosted.push(Ability::TwoHandedMastery);
    }
    if weapon.staff && ch.can_use_ability(Ability::StaffMastery) {
        dam *= config.mastery_multiplier;
        boosted.push(Ability::StaffMastery);
    }
    if victim.has_mob_flag(MobFlag::Animal) && ch.has_tech(Tech::AnimalSlayer) {
        dam *= config.animal_slayer_multiplier;
        boosted.push(Ability::AnimalSlaying);
    }

    (round_to_int(dam).max(0), boosted)
}

fn meters_dodge(world: &mut World, victim: CharId) {
    let now = world.clock.now_micros();
    if let Some(v) = world.ch_mut(victim) {
        v.meters.record_dodge(now);
    }
}

fn meters_block(world: &mut World, victim: CharId) {
    let now = world.clock.now_micros();
    if let Some(v) = world.ch_mut(victim) {
        v.meters.record_block(now);
    }
}

fn announce_block(world: &mut World, ch: CharId, victim: CharId) {
    world.act("$N blocks your attack with a shield.", ch, Some(victim), Audience::Actor);
    world.act("You block $n's attack with your shield.", ch, Some(victim), Audience::Victim);
    world.act("$N blocks $n's attack with a shield.", ch, Some(victim), Audience::Room);
}

/// One swing from `slot` at `victim`
///
/// Outside a combat round the attack is first checked with `can_fight`,
/// and the attacker is told why it cannot happen.
pub fn hit(world: &mut World, ch: CharId, victim: CharId, slot: WearSlot, combat_round: bool) -> Strike {
    if !world.is_present(victim) {
        return Err(TargetGone);
    }
    if !world.is_present(ch) {
        return Ok(0);
    }
    if !combat_round {
        if let Err(reason) = can_fight(world, ch, victim) {
            world.send(ch, reason.to_string());
            return Ok(0);
        }
    }

    let attack = slot_attack(world, ch, slot);
    let damtype = attack.info().damage_type;
    let can_gain_skill = match (world.ch(ch), world.ch(victim)) {
        (Some(c), Some(v)) => can_gain_exp_from(&world.config, c, v),
        _ => false,
    };

    if !check_hit_vs_dodge(world, ch, victim, slot == WearSlot::Hold, can_gain_skill) {
        meters_dodge(world, victim);
        return damage(world, ch, victim, 0, AttackType::Weapon(attack), damtype);
    }

    if check_block(world, ch, victim, can_gain_skill) {
        announce_block(world, ch, victim);
        meters_block(world, victim);
        set_fighting(world, ch, victim, FightMode::Melee);
        set_fighting(world, victim, ch, FightMode::Melee);
        return Ok(0);
    }

    let speed = get_combat_speed(world, ch, slot);
    let profile = weapon_profile(world, ch, slot);
    let (dam, boosted) = match (world.ch(ch), world.ch(victim)) {
        (Some(c), Some(v)) => melee_damage(&world.config, c, v, attack, profile, speed),
        _ => return Err(TargetGone),
    };

    let result = damage(world, ch, victim, dam, AttackType::Weapon(attack), damtype);
    let landed = match result {
        Ok(dealt) => dealt > 0,
        Err(TargetGone) => dam > 0,
    };
    if landed && can_gain_skill {
        let hooks = world.hooks();
        for ability in boosted {
            hooks.gain_ability_exp(world, ch, ability, MASTERY_EXP);
        }
    }
    result
}

/// First ammo stack with anything left in it
fn find_ammo(world: &World, ch: CharId) -> Option<ObjId> {
    world.ch(ch)?.inventory.iter().copied().find(|&o| {
        world
            .obj(o)
            .is_some_and(|obj| matches!(obj.kind, ObjKind::Ammo { quantity, .. } if quantity > 0))
    })
}

fn consume_ammo(world: &mut World, ammo: ObjId) {
    let empty = match world.obj_mut(ammo).map(|o| &mut o.kind) {
        Some(ObjKind::Ammo { quantity, .. }) => {
            *quantity -= 1;
            *quantity <= 0
        }
        _ => false,
    };
    if empty {
        world.extract_obj(ammo);
    }
}

/// One ranged shot; without a launcher or ammo the shooter drops to melee
pub fn fire_missile(world: &mut World, ch: CharId, victim: CharId) -> Strike {
    if !world.is_present(victim) {
        return Err(TargetGone);
    }
    let launcher = match world.equipped(ch, WearSlot::Ranged).map(|o| &o.kind) {
        Some(ObjKind::Missile { attack, damage }) => Some((*attack, *damage)),
        _ => None,
    };
    let Some((attack, launcher_damage)) = launcher else {
        world.send(ch, "You have nothing to shoot with!");
        set_fight_mode(world, ch, FightMode::Melee);
        return Ok(0);
    };
    let Some(ammo) = find_ammo(world, ch) else {
        world.send(ch, "You're out of ammo!");
        set_fight_mode(world, ch, FightMode::Melee);
        return Ok(0);
    };
    let (ammo_damage, on_hit) = match world.obj(ammo).map(|o| &o.kind) {
        Some(ObjKind::Ammo { damage, on_hit, .. }) => (*damage, on_hit.clone()),
        _ => (0, None),
    };

    let damtype = attack.info().damage_type;
    let can_gain_skill = match (world.ch(ch), world.ch(victim)) {
        (Some(c), Some(v)) => can_gain_exp_from(&world.config, c, v),
        _ => false,
    };

    let result = if !check_hit_vs_dodge(world, ch, victim, false, can_gain_skill) {
        meters_dodge(world, victim);
        damage(world, ch, victim, 0, AttackType::Weapon(attack), damtype)
    } else if check_block(world, ch, victim, can_gain_skill) {
        announce_block(world, ch, victim);
        meters_block(world, victim);
        Ok(0)
    } else {
        let speed = get_combat_speed(world, ch, WearSlot::Ranged);
        let profile = WeaponProfile {
            damage: launcher_damage + ammo_damage,
            ..WeaponProfile::default()
        };
        let dam = match (world.ch(ch), world.ch(victim)) {
            (Some(c), Some(v)) => melee_damage(&world.config, c, v, attack, profile, speed).0,
            _ => 0,
        };
        let result = damage(world, ch, victim, dam, AttackType::Weapon(attack), damtype);
        if let (Ok(dealt), Some(affect)) = (result, on_hit) {
            if dealt > 0 {
                if let Some(v) = world.ch_mut(victim) {
                    v.affects.push(affect.with_caster(ch));
                }
            }
        }
        result
    };

    consume_ammo(world, ammo);
    result
}

/// Close distance on a missile fighter, one step per second
pub fn combat_waiting(world: &mut World, ch: CharId) {
    let Some((target, rounds)) = world
        .ch(ch)
        .and_then(|c| Some((c.fighting?, c.fight_mode.wait_rounds())))
    else {
        return;
    };
    let opponent_shooting = world
        .ch(target)
        .is_some_and(|t| t.fight_mode == FightMode::Missile);
    let remaining = rounds.saturating_sub(1);

    if remaining == 0 || !opponent_shooting {
        let speed = get_combat_speed(world, ch, WearSlot::Wield);
        let now = world.clock.now_micros();
        if let Some(c) = world.ch_mut(ch) {
            c.fight_mode = FightMode::Melee;
            // Half a round head start for whoever closed the gap
            c.last_swing_main = now.saturating_sub(speed_micros(speed) / 2);
        }
        world.act("You close the distance to $N!", ch, Some(target), Audience::Actor);
        world.act("$n closes the distance to you!", ch, Some(target), Audience::Victim);
        world.act("$n closes in on $N!", ch, Some(target), Audience::Room);
    } else {
        if let Some(c) = world.ch_mut(ch) {
            c.fight_mode = FightMode::waiting(remaining);
        }
        world.act("You move closer to $N.", ch, Some(target), Audience::Actor);
        world.act("$n moves closer to you.", ch, Some(target), Audience::Victim);
    }
}

fn has_off_hand_weapon(world: &World, ch: CharId) -> bool {
    let dual = world
        .ch(ch)
        .is_some_and(|c| !c.is_npc() && c.has_tech(Tech::DualWield));
    dual && world
        .equipped(ch, WearSlot::Hold)
        .is_some_and(|o| matches!(o.kind, ObjKind::Weapon { .. }))
}

/// Whether a swing timer has run down; restarts it if so
fn swing_ready(world: &mut World, ch: CharId, slot: WearSlot) -> bool {
    let interval = speed_micros(get_combat_speed(world, ch, slot));
    let now = world.clock.now_micros();
    let Some(c) = world.ch_mut(ch) else {
        return false;
    };
    let last = if slot == WearSlot::Hold {
        &mut c.last_swing_off
    } else {
        &mut c.last_swing_main
    };
    if now.saturating_sub(*last) < interval {
        return false;
    }
    *last = now;
    true
}

fn can_act(c: &Character) -> bool {
    c.is_awake() && !c.has_aff(AffFlag::Tied) && !c.has_aff(AffFlag::Staked) && !c.is_stunned()
}

/// The per-pulse combat pass
pub fn frequent_combat(world: &mut World) {
    if !world.clock.claim_combat_pulse() {
        return;
    }
    let second = world.clock.is_second_boundary();
    let hooks = world.hooks();

    for id in world.combat.snapshot() {
        let Some(target) = world.ch(id).and_then(|c| c.fighting) else {
            stop_fighting(world, id);
            continue;
        };
        if can_fight(world, id, target).is_err() {
            stop_fighting(world, id);
            continue;
        }

        if second {
            check_auto_assist(world, id);
            if world.ch(id).is_some_and(|c| c.is_npc()) && check_pointless_fight(world, id) {
                continue;
            }
        }

        let Some(c) = world.ch(id) else {
            continue;
        };
        if c.fighting != Some(target) || !can_act(c) {
            continue;
        }
        let is_npc = c.is_npc();

        match c.fight_mode {
            FightMode::Waiting { .. } => {
                if second {
                    combat_waiting(world, id);
                }
            }
            FightMode::Missile => {
                if swing_ready(world, id, WearSlot::Ranged) {
                    // A failed shot has already dropped the shooter to melee
                    let _ = fire_missile(world, id, target);
                }
            }
            FightMode::Melee => {
                if swing_ready(world, id, WearSlot::Wield) {
                    let swing = !is_npc || hooks.fight_trigger(world, id, target);
                    let still_on = world.ch(id).is_some_and(|c| c.fighting == Some(target));
                    if swing && still_on && hit(world, id, target, WearSlot::Wield, true).is_err() {
                        continue;
                    }
                }
                let still_on = world.ch(id).is_some_and(|c| c.fighting == Some(target));
                if still_on && has_off_hand_weapon(world, id) && swing_ready(world, id, WearSlot::Hold) {
                    let _ = hit(world, id, target, WearSlot::Hold, true);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RoomId;
    use crate::entity::affect::{Affect, AffectType};
    use crate::entity::position::Position;
    use crate::world::{Object, Room};

    fn world() -> World {
        let mut world = World::new(GameConfig::default());
        world.add_room(Room::new(RoomId(1), "field"));
        world
    }

    #[test]
    fn test_melee_damage_unmodified() {
        let config = GameConfig::default();
        let mut ch = Character::player("Ana", 10);
        ch.attributes.strength = 4;
        let victim = Character::npc("wolf", 1, 10);
        let profile = WeaponProfile {
            damage: 6,
            ..WeaponProfile::default()
        };
        let (dam, boosted) = melee_damage(&config, &ch, &victim, WeaponAttack::Slash, profile, 3.0);
        assert_eq!(dam, 10);
        assert!(boosted.is_empty());
    }

    #[test]
    fn test_faster_swings_scale_damage_twice() {
        let config = GameConfig::default();
        let mut ch = Character::player("Ana", 10);
        ch.attributes.strength = 4;
        let victim = Character::npc("wolf", 1, 10);
        let profile = WeaponProfile {
            damage: 6,
            ..WeaponProfile::default()
        };
        // ratio 0.5: (4 * 0.5 + 6) * 0.5
        let (dam, _) = melee_damage(&config, &ch, &victim, WeaponAttack::Slash, profile, 6.0);
        assert_eq!(dam, 4);
    }

    #[test]
    fn test_multipliers_stack() {
        let config = GameConfig::default();
        let mut ch = Character::player("Ana", 10);
        ch.abilities.insert(Ability::DaggerMastery, 1);
        ch.techs.insert(Tech::AnimalSlayer);
        let mut boar = Character::npc("boar", 1, 10);
        if let Some(m) = boar.mob_mut() {
            m.flags.set(MobFlag::Animal);
        }
        let profile = WeaponProfile {
            damage: 10,
            ..WeaponProfile::default()
        };
        let (dam, boosted) = melee_damage(&config, &ch, &boar, WeaponAttack::Stab, profile, 2.4);
        // 10 * 1.5 * 2
        assert_eq!(dam, 30);
        assert_eq!(boosted, vec![Ability::DaggerMastery, Ability::AnimalSlaying]);
    }

    #[test]
    fn test_hit_outside_round_reports_block_reason() {
        let mut world = world();
        let a = world.spawn(Character::player("Ana", 10), RoomId(1));
        assert_eq!(hit(&mut world, a, a, WearSlot::Wield, false), Ok(0));
        let out = world.ch_mut(a).map(|c| c.take_output()).unwrap_or_default();
        assert_eq!(out, vec!["You can't attack yourself.".to_string()]);
    }

    #[test]
    fn test_sleeping_victim_is_always_hit() {
        let mut world = world();
        let mut ana = Character::player("Ana", 10);
        ana.attributes.strength = 5;
        let a = world.spawn(ana, RoomId(1));
        let mut wolf = Character::npc("wolf", 1, 10);
        wolf.position = Position::Sleeping;
        let b = world.spawn(wolf, RoomId(1));
        let dealt = hit(&mut world, a, b, WearSlot::Wield, false);
        assert_eq!(dealt, Ok(5));
    }

    #[test]
    fn test_missile_without_ammo_drops_to_melee() {
        let mut world = world();
        let a = world.spawn(Character::player("Ana", 10), RoomId(1));
        let b = world.spawn(Character::npc("wolf", 1, 10), RoomId(1));
        let bow = world.create_obj(Object::new(
            1,
            "a bow",
            ObjKind::Missile {
                attack: WeaponAttack::Bow,
                damage: 2,
            },
        ));
        world.equip(a, bow, WearSlot::Ranged);
        set_fighting(&mut world, a, b, FightMode::Missile);

        assert_eq!(fire_missile(&mut world, a, b), Ok(0));
        assert_eq!(world.ch(a).map(|c| c.fight_mode), Some(FightMode::Melee));
    }

    #[test]
    fn test_missile_consumes_ammo_and_applies_on_hit() {
        let mut world = world();
        let a = world.spawn(Character::player("Ana", 10), RoomId(1));
        let mut wolf = Character::npc("wolf", 1, 10);
        wolf.position = Position::Sleeping;
        let b = world.spawn(wolf, RoomId(1));
        let bow = world.create_obj(Object::new(
            1,
            "a bow",
            ObjKind::Missile {
                attack: WeaponAttack::Bow,
                damage: 2,
            },
        ));
        world.equip(a, bow, WearSlot::Ranged);
        let arrows = world.create_obj(Object::new(
            2,
            "an arrow",
            ObjKind::Ammo {
                quantity: 1,
                damage: 3,
                on_hit: Some(Affect::new(AffectType::Slow, 2).with_flag(AffFlag::Slow)),
            },
        ));
        world.obj_to_char(arrows, a);

        assert_eq!(fire_missile(&mut world, a, b), Ok(5));
        assert!(world.obj(arrows).is_none());
        let wolf = world.ch(b).expect("wolf");
        assert!(wolf.has_aff(AffFlag::Slow));
        assert_eq!(wolf.affects[0].caster, Some(a));
    }

    #[test]
    fn test_waiting_counts_down_then_melee() {
        let mut world = world();
        let a = world.spawn(Character::player("Ana", 10), RoomId(1));
        let b = world.spawn(Character::player("Bo", 10), RoomId(1));
        set_fighting(&mut world, a, b, FightMode::Missile);
        set_fighting(&mut world, b, a, FightMode::waiting(2));

        combat_waiting(&mut world, b);
        assert_eq!(world.ch(b).map(|c| c.fight_mode.wait_rounds()), Some(1));
        combat_waiting(&mut world, b);
        assert_eq!(world.ch(b).map(|c| c.fight_mode), Some(FightMode::Melee));
    }

    #[test]
    fn test_waiting_ends_when_opponent_stops_shooting() {
        let mut world = world();
        let a = world.spawn(Character::player("Ana", 10), RoomId(1));
        let b = world.spawn(Character::player("Bo", 10), RoomId(1));
        set_fighting(&mut world, a, b, FightMode::Melee);
        set_fighting(&mut world, b, a, FightMode::waiting(5));

        for _ in 0..30 {
            world.clock.advance();
        }
        combat_waiting(&mut world, b);
        let bo = world.ch(b).expect("bo");
        assert_eq!(bo.fight_mode, FightMode::Melee);
        // Half of a 3.0s swing already elapsed
        assert_eq!(bo.last_swing_main, world.clock.now_micros() - 1_500_000);
    }

    #[test]
    fn test_driver_runs_once_per_pulse() {
        let mut world = world();
        let a = world.spawn(Character::player("Ana", 10), RoomId(1));
        let mut wolf = Character::npc("wolf", 1, 10);
        wolf.position = Position::Sleeping;
        let b = world.spawn(wolf, RoomId(1));
        set_fighting(&mut world, a, b, FightMode::Melee);
        for _ in 0..30 {
            world.clock.advance();
        }
        frequent_combat(&mut world);
        frequent_combat(&mut world);
        assert_eq!(world.ch(a).map(|c| c.meters.hits + c.meters.misses), Some(1));
    }

    #[test]
    fn test_driver_drops_targets_that_left() {
        let mut world = world();
        world.add_room(Room::new(RoomId(2), "road"));
        let a = world.spawn(Character::player("Ana", 10), RoomId(1));
        let b = world.spawn(Character::npc("wolf", 1, 10), RoomId(1));
        set_fighting(&mut world, a, b, FightMode::Melee);
        world.move_char(b, RoomId(2));
        frequent_combat(&mut world);
        assert!(!world.combat.contains(a));
        assert!(world.ch(a).is_some_and(|c| c.fighting.is_none()));
    }
}
