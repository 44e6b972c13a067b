//! Attack types and damage types
//!
//! Every weapon and natural attack names a `WeaponAttack`; its table entry
//! gives the base swing speed, the damage type and the verb used in messages.

use crate::entity::flags::Ability;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Physical,
    Magical,
    Fire,
    Poison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponAttack {
    Hit,
    Slash,
    Slice,
    Stab,
    Jab,
    Bludgeon,
    Crush,
    Hammer,
    Claw,
    Bite,
    /// Vampire bite: lethal blows may turn into feeding
    VampireBite,
    Sting,
    Whip,
    MagicFire,
    MagicShock,
    Bow,
    Crossbow,
    Sling,
    Throw,
}

/// Static table entry for a weapon attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackInfo {
    pub singular: &'static str,
    pub plural: &'static str,
    /// Seconds between swings before any modifiers
    pub base_speed: f64,
    pub damage_type: DamageType,
    pub ranged: bool,
    /// Counts for dagger mastery
    pub stabbing: bool,
}

pub const SPEED_FAST: f64 = 2.4;
pub const SPEED_NORMAL: f64 = 3.0;
pub const SPEED_SLOW: f64 = 3.6;

const fn melee(singular: &'static str, plural: &'static str, base_speed: f64) -> AttackInfo {
    AttackInfo {
        singular,
        plural,
        base_speed,
        damage_type: DamageType::Physical,
        ranged: false,
        stabbing: false,
    }
}

impl WeaponAttack {
    pub fn info(self) -> AttackInfo {
        match self {
            WeaponAttack::Hit => melee("hit", "hits", SPEED_NORMAL),
            WeaponAttack::Slash => melee("slash", "slashes", SPEED_NORMAL),
            WeaponAttack::Slice => melee("slice", "slices", SPEED_FAST),
            WeaponAttack::Stab => AttackInfo {
                stabbing: true,
                ..melee("stab", "stabs", SPEED_FAST)
            },
            WeaponAttack::Jab => AttackInfo {
                stabbing: true,
                ..melee("jab", "jabs", SPEED_FAST)
            },
            WeaponAttack::Bludgeon => melee("bludgeon", "bludgeons", SPEED_SLOW),
            WeaponAttack::Crush => melee("crush", "crushes", SPEED_SLOW),
            WeaponAttack::Hammer => melee("hammer", "hammers", SPEED_SLOW),
            WeaponAttack::Claw => melee("claw", "claws", SPEED_FAST),
            WeaponAttack::Bite => melee("bite", "bites", SPEED_NORMAL),
            WeaponAttack::VampireBite => melee("bite", "bites", SPEED_NORMAL),
            WeaponAttack::Sting => AttackInfo {
                stabbing: true,
                ..melee("sting", "stings", SPEED_FAST)
            },
            WeaponAttack::Whip => melee("whip", "whips", SPEED_NORMAL),
            WeaponAttack::MagicFire => AttackInfo {
                damage_type: DamageType::Fire,
                ..melee("burn", "burns", SPEED_NORMAL)
            },
            WeaponAttack::MagicShock => AttackInfo {
                damage_type: DamageType::Magical,
                ..melee("shock", "shocks", SPEED_NORMAL)
            },
            WeaponAttack::Bow => AttackInfo {
                ranged: true,
                ..melee("shoot", "shoots", SPEED_NORMAL)
            },
            WeaponAttack::Crossbow => AttackInfo {
                ranged: true,
                ..melee("shoot", "shoots", SPEED_SLOW)
            },
            WeaponAttack::Sling => AttackInfo {
                ranged: true,
                ..melee("sling", "slings", SPEED_FAST)
            },
            WeaponAttack::Throw => AttackInfo {
                ranged: true,
                ..melee("throw", "throws", SPEED_FAST)
            },
        }
    }

    pub fn is_magic(self) -> bool {
        self.info().damage_type != DamageType::Physical
    }
}

/// Everything that can call the damage engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackType {
    /// Weapon swing, missile or NPC natural attack
    Weapon(WeaponAttack),
    /// Skill or spell
    Ability(Ability),
    /// Damage-over-time tick
    Dot,
    /// Shot from an empire guard tower; the tower has no character, so
    /// the victim doubles as the attacker
    GuardTower,
    /// Starvation, drowning, blood loss
    Suffering,
    /// Manual executions
    Undefined,
}

impl AttackType {
    pub fn is_weapon(self) -> bool {
        matches!(self, AttackType::Weapon(_))
    }

    /// Skill messages are always used for abilities
    pub fn is_ability(self) -> bool {
        matches!(self, AttackType::Ability(_))
    }

    pub fn weapon(self) -> Option<WeaponAttack> {
        match self {
            AttackType::Weapon(w) => Some(w),
            _ => None,
        }
    }
}
