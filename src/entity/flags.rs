//! Capability flags queried by the combat engine
//!
//! Every boolean gate in combat reads one of these through a `FlagSet`.

use crate::core::types::Flag;
use serde::{Deserialize, Serialize};

/// Flags granted by affects (timed) or set directly on a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AffFlag {
    Blind,
    Invisible,
    Hide,
    SenseHide,
    DetectInvisible,
    /// Soft stun: blocks combat rounds
    Stunned,
    /// Hard stun: blocks rounds and cannot be broken early
    HardStunned,
    ImmuneStun,
    Haste,
    Slow,
    /// Takes no damage of any type
    Immune,
    ImmunePhysical,
    NoAttack,
    Earthmelded,
    Tied,
    Staked,
    NoRegen,
    Flying,
}

impl Flag for AffFlag {
    fn bit(self) -> u32 {
        self as u32
    }
}

/// Flags on NPC prototypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MobFlag {
    /// Harder than a normal mob of its level
    Hard,
    /// Balanced for a group
    Group,
    NoAttack,
    NoCorpse,
    /// Always dies instead of being knocked out
    NoUnconscious,
    Animal,
    Aggressive,
    Mount,
    /// Spawned by the world; despawns when nobody is around
    Spawned,
    /// Summoned pet; despawns when its leader dies
    Summoned,
    /// Empire guard or citizen that assists empire members
    EmpireGuard,
}

impl Flag for MobFlag {
    fn bit(self) -> u32 {
        self as u32
    }
}

/// Player preferences that combat honors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Pref {
    AutoKill,
    AutoAssist,
}

impl Flag for Pref {
    fn bit(self) -> u32 {
        self as u32
    }
}

/// Room flags that gate combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RoomFlag {
    Peaceful,
    StartLocation,
    Stable,
    Water,
}

impl Flag for RoomFlag {
    fn bit(self) -> u32 {
        self as u32
    }
}

/// Player techs: binary capabilities unlocked by abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tech {
    Block,
    DualWield,
    FastMeleeCombat,
    FastRangedCombat,
    /// Disables the wits speed bonus on attacks
    FastCasting,
    Dodge,
    AnimalSlayer,
    /// Fire and poison resolve against physical resistance
    ResistElements,
    PoisonImmunity,
    /// Redirects up to half of magical damage into mana
    ManaShield,
    Vampirism,
    SeeInvisible,
}

/// Skills that earn experience from combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Dodge,
    Block,
    DaggerMastery,
    TwoHandedMastery,
    StaffMastery,
    AnimalSlaying,
    LightArmor,
    MediumArmor,
    HeavyArmor,
    MageArmor,
    Vampire,
    Kick,
    Bash,
    Firebolt,
    Kite,
    Charge,
}

/// Group role chosen by a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    None,
    Tank,
    Melee,
    Caster,
    Healer,
    Solo,
}

/// Administrative rank; immortals and gods take no damage from mortals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum AdminLevel {
    #[default]
    Mortal,
    Immortal,
    God,
}
