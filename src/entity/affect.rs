//! Timed modifiers and damage-over-time effects

use crate::combat::attack::DamageType;
use crate::core::types::{CharId, FlagSet};
use crate::entity::flags::AffFlag;
use serde::{Deserialize, Serialize};

/// Duration value for affects that never expire on their own
pub const UNLIMITED: i32 = -1;

/// What produced an affect; used for wear-off messages and stacking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AffectType {
    Stun,
    StunImmunity,
    Haste,
    Slow,
    Blind,
    Invisibility,
    Earthmeld,
    /// Penalty left on a bitten victim
    BitePenalty,
    NatureBurn,
    Poison,
    /// Vampire blood upkeep; modifier is blood drained per point update
    BloodUpkeep,
    RespawnSickness,
    /// Ammo on-hit effects and other content-defined affects
    Custom(u16),
}

impl AffectType {
    /// Message sent to the character when the affect expires
    pub fn wear_off_message(self) -> Option<&'static str> {
        match self {
            AffectType::Stun => Some("You are no longer stunned."),
            AffectType::StunImmunity => None,
            AffectType::Haste => Some("You slow back down to normal."),
            AffectType::Slow => Some("You feel less sluggish."),
            AffectType::Blind => Some("You can see again."),
            AffectType::Invisibility => Some("You fade back into view."),
            AffectType::Earthmeld => Some("You rise out of the earth."),
            AffectType::BitePenalty => Some("The bite wound closes."),
            AffectType::NatureBurn => Some("The burning subsides."),
            AffectType::Poison => Some("You feel the poison leave your body."),
            AffectType::BloodUpkeep => None,
            AffectType::RespawnSickness => Some("You feel steadier on your feet."),
            AffectType::Custom(_) => None,
        }
    }

    /// Affects that carry blood upkeep; cleared on death
    pub fn is_blood_upkeep(self) -> bool {
        matches!(self, AffectType::BloodUpkeep)
    }
}

/// Stat an affect modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Apply {
    #[default]
    None,
    Strength,
    Dexterity,
    Intelligence,
    Wits,
    ToHit,
    Dodge,
    Block,
    ResistPhysical,
    ResistMagical,
    BonusPhysical,
    BonusMagical,
    BloodUpkeep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affect {
    pub kind: AffectType,
    pub caster: Option<CharId>,
    /// Real updates remaining, or [`UNLIMITED`]
    pub duration: i32,
    pub apply: Apply,
    pub modifier: i32,
    pub flags: FlagSet<AffFlag>,
}

impl Affect {
    pub fn new(kind: AffectType, duration: i32) -> Self {
        Self {
            kind,
            caster: None,
            duration,
            apply: Apply::None,
            modifier: 0,
            flags: FlagSet::empty(),
        }
    }

    pub fn with_flag(mut self, flag: AffFlag) -> Self {
        self.flags.set(flag);
        self
    }

    pub fn with_apply(mut self, apply: Apply, modifier: i32) -> Self {
        self.apply = apply;
        self.modifier = modifier;
        self
    }

    pub fn with_caster(mut self, caster: CharId) -> Self {
        self.caster = Some(caster);
        self
    }

    pub fn is_unlimited(&self) -> bool {
        self.duration == UNLIMITED
    }
}

/// Damage applied every real update until its duration runs out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub kind: AffectType,
    /// Looked up by id on every tick; may have left the room or the world
    pub caster: Option<CharId>,
    pub damage: i32,
    pub damage_type: DamageType,
    pub duration: i32,
    pub stack: i32,
    pub max_stack: i32,
}

impl Dot {
    pub fn new(kind: AffectType, damage: i32, damage_type: DamageType, duration: i32) -> Self {
        Self {
            kind,
            caster: None,
            damage,
            damage_type,
            duration,
            stack: 1,
            max_stack: 1,
        }
    }

    pub fn tick_damage(&self) -> i32 {
        self.damage * self.stack.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affect_builder() {
        let af = Affect::new(AffectType::Haste, 5)
            .with_flag(AffFlag::Haste)
            .with_apply(Apply::Dexterity, 2);
        assert!(af.flags.has(AffFlag::Haste));
        assert_eq!(af.apply, Apply::Dexterity);
        assert_eq!(af.modifier, 2);
        assert!(!af.is_unlimited());
    }

    #[test]
    fn test_dot_stacks_multiply() {
        let mut dot = Dot::new(AffectType::Poison, 4, DamageType::Poison, 3);
        dot.stack = 3;
        assert_eq!(dot.tick_damage(), 12);
    }
}
