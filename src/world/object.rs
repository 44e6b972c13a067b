//! Objects: gear, ammo and corpses

use crate::combat::attack::WeaponAttack;
use crate::core::types::{AccountId, CharId, ObjId, QuestId, RoomId, Vnum};
use crate::entity::affect::Affect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WearSlot {
    Wield,
    /// Off-hand: shield or second weapon
    Hold,
    Ranged,
    Body,
    Head,
    Hands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorType {
    Light,
    Medium,
    Heavy,
    Mage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Size {
    Tiny,
    Small,
    #[default]
    Normal,
    Large,
    Huge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CorpseOwner {
    Npc { vnum: Vnum, name: String },
    Player { name: String, account: AccountId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpseData {
    pub owner: CorpseOwner,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjKind {
    Weapon {
        attack: WeaponAttack,
        damage: i32,
        two_handed: bool,
        /// Staves get staff-mastery damage
        staff: bool,
    },
    Shield,
    Armor(ArmorType),
    /// Ranged weapon; fires ammo from the inventory
    Missile { attack: WeaponAttack, damage: i32 },
    Ammo {
        quantity: i32,
        damage: i32,
        on_hit: Option<Affect>,
    },
    Corpse(CorpseData),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjLocation {
    Nowhere,
    Room(RoomId),
    Carried(CharId),
    Worn(CharId, WearSlot),
    Inside(ObjId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub vnum: Vnum,
    pub name: String,
    pub kind: ObjKind,
    pub location: ObjLocation,
    pub contents: Vec<ObjId>,
    /// Accounts allowed to loot this (empty = anyone)
    pub bound_to: Vec<AccountId>,
    /// Real updates until decay, if any
    pub timer: Option<i32>,
    pub weight: i32,
    /// Quest this item belongs to; removed when its holder drops the quest
    pub quest: Option<QuestId>,
    /// Strength needed to keep this equipped
    pub min_strength: i32,
}

impl Object {
    pub fn new(vnum: Vnum, name: &str, kind: ObjKind) -> Self {
        Self {
            vnum,
            name: name.to_string(),
            kind,
            location: ObjLocation::Nowhere,
            contents: Vec::new(),
            bound_to: Vec::new(),
            timer: None,
            weight: 1,
            quest: None,
            min_strength: 0,
        }
    }

    pub fn weapon(name: &str, attack: WeaponAttack, damage: i32) -> Self {
        Self::new(
            0,
            name,
            ObjKind::Weapon {
                attack,
                damage,
                two_handed: false,
                staff: false,
            },
        )
    }

    pub fn is_shield(&self) -> bool {
        matches!(self.kind, ObjKind::Shield)
    }

    pub fn is_corpse(&self) -> bool {
        matches!(self.kind, ObjKind::Corpse(_))
    }

    /// Melee weapon attack and damage, if this is a melee weapon
    pub fn weapon_stats(&self) -> Option<(WeaponAttack, i32)> {
        match self.kind {
            ObjKind::Weapon { attack, damage, .. } => Some((attack, damage)),
            _ => None,
        }
    }
}
