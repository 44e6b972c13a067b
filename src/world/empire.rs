//! Empires, factions, groups, instances and player-kill records

use crate::core::types::{AccountId, CharId, EmpireId, FactionId, GroupId, InstanceId};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Empire {
    pub id: EmpireId,
    pub name: String,
    pub at_war_with: AHashSet<EmpireId>,
    /// Empires whose members killed ours outside of war
    pub distrust: AHashSet<EmpireId>,
    /// Citizens and empire NPCs lost
    pub citizen_deaths: u32,
}

impl Empire {
    pub fn new(id: EmpireId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn is_at_war_with(&self, other: EmpireId) -> bool {
        self.at_war_with.contains(&other)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    /// Reputation change for every tagging player when a member dies
    pub kill_reputation: i32,
}

#[derive(Debug, Clone, Default)]
pub struct Group {
    pub id: GroupId,
    pub members: Vec<CharId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    /// Freeze the difficulty at the first attacker's level
    pub lock_level_on_combat: bool,
    pub level: Option<i32>,
}

/// One player death at the hands of a player or empire NPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PkRecord {
    /// Killer's account, if a player did it
    pub killer: Option<AccountId>,
    pub empire: Option<EmpireId>,
    /// Unix seconds of the latest kill
    pub timestamp: u64,
}

impl PkRecord {
    pub fn is_expired(&self, now: u64, lifetime: u64) -> bool {
        self.timestamp + lifetime <= now
    }
}
