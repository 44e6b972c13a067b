//! The character entity: the only thing combat mutates directly

use crate::combat::attack::WeaponAttack;
use crate::core::types::{
    AccountId, CharId, EmpireId, FactionId, FlagSet, GroupId, ObjId, QuestId, RoomId, Vnum,
};
use crate::entity::affect::{Affect, AffectType, Apply, Dot};
use crate::entity::flags::{Ability, AdminLevel, AffFlag, MobFlag, Pref, Role, Tech};
use crate::entity::meters::CombatMeters;
use crate::entity::position::Position;
use crate::world::object::{Size, WearSlot};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// How a combatant's next round is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FightMode {
    #[default]
    Melee,
    Missile,
    /// Closing distance; becomes melee when the countdown reaches zero
    Waiting { rounds: NonZeroU32 },
}

impl FightMode {
    /// Waiting mode with a countdown; zero rounds means melee right away
    pub fn waiting(rounds: u32) -> Self {
        match NonZeroU32::new(rounds) {
            Some(rounds) => FightMode::Waiting { rounds },
            None => FightMode::Melee,
        }
    }

    pub fn wait_rounds(&self) -> u32 {
        match self {
            FightMode::Waiting { rounds } => rounds.get(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pools {
    pub health: i32,
    pub max_health: i32,
    pub move_points: i32,
    pub max_move: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub blood: i32,
    pub max_blood: i32,
}

impl Pools {
    pub fn full(health: i32, move_points: i32, mana: i32, blood: i32) -> Self {
        Self {
            health,
            max_health: health,
            move_points,
            max_move: move_points,
            mana,
            max_mana: mana,
            blood,
            max_blood: blood,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub wits: i32,
}

/// Innate combat stats before affects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub to_hit: i32,
    pub dodge: i32,
    pub block: i32,
    pub resist_physical: i32,
    pub resist_magical: i32,
    pub bonus_physical: i32,
    pub bonus_magical: i32,
}

/// Hunger, thirst and drunkenness; `None` never changes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub hunger: Option<i32>,
    pub thirst: Option<i32>,
    pub drunk: Option<i32>,
}

/// Output buffer and idle counter of a connected player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub outbox: Vec<String>,
    pub idle_updates: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoreKind {
    Kill,
    Death,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoreEntry {
    pub kind: LoreKind,
    pub text: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cooldown {
    Respawn,
}

/// Data only players carry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub account: AccountId,
    pub admin: AdminLevel,
    pub prefs: FlagSet<Pref>,
    pub role: Role,
    pub recent_deaths: i32,
    pub lore: Vec<LoreEntry>,
    pub reputation: AHashMap<FactionId, i32>,
    pub quests: AHashSet<QuestId>,
    /// Name of a timed action in progress; defers idle disconnect
    pub action: Option<String>,
    pub conditions: Conditions,
}

/// One possible drop from an NPC's loot table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub vnum: Vnum,
    pub name: String,
    /// Percent chance, 1-100
    pub chance: u32,
}

/// Data only NPCs carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobData {
    pub vnum: Vnum,
    pub flags: FlagSet<MobFlag>,
    pub min_level: i32,
    pub max_level: i32,
    /// Scaled to a level yet
    pub scaled: bool,
    pub to_hit_bonus: i32,
    pub dodge_bonus: i32,
    pub damage_bonus: i32,
    pub attack: WeaponAttack,
    pub size: Size,
    pub faction: Option<FactionId>,
    pub loot: Vec<LootEntry>,
    /// Room it was spawned in, for despawn-by-distance
    pub home_room: Option<RoomId>,
}

impl MobData {
    pub fn new(vnum: Vnum) -> Self {
        Self {
            vnum,
            flags: FlagSet::empty(),
            min_level: 1,
            max_level: 0,
            scaled: false,
            to_hit_bonus: 0,
            dodge_bonus: 0,
            damage_bonus: 0,
            attack: WeaponAttack::Hit,
            size: Size::Normal,
            faction: None,
            loot: Vec::new(),
            home_room: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CharKind {
    Player(Box<PlayerData>),
    Npc(Box<MobData>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub kind: CharKind,
    pub level: i32,
    pub room: RoomId,
    pub position: Position,
    pub pools: Pools,
    pub attributes: Attributes,
    pub stats: CombatStats,
    /// Innate flags (affects contribute more through `has_aff`)
    pub aff_flags: FlagSet<AffFlag>,
    pub affects: Vec<Affect>,
    pub dots: Vec<Dot>,

    // Combat linkage. Never persisted: nothing is mid-fight across a restart.
    #[serde(skip)]
    pub fighting: Option<CharId>,
    #[serde(skip)]
    pub fight_mode: FightMode,
    #[serde(skip)]
    pub last_swing_main: u64,
    #[serde(skip)]
    pub last_swing_off: u64,
    #[serde(skip)]
    pub in_combat_list: bool,

    pub equipment: AHashMap<WearSlot, ObjId>,
    pub inventory: Vec<ObjId>,
    pub abilities: AHashMap<Ability, i32>,
    pub skill_exp: AHashMap<Ability, f64>,
    pub techs: AHashSet<Tech>,

    #[serde(skip)]
    pub leader: Option<CharId>,
    #[serde(skip)]
    pub group: Option<GroupId>,
    pub empire: Option<EmpireId>,
    pub morph: Option<String>,
    pub disguise: Option<String>,
    pub mount: Option<Vnum>,
    #[serde(skip)]
    pub hunting: Option<CharId>,
    #[serde(skip)]
    pub tagged_by: Vec<CharId>,
    #[serde(skip)]
    pub feeding_from: Option<CharId>,
    #[serde(skip)]
    pub fed_on_by: Option<CharId>,

    pub meters: CombatMeters,
    /// Percent of pools restored if this character would die
    pub auto_resurrect: Option<i32>,
    /// Set once a player's death has been fully processed
    pub death_handled: bool,
    pub cooldowns: AHashMap<Cooldown, u64>,
    #[serde(skip)]
    pub desc: Option<Connection>,
}

impl Character {
    fn base(name: &str, kind: CharKind, level: i32) -> Self {
        Self {
            name: name.to_string(),
            kind,
            level,
            room: RoomId(0),
            position: Position::Standing,
            pools: Pools::full(100, 100, 100, 100),
            attributes: Attributes::default(),
            stats: CombatStats::default(),
            aff_flags: FlagSet::empty(),
            affects: Vec::new(),
            dots: Vec::new(),
            fighting: None,
            fight_mode: FightMode::Melee,
            last_swing_main: 0,
            last_swing_off: 0,
            in_combat_list: false,
            equipment: AHashMap::new(),
            inventory: Vec::new(),
            abilities: AHashMap::new(),
            skill_exp: AHashMap::new(),
            techs: AHashSet::new(),
            leader: None,
            group: None,
            empire: None,
            morph: None,
            disguise: None,
            mount: None,
            hunting: None,
            tagged_by: Vec::new(),
            feeding_from: None,
            fed_on_by: None,
            meters: CombatMeters::new(),
            auto_resurrect: None,
            death_handled: false,
            cooldowns: AHashMap::new(),
            desc: None,
        }
    }

    /// A connected player
    pub fn player(name: &str, level: i32) -> Self {
        let mut ch = Self::base(name, CharKind::Player(Box::default()), level);
        ch.desc = Some(Connection::default());
        ch
    }

    pub fn npc(name: &str, vnum: Vnum, level: i32) -> Self {
        let mut mob = MobData::new(vnum);
        mob.min_level = level;
        mob.max_level = level;
        Self::base(name, CharKind::Npc(Box::new(mob)), level)
    }

    pub fn is_npc(&self) -> bool {
        matches!(self.kind, CharKind::Npc(_))
    }

    pub fn player_data(&self) -> Option<&PlayerData> {
        match &self.kind {
            CharKind::Player(p) => Some(p),
            CharKind::Npc(_) => None,
        }
    }

    pub fn player_data_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.kind {
            CharKind::Player(p) => Some(p),
            CharKind::Npc(_) => None,
        }
    }

    pub fn mob(&self) -> Option<&MobData> {
        match &self.kind {
            CharKind::Npc(m) => Some(m),
            CharKind::Player(_) => None,
        }
    }

    pub fn mob_mut(&mut self) -> Option<&mut MobData> {
        match &mut self.kind {
            CharKind::Npc(m) => Some(m),
            CharKind::Player(_) => None,
        }
    }

    pub fn account(&self) -> Option<AccountId> {
        self.player_data().map(|p| p.account)
    }

    pub fn vnum(&self) -> Option<Vnum> {
        self.mob().map(|m| m.vnum)
    }

    // === FLAG QUERIES ===

    /// Innate flag or granted by any active affect
    pub fn has_aff(&self, flag: AffFlag) -> bool {
        self.aff_flags.has(flag) || self.affects.iter().any(|af| af.flags.has(flag))
    }

    pub fn has_mob_flag(&self, flag: MobFlag) -> bool {
        self.mob().is_some_and(|m| m.flags.has(flag))
    }

    pub fn has_pref(&self, pref: Pref) -> bool {
        self.player_data().is_some_and(|p| p.prefs.has(pref))
    }

    /// Techs only exist on players
    pub fn has_tech(&self, tech: Tech) -> bool {
        !self.is_npc() && self.techs.contains(&tech)
    }

    pub fn ability_level(&self, ability: Ability) -> i32 {
        self.abilities.get(&ability).copied().unwrap_or(0)
    }

    pub fn can_use_ability(&self, ability: Ability) -> bool {
        !self.is_npc() && self.ability_level(ability) > 0
    }

    pub fn admin(&self) -> AdminLevel {
        self.player_data().map(|p| p.admin).unwrap_or_default()
    }

    pub fn is_immortal(&self) -> bool {
        self.admin() >= AdminLevel::Immortal
    }

    pub fn is_vampire(&self) -> bool {
        self.has_tech(Tech::Vampirism) || self.ability_level(Ability::Vampire) > 0
    }

    pub fn role(&self) -> Role {
        self.player_data().map(|p| p.role).unwrap_or_default()
    }

    pub fn is_awake(&self) -> bool {
        self.position.is_awake()
    }

    pub fn has_affect(&self, kind: AffectType) -> bool {
        self.affects.iter().any(|af| af.kind == kind)
    }

    pub fn is_stunned(&self) -> bool {
        self.has_aff(AffFlag::Stunned) || self.has_aff(AffFlag::HardStunned)
    }

    // === STATS ===

    /// Sum of all affect modifiers to one stat
    pub fn apply_total(&self, apply: Apply) -> i32 {
        self.affects
            .iter()
            .filter(|af| af.apply == apply)
            .map(|af| af.modifier)
            .sum()
    }

    pub fn strength(&self) -> i32 {
        self.attributes.strength + self.apply_total(Apply::Strength)
    }

    pub fn dexterity(&self) -> i32 {
        self.attributes.dexterity + self.apply_total(Apply::Dexterity)
    }

    pub fn intelligence(&self) -> i32 {
        self.attributes.intelligence + self.apply_total(Apply::Intelligence)
    }

    pub fn wits(&self) -> i32 {
        self.attributes.wits + self.apply_total(Apply::Wits)
    }

    pub fn to_hit(&self) -> i32 {
        self.stats.to_hit + self.apply_total(Apply::ToHit)
    }

    pub fn dodge(&self) -> i32 {
        self.stats.dodge + self.apply_total(Apply::Dodge)
    }

    pub fn block(&self) -> i32 {
        self.stats.block + self.apply_total(Apply::Block)
    }

    pub fn resist_physical(&self) -> i32 {
        self.stats.resist_physical + self.apply_total(Apply::ResistPhysical)
    }

    pub fn resist_magical(&self) -> i32 {
        self.stats.resist_magical + self.apply_total(Apply::ResistMagical)
    }

    pub fn bonus_physical(&self) -> i32 {
        self.stats.bonus_physical + self.apply_total(Apply::BonusPhysical)
    }

    pub fn bonus_magical(&self) -> i32 {
        self.stats.bonus_magical + self.apply_total(Apply::BonusMagical)
    }

    // === VISIBILITY ===

    /// Whether this character can perceive `target` well enough to aim at it
    pub fn can_see(&self, target: &Character) -> bool {
        if self.is_immortal() {
            return true;
        }
        if self.has_aff(AffFlag::Blind) {
            return false;
        }
        if target.has_aff(AffFlag::Invisible)
            && !(self.has_aff(AffFlag::DetectInvisible) || self.has_tech(Tech::SeeInvisible))
        {
            return false;
        }
        if target.has_aff(AffFlag::Hide) && !self.has_aff(AffFlag::SenseHide) {
            return false;
        }
        true
    }

    // === POSITION ===

    /// Degrade position from current health; never improves it
    pub fn update_pos(&mut self) {
        self.position = self.position.degraded_by(self.pools.health);
    }

    /// Explicit recovery for heal/regen paths once health is positive again
    pub fn recover_pos(&mut self) {
        if self.pools.health > 0 && self.position <= Position::Stunned {
            self.position = if self.is_npc() {
                Position::Standing
            } else {
                Position::Resting
            };
        }
    }

    pub fn health_percent(&self) -> i32 {
        if self.pools.max_health <= 0 {
            return 0;
        }
        self.pools.health * 100 / self.pools.max_health
    }

    // === OUTPUT ===

    /// Queue a line for the player; dropped when nobody is connected
    pub fn send(&mut self, text: impl Into<String>) {
        if let Some(desc) = self.desc.as_mut() {
            desc.outbox.push(text.into());
        }
    }

    /// Drain queued output
    pub fn take_output(&mut self) -> Vec<String> {
        self.desc
            .as_mut()
            .map(|d| std::mem::take(&mut d.outbox))
            .unwrap_or_default()
    }

    pub fn is_connected(&self) -> bool {
        self.desc.is_some()
    }
}
