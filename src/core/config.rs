//! Game configuration with documented constants
//!
//! All tunables the combat and update engines read are collected here.
//! Values load from TOML; any key left out keeps its default.

use crate::core::clock::SECS_PER_REAL_WEEK;
use crate::core::error::{MudError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for combat and periodic-update systems
///
/// Defaults are playable but not tuned; balance lives in the data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === HIT / DODGE / BLOCK ===
    /// Flat to-hit every attacker starts with
    pub to_hit_base: i32,

    /// To-hit gained per point of dexterity
    pub to_hit_per_dex: i32,

    /// Dodge gained per point of dexterity
    pub dodge_per_dex: i32,

    /// Floor on an NPC attacker's hit chance (percent)
    ///
    /// Only applies while attacker and victim are within
    /// `to_hit_level_tolerance` levels of each other.
    pub min_npc_to_hit: i32,

    /// Amount subtracted from a player attacker's roll (percent)
    ///
    /// Same level-tolerance gate as `min_npc_to_hit`.
    pub min_pc_to_hit: i32,

    /// Level difference inside which the to-hit floors apply
    pub to_hit_level_tolerance: i32,

    /// Hard cap on block chance (percent)
    pub max_block_chance: i32,

    /// Block rating needed per attacker level to reach the cap
    pub block_rating_per_level: f64,

    /// Extra block target against "hard" NPCs (fraction)
    pub block_hard_adjustment: f64,

    /// Extra block target against "group" NPCs (fraction)
    pub block_group_adjustment: f64,

    // === RESISTANCE ===
    /// Damage fraction removed by a resist at its cap (half attacker level)
    pub max_resist_reduction: f64,

    /// Largest fraction a resist penalty can add to damage
    pub max_resist_penalty: f64,

    // === SPEED ===
    /// Speed multiplier while hastened
    pub haste_speed_multiplier: f64,

    /// Speed multiplier while slowed
    pub slow_speed_multiplier: f64,

    /// Fractional speed reduction from the fast-melee/fast-ranged techs
    pub fast_combat_reduction: f64,

    /// Fractional speed reduction per four points of wits
    pub speed_per_four_wits: f64,

    // === DAMAGE ===
    /// Multiplier for the mastery bonuses (dagger, two-handed, staff)
    pub mastery_multiplier: f64,

    /// Multiplier against animals with the slayer tech
    pub animal_slayer_multiplier: f64,

    // === RANGE ===
    /// Rounds a melee fighter spends closing on a missile fighter
    pub close_distance_rounds: u32,

    /// Feeding drain per real update, in blood points
    pub feed_drain: i32,

    // === DEATH ===
    /// Health forced onto a dead player
    pub dead_health_sentinel: i32,

    /// Seconds before a dead player may respawn
    pub respawn_cooldown_secs: u64,

    /// Seconds a PK record is kept
    pub pk_record_lifetime_secs: u64,

    /// Real updates before an NPC corpse decays
    pub npc_corpse_timer: i32,

    // === REGENERATION ===
    /// Health regained per real update while standing
    pub health_regen: i32,

    /// Move regained per real update while standing
    pub move_regen: i32,

    /// Mana regained per real update while standing
    pub mana_regen: i32,

    /// Seconds of sleep that refill an empty pool completely
    pub sleep_refill_secs: u64,

    // === AFFECTS ===
    /// Real updates of stun immunity granted when a stun wears off
    pub stun_immunity_updates: i32,

    // === CONDITIONS ===
    /// Upper bound for hunger, thirst and drunkenness
    pub max_condition: i32,

    /// Move lost per real update while swimming without a boat
    pub swim_move_cost: i32,

    /// Percent of max health lost per real update while drowning or starved of blood
    pub suffering_damage_percent: i32,

    /// Maximum NPC followers a player may keep
    pub npc_follower_limit: usize,

    /// Real updates a connected player may idle before disconnect
    pub idle_timeout_updates: u32,

    // === POINT UPDATE ===
    /// Mounts a stable room holds before extras wander off
    pub stable_capacity: usize,

    /// Carrying weight per point of strength
    pub carry_weight_per_strength: i32,

    /// Carrying weight everyone has
    pub carry_weight_base: i32,

    /// Map distance at which a spawned NPC with no nearby players despawns
    pub spawn_despawn_distance: f64,

    /// Max health an NPC gains per scaled level
    pub npc_health_per_level: i32,

    // === RANDOMNESS ===
    /// Seed for the world RNG
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            to_hit_base: 50,
            to_hit_per_dex: 5,
            dodge_per_dex: 5,
            min_npc_to_hit: 25,
            min_pc_to_hit: 25,
            to_hit_level_tolerance: 50,
            max_block_chance: 50,
            block_rating_per_level: 1.0,
            block_hard_adjustment: 0.10,
            block_group_adjustment: 0.30,

            max_resist_reduction: 0.25,
            max_resist_penalty: 0.50,

            haste_speed_multiplier: 0.8,
            slow_speed_multiplier: 1.5,
            fast_combat_reduction: 0.10,
            speed_per_four_wits: 0.05,

            mastery_multiplier: 1.5,
            animal_slayer_multiplier: 2.0,

            close_distance_rounds: 3,
            feed_drain: 10,

            dead_health_sentinel: -100,
            respawn_cooldown_secs: 60,
            pk_record_lifetime_secs: SECS_PER_REAL_WEEK,
            npc_corpse_timer: 30,

            health_regen: 3,
            move_regen: 5,
            mana_regen: 3,
            sleep_refill_secs: 300,

            stun_immunity_updates: 2,

            max_condition: 750,
            swim_move_cost: 2,
            suffering_damage_percent: 10,
            npc_follower_limit: 2,
            idle_timeout_updates: 180,

            stable_capacity: 4,
            carry_weight_per_strength: 10,
            carry_weight_base: 25,
            spawn_despawn_distance: 10.0,
            npc_health_per_level: 10,

            seed: 0,
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(0..=100).contains(&self.max_block_chance) {
            return Err(MudError::InvalidConfig(format!(
                "max_block_chance ({}) must be a percentage",
                self.max_block_chance
            )));
        }

        if self.block_rating_per_level <= 0.0 {
            return Err(MudError::InvalidConfig(
                "block_rating_per_level must be positive".into(),
            ));
        }

        if !(0.0..1.0).contains(&self.max_resist_reduction) {
            return Err(MudError::InvalidConfig(format!(
                "max_resist_reduction ({}) must be in [0, 1)",
                self.max_resist_reduction
            )));
        }

        // Haste must speed up, slow must slow down
        if self.haste_speed_multiplier > 1.0 || self.slow_speed_multiplier < 1.0 {
            return Err(MudError::InvalidConfig(format!(
                "haste ({}) must be <= 1 and slow ({}) >= 1",
                self.haste_speed_multiplier, self.slow_speed_multiplier
            )));
        }

        if self.dead_health_sentinel >= 0 {
            return Err(MudError::InvalidConfig(
                "dead_health_sentinel must be negative".into(),
            ));
        }

        if self.sleep_refill_secs == 0 {
            return Err(MudError::InvalidConfig(
                "sleep_refill_secs must be positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml("min_npc_to_hit = 40\nseed = 7\n").unwrap();
        assert_eq!(config.min_npc_to_hit, 40);
        assert_eq!(config.seed, 7);
        assert_eq!(config.to_hit_level_tolerance, 50);
    }

    #[test]
    fn test_invalid_block_cap_rejected() {
        let result = GameConfig::from_toml("max_block_chance = 150\n");
        assert!(matches!(result, Err(MudError::InvalidConfig(_))));
    }

    #[test]
    fn test_positive_death_sentinel_rejected() {
        let config = GameConfig {
            dead_health_sentinel: 5,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
