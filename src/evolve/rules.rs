//! Sector transition rules
//!
//! Rules are read from TOML:
//!
//! ```toml
//! [[rule]]
//! name = "forest spreads"
//! from = 0
//! to = 3
//! percent = 2.5
//! adjacent = 3
//! min_adjacent = 2
//! ```
//!
//! Every tile is checked against the unmodified snapshot, so one pass never
//! cascades. The first matching rule whose roll succeeds wins.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{MudError, Result};
use crate::evolve::format::{DiffRecord, MapSnapshot, TILE_NO_EVOLVE};

fn default_min_adjacent() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionRule {
    pub name: String,
    pub from: u32,
    pub to: u32,
    /// Chance per pass, 0-100
    pub percent: f64,
    /// Sector that must border the tile
    #[serde(default)]
    pub adjacent: Option<u32>,
    #[serde(default = "default_min_adjacent")]
    pub min_adjacent: usize,
}

impl EvolutionRule {
    fn neighbours_ok(&self, map: &MapSnapshot, x: u32, y: u32) -> bool {
        let Some(sector) = self.adjacent else {
            return true;
        };
        count_adjacent(map, x, y, sector) >= self.min_adjacent
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionRules {
    #[serde(default, rename = "rule")]
    pub rules: Vec<EvolutionRule>,
}

impl EvolutionRules {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let rules: EvolutionRules = toml::from_str(content)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            if !(0.0..=100.0).contains(&rule.percent) {
                return Err(MudError::InvalidConfig(format!(
                    "rule '{}': percent ({}) must be in [0, 100]",
                    rule.name, rule.percent
                )));
            }
            if rule.from == rule.to {
                return Err(MudError::InvalidConfig(format!(
                    "rule '{}' maps sector {} onto itself",
                    rule.name, rule.from
                )));
            }
            if rule.min_adjacent > 8 {
                return Err(MudError::InvalidConfig(format!(
                    "rule '{}': a tile has at most 8 neighbours",
                    rule.name
                )));
            }
        }
        Ok(())
    }
}

/// Neighbouring tiles (8-way, no wraparound) with the given sector
pub fn count_adjacent(map: &MapSnapshot, x: u32, y: u32, sector: u32) -> usize {
    let mut count = 0;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let (nx, ny) = (x as i64 + dx, y as i64 + dy);
            if nx < 0 || ny < 0 {
                continue;
            }
            if map
                .tile(nx as u32, ny as u32)
                .is_some_and(|t| t.sector == sector)
            {
                count += 1;
            }
        }
    }
    count
}

/// One evolution pass over the snapshot
pub fn evolve(map: &MapSnapshot, rules: &EvolutionRules, rng: &mut impl Rng) -> Vec<DiffRecord> {
    let mut diffs = Vec::new();
    for y in 0..map.height() {
        for x in 0..map.width() {
            let Some(tile) = map.tile(x, y) else {
                continue;
            };
            if tile.flags & TILE_NO_EVOLVE != 0 {
                continue;
            }
            let chosen = rules.rules.iter().find(|rule| {
                rule.from == tile.sector
                    && rule.neighbours_ok(map, x, y)
                    && rng.gen::<f64>() * 100.0 < rule.percent
            });
            if let Some(rule) = chosen {
                diffs.push(DiffRecord {
                    vnum: tile.vnum,
                    old_sector: tile.sector,
                    new_sector: rule.to,
                });
            }
        }
    }
    tracing::debug!(changes = diffs.len(), "evolution pass complete");
    diffs
}

/// Write the diffs back into the snapshot (for chaining offline passes)
pub fn apply_to_snapshot(map: &mut MapSnapshot, diffs: &[DiffRecord], timestamp: u64) {
    for diff in diffs {
        if let Some(tile) = map
            .tiles
            .iter_mut()
            .find(|t| t.vnum == diff.vnum && t.sector == diff.old_sector)
        {
            tile.sector = diff.new_sector;
            tile.last_change = timestamp;
        }
    }
}
