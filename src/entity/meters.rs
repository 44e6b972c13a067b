//! Per-character combat meters
//!
//! A session starts on the first hit after the meters went idle and ends
//! when the character is no longer fighting and nobody is fighting them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatMeters {
    pub hits: u32,
    pub misses: u32,
    pub blocks: u32,
    pub dodges: u32,
    pub damage_dealt: i64,
    pub damage_taken: i64,
    /// Microsecond timestamp of the first hit in the session
    pub start: u64,
    pub end: u64,
    /// Session finished; the next hit starts a new one
    pub over: bool,
}

impl CombatMeters {
    pub fn new() -> Self {
        Self {
            over: true,
            ..Self::default()
        }
    }

    /// Reset if idle, so every session counts from its first exchange
    fn touch(&mut self, now: u64) {
        if self.over {
            *self = Self {
                start: now,
                end: now,
                ..Self::default()
            };
        }
        self.end = now;
    }

    pub fn record_dealt(&mut self, amount: i32, now: u64) {
        self.touch(now);
        if amount > 0 {
            self.hits += 1;
            self.damage_dealt += amount as i64;
        } else {
            self.misses += 1;
        }
    }

    pub fn record_taken(&mut self, amount: i32, now: u64) {
        self.touch(now);
        self.damage_taken += amount.max(0) as i64;
    }

    pub fn record_block(&mut self, now: u64) {
        self.touch(now);
        self.blocks += 1;
    }

    pub fn record_dodge(&mut self, now: u64) {
        self.touch(now);
        self.dodges += 1;
    }

    pub fn finish(&mut self, now: u64) {
        if !self.over {
            self.end = now;
            self.over = true;
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.end.saturating_sub(self.start) as f64 / 1_000_000.0
    }

    /// Damage per second over the session (a zero-length session counts as one second)
    pub fn dps(&self) -> f64 {
        self.damage_dealt as f64 / self.duration_secs().max(1.0)
    }
}
