//! Simulation clock
//!
//! One pulse is a tenth of a second. Everything else (combat seconds, real
//! updates, mud hours) is derived from the pulse counter, so the clock can be
//! driven by a real timer in the server or stepped manually in tests.

/// Pulses per real second
pub const PASSES_PER_SEC: u64 = 10;

/// Microseconds per pulse
pub const PULSE_MICROS: u64 = 1_000_000 / PASSES_PER_SEC;

/// Real seconds between real updates
pub const SECS_PER_REAL_UPDATE: u64 = 5;

/// Pulses between real updates
pub const PULSES_PER_REAL_UPDATE: u64 = SECS_PER_REAL_UPDATE * PASSES_PER_SEC;

/// Real updates per in-game hour (75 real seconds)
pub const REAL_UPDATES_PER_MUD_HOUR: u64 = 15;

/// Seconds in one real week (PK record lifetime default)
pub const SECS_PER_REAL_WEEK: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Default)]
pub struct Clock {
    /// Pulses since the world started
    pulse: u64,
    /// Microseconds since the world started
    micros: u64,
    /// Unix seconds at pulse 0
    epoch_secs: u64,
    /// Number of real updates run so far
    real_updates: u64,
    /// Last pulse on which the combat driver ran
    last_combat_pulse: Option<u64>,
}

impl Clock {
    pub fn new(epoch_secs: u64) -> Self {
        Self {
            epoch_secs,
            ..Self::default()
        }
    }

    pub fn pulse(&self) -> u64 {
        self.pulse
    }

    pub fn now_micros(&self) -> u64 {
        self.micros
    }

    /// Wall-clock seconds (used for PK records, lore and cooldowns)
    pub fn timestamp(&self) -> u64 {
        self.epoch_secs + self.micros / 1_000_000
    }

    pub fn real_updates(&self) -> u64 {
        self.real_updates
    }

    /// Advance one pulse
    pub fn advance(&mut self) {
        self.pulse += 1;
        self.micros += PULSE_MICROS;
    }

    /// Move the microsecond clock without counting pulses (tests, catch-up)
    pub fn advance_micros(&mut self, micros: u64) {
        self.micros += micros;
    }

    /// True on the first pulse of each real second
    pub fn is_second_boundary(&self) -> bool {
        self.pulse % PASSES_PER_SEC == 0
    }

    /// True when a real update is due on this pulse
    pub fn is_real_update_pulse(&self) -> bool {
        self.pulse % PULSES_PER_REAL_UPDATE == 0
    }

    pub(crate) fn note_real_update(&mut self) {
        self.real_updates += 1;
    }

    /// Claim the combat pass for this pulse; false if it already ran
    pub(crate) fn claim_combat_pulse(&mut self) -> bool {
        if self.last_combat_pulse == Some(self.pulse) {
            return false;
        }
        self.last_combat_pulse = Some(self.pulse);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_moves_micros() {
        let mut clock = Clock::new(1_000);
        for _ in 0..PASSES_PER_SEC {
            clock.advance();
        }
        assert_eq!(clock.now_micros(), 1_000_000);
        assert_eq!(clock.timestamp(), 1_001);
        assert!(clock.is_second_boundary());
    }

    #[test]
    fn test_combat_pulse_claimed_once() {
        let mut clock = Clock::default();
        assert!(clock.claim_combat_pulse());
        assert!(!clock.claim_combat_pulse());
        clock.advance();
        assert!(clock.claim_combat_pulse());
    }

    #[test]
    fn test_real_update_cadence() {
        let mut clock = Clock::default();
        let mut due = 0;
        for _ in 0..PULSES_PER_REAL_UPDATE * 3 {
            clock.advance();
            if clock.is_real_update_pulse() {
                due += 1;
            }
        }
        assert_eq!(due, 3);
    }
}
