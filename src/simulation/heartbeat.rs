//! Heartbeat - the pulse loop
//!
//! Ten pulses a second. Every pulse runs the combat driver; every fiftieth
//! pulse also runs the real update.

use crate::combat::round::frequent_combat;
use crate::core::clock::PASSES_PER_SEC;
use crate::simulation::update::real_update;
use crate::world::World;

/// What a single pulse did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PulseReport {
    pub pulse: u64,
    /// Characters in the combat registry when the pulse ended
    pub fighting: usize,
    pub real_update: bool,
}

/// Advance the world one pulse
pub fn pulse(world: &mut World) -> PulseReport {
    world.clock.advance();
    frequent_combat(world);

    let real = world.clock.is_real_update_pulse();
    if real {
        real_update(world);
        tracing::debug!(
            pulse = world.clock.pulse(),
            chars = world.chars.len(),
            "real update"
        );
    }

    PulseReport {
        pulse: world.clock.pulse(),
        fighting: world.combat.len(),
        real_update: real,
    }
}

/// Run `count` pulses back to back
pub fn run_pulses(world: &mut World, count: u64) -> Vec<PulseReport> {
    (0..count).map(|_| pulse(world)).collect()
}

/// Run whole seconds of game time
pub fn run_for_seconds(world: &mut World, seconds: u64) -> Vec<PulseReport> {
    run_pulses(world, seconds * PASSES_PER_SEC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::PULSES_PER_REAL_UPDATE;
    use crate::core::config::GameConfig;

    #[test]
    fn test_real_update_every_fifty_pulses() {
        let mut world = World::new(GameConfig::default());
        let reports = run_pulses(&mut world, PULSES_PER_REAL_UPDATE * 3);
        let real: Vec<u64> = reports
            .iter()
            .filter(|r| r.real_update)
            .map(|r| r.pulse)
            .collect();
        assert_eq!(real, vec![50, 100, 150]);
        assert_eq!(world.clock.real_updates(), 3);
    }

    #[test]
    fn test_run_for_seconds() {
        let mut world = World::new(GameConfig::default());
        let start = world.clock.timestamp();
        run_for_seconds(&mut world, 2);
        assert_eq!(world.clock.pulse(), 20);
        assert_eq!(world.clock.timestamp(), start + 2);
    }
}
