//! Character position: strictly ordered from dead to standing

use serde::{Deserialize, Serialize};

/// Ordered so checks like `pos < Position::Fighting` read naturally
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Position {
    Dead,
    MortallyWounded,
    Incapacitated,
    Stunned,
    Sleeping,
    Resting,
    Sitting,
    Fighting,
    #[default]
    Standing,
}

/// Health at or below which a character is dead
pub const DEAD_HEALTH: i32 = -11;
/// Health at or below which a character is mortally wounded
pub const MORTAL_HEALTH: i32 = -6;
/// Health at or below which a character is incapacitated
pub const INCAP_HEALTH: i32 = -3;

impl Position {
    /// Position implied by a health value that is zero or below
    ///
    /// Returns `None` for positive health: positive health never forces a
    /// position change.
    pub fn for_health(health: i32) -> Option<Position> {
        if health > 0 {
            None
        } else if health <= DEAD_HEALTH {
            Some(Position::Dead)
        } else if health <= MORTAL_HEALTH {
            Some(Position::MortallyWounded)
        } else if health <= INCAP_HEALTH {
            Some(Position::Incapacitated)
        } else {
            Some(Position::Stunned)
        }
    }

    /// Awake characters can dodge and notice attackers
    pub fn is_awake(self) -> bool {
        self > Position::Sleeping
    }

    /// Recompute position from health; only ever degrades
    pub fn degraded_by(self, health: i32) -> Position {
        match Position::for_health(health) {
            Some(implied) => self.min(implied),
            None => self,
        }
    }
}
