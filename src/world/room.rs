//! Rooms and the things the combat engine reads from them

use crate::core::types::{CharId, FlagSet, InstanceId, ObjId, RoomId};
use crate::entity::flags::RoomFlag;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub flags: FlagSet<RoomFlag>,
    /// Map coordinates, used for distance checks
    pub x: i32,
    pub y: i32,
    /// Terrain sector; rewritten by evolution diffs
    pub sector: u32,
    pub instance: Option<InstanceId>,
    pub exits: Vec<RoomId>,

    /// Occupants, newest arrival first
    #[serde(skip)]
    pub(crate) people: Vec<CharId>,
    #[serde(skip)]
    pub(crate) contents: Vec<ObjId>,
}

impl Room {
    pub fn new(id: RoomId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            flags: FlagSet::empty(),
            x: 0,
            y: 0,
            sector: 0,
            instance: None,
            exits: Vec::new(),
            people: Vec::new(),
            contents: Vec::new(),
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_flag(mut self, flag: RoomFlag) -> Self {
        self.flags.set(flag);
        self
    }

    pub fn people(&self) -> &[CharId] {
        &self.people
    }

    pub fn contents(&self) -> &[ObjId] {
        &self.contents
    }

    pub fn distance_to(&self, other: &Room) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Room::new(RoomId(1), "a").at(0, 0);
        let b = Room::new(RoomId(2), "b").at(3, 4);
        assert!((a.distance_to(&b) - 5.0).abs() < f64::EPSILON);
    }
}
