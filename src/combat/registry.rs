//! Registry of every character currently in combat
//!
//! Newest entrants come first. Walks always go over a snapshot, so a
//! character killed mid-pass (and everyone it took with it) simply fails
//! revalidation when its turn comes.

use crate::core::types::CharId;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct CombatRegistry {
    members: VecDeque<CharId>,
}

impl CombatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to the front; returns false if already present
    pub fn add(&mut self, id: CharId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.members.push_front(id);
        true
    }

    pub fn remove(&mut self, id: CharId) -> bool {
        match self.members.iter().position(|&m| m == id) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: CharId) -> bool {
        self.members.contains(&id)
    }

    /// Members in iteration order (newest first)
    pub fn snapshot(&self) -> Vec<CharId> {
        self.members.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ArenaKey, Handle};

    fn id(index: u32) -> CharId {
        CharId::from_key(ArenaKey {
            index,
            generation: 0,
        })
    }

    #[test]
    fn test_newest_first() {
        let mut reg = CombatRegistry::new();
        reg.add(id(1));
        reg.add(id(2));
        reg.add(id(3));
        assert_eq!(reg.snapshot(), vec![id(3), id(2), id(1)]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut reg = CombatRegistry::new();
        assert!(reg.add(id(1)));
        assert!(!reg.add(id(1)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_removal_during_snapshot_walk() {
        let mut reg = CombatRegistry::new();
        for i in 0..5 {
            reg.add(id(i));
        }
        let mut visited = Vec::new();
        for member in reg.snapshot() {
            if !reg.contains(member) {
                continue;
            }
            visited.push(member);
            // Killing 3 also removes 1
            if member == id(3) {
                reg.remove(id(3));
                reg.remove(id(1));
            }
        }
        assert_eq!(visited, vec![id(4), id(3), id(2), id(0)]);
        assert_eq!(reg.len(), 3);
    }
}
