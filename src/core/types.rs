//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Slot index plus generation; a stale handle never resolves to a reused slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArenaKey {
    pub index: u32,
    pub generation: u32,
}

/// Typed handles stored in an [`crate::world::arena::Arena`]
pub trait Handle: Copy + Eq + std::hash::Hash + fmt::Debug {
    fn from_key(key: ArenaKey) -> Self;
    fn key(self) -> ArenaKey;

    /// Stable numeric id used for round-robin sharding
    fn shard(self) -> u64 {
        self.key().index as u64
    }
}

/// Weak reference to a character; resolves to nothing once the character is extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharId(pub ArenaKey);

impl fmt::Display for CharId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch#{}.{}", self.0.index, self.0.generation)
    }
}

impl Handle for CharId {
    fn from_key(key: ArenaKey) -> Self {
        Self(key)
    }
    fn key(self) -> ArenaKey {
        self.0
    }
}

/// Weak reference to an object (items, corpses)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjId(pub ArenaKey);

impl fmt::Display for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}.{}", self.0.index, self.0.generation)
    }
}

impl Handle for ObjId {
    fn from_key(key: ArenaKey) -> Self {
        Self(key)
    }
    fn key(self) -> ArenaKey {
        self.0
    }
}

/// Prototype number for mobs, objects and map tiles
pub type Vnum = i32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display(fmt = "room {}", _0)]
pub struct RoomId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display(fmt = "empire {}", _0)]
pub struct EmpireId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display(fmt = "faction {}", _0)]
pub struct FactionId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestId(pub u32);

/// Player account; PK records and loot binding are per account, not per character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

/// A flag enum that can live in a [`FlagSet`]
pub trait Flag: Copy {
    /// Bit position, must be < 64
    fn bit(self) -> u32;
}

/// Bitset of capability flags, queried with `has(flag)`
#[derive(Serialize, Deserialize)]
pub struct FlagSet<F> {
    bits: u64,
    #[serde(skip)]
    _marker: PhantomData<F>,
}

impl<F: Flag> FlagSet<F> {
    pub const fn empty() -> Self {
        Self {
            bits: 0,
            _marker: PhantomData,
        }
    }

    pub fn of(flags: &[F]) -> Self {
        let mut set = Self::empty();
        for flag in flags {
            set.set(*flag);
        }
        set
    }

    pub fn has(&self, flag: F) -> bool {
        self.bits & (1u64 << flag.bit()) != 0
    }

    pub fn set(&mut self, flag: F) {
        self.bits |= 1u64 << flag.bit();
    }

    pub fn remove(&mut self, flag: F) {
        self.bits &= !(1u64 << flag.bit());
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            bits: self.bits | other.bits,
            _marker: PhantomData,
        }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.bits & other.bits != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

impl<F> Clone for FlagSet<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for FlagSet<F> {}

impl<F> PartialEq for FlagSet<F> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<F> Eq for FlagSet<F> {}

impl<F> Default for FlagSet<F> {
    fn default() -> Self {
        Self {
            bits: 0,
            _marker: PhantomData,
        }
    }
}

impl<F> fmt::Debug for FlagSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlagSet({:#x})", self.bits)
    }
}

/// Round half away from zero, then cast back to the integer domain
pub fn round_to_int(value: f64) -> i32 {
    value.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    enum TestFlag {
        A,
        B,
    }

    impl Flag for TestFlag {
        fn bit(self) -> u32 {
            self as u32
        }
    }

    #[test]
    fn test_flagset_set_and_remove() {
        let mut set = FlagSet::<TestFlag>::empty();
        assert!(!set.has(TestFlag::A));
        set.set(TestFlag::A);
        assert!(set.has(TestFlag::A));
        assert!(!set.has(TestFlag::B));
        set.remove(TestFlag::A);
        assert!(set.is_empty());
    }

    #[test]
    fn test_flagset_intersects() {
        let a = FlagSet::of(&[TestFlag::A]);
        let ab = FlagSet::of(&[TestFlag::A, TestFlag::B]);
        let b = FlagSet::of(&[TestFlag::B]);
        assert!(a.intersects(&ab));
        assert!(!a.intersects(&b));
        assert_eq!(a.union(&b), ab);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to_int(2.5), 3);
        assert_eq!(round_to_int(-2.5), -3);
        assert_eq!(round_to_int(2.49), 2);
    }

    #[test]
    fn test_handle_display() {
        let id = CharId(ArenaKey { index: 3, generation: 1 });
        assert_eq!(id.to_string(), "ch#3.1");
    }
}
