pub mod affect;
pub mod character;
pub mod flags;
pub mod meters;
pub mod position;

pub use affect::{Affect, AffectType, Apply, Dot, UNLIMITED};
pub use character::{
    Attributes, CharKind, Character, CombatStats, Conditions, Connection, Cooldown, FightMode, LootEntry, LoreEntry,
    LoreKind, MobData, PlayerData, Pools,
};
pub use flags::{Ability, AdminLevel, AffFlag, MobFlag, Pref, Role, RoomFlag, Tech};
pub use meters::CombatMeters;
pub use position::Position;
