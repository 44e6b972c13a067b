pub mod attack;
pub mod damage;
pub mod death;
pub mod engage;
pub mod hooks;
pub mod messages;
pub mod registry;
pub mod resolver;
pub mod round;
pub mod speed;

pub use attack::{AttackType, DamageType, WeaponAttack};
pub use damage::{damage, damage_with, Strike, TargetGone};
pub use death::{die, perform_execute, stop_combat_no_autokill};
pub use engage::{
    can_fight, engage_combat, is_fight_ally, is_fight_enemy, perform_rescue, set_fighting,
    stop_fighting, FightBlocked,
};
pub use hooks::{AbilityHook, CombatHooks, DefaultHooks};
pub use registry::CombatRegistry;
pub use round::{frequent_combat, hit};
pub use speed::get_combat_speed;
