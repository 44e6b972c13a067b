//! Combat message tables
//!
//! Weapon hits are described by damage tier. Misses, kills, self-hits and
//! every ability go through the skill message table instead.

use crate::combat::attack::{AttackType, WeaponAttack};
use crate::core::types::CharId;
use crate::world::{Audience, World};

/// Threshold of the final tier, which matches any damage
pub const SENTINEL_TIER: i32 = -1;

/// One row of the damage-tier table
///
/// `#w`/`#W` expand to the attack's singular/plural verb. The victim sees
/// `other` with `$N` replaced by "you".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageTier {
    /// Highest damage this tier describes, or [`SENTINEL_TIER`]
    pub max: i32,
    pub actor: &'static str,
    pub other: &'static str,
}

const fn tier(max: i32, actor: &'static str, other: &'static str) -> DamageTier {
    DamageTier { max, actor, other }
}

pub static DAMAGE_TIERS: [DamageTier; 35] = [
    tier(0, "You miss $N with your #w.", "$n misses $N with $s #w."),
    tier(1, "You tickle $N with your #w.", "$n tickles $N with $s #w."),
    tier(2, "You barely #w $N.", "$n barely #W $N."),
    tier(3, "You lightly #w $N.", "$n lightly #W $N."),
    tier(4, "You #w $N.", "$n #W $N."),
    tier(5, "You #w $N firmly.", "$n #W $N firmly."),
    tier(6, "You #w $N hard.", "$n #W $N hard."),
    tier(8, "You #w $N very hard.", "$n #W $N very hard."),
    tier(10, "You #w $N extremely hard.", "$n #W $N extremely hard."),
    tier(12, "You #w $N brutally.", "$n #W $N brutally."),
    tier(14, "You #w $N savagely.", "$n #W $N savagely."),
    tier(16, "You #w $N viciously.", "$n #W $N viciously."),
    tier(18, "You wound $N with your #w.", "$n wounds $N with $s #w."),
    tier(20, "You badly wound $N with your #w.", "$n badly wounds $N with $s #w."),
    tier(23, "You maul $N with your #w.", "$n mauls $N with $s #w."),
    tier(26, "You maim $N with your #w.", "$n maims $N with $s #w."),
    tier(30, "You mangle $N with your #w.", "$n mangles $N with $s #w."),
    tier(35, "You lacerate $N with your #w.", "$n lacerates $N with $s #w."),
    tier(40, "You rend $N with your #w.", "$n rends $N with $s #w."),
    tier(45, "You ravage $N with your #w.", "$n ravages $N with $s #w."),
    tier(50, "You eviscerate $N with your #w.", "$n eviscerates $N with $s #w."),
    tier(60, "You shred $N with your #w.", "$n shreds $N with $s #w."),
    tier(70, "You massacre $N with your #w.", "$n massacres $N with $s #w."),
    tier(80, "You MUTILATE $N with your #w!", "$n MUTILATES $N with $s #w!"),
    tier(90, "You DISEMBOWEL $N with your #w!", "$n DISEMBOWELS $N with $s #w!"),
    tier(100, "You DISMEMBER $N with your #w!", "$n DISMEMBERS $N with $s #w!"),
    tier(120, "You DEMOLISH $N with your #w!", "$n DEMOLISHES $N with $s #w!"),
    tier(140, "You DEVASTATE $N with your #w!", "$n DEVASTATES $N with $s #w!"),
    tier(160, "You OBLITERATE $N with your #w!!", "$n OBLITERATES $N with $s #w!!"),
    tier(180, "You ERADICATE $N with your #w!!", "$n ERADICATES $N with $s #w!!"),
    tier(200, "You ANNIHILATE $N with your #w!!", "$n ANNIHILATES $N with $s #w!!"),
    tier(250, "You EXTERMINATE $N with your #w!!", "$n EXTERMINATES $N with $s #w!!"),
    tier(300, "You LIQUIDATE $N with your #w!!!", "$n LIQUIDATES $N with $s #w!!!"),
    tier(400, "You VAPORIZE $N with your #w!!!", "$n VAPORIZES $N with $s #w!!!"),
    tier(SENTINEL_TIER, "You CONQUER $N with your #w!!!", "$n CONQUERS $N with $s #w!!!"),
];

/// Smallest tier whose threshold covers `dam`; the sentinel catches the rest
pub fn damage_tier(dam: i32) -> &'static DamageTier {
    DAMAGE_TIERS
        .iter()
        .find(|t| t.max == SENTINEL_TIER || dam <= t.max)
        .unwrap_or(&DAMAGE_TIERS[DAMAGE_TIERS.len() - 1])
}

fn expand_weapon(template: &str, attack: WeaponAttack) -> String {
    let info = attack.info();
    template
        .replace("#w", info.singular)
        .replace("#W", info.plural)
}

/// Describe a weapon hit by damage tier
pub fn dam_message(world: &mut World, dam: i32, ch: CharId, victim: CharId, attack: WeaponAttack) {
    let tier = damage_tier(dam);
    let actor = expand_weapon(tier.actor, attack);
    let other = expand_weapon(tier.other, attack);
    let to_victim = other.replace("$N", "you");

    world.act(&actor, ch, Some(victim), Audience::Actor);
    world.act(&to_victim, ch, Some(victim), Audience::Victim);
    world.act(&other, ch, Some(victim), Audience::Room);
}

/// Three viewpoints of one message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageSet {
    pub actor: String,
    pub victim: String,
    pub room: String,
}

impl MessageSet {
    fn new(actor: String, victim: String, room: String) -> Self {
        Self {
            actor,
            victim,
            room,
        }
    }
}

/// Skill-table messages for one attack type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkillMessages {
    pub hit: MessageSet,
    pub miss: MessageSet,
    pub die: MessageSet,
}

fn attack_label(attack: AttackType) -> String {
    match attack {
        AttackType::Weapon(w) => w.info().singular.to_string(),
        AttackType::Ability(a) => format!("{:?}", a).to_lowercase(),
        AttackType::Dot => "affliction".to_string(),
        AttackType::GuardTower => "arrow".to_string(),
        AttackType::Suffering => "suffering".to_string(),
        AttackType::Undefined => "blow".to_string(),
    }
}

/// Generic skill messages; used when content supplies none
pub fn skill_messages(attack: AttackType) -> SkillMessages {
    let name = attack_label(attack);
    SkillMessages {
        hit: MessageSet::new(
            format!("Your {name} hits $N."),
            format!("$n's {name} hits you."),
            format!("$n's {name} hits $N."),
        ),
        miss: MessageSet::new(
            format!("Your {name} misses $N."),
            format!("$n's {name} misses you."),
            format!("$n's {name} misses $N."),
        ),
        die: MessageSet::new(
            format!("Your {name} kills $N!"),
            format!("$n's {name} kills you!"),
            format!("$n's {name} kills $N!"),
        ),
    }
}

/// Deliver a skill message for one outcome
pub fn skill_message(
    world: &mut World,
    dam: i32,
    ch: CharId,
    victim: CharId,
    attack: AttackType,
    killed: bool,
    custom: Option<&SkillMessages>,
) {
    if ch == victim {
        let name = attack_label(attack);
        if killed {
            world.act(&format!("You succumb to {name}!"), victim, None, Audience::Actor);
            world.act(&format!("$n succumbs to {name}!"), victim, None, Audience::Room);
        } else if dam > 0 {
            world.act(&format!("You are hurt by {name}."), victim, None, Audience::Actor);
            world.act(&format!("$n is hurt by {name}."), victim, None, Audience::Room);
        }
        return;
    }

    let generic;
    let table = match custom {
        Some(t) => t,
        None => {
            generic = skill_messages(attack);
            &generic
        }
    };
    let set = if killed {
        &table.die
    } else if dam > 0 {
        &table.hit
    } else {
        &table.miss
    };
    let (actor, to_victim, room) = (set.actor.clone(), set.victim.clone(), set.room.clone());
    world.act(&actor, ch, Some(victim), Audience::Actor);
    world.act(&to_victim, ch, Some(victim), Audience::Victim);
    world.act(&room, ch, Some(victim), Audience::Room);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_table_ends_in_sentinel() {
        assert_eq!(DAMAGE_TIERS.len(), 35);
        assert_eq!(DAMAGE_TIERS[34].max, SENTINEL_TIER);
    }

    #[test]
    fn test_zero_is_a_miss() {
        assert!(damage_tier(0).actor.starts_with("You miss"));
    }

    #[test]
    fn test_huge_damage_conquers() {
        assert!(damage_tier(10_000).actor.contains("CONQUER"));
    }

    #[test]
    fn test_exact_threshold_selects_that_tier() {
        assert_eq!(damage_tier(10).max, 10);
        assert_eq!(damage_tier(11).max, 12);
        assert_eq!(damage_tier(400).max, 400);
        assert_eq!(damage_tier(401).max, SENTINEL_TIER);
    }

    #[test]
    fn test_expand_weapon() {
        let text = expand_weapon("$n #W $N with $s #w.", WeaponAttack::Slash);
        assert_eq!(text, "$n slashes $N with $s slash.");
    }

    proptest! {
        #[test]
        fn prop_smallest_covering_tier(dam in 0i32..100_000) {
            let chosen = damage_tier(dam);
            if chosen.max != SENTINEL_TIER {
                prop_assert!(dam <= chosen.max);
            }
            // No earlier tier covers it
            for t in DAMAGE_TIERS.iter().take_while(|t| !std::ptr::eq(*t, chosen)) {
                prop_assert!(t.max != SENTINEL_TIER && dam > t.max);
            }
        }
    }
}
