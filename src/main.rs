//! EmpireMUD - Entry Point
//!
//! Runs the heartbeat against a small seeded arena at real-time speed: one
//! pulse every 100ms until the requested time is up or Ctrl-C arrives.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use empire_mud::combat::{engage_combat, WeaponAttack};
use empire_mud::core::clock::{PASSES_PER_SEC, PULSE_MICROS};
use empire_mud::core::config::GameConfig;
use empire_mud::core::error::Result;
use empire_mud::core::types::RoomId;
use empire_mud::entity::{Character, MobFlag};
use empire_mud::simulation::pulse;
use empire_mud::world::{Object, Room, WearSlot, World};

#[derive(Parser, Debug)]
#[command(name = "empire_mud")]
#[command(about = "Run the combat heartbeat against a seeded arena")]
struct Args {
    /// Seconds of game time to run (0 = until Ctrl-C)
    #[arg(long, default_value_t = 30)]
    seconds: u64,

    /// RNG seed; overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Game config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "empire_mud=info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()?;
    runtime.block_on(run(World::new(config), args.seconds));
    Ok(())
}

fn populate(world: &mut World) {
    let arena = world.add_room(Room::new(RoomId(1), "the training yard"));

    let hero = world.spawn(Character::player("Aldric", 30), arena);
    let sword = world.create_obj(Object::weapon("a longsword", WeaponAttack::Slash, 12));
    world.equip(hero, sword, WearSlot::Wield);

    for n in 0..3 {
        let mut wolf = Character::npc("a grey wolf", 100 + n, 25);
        if let Some(mob) = wolf.mob_mut() {
            mob.flags.set(MobFlag::Animal);
        }
        let wolf = world.spawn(wolf, arena);
        if let Err(reason) = engage_combat(world, wolf, hero, false) {
            tracing::warn!(%reason, "wolf could not engage");
        }
    }
}

async fn run(mut world: World, seconds: u64) {
    populate(&mut world);
    tracing::info!(seed = world.config.seed, chars = world.chars.len(), "EmpireMUD starting");

    let limit = (seconds > 0).then_some(seconds * PASSES_PER_SEC);
    let mut interval = tokio::time::interval(Duration::from_micros(PULSE_MICROS));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = pulse(&mut world);
                if report.real_update {
                    tracing::info!(
                        pulse = report.pulse,
                        fighting = report.fighting,
                        chars = world.chars.len(),
                        "heartbeat"
                    );
                }
                if limit.is_some_and(|l| report.pulse >= l) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    for (_, ch) in world.chars.iter() {
        tracing::info!(
            name = %ch.name,
            health = ch.pools.health,
            position = ?ch.position,
            dealt = ch.meters.damage_dealt,
            "final state"
        );
    }
}
