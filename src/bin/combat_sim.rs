//! Headless duel runner
//!
//! Pits a player against an NPC until one side drops or time runs out and
//! prints the meters as JSON.

use clap::Parser;
use empire_mud::combat::{engage_combat, WeaponAttack};
use empire_mud::core::clock::PASSES_PER_SEC;
use empire_mud::core::config::GameConfig;
use empire_mud::core::types::{CharId, RoomId};
use empire_mud::entity::{Character, Position, Pref};
use empire_mud::simulation::pulse;
use empire_mud::world::{Object, Room, WearSlot, World};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "combat_sim")]
#[command(about = "Run a player-vs-NPC duel and report combat meters")]
struct Args {
    #[arg(long, default_value_t = 30)]
    player_level: i32,

    #[arg(long, default_value_t = 30)]
    npc_level: i32,

    /// Player weapon damage
    #[arg(long, default_value_t = 10)]
    weapon: i32,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 300)]
    max_seconds: u64,

    /// Finish off a downed NPC instead of knocking it out
    #[arg(long)]
    autokill: bool,

    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

#[derive(Serialize)]
struct Side {
    name: String,
    present: bool,
    health: Option<i32>,
    position: Option<String>,
    hits: u32,
    misses: u32,
    blocks: u32,
    dodges: u32,
    damage_dealt: i64,
    dps: f64,
}

#[derive(Serialize)]
struct DuelResult {
    seed: u64,
    seconds: f64,
    winner: Option<String>,
    player: Side,
    npc: Side,
}

fn side(world: &World, id: CharId, name: &str) -> Side {
    match world.ch(id) {
        Some(ch) => Side {
            name: name.to_string(),
            present: true,
            health: Some(ch.pools.health),
            position: Some(format!("{:?}", ch.position)),
            hits: ch.meters.hits,
            misses: ch.meters.misses,
            blocks: ch.meters.blocks,
            dodges: ch.meters.dodges,
            damage_dealt: ch.meters.damage_dealt,
            dps: ch.meters.dps(),
        },
        None => Side {
            name: name.to_string(),
            present: false,
            health: None,
            position: None,
            hits: 0,
            misses: 0,
            blocks: 0,
            dodges: 0,
            damage_dealt: 0,
            dps: 0.0,
        },
    }
}

fn is_down(world: &World, id: CharId) -> bool {
    world
        .ch(id)
        .map_or(true, |c| c.position <= Position::Incapacitated)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("empire_mud=warn")
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let config = GameConfig {
        seed,
        ..GameConfig::default()
    };
    let mut world = World::new(config);
    let room = world.add_room(Room::new(RoomId(1), "the dueling ground"));

    let mut hero = Character::player("Challenger", args.player_level);
    if args.autokill {
        if let Some(p) = hero.player_data_mut() {
            p.prefs.set(Pref::AutoKill);
        }
    }
    let player = world.spawn(hero, room);
    let blade = world.create_obj(Object::weapon("a practice blade", WeaponAttack::Slash, args.weapon));
    world.equip(player, blade, WearSlot::Wield);
    let npc = world.spawn(Character::npc("a sparring bandit", 1, args.npc_level), room);

    if let Err(reason) = engage_combat(&mut world, player, npc, false) {
        eprintln!("cannot start the duel: {reason}");
        std::process::exit(1);
    }

    let start = world.clock.now_micros();
    for _ in 0..args.max_seconds * PASSES_PER_SEC {
        pulse(&mut world);
        if is_down(&world, player) || is_down(&world, npc) {
            break;
        }
    }

    let winner = match (is_down(&world, player), is_down(&world, npc)) {
        (false, true) => Some("player".to_string()),
        (true, false) => Some("npc".to_string()),
        _ => None,
    };
    let result = DuelResult {
        seed,
        seconds: (world.clock.now_micros() - start) as f64 / 1_000_000.0,
        winner,
        player: side(&world, player, "Challenger"),
        npc: side(&world, npc, "a sparring bandit"),
    };

    if args.format == "json" {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to serialize result: {e}"),
        }
    } else {
        println!(
            "{:.1}s, winner: {}",
            result.seconds,
            result.winner.as_deref().unwrap_or("none")
        );
        for s in [&result.player, &result.npc] {
            println!(
                "  {:<20} hits {:>3} misses {:>3} blocks {:>3} dodges {:>3} dealt {:>5} ({:.1} dps)",
                s.name, s.hits, s.misses, s.blocks, s.dodges, s.damage_dealt, s.dps
            );
        }
    }
}
