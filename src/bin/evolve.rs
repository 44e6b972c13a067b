//! Offline map evolution
//!
//! Reads a map snapshot, rolls the sector transition rules over it and
//! writes the diff file for the server to ingest.

use std::path::PathBuf;

use clap::Parser;
use empire_mud::core::error::Result;
use empire_mud::evolve::format::{save_diffs, MapSnapshot};
use empire_mud::evolve::rules::apply_to_snapshot;
use empire_mud::evolve::{evolve, EvolutionRules};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Parser, Debug)]
#[command(name = "evolve")]
#[command(about = "Apply sector evolution rules to a map snapshot and write a diff file")]
struct Args {
    /// Map snapshot to read
    #[arg(long)]
    map: PathBuf,

    /// Transition rules (TOML)
    #[arg(long, default_value = "data/evolutions.toml")]
    rules: PathBuf,

    /// Diff file to write
    #[arg(long)]
    out: PathBuf,

    /// Number of passes; later passes see earlier changes
    #[arg(long, default_value_t = 1)]
    passes: u32,

    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "empire_mud=info".into()),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let original = MapSnapshot::load(&args.map)?;
    let rules = EvolutionRules::load(&args.rules)?;
    tracing::info!(
        width = original.width(),
        height = original.height(),
        rules = rules.rules.len(),
        seed,
        "evolving map"
    );

    let mut working = original.clone();
    for pass in 0..args.passes {
        let diffs = evolve(&working, &rules, &mut rng);
        tracing::info!(pass, changes = diffs.len(), "pass complete");
        apply_to_snapshot(&mut working, &diffs, 0);
    }

    // One triple per changed tile, from the original sector to the final one
    let diffs: Vec<_> = original
        .tiles
        .iter()
        .zip(&working.tiles)
        .filter(|(before, after)| before.sector != after.sector)
        .map(|(before, after)| empire_mud::evolve::DiffRecord {
            vnum: before.vnum,
            old_sector: before.sector,
            new_sector: after.sector,
        })
        .collect();

    save_diffs(&args.out, &diffs)?;
    tracing::info!(changes = diffs.len(), out = %args.out.display(), "diff written");
    Ok(())
}
