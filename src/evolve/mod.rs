//! Offline terrain evolution
//!
//! A batch pass reads a map snapshot, rolls sector transitions and writes a
//! diff file. The server ingests the diff later.

pub mod format;
pub mod ingest;
pub mod rules;

pub use format::{DiffRecord, MapHeader, MapSnapshot, TileRecord};
pub use ingest::{ingest_diffs, ingest_file, IngestReport};
pub use rules::{evolve, EvolutionRule, EvolutionRules};
