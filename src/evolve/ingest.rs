//! Apply evolution diffs to the live world
//!
//! Diffs are delivered at least once. A triple only applies while the room
//! still has the sector it was computed from; anything else is skipped.

use std::path::Path;

use crate::core::error::Result;
use crate::core::types::RoomId;
use crate::evolve::format::{load_diffs, DiffRecord};
use crate::world::World;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub applied: usize,
    /// Already applied, stale, or for a room that isn't loaded
    pub skipped: usize,
}

pub fn ingest_diffs(world: &mut World, diffs: &[DiffRecord]) -> IngestReport {
    let mut report = IngestReport::default();
    for diff in diffs {
        let room = u32::try_from(diff.vnum)
            .ok()
            .and_then(|vnum| world.room_mut(RoomId(vnum)));
        match room {
            Some(room) if room.sector == diff.old_sector => {
                room.sector = diff.new_sector;
                report.applied += 1;
            }
            _ => report.skipped += 1,
        }
    }
    tracing::info!(
        applied = report.applied,
        skipped = report.skipped,
        "ingested evolution diffs"
    );
    report
}

pub fn ingest_file(world: &mut World, path: &Path) -> Result<IngestReport> {
    let diffs = load_diffs(path)?;
    Ok(ingest_diffs(world, &diffs))
}
