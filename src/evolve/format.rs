//! Binary map snapshot and evolution diff files
//!
//! Both files are flat arrays of `#[repr(C)]` records in native byte order.
//! The snapshot carries a header; the diff file is bare triples.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use bytemuck::{Pod, Zeroable};

use crate::core::error::{MudError, Result};
use crate::core::types::Vnum;

pub const MAP_MAGIC: [u8; 4] = *b"EMAP";
pub const MAP_VERSION: u32 = 1;

/// Tile flag: evolution never touches this tile
pub const TILE_NO_EVOLVE: u32 = 1 << 0;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct MapHeader {
    pub magic: [u8; 4],
    pub version: u32,
    pub width: u32,
    pub height: u32,
}

impl MapHeader {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            magic: MAP_MAGIC,
            version: MAP_VERSION,
            width,
            height,
        }
    }

    pub fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// One map tile as persisted
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct TileRecord {
    pub vnum: Vnum,
    pub island: i32,
    pub sector: u32,
    pub base_sector: u32,
    pub natural_sector: u32,
    pub crop: u32,
    pub affects: u32,
    pub flags: u32,
    /// Unix seconds of the last sector change
    pub last_change: u64,
}

/// A sector change for one tile
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct DiffRecord {
    pub vnum: Vnum,
    pub old_sector: u32,
    pub new_sector: u32,
}

/// Header plus the full tile grid, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct MapSnapshot {
    pub header: MapHeader,
    pub tiles: Vec<TileRecord>,
}

impl MapSnapshot {
    /// A blank grid; tile vnums count up from zero
    pub fn new(width: u32, height: u32) -> Self {
        let header = MapHeader::new(width, height);
        let tiles = (0..header.tile_count())
            .map(|i| TileRecord {
                vnum: i as Vnum,
                ..TileRecord::default()
            })
            .collect();
        Self { header, tiles }
    }

    pub fn width(&self) -> u32 {
        self.header.width
    }

    pub fn height(&self) -> u32 {
        self.header.height
    }

    pub fn tile(&self, x: u32, y: u32) -> Option<&TileRecord> {
        if x >= self.header.width || y >= self.header.height {
            return None;
        }
        self.tiles.get((y * self.header.width + x) as usize)
    }

    pub fn tile_mut(&mut self, x: u32, y: u32) -> Option<&mut TileRecord> {
        if x >= self.header.width || y >= self.header.height {
            return None;
        }
        self.tiles.get_mut((y * self.header.width + x) as usize)
    }

    pub fn read_from(reader: &mut impl Read) -> Result<Self> {
        let mut raw = [0u8; std::mem::size_of::<MapHeader>()];
        reader.read_exact(&mut raw)?;
        let header: MapHeader = bytemuck::pod_read_unaligned(&raw);
        if header.magic != MAP_MAGIC {
            return Err(MudError::EvolutionFormat("bad map magic".into()));
        }
        if header.version != MAP_VERSION {
            return Err(MudError::EvolutionFormat(format!(
                "unsupported map version {}",
                header.version
            )));
        }

        let mut body = Vec::new();
        reader.read_to_end(&mut body)?;
        let tiles = read_records::<TileRecord>(&body, "map")?;
        if tiles.len() != header.tile_count() {
            return Err(MudError::EvolutionFormat(format!(
                "map is {}x{} but holds {} tiles",
                header.width,
                header.height,
                tiles.len()
            )));
        }
        Ok(Self { header, tiles })
    }

    pub fn write_to(&self, writer: &mut impl Write) -> Result<()> {
        writer.write_all(bytemuck::bytes_of(&self.header))?;
        writer.write_all(bytemuck::cast_slice(&self.tiles))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut file = fs::File::open(path)?;
        Self::read_from(&mut file)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut file = fs::File::create(path)?;
        self.write_to(&mut file)
    }
}

/// Decode a packed record array; the length must be a whole number of records
fn read_records<T: Pod>(bytes: &[u8], what: &str) -> Result<Vec<T>> {
    let size = std::mem::size_of::<T>();
    if bytes.len() % size != 0 {
        return Err(MudError::EvolutionFormat(format!(
            "{what} body of {} bytes is not a multiple of {size}",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(size)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

pub fn read_diffs(reader: &mut impl Read) -> Result<Vec<DiffRecord>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    read_records(&bytes, "diff")
}

pub fn write_diffs(writer: &mut impl Write, diffs: &[DiffRecord]) -> Result<()> {
    writer.write_all(bytemuck::cast_slice(diffs))?;
    Ok(())
}

pub fn load_diffs(path: &Path) -> Result<Vec<DiffRecord>> {
    let mut file = fs::File::open(path)?;
    read_diffs(&mut file)
}

pub fn save_diffs(path: &Path, diffs: &[DiffRecord]) -> Result<()> {
    let mut file = fs::File::create(path)?;
    write_diffs(&mut file, diffs)
}
