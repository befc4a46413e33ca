//! On-disk container format directory scanners.
//!
//! Each scanner reads one format's directory table and reduces it to the
//! `(name, offset, size)` records the archive container materializes lumps
//! from. Scanners validate their own tables; record data extents are
//! validated once by the container at construction.

mod grp;
mod pak;
mod wad;

pub use grp::GRP_MAGIC;
pub use pak::PAK_MAGIC;
pub use wad::{IWAD_MAGIC, PWAD_MAGIC};

use crate::Result;

/// One directory record: a named byte range within an archive source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name as stored in the container directory.
    pub name: String,
    /// Byte offset of the entry's data within the source.
    pub offset: u64,
    /// Size of the entry's data in bytes.
    pub size: u64,
}

/// The uncompressed container formats this crate can scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Doom-engine WAD (`IWAD`/`PWAD`).
    Wad,
    /// Build-engine GRP (Ken Silverman's format).
    Grp,
    /// Quake PAK.
    Pak,
}

impl ContainerFormat {
    /// Identify a container format from the leading magic bytes.
    ///
    /// Returns `None` for content matching no known container, which the
    /// open path treats as a standalone single-lump file.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(IWAD_MAGIC) || data.starts_with(PWAD_MAGIC) {
            Some(Self::Wad)
        } else if data.starts_with(GRP_MAGIC) {
            Some(Self::Grp)
        } else if data.starts_with(PAK_MAGIC) {
            Some(Self::Pak)
        } else {
            None
        }
    }

    /// Scan the container directory out of `data`.
    ///
    /// `archive` names the container in errors.
    pub fn scan(self, data: &[u8], archive: &str) -> Result<Vec<DirEntry>> {
        match self {
            Self::Wad => wad::scan(data, archive),
            Self::Grp => grp::scan(data, archive),
            Self::Pak => pak::scan(data, archive),
        }
    }
}
