//! WAD container directories (`IWAD`/`PWAD`).
//!
//! Layout: a 12-byte header holding the magic, the lump count, and the
//! offset of the directory table; the table itself is an array of 16-byte
//! records anywhere in the file.

use veles_common::{null_trimmed_str, BinaryReader};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::DirEntry;
use crate::{Error, Result};

/// Magic of a base game WAD.
pub const IWAD_MAGIC: &[u8; 4] = b"IWAD";
/// Magic of a patch WAD.
pub const PWAD_MAGIC: &[u8; 4] = b"PWAD";

/// WAD header fields following the 4-byte magic.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct WadHeader {
    /// Number of directory records.
    num_lumps: u32,
    /// Byte offset of the directory table.
    info_table_ofs: u32,
}

/// One 16-byte WAD directory record.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct WadDirEntry {
    /// Byte offset of the lump's data.
    file_pos: u32,
    /// Size of the lump's data in bytes.
    size: u32,
    /// Lump name, null-padded.
    name: [u8; 8],
}

const DIR_RECORD_SIZE: u64 = std::mem::size_of::<WadDirEntry>() as u64;

pub(super) fn scan(data: &[u8], archive: &str) -> Result<Vec<DirEntry>> {
    let mut reader = BinaryReader::new(data);

    let magic = reader.read_bytes(4)?;
    if magic != IWAD_MAGIC && magic != PWAD_MAGIC {
        return Err(Error::InvalidDirectory {
            archive: archive.to_string(),
            reason: "missing IWAD/PWAD identification".to_string(),
        });
    }

    let header: WadHeader = reader.read_struct()?;
    let count = header.num_lumps as u64;
    let table_ofs = header.info_table_ofs as u64;
    let table_end = table_ofs + count * DIR_RECORD_SIZE;
    if table_end > data.len() as u64 {
        return Err(Error::InvalidDirectory {
            archive: archive.to_string(),
            reason: format!(
                "directory table of {} records at offset {} extends past end of file",
                count, table_ofs
            ),
        });
    }

    reader.seek(table_ofs as usize);
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let record: WadDirEntry = reader.read_struct()?;
        let name = null_trimmed_str(&record.name)?.to_string();
        entries.push(DirEntry {
            name,
            offset: record.file_pos as u64,
            size: record.size as u64,
        });
    }

    Ok(entries)
}
