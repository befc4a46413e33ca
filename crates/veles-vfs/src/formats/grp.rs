//! Build-engine GRP container directories.
//!
//! Layout: a 16-byte header (12-byte `KenSilverman` tag plus the file
//! count), then one 16-byte record per file, then all file data packed
//! back to back in record order. Records carry sizes only; offsets are
//! the running sum past the record table.

use veles_common::{null_trimmed_str, BinaryReader};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::DirEntry;
use crate::{Error, Result};

/// Identification tag at the start of every GRP file.
pub const GRP_MAGIC: &[u8; 12] = b"KenSilverman";

/// One 16-byte GRP directory record.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct GrpDirEntry {
    /// File name, null-padded.
    name: [u8; 12],
    /// Size of the file's data in bytes.
    size: u32,
}

const DIR_RECORD_SIZE: u64 = std::mem::size_of::<GrpDirEntry>() as u64;

pub(super) fn scan(data: &[u8], archive: &str) -> Result<Vec<DirEntry>> {
    let mut reader = BinaryReader::new(data);

    reader.expect_magic(GRP_MAGIC)?;
    let count = reader.read_u32()? as u64;

    let table_end = 16 + count * DIR_RECORD_SIZE;
    if table_end > data.len() as u64 {
        return Err(Error::InvalidDirectory {
            archive: archive.to_string(),
            reason: format!("record table of {} entries extends past end of file", count),
        });
    }

    let mut entries = Vec::with_capacity(count as usize);
    let mut offset = table_end;
    for _ in 0..count {
        let record: GrpDirEntry = reader.read_struct()?;
        let name = null_trimmed_str(&record.name)?.to_string();
        let size = record.size as u64;

        entries.push(DirEntry { name, offset, size });
        offset += size;
    }

    if offset > data.len() as u64 {
        return Err(Error::InvalidDirectory {
            archive: archive.to_string(),
            reason: format!(
                "file data runs to {} but the container holds {} bytes",
                offset,
                data.len()
            ),
        });
    }

    Ok(entries)
}
