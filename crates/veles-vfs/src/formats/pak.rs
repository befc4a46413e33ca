//! Quake PAK container directories.
//!
//! Layout: a 12-byte header (`PACK` magic, directory offset, directory
//! length), with the directory as an array of 64-byte records holding a
//! 56-byte path plus the data offset and size.

use veles_common::{null_trimmed_str, BinaryReader};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::DirEntry;
use crate::{Error, Result};

/// Magic at the start of every PAK file.
pub const PAK_MAGIC: &[u8; 4] = b"PACK";

/// PAK header fields following the 4-byte magic.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct PakHeader {
    /// Byte offset of the directory.
    dir_ofs: u32,
    /// Directory length in bytes.
    dir_len: u32,
}

/// One 64-byte PAK directory record.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct PakDirEntry {
    /// File path within the pack, null-padded.
    name: [u8; 56],
    /// Byte offset of the file's data.
    file_pos: u32,
    /// Size of the file's data in bytes.
    size: u32,
}

const DIR_RECORD_SIZE: u64 = std::mem::size_of::<PakDirEntry>() as u64;

pub(super) fn scan(data: &[u8], archive: &str) -> Result<Vec<DirEntry>> {
    let mut reader = BinaryReader::new(data);

    reader.expect_magic(PAK_MAGIC)?;
    let header: PakHeader = reader.read_struct()?;
    let dir_ofs = header.dir_ofs as u64;
    let dir_len = header.dir_len as u64;

    if dir_len % DIR_RECORD_SIZE != 0 {
        return Err(Error::InvalidDirectory {
            archive: archive.to_string(),
            reason: format!("directory length {} is not a multiple of {}", dir_len, DIR_RECORD_SIZE),
        });
    }
    if dir_ofs + dir_len > data.len() as u64 {
        return Err(Error::InvalidDirectory {
            archive: archive.to_string(),
            reason: format!(
                "directory of {} bytes at offset {} extends past end of file",
                dir_len, dir_ofs
            ),
        });
    }

    let count = dir_len / DIR_RECORD_SIZE;
    reader.seek(dir_ofs as usize);
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let record: PakDirEntry = reader.read_struct()?;
        let name = null_trimmed_str(&record.name)?.to_string();
        entries.push(DirEntry {
            name,
            offset: record.file_pos as u64,
            size: record.size as u64,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pak_image(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        let mut records = Vec::new();
        for (name, bytes) in files {
            let offset = 12 + body.len();
            body.extend_from_slice(bytes);

            let mut name_buf = [0u8; 56];
            name_buf[..name.len()].copy_from_slice(name.as_bytes());
            records.push((name_buf, offset as u32, bytes.len() as u32));
        }

        let mut data = Vec::new();
        data.extend_from_slice(PAK_MAGIC);
        data.extend_from_slice(&((12 + body.len()) as u32).to_le_bytes());
        data.extend_from_slice(&((records.len() * 64) as u32).to_le_bytes());
        data.extend_from_slice(&body);
        for (name, offset, size) in records {
            data.extend_from_slice(&name);
            data.extend_from_slice(&offset.to_le_bytes());
            data.extend_from_slice(&size.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_scan_pak_paths() {
        let data = pak_image(&[
            ("sound/items/r_item1.wav", b"wav data"),
            ("maps/e1m1.bsp", b"bsp"),
        ]);
        let entries = scan(&data, "pak0.pak").unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "sound/items/r_item1.wav");
        assert_eq!(entries[0].offset, 12);
        assert_eq!(entries[0].size, 8);
        assert_eq!(entries[1].name, "maps/e1m1.bsp");
        assert_eq!(entries[1].offset, 20);
        assert_eq!(entries[1].size, 3);
    }

    #[test]
    fn test_rejects_ragged_directory_length() {
        let mut data = pak_image(&[("a.txt", b"x")]);
        // Directory length that is not a whole number of records.
        data[8..12].copy_from_slice(&63u32.to_le_bytes());
        assert!(matches!(
            scan(&data, "ragged.pak"),
            Err(Error::InvalidDirectory { .. })
        ));
    }

    #[test]
    fn test_rejects_directory_past_eof() {
        let mut data = pak_image(&[("a.txt", b"x")]);
        let len = data.len() as u32;
        data[4..8].copy_from_slice(&len.to_le_bytes());
        assert!(matches!(
            scan(&data, "cut.pak"),
            Err(Error::InvalidDirectory { .. })
        ));
    }
}
