//! The archive contract and the uncompressed container backend.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use veles_common::StringPool;

use crate::formats::{ContainerFormat, DirEntry};
use crate::{ArchiveSource, Error, Lump, Result, UncompressedLump};

/// A container exposing an ordered sequence of lumps.
///
/// All archive backends satisfy this contract: the uncompressed one in
/// this crate, and compressed-format backends implemented elsewhere. The
/// lump sequence is populated at construction and immutable in length and
/// order for the archive's lifetime.
pub trait Archive: Send + Sync {
    /// The archive's display name.
    fn name(&self) -> &str;

    /// Number of lumps in the archive.
    fn lump_count(&self) -> usize;

    /// Bounds-checked lump lookup.
    ///
    /// Returns `None` for out-of-range indices; callers must check.
    fn lump(&self, index: usize) -> Option<&dyn Lump>;

    /// Iterate lumps in directory order.
    fn lumps(&self) -> Lumps<'_>;

    /// Find a lump by name (case-insensitive). The first match in
    /// directory order wins.
    fn find(&self, name: &str) -> Option<&dyn Lump> {
        self.lumps().find(|l| l.name().eq_ignore_ascii_case(name))
    }
}

/// Iterator over an archive's lumps in directory order.
#[derive(Clone, Copy)]
pub struct Lumps<'a> {
    archive: &'a dyn Archive,
    index: usize,
}

impl<'a> Lumps<'a> {
    /// Create an iterator over `archive`'s lumps.
    pub fn new(archive: &'a dyn Archive) -> Self {
        Self { archive, index: 0 }
    }
}

impl<'a> Iterator for Lumps<'a> {
    type Item = &'a dyn Lump;

    fn next(&mut self) -> Option<Self::Item> {
        let lump = self.archive.lump(self.index)?;
        self.index += 1;
        Some(lump)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.archive.lump_count().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

/// An archive whose lump byte ranges are known upfront, with no
/// decompression between the source and the caller.
///
/// One opened byte source is shared by every lump; each lump addresses
/// its own `(offset, size)` window into it.
pub struct UncompressedArchive {
    name: String,
    lumps: Vec<UncompressedLump>,
}

impl UncompressedArchive {
    /// Open the file at `path` and scan it.
    ///
    /// The archive opens and owns its own byte source.
    pub fn from_path<P: AsRef<Path>>(path: P, pool: &StringPool) -> Result<Self> {
        let path = path.as_ref();
        let source = ArchiveSource::open(path)?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self::from_source(name, source, pool)
    }

    /// Scan an already-open file handle.
    pub fn from_file(name: impl Into<String>, file: &File, pool: &StringPool) -> Result<Self> {
        let source = ArchiveSource::from_file(file)?;
        Self::from_source(name.into(), source, pool)
    }

    /// Sniff the container format of `source` and scan its directory.
    ///
    /// Content matching no known container is exposed as a single-lump
    /// archive whose lump is named after the file stem and spans the whole
    /// source.
    pub fn from_source(
        name: impl Into<String>,
        source: ArchiveSource,
        pool: &StringPool,
    ) -> Result<Self> {
        let name = name.into();
        let directory = match ContainerFormat::sniff(source.as_bytes()) {
            Some(format) => format.scan(source.as_bytes(), &name)?,
            None => vec![DirEntry {
                name: file_stem(&name).to_string(),
                offset: 0,
                size: source.len(),
            }],
        };
        Self::with_directory(name, source, directory, pool)
    }

    /// Materialize one lump per directory record over a shared source.
    ///
    /// Record extents are validated here once; lump reads rely on that
    /// invariant and do not re-verify per read.
    pub fn with_directory(
        name: impl Into<String>,
        source: ArchiveSource,
        directory: Vec<DirEntry>,
        pool: &StringPool,
    ) -> Result<Self> {
        let name = name.into();
        let source = Arc::new(source);

        let mut lumps = Vec::with_capacity(directory.len());
        for record in directory {
            if source.slice(record.offset, record.size).is_err() {
                return Err(Error::InvalidDirectory {
                    archive: name,
                    reason: format!(
                        "lump {} at offset {} with size {} extends past end of file",
                        record.name, record.offset, record.size
                    ),
                });
            }
            lumps.push(UncompressedLump::new(
                pool.intern(&record.name),
                record.offset,
                record.size,
                Arc::clone(&source),
            ));
        }

        Ok(Self { name, lumps })
    }
}

impl Archive for UncompressedArchive {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn lump_count(&self) -> usize {
        self.lumps.len()
    }

    #[inline]
    fn lump(&self, index: usize) -> Option<&dyn Lump> {
        self.lumps.get(index).map(|l| l as &dyn Lump)
    }

    fn lumps(&self) -> Lumps<'_> {
        Lumps::new(self)
    }
}

impl std::fmt::Debug for UncompressedArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UncompressedArchive")
            .field("name", &self.name)
            .field("lumps", &self.lumps.len())
            .finish()
    }
}

/// Open the archive file at `path`, selecting the backend by format
/// sniffing.
pub fn open<P: AsRef<Path>>(path: P, pool: &StringPool) -> Result<Box<dyn Archive>> {
    Ok(Box::new(UncompressedArchive::from_path(path, pool)?))
}

fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn two_lump_archive(pool: &StringPool) -> UncompressedArchive {
        // 15-byte source split as A:[0,10) and B:[10,15).
        let source = ArchiveSource::from_bytes(b"AAAAAAAAAABBBBB".to_vec());
        let directory = vec![
            DirEntry {
                name: "A".to_string(),
                offset: 0,
                size: 10,
            },
            DirEntry {
                name: "B".to_string(),
                offset: 10,
                size: 5,
            },
        ];
        UncompressedArchive::with_directory("test.dat", source, directory, pool).unwrap()
    }

    #[test]
    fn test_lookup_is_bounds_checked() {
        let pool = StringPool::new();
        let archive = two_lump_archive(&pool);

        assert_eq!(archive.lump_count(), 2);
        assert_eq!(archive.lump(0).unwrap().name(), "A");
        assert_eq!(archive.lump(0).unwrap().size(), 10);
        assert_eq!(archive.lump(1).unwrap().name(), "B");
        assert_eq!(archive.lump(1).unwrap().size(), 5);
        assert!(archive.lump(2).is_none());
        assert!(archive.lump(usize::MAX).is_none());
    }

    #[test]
    fn test_interleaved_reads_stay_independent() {
        let pool = StringPool::new();
        let archive = two_lump_archive(&pool);

        let b = archive.lump(1).unwrap().cache().unwrap();
        let a = archive.lump(0).unwrap().cache().unwrap();

        assert_eq!(&a[..], b"AAAAAAAAAA");
        assert_eq!(&b[..], b"BBBBB");
        // Re-reading after the sibling fill returns the same buffers.
        assert!(Arc::ptr_eq(&a, &archive.lump(0).unwrap().cache().unwrap()));
        assert!(Arc::ptr_eq(&b, &archive.lump(1).unwrap().cache().unwrap()));
    }

    #[test]
    fn test_ordering_is_stable() {
        let pool = StringPool::new();
        let archive = two_lump_archive(&pool);

        let before: Vec<_> = archive
            .lumps()
            .map(|l| (l.name().to_string(), l.file_offset(), l.size()))
            .collect();

        archive.lump(1).unwrap().fill_cache().unwrap();
        archive.find("a").unwrap().fill_cache().unwrap();

        let after: Vec<_> = archive
            .lumps()
            .map(|l| (l.name().to_string(), l.file_offset(), l.size()))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let pool = StringPool::new();
        let archive = two_lump_archive(&pool);

        assert_eq!(archive.find("a").unwrap().file_offset(), 0);
        assert_eq!(archive.find("B").unwrap().file_offset(), 10);
        assert!(archive.find("C").is_none());
    }

    #[test]
    fn test_rejects_record_past_source_end() {
        let pool = StringPool::new();
        let source = ArchiveSource::from_bytes(vec![0; 8]);
        let directory = vec![DirEntry {
            name: "X".to_string(),
            offset: 4,
            size: 8,
        }];

        assert!(matches!(
            UncompressedArchive::with_directory("bad.dat", source, directory, &pool),
            Err(Error::InvalidDirectory { .. })
        ));
    }

    #[test]
    fn test_from_source_sniffs_wad() {
        let pool = StringPool::new();
        let mut data = Vec::new();
        data.extend_from_slice(b"PWAD");
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&17u32.to_le_bytes()); // directory after 5 data bytes
        data.extend_from_slice(b"hello");
        data.extend_from_slice(&12u32.to_le_bytes());
        data.extend_from_slice(&5u32.to_le_bytes());
        data.extend_from_slice(b"GREETING");

        let archive =
            UncompressedArchive::from_source("hi.wad", ArchiveSource::from_bytes(data), &pool)
                .unwrap();

        assert_eq!(archive.lump_count(), 1);
        let lump = archive.lump(0).unwrap();
        assert_eq!(lump.name(), "GREETING");
        assert_eq!(&lump.cache().unwrap()[..], b"hello");
    }

    #[test]
    fn test_unknown_content_becomes_single_lump() {
        let pool = StringPool::new();
        let source = ArchiveSource::from_bytes(b"just some bytes".to_vec());
        let archive = UncompressedArchive::from_source("notes.txt", source, &pool).unwrap();

        assert_eq!(archive.lump_count(), 1);
        let lump = archive.lump(0).unwrap();
        assert_eq!(lump.name(), "notes");
        assert_eq!(lump.file_offset(), 0);
        assert_eq!(lump.size(), 15);
        assert_eq!(&lump.cache().unwrap()[..], b"just some bytes");
    }

    #[test]
    fn test_open_from_disk() {
        let pool = StringPool::new();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"KenSilverman").unwrap();
        file.write_all(&1u32.to_le_bytes()).unwrap();
        let mut name_buf = [0u8; 12];
        name_buf[..8].copy_from_slice(b"DEFS.CON");
        file.write_all(&name_buf).unwrap();
        file.write_all(&3u32.to_le_bytes()).unwrap();
        file.write_all(b"con").unwrap();
        file.flush().unwrap();

        let archive = open(file.path(), &pool).unwrap();
        assert_eq!(archive.lump_count(), 1);

        let lump = archive.find("defs.con").unwrap();
        assert_eq!(lump.file_offset(), 32);
        assert_eq!(&lump.cache().unwrap()[..], b"con");
    }

    #[test]
    fn test_names_interned_across_archives() {
        let pool = StringPool::new();
        let first = two_lump_archive(&pool);
        let second = two_lump_archive(&pool);

        assert_eq!(first.lump(0).unwrap().name(), second.lump(0).unwrap().name());
        // "A" and "B" each interned once for both archives.
        assert_eq!(pool.len(), 2);
    }
}
