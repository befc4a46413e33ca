//! The byte source shared by all lumps of one archive.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::Result;

/// One opened archive byte source.
///
/// Every lump of an archive holds an `Arc<ArchiveSource>` and addresses its
/// data as an `(offset, size)` window into it. Sources opened from a path or
/// an already-open [`File`] are memory-mapped; sources built from owned
/// bytes keep the vector.
///
/// Sub-slices handed out by [`slice`](Self::slice) are positionally
/// independent, so concurrent readers never share seek state.
#[derive(Debug)]
pub struct ArchiveSource(Repr);

#[derive(Debug)]
enum Repr {
    Mapped(Mmap),
    Memory(Vec<u8>),
}

impl ArchiveSource {
    /// Open and memory-map the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_file(&file)
    }

    /// Memory-map an already-open file handle.
    pub fn from_file(file: &File) -> Result<Self> {
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self(Repr::Mapped(mmap)))
    }

    /// Build a source over owned bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Repr::Memory(bytes))
    }

    /// Total length of the source in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.as_bytes().len() as u64
    }

    /// Check if the source is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// The whole source as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.0 {
            Repr::Mapped(mmap) => mmap,
            Repr::Memory(bytes) => bytes,
        }
    }

    /// A bounds-checked `(offset, size)` window into the source.
    pub fn slice(&self, offset: u64, size: u64) -> Result<&[u8]> {
        let data = self.as_bytes();
        let end = offset.checked_add(size).filter(|&e| e <= data.len() as u64);
        match end {
            Some(end) => Ok(&data[offset as usize..end as usize]),
            None => Err(veles_common::Error::UnexpectedEof {
                needed: size as usize,
                available: (data.len() as u64).saturating_sub(offset.min(data.len() as u64)) as usize,
            }
            .into()),
        }
    }
}
