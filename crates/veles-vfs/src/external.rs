//! Lumps backed by standalone files outside any container.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use veles_common::StringPool;

use crate::lump::LumpCache;
use crate::{Lump, LumpReader, Result};

/// A standalone file presented through the lump contract, so assets that
/// live outside any container can be addressed like archive members.
///
/// The declared size supplied at construction is authoritative; the file
/// is not probed. Every read session opens the path fresh, and a file
/// holding fewer bytes than declared fails the fill with a short read.
#[derive(Debug)]
pub struct ExternalLump {
    path: PathBuf,
    name: Arc<str>,
    size: u64,
    cache: LumpCache,
}

impl ExternalLump {
    /// Create a lump over `path` with a declared size of `size` bytes.
    pub fn new<P: Into<PathBuf>>(path: P, size: u64, pool: &StringPool) -> Self {
        let path = path.into();
        let name = pool.intern(&path.to_string_lossy());
        Self {
            path,
            name,
            size,
            cache: LumpCache::default(),
        }
    }

    /// The backing filesystem path.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Lump for ExternalLump {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn size(&self) -> u64 {
        self.size
    }

    /// External lumps have no shared archive source; the offset is a
    /// sentinel callers must not rely on.
    #[inline]
    fn file_offset(&self) -> u64 {
        0
    }

    fn reader(&self) -> Result<LumpReader<'_>> {
        let file = File::open(&self.path)?;
        Ok(LumpReader::File(file.take(self.size)))
    }

    fn cache(&self) -> Result<Arc<[u8]>> {
        self.cache
            .get_or_fill(&self.name, self.size, || self.reader())
    }

    fn is_cached(&self) -> bool {
        self.cache.is_filled()
    }
}
