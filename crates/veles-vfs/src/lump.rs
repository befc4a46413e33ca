//! The lump contract and its lazy byte cache.
//!
//! A lump is one addressable file-like unit: a named byte range inside an
//! archive, or a standalone file adapted to the same interface. Lump data is
//! read at most once; the first access materializes the bytes into an owned
//! cache that serves every later request.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{ArchiveSource, Error, Result};

/// One addressable file-like unit, inside an archive or standalone.
///
/// Implementations share the same lifecycle: Uncached until the first
/// successful [`cache`](Self::cache) or [`fill_cache`](Self::fill_cache),
/// Cached from then on until the lump is dropped. A failed fill leaves the
/// lump Uncached and a later access may retry.
pub trait Lump: Send + Sync {
    /// The lump's interned name.
    fn name(&self) -> &str;

    /// Declared size of the lump's data in bytes.
    fn size(&self) -> u64;

    /// Byte offset of the lump's data within its archive's shared source.
    ///
    /// Lumps with no shared source (external lumps) return `0`; callers
    /// must not rely on the offset for those.
    fn file_offset(&self) -> u64;

    /// A fresh, independently-positioned reader over the lump's bytes,
    /// valid for one read session.
    fn reader(&self) -> Result<LumpReader<'_>>;

    /// The lump's bytes, read and cached on first access.
    ///
    /// Once a fill succeeds the returned buffer is shared; the lump never
    /// re-reads its backing source.
    fn cache(&self) -> Result<Arc<[u8]>>;

    /// Ensure the cache is populated. A no-op when already filled.
    fn fill_cache(&self) -> Result<()> {
        self.cache().map(drop)
    }

    /// Check whether the cache has been populated.
    fn is_cached(&self) -> bool;
}

/// A readable view over one lump's bytes.
///
/// Archive-embedded lumps read from a window of the shared source;
/// external lumps read from a freshly opened file capped at the declared
/// size. Either way the view carries its own position.
#[derive(Debug)]
pub enum LumpReader<'a> {
    /// A bounded cursor over a slice of the shared archive source.
    Slice(Cursor<&'a [u8]>),
    /// A freshly opened standalone file, limited to the declared size.
    File(io::Take<File>),
}

impl Read for LumpReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            LumpReader::Slice(cursor) => cursor.read(buf),
            LumpReader::File(take) => take.read(buf),
        }
    }
}

/// Copy bytes from `reader` into `buf` until the buffer is full or the
/// source is exhausted, returning the count actually copied.
///
/// Callers compare the count against the lump's declared size to detect
/// short reads.
pub fn read_data<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(total)
}

/// Two-state lazy cache: `None` until the one successful fill, `Some`
/// afterwards.
///
/// The fill transition is serialized behind a write lock with a double
/// check, so concurrent first accesses fill once; reads of a filled cache
/// share the buffer under the read lock. A failed fill stores nothing.
#[derive(Debug, Default)]
pub(crate) struct LumpCache {
    state: RwLock<Option<Arc<[u8]>>>,
}

impl LumpCache {
    pub(crate) fn is_filled(&self) -> bool {
        self.state.read().is_some()
    }

    pub(crate) fn get_or_fill<'a, F>(&self, name: &str, size: u64, open: F) -> Result<Arc<[u8]>>
    where
        F: FnOnce() -> Result<LumpReader<'a>>,
    {
        if let Some(cached) = self.state.read().as_ref() {
            return Ok(Arc::clone(cached));
        }

        let mut state = self.state.write();
        // Another thread may have filled while we waited for the lock.
        if let Some(cached) = state.as_ref() {
            return Ok(Arc::clone(cached));
        }

        let mut reader = open()?;
        let mut buf = vec![0u8; size as usize];
        let got = read_data(&mut reader, &mut buf)?;
        if (got as u64) < size {
            return Err(Error::ShortRead {
                name: name.to_string(),
                expected: size,
                actual: got as u64,
            });
        }

        let cached: Arc<[u8]> = Arc::from(buf);
        *state = Some(Arc::clone(&cached));
        Ok(cached)
    }
}

/// A lump whose bytes live at a known offset inside a shared archive
/// source, needing no decompression.
#[derive(Debug)]
pub struct UncompressedLump {
    name: Arc<str>,
    offset: u64,
    size: u64,
    source: Arc<ArchiveSource>,
    cache: LumpCache,
}

impl UncompressedLump {
    pub(crate) fn new(name: Arc<str>, offset: u64, size: u64, source: Arc<ArchiveSource>) -> Self {
        Self {
            name,
            offset,
            size,
            source,
            cache: LumpCache::default(),
        }
    }

    #[inline]
    fn bytes(&self) -> Result<&[u8]> {
        self.source.slice(self.offset, self.size)
    }
}

impl Lump for UncompressedLump {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    fn file_offset(&self) -> u64 {
        self.offset
    }

    fn reader(&self) -> Result<LumpReader<'_>> {
        Ok(LumpReader::Slice(Cursor::new(self.bytes()?)))
    }

    fn cache(&self) -> Result<Arc<[u8]>> {
        self.cache
            .get_or_fill(&self.name, self.size, || self.reader())
    }

    fn is_cached(&self) -> bool {
        self.cache.is_filled()
    }
}

#[cfg(test)]
mod tests {
    use veles_common::StringPool;

    use super::*;

    fn lump_over(bytes: &[u8], offset: u64, size: u64) -> UncompressedLump {
        let pool = StringPool::new();
        let source = Arc::new(ArchiveSource::from_bytes(bytes.to_vec()));
        UncompressedLump::new(pool.intern("TEST"), offset, size, source)
    }

    #[test]
    fn test_cache_fill_is_idempotent() {
        let lump = lump_over(b"0123456789", 2, 5);

        assert!(!lump.is_cached());
        let first = lump.cache().unwrap();
        assert!(lump.is_cached());
        let second = lump.cache().unwrap();

        assert_eq!(&first[..], b"23456");
        assert!(Arc::ptr_eq(&first, &second));

        lump.fill_cache().unwrap();
        assert!(Arc::ptr_eq(&first, &lump.cache().unwrap()));
    }

    #[test]
    fn test_reader_matches_cache() {
        let lump = lump_over(b"0123456789", 4, 6);

        let mut buf = vec![0u8; 6];
        let mut reader = lump.reader().unwrap();
        assert_eq!(read_data(&mut reader, &mut buf).unwrap(), 6);

        assert_eq!(&buf[..], &lump.cache().unwrap()[..]);
    }

    #[test]
    fn test_readers_are_independently_positioned() {
        let lump = lump_over(b"abcdef", 0, 6);

        let mut first = lump.reader().unwrap();
        let mut second = lump.reader().unwrap();

        let mut buf = [0u8; 3];
        read_data(&mut first, &mut buf).unwrap();
        assert_eq!(&buf, b"abc");

        // The second reader starts at the beginning regardless.
        read_data(&mut second, &mut buf).unwrap();
        assert_eq!(&buf, b"abc");
    }

    #[test]
    fn test_concurrent_first_fill() {
        let lump = Arc::new(lump_over(b"xyzw", 0, 4));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lump = Arc::clone(&lump);
                std::thread::spawn(move || lump.cache().unwrap())
            })
            .collect();

        let buffers: Vec<Arc<[u8]>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for buf in &buffers[1..] {
            assert!(Arc::ptr_eq(&buffers[0], buf));
        }
        assert_eq!(&buffers[0][..], b"xyzw");
    }

    #[test]
    fn test_read_data_reports_short_source() {
        let mut reader = Cursor::new(&b"abc"[..]);
        let mut buf = [0u8; 8];
        assert_eq!(read_data(&mut reader, &mut buf).unwrap(), 3);
    }
}
