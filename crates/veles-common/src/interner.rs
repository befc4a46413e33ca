//! Shared string-interning pool for lump and path names.
//!
//! Archives can carry thousands of entries whose names repeat across
//! containers (`PLAYPAL`, `PNAMES`, skin variants and so on). One
//! [`StringPool`] is shared across every archive construction so each
//! distinct name is allocated once for the whole process.

use std::hash::BuildHasherDefault;
use std::sync::Arc;

use hashbrown::HashSet as FastHashSet;
use parking_lot::Mutex;
use rustc_hash::FxHasher;

type FxHashSet<T> = FastHashSet<T, BuildHasherDefault<FxHasher>>;

/// A process-wide deduplicating pool of name strings.
///
/// Interned names are handed out as refcounted `Arc<str>` slices; interning
/// the same string twice returns pointer-identical handles.
///
/// The pool has interior mutability so it can be shared as
/// `Arc<StringPool>` between archive constructions.
#[derive(Debug, Default)]
pub struct StringPool {
    strings: Mutex<FxHashSet<Arc<str>>>,
}

impl StringPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning the pooled handle.
    pub fn intern(&self, name: &str) -> Arc<str> {
        let mut strings = self.strings.lock();
        if let Some(existing) = strings.get(name) {
            return Arc::clone(existing);
        }
        let interned: Arc<str> = Arc::from(name);
        strings.insert(Arc::clone(&interned));
        interned
    }

    /// Number of distinct strings held by the pool.
    pub fn len(&self) -> usize {
        self.strings.lock().len()
    }

    /// Check if the pool holds no strings.
    pub fn is_empty(&self) -> bool {
        self.strings.lock().is_empty()
    }
}
