//! Read-only, lazily-cached virtual archive filesystem.
//!
//! This crate gives game assets one addressing scheme regardless of where
//! their bytes live:
//!
//! - **Uncompressed containers** (WAD, GRP, PAK) scanned into an ordered
//!   lump directory over one shared byte source
//! - **Standalone files** exposed as single-lump archives when their
//!   content matches no known container
//! - **External lumps** for assets outside any container, addressed
//!   through the same contract
//!
//! Lump bytes are materialized at most once: the first cache access reads
//! from the backing source into an owned buffer that serves every later
//! request. A failed read caches nothing and may be retried.
//!
//! # Example
//!
//! ```no_run
//! use veles_common::StringPool;
//!
//! let pool = StringPool::new();
//! let archive = veles_vfs::open("DUKE3D.GRP", &pool)?;
//!
//! for lump in archive.lumps() {
//!     println!("{}: {} bytes", lump.name(), lump.size());
//! }
//!
//! if let Some(lump) = archive.find("DEFS.CON") {
//!     let data = lump.cache()?;
//! }
//! # Ok::<(), veles_vfs::Error>(())
//! ```

mod archive;
mod error;
mod external;
pub mod formats;
mod lump;
mod source;

pub use archive::{open, Archive, Lumps, UncompressedArchive};
pub use error::{Error, Result};
pub use external::ExternalLump;
pub use formats::{ContainerFormat, DirEntry};
pub use lump::{read_data, Lump, LumpReader, UncompressedLump};
pub use source::ArchiveSource;
