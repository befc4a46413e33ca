//! Veles - virtual archive filesystem for game assets.
//!
//! This crate provides a unified interface to the Veles library ecosystem
//! for addressing game assets through one archive/lump contract.
//!
//! # Crates
//!
//! - [`veles_common`] - Common utilities (binary reading, string interning)
//! - [`veles_vfs`] - Archive containers, lazy lump caches, external lumps
//!
//! # Example
//!
//! ```no_run
//! use veles::prelude::*;
//!
//! let pool = StringPool::new();
//!
//! // Open a container, sniffing its format
//! let archive = veles::vfs::open("DOOM.WAD", &pool)?;
//!
//! // Address a lump and materialize its bytes once
//! if let Some(lump) = archive.find("PLAYPAL") {
//!     let palette = lump.cache()?;
//!     println!("{} bytes", palette.len());
//! }
//! # Ok::<(), veles::vfs::Error>(())
//! ```

// Re-export all sub-crates
pub use veles_common as common;
pub use veles_vfs as vfs;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use veles_common::{BinaryReader, StringPool};
    pub use veles_vfs::{
        Archive, ArchiveSource, ExternalLump, Lump, LumpReader, UncompressedArchive,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
