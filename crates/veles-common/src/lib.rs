//! Common utilities for Veles.
//!
//! This crate provides foundational types used across all Veles crates:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`StringPool`] - Process-wide interning of lump and path names
//! - Shared error types

mod error;
mod interner;
mod reader;

pub use error::{Error, Result};
pub use interner::StringPool;
pub use reader::{null_trimmed_str, BinaryReader};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
