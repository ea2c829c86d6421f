//! Foundation types for the cross-reference core.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`], [`FileRegistry`] - File identifiers and their path table
//! - [`LineCol`], [`Location`], [`LineIndex`] - Source positions
//! - [`path_codec`] - Project root ↔ storage token encoding
//! - [`text`] - Identifier/operator character classes
//!
//! This module has NO dependencies on other crate modules besides `error`.

mod file_id;
mod location;
pub mod path_codec;
pub mod text;

pub use file_id::{FileId, FileRegistry};
pub use location::{LineCol, LineIndex, Location, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
