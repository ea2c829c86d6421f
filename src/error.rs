//! Error types.
//!
//! Lookups never fail: an absent location, name or USR yields `None`, an
//! empty collection or [`Location::NULL`](crate::Location::NULL). The only
//! recoverable failure produced by the core is a project root that cannot
//! be encoded.

use std::path::PathBuf;

/// A project root that cannot be turned into a storage token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPathError {
    /// The path already contains the escape sequence used for `_`.
    #[error("invalid folder name `{path}`: reserved sequence `<underscore>` at byte {offset}")]
    ReservedEscape { path: String, offset: usize },

    /// The path is not valid UTF-8 and cannot be encoded losslessly.
    #[error("invalid folder name {}: not valid UTF-8", path.display())]
    NotUtf8 { path: PathBuf },
}

/// Unified error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),

    #[error("invalid host argument: {0}")]
    InvalidHost(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
