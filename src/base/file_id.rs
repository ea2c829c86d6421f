//! File identifiers and the registry capability that resolves them.

use std::fmt;
use std::path::{Path, PathBuf};

/// An interned identifier for a source file.
///
/// `FileId` is a lightweight handle (just a u32) that uniquely identifies
/// a file for the lifetime of the process. The actual path is stored in a
/// [`FileRegistry`].
///
/// Id `0` is reserved as the null file; registries never hand it out.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileId(pub u32);

impl FileId {
    /// The null file, used by [`Location::NULL`](crate::Location::NULL).
    pub const NULL: FileId = FileId(0);

    /// Create a new FileId from a raw index.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

impl From<u32> for FileId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<FileId> for u32 {
    #[inline]
    fn from(id: FileId) -> Self {
        id.0
    }
}

/// Bidirectional `Path ↔ FileId` table.
///
/// The store never owns file naming; it is handed a registry and only
/// asks whether an id resolves. Tests use synthetic registries.
pub trait FileRegistry: Send + Sync {
    /// Path registered for `file`, if any.
    fn path(&self, file: FileId) -> Option<PathBuf>;

    /// Id registered for `path`, if any.
    fn file_id(&self, path: &Path) -> Option<FileId>;

    /// Whether `file` resolves to a path.
    fn contains(&self, file: FileId) -> bool {
        !file.is_null() && self.path(file).is_some()
    }
}
