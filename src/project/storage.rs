use std::path::{Path, PathBuf};

use crate::base::FileId;
use crate::base::path_codec;
use crate::error::{InvalidPathError, Result};

/// Version of the persisted index layout. Data written under another
/// version directory is ignored.
pub const DATABASE_VERSION: u32 = 53;

/// Encode a project root as a single directory name.
pub fn encode_project_path(root: &Path) -> std::result::Result<String, InvalidPathError> {
    path_codec::encode_path(root)
}

/// Recover a project root from its directory name.
pub fn decode_project_path(token: &str) -> PathBuf {
    path_codec::decode_path(token)
}

/// Names the on-disk home of each project's persisted index.
///
/// Layout: `<data dir>/v<DATABASE_VERSION>/<encoded project root>/<file id>`.
/// What goes inside those files is up to the storage layer.
#[derive(Clone, Debug)]
pub struct ProjectStorage {
    data_dir: PathBuf,
}

impl ProjectStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding all projects of the current layout version.
    pub fn version_dir(&self) -> PathBuf {
        self.data_dir.join(format!("v{DATABASE_VERSION}"))
    }

    pub fn project_dir(&self, root: &Path) -> std::result::Result<PathBuf, InvalidPathError> {
        Ok(self.version_dir().join(encode_project_path(root)?))
    }

    /// Project root stored in `dir`, if its name is valid UTF-8.
    pub fn project_root(&self, dir: &Path) -> Option<PathBuf> {
        let token = dir.file_name()?.to_str()?;
        Some(decode_project_path(token))
    }

    /// Where the persisted data of one source file of `root` lives.
    pub fn source_file_path(
        &self,
        root: &Path,
        file: FileId,
    ) -> std::result::Result<PathBuf, InvalidPathError> {
        Ok(self.project_dir(root)?.join(file.index().to_string()))
    }

    /// Project roots with a directory under [`Self::version_dir`], sorted.
    pub fn list_projects(&self) -> Result<Vec<PathBuf>> {
        let dir = self.version_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut roots = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(token) = name.to_str() else {
                tracing::debug!(entry = ?name, "skipping non UTF-8 project directory");
                continue;
            };
            roots.push(decode_project_path(token));
        }
        roots.sort();
        Ok(roots)
    }
}
