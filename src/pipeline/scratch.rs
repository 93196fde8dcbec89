//! Scratch storage for tools that insist on real file paths.
//!
//! A [`ScratchDir`] is a fresh `tempfile` directory; a [`ScratchFile`] is one
//! uniquely named file inside its own scratch directory. Both remove the
//! directory and everything in it when dropped, so cleanup happens on every
//! exit path of the owning scope: success, `?` early return, or panic.
//!
//! Names come from `tempfile` (directory) and UUID v4 (file), so concurrent
//! conversions never see each other's files.

use crate::error::Doc2MdError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use uuid::Uuid;

const DIR_PREFIX: &str = "doc2md-";

/// A scratch directory removed on drop.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a new directory under `root`, or the system temp dir.
    pub fn new(root: Option<&Path>) -> Result<Self, Doc2MdError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(DIR_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(Doc2MdError::Scratch)?;
        debug!("Created scratch dir {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Bytes materialised to `<scratch dir>/<uuid>.<suffix>`.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    dir: ScratchDir,
}

impl ScratchFile {
    /// Write `bytes` to a new scratch file with the given suffix
    /// (extension, without the dot).
    pub async fn materialize(
        bytes: &[u8],
        suffix: &str,
        root: Option<&Path>,
    ) -> Result<Self, Doc2MdError> {
        let dir = ScratchDir::new(root)?;
        let path = dir.path().join(format!("{}.{}", Uuid::new_v4(), suffix));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(Doc2MdError::Scratch)?;
        debug!("Materialized {} bytes to {}", bytes.len(), path.display());
        Ok(Self { path, dir })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the file; removed together with it.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Same directory and base name, different extension.
    pub fn sibling_with_extension(&self, ext: &str) -> PathBuf {
        self.path.with_extension(ext)
    }
}
