//! Discovery of files already present in the output tree.
//!
//! Kustomization indexes list generated files plus whatever a user added by
//! hand, so regenerating never drops manual additions. Builders receive a
//! [`FileLister`] instead of touching the disk directly.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::trace;
use walkdir::WalkDir;

use crate::consts::KUSTOMIZATION_FILE;

#[derive(Debug, Error)]
pub enum FsError {
  #[error("failed to list files in {}: {source}", path.display())]
  List { path: PathBuf, source: walkdir::Error },
}

/// Lists files that already exist under a repository-relative directory.
pub trait FileLister {
  /// Paths of every regular file below `dir`, relative to `dir` and using
  /// forward slashes. Kustomization indexes are excluded. A missing
  /// directory yields an empty set.
  fn list_files(&self, dir: &str) -> Result<BTreeSet<String>, FsError>;
}

/// Lists files on disk below an output root.
#[derive(Debug, Clone)]
pub struct DiskLister {
  root: PathBuf,
}

impl DiskLister {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

impl FileLister for DiskLister {
  fn list_files(&self, dir: &str) -> Result<BTreeSet<String>, FsError> {
    let base = self.root.join(dir);
    let mut files = BTreeSet::new();
    if !base.is_dir() {
      return Ok(files);
    }

    for entry in WalkDir::new(&base).min_depth(1).sort_by_file_name() {
      let entry = entry.map_err(|source| FsError::List {
        path: base.clone(),
        source,
      })?;
      if !entry.file_type().is_file() || entry.file_name() == KUSTOMIZATION_FILE {
        continue;
      }
      if let Ok(rel) = entry.path().strip_prefix(&base) {
        let rel: Vec<_> = rel.components().map(|c| c.as_os_str().to_string_lossy()).collect();
        files.insert(rel.join("/"));
      }
    }

    trace!(dir = %base.display(), count = files.len(), "listed existing files");
    Ok(files)
  }
}
