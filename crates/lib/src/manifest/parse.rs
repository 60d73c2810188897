use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Manifest, ManifestError};
use crate::consts::PIPELINES_FILE;

/// Parse a manifest from YAML text. `origin` is only used in errors.
pub fn parse_str(yaml: &str, origin: &Path) -> Result<Manifest, ManifestError> {
  serde_yaml::from_str(yaml).map_err(|source| ManifestError::Parse {
    path: origin.to_path_buf(),
    source,
  })
}

pub fn parse_file(path: &Path) -> Result<Manifest, ManifestError> {
  let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  let manifest = parse_str(&content, path)?;
  debug!(
    path = %path.display(),
    environments = manifest.environments.len(),
    apps = manifest.apps.len(),
    "parsed manifest"
  );
  Ok(manifest)
}

/// Parse `pipelines.yaml` inside `folder`.
pub fn parse_folder(folder: &Path) -> Result<Manifest, ManifestError> {
  if !folder.is_dir() {
    return Err(ManifestError::NotADirectory {
      path: folder.to_path_buf(),
    });
  }
  parse_file(&manifest_path(folder))
}

pub(crate) fn manifest_path(folder: &Path) -> PathBuf {
  folder.join(PIPELINES_FILE)
}
