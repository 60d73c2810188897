//! Serialization of a resource set to disk or to a single YAML stream.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::resources::Resources;

#[derive(Debug, Error)]
pub enum OutputError {
  #[error("failed to serialize {path}: {source}")]
  Serialize { path: String, source: serde_yaml::Error },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write file {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },

  #[error("failed to write output stream: {0}")]
  Stream(#[source] std::io::Error),
}

/// Write each resource to `<root>/<key>`, creating parent directories.
///
/// Returns the written paths in key order.
pub fn write_resources(root: &Path, resources: &Resources) -> Result<Vec<PathBuf>, OutputError> {
  let mut written = Vec::with_capacity(resources.len());

  for (key, value) in resources.iter() {
    let path = root.join(key);
    let yaml = to_yaml(key, value)?;

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
        path: parent.to_path_buf(),
        source,
      })?;
    }
    fs::write(&path, yaml).map_err(|source| OutputError::WriteFile {
      path: path.clone(),
      source,
    })?;

    debug!(path = %path.display(), "wrote resource");
    written.push(path);
  }

  info!(root = %root.display(), count = written.len(), "wrote resources");
  Ok(written)
}

/// Write every resource to `out` as one multi-document stream, each document
/// followed by a `---` separator.
pub fn marshal_outputs<W: Write>(out: &mut W, resources: &Resources) -> Result<(), OutputError> {
  for (key, value) in resources.iter() {
    let yaml = to_yaml(key, value)?;
    out.write_all(yaml.as_bytes()).map_err(OutputError::Stream)?;
    out.write_all(b"---\n").map_err(OutputError::Stream)?;
  }
  Ok(())
}

fn to_yaml(key: &str, value: &serde_yaml::Value) -> Result<String, OutputError> {
  serde_yaml::to_string(value).map_err(|source| OutputError::Serialize {
    path: key.to_string(),
    source,
  })
}
