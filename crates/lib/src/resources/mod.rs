//! The resource set: generated manifests keyed by their output path.
//!
//! Builders accumulate typed Kubernetes objects into a [`Resources`] set,
//! which stores them as opaque YAML values so sets produced by different
//! builders can be merged and written without knowing their types.
//!
//! # Ordering
//!
//! Keys live in a [`BTreeMap`], so iteration (and therefore the order files
//! are written and listed in kustomizations) is deterministic.

mod kustomization;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::consts::KUSTOMIZATION_FILE;
use crate::paths;

pub use kustomization::Kustomization;

#[derive(Debug, Error)]
pub enum ResourceError {
  #[error("failed to serialize resource {path}: {source}")]
  Serialize { path: String, source: serde_yaml::Error },
}

/// Generated resources keyed by repository-relative path.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Resources(BTreeMap<String, serde_yaml::Value>);

impl Resources {
  pub fn new() -> Self {
    Self::default()
  }

  /// Serialize `value` and store it under `path`, replacing any previous entry.
  pub fn insert<T: Serialize>(&mut self, path: impl Into<String>, value: &T) -> Result<(), ResourceError> {
    let path = path.into();
    let value = serde_yaml::to_value(value).map_err(|source| ResourceError::Serialize {
      path: path.clone(),
      source,
    })?;
    self.0.insert(path, value);
    Ok(())
  }

  pub fn get(&self, path: &str) -> Option<&serde_yaml::Value> {
    self.0.get(path)
  }

  /// Read an entry back as a typed resource.
  ///
  /// Returns `None` when the path is absent or holds a different shape.
  pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
    self
      .0
      .get(path)
      .and_then(|v| serde_yaml::from_value(v.clone()).ok())
  }

  pub fn contains(&self, path: &str) -> bool {
    self.0.contains_key(path)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_yaml::Value)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v))
  }

  /// Re-root every key under `prefix`.
  pub fn with_prefix(self, prefix: &str) -> Self {
    Self(
      self
        .0
        .into_iter()
        .map(|(k, v)| (paths::join(&[prefix, &k]), v))
        .collect(),
    )
  }

  /// Filenames (relative to `dir`) of every entry below `dir`, excluding
  /// kustomization indexes.
  pub fn files_under(&self, dir: &str) -> BTreeSet<String> {
    let prefix = format!("{}/", dir.trim_end_matches('/'));
    self
      .0
      .keys()
      .filter_map(|k| k.strip_prefix(&prefix))
      .filter(|rel| paths::basename(rel) != KUSTOMIZATION_FILE)
      .map(str::to_string)
      .collect()
  }
}

impl FromIterator<(String, serde_yaml::Value)> for Resources {
  fn from_iter<I: IntoIterator<Item = (String, serde_yaml::Value)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl IntoIterator for Resources {
  type Item = (String, serde_yaml::Value);
  type IntoIter = std::collections::btree_map::IntoIter<String, serde_yaml::Value>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}

/// Combine two resource sets. Entries of `from` replace entries of `to` with
/// the same path; neither input is modified.
pub fn merge(from: &Resources, to: &Resources) -> Resources {
  let mut merged = to.clone();
  for (path, value) in &from.0 {
    merged.0.insert(path.clone(), value.clone());
  }
  merged
}

/// Sorted, de-duplicated resource list for the kustomization of `dir`.
///
/// Combines the files generated under `dir` with files that already exist
/// there on disk.
pub fn kustomization_for(resources: &Resources, dir: &str, existing: impl IntoIterator<Item = String>) -> Vec<String> {
  let mut files = resources.files_under(dir);
  files.extend(existing.into_iter().filter(|f| paths::basename(f) != KUSTOMIZATION_FILE));
  files.into_iter().collect()
}
