//! Repository-relative locations of generated resources.
//!
//! Every path produced here uses forward slashes regardless of the host OS;
//! they are keys of a [`Resources`](crate::resources::Resources) set and only
//! become filesystem paths when written out.

use thiserror::Error;

use crate::manifest::PipelinesConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
  #[error("cannot compute relative path from {from:?} to {to:?}: {reason}")]
  Malformed { from: String, to: String, reason: &'static str },
}

/// Directory holding everything generated for an environment.
pub fn path_for_environment(env: &str) -> String {
  join(&["environments", env])
}

pub fn path_for_service(env: &str, service: &str) -> String {
  join(&[&path_for_environment(env), "services", service])
}

pub fn path_for_application(env: &str, app: &str) -> String {
  join(&[&path_for_environment(env), "apps", app])
}

/// Directory of the pipelines (CI/CD) namespace resources.
pub fn path_for_pipelines(config: &PipelinesConfig) -> String {
  join(&["config", &config.name])
}

pub fn path_for_argocd() -> String {
  join(&["config", "argocd"])
}

/// Join path components with `/`, skipping empty components.
pub fn join(parts: &[&str]) -> String {
  parts
    .iter()
    .map(|p| p.trim_matches('/'))
    .filter(|p| !p.is_empty())
    .collect::<Vec<_>>()
    .join("/")
}

/// Final component of a slash-separated path.
pub fn basename(path: &str) -> &str {
  path.rsplit('/').next().unwrap_or(path)
}

/// Compute the relative path from directory `from` to directory `to`.
///
/// Both arguments are repository-relative directories. The result uses `../`
/// to climb out of `from` and is `.` when both name the same directory.
pub fn relative_path(from: &str, to: &str) -> Result<String, PathError> {
  let malformed = |reason| PathError::Malformed {
    from: from.to_string(),
    to: to.to_string(),
    reason,
  };

  if from.is_empty() || to.is_empty() {
    return Err(malformed("empty path"));
  }
  if from.starts_with('/') != to.starts_with('/') {
    return Err(malformed("cannot mix absolute and relative paths"));
  }

  let from_parts = components(from).ok_or_else(|| malformed("parent components are not supported"))?;
  let to_parts = components(to).ok_or_else(|| malformed("parent components are not supported"))?;

  let common = from_parts
    .iter()
    .zip(to_parts.iter())
    .take_while(|(a, b)| a == b)
    .count();

  let mut rel: Vec<&str> = std::iter::repeat_n("..", from_parts.len() - common).collect();
  rel.extend(&to_parts[common..]);

  if rel.is_empty() {
    Ok(".".to_string())
  } else {
    Ok(rel.join("/"))
  }
}

/// Split into normal components, dropping `.` and empty segments.
///
/// Returns `None` when the path contains `..`.
fn components(path: &str) -> Option<Vec<&str>> {
  let mut parts = Vec::new();
  for part in path.split('/') {
    match part {
      "" | "." => {}
      ".." => return None,
      p => parts.push(p),
    }
  }
  Some(parts)
}
