//! Shared utilities.

use std::path::{Path, PathBuf};

#[cfg(test)]
pub mod testutil;

/// Returns the user's home directory.
#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("USERPROFILE").map(PathBuf::from)
}

/// Returns the user's home directory.
#[cfg(not(windows))]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand a leading `~` to the home directory. Other paths are returned as-is.
pub fn expand_home(path: &Path) -> PathBuf {
  match path.strip_prefix("~") {
    Ok(rest) => match home_dir() {
      Some(home) => home.join(rest),
      None => path.to_path_buf(),
    },
    Err(_) => path.to_path_buf(),
  }
}
