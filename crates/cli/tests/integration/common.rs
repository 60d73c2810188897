//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use age::x25519::Identity;
use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own output directory and sealing identity.
pub struct TestEnv {
  pub temp: TempDir,
  pub identity: Identity,
}

impl TestEnv {
  /// Create an empty test environment.
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
      identity: Identity::generate(),
    }
  }

  /// Create from a fixture copied to `pipelines.yaml`.
  pub fn from_fixture(name: &str) -> Self {
    let env = Self::empty();
    env.write_file("pipelines.yaml", &fixture_content(name));
    env
  }

  /// Root of the generated tree.
  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.root().join(relative_path)
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.path(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path))
      .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative_path, e))
  }

  /// Parse a generated YAML file.
  pub fn read_yaml(&self, relative_path: &str) -> serde_yaml::Value {
    serde_yaml::from_str(&self.read_file(relative_path)).unwrap()
  }

  /// Resources listed by the kustomization in `dir`.
  pub fn kustomization_resources(&self, dir: &str) -> Vec<String> {
    let value = self.read_yaml(&format!("{dir}/kustomization.yaml"));
    value["resources"]
      .as_sequence()
      .map(|s| s.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
      .unwrap_or_default()
  }

  /// Get a pre-configured Command for the gitops binary.
  ///
  /// `GITOPS_SEALING_KEY` is set to this environment's public key.
  pub fn gitops_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("gitops");
    cmd.env("GITOPS_SEALING_KEY", self.identity.to_public().to_string());
    cmd
  }
}
