//! Webhook secret generation and sealing.
//!
//! Secrets never land in the GitOps repository in plain text. Each value is
//! encrypted for the cluster's sealing key and wrapped in a `SealedSecret`
//! resource; only the controller holding the matching identity can unseal it.

mod sealed;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::k8s::NamespacedName;
use crate::util::expand_home;

pub use sealed::{SealedSecret, SealedSecretSpec, SecretTemplate};

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789$:#";

pub const OPAQUE: &str = "Opaque";
pub const DOCKER_CONFIG_JSON: &str = "kubernetes.io/dockerconfigjson";
const DOCKER_CONFIG_KEY: &str = ".dockerconfigjson";

#[derive(Debug, Error)]
pub enum SecretError {
  #[error("invalid sealing key: {reason}")]
  InvalidKey { reason: String },

  #[error("failed to seal secret {name}: {source}")]
  Seal { name: String, source: age::EncryptError },

  #[error("failed to read Docker config {}: {source}", path.display())]
  ReadDockerConfig { path: PathBuf, source: std::io::Error },
}

/// Random string of `len` characters suitable for a webhook secret.
pub fn generate_string(len: usize) -> String {
  let mut rng = rand::rng();
  (0..len)
    .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
    .collect()
}

/// Encrypts secret data into a [`SealedSecret`].
pub trait SecretSealer {
  fn seal(
    &self,
    name: &NamespacedName,
    secret_type: &str,
    data: &BTreeMap<String, Vec<u8>>,
  ) -> Result<SealedSecret, SecretError>;
}

/// Seals values for an age X25519 recipient.
///
/// Each value is encrypted separately and stored base64 encoded.
#[derive(Clone)]
pub struct AgeSealer {
  recipient: age::x25519::Recipient,
}

impl std::fmt::Debug for AgeSealer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AgeSealer")
      .field("recipient", &self.recipient.to_string())
      .finish()
  }
}

impl AgeSealer {
  pub fn new(recipient: age::x25519::Recipient) -> Self {
    Self { recipient }
  }
}

impl FromStr for AgeSealer {
  type Err = SecretError;

  /// Parse an `age1...` public key.
  fn from_str(key: &str) -> Result<Self, Self::Err> {
    key
      .trim()
      .parse::<age::x25519::Recipient>()
      .map(Self::new)
      .map_err(|reason| SecretError::InvalidKey {
        reason: reason.to_string(),
      })
  }
}

impl SecretSealer for AgeSealer {
  fn seal(
    &self,
    name: &NamespacedName,
    secret_type: &str,
    data: &BTreeMap<String, Vec<u8>>,
  ) -> Result<SealedSecret, SecretError> {
    let mut encrypted = BTreeMap::new();
    for (key, value) in data {
      let ciphertext = age::encrypt(&self.recipient, value).map_err(|source| SecretError::Seal {
        name: name.to_string(),
        source,
      })?;
      encrypted.insert(key.clone(), STANDARD.encode(ciphertext));
    }
    debug!(secret = %name, keys = encrypted.len(), "sealed secret");
    Ok(SealedSecret::new(name, secret_type, encrypted))
  }
}

/// Seal a single plain-text value stored under `key`.
pub fn create_sealed_secret(
  sealer: &dyn SecretSealer,
  name: &NamespacedName,
  value: &str,
  key: &str,
) -> Result<SealedSecret, SecretError> {
  let data = BTreeMap::from([(key.to_string(), value.as_bytes().to_vec())]);
  sealer.seal(name, OPAQUE, &data)
}

/// Seal registry credentials read from a Docker `config.json`.
pub fn create_sealed_docker_config_secret(
  sealer: &dyn SecretSealer,
  name: &NamespacedName,
  config_path: &Path,
) -> Result<SealedSecret, SecretError> {
  let path = expand_home(config_path);
  let config = std::fs::read(&path).map_err(|source| SecretError::ReadDockerConfig { path, source })?;
  let data = BTreeMap::from([(DOCKER_CONFIG_KEY.to_string(), config)]);
  sealer.seal(name, DOCKER_CONFIG_JSON, &data)
}

#[cfg(test)]
mod tests {
  use age::x25519::Identity;
  use tempfile::TempDir;

  use super::*;

  fn sealer() -> (Identity, AgeSealer) {
    let identity = Identity::generate();
    let sealer = AgeSealer::new(identity.to_public());
    (identity, sealer)
  }

  fn unseal(identity: &Identity, value: &str) -> Vec<u8> {
    let ciphertext = STANDARD.decode(value).unwrap();
    age::decrypt(identity, &ciphertext).unwrap()
  }

  #[test]
  fn generated_strings_use_charset() {
    let s = generate_string(20);
    assert_eq!(s.chars().count(), 20);
    assert!(s.bytes().all(|b| CHARSET.contains(&b)));
    assert_ne!(generate_string(20), s);
  }

  #[test]
  fn sealed_secret_decrypts_with_identity() {
    let (identity, sealer) = sealer();
    let name = NamespacedName::new("cicd", "gitops-webhook-secret");

    let sealed = create_sealed_secret(&sealer, &name, "s3cret", "webhook-secret-key").unwrap();

    assert_eq!(sealed.metadata.name, "gitops-webhook-secret");
    assert_eq!(sealed.spec.template.kind, OPAQUE);
    let value = &sealed.spec.encrypted_data["webhook-secret-key"];
    assert!(!value.contains("s3cret"));
    assert_eq!(unseal(&identity, value), b"s3cret");
  }

  #[test]
  fn docker_config_secret() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.json");
    std::fs::write(&config, r#"{"auths":{}}"#).unwrap();
    let (identity, sealer) = sealer();

    let sealed = create_sealed_docker_config_secret(&sealer, &NamespacedName::new("cicd", "regcred"), &config).unwrap();

    assert_eq!(sealed.spec.template.kind, DOCKER_CONFIG_JSON);
    assert_eq!(unseal(&identity, &sealed.spec.encrypted_data[".dockerconfigjson"]), br#"{"auths":{}}"#);
  }

  #[test]
  fn missing_docker_config_names_path() {
    let (_, sealer) = sealer();
    let err = create_sealed_docker_config_secret(
      &sealer,
      &NamespacedName::new("cicd", "regcred"),
      Path::new("/nonexistent/config.json"),
    )
    .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/config.json"));
  }

  #[test]
  fn parse_sealing_key() {
    let identity = Identity::generate();
    let key = identity.to_public().to_string();
    assert!(key.parse::<AgeSealer>().is_ok());
    assert!(matches!("not-a-key".parse::<AgeSealer>(), Err(SecretError::InvalidKey { .. })));
  }
}
