//! Kubernetes object types emitted into the GitOps tree.
//!
//! Only the fields the generated manifests use are modelled. Every object
//! flattens a [`TypeMeta`] so `apiVersion` and `kind` sit at the top level,
//! as the API server expects.

mod rbac;
mod workloads;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use rbac::*;
pub use workloads::*;

/// `apiVersion` and `kind` of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
  pub api_version: String,
  pub kind: String,
}

impl TypeMeta {
  pub fn new(kind: &str, api_version: &str) -> Self {
    Self {
      api_version: api_version.to_string(),
      kind: kind.to_string(),
    }
  }
}

/// Object metadata, following Kubernetes conventions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub namespace: Option<String>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub labels: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
  /// Metadata for a cluster-scoped object.
  pub fn cluster(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Default::default()
    }
  }
}

impl From<&NamespacedName> for ObjectMeta {
  fn from(n: &NamespacedName) -> Self {
    Self {
      name: n.name.clone(),
      namespace: Some(n.namespace.clone()),
      ..Default::default()
    }
  }
}

/// A name scoped to a namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespacedName {
  pub name: String,
  pub namespace: String,
}

impl NamespacedName {
  pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      namespace: namespace.into(),
    }
  }
}

impl std::fmt::Display for NamespacedName {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}/{}", self.namespace, self.name)
  }
}
