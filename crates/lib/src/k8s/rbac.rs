use serde::{Deserialize, Serialize};

use super::{NamespacedName, ObjectMeta, ServiceAccount, TypeMeta};

const RBAC_API: &str = "rbac.authorization.k8s.io/v1";
const RBAC_GROUP: &str = "rbac.authorization.k8s.io";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
  pub api_groups: Vec<String>,
  pub resources: Vec<String>,
  pub verbs: Vec<String>,
}

impl PolicyRule {
  pub fn new(api_groups: &[&str], resources: &[&str], verbs: &[&str]) -> Self {
    let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
    Self {
      api_groups: owned(api_groups),
      resources: owned(resources),
      verbs: owned(verbs),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRole {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub rules: Vec<PolicyRule>,
}

impl ClusterRole {
  pub fn new(name: &str, rules: Vec<PolicyRule>) -> Self {
    Self {
      type_meta: TypeMeta::new("ClusterRole", RBAC_API),
      metadata: ObjectMeta::cluster(name),
      rules,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  pub kind: String,
  pub name: String,
  pub namespace: String,
}

impl From<&ServiceAccount> for Subject {
  fn from(sa: &ServiceAccount) -> Self {
    Self {
      kind: sa.type_meta.kind.clone(),
      name: sa.metadata.name.clone(),
      namespace: sa.metadata.namespace.clone().unwrap_or_default(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
  pub api_group: String,
  pub kind: String,
  pub name: String,
}

impl RoleRef {
  pub fn new(kind: &str, name: &str) -> Self {
    Self {
      api_group: RBAC_GROUP.to_string(),
      kind: kind.to_string(),
      name: name.to_string(),
    }
  }
}

/// A namespaced `RoleBinding`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub subjects: Vec<Subject>,
  pub role_ref: RoleRef,
}

impl RoleBinding {
  /// Bind `sa` to a role of the given kind (`Role` or `ClusterRole`).
  pub fn new(name: &NamespacedName, sa: &ServiceAccount, role_kind: &str, role_name: &str) -> Self {
    Self {
      type_meta: TypeMeta::new("RoleBinding", RBAC_API),
      metadata: name.into(),
      subjects: vec![sa.into()],
      role_ref: RoleRef::new(role_kind, role_name),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRoleBinding {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub subjects: Vec<Subject>,
  pub role_ref: RoleRef,
}

impl ClusterRoleBinding {
  pub fn new(name: &str, sa: &ServiceAccount, role_name: &str) -> Self {
    Self {
      type_meta: TypeMeta::new("ClusterRoleBinding", RBAC_API),
      metadata: ObjectMeta::cluster(name),
      subjects: vec![sa.into()],
      role_ref: RoleRef::new("ClusterRole", role_name),
    }
  }
}
