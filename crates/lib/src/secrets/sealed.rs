use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::k8s::{NamespacedName, ObjectMeta, TypeMeta};

/// Template for the `Secret` the controller creates when unsealing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretTemplate {
  pub metadata: ObjectMeta,
  #[serde(rename = "type")]
  pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedSecretSpec {
  pub encrypted_data: BTreeMap<String, String>,
  pub template: SecretTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedSecret {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub spec: SealedSecretSpec,
}

impl SealedSecret {
  pub fn new(name: &NamespacedName, secret_type: &str, encrypted_data: BTreeMap<String, String>) -> Self {
    Self {
      type_meta: TypeMeta::new("SealedSecret", "bitnami.com/v1alpha1"),
      metadata: name.into(),
      spec: SealedSecretSpec {
        encrypted_data,
        template: SecretTemplate {
          metadata: name.into(),
          kind: secret_type.to_string(),
        },
      },
    }
  }
}
