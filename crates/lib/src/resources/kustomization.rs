use serde::{Deserialize, Serialize};

/// A kustomize index file.
///
/// Empty lists are left out of the serialized form so generated indexes only
/// carry the field they use.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kustomization {
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub bases: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub resources: Vec<String>,
}

impl Kustomization {
  pub fn with_bases<I, S>(bases: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      bases: bases.into_iter().map(Into::into).collect(),
      resources: Vec::new(),
    }
  }

  pub fn with_resources<I, S>(resources: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      bases: Vec::new(),
      resources: resources.into_iter().map(Into::into).collect(),
    }
  }
}
