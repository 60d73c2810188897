//! Tekton pipeline and trigger resources.
//!
//! Triggers (bindings, templates, event listeners) are produced by the SCM
//! strategies and the trigger builder; tasks and pipelines are written once by
//! `init`.

mod pipelines;
mod triggers;

use serde::{Deserialize, Serialize};

pub use pipelines::*;
pub use triggers::*;

pub const PIPELINE_API: &str = "tekton.dev/v1beta1";
pub const TRIGGERS_API: &str = "triggers.tekton.dev/v1alpha1";

/// A name/value pair, used by bindings, pipeline runs and pipeline tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
  pub name: String,
  pub value: String,
}

impl Param {
  pub fn new(name: &str, value: &str) -> Self {
    Self {
      name: name.to_string(),
      value: value.to_string(),
    }
  }
}

/// Declaration of a string parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
  pub name: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default: Option<String>,
}

impl ParamSpec {
  pub fn string(name: &str, description: &str) -> Self {
    Self {
      name: name.to_string(),
      kind: "string".to_string(),
      description: description.to_string(),
      default: None,
    }
  }

  pub fn with_default(mut self, default: &str) -> Self {
    self.default = Some(default.to_string());
    self
  }
}
