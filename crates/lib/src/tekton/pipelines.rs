use serde::{Deserialize, Serialize};

use super::{PIPELINE_API, Param, ParamSpec};
use crate::k8s::{NamespacedName, ObjectMeta, TypeMeta};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
  pub name: String,
  pub image: String,
  pub script: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
  pub params: Vec<ParamSpec>,
  pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub spec: TaskSpec,
}

impl Task {
  pub fn new(name: &NamespacedName, params: Vec<ParamSpec>, steps: Vec<Step>) -> Self {
    Self {
      type_meta: TypeMeta::new("Task", PIPELINE_API),
      metadata: name.into(),
      spec: TaskSpec { params, steps },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTask {
  pub name: String,
  pub task_ref: TaskRef,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub params: Vec<Param>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub run_after: Vec<String>,
}

impl PipelineTask {
  pub fn new(name: &str, task: &str, params: Vec<Param>) -> Self {
    Self {
      name: name.to_string(),
      task_ref: TaskRef { name: task.to_string() },
      params,
      run_after: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
  pub params: Vec<ParamSpec>,
  pub tasks: Vec<PipelineTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub spec: PipelineSpec,
}

impl Pipeline {
  pub fn new(name: &NamespacedName, params: Vec<ParamSpec>, tasks: Vec<PipelineTask>) -> Self {
    Self {
      type_meta: TypeMeta::new("Pipeline", PIPELINE_API),
      metadata: name.into(),
      spec: PipelineSpec { params, tasks },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRef {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSpec {
  pub service_account_name: String,
  pub pipeline_ref: PipelineRef,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub params: Vec<Param>,
}

/// A pipeline run embedded in a trigger template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRun {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub spec: PipelineRunSpec,
}

impl PipelineRun {
  /// Runs get a generated suffix so each trigger firing creates a new object.
  pub fn new(pipeline: &str, service_account: &str, params: Vec<Param>) -> Self {
    Self {
      type_meta: TypeMeta::new("PipelineRun", PIPELINE_API),
      metadata: ObjectMeta::cluster(format!("{pipeline}-run-$(uid)")),
      spec: PipelineRunSpec {
        service_account_name: service_account.to_string(),
        pipeline_ref: PipelineRef {
          name: pipeline.to_string(),
        },
        params,
      },
    }
  }
}
