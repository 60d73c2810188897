use serde::{Deserialize, Serialize};

use super::{Param, ParamSpec, PipelineRun, TRIGGERS_API};
use crate::k8s::{NamespacedName, ObjectMeta, TypeMeta};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerBindingSpec {
  pub params: Vec<Param>,
}

/// Maps fields of a webhook payload to trigger parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerBinding {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub spec: TriggerBindingSpec,
}

impl TriggerBinding {
  pub fn new(name: &NamespacedName, params: Vec<Param>) -> Self {
    Self {
      type_meta: TypeMeta::new("TriggerBinding", TRIGGERS_API),
      metadata: name.into(),
      spec: TriggerBindingSpec { params },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerTemplateSpec {
  pub params: Vec<ParamSpec>,
  pub resourcetemplates: Vec<PipelineRun>,
}

/// Instantiates pipeline runs from trigger parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerTemplate {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub spec: TriggerTemplateSpec,
}

impl TriggerTemplate {
  pub fn new(name: &NamespacedName, params: Vec<ParamSpec>, run: PipelineRun) -> Self {
    Self {
      type_meta: TypeMeta::new("TriggerTemplate", TRIGGERS_API),
      metadata: name.into(),
      spec: TriggerTemplateSpec {
        params,
        resourcetemplates: vec![run],
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
  pub secret_name: String,
  pub secret_key: String,
  pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CelInterceptor {
  pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookInterceptor {
  pub secret_ref: SecretRef,
}

/// One interceptor in a trigger's chain. Exactly one field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInterceptor {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cel: Option<CelInterceptor>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub github: Option<WebhookInterceptor>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gitlab: Option<WebhookInterceptor>,
}

impl EventInterceptor {
  pub fn cel(filter: impl Into<String>) -> Self {
    Self {
      cel: Some(CelInterceptor { filter: filter.into() }),
      ..Default::default()
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRef {
  #[serde(rename = "ref")]
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListenerTrigger {
  pub name: String,
  pub interceptors: Vec<EventInterceptor>,
  pub bindings: Vec<BindingRef>,
  pub template: TemplateRef,
}

impl EventListenerTrigger {
  pub fn new(name: &str, interceptors: Vec<EventInterceptor>, template: &str, bindings: &[String]) -> Self {
    Self {
      name: name.to_string(),
      interceptors,
      bindings: bindings.iter().map(|b| BindingRef { name: b.clone() }).collect(),
      template: TemplateRef {
        name: template.to_string(),
      },
    }
  }

  pub fn binding_names(&self) -> Vec<&str> {
    self.bindings.iter().map(|b| b.name.as_str()).collect()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListenerSpec {
  pub service_account_name: String,
  pub triggers: Vec<EventListenerTrigger>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListener {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub spec: EventListenerSpec,
}

impl EventListener {
  pub fn new(name: &NamespacedName, service_account: &str, triggers: Vec<EventListenerTrigger>) -> Self {
    Self {
      type_meta: TypeMeta::new("EventListener", TRIGGERS_API),
      metadata: name.into(),
      spec: EventListenerSpec {
        service_account_name: service_account.to_string(),
        triggers,
      },
    }
  }

  /// Name of the service Tekton creates for this listener.
  pub fn service_name(&self) -> String {
    format!("el-{}", self.metadata.name)
  }
}
