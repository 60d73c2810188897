//! Manifest types, the in-memory form of `pipelines.yaml`.
//!
//! # Structure
//!
//! - [`Manifest`]: root aggregate holding the GitOps URL, environments,
//!   applications and global [`Config`]
//! - [`Environment`]: a namespace owning an ordered list of [`Service`]s
//! - [`Application`]: a cross-environment grouping of services, referring to
//!   them by name through [`EnvironmentRef`]s
//!
//! # Example
//!
//! ```yaml
//! gitops_url: https://github.com/org/gitops.git
//! environments:
//!   - name: dev
//!     services:
//!       - name: http-api
//!         source_url: https://github.com/org/http-api.git
//! apps:
//!   - name: app-http-api
//!     environments:
//!       - ref: dev
//!         serviceRefs: [http-api]
//! config:
//!   pipelines:
//!     name: cicd
//! ```

use serde::{Deserialize, Serialize};

use crate::consts::ARGOCD_NAMESPACE;
use crate::k8s::NamespacedName;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gitops_url: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub environments: Vec<Environment>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub apps: Vec<Application>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub config: Option<Config>,
}

/// Global settings for the generated tree.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pipelines: Option<PipelinesConfig>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub argocd: Option<ArgoCDConfig>,
}

/// The namespace CI/CD resources (event listener, pipelines) live in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinesConfig {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgoCDConfig {
  #[serde(default = "default_argocd_namespace")]
  pub namespace: String,
}

impl Default for ArgoCDConfig {
  fn default() -> Self {
    Self {
      namespace: default_argocd_namespace(),
    }
  }
}

fn default_argocd_namespace() -> String {
  ARGOCD_NAMESPACE.to_string()
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pipelines: Option<Pipelines>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub services: Vec<Service>,
}

impl Environment {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Default::default()
    }
  }

  pub fn service(&self, name: &str) -> Option<&Service> {
    self.services.iter().find(|s| s.name == name)
  }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub webhook: Option<Webhook>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pipelines: Option<Pipelines>,
}

impl Service {
  /// Source URL, treating an empty string as absent.
  pub fn source_url(&self) -> Option<&str> {
    self.source_url.as_deref().filter(|u| !u.is_empty())
  }
}

/// Secret validating webhook deliveries for a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
  pub secret: NamespacedName,
}

/// Pipelines triggered for an environment or service.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipelines {
  pub integration: TemplateBinding,
}

/// A trigger template plus the bindings feeding it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBinding {
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub template: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub bindings: Vec<String>,
}

impl Pipelines {
  pub fn new(template: impl Into<String>, bindings: Vec<String>) -> Self {
    Self {
      integration: TemplateBinding {
        template: template.into(),
        bindings,
      },
    }
  }

  /// A copy of `self` with the non-empty fields of `overrides` applied.
  ///
  /// Template and bindings are overridden independently. `self` is never
  /// modified, so a shared default cannot leak one service's settings into
  /// another.
  pub fn specialize(&self, overrides: Option<&Pipelines>) -> Pipelines {
    let mut out = self.clone();
    if let Some(o) = overrides {
      if !o.integration.template.is_empty() {
        out.integration.template = o.integration.template.clone();
      }
      if !o.integration.bindings.is_empty() {
        out.integration.bindings = o.integration.bindings.clone();
      }
    }
    out
  }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
  pub name: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub environments: Vec<EnvironmentRef>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub config_repo: Option<ConfigRepo>,
}

impl Application {
  pub fn environment_ref(&self, env: &str) -> Option<&EnvironmentRef> {
    self.environments.iter().find(|r| r.name == env)
  }
}

/// An application's presence in one environment.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentRef {
  #[serde(rename = "ref")]
  pub name: String,
  #[serde(rename = "serviceRefs", default, skip_serializing_if = "Vec::is_empty")]
  pub service_refs: Vec<String>,
}

/// External repository holding an application's configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRepo {
  pub url: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub target_revision: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub path: String,
}

impl Manifest {
  pub fn gitops_url(&self) -> Option<&str> {
    self.gitops_url.as_deref().filter(|u| !u.is_empty())
  }

  pub fn pipelines_config(&self) -> Option<&PipelinesConfig> {
    self.config.as_ref().and_then(|c| c.pipelines.as_ref())
  }

  pub fn argocd_config(&self) -> Option<&ArgoCDConfig> {
    self.config.as_ref().and_then(|c| c.argocd.as_ref())
  }

  pub fn environment(&self, name: &str) -> Option<&Environment> {
    self.environments.iter().find(|e| e.name == name)
  }

  pub fn application(&self, name: &str) -> Option<&Application> {
    self.apps.iter().find(|a| a.name == name)
  }

  pub fn service(&self, env: &str, name: &str) -> Option<&Service> {
    self.environment(env).and_then(|e| e.service(name))
  }

  /// Whether `env` is the environment holding the CI/CD resources.
  pub fn is_pipelines_environment(&self, env: &Environment) -> bool {
    self.pipelines_config().is_some_and(|p| p.name == env.name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn specialize_overrides_fields_independently() {
    let env = Pipelines::new("env-tpl", vec!["env-binding".into()]);
    let svc = Pipelines::new("", vec!["svc-binding".into()]);

    let resolved = env.specialize(Some(&svc));

    assert_eq!(resolved.integration.template, "env-tpl");
    assert_eq!(resolved.integration.bindings, vec!["svc-binding"]);
    assert_eq!(env.integration.bindings, vec!["env-binding"]);
  }

  #[test]
  fn specialize_without_override_copies() {
    let default = Pipelines::new("app-ci-template", vec!["github-push-binding".into()]);
    assert_eq!(default.specialize(None), default);
  }

  #[test]
  fn argocd_namespace_defaults() {
    let cfg: ArgoCDConfig = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.namespace, "argocd");
  }

  #[test]
  fn environment_ref_uses_wire_names() {
    let r: EnvironmentRef = serde_yaml::from_str("ref: dev\nserviceRefs: [a, b]\n").unwrap();
    assert_eq!(r.name, "dev");
    assert_eq!(r.service_refs, vec!["a", "b"]);
  }

  #[test]
  fn empty_source_url_is_absent() {
    let svc = Service {
      name: "a".into(),
      source_url: Some(String::new()),
      ..Default::default()
    };
    assert_eq!(svc.source_url(), None);
  }
}
