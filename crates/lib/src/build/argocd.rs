//! ArgoCD applications.
//!
//! One `Application` per (application, environment) pair, syncing the
//! application's base directory (or its external config repository) into the
//! environment's namespace.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::BuildError;
use crate::consts::{DEFAULT_SERVER, KUSTOMIZATION_FILE};
use crate::k8s::{NamespacedName, ObjectMeta, TypeMeta};
use crate::manifest::{Application, Environment, Manifest, Visitor};
use crate::paths::{join, path_for_application, path_for_argocd};
use crate::resources::{Kustomization, Resources};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDestination {
  pub namespace: String,
  pub server: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSource {
  #[serde(rename = "repoURL")]
  pub repo_url: String,
  pub path: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_revision: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPolicyAutomated {
  pub prune: bool,
  pub self_heal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPolicy {
  pub automated: SyncPolicyAutomated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
  pub project: String,
  pub destination: ApplicationDestination,
  pub source: ApplicationSource,
  pub sync_policy: SyncPolicy,
}

/// An `argoproj.io/v1alpha1` Application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgoApplication {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub spec: ApplicationSpec,
}

impl ArgoApplication {
  pub fn new(name: &NamespacedName, destination_ns: &str, source: ApplicationSource) -> Self {
    Self {
      type_meta: TypeMeta::new("Application", "argoproj.io/v1alpha1"),
      metadata: name.into(),
      spec: ApplicationSpec {
        project: "default".to_string(),
        destination: ApplicationDestination {
          namespace: destination_ns.to_string(),
          server: DEFAULT_SERVER.to_string(),
        },
        source,
        sync_policy: SyncPolicy {
          automated: SyncPolicyAutomated {
            prune: true,
            self_heal: true,
          },
        },
      },
    }
  }
}

fn config_path() -> String {
  join(&[&path_for_argocd(), "config"])
}

pub struct ArgoCDBuilder<'a> {
  manifest: &'a Manifest,
  files: BTreeSet<String>,
  resources: Resources,
}

impl<'a> ArgoCDBuilder<'a> {
  pub fn new(manifest: &'a Manifest) -> Self {
    Self {
      manifest,
      files: BTreeSet::new(),
      resources: Resources::new(),
    }
  }

  pub fn into_resources(self) -> Resources {
    self.resources
  }
}

impl Visitor for ArgoCDBuilder<'_> {
  type Error = BuildError;

  fn application(&mut self, app: &Application, env: &Environment) -> Result<(), BuildError> {
    let (Some(gitops_url), Some(argocd)) = (self.manifest.gitops_url(), self.manifest.argocd_config()) else {
      return Ok(());
    };

    let source = match &app.config_repo {
      Some(repo) => ApplicationSource {
        repo_url: repo.url.clone(),
        path: repo.path.clone(),
        target_revision: Some(repo.target_revision.clone()).filter(|r| !r.is_empty()),
      },
      None => ApplicationSource {
        repo_url: gitops_url.to_string(),
        path: join(&[&path_for_application(&env.name, &app.name), "base"]),
        target_revision: None,
      },
    };

    let name = format!("{}-{}", env.name, app.name);
    let filename = format!("{name}-app.yaml");
    let application = ArgoApplication::new(&NamespacedName::new(&argocd.namespace, name), &env.name, source);

    let dir = config_path();
    self.resources.insert(join(&[&dir, &filename]), &application)?;
    self.files.insert(filename);
    self.resources.insert(
      join(&[&dir, KUSTOMIZATION_FILE]),
      &Kustomization::with_resources(self.files.iter()),
    )?;

    debug!(app = %app.name, env = %env.name, "generated ArgoCD application");
    Ok(())
  }
}
