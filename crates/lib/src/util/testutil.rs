//! Test fixtures shared by unit tests across the crate.

use std::collections::{BTreeMap, BTreeSet};

use crate::fs::{FileLister, FsError};
use crate::k8s::NamespacedName;
use crate::manifest::{
  ArgoCDConfig, Application, Config, Environment, EnvironmentRef, Manifest, PipelinesConfig, Service, Webhook,
};

pub const GITOPS_URL: &str = "https://github.com/my-org/gitops.git";
pub const SERVICE_URL: &str = "https://github.com/my-org/http-api.git";

/// One `dev` environment with an `http-api` service referenced by
/// `app-http-api`, pipelines namespace `cicd`, ArgoCD enabled.
pub fn sample_manifest() -> Manifest {
  Manifest {
    gitops_url: Some(GITOPS_URL.to_string()),
    environments: vec![Environment {
      name: "dev".into(),
      pipelines: None,
      services: vec![Service {
        name: "http-api".into(),
        webhook: Some(Webhook {
          secret: NamespacedName::new("cicd", "webhook-secret-dev-http-api"),
        }),
        source_url: Some(SERVICE_URL.to_string()),
        pipelines: None,
      }],
    }],
    apps: vec![Application {
      name: "app-http-api".into(),
      environments: vec![EnvironmentRef {
        name: "dev".into(),
        service_refs: vec!["http-api".into()],
      }],
      config_repo: None,
    }],
    config: Some(Config {
      pipelines: Some(PipelinesConfig { name: "cicd".into() }),
      argocd: Some(ArgoCDConfig::default()),
    }),
  }
}

/// In-memory [`FileLister`] keyed by directory.
#[derive(Debug, Default)]
pub struct MemLister(pub BTreeMap<String, BTreeSet<String>>);

impl MemLister {
  pub fn with(dir: &str, files: &[&str]) -> Self {
    let mut lister = Self::default();
    lister
      .0
      .insert(dir.to_string(), files.iter().map(|f| f.to_string()).collect());
    lister
  }
}

impl FileLister for MemLister {
  fn list_files(&self, dir: &str) -> Result<BTreeSet<String>, FsError> {
    Ok(self.0.get(dir).cloned().unwrap_or_default())
  }
}
