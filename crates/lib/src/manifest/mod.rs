//! The environment/application/service model driving generation.
//!
//! A [`Manifest`] is parsed from `pipelines.yaml` (or assembled by
//! bootstrap), checked with [`Manifest::validate`], and then traversed by
//! builders through [`Manifest::walk`].

mod parse;
mod types;
mod validate;
mod walk;

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

pub use parse::{parse_file, parse_folder, parse_str};
pub use types::*;
pub use walk::Visitor;

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse manifest {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_yaml::Error },

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[source] serde_yaml::Error),

  #[error("pipelines folder {} is not a directory", path.display())]
  NotADirectory { path: PathBuf },

  #[error("environment {0:?} does not exist")]
  UnknownEnvironment(String),

  #[error("service {service:?} does not exist in environment {env:?}")]
  UnknownService { env: String, service: String },

  #[error("duplicate environment {0:?}")]
  DuplicateEnvironment(String),

  #[error("duplicate application {0:?}")]
  DuplicateApplication(String),

  #[error("service {service:?} already exists in environment {env:?}")]
  DuplicateService { env: String, service: String },
}

impl Manifest {
  /// Add `service` to environment `env` and reference it from application `app`.
  ///
  /// The application, or its reference to `env`, is created when missing.
  /// Takes `&mut self`, so it cannot run while a walk borrows the manifest.
  pub fn add_service(&mut self, env: &str, app: &str, service: Service) -> Result<(), ManifestError> {
    let environment = self
      .environments
      .iter_mut()
      .find(|e| e.name == env)
      .ok_or_else(|| ManifestError::UnknownEnvironment(env.to_string()))?;

    if environment.service(&service.name).is_some() {
      return Err(ManifestError::DuplicateService {
        env: env.to_string(),
        service: service.name,
      });
    }

    let service_name = service.name.clone();
    environment.services.push(service);

    let application = match self.apps.iter().position(|a| a.name == app) {
      Some(i) => &mut self.apps[i],
      None => {
        self.apps.push(Application {
          name: app.to_string(),
          ..Default::default()
        });
        let last = self.apps.len() - 1;
        &mut self.apps[last]
      }
    };

    match application.environments.iter_mut().find(|r| r.name == env) {
      Some(env_ref) => env_ref.service_refs.push(service_name.clone()),
      None => application.environments.push(EnvironmentRef {
        name: env.to_string(),
        service_refs: vec![service_name.clone()],
      }),
    }

    debug!(env, app, service = %service_name, "added service to manifest");
    Ok(())
  }

  /// Serialize back to the `pipelines.yaml` form.
  pub fn to_yaml(&self) -> Result<String, ManifestError> {
    serde_yaml::to_string(self).map_err(ManifestError::Serialize)
  }
}
