//! Ordered traversal of a manifest.
//!
//! # Order
//!
//! 1. Environments sorted by name, with the pipelines environment always last
//! 2. Within an environment, each service in insertion order, then the
//!    environment itself
//! 3. Each application once per environment it references, in manifest order
//!
//! Builders rely on this order: the environment callback sees every resource
//! generated by its services, and the event listener is written only after
//! all service triggers are collected.

use std::cmp::Ordering;

use super::{Application, Environment, Manifest, ManifestError, Service};

/// Callbacks invoked by [`Manifest::walk`].
///
/// Every callback defaults to a no-op, so a visitor implements only the
/// stages it cares about.
pub trait Visitor {
  type Error: From<ManifestError>;

  fn service(&mut self, _env: &Environment, _service: &Service) -> Result<(), Self::Error> {
    Ok(())
  }

  fn environment(&mut self, _env: &Environment) -> Result<(), Self::Error> {
    Ok(())
  }

  fn application(&mut self, _app: &Application, _env: &Environment) -> Result<(), Self::Error> {
    Ok(())
  }
}

impl Manifest {
  /// Drive `visitor` over the manifest. The first callback error stops the
  /// walk and is returned unchanged.
  ///
  /// When a pipelines namespace is configured but no environment carries its
  /// name, an empty environment of that name is visited in its place.
  pub fn walk<V: Visitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
    let synthesized = self
      .pipelines_config()
      .filter(|p| self.environment(&p.name).is_none())
      .map(|p| Environment::new(p.name.clone()));

    let mut envs: Vec<&Environment> = self.environments.iter().chain(synthesized.as_ref()).collect();
    envs.sort_by(|a, b| self.compare_environments(a, b));

    for env in envs {
      for service in &env.services {
        visitor.service(env, service)?;
      }
      visitor.environment(env)?;
    }

    for app in &self.apps {
      for env_ref in &app.environments {
        let env = self
          .environment(&env_ref.name)
          .ok_or_else(|| ManifestError::UnknownEnvironment(env_ref.name.clone()))?;
        visitor.application(app, env)?;
      }
    }

    Ok(())
  }

  fn compare_environments(&self, a: &Environment, b: &Environment) -> Ordering {
    self
      .is_pipelines_environment(a)
      .cmp(&self.is_pipelines_environment(b))
      .then_with(|| a.name.cmp(&b.name))
  }
}
