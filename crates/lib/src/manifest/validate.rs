use std::collections::HashSet;

use super::{Manifest, ManifestError};

impl Manifest {
  /// Check the referential integrity of the manifest.
  ///
  /// Names must be unique (environments and applications globally, services
  /// within their environment) and every application reference must resolve.
  /// The first violation found is returned.
  pub fn validate(&self) -> Result<(), ManifestError> {
    let mut envs = HashSet::new();
    for env in &self.environments {
      if !envs.insert(env.name.as_str()) {
        return Err(ManifestError::DuplicateEnvironment(env.name.clone()));
      }

      let mut services = HashSet::new();
      for svc in &env.services {
        if !services.insert(svc.name.as_str()) {
          return Err(ManifestError::DuplicateService {
            env: env.name.clone(),
            service: svc.name.clone(),
          });
        }
      }
    }

    let mut apps = HashSet::new();
    for app in &self.apps {
      if !apps.insert(app.name.as_str()) {
        return Err(ManifestError::DuplicateApplication(app.name.clone()));
      }

      for env_ref in &app.environments {
        let env = self
          .environment(&env_ref.name)
          .ok_or_else(|| ManifestError::UnknownEnvironment(env_ref.name.clone()))?;

        for svc in &env_ref.service_refs {
          if env.service(svc).is_none() {
            return Err(ManifestError::UnknownService {
              env: env.name.clone(),
              service: svc.clone(),
            });
          }
        }
      }
    }

    Ok(())
  }
}
