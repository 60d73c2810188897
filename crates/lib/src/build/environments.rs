//! Per-environment scaffolding.
//!
//! For every service, application and environment this emits the kustomize
//! base/overlays skeleton; for every environment its namespace, plus a role
//! binding letting the pipeline service account deploy into it.

use tracing::debug;

use super::BuildError;
use crate::consts::{KUSTOMIZATION_FILE, PIPELINE_SA};
use crate::fs::FileLister;
use crate::k8s::{Namespace, NamespacedName, RoleBinding, ServiceAccount};
use crate::manifest::{Application, Environment, Manifest, Service, Visitor};
use crate::paths::{join, path_for_application, path_for_environment, path_for_service, relative_path};
use crate::resources::{Kustomization, Resources, kustomization_for};

/// Directory of the environment-level resources (namespace, role binding).
pub fn environment_base_path(env: &str) -> String {
  join(&[&path_for_environment(env), "env", "base"])
}

pub fn role_binding_path(env: &str) -> String {
  join(&[&environment_base_path(env), &format!("{env}-rolebinding.yaml")])
}

pub fn namespace_path(env: &str) -> String {
  join(&[&environment_base_path(env), &format!("{env}-environment.yaml")])
}

pub struct EnvironmentBuilder<'a> {
  manifest: &'a Manifest,
  lister: &'a dyn FileLister,
  resources: Resources,
}

impl<'a> EnvironmentBuilder<'a> {
  pub fn new(manifest: &'a Manifest, lister: &'a dyn FileLister) -> Self {
    Self {
      manifest,
      lister,
      resources: Resources::new(),
    }
  }

  pub fn into_resources(self) -> Resources {
    self.resources
  }

  /// Root kustomization pointing at `overlays`, overlays pointing back at `base`.
  fn add_skeleton(&mut self, dir: &str) -> Result<(), BuildError> {
    let overlays = join(&[dir, "overlays"]);
    let base = join(&[dir, "base"]);

    self
      .resources
      .insert(join(&[dir, KUSTOMIZATION_FILE]), &Kustomization::with_bases(["overlays"]))?;
    self.resources.insert(
      join(&[&overlays, KUSTOMIZATION_FILE]),
      &Kustomization::with_bases([relative_path(&overlays, &base)?]),
    )?;
    Ok(())
  }
}

impl Visitor for EnvironmentBuilder<'_> {
  type Error = BuildError;

  fn service(&mut self, env: &Environment, service: &Service) -> Result<(), BuildError> {
    let dir = path_for_service(&env.name, &service.name);
    self.add_skeleton(&dir)?;
    self.resources.insert(
      join(&[&dir, "base", KUSTOMIZATION_FILE]),
      &Kustomization::with_bases(["./config"]),
    )?;

    // The pipelines namespace is covered by the cluster role binding.
    let pipelines = self
      .manifest
      .pipelines_config()
      .filter(|_| !self.manifest.is_pipelines_environment(env));
    if let Some(pipelines) = pipelines {
      let path = role_binding_path(&env.name);
      if !self.resources.contains(&path) {
        let sa = ServiceAccount::new(&NamespacedName::new(&pipelines.name, PIPELINE_SA));
        let binding = RoleBinding::new(
          &NamespacedName::new(&env.name, format!("{}-rolebinding", env.name)),
          &sa,
          "ClusterRole",
          "edit",
        );
        self.resources.insert(path, &binding)?;
      }
    }
    Ok(())
  }

  fn environment(&mut self, env: &Environment) -> Result<(), BuildError> {
    if self.manifest.is_pipelines_environment(env) {
      return Ok(());
    }

    let base = environment_base_path(&env.name);
    self.resources.insert(namespace_path(&env.name), &Namespace::new(&env.name))?;

    let files = kustomization_for(&self.resources, &base, self.lister.list_files(&base)?);
    debug!(env = %env.name, files = files.len(), "environment kustomization");
    self
      .resources
      .insert(join(&[&base, KUSTOMIZATION_FILE]), &Kustomization::with_resources(files))?;
    self.resources.insert(
      join(&[&path_for_environment(&env.name), "env", "overlays", KUSTOMIZATION_FILE]),
      &Kustomization::with_bases(["../base"]),
    )?;
    Ok(())
  }

  fn application(&mut self, app: &Application, env: &Environment) -> Result<(), BuildError> {
    let dir = path_for_application(&env.name, &app.name);
    self.add_skeleton(&dir)?;

    let base = join(&[&dir, "base"]);
    // Only the services this app references in `env`; other environments get their own base.
    let services = app
      .environment_ref(&env.name)
      .map(|r| r.service_refs.as_slice())
      .unwrap_or_default();
    let bases = services
      .iter()
      .map(|svc| relative_path(&base, &path_for_service(&env.name, svc)))
      .collect::<Result<Vec<_>, _>>()?;

    self
      .resources
      .insert(join(&[&base, KUSTOMIZATION_FILE]), &Kustomization::with_bases(bases))?;
    Ok(())
  }
}
