//! Generation of the GitOps tree from a manifest.
//!
//! Three independent visitors each walk the manifest and fill their own
//! resource set; the sets are then merged:
//!
//! - [`environments`] - namespaces, role bindings and kustomize skeletons
//! - [`triggers`] - the CI/CD event listener and its webhook triggers
//! - [`argocd`] - ArgoCD applications for each application and environment
//!
//! # Submodules
//!
//! Each builder can run on its own; [`build_resources`] runs all of them and
//! finishes the pipelines kustomization once every contribution is known.

pub mod argocd;
pub mod environments;
pub mod triggers;

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::consts::{APP_CI_TEMPLATE, KUSTOMIZATION_FILE};
use crate::fs::{DiskLister, FileLister, FsError};
use crate::manifest::{Manifest, ManifestError, Pipelines, parse_folder};
use crate::output::{OutputError, write_resources};
use crate::paths::{self, PathError, path_for_pipelines};
use crate::resources::{Kustomization, ResourceError, Resources, kustomization_for, merge};
use crate::scm::{Repository, RepositoryRegistry, ScmError};

pub use argocd::ArgoCDBuilder;
pub use environments::EnvironmentBuilder;
pub use triggers::TriggerBuilder;

#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Path(#[from] PathError),

  #[error(transparent)]
  Resource(#[from] ResourceError),

  #[error(transparent)]
  Fs(#[from] FsError),

  #[error(transparent)]
  Output(#[from] OutputError),

  #[error("invalid source URL for service {service:?}: {source}")]
  ServiceRepository { service: String, source: ScmError },

  #[error("invalid GitOps repository URL: {0}")]
  GitOpsRepository(#[source] ScmError),
}

/// Pipelines used for a service when neither it nor its environment names any.
#[derive(Debug, Clone)]
pub struct PipelineDefaults {
  pub template: String,
}

impl Default for PipelineDefaults {
  fn default() -> Self {
    Self {
      template: APP_CI_TEMPLATE.to_string(),
    }
  }
}

impl PipelineDefaults {
  /// Default pipelines for a service hosted in `repo`: the default template
  /// fed by the provider's push binding.
  pub fn for_repo(&self, repo: &dyn Repository) -> Pipelines {
    Pipelines::new(self.template.clone(), vec![repo.push_binding_name().to_string()])
  }
}

/// Collaborators shared by the builders.
#[derive(Debug, Clone, Default)]
pub struct BuildConfig {
  pub registry: RepositoryRegistry,
  pub defaults: PipelineDefaults,
}

/// Run every builder over `manifest` and merge the results.
///
/// The manifest is validated first. `lister` reports files already present
/// in the output tree so kustomizations keep listing them.
pub fn build_resources(
  manifest: &Manifest,
  lister: &dyn FileLister,
  config: &BuildConfig,
) -> Result<Resources, BuildError> {
  manifest.validate()?;

  let mut envs = EnvironmentBuilder::new(manifest, lister);
  manifest.walk(&mut envs)?;

  let mut triggers = TriggerBuilder::new(manifest, config);
  manifest.walk(&mut triggers)?;

  let mut argo = ArgoCDBuilder::new(manifest);
  manifest.walk(&mut argo)?;

  let mut resources = merge(&argo.into_resources(), &merge(&triggers.into_resources(), &envs.into_resources()));
  index_pipelines(manifest, &mut resources, lister)?;

  info!(count = resources.len(), "built resources");
  Ok(resources)
}

/// (Re)write the pipelines namespace kustomizations.
///
/// The base index lists every file of `resources` under the pipelines base
/// directory plus the ones `lister` finds on disk, so it must run after all
/// contributions to that directory are merged.
pub fn index_pipelines(
  manifest: &Manifest,
  resources: &mut Resources,
  lister: &dyn FileLister,
) -> Result<(), BuildError> {
  let Some(pipelines) = manifest.pipelines_config() else {
    return Ok(());
  };

  let root = path_for_pipelines(pipelines);
  let base = paths::join(&[&root, "base"]);
  let files = kustomization_for(resources, &base, lister.list_files(&base)?);
  resources.insert(
    paths::join(&[&base, KUSTOMIZATION_FILE]),
    &Kustomization::with_resources(files),
  )?;
  resources.insert(
    paths::join(&[&root, "overlays", KUSTOMIZATION_FILE]),
    &Kustomization::with_bases(["../base"]),
  )?;
  Ok(())
}

/// Options for rebuilding a GitOps tree from its `pipelines.yaml`.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Directory containing `pipelines.yaml`
  pub pipelines_folder: PathBuf,
  /// Root of the generated tree
  pub output_path: PathBuf,
  pub config: BuildConfig,
}

#[derive(Debug)]
pub struct BuildResult {
  pub resources: Resources,
  /// Files written, in path order
  pub written: Vec<PathBuf>,
}

/// Parse, validate, build and write.
pub fn build(options: &BuildOptions) -> Result<BuildResult, BuildError> {
  let manifest = parse_folder(&options.pipelines_folder)?;
  let lister = DiskLister::new(&options.output_path);
  let resources = build_resources(&manifest, &lister, &options.config)?;
  let written = write_resources(&options.output_path, &resources)?;
  Ok(BuildResult { resources, written })
}
