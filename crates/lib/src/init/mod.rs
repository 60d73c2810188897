//! Scaffold a new GitOps repository.
//!
//! `init` writes `pipelines.yaml` plus everything the pipelines namespace
//! needs before any service exists:
//! - namespace, RBAC and service account
//! - sealed webhook and registry secrets
//! - tasks, pipelines, trigger bindings and templates
//! - the event listener and its route

pub mod cicd;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::build::triggers::{event_listener, gitops_triggers};
use crate::consts::{
  CICD_SUFFIX, DOCKER_SECRET, EVENT_LISTENER_PATH, GITOPS_WEBHOOK_SECRET, KUSTOMIZATION_FILE, PIPELINE_SA,
  PIPELINES_FILE, WEBHOOK_SECRET_KEY, WEBHOOK_SECRET_LENGTH,
};
use crate::k8s::{ClusterRoleBinding, Namespace, NamespacedName, ServiceAccount};
use crate::manifest::{Config, Manifest, ManifestError, PipelinesConfig};
use crate::output::{OutputError, write_resources};
use crate::paths::{join, path_for_pipelines};
use crate::resources::{Kustomization, ResourceError, Resources};
use crate::scm::{Repository, RepositoryRegistry, ScmError};
use crate::secrets::{
  SecretError, SecretSealer, create_sealed_docker_config_secret, create_sealed_secret, generate_string,
};

#[derive(Debug, Error)]
pub enum InitError {
  #[error(
    "pipelines.yaml in output path already exists. If you want replace your existing files, please rerun with --overwrite."
  )]
  PipelinesExists { path: PathBuf },

  #[error("invalid GitOps repository URL: {0}")]
  Repository(#[from] ScmError),

  #[error(transparent)]
  Secret(#[from] SecretError),

  #[error(transparent)]
  Resource(#[from] ResourceError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Output(#[from] OutputError),
}

/// Options for scaffolding a GitOps repository.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
  /// GitOps repository URL; `.git` is appended when missing
  pub gitops_repo_url: String,
  /// Webhook secret of the GitOps repository, generated when absent
  pub gitops_webhook_secret: Option<String>,
  /// Prefix for generated namespaces; a trailing `-` is added when missing
  pub prefix: String,
  /// Docker `config.json` sealed as the registry secret
  pub docker_config_json: Option<PathBuf>,
  /// Root of the generated tree
  pub output_path: PathBuf,
  pub overwrite: bool,
}

impl InitOptions {
  pub fn gitops_url(&self) -> String {
    add_git_suffix(&self.gitops_repo_url)
  }

  pub fn prefix(&self) -> String {
    normalize_prefix(&self.prefix)
  }

  /// Name of the pipelines namespace.
  pub fn cicd_namespace(&self) -> String {
    format!("{}{CICD_SUFFIX}", self.prefix())
  }
}

#[derive(Debug)]
pub struct InitResult {
  pub pipelines_file: PathBuf,
  pub resources: Resources,
  /// Files written, in path order
  pub written: Vec<PathBuf>,
  /// Whether the GitOps webhook secret was generated rather than supplied
  pub generated_secret: bool,
}

/// A non-empty prefix always ends with `-`.
pub fn normalize_prefix(prefix: &str) -> String {
  if prefix.is_empty() || prefix.ends_with('-') {
    prefix.to_string()
  } else {
    format!("{prefix}-")
  }
}

pub fn add_git_suffix(url: &str) -> String {
  let url = url.trim_end_matches('/');
  if url.ends_with(".git") {
    url.to_string()
  } else {
    format!("{url}.git")
  }
}

/// Refuse to touch an existing tree unless `overwrite` is set.
pub(crate) fn check_pipelines_file(output: &Path, overwrite: bool) -> Result<(), InitError> {
  let path = output.join(PIPELINES_FILE);
  if !overwrite && path.exists() {
    return Err(InitError::PipelinesExists { path });
  }
  Ok(())
}

/// The webhook secret to use and whether it was generated.
pub(crate) fn webhook_secret(supplied: Option<&str>) -> (String, bool) {
  match supplied.filter(|s| !s.is_empty()) {
    Some(secret) => (secret.to_string(), false),
    None => (generate_string(WEBHOOK_SECRET_LENGTH), true),
  }
}

/// Scaffold the repository at `options.output_path`.
///
/// # Errors
///
/// Fails with [`InitError::PipelinesExists`] before generating anything when
/// the output already holds a `pipelines.yaml` and `overwrite` is not set.
pub fn init(
  options: &InitOptions,
  sealer: &dyn SecretSealer,
  registry: &RepositoryRegistry,
) -> Result<InitResult, InitError> {
  check_pipelines_file(&options.output_path, options.overwrite)?;

  let (secret, generated_secret) = webhook_secret(options.gitops_webhook_secret.as_deref());
  if generated_secret {
    info!("generated GitOps webhook secret");
  }

  let (_, resources) = create_initial_files(options, &secret, sealer, registry)?;
  let written = write_resources(&options.output_path, &resources)?;

  Ok(InitResult {
    pipelines_file: options.output_path.join(PIPELINES_FILE),
    resources,
    written,
    generated_secret,
  })
}

/// The initial manifest and every file `init` writes, keyed by path.
pub(crate) fn create_initial_files(
  options: &InitOptions,
  gitops_secret: &str,
  sealer: &dyn SecretSealer,
  registry: &RepositoryRegistry,
) -> Result<(Manifest, Resources), InitError> {
  let gitops_url = options.gitops_url();
  let repo = registry.new_repository(&gitops_url)?;
  let pipelines = PipelinesConfig {
    name: options.cicd_namespace(),
  };

  let manifest = Manifest {
    gitops_url: Some(gitops_url),
    config: Some(Config {
      pipelines: Some(pipelines.clone()),
      argocd: None,
    }),
    ..Default::default()
  };

  let cicd = create_cicd_resources(repo.as_ref(), &pipelines.name, gitops_secret, options, sealer)?;

  let root = path_for_pipelines(&pipelines);
  let base = join(&[&root, "base"]);
  let kustomization = Kustomization::with_resources(cicd.keys());

  let mut resources = cicd.with_prefix(&base);
  resources.insert(PIPELINES_FILE, &manifest)?;
  resources.insert(join(&[&base, KUSTOMIZATION_FILE]), &kustomization)?;
  resources.insert(
    join(&[&root, "overlays", KUSTOMIZATION_FILE]),
    &Kustomization::with_bases(["../base"]),
  )?;

  debug!(count = resources.len(), namespace = %pipelines.name, "initial files");
  Ok((manifest, resources))
}

/// Resources of the pipelines namespace, keyed relative to its base directory.
pub(crate) fn create_cicd_resources(
  repo: &dyn Repository,
  ns: &str,
  gitops_secret: &str,
  options: &InitOptions,
  sealer: &dyn SecretSealer,
) -> Result<Resources, InitError> {
  let mut res = Resources::new();

  res.insert(cicd::NAMESPACES_PATH, &Namespace::new(ns))?;

  let sa = ServiceAccount::new(&NamespacedName::new(ns, PIPELINE_SA)).with_secret(DOCKER_SECRET);
  res.insert(cicd::ROLES_PATH, &cicd::cluster_role())?;
  res.insert(
    cicd::ROLE_BINDINGS_PATH,
    &ClusterRoleBinding::new(cicd::ROLE_BINDING_NAME, &sa, cicd::CLUSTER_ROLE_NAME),
  )?;
  res.insert(cicd::SERVICE_ACCOUNT_PATH, &sa)?;

  res.insert(
    cicd::GITOPS_SECRET_PATH,
    &create_sealed_secret(
      sealer,
      &NamespacedName::new(ns, GITOPS_WEBHOOK_SECRET),
      gitops_secret,
      WEBHOOK_SECRET_KEY,
    )?,
  )?;
  if let Some(config) = &options.docker_config_json {
    res.insert(
      cicd::DOCKER_CONFIG_PATH,
      &create_sealed_docker_config_secret(sealer, &NamespacedName::new(ns, DOCKER_SECRET), config)?,
    )?;
  }

  res.insert(cicd::DEPLOY_FROM_SOURCE_TASK_PATH, &cicd::deploy_from_source_task(ns))?;
  res.insert(cicd::DEPLOY_USING_KUBECTL_TASK_PATH, &cicd::deploy_using_kubectl_task(ns))?;

  res.insert(cicd::CI_DRYRUN_PIPELINE_PATH, &cicd::ci_dryrun_pipeline(ns))?;
  res.insert(cicd::CD_DEPLOY_PIPELINE_PATH, &cicd::cd_deploy_pipeline(ns))?;
  res.insert(cicd::APP_CI_PIPELINE_PATH, &cicd::app_ci_pipeline(ns))?;

  let (pr_binding, pr_name) = repo.create_pr_binding(ns);
  res.insert(cicd::binding_path(&pr_name), &pr_binding)?;
  let (push_binding, push_name) = repo.create_push_binding(ns);
  res.insert(cicd::binding_path(&push_name), &push_binding)?;

  res.insert(cicd::CI_DRYRUN_TEMPLATE_PATH, &cicd::ci_dryrun_template(ns, PIPELINE_SA))?;
  res.insert(cicd::CD_DEPLOY_TEMPLATE_PATH, &cicd::cd_deploy_template(ns, PIPELINE_SA))?;
  res.insert(cicd::APP_CI_TEMPLATE_PATH, &cicd::app_ci_template(ns, PIPELINE_SA))?;

  let listener = event_listener(ns, gitops_triggers(repo, ns));
  res.insert(cicd::ROUTE_PATH, &cicd::listener_route(ns, &listener))?;
  res.insert(EVENT_LISTENER_PATH, &listener)?;

  Ok(res)
}
