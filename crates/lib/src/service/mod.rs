//! Adding a service to an existing GitOps repository.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::build::triggers::service_webhook_secret;
use crate::build::{BuildConfig, BuildError, build_resources, index_pipelines};
use crate::consts::{PIPELINES_FILE, WEBHOOK_SECRET_KEY};
use crate::fs::DiskLister;
use crate::init::cicd::secret_path;
use crate::init::{add_git_suffix, webhook_secret};
use crate::manifest::{Manifest, ManifestError, Service, Webhook, parse_folder};
use crate::output::{OutputError, write_resources};
use crate::paths::{join, path_for_pipelines};
use crate::resources::{ResourceError, Resources, merge};
use crate::secrets::{SecretError, SecretSealer, create_sealed_secret};

#[derive(Debug, Error)]
pub enum ServiceError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Secret(#[from] SecretError),

  #[error(transparent)]
  Resource(#[from] ResourceError),

  #[error(transparent)]
  Output(#[from] OutputError),
}

#[derive(Debug, Clone, Default)]
pub struct AddServiceOptions {
  /// Root of the GitOps tree, holding `pipelines.yaml`
  pub pipelines_folder: PathBuf,
  pub env_name: String,
  pub app_name: String,
  pub service_name: String,
  /// Source repository; services without one get no CI trigger
  pub git_repo_url: Option<String>,
  /// Webhook secret for the source repository, generated when absent
  pub webhook_secret: Option<String>,
  pub config: BuildConfig,
}

#[derive(Debug)]
pub struct AddServiceResult {
  pub manifest: Manifest,
  pub resources: Resources,
  pub written: Vec<PathBuf>,
  /// Name of the webhook secret, when its value was generated
  pub generated_secret: Option<String>,
}

/// Add a service to `pipelines.yaml` and regenerate the tree.
///
/// The service is appended to the environment and referenced from the
/// application, which is created when missing. A service with a source
/// repository gets a sealed webhook secret in the pipelines namespace.
pub fn add_service(options: &AddServiceOptions, sealer: &dyn SecretSealer) -> Result<AddServiceResult, ServiceError> {
  let mut manifest = parse_folder(&options.pipelines_folder)?;

  let source_url = options
    .git_repo_url
    .as_deref()
    .filter(|u| !u.is_empty())
    .map(add_git_suffix);
  let webhook = match (&source_url, manifest.pipelines_config()) {
    (Some(_), Some(pipelines)) => Some(Webhook {
      secret: service_webhook_secret(pipelines, &options.env_name, &options.service_name),
    }),
    _ => None,
  };

  let service = Service {
    name: options.service_name.clone(),
    webhook: webhook.clone(),
    source_url,
    pipelines: None,
  };
  manifest.add_service(&options.env_name, &options.app_name, service)?;

  let mut secrets = Resources::new();
  let mut generated_secret = None;
  if let (Some(webhook), Some(pipelines)) = (webhook, manifest.pipelines_config()) {
    let (value, generated) = webhook_secret(options.webhook_secret.as_deref());
    if generated {
      generated_secret = Some(webhook.secret.name.clone());
    }
    let sealed = create_sealed_secret(sealer, &webhook.secret, &value, WEBHOOK_SECRET_KEY)?;
    let path = join(&[&path_for_pipelines(pipelines), "base", &secret_path(&webhook.secret.name)]);
    secrets.insert(path, &sealed)?;
  }

  let lister = DiskLister::new(&options.pipelines_folder);
  let built = build_resources(&manifest, &lister, &options.config)?;

  let mut resources = merge(&built, &secrets);
  resources.insert(PIPELINES_FILE, &manifest)?;
  index_pipelines(&manifest, &mut resources, &lister)?;

  let written = write_resources(&options.pipelines_folder, &resources)?;
  info!(
    env = %options.env_name,
    app = %options.app_name,
    service = %options.service_name,
    files = written.len(),
    "added service"
  );

  Ok(AddServiceResult {
    manifest,
    resources,
    written,
    generated_secret,
  })
}
