//! Bootstrap a GitOps repository together with its first service.
//!
//! On top of everything `init` writes, bootstrap creates `dev` and `stage`
//! environments, an application deploying the service into `dev`, the
//! service's sealed webhook secret and image binding, and a starter
//! deployment. The regular build then runs over the resulting manifest.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::build::{BuildConfig, BuildError, build_resources, index_pipelines};
use crate::consts::{
  APP_CI_TEMPLATE, BOOTSTRAP_IMAGE, GITOPS_WEBHOOK_SECRET, KUSTOMIZATION_FILE, PIPELINES_FILE, WEBHOOK_SECRET_KEY,
};
use crate::fs::DiskLister;
use crate::init::cicd::{binding_path, secret_path};
use crate::init::{InitError, InitOptions, add_git_suffix, check_pipelines_file, create_initial_files, webhook_secret};
use crate::k8s::{Deployment, KubeService, NamespacedName};
use crate::manifest::{
  Application, ArgoCDConfig, Environment, EnvironmentRef, Manifest, Pipelines, Service, Webhook,
};
use crate::output::{OutputError, write_resources};
use crate::paths::{join, path_for_pipelines, path_for_service};
use crate::resources::{Kustomization, ResourceError, Resources, merge};
use crate::scm::{Repository, ScmError};
use crate::secrets::{SecretError, SecretSealer, create_sealed_secret};
use crate::tekton::{Param, TriggerBinding};

const SERVICE_PORT: u16 = 8080;
const DEPLOYMENT_FILE: &str = "100-deployment.yaml";
const SERVICE_FILE: &str = "200-service.yaml";

#[derive(Debug, Error)]
pub enum BootstrapError {
  #[error(transparent)]
  Init(#[from] InitError),

  #[error("invalid application repository URL: {0}")]
  AppRepository(#[source] ScmError),

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
pub struct BootstrapOptions {
  pub init: InitOptions,
  /// Source repository of the first service; `.git` is appended when missing
  pub app_repo_url: String,
  /// Webhook secret of the service repository, generated when absent
  pub app_webhook_secret: Option<String>,
  /// Image repository the service's CI pushes to
  pub image_repo: String,
}

#[derive(Debug)]
pub struct BootstrapResult {
  pub manifest: Manifest,
  pub resources: Resources,
  pub written: Vec<PathBuf>,
  /// Names of the webhook secrets whose values were generated
  pub generated_secrets: Vec<String>,
}

/// Name of the binding carrying a service's image repository.
pub fn image_binding_name(env: &str, app: &str, service: &str) -> String {
  format!("{env}-{app}-{service}-binding")
}

/// Scaffold the repository and wire in one service.
pub fn bootstrap(
  options: &BootstrapOptions,
  sealer: &dyn SecretSealer,
  config: &BuildConfig,
) -> Result<BootstrapResult, BootstrapError> {
  let init = &options.init;
  check_pipelines_file(&init.output_path, init.overwrite)?;

  let app_url = add_git_suffix(&options.app_repo_url);
  let app_repo = config
    .registry
    .new_repository(&app_url)
    .map_err(BootstrapError::AppRepository)?;

  let (gitops_secret, gitops_generated) = webhook_secret(init.gitops_webhook_secret.as_deref());
  let (app_secret, app_generated) = webhook_secret(options.app_webhook_secret.as_deref());

  let (initial, init_files) = create_initial_files(init, &gitops_secret, sealer, &config.registry)?;
  let manifest = bootstrap_manifest(initial, options, app_repo.as_ref());
  let extra = service_resources(&manifest, options, &app_secret, sealer)?;

  let lister = DiskLister::new(&init.output_path);
  let built = build_resources(&manifest, &lister, config)?;

  let mut resources = merge(&built, &merge(&extra, &init_files));
  resources.insert(PIPELINES_FILE, &manifest)?;
  index_pipelines(&manifest, &mut resources, &lister)?;

  let written = write_resources(&init.output_path, &resources)?;
  info!(files = written.len(), "bootstrapped GitOps repository");

  let mut generated_secrets = Vec::new();
  if gitops_generated {
    generated_secrets.push(GITOPS_WEBHOOK_SECRET.to_string());
  }
  if app_generated {
    generated_secrets.extend(
      manifest
        .environments
        .iter()
        .flat_map(|e| &e.services)
        .filter_map(|s| s.webhook.as_ref())
        .map(|w| w.secret.name.clone()),
    );
  }

  Ok(BootstrapResult {
    manifest,
    resources,
    written,
    generated_secrets,
  })
}

fn bootstrap_manifest(mut manifest: Manifest, options: &BootstrapOptions, repo: &dyn Repository) -> Manifest {
  let prefix = options.init.prefix();
  let dev = format!("{prefix}dev");
  let stage = format!("{prefix}stage");
  let service_name = repo.repo().name().to_string();
  let app_name = format!("app-{service_name}");
  let cicd = options.init.cicd_namespace();

  let service = Service {
    name: service_name.clone(),
    webhook: Some(Webhook {
      secret: NamespacedName::new(&cicd, format!("webhook-secret-{dev}-{service_name}")),
    }),
    source_url: Some(repo.url().to_string()),
    pipelines: Some(Pipelines::new(
      "",
      vec![
        repo.push_binding_name().to_string(),
        image_binding_name(&dev, &app_name, &service_name),
      ],
    )),
  };

  manifest.environments = vec![
    Environment {
      name: dev.clone(),
      pipelines: Some(Pipelines::new(APP_CI_TEMPLATE, vec![repo.push_binding_name().to_string()])),
      services: vec![service],
    },
    Environment::new(stage),
  ];
  manifest.apps = vec![Application {
    name: app_name,
    environments: vec![EnvironmentRef {
      name: dev,
      service_refs: vec![service_name],
    }],
    config_repo: None,
  }];
  if let Some(config) = manifest.config.as_mut() {
    config.argocd = Some(ArgoCDConfig::default());
  }
  manifest
}

/// Files for the bootstrapped service that the builders do not produce.
fn service_resources(
  manifest: &Manifest,
  options: &BootstrapOptions,
  secret: &str,
  sealer: &dyn SecretSealer,
) -> Result<Resources, BootstrapError> {
  let mut res = Resources::new();
  let (Some(pipelines), Some(env), Some(app)) = (
    manifest.pipelines_config(),
    manifest.environments.first(),
    manifest.apps.first(),
  ) else {
    return Ok(res);
  };
  let cicd_base = join(&[&path_for_pipelines(pipelines), "base"]);

  for service in &env.services {
    if let Some(webhook) = &service.webhook {
      let sealed = create_sealed_secret(sealer, &webhook.secret, secret, WEBHOOK_SECRET_KEY)?;
      res.insert(join(&[&cicd_base, &secret_path(&webhook.secret.name)]), &sealed)?;
    }

    let binding_name = image_binding_name(&env.name, &app.name, &service.name);
    let binding = TriggerBinding::new(
      &NamespacedName::new(&pipelines.name, &binding_name),
      vec![Param::new("imageRepo", &options.image_repo)],
    );
    res.insert(join(&[&cicd_base, &binding_path(&binding_name)]), &binding)?;

    let config_dir = join(&[&path_for_service(&env.name, &service.name), "base", "config"]);
    let name = NamespacedName::new(&env.name, &service.name);
    res.insert(
      join(&[&config_dir, DEPLOYMENT_FILE]),
      &Deployment::new(&name, &app.name, BOOTSTRAP_IMAGE, SERVICE_PORT),
    )?;
    res.insert(
      join(&[&config_dir, SERVICE_FILE]),
      &KubeService::new(&name, &app.name, SERVICE_PORT),
    )?;
    res.insert(
      join(&[&config_dir, KUSTOMIZATION_FILE]),
      &Kustomization::with_resources([DEPLOYMENT_FILE, SERVICE_FILE]),
    )?;
  }
  Ok(res)
}
