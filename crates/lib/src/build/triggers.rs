//! The CI/CD event listener.
//!
//! Every service with a source repository gets a CI trigger. Once the walk
//! reaches the pipelines environment, the two GitOps repository triggers are
//! added and the whole list is written as one `EventListener`.

use tracing::{debug, info};

use super::{BuildConfig, BuildError};
use crate::consts::{
  APP_CI_TRIGGER_PREFIX, CD_DEPLOY_TEMPLATE, CD_DEPLOY_TRIGGER, CI_DRYRUN_TEMPLATE, CI_DRYRUN_TRIGGER,
  EVENT_LISTENER_NAME, EVENT_LISTENER_PATH, GITOPS_WEBHOOK_SECRET, PIPELINE_SA,
};
use crate::k8s::NamespacedName;
use crate::manifest::{Environment, Manifest, PipelinesConfig, Service, Visitor};
use crate::paths::{join, path_for_pipelines};
use crate::resources::Resources;
use crate::scm::Repository;
use crate::tekton::{EventListener, EventListenerTrigger};

/// Location of the event listener in the generated tree.
pub fn event_listener_path(pipelines: &PipelinesConfig) -> String {
  join(&[&path_for_pipelines(pipelines), "base", EVENT_LISTENER_PATH])
}

/// Default webhook secret of a service that does not declare one.
pub fn service_webhook_secret(pipelines: &PipelinesConfig, env: &str, service: &str) -> NamespacedName {
  NamespacedName::new(&pipelines.name, format!("webhook-secret-{env}-{service}"))
}

/// Dry-run on pull requests and deploy on push for the GitOps repository.
pub fn gitops_triggers(repo: &dyn Repository, ns: &str) -> Vec<EventListenerTrigger> {
  vec![
    repo.create_ci_trigger(
      CI_DRYRUN_TRIGGER,
      GITOPS_WEBHOOK_SECRET,
      ns,
      CI_DRYRUN_TEMPLATE,
      &[repo.pr_binding_name().to_string()],
    ),
    repo.create_cd_trigger(
      CD_DEPLOY_TRIGGER,
      GITOPS_WEBHOOK_SECRET,
      ns,
      CD_DEPLOY_TEMPLATE,
      &[repo.push_binding_name().to_string()],
    ),
  ]
}

pub fn event_listener(ns: &str, triggers: Vec<EventListenerTrigger>) -> EventListener {
  EventListener::new(&NamespacedName::new(ns, EVENT_LISTENER_NAME), PIPELINE_SA, triggers)
}

pub struct TriggerBuilder<'a> {
  manifest: &'a Manifest,
  config: &'a BuildConfig,
  triggers: Vec<EventListenerTrigger>,
  resources: Resources,
}

impl<'a> TriggerBuilder<'a> {
  pub fn new(manifest: &'a Manifest, config: &'a BuildConfig) -> Self {
    Self {
      manifest,
      config,
      triggers: Vec::new(),
      resources: Resources::new(),
    }
  }

  pub fn into_resources(self) -> Resources {
    self.resources
  }

  /// Triggers need both a GitOps repository and a pipelines namespace.
  fn target(&self) -> Option<(&'a str, &'a PipelinesConfig)> {
    self.manifest.gitops_url().zip(self.manifest.pipelines_config())
  }
}

impl Visitor for TriggerBuilder<'_> {
  type Error = BuildError;

  fn service(&mut self, env: &Environment, service: &Service) -> Result<(), BuildError> {
    let Some((_, pipelines)) = self.target() else {
      return Ok(());
    };
    let Some(url) = service.source_url() else {
      return Ok(());
    };

    let repo = self
      .config
      .registry
      .new_repository(url)
      .map_err(|source| BuildError::ServiceRepository {
        service: service.name.clone(),
        source,
      })?;

    let resolved = self
      .config
      .defaults
      .for_repo(repo.as_ref())
      .specialize(env.pipelines.as_ref())
      .specialize(service.pipelines.as_ref());
    let secret = service
      .webhook
      .as_ref()
      .map(|w| w.secret.clone())
      .unwrap_or_else(|| service_webhook_secret(pipelines, &env.name, &service.name));

    let trigger = repo.create_ci_trigger(
      &format!("{APP_CI_TRIGGER_PREFIX}{}", service.name),
      &secret.name,
      &secret.namespace,
      &resolved.integration.template,
      &resolved.integration.bindings,
    );
    debug!(service = %service.name, template = %resolved.integration.template, "added CI trigger");
    self.triggers.push(trigger);
    Ok(())
  }

  fn environment(&mut self, env: &Environment) -> Result<(), BuildError> {
    let Some((gitops_url, pipelines)) = self.target() else {
      debug!("no GitOps URL or pipelines config, skipping event listener");
      return Ok(());
    };
    if !self.manifest.is_pipelines_environment(env) {
      return Ok(());
    }

    let repo = self
      .config
      .registry
      .new_repository(gitops_url)
      .map_err(BuildError::GitOpsRepository)?;

    let mut triggers = gitops_triggers(repo.as_ref(), &pipelines.name);
    triggers.append(&mut self.triggers);

    info!(triggers = triggers.len(), "generated event listener");
    self
      .resources
      .insert(event_listener_path(pipelines), &event_listener(&pipelines.name, triggers))?;
    Ok(())
  }
}
