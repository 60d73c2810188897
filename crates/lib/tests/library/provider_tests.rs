//! Registering a source-control provider from outside the crate.

use gitops_lib::build::{BuildConfig, build_resources};
use gitops_lib::manifest::Manifest;
use gitops_lib::scm::{RepoUrl, Repository, RepositoryRegistry, ScmError};
use gitops_lib::tekton::{EventInterceptor, EventListener, Param, SecretRef, WebhookInterceptor};

use super::common::{EmptyTree, manifest};

const EL_PATH: &str = "config/cicd/base/08-eventlisteners/cicd-event-listener.yaml";

#[derive(Debug)]
struct Gitea {
  repo: RepoUrl,
}

impl Repository for Gitea {
  fn repo(&self) -> &RepoUrl {
    &self.repo
  }

  fn driver(&self) -> &'static str {
    "gitea"
  }

  fn pr_binding_name(&self) -> &'static str {
    "gitea-pr-binding"
  }

  fn push_binding_name(&self) -> &'static str {
    "gitea-push-binding"
  }

  fn pr_binding_params(&self) -> Vec<Param> {
    vec![Param::new("gitsha", "$(body.pull_request.head.sha)")]
  }

  fn push_binding_params(&self) -> Vec<Param> {
    vec![Param::new("gitsha", "$(body.after)")]
  }

  fn ci_filter(&self) -> &'static str {
    "body.repository.full_name == '%s'"
  }

  fn cd_filter(&self) -> &'static str {
    "body.repository.full_name == '%s'"
  }

  fn create_interceptor(&self, secret_name: &str, secret_ns: &str) -> EventInterceptor {
    EventInterceptor {
      github: Some(WebhookInterceptor {
        secret_ref: SecretRef {
          secret_name: secret_name.to_string(),
          secret_key: "webhook-secret-key".to_string(),
          namespace: secret_ns.to_string(),
        },
      }),
      ..Default::default()
    }
  }
}

fn gitea_manifest() -> Manifest {
  let mut m = manifest();
  let dev = m.environments.iter_mut().find(|e| e.name == "dev").unwrap();
  dev.services[0].source_url = Some("https://gitea.com/my-org/http-api.git".into());
  m
}

#[test]
fn unregistered_provider_is_rejected() {
  let err = build_resources(&gitea_manifest(), &EmptyTree, &BuildConfig::default()).unwrap_err();
  assert!(err.to_string().contains("http-api"));
}

#[test]
fn registered_provider_drives_service_trigger() {
  let mut registry = RepositoryRegistry::default();
  registry.register("gitea", |repo| Box::new(Gitea { repo }));
  let config = BuildConfig {
    registry,
    ..Default::default()
  };

  let resources = build_resources(&gitea_manifest(), &EmptyTree, &config).unwrap();

  let el: EventListener = resources.get_as(EL_PATH).unwrap();
  let trigger = el
    .spec
    .triggers
    .iter()
    .find(|t| t.name == "app-ci-build-from-pr-http-api")
    .unwrap();
  assert_eq!(trigger.binding_names(), vec!["gitea-push-binding"]);
  assert_eq!(
    trigger.interceptors[0].cel.as_ref().unwrap().filter,
    "body.repository.full_name == 'my-org/http-api'"
  );
}

#[test]
fn repo_url_parsing_is_public() {
  let repo = RepoUrl::parse("https://gitea.com/my-org/http-api.git").unwrap();
  assert_eq!(repo.path(), "my-org/http-api");
  assert!(matches!(
    RepoUrl::parse("https://gitea.com/http-api"),
    Err(ScmError::InvalidRepoPath { segments: 1, .. })
  ));
}
