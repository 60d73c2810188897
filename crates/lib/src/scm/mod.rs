//! Source-control providers.
//!
//! A [`Repository`] turns a repository URL into the provider-specific pieces
//! of a webhook trigger: the CEL event filters, the payload bindings and the
//! signature-validating interceptor. Providers are looked up by driver name
//! through a [`RepositoryRegistry`], which callers can extend.
//!
//! # Driver names
//!
//! The driver is derived from the URL host by dropping a `.com` or `.org`
//! suffix: `github.com` maps to `github`, `gitlab.com` to `gitlab`.

mod github;
mod gitlab;

use std::collections::BTreeMap;

use thiserror::Error;
use url::Url;

use crate::consts::WEBHOOK_SECRET_KEY;
use crate::k8s::NamespacedName;
use crate::tekton::{EventInterceptor, EventListenerTrigger, Param, SecretRef, TriggerBinding, WebhookInterceptor};

pub use github::GitHubRepository;
pub use gitlab::GitLabRepository;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScmError {
  #[error("invalid repository URL {url:?}: {source}")]
  InvalidUrl { url: String, source: url::ParseError },

  #[error("unknown Git server: {host}")]
  UnknownGitServer { host: String },

  #[error("unsupported Git host {driver:?} for {url}")]
  UnsupportedHost { url: String, driver: String },

  #[error("unable to determine repo path from: {url}, expected <org>/<name> but found {segments} path segment(s)")]
  InvalidRepoPath { url: String, segments: usize },
}

/// A parsed repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoUrl {
  url: String,
  path: String,
}

impl RepoUrl {
  /// Parse `raw` into its `<org>/<name>` path.
  ///
  /// The URL path must consist of exactly two non-empty segments; a trailing
  /// `.git` on the name is dropped.
  pub fn parse(raw: &str) -> Result<Self, ScmError> {
    let parsed = parse_url(raw)?;
    let mut segments: Vec<&str> = parsed
      .path_segments()
      .map(|s| s.filter(|p| !p.is_empty()).collect())
      .unwrap_or_default();
    if let Some(last) = segments.last_mut() {
      *last = last.strip_suffix(".git").unwrap_or(last);
    }
    segments.retain(|s| !s.is_empty());

    match segments.as_slice() {
      [org, name] => Ok(Self {
        url: raw.to_string(),
        path: format!("{org}/{name}"),
      }),
      _ => Err(ScmError::InvalidRepoPath {
        url: raw.to_string(),
        segments: segments.len(),
      }),
    }
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  /// `<org>/<name>`.
  pub fn path(&self) -> &str {
    &self.path
  }

  /// Repository name without the organisation.
  pub fn name(&self) -> &str {
    self.path.rsplit('/').next().unwrap_or(&self.path)
  }
}

/// Driver name for the host of `raw`.
pub fn driver_name(raw: &str) -> Result<String, ScmError> {
  let parsed = parse_url(raw)?;
  let host = parsed.host_str().unwrap_or_default();
  host
    .strip_suffix(".com")
    .or_else(|| host.strip_suffix(".org"))
    .map(str::to_lowercase)
    .ok_or_else(|| ScmError::UnknownGitServer { host: host.to_string() })
}

fn parse_url(raw: &str) -> Result<Url, ScmError> {
  Url::parse(raw).map_err(|source| ScmError::InvalidUrl {
    url: raw.to_string(),
    source,
  })
}

/// Provider-specific trigger construction.
///
/// Implementors supply the wire constants; trigger assembly is shared.
pub trait Repository: std::fmt::Debug {
  fn repo(&self) -> &RepoUrl;
  fn driver(&self) -> &'static str;
  fn pr_binding_name(&self) -> &'static str;
  fn push_binding_name(&self) -> &'static str;
  fn pr_binding_params(&self) -> Vec<Param>;
  fn push_binding_params(&self) -> Vec<Param>;
  /// CEL filter for change-request events, `%s` standing for the repo path.
  fn ci_filter(&self) -> &'static str;
  /// CEL filter for push events, `%s` standing for the repo path.
  fn cd_filter(&self) -> &'static str;
  /// Provider interceptor validating the webhook signature.
  fn create_interceptor(&self, secret_name: &str, secret_ns: &str) -> EventInterceptor;

  fn url(&self) -> &str {
    self.repo().url()
  }

  fn path(&self) -> &str {
    self.repo().path()
  }

  fn create_pr_binding(&self, ns: &str) -> (TriggerBinding, String) {
    let name = self.pr_binding_name();
    (
      TriggerBinding::new(&NamespacedName::new(ns, name), self.pr_binding_params()),
      name.to_string(),
    )
  }

  fn create_push_binding(&self, ns: &str) -> (TriggerBinding, String) {
    let name = self.push_binding_name();
    (
      TriggerBinding::new(&NamespacedName::new(ns, name), self.push_binding_params()),
      name.to_string(),
    )
  }

  fn create_ci_trigger(
    &self,
    name: &str,
    secret_name: &str,
    secret_ns: &str,
    template: &str,
    bindings: &[String],
  ) -> EventListenerTrigger {
    let interceptors = vec![
      EventInterceptor::cel(self.ci_filter().replacen("%s", self.path(), 1)),
      self.create_interceptor(secret_name, secret_ns),
    ];
    EventListenerTrigger::new(name, interceptors, template, bindings)
  }

  fn create_cd_trigger(
    &self,
    name: &str,
    secret_name: &str,
    secret_ns: &str,
    template: &str,
    bindings: &[String],
  ) -> EventListenerTrigger {
    let interceptors = vec![
      EventInterceptor::cel(self.cd_filter().replacen("%s", self.path(), 1)),
      self.create_interceptor(secret_name, secret_ns),
    ];
    EventListenerTrigger::new(name, interceptors, template, bindings)
  }
}

pub(crate) fn webhook_interceptor(secret_name: &str, secret_ns: &str) -> WebhookInterceptor {
  WebhookInterceptor {
    secret_ref: SecretRef {
      secret_name: secret_name.to_string(),
      secret_key: WEBHOOK_SECRET_KEY.to_string(),
      namespace: secret_ns.to_string(),
    },
  }
}

pub type RepositoryConstructor = fn(RepoUrl) -> Box<dyn Repository>;

/// Maps driver names to repository constructors.
#[derive(Debug, Clone)]
pub struct RepositoryRegistry {
  drivers: BTreeMap<String, RepositoryConstructor>,
}

impl Default for RepositoryRegistry {
  /// GitHub and GitLab.
  fn default() -> Self {
    let mut registry = Self::empty();
    registry.register("github", |repo| Box::new(GitHubRepository::new(repo)));
    registry.register("gitlab", |repo| Box::new(GitLabRepository::new(repo)));
    registry
  }
}

impl RepositoryRegistry {
  pub fn empty() -> Self {
    Self {
      drivers: BTreeMap::new(),
    }
  }

  pub fn register(&mut self, driver: &str, constructor: RepositoryConstructor) {
    self.drivers.insert(driver.to_string(), constructor);
  }

  /// Resolve the provider for `url`.
  pub fn new_repository(&self, url: &str) -> Result<Box<dyn Repository>, ScmError> {
    let driver = driver_name(url)?;
    let constructor = self.drivers.get(&driver).ok_or_else(|| ScmError::UnsupportedHost {
      url: url.to_string(),
      driver: driver.clone(),
    })?;
    Ok(constructor(RepoUrl::parse(url)?))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_repo_path() {
    let repo = RepoUrl::parse("https://github.com/org/repo.git").unwrap();
    assert_eq!(repo.path(), "org/repo");
    assert_eq!(repo.name(), "repo");

    let repo = RepoUrl::parse("http://github.com/foo/bar").unwrap();
    assert_eq!(repo.path(), "foo/bar");
  }

  #[test]
  fn parse_rejects_single_segment() {
    let err = RepoUrl::parse("https://github.com/org").unwrap_err();
    assert_eq!(
      err,
      ScmError::InvalidRepoPath {
        url: "https://github.com/org".into(),
        segments: 1,
      }
    );
  }

  #[test]
  fn parse_rejects_extra_segments() {
    let err = RepoUrl::parse("https://github.com/org/repo/extra").unwrap_err();
    assert!(matches!(err, ScmError::InvalidRepoPath { segments: 3, .. }));
  }

  #[test]
  fn parse_rejects_bare_git_suffix() {
    let err = RepoUrl::parse("https://github.com/org/.git").unwrap_err();
    assert_eq!(
      err,
      ScmError::InvalidRepoPath {
        url: "https://github.com/org/.git".into(),
        segments: 1,
      }
    );
  }

  #[test]
  fn driver_names() {
    assert_eq!(driver_name("https://github.com/org/repo").unwrap(), "github");
    assert_eq!(driver_name("https://githuB.com/org/repo").unwrap(), "github");
    assert_eq!(driver_name("https://gitlab.org/org/repo").unwrap(), "gitlab");
    assert_eq!(
      driver_name("https://example.net/org/repo").unwrap_err(),
      ScmError::UnknownGitServer {
        host: "example.net".into()
      }
    );
  }

  #[test]
  fn registry_resolves_providers() {
    let registry = RepositoryRegistry::default();
    assert_eq!(registry.new_repository("https://github.com/a/b").unwrap().driver(), "github");
    assert_eq!(registry.new_repository("https://gitlab.com/a/b").unwrap().driver(), "gitlab");
  }

  #[test]
  fn registry_reports_unsupported_host() {
    let err = RepositoryRegistry::default()
      .new_repository("https://bitbucket.org/a/b")
      .unwrap_err();
    assert!(matches!(err, ScmError::UnsupportedHost { ref driver, .. } if driver == "bitbucket"));
  }

  #[test]
  fn registry_can_be_extended() {
    let mut registry = RepositoryRegistry::empty();
    assert!(registry.new_repository("https://github.com/a/b").is_err());

    registry.register("example", |repo| Box::new(GitHubRepository::new(repo)));
    let repo = registry.new_repository("https://example.com/a/b.git").unwrap();
    assert_eq!(repo.path(), "a/b");
  }

  #[test]
  fn ci_trigger_substitutes_repo_path() {
    let repo = RepositoryRegistry::default()
      .new_repository("https://github.com/org/repo.git")
      .unwrap();
    let trigger = repo.create_ci_trigger("ci", "secret", "cicd", "tpl", &["b".to_string()]);

    let filter = &trigger.interceptors[0].cel.as_ref().unwrap().filter;
    assert!(filter.ends_with("body.pull_request.head.repo.full_name == 'org/repo'"));
    assert!(!filter.contains("%s"));
    let secret = &trigger.interceptors[1].github.as_ref().unwrap().secret_ref;
    assert_eq!(secret.secret_name, "secret");
    assert_eq!(secret.secret_key, "webhook-secret-key");
    assert_eq!(secret.namespace, "cicd");
  }
}
