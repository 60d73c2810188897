use super::{RepoUrl, Repository, webhook_interceptor};
use crate::tekton::{EventInterceptor, Param};

const CI_DRYRUN_FILTER: &str = "(header.match('X-GitHub-Event', 'pull_request') && body.action == 'opened' || body.action == 'synchronize') && body.pull_request.head.repo.full_name == '%s'";

const CD_DEPLOY_FILTER: &str = "(header.match('X-GitHub-Event', 'push') && body.repository.full_name == '%s') && body.ref.startsWith('refs/heads/master')";

const PR_BINDING: &str = "github-pr-binding";
const PUSH_BINDING: &str = "github-push-binding";

/// A repository hosted on GitHub.
#[derive(Debug, Clone)]
pub struct GitHubRepository {
  repo: RepoUrl,
}

impl GitHubRepository {
  pub fn new(repo: RepoUrl) -> Self {
    Self { repo }
  }
}

impl Repository for GitHubRepository {
  fn repo(&self) -> &RepoUrl {
    &self.repo
  }

  fn driver(&self) -> &'static str {
    "github"
  }

  fn pr_binding_name(&self) -> &'static str {
    PR_BINDING
  }

  fn push_binding_name(&self) -> &'static str {
    PUSH_BINDING
  }

  fn pr_binding_params(&self) -> Vec<Param> {
    vec![
      Param::new("gitref", "$(body.pull_request.head.ref)"),
      Param::new("gitsha", "$(body.pull_request.head.sha)"),
      Param::new("gitrepositoryurl", "$(body.repository.clone_url)"),
      Param::new("fullname", "$(body.repository.full_name)"),
    ]
  }

  fn push_binding_params(&self) -> Vec<Param> {
    vec![
      Param::new("gitref", "$(body.ref)"),
      Param::new("gitsha", "$(body.head_commit.id)"),
      Param::new("gitrepositoryurl", "$(body.repository.clone_url)"),
    ]
  }

  fn ci_filter(&self) -> &'static str {
    CI_DRYRUN_FILTER
  }

  fn cd_filter(&self) -> &'static str {
    CD_DEPLOY_FILTER
  }

  fn create_interceptor(&self, secret_name: &str, secret_ns: &str) -> EventInterceptor {
    EventInterceptor {
      github: Some(webhook_interceptor(secret_name, secret_ns)),
      ..Default::default()
    }
  }
}
