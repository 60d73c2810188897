use super::{RepoUrl, Repository, webhook_interceptor};
use crate::tekton::{EventInterceptor, Param};

const CI_DRYRUN_FILTER: &str = "header.match('X-Gitlab-Event', 'Merge Request Hook') && body.object_kind == 'merge_request' && body.object_attributes.state == 'opened' && body.project.path_with_namespace == '%s' && body.project.default_branch == body.object_attributes.target_branch";

const CD_DEPLOY_FILTER: &str = "header.match('X-Gitlab-Event', 'Push Hook') && body.object_kind == 'push' && body.project.path_with_namespace == '%s' && body.ref.endsWith(body.project.default_branch)";

const PR_BINDING: &str = "gitlab-pr-binding";
const PUSH_BINDING: &str = "gitlab-push-binding";

/// A repository hosted on GitLab.
#[derive(Debug, Clone)]
pub struct GitLabRepository {
  repo: RepoUrl,
}

impl GitLabRepository {
  pub fn new(repo: RepoUrl) -> Self {
    Self { repo }
  }
}

impl Repository for GitLabRepository {
  fn repo(&self) -> &RepoUrl {
    &self.repo
  }

  fn driver(&self) -> &'static str {
    "gitlab"
  }

  fn pr_binding_name(&self) -> &'static str {
    PR_BINDING
  }

  fn push_binding_name(&self) -> &'static str {
    PUSH_BINDING
  }

  fn pr_binding_params(&self) -> Vec<Param> {
    vec![
      Param::new("gitref", "$(body.object_attributes.source_branch)"),
      Param::new("gitsha", "$(body.object_attributes.last_commit.id)"),
      Param::new("gitrepositoryurl", "$(body.project.git_http_url)"),
      Param::new("fullname", "$(body.project.path_with_namespace)"),
    ]
  }

  // Push hooks carry no object_attributes; the ref and commit are top-level.
  fn push_binding_params(&self) -> Vec<Param> {
    vec![
      Param::new("gitref", "$(body.ref)"),
      Param::new("gitsha", "$(body.checkout_sha)"),
      Param::new("gitrepositoryurl", "$(body.project.git_http_url)"),
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
      gitlab: Some(webhook_interceptor(secret_name, secret_ns)),
      ..Default::default()
    }
  }
}
