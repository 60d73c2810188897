//! Resources of the pipelines (CI/CD) namespace.
//!
//! Everything here lands under `config/<prefix>cicd/base/`; the numeric
//! directory prefixes order resources the way they must be applied.

use crate::consts::{
  APP_CI_PIPELINE, APP_CI_TEMPLATE, CD_DEPLOY_PIPELINE, CD_DEPLOY_TEMPLATE, CI_DRYRUN_PIPELINE, CI_DRYRUN_TEMPLATE,
  DEPLOY_FROM_SOURCE_TASK, DEPLOY_USING_KUBECTL_TASK, ROUTE_NAME,
};
use crate::k8s::{ClusterRole, NamespacedName, PolicyRule, Route};
use crate::tekton::{
  EventListener, Param, ParamSpec, Pipeline, PipelineRun, PipelineTask, Step, Task, TriggerTemplate,
};

pub const NAMESPACES_PATH: &str = "01-namespaces/cicd-environment.yaml";
pub const ROLES_PATH: &str = "02-rolebindings/pipeline-service-role.yaml";
pub const ROLE_BINDINGS_PATH: &str = "02-rolebindings/pipeline-service-rolebinding.yaml";
pub const SERVICE_ACCOUNT_PATH: &str = "02-rolebindings/pipeline-service-account.yaml";
pub const GITOPS_SECRET_PATH: &str = "03-secrets/gitops-webhook-secret.yaml";
pub const DOCKER_CONFIG_PATH: &str = "03-secrets/docker-config.yaml";
pub const DEPLOY_FROM_SOURCE_TASK_PATH: &str = "04-tasks/deploy-from-source-task.yaml";
pub const DEPLOY_USING_KUBECTL_TASK_PATH: &str = "04-tasks/deploy-using-kubectl-task.yaml";
pub const CI_DRYRUN_PIPELINE_PATH: &str = "05-pipelines/ci-dryrun-from-pr-pipeline.yaml";
pub const CD_DEPLOY_PIPELINE_PATH: &str = "05-pipelines/cd-deploy-from-push-pipeline.yaml";
pub const APP_CI_PIPELINE_PATH: &str = "05-pipelines/app-ci-pipeline.yaml";
pub const CI_DRYRUN_TEMPLATE_PATH: &str = "07-templates/ci-dryrun-from-pr-template.yaml";
pub const CD_DEPLOY_TEMPLATE_PATH: &str = "07-templates/cd-deploy-from-push-template.yaml";
pub const APP_CI_TEMPLATE_PATH: &str = "07-templates/app-ci-template.yaml";
pub const ROUTE_PATH: &str = "09-routes/gitops-webhook-event-listener.yaml";

pub const CLUSTER_ROLE_NAME: &str = "pipelines-clusterrole";
pub const ROLE_BINDING_NAME: &str = "pipelines-service-role-binding";

const KUBECTL_IMAGE: &str = "quay.io/redhat-developer/k8s-kubectl";
const LISTENER_PORT: u16 = 8080;

/// Path of a trigger binding file.
pub fn binding_path(name: &str) -> String {
  format!("06-bindings/{name}.yaml")
}

/// Path of a sealed secret file.
pub fn secret_path(name: &str) -> String {
  format!("03-secrets/{name}.yaml")
}

/// Permissions the pipeline service account needs to apply the GitOps tree.
pub fn cluster_role() -> ClusterRole {
  ClusterRole::new(
    CLUSTER_ROLE_NAME,
    vec![
      PolicyRule::new(&[""], &["namespaces", "services"], &["patch", "get", "create"]),
      PolicyRule::new(
        &["rbac.authorization.k8s.io"],
        &["clusterroles", "roles"],
        &["bind", "patch", "get"],
      ),
      PolicyRule::new(
        &["rbac.authorization.k8s.io"],
        &["clusterrolebindings", "rolebindings"],
        &["get", "create", "patch"],
      ),
      PolicyRule::new(&["bitnami.com"], &["sealedsecrets"], &["get", "patch", "create"]),
      PolicyRule::new(&["apps"], &["deployments"], &["get", "create", "patch"]),
      PolicyRule::new(&["argoproj.io"], &["applications", "argocds"], &["get", "create", "patch"]),
    ],
  )
}

fn source_params() -> Vec<ParamSpec> {
  vec![
    ParamSpec::string("REPO_URL", "Repository to clone"),
    ParamSpec::string("COMMIT_SHA", "Commit to check out"),
  ]
}

fn clone_script() -> &'static str {
  "git clone $(params.REPO_URL) /workspace/source\ncd /workspace/source\ngit checkout $(params.COMMIT_SHA)\n"
}

/// Apply a kustomization from the GitOps repository, optionally as a dry run.
pub fn deploy_from_source_task(ns: &str) -> Task {
  let mut params = source_params();
  params.push(ParamSpec::string("PATHTOCONTEXT", "Path of the kustomization to apply").with_default("."));
  params.push(ParamSpec::string("DRYRUN", "Dry-run strategy passed to kubectl").with_default("none"));

  Task::new(
    &NamespacedName::new(ns, DEPLOY_FROM_SOURCE_TASK),
    params,
    vec![Step {
      name: "apply-source".to_string(),
      image: KUBECTL_IMAGE.to_string(),
      script: format!(
        "{}kubectl apply --dry-run=$(params.DRYRUN) -k $(params.PATHTOCONTEXT)\n",
        clone_script()
      ),
    }],
  )
}

/// Apply an application's manifests with an updated image.
pub fn deploy_using_kubectl_task(ns: &str) -> Task {
  let mut params = source_params();
  params.push(ParamSpec::string("PATHTODEPLOYMENT", "Path of the manifests to deploy").with_default("deploy"));
  params.push(ParamSpec::string("NAMESPACE", "Namespace to deploy into"));
  params.push(ParamSpec::string("IMAGE", "Image to deploy").with_default(""));
  params.push(ParamSpec::string("DRYRUN", "Dry-run strategy passed to kubectl").with_default("none"));

  Task::new(
    &NamespacedName::new(ns, DEPLOY_USING_KUBECTL_TASK),
    params,
    vec![Step {
      name: "deploy".to_string(),
      image: KUBECTL_IMAGE.to_string(),
      script: format!(
        "{}kubectl apply --dry-run=$(params.DRYRUN) -n $(params.NAMESPACE) -k $(params.PATHTODEPLOYMENT)\n",
        clone_script()
      ),
    }],
  )
}

fn source_task(name: &str, task: &str, dry_run: &str) -> PipelineTask {
  PipelineTask::new(
    name,
    task,
    vec![
      Param::new("REPO_URL", "$(params.REPO_URL)"),
      Param::new("COMMIT_SHA", "$(params.COMMIT_SHA)"),
      Param::new("DRYRUN", dry_run),
    ],
  )
}

pub fn ci_dryrun_pipeline(ns: &str) -> Pipeline {
  Pipeline::new(
    &NamespacedName::new(ns, CI_DRYRUN_PIPELINE),
    source_params(),
    vec![source_task("apply-source", DEPLOY_FROM_SOURCE_TASK, "server")],
  )
}

pub fn cd_deploy_pipeline(ns: &str) -> Pipeline {
  Pipeline::new(
    &NamespacedName::new(ns, CD_DEPLOY_PIPELINE),
    source_params(),
    vec![source_task("apply-source", DEPLOY_FROM_SOURCE_TASK, "none")],
  )
}

pub fn app_ci_pipeline(ns: &str) -> Pipeline {
  let mut params = source_params();
  params.push(ParamSpec::string("IMAGE", "Image repository of the service").with_default(""));
  let mut task = source_task("dryrun-deploy", DEPLOY_USING_KUBECTL_TASK, "server");
  task.params.push(Param::new("IMAGE", "$(params.IMAGE)"));
  task.params.push(Param::new("NAMESPACE", ns));

  Pipeline::new(&NamespacedName::new(ns, APP_CI_PIPELINE), params, vec![task])
}

fn template_params() -> Vec<ParamSpec> {
  vec![
    ParamSpec::string("gitref", "The git branch or tag"),
    ParamSpec::string("gitsha", "The specific commit SHA"),
    ParamSpec::string("gitrepositoryurl", "The git repository URL"),
    ParamSpec::string("fullname", "The repository path").with_default(""),
  ]
}

fn run_params() -> Vec<Param> {
  vec![
    Param::new("REPO_URL", "$(tt.params.gitrepositoryurl)"),
    Param::new("COMMIT_SHA", "$(tt.params.gitsha)"),
  ]
}

fn template(ns: &str, name: &str, pipeline: &str, sa: &str) -> TriggerTemplate {
  TriggerTemplate::new(
    &NamespacedName::new(ns, name),
    template_params(),
    PipelineRun::new(pipeline, sa, run_params()),
  )
}

pub fn ci_dryrun_template(ns: &str, sa: &str) -> TriggerTemplate {
  template(ns, CI_DRYRUN_TEMPLATE, CI_DRYRUN_PIPELINE, sa)
}

pub fn cd_deploy_template(ns: &str, sa: &str) -> TriggerTemplate {
  template(ns, CD_DEPLOY_TEMPLATE, CD_DEPLOY_PIPELINE, sa)
}

/// Template used by service CI triggers; `imageRepo` comes from the
/// per-service binding written by bootstrap.
pub fn app_ci_template(ns: &str, sa: &str) -> TriggerTemplate {
  let mut t = template(ns, APP_CI_TEMPLATE, APP_CI_PIPELINE, sa);
  t.spec
    .params
    .push(ParamSpec::string("imageRepo", "Image repository of the service").with_default(""));
  if let Some(run) = t.spec.resourcetemplates.first_mut() {
    run.spec.params.push(Param::new("IMAGE", "$(tt.params.imageRepo)"));
  }
  t
}

/// Route exposing the event listener to webhook deliveries.
pub fn listener_route(ns: &str, listener: &EventListener) -> Route {
  Route::new(&NamespacedName::new(ns, ROUTE_NAME), &listener.service_name(), LISTENER_PORT)
}
