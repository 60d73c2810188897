//! Names shared across generated resources.
//!
//! Several of these appear in more than one file of the generated tree (the
//! event listener references the bindings and templates that init writes), so
//! they must stay in sync.

/// Name of the manifest file at the root of a GitOps repository.
pub const PIPELINES_FILE: &str = "pipelines.yaml";

/// Name of every kustomization index.
pub const KUSTOMIZATION_FILE: &str = "kustomization.yaml";

/// Service account used by pipelines and the event listener.
pub const PIPELINE_SA: &str = "pipeline";

/// Suffix appended to the user prefix to name the pipelines namespace.
pub const CICD_SUFFIX: &str = "cicd";

/// Default namespace for ArgoCD applications.
pub const ARGOCD_NAMESPACE: &str = "argocd";

/// Secret holding the webhook token for the GitOps repository.
pub const GITOPS_WEBHOOK_SECRET: &str = "gitops-webhook-secret";

/// Key inside every webhook secret.
pub const WEBHOOK_SECRET_KEY: &str = "webhook-secret-key";

/// Length of generated webhook secrets.
pub const WEBHOOK_SECRET_LENGTH: usize = 20;

pub const EVENT_LISTENER_NAME: &str = "cicd-event-listener";
pub const EVENT_LISTENER_PATH: &str = "08-eventlisteners/cicd-event-listener.yaml";

pub const CI_DRYRUN_TRIGGER: &str = "ci-dryrun-from-pr";
pub const CI_DRYRUN_TEMPLATE: &str = "ci-dryrun-from-pr-template";
pub const CI_DRYRUN_PIPELINE: &str = "ci-dryrun-from-pr-pipeline";
pub const CD_DEPLOY_TRIGGER: &str = "cd-deploy-from-push";
pub const CD_DEPLOY_TEMPLATE: &str = "cd-deploy-from-push-template";
pub const CD_DEPLOY_PIPELINE: &str = "cd-deploy-from-push-pipeline";
pub const APP_CI_TEMPLATE: &str = "app-ci-template";
pub const APP_CI_PIPELINE: &str = "app-ci-pipeline";

/// Prefix of the per-service CI trigger name.
pub const APP_CI_TRIGGER_PREFIX: &str = "app-ci-build-from-pr-";

pub const DEPLOY_FROM_SOURCE_TASK: &str = "deploy-from-source-task";
pub const DEPLOY_USING_KUBECTL_TASK: &str = "deploy-using-kubectl-task";

/// Secret holding the registry credentials, linked to the pipeline service account.
pub const DOCKER_SECRET: &str = "regcred";

pub const ROUTE_NAME: &str = "gitops-webhook-event-listener-route";

/// Cluster-local API server address used as the ArgoCD destination.
pub const DEFAULT_SERVER: &str = "https://kubernetes.default.svc";

/// Image deployed for a freshly bootstrapped service.
pub const BOOTSTRAP_IMAGE: &str = "nginxinc/nginx-unprivileged:latest";
