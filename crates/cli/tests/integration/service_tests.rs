//! Service command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn service_add_updates_manifest_and_tree() {
  let env = TestEnv::from_fixture("pipelines.yaml");

  env
    .gitops_cmd()
    .args(["service", "add", "--env-name", "stage", "--app-name", "app-worker"])
    .args(["--service-name", "worker", "--git-repo-url", "https://github.com/my-org/worker"])
    .arg("--pipelines-folder")
    .arg(env.root())
    .assert()
    .success()
    .stdout(predicate::str::contains("Added service worker"));

  let manifest = env.read_yaml("pipelines.yaml");
  let stage = &manifest["environments"][1];
  assert_eq!(stage["services"][0]["name"].as_str(), Some("worker"));
  assert_eq!(
    stage["services"][0]["source_url"].as_str(),
    Some("https://github.com/my-org/worker.git")
  );

  assert!(env.path("config/cicd/base/03-secrets/webhook-secret-stage-worker.yaml").is_file());
  assert!(env.path("environments/stage/services/worker/base/kustomization.yaml").is_file());
  assert!(env.path("config/argocd/config/stage-app-worker-app.yaml").is_file());
}

#[test]
fn service_add_warns_about_generated_secret() {
  let env = TestEnv::from_fixture("pipelines.yaml");

  env
    .gitops_cmd()
    .args(["service", "add", "--env-name", "stage", "--app-name", "app-worker"])
    .args(["--service-name", "worker", "--git-repo-url", "https://github.com/my-org/worker"])
    .arg("--pipelines-folder")
    .arg(env.root())
    .assert()
    .success()
    .stderr(predicate::str::contains("webhook-secret-stage-worker"))
    .stderr(predicate::str::contains("--webhook-secret"));
}

#[test]
fn service_add_with_webhook_secret_does_not_warn() {
  let env = TestEnv::from_fixture("pipelines.yaml");

  env
    .gitops_cmd()
    .args(["service", "add", "--env-name", "stage", "--app-name", "app-worker"])
    .args(["--service-name", "worker", "--git-repo-url", "https://github.com/my-org/worker"])
    .args(["--webhook-secret", "chosen"])
    .arg("--pipelines-folder")
    .arg(env.root())
    .assert()
    .success()
    .stderr(predicate::str::contains("Generated a random value").not());
}

#[test]
fn service_add_to_unknown_environment_fails() {
  let env = TestEnv::from_fixture("pipelines.yaml");

  env
    .gitops_cmd()
    .args(["service", "add", "--env-name", "prod", "--app-name", "app-worker"])
    .args(["--service-name", "worker"])
    .arg("--pipelines-folder")
    .arg(env.root())
    .assert()
    .failure()
    .stderr(predicate::str::contains("\"prod\" does not exist"));
}

#[test]
fn service_add_duplicate_fails() {
  let env = TestEnv::from_fixture("pipelines.yaml");

  env
    .gitops_cmd()
    .args(["service", "add", "--env-name", "dev", "--app-name", "app-http-api"])
    .args(["--service-name", "http-api"])
    .arg("--pipelines-folder")
    .arg(env.root())
    .assert()
    .failure()
    .stderr(predicate::str::contains("already exists"));
}
