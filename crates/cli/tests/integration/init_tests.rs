//! Init command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn init_writes_cicd_namespace() {
  let env = TestEnv::empty();

  env
    .gitops_cmd()
    .args(["init", "--gitops-repo-url", "https://github.com/my-org/gitops"])
    .args(["--gitops-webhook-secret", "s3cret"])
    .arg("--output")
    .arg(env.root())
    .assert()
    .success()
    .stdout(predicate::str::contains("config/cicd/base/kustomization.yaml"));

  let manifest = env.read_yaml("pipelines.yaml");
  assert_eq!(manifest["gitops_url"].as_str(), Some("https://github.com/my-org/gitops.git"));
  assert_eq!(manifest["config"]["pipelines"]["name"].as_str(), Some("cicd"));

  let files = env.kustomization_resources("config/cicd/base");
  for file in &files {
    assert!(env.path(&format!("config/cicd/base/{file}")).is_file(), "{file}");
  }
  assert!(files.contains(&"08-eventlisteners/cicd-event-listener.yaml".to_string()));
  assert!(!env.read_file("config/cicd/base/03-secrets/gitops-webhook-secret.yaml").contains("s3cret"));
}

#[test]
fn init_with_prefix() {
  let env = TestEnv::empty();

  env
    .gitops_cmd()
    .args(["init", "--gitops-repo-url", "https://github.com/my-org/gitops"])
    .args(["--prefix", "tst"])
    .arg("--output")
    .arg(env.root())
    .assert()
    .success();

  let ns = env.read_yaml("config/tst-cicd/base/01-namespaces/cicd-environment.yaml");
  assert_eq!(ns["metadata"]["name"].as_str(), Some("tst-cicd"));
}

#[test]
fn init_warns_about_generated_secret() {
  let env = TestEnv::empty();

  env
    .gitops_cmd()
    .args(["init", "--gitops-repo-url", "https://github.com/my-org/gitops"])
    .arg("--output")
    .arg(env.root())
    .assert()
    .success()
    .stderr(predicate::str::contains("--gitops-webhook-secret"));
}

#[test]
fn init_json_output() {
  let env = TestEnv::empty();

  let output = env
    .gitops_cmd()
    .args(["--format", "json", "init", "--gitops-repo-url", "https://github.com/my-org/gitops"])
    .arg("--output")
    .arg(env.root())
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["generated_webhook_secret"], serde_json::Value::Bool(true));
  assert!(json["files"].as_array().is_some_and(|f| !f.is_empty()));
}

#[test]
fn init_overwrite_replaces_manifest() {
  let env = TestEnv::empty();
  env.write_file("pipelines.yaml", "gitops_url: https://github.com/old/gitops.git\n");

  env
    .gitops_cmd()
    .args(["init", "--gitops-repo-url", "https://github.com/my-org/gitops", "--overwrite"])
    .arg("--output")
    .arg(env.root())
    .assert()
    .success();

  assert!(env.read_file("pipelines.yaml").contains("my-org/gitops.git"));
}

#[test]
fn init_rejects_unknown_git_host() {
  let env = TestEnv::empty();

  env
    .gitops_cmd()
    .args(["init", "--gitops-repo-url", "https://example.net/my-org/gitops"])
    .arg("--output")
    .arg(env.root())
    .assert()
    .failure()
    .stderr(predicate::str::contains("example.net"));
  assert!(!env.path("pipelines.yaml").exists());
}
