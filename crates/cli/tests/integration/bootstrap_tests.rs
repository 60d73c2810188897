//! Bootstrap command integration tests.

use age::x25519::Identity;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use predicates::prelude::*;

use super::common::TestEnv;

fn bootstrap(env: &TestEnv) -> assert_cmd::assert::Assert {
  env
    .gitops_cmd()
    .args(["bootstrap", "--gitops-repo-url", "https://github.com/my-org/gitops"])
    .args(["--app-repo-url", "https://github.com/my-org/http-api"])
    .args(["--app-webhook-secret", "app-secret"])
    .args(["--image-repo", "quay.io/my-org/http-api"])
    .arg("--output")
    .arg(env.root())
    .assert()
}

fn unseal(identity: &Identity, value: &str) -> Vec<u8> {
  age::decrypt(identity, &STANDARD.decode(value).unwrap()).unwrap()
}

#[test]
fn bootstrap_creates_full_tree() {
  let env = TestEnv::empty();

  bootstrap(&env)
    .success()
    .stdout(predicate::str::contains("Bootstrapped GitOps repository"))
    .stdout(predicate::str::contains("dev, stage"));

  let files = env.kustomization_resources("config/cicd/base");
  let mut sorted = files.clone();
  sorted.sort();
  sorted.dedup();
  assert_eq!(files, sorted);
  for file in &files {
    assert!(env.path(&format!("config/cicd/base/{file}")).is_file(), "{file}");
  }

  assert!(env.path("environments/dev/services/http-api/base/config/100-deployment.yaml").is_file());
  assert!(env.path("environments/stage/env/base/stage-environment.yaml").is_file());
  assert!(env.path("config/argocd/config/dev-app-http-api-app.yaml").is_file());
}

#[test]
fn bootstrap_warns_about_generated_secrets() {
  let env = TestEnv::empty();

  env
    .gitops_cmd()
    .args(["bootstrap", "--gitops-repo-url", "https://github.com/my-org/gitops"])
    .args(["--app-repo-url", "https://github.com/my-org/http-api"])
    .args(["--image-repo", "quay.io/my-org/http-api"])
    .arg("--output")
    .arg(env.root())
    .assert()
    .success()
    .stderr(predicate::str::contains("gitops-webhook-secret, webhook-secret-dev-http-api"))
    .stderr(predicate::str::contains("--app-webhook-secret"));
}

#[test]
fn bootstrap_with_supplied_secrets_does_not_warn() {
  let env = TestEnv::empty();

  env
    .gitops_cmd()
    .args(["bootstrap", "--gitops-repo-url", "https://github.com/my-org/gitops"])
    .args(["--gitops-webhook-secret", "gitops-secret"])
    .args(["--app-repo-url", "https://github.com/my-org/http-api"])
    .args(["--app-webhook-secret", "app-secret"])
    .args(["--image-repo", "quay.io/my-org/http-api"])
    .arg("--output")
    .arg(env.root())
    .assert()
    .success()
    .stderr(predicate::str::contains("Generated random").not());
}

#[test]
fn bootstrap_seals_service_secret() {
  let env = TestEnv::empty();

  bootstrap(&env).success();

  let secret = env.read_yaml("config/cicd/base/03-secrets/webhook-secret-dev-http-api.yaml");
  assert_eq!(secret["kind"].as_str(), Some("SealedSecret"));
  let value = secret["spec"]["encryptedData"]["webhook-secret-key"].as_str().unwrap();
  assert_eq!(unseal(&env.identity, value), b"app-secret");
}

#[test]
fn bootstrap_push_binding_params() {
  let env = TestEnv::empty();

  bootstrap(&env).success();

  let binding = env.read_yaml("config/cicd/base/06-bindings/github-push-binding.yaml");
  assert_eq!(binding["apiVersion"].as_str(), Some("triggers.tekton.dev/v1alpha1"));
  let params: Vec<_> = binding["spec"]["params"]
    .as_sequence()
    .unwrap()
    .iter()
    .filter_map(|p| p["name"].as_str())
    .collect();
  assert_eq!(params, vec!["gitref", "gitsha", "gitrepositoryurl"]);
}

#[test]
fn bootstrap_then_build_is_stable() {
  let env = TestEnv::empty();
  bootstrap(&env).success();
  let before = env.read_file("config/cicd/base/kustomization.yaml");

  env
    .gitops_cmd()
    .arg("build")
    .arg("--pipelines-folder")
    .arg(env.root())
    .arg("--output")
    .arg(env.root())
    .assert()
    .success();

  assert_eq!(env.read_file("config/cicd/base/kustomization.yaml"), before);
}

#[test]
fn bootstrap_refuses_existing_tree() {
  let env = TestEnv::empty();
  bootstrap(&env).success();

  bootstrap(&env)
    .failure()
    .stderr(predicate::str::contains("pipelines.yaml in output path already exists"));
}
