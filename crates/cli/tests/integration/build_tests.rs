//! Build command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_writes_environment_tree() {
  let env = TestEnv::from_fixture("pipelines.yaml");

  env
    .gitops_cmd()
    .arg("build")
    .arg("--pipelines-folder")
    .arg(env.root())
    .arg("--output")
    .arg(env.root())
    .assert()
    .success()
    .stdout(predicate::str::contains("Build complete"));

  assert_eq!(
    env.kustomization_resources("environments/dev/env/base"),
    vec!["dev-environment.yaml", "dev-rolebinding.yaml"]
  );
  assert_eq!(
    env.kustomization_resources("environments/stage/env/base"),
    vec!["stage-environment.yaml"]
  );

  let app_base = env.read_yaml("environments/dev/apps/app-http-api/base/kustomization.yaml");
  assert_eq!(app_base["bases"][0].as_str(), Some("../../../services/http-api"));

  let argo = env.read_yaml("config/argocd/config/dev-app-http-api-app.yaml");
  assert_eq!(argo["spec"]["source"]["path"].as_str(), Some("environments/dev/apps/app-http-api/base"));
}

#[test]
fn build_event_listener_has_service_trigger() {
  let env = TestEnv::from_fixture("pipelines.yaml");

  env
    .gitops_cmd()
    .arg("build")
    .arg("--pipelines-folder")
    .arg(env.root())
    .arg("--output")
    .arg(env.root())
    .assert()
    .success();

  let el = env.read_yaml("config/cicd/base/08-eventlisteners/cicd-event-listener.yaml");
  let names: Vec<_> = el["spec"]["triggers"]
    .as_sequence()
    .unwrap()
    .iter()
    .filter_map(|t| t["name"].as_str())
    .collect();
  assert_eq!(names, vec!["ci-dryrun-from-pr", "cd-deploy-from-push", "app-ci-build-from-pr-http-api"]);
}

#[test]
fn build_keeps_manual_files_in_kustomization() {
  let env = TestEnv::from_fixture("pipelines.yaml");
  env.write_file("environments/dev/env/base/limits.yaml", "kind: LimitRange\n");

  env
    .gitops_cmd()
    .arg("build")
    .arg("--pipelines-folder")
    .arg(env.root())
    .arg("--output")
    .arg(env.root())
    .assert()
    .success();

  assert!(
    env
      .kustomization_resources("environments/dev/env/base")
      .contains(&"limits.yaml".to_string())
  );
}

#[test]
fn build_is_repeatable() {
  let env = TestEnv::from_fixture("pipelines.yaml");
  let run = || {
    env
      .gitops_cmd()
      .arg("build")
      .arg("--pipelines-folder")
      .arg(env.root())
      .arg("--output")
      .arg(env.root())
      .assert()
      .success();
    env.read_file("config/cicd/base/kustomization.yaml")
  };

  let first = run();
  let second = run();
  assert_eq!(first, second);
}

#[test]
fn build_to_stdout_writes_nothing() {
  let env = TestEnv::from_fixture("pipelines.yaml");

  env
    .gitops_cmd()
    .arg("build")
    .arg("--stdout")
    .arg("--pipelines-folder")
    .arg(env.root())
    .arg("--output")
    .arg(env.root())
    .assert()
    .success()
    .stdout(predicate::str::contains("kind: EventListener"))
    .stdout(predicate::str::contains("---\n"));

  assert!(!env.path("environments").exists());
}

#[test]
fn build_reports_dangling_service_reference() {
  let env = TestEnv::from_fixture("dangling-ref.yaml");

  env
    .gitops_cmd()
    .arg("build")
    .arg("--pipelines-folder")
    .arg(env.root())
    .arg("--output")
    .arg(env.root())
    .assert()
    .failure()
    .stderr(predicate::str::contains("http-api"));

  assert!(!env.path("environments").exists());
}
