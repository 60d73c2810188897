//! Traversal order as seen by a visitor outside the crate.

use gitops_lib::manifest::{Application, Environment, ManifestError, Service, Visitor};

use super::common::manifest;

#[derive(Default)]
struct Recorder(Vec<String>);

impl Visitor for Recorder {
  type Error = ManifestError;

  fn service(&mut self, env: &Environment, service: &Service) -> Result<(), ManifestError> {
    self.0.push(format!("service {}/{}", env.name, service.name));
    Ok(())
  }

  fn environment(&mut self, env: &Environment) -> Result<(), ManifestError> {
    self.0.push(format!("env {}", env.name));
    Ok(())
  }

  fn application(&mut self, app: &Application, env: &Environment) -> Result<(), ManifestError> {
    self.0.push(format!("app {}/{}", env.name, app.name));
    Ok(())
  }
}

#[test]
fn walk_visits_in_documented_order() {
  let mut recorder = Recorder::default();
  manifest().walk(&mut recorder).unwrap();

  assert_eq!(
    recorder.0,
    vec![
      "service dev/http-api",
      "service dev/worker",
      "env dev",
      "env stage",
      "env cicd",
      "app dev/shop",
      "app stage/shop",
    ]
  );
}

/// Visitors only implementing one stage see only that stage.
#[test]
fn partial_visitor() {
  struct Apps(usize);

  impl Visitor for Apps {
    type Error = ManifestError;

    fn application(&mut self, _app: &Application, _env: &Environment) -> Result<(), ManifestError> {
      self.0 += 1;
      Ok(())
    }
  }

  let mut apps = Apps(0);
  manifest().walk(&mut apps).unwrap();
  assert_eq!(apps.0, 2);
}
