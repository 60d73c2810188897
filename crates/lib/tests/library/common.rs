//! Shared fixtures for library tests.

use std::collections::BTreeSet;

use gitops_lib::fs::{FileLister, FsError};
use gitops_lib::manifest::{Manifest, parse_str};

pub const MANIFEST: &str = r#"
gitops_url: https://github.com/my-org/gitops.git
environments:
  - name: stage
  - name: dev
    services:
      - name: http-api
        source_url: https://github.com/my-org/http-api.git
      - name: worker
apps:
  - name: shop
    environments:
      - ref: dev
        serviceRefs: [http-api, worker]
      - ref: stage
config:
  pipelines:
    name: cicd
"#;

pub fn manifest() -> Manifest {
  parse_str(MANIFEST, std::path::Path::new("pipelines.yaml")).unwrap()
}

/// A tree with nothing on disk yet.
pub struct EmptyTree;

impl FileLister for EmptyTree {
  fn list_files(&self, _dir: &str) -> Result<BTreeSet<String>, FsError> {
    Ok(BTreeSet::new())
  }
}
