//! gitops-lib: composition of GitOps repositories for Tekton and ArgoCD
//!
//! A GitOps repository is described by a [`manifest::Manifest`]
//! (`pipelines.yaml`): environments owning services, and applications
//! grouping services across environments. From it this crate generates:
//! - kustomize bases and overlays for every environment, application and service
//! - the Tekton event listener with a CI trigger per service
//! - ArgoCD applications syncing each application into its environment
//!
//! The [`init`], [`bootstrap`] and [`service`] entry points scaffold and
//! extend a repository; [`build`] regenerates it from its manifest.

pub mod bootstrap;
pub mod build;
pub mod consts;
pub mod fs;
pub mod init;
pub mod k8s;
pub mod manifest;
pub mod output;
pub mod paths;
pub mod resources;
pub mod scm;
pub mod secrets;
pub mod service;
pub mod tekton;
pub mod util;
