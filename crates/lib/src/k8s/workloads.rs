use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{NamespacedName, ObjectMeta, TypeMeta};

const APP_LABEL: &str = "app.kubernetes.io/name";
const PART_OF_LABEL: &str = "app.kubernetes.io/part-of";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
}

impl Namespace {
  pub fn new(name: &str) -> Self {
    Self {
      type_meta: TypeMeta::new("Namespace", "v1"),
      metadata: ObjectMeta::cluster(name),
    }
  }
}

/// Reference to a secret from a service account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectReference {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAccount {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub secrets: Vec<ObjectReference>,
}

impl ServiceAccount {
  pub fn new(name: &NamespacedName) -> Self {
    Self {
      type_meta: TypeMeta::new("ServiceAccount", "v1"),
      metadata: name.into(),
      secrets: Vec::new(),
    }
  }

  /// Link a secret (for example registry credentials) to the account.
  pub fn with_secret(mut self, secret: &str) -> Self {
    self.secrets.push(ObjectReference {
      name: secret.to_string(),
    });
    self
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
  pub container_port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
  pub name: String,
  pub image: String,
  pub image_pull_policy: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub ports: Vec<ContainerPort>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
  pub containers: Vec<Container>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodTemplate {
  pub metadata: ObjectMeta,
  pub spec: PodSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
  pub match_labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSpec {
  pub replicas: u32,
  pub selector: LabelSelector,
  pub template: PodTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub spec: DeploymentSpec,
}

impl Deployment {
  /// A single-replica deployment running one container on `port`.
  pub fn new(name: &NamespacedName, part_of: &str, image: &str, port: u16) -> Self {
    let labels = app_labels(&name.name, part_of);
    Self {
      type_meta: TypeMeta::new("Deployment", "apps/v1"),
      metadata: ObjectMeta {
        labels: labels.clone(),
        ..name.into()
      },
      spec: DeploymentSpec {
        replicas: 1,
        selector: LabelSelector {
          match_labels: selector_labels(&name.name),
        },
        template: PodTemplate {
          metadata: ObjectMeta {
            labels,
            ..Default::default()
          },
          spec: PodSpec {
            containers: vec![Container {
              name: name.name.clone(),
              image: image.to_string(),
              image_pull_policy: "Always".to_string(),
              ports: vec![ContainerPort { container_port: port }],
            }],
          },
        },
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
  pub name: String,
  pub port: u16,
  pub target_port: u16,
  pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
  pub ports: Vec<ServicePort>,
  pub selector: BTreeMap<String, String>,
}

/// A Kubernetes `Service` (named to avoid clashing with manifest services).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubeService {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub spec: ServiceSpec,
}

impl KubeService {
  pub fn new(name: &NamespacedName, part_of: &str, port: u16) -> Self {
    Self {
      type_meta: TypeMeta::new("Service", "v1"),
      metadata: ObjectMeta {
        labels: app_labels(&name.name, part_of),
        ..name.into()
      },
      spec: ServiceSpec {
        ports: vec![ServicePort {
          name: "http".to_string(),
          port,
          target_port: port,
          protocol: "TCP".to_string(),
        }],
        selector: selector_labels(&name.name),
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePort {
  pub target_port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteTarget {
  pub kind: String,
  pub name: String,
  pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
  pub port: RoutePort,
  pub to: RouteTarget,
}

/// An OpenShift route exposing a service outside the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
  #[serde(flatten)]
  pub type_meta: TypeMeta,
  pub metadata: ObjectMeta,
  pub spec: RouteSpec,
}

impl Route {
  pub fn new(name: &NamespacedName, service: &str, port: u16) -> Self {
    Self {
      type_meta: TypeMeta::new("Route", "route.openshift.io/v1"),
      metadata: name.into(),
      spec: RouteSpec {
        port: RoutePort { target_port: port },
        to: RouteTarget {
          kind: "Service".to_string(),
          name: service.to_string(),
          weight: 100,
        },
      },
    }
  }
}

fn selector_labels(name: &str) -> BTreeMap<String, String> {
  BTreeMap::from([(APP_LABEL.to_string(), name.to_string())])
}

fn app_labels(name: &str, part_of: &str) -> BTreeMap<String, String> {
  let mut labels = selector_labels(name);
  labels.insert(PART_OF_LABEL.to_string(), part_of.to_string());
  labels
}
