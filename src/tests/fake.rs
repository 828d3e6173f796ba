use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Container, ContainerStatus, Pod, PodSpec, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use kube::api::DynamicObject;
use serde_json::json;

use crate::error::{Result, SearchError};
use crate::kubernetes::{ClusterApi, LogReader};
use crate::resolver::CoreKind;
use crate::types::{DiscoveredResource, GroupVersion, ResourceIdentity};

struct Stored {
    plural: String,
    namespace: Option<String>,
    object: DynamicObject,
}

/// In-memory cluster that records every call made against it.
#[derive(Default)]
pub struct FakeCluster {
    current_namespace: Option<String>,
    namespaces: Vec<String>,
    catalog: Vec<(GroupVersion, Vec<DiscoveredResource>)>,
    discovery_down: bool,
    broken_group_versions: HashSet<String>,
    objects: Vec<Stored>,
    cluster_scoped: HashSet<String>,
    failing_lists: HashMap<String, bool>,
    failing_gets: HashMap<String, bool>,
    pods: Vec<Pod>,
    failing_pod_lists: HashSet<String>,
    logs: HashMap<(String, String, String), String>,
    calls: Mutex<Vec<String>>,
}

fn failure(fatal: bool, what: &str) -> SearchError {
    if fatal {
        SearchError::Unauthorized(format!("Unauthorized: {}", what))
    } else {
        SearchError::Cluster(format!("boom: {}", what))
    }
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current_namespace(mut self, ns: &str) -> Self {
        self.current_namespace = Some(ns.to_string());
        self
    }

    pub fn with_namespaces(mut self, namespaces: &[&str]) -> Self {
        self.namespaces = namespaces.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_group(mut self, group: &str, version: &str, resources: Vec<DiscoveredResource>) -> Self {
        self.catalog.push((
            GroupVersion {
                group: group.to_string(),
                version: version.to_string(),
            },
            resources,
        ));
        self
    }

    pub fn with_discovery_down(mut self) -> Self {
        self.discovery_down = true;
        self
    }

    pub fn with_broken_group_version(mut self, api_version: &str) -> Self {
        self.broken_group_versions.insert(api_version.to_string());
        self
    }

    pub fn with_object(mut self, plural: &str, namespace: Option<&str>, object: DynamicObject) -> Self {
        self.objects.push(Stored {
            plural: plural.to_string(),
            namespace: namespace.map(str::to_string),
            object,
        });
        self
    }

    pub fn with_config_map(self, namespace: &str, name: &str, data: &[(&str, &str)]) -> Self {
        let mut obj = DynamicObject::new(name, &CoreKind::ConfigMap.identity().api_resource())
            .within(namespace);
        let data: serde_json::Map<String, serde_json::Value> = data
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        obj.data = json!({ "data": data });
        self.with_object("configmaps", Some(namespace), obj)
    }

    /// Objects of this plural only answer cluster-wide requests.
    pub fn with_cluster_scoped(mut self, plural: &str) -> Self {
        self.cluster_scoped.insert(plural.to_string());
        self
    }

    pub fn with_failing_list(mut self, namespace: &str, fatal: bool) -> Self {
        self.failing_lists.insert(namespace.to_string(), fatal);
        self
    }

    pub fn with_failing_get(mut self, name: &str, fatal: bool) -> Self {
        self.failing_gets.insert(name.to_string(), fatal);
        self
    }

    pub fn with_pod(mut self, namespace: &str, name: &str, containers: &[&str]) -> Self {
        self.pods.push(Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: containers
                    .iter()
                    .map(|c| Container {
                        name: c.to_string(),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }),
            ..Default::default()
        });
        self
    }

    /// A pod whose spec lists no containers, only container statuses.
    pub fn with_status_only_pod(mut self, namespace: &str, name: &str, containers: &[&str]) -> Self {
        self.pods.push(Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            spec: Some(PodSpec::default()),
            status: Some(PodStatus {
                container_statuses: Some(
                    containers
                        .iter()
                        .map(|c| ContainerStatus {
                            name: c.to_string(),
                            ..Default::default()
                        })
                        .collect(),
                ),
                ..Default::default()
            }),
        });
        self
    }

    pub fn with_failing_pod_list(mut self, namespace: &str) -> Self {
        self.failing_pod_lists.insert(namespace.to_string());
        self
    }

    pub fn with_logs(mut self, namespace: &str, pod: &str, container: &str, text: &str) -> Self {
        self.logs.insert(
            (namespace.to_string(), pod.to_string(), container.to_string()),
            text.to_string(),
        );
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn current_namespace(&self) -> Option<String> {
        self.record("current_namespace".to_string());
        self.current_namespace.clone()
    }

    async fn list_api_groups(&self) -> Result<Vec<GroupVersion>> {
        self.record("list_api_groups".to_string());
        if self.discovery_down {
            return Err(SearchError::Cluster("connection refused".to_string()));
        }
        Ok(self.catalog.iter().map(|(gv, _)| gv.clone()).collect())
    }

    async fn list_api_resources(
        &self,
        group_version: &GroupVersion,
    ) -> Result<Vec<DiscoveredResource>> {
        let api_version = group_version.api_version();
        self.record(format!("list_api_resources {}", api_version));
        if self.broken_group_versions.contains(&api_version) {
            return Err(SearchError::Cluster("service unavailable".to_string()));
        }
        Ok(self
            .catalog
            .iter()
            .find(|(gv, _)| gv == group_version)
            .map(|(_, resources)| resources.clone())
            .unwrap_or_default())
    }

    async fn list_namespaces(&self) -> Result<Vec<String>> {
        self.record("list_namespaces".to_string());
        Ok(self.namespaces.clone())
    }

    async fn list_objects(
        &self,
        identity: &ResourceIdentity,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>> {
        self.record(format!(
            "list_objects {} {}",
            identity.plural,
            namespace.unwrap_or("*")
        ));
        if let Some(ns) = namespace {
            if let Some(fatal) = self.failing_lists.get(ns) {
                return Err(failure(*fatal, ns));
            }
            if self.cluster_scoped.contains(&identity.plural) {
                return Err(SearchError::NotFound(identity.plural.clone()));
            }
        }
        Ok(self
            .objects
            .iter()
            .filter(|s| s.plural == identity.plural)
            .filter(|s| namespace.is_none() || s.namespace.as_deref() == namespace)
            .map(|s| s.object.clone())
            .collect())
    }

    async fn get_object(
        &self,
        identity: &ResourceIdentity,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject> {
        self.record(format!(
            "get_object {} {} {}",
            identity.plural,
            namespace.unwrap_or("*"),
            name
        ));
        if let Some(fatal) = self.failing_gets.get(name) {
            return Err(failure(*fatal, name));
        }
        if namespace.is_some() && self.cluster_scoped.contains(&identity.plural) {
            return Err(SearchError::NotFound(name.to_string()));
        }
        self.objects
            .iter()
            .filter(|s| s.plural == identity.plural)
            .filter(|s| namespace.is_none() || s.namespace.as_deref() == namespace)
            .find(|s| s.object.name_any() == name)
            .map(|s| s.object.clone())
            .ok_or_else(|| SearchError::NotFound(name.to_string()))
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>> {
        self.record(format!("list_pods {}", namespace));
        if self.failing_pod_lists.contains(namespace) {
            return Err(SearchError::Cluster(format!("cannot list pods in {}", namespace)));
        }
        Ok(self
            .pods
            .iter()
            .filter(|p| p.metadata.namespace.as_deref() == Some(namespace))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LogReader for FakeCluster {
    async fn pod_logs(&self, namespace: &str, pod_name: &str, container: &str) -> Result<String> {
        self.record(format!("pod_logs {} {} {}", namespace, pod_name, container));
        self.logs
            .get(&(
                namespace.to_string(),
                pod_name.to_string(),
                container.to_string(),
            ))
            .cloned()
            .ok_or_else(|| SearchError::NotFound(format!("{}/{}", pod_name, container)))
    }
}

pub fn discovered(kind: &str, plural: &str, singular: &str, namespaced: bool) -> DiscoveredResource {
    DiscoveredResource {
        name: plural.to_string(),
        singular_name: singular.to_string(),
        kind: kind.to_string(),
        namespaced,
    }
}
