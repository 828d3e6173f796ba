use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod, Secret, ServiceAccount};
use kube::api::{DynamicObject, ListParams, LogParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, ResourceExt};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::resolver::CoreKind;
use crate::types::{DiscoveredResource, GroupVersion, ResourceIdentity};

/// Every read the search engines make against a cluster.
///
/// A `None` namespace means "across all namespaces" for namespaced kinds and is
/// required for cluster-scoped kinds.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Namespace of the active context, if one is configured.
    async fn current_namespace(&self) -> Option<String>;

    /// Core `v1` first, then every version of every named group, in server order.
    async fn list_api_groups(&self) -> Result<Vec<GroupVersion>>;

    async fn list_api_resources(
        &self,
        group_version: &GroupVersion,
    ) -> Result<Vec<DiscoveredResource>>;

    async fn list_namespaces(&self) -> Result<Vec<String>>;

    async fn list_objects(
        &self,
        identity: &ResourceIdentity,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>>;

    async fn get_object(
        &self,
        identity: &ResourceIdentity,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>>;
}

/// Source of container log snapshots.
#[async_trait]
pub trait LogReader: Send + Sync {
    async fn pod_logs(&self, namespace: &str, pod_name: &str, container: &str) -> Result<String>;
}

/// Cluster access backed by a kube client.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
    default_namespace: String,
}

impl KubeCluster {
    /// Connect using the active kubeconfig context (or in-cluster config), or a named context.
    pub async fn connect(context: Option<&str>) -> Result<Self> {
        let config = match context {
            Some(ctx) => {
                // Fail early with a clear message when the context doesn't exist
                let kubeconfig = Kubeconfig::read()
                    .map_err(|e| SearchError::ConfigurationUnavailable(e.to_string()))?;
                if !kubeconfig.contexts.iter().any(|c| c.name == ctx) {
                    return Err(SearchError::ConfigurationUnavailable(format!(
                        "context '{}' not found in kubeconfig",
                        ctx
                    )));
                }
                Config::from_kubeconfig(&KubeConfigOptions {
                    context: Some(ctx.to_string()),
                    ..Default::default()
                })
                .await
                .map_err(|e| SearchError::ConfigurationUnavailable(e.to_string()))?
            }
            None => Config::infer()
                .await
                .map_err(|e| SearchError::ConfigurationUnavailable(e.to_string()))?,
        };

        let default_namespace = config.default_namespace.clone();
        let client = Client::try_from(config)?;
        debug!("Connected, default namespace: {}", default_namespace);
        Ok(Self {
            client,
            default_namespace,
        })
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    fn dynamic_api(&self, identity: &ResourceIdentity, namespace: Option<&str>) -> Api<DynamicObject> {
        let ar = identity.api_resource();
        match namespace {
            Some(ns) if identity.namespaced => Api::namespaced_with(self.client.clone(), ns, &ar),
            _ => Api::all_with(self.client.clone(), &ar),
        }
    }

    fn typed_api<K>(&self, namespace: Option<&str>) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }

    async fn list_typed<K>(&self, namespace: Option<&str>) -> Result<Vec<DynamicObject>>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>
            + serde::de::DeserializeOwned
            + Serialize
            + Clone
            + std::fmt::Debug,
        <K as kube::Resource>::DynamicType: Default,
    {
        let api: Api<K> = self.typed_api(namespace);
        let list = api.list(&ListParams::default()).await?;
        list.items.iter().map(to_dynamic).collect()
    }

    async fn get_typed<K>(&self, namespace: Option<&str>, name: &str) -> Result<DynamicObject>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>
            + serde::de::DeserializeOwned
            + Serialize
            + Clone
            + std::fmt::Debug,
        <K as kube::Resource>::DynamicType: Default,
    {
        // A typed get needs a namespace; without one, find the object in the cluster-wide list.
        match namespace {
            Some(ns) => {
                let api: Api<K> = Api::namespaced(self.client.clone(), ns);
                to_dynamic(&api.get(name).await?)
            }
            None => {
                let api: Api<K> = Api::all(self.client.clone());
                let list = api.list(&ListParams::default()).await?;
                let obj = list
                    .items
                    .iter()
                    .find(|o| o.name_any() == name)
                    .ok_or_else(|| SearchError::NotFound(name.to_string()))?;
                to_dynamic(obj)
            }
        }
    }
}

/// Convert a typed object into the structural document the serializer works on.
pub fn to_dynamic<K: Serialize>(obj: &K) -> Result<DynamicObject> {
    let value = serde_json::to_value(obj).map_err(|e| SearchError::Serialization(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| SearchError::Serialization(e.to_string()))
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn current_namespace(&self) -> Option<String> {
        if self.default_namespace.is_empty() {
            None
        } else {
            Some(self.default_namespace.clone())
        }
    }

    async fn list_api_groups(&self) -> Result<Vec<GroupVersion>> {
        let mut out = Vec::new();

        let core = self.client.list_core_api_versions().await?;
        for version in core.versions {
            out.push(GroupVersion {
                group: String::new(),
                version,
            });
        }

        let groups = self.client.list_api_groups().await?;
        for group in groups.groups {
            for v in group.versions {
                out.push(GroupVersion {
                    group: group.name.clone(),
                    version: v.version,
                });
            }
        }
        Ok(out)
    }

    async fn list_api_resources(
        &self,
        group_version: &GroupVersion,
    ) -> Result<Vec<DiscoveredResource>> {
        let list = if group_version.group.is_empty() {
            self.client
                .list_core_api_resources(&group_version.version)
                .await?
        } else {
            self.client
                .list_api_group_resources(&group_version.api_version())
                .await?
        };

        Ok(list
            .resources
            .into_iter()
            .map(|r| DiscoveredResource {
                name: r.name,
                singular_name: r.singular_name,
                kind: r.kind,
                namespaced: r.namespaced,
            })
            .collect())
    }

    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.iter().map(|ns| ns.name_any()).collect())
    }

    async fn list_objects(
        &self,
        identity: &ResourceIdentity,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>> {
        match CoreKind::from_identity(identity) {
            Some(CoreKind::Pod) => self.list_typed::<Pod>(namespace).await,
            Some(CoreKind::ConfigMap) => self.list_typed::<ConfigMap>(namespace).await,
            Some(CoreKind::Secret) => self.list_typed::<Secret>(namespace).await,
            Some(CoreKind::ServiceAccount) => self.list_typed::<ServiceAccount>(namespace).await,
            None => {
                let api = self.dynamic_api(identity, namespace);
                Ok(api.list(&ListParams::default()).await?.items)
            }
        }
    }

    async fn get_object(
        &self,
        identity: &ResourceIdentity,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject> {
        match CoreKind::from_identity(identity) {
            Some(CoreKind::Pod) => self.get_typed::<Pod>(namespace, name).await,
            Some(CoreKind::ConfigMap) => self.get_typed::<ConfigMap>(namespace, name).await,
            Some(CoreKind::Secret) => self.get_typed::<Secret>(namespace, name).await,
            Some(CoreKind::ServiceAccount) => {
                self.get_typed::<ServiceAccount>(namespace, name).await
            }
            None => {
                let api = self.dynamic_api(identity, namespace);
                Ok(api.get(name).await?)
            }
        }
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&ListParams::default()).await?.items)
    }
}

/// Reads a snapshot of a container's log through the pods/log subresource.
#[derive(Clone)]
pub struct PodLogReader {
    client: Client,
}

impl PodLogReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogReader for PodLogReader {
    async fn pod_logs(&self, namespace: &str, pod_name: &str, container: &str) -> Result<String> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let lp = LogParams {
            follow: false,
            container: Some(container.to_string()),
            ..Default::default()
        };
        Ok(api.logs(pod_name, &lp).await?)
    }
}
