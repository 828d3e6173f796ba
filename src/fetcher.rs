use kube::ResourceExt;
use kube::api::DynamicObject;
use tracing::{debug, warn};

use crate::error::{Result, SearchError};
use crate::kubernetes::ClusterApi;
use crate::types::{ResourceIdentity, Skipped};

/// Object names listed from one place; `namespace` is `None` for cluster-wide listings.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Listing {
    pub namespace: Option<String>,
    pub names: Vec<String>,
}

/// Object names of one kind, tagged with the namespace they were listed from.
#[derive(Debug, Default)]
pub struct NamespacedNames {
    pub names: Vec<(Option<String>, String)>,
    pub skipped: Vec<Skipped>,
}

pub struct ResourceFetcher<'a> {
    cluster: &'a dyn ClusterApi,
}

impl<'a> ResourceFetcher<'a> {
    pub fn new(cluster: &'a dyn ClusterApi) -> Self {
        Self { cluster }
    }

    /// Names of the objects in `namespace`, or across all namespaces when `None`.
    ///
    /// A namespaced listing that comes back 404 is retried once cluster-wide,
    /// which is what a cluster-scoped kind addressed with a namespace needs.
    /// The returned listing records where the names actually came from.
    pub async fn list_names(
        &self,
        identity: &ResourceIdentity,
        namespace: Option<&str>,
    ) -> Result<Listing> {
        let namespace = scoped(identity, namespace);
        let (objects, listed_in) = match self.cluster.list_objects(identity, namespace).await {
            Ok(objects) => (objects, namespace),
            Err(SearchError::NotFound(msg)) if namespace.is_some() => {
                debug!(
                    "Listing {} in {:?} returned not found ({}), retrying cluster-wide",
                    identity.plural, namespace, msg
                );
                (self.cluster.list_objects(identity, None).await?, None)
            }
            Err(e) => return Err(e),
        };
        Ok(Listing {
            namespace: listed_in.map(str::to_string),
            names: objects.iter().map(|o| o.name_any()).collect(),
        })
    }

    /// Names in every visible namespace, in namespace order then list order.
    ///
    /// A namespace whose objects can't be listed is skipped. Cluster-scoped
    /// kinds are listed once, untagged, including ones that only reveal it by
    /// answering 404 for the first namespace.
    pub async fn list_all_namespaces(&self, identity: &ResourceIdentity) -> Result<NamespacedNames> {
        let mut out = NamespacedNames::default();

        if !identity.namespaced {
            let objects = self.cluster.list_objects(identity, None).await?;
            out.names = objects.iter().map(|o| (None, o.name_any())).collect();
            return Ok(out);
        }

        let namespaces = self.cluster.list_namespaces().await?;
        for (i, ns) in namespaces.into_iter().enumerate() {
            match self.cluster.list_objects(identity, Some(&ns)).await {
                Ok(objects) => {
                    out.names
                        .extend(objects.iter().map(|o| (Some(ns.clone()), o.name_any())));
                }
                Err(e) if e.is_fatal() => return Err(e),
                // Kind isn't served per namespace; list it once cluster-wide instead
                Err(SearchError::NotFound(msg)) if i == 0 => {
                    debug!(
                        "Listing {} in {} returned not found ({}), listing cluster-wide once",
                        identity.plural, ns, msg
                    );
                    let objects = self.cluster.list_objects(identity, None).await?;
                    out.names = objects.iter().map(|o| (None, o.name_any())).collect();
                    return Ok(out);
                }
                Err(e) => {
                    warn!("Skipping namespace {}: {}", ns, e);
                    out.skipped.push(Skipped {
                        namespace: Some(ns),
                        name: String::new(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(out)
    }

    pub async fn get(
        &self,
        identity: &ResourceIdentity,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject> {
        self.cluster
            .get_object(identity, scoped(identity, namespace), name)
            .await
    }
}

/// Cluster-scoped kinds ignore the namespace they are asked about.
fn scoped<'n>(identity: &ResourceIdentity, namespace: Option<&'n str>) -> Option<&'n str> {
    if identity.namespaced { namespace } else { None }
}
