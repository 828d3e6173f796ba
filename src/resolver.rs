use k8s_openapi::Resource;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret, ServiceAccount};
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::kubernetes::ClusterApi;
use crate::types::ResourceIdentity;

/// The four kinds served by typed clients without any discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreKind {
    Pod,
    ConfigMap,
    Secret,
    ServiceAccount,
}

impl CoreKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "pod" | "pods" => Some(CoreKind::Pod),
            "configmap" | "configmaps" => Some(CoreKind::ConfigMap),
            "secret" | "secrets" => Some(CoreKind::Secret),
            "serviceaccount" | "serviceaccounts" => Some(CoreKind::ServiceAccount),
            _ => None,
        }
    }

    pub fn from_identity(identity: &ResourceIdentity) -> Option<Self> {
        if !identity.group.is_empty() || identity.version != "v1" {
            return None;
        }
        [
            CoreKind::Pod,
            CoreKind::ConfigMap,
            CoreKind::Secret,
            CoreKind::ServiceAccount,
        ]
        .into_iter()
        .find(|k| k.identity().plural == identity.plural)
    }

    pub fn identity(self) -> ResourceIdentity {
        fn of<K: Resource>() -> ResourceIdentity {
            ResourceIdentity::new(K::GROUP, K::VERSION, K::KIND, K::URL_PATH_SEGMENT, true)
        }
        match self {
            CoreKind::Pod => of::<Pod>(),
            CoreKind::ConfigMap => of::<ConfigMap>(),
            CoreKind::Secret => of::<Secret>(),
            CoreKind::ServiceAccount => of::<ServiceAccount>(),
        }
    }
}

/// How a searcher learns which collection it is searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionMode {
    CoreKind(CoreKind),
    ExplicitGroupVersionKind { api_version: String, kind: String },
    AutoDiscover(String),
}

impl ResolutionMode {
    /// Pick the mode for a kind token and an optional `group/version`.
    pub fn new(kind: &str, api_version: Option<&str>) -> Self {
        if let Some(core) = CoreKind::from_token(kind) {
            return ResolutionMode::CoreKind(core);
        }
        match api_version {
            Some(av) if !av.trim().is_empty() => ResolutionMode::ExplicitGroupVersionKind {
                api_version: av.trim().to_string(),
                kind: kind.to_string(),
            },
            _ => ResolutionMode::AutoDiscover(kind.to_string()),
        }
    }
}

/// Maps kind tokens to resource identities, using discovery when needed.
pub struct KindResolver<'a> {
    cluster: &'a dyn ClusterApi,
}

impl<'a> KindResolver<'a> {
    pub fn new(cluster: &'a dyn ClusterApi) -> Self {
        Self { cluster }
    }

    pub async fn resolve(&self, mode: &ResolutionMode) -> Result<ResourceIdentity> {
        match mode {
            ResolutionMode::CoreKind(core) => Ok(core.identity()),
            ResolutionMode::ExplicitGroupVersionKind { api_version, kind } => {
                explicit_identity(api_version, kind)
            }
            ResolutionMode::AutoDiscover(token) => self.resolve_token(token).await,
        }
    }

    /// Core shortcut, then discovery, then the leading segment of a dotted name.
    pub async fn resolve_token(&self, token: &str) -> Result<ResourceIdentity> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SearchError::Input("kind is required".to_string()));
        }

        if let Some(identity) = self.lookup(token).await? {
            return Ok(identity);
        }

        if let Some(head) = dotted_head(token) {
            debug!("Kind '{}' not found, retrying as '{}'", token, head);
            if let Some(identity) = self.lookup(head).await? {
                return Ok(identity);
            }
        }

        Err(SearchError::KindNotFound(token.to_string()))
    }

    async fn lookup(&self, token: &str) -> Result<Option<ResourceIdentity>> {
        if let Some(core) = CoreKind::from_token(token) {
            return Ok(Some(core.identity()));
        }
        self.discover(token).await
    }

    /// First catalog entry whose kind, plural or singular name equals the token.
    async fn discover(&self, token: &str) -> Result<Option<ResourceIdentity>> {
        let groups = self.cluster.list_api_groups().await.map_err(|e| {
            if e.is_fatal() {
                e
            } else {
                SearchError::DiscoveryUnavailable(e.to_string())
            }
        })?;

        for gv in &groups {
            let resources = match self.cluster.list_api_resources(gv).await {
                Ok(resources) => resources,
                Err(e) => {
                    debug!("Skipping {} during discovery: {}", gv.api_version(), e);
                    continue;
                }
            };

            let found = resources.iter().find(|r| {
                !r.name.contains('/')
                    && (r.kind.eq_ignore_ascii_case(token)
                        || r.name.eq_ignore_ascii_case(token)
                        || (!r.singular_name.is_empty()
                            && r.singular_name.eq_ignore_ascii_case(token)))
            });

            if let Some(r) = found {
                debug!(
                    "Resolved kind '{}' to {}/{} ({})",
                    token,
                    gv.api_version(),
                    r.kind,
                    r.name
                );
                return Ok(Some(ResourceIdentity::new(
                    &gv.group,
                    &gv.version,
                    &r.kind,
                    &r.name,
                    r.namespaced,
                )));
            }
        }

        Ok(None)
    }
}

/// Identity from a user-supplied `group/version` (or bare `version`) and kind.
pub fn explicit_identity(api_version: &str, kind: &str) -> Result<ResourceIdentity> {
    let kind = kind.trim();
    if kind.is_empty() {
        return Err(SearchError::Input("kind is required".to_string()));
    }

    let (group, version) = match api_version.trim().split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version.trim()),
    };
    if version.is_empty() {
        return Err(SearchError::Input(format!(
            "invalid API version '{}'",
            api_version
        )));
    }

    let plural = format!("{}s", kind.to_lowercase());
    Ok(ResourceIdentity::new(group, version, kind, &plural, true))
}

/// Leading segment of a dotted kind that doesn't already embed a version.
pub fn dotted_head(token: &str) -> Option<&str> {
    if !token.contains('.') || token.contains(".v") {
        return None;
    }
    token.split('.').next().filter(|head| !head.is_empty())
}
