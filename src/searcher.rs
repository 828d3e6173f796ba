use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SearchError};
use crate::fetcher::ResourceFetcher;
use crate::kubernetes::ClusterApi;
use crate::matcher::match_lines;
use crate::resolver::{KindResolver, ResolutionMode};
use crate::serializer::to_yaml;
use crate::types::{Occurrence, ResourceIdentity, SearchOutcome, Skipped};

pub const DEFAULT_NAMESPACE: &str = "default";

/// Which namespaces a search covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceScope {
    /// The namespace of the active context
    Default,
    Named(String),
    All,
}

impl NamespaceScope {
    /// `--namespace` and `--all-namespaces` are mutually exclusive.
    pub fn from_flags(namespace: Option<&str>, all_namespaces: bool) -> Result<Self> {
        let namespace = namespace.map(str::trim).filter(|ns| !ns.is_empty());
        match (namespace, all_namespaces) {
            (Some(_), true) => Err(SearchError::ConflictingScope),
            (Some(ns), false) => Ok(NamespaceScope::Named(ns.to_string())),
            (None, true) => Ok(NamespaceScope::All),
            (None, false) => Ok(NamespaceScope::Default),
        }
    }
}

/// Greps the YAML of every object of one kind.
///
/// The resource identity is resolved on first use and reused by every later
/// search on the same searcher.
pub struct Searcher {
    cluster: Arc<dyn ClusterApi>,
    mode: ResolutionMode,
    identity: Option<ResourceIdentity>,
}

impl Searcher {
    pub fn new(cluster: Arc<dyn ClusterApi>, mode: ResolutionMode) -> Self {
        Self {
            cluster,
            mode,
            identity: None,
        }
    }

    pub async fn identity(&mut self) -> Result<ResourceIdentity> {
        if let Some(identity) = &self.identity {
            return Ok(identity.clone());
        }
        let identity = KindResolver::new(self.cluster.as_ref())
            .resolve(&self.mode)
            .await?;
        self.identity = Some(identity.clone());
        Ok(identity)
    }

    /// Validate the namespace flags and the pattern, then search.
    ///
    /// Nothing is sent to the cluster when the flags conflict.
    pub async fn search_scoped(
        &mut self,
        namespace: Option<&str>,
        all_namespaces: bool,
        pattern: &str,
    ) -> Result<SearchOutcome> {
        let scope = NamespaceScope::from_flags(namespace, all_namespaces)?;
        self.search_in(&scope, pattern).await
    }

    pub async fn search_in(&mut self, scope: &NamespaceScope, pattern: &str) -> Result<SearchOutcome> {
        match scope {
            NamespaceScope::Default => self.search_default_namespace(pattern).await,
            NamespaceScope::Named(ns) => self.search(ns, pattern).await,
            NamespaceScope::All => self.search_all_namespaces(pattern).await,
        }
    }

    pub async fn search_default_namespace(&mut self, pattern: &str) -> Result<SearchOutcome> {
        check_pattern(pattern)?;
        let namespace = self
            .cluster
            .current_namespace()
            .await
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        self.search(&namespace, pattern).await
    }

    /// Occurrences in one namespace; they carry no namespace tag.
    pub async fn search(&mut self, namespace: &str, pattern: &str) -> Result<SearchOutcome> {
        check_pattern(pattern)?;
        let identity = self.identity().await?;
        let fetcher = ResourceFetcher::new(self.cluster.as_ref());

        let listing = fetcher.list_names(&identity, Some(namespace)).await?;
        debug!(
            "Searching {} {} ({}) in namespace {}",
            listing.names.len(),
            identity.plural,
            identity.api_version(),
            namespace
        );

        let mut outcome = SearchOutcome::default();
        for name in &listing.names {
            self.search_object(
                &fetcher,
                &identity,
                listing.namespace.as_deref(),
                name,
                pattern,
                None,
                &mut outcome,
            )
            .await?;
        }
        Ok(outcome)
    }

    /// Occurrences from every namespace, each tagged with its namespace.
    pub async fn search_all_namespaces(&mut self, pattern: &str) -> Result<SearchOutcome> {
        check_pattern(pattern)?;
        let identity = self.identity().await?;
        let fetcher = ResourceFetcher::new(self.cluster.as_ref());

        let listed = fetcher.list_all_namespaces(&identity).await?;
        let mut outcome = SearchOutcome {
            occurrences: Vec::new(),
            skipped: listed.skipped,
        };
        for (namespace, name) in &listed.names {
            self.search_object(
                &fetcher,
                &identity,
                namespace.as_deref(),
                name,
                pattern,
                namespace.clone(),
                &mut outcome,
            )
            .await?;
        }
        Ok(outcome)
    }

    /// Fetch, serialize and match one object. Only fatal errors escape.
    #[allow(clippy::too_many_arguments)]
    async fn search_object(
        &self,
        fetcher: &ResourceFetcher<'_>,
        identity: &ResourceIdentity,
        namespace: Option<&str>,
        name: &str,
        pattern: &str,
        tag: Option<String>,
        outcome: &mut SearchOutcome,
    ) -> Result<()> {
        let text = fetcher
            .get(identity, namespace, name)
            .await
            .and_then(|obj| to_yaml(&obj));

        match text {
            Ok(text) => {
                outcome
                    .occurrences
                    .extend(match_lines(&text, pattern, name).into_iter().map(|o| Occurrence {
                        namespace: tag.clone(),
                        ..o
                    }));
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                debug!("Skipping {} {}: {}", identity.kind, name, e);
                outcome.skipped.push(Skipped {
                    namespace: namespace.map(str::to_string),
                    name: name.to_string(),
                    reason: e.to_string(),
                });
                Ok(())
            }
        }
    }
}

fn check_pattern(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Err(SearchError::Input("pattern is required".to_string()));
    }
    Ok(())
}
