use std::sync::Arc;

use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use tracing::{debug, warn};

use crate::error::{Result, SearchError};
use crate::kubernetes::{ClusterApi, LogReader};
use crate::matcher::match_log_lines;
use crate::searcher::DEFAULT_NAMESPACE;
use crate::types::{GrepOutcome, Message, Skipped};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// Lexicographic by message text
    Message,
    /// Pod name, then container name, then line number
    PodAndContainer,
    /// Anything else keeps the order the lines were fetched in
    Fetch,
}

impl SortKey {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "MESSAGE" => SortKey::Message,
            "POD_AND_CONTAINER" => SortKey::PodAndContainer,
            _ => SortKey::Fetch,
        }
    }
}

pub fn sort_messages(messages: &mut [Message], sort: &SortKey) {
    match sort {
        SortKey::Message => messages.sort_by(|a, b| a.text.cmp(&b.text)),
        SortKey::PodAndContainer => messages.sort_by(|a, b| {
            a.pod_name
                .cmp(&b.pod_name)
                .then_with(|| a.container_name.cmp(&b.container_name))
                .then_with(|| a.line_number.cmp(&b.line_number))
        }),
        SortKey::Fetch => {}
    }
}

/// Container names from the pod spec, falling back to the container statuses.
pub fn container_names(pod: &Pod) -> Vec<String> {
    let from_spec: Vec<String> = pod
        .spec
        .as_ref()
        .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default();
    if !from_spec.is_empty() {
        return from_spec;
    }

    pod.status
        .as_ref()
        .and_then(|s| s.container_statuses.as_ref())
        .map(|statuses| statuses.iter().map(|cs| cs.name.clone()).collect())
        .unwrap_or_default()
}

/// Greps container log snapshots of the pods in one or more namespaces.
pub struct LogGrepper {
    cluster: Arc<dyn ClusterApi>,
    reader: Arc<dyn LogReader>,
}

impl LogGrepper {
    pub fn new(cluster: Arc<dyn ClusterApi>, reader: Arc<dyn LogReader>) -> Self {
        Self { cluster, reader }
    }

    pub async fn default_namespace(&self) -> String {
        self.cluster
            .current_namespace()
            .await
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
    }

    /// Messages from pods in `namespace` whose name contains `resource`, sorted by `sort`.
    pub async fn grep(
        &self,
        namespace: &str,
        resource: Option<&str>,
        pattern: &str,
        sort: &SortKey,
    ) -> Result<GrepOutcome> {
        let pods = self.cluster.list_pods(namespace).await?;
        let pods = pods.into_iter().filter(|pod| match resource {
            Some(filter) if !filter.is_empty() => pod.name_any().contains(filter),
            _ => true,
        });

        let mut outcome = GrepOutcome::default();
        for pod in pods {
            let pod_name = pod.name_any();
            let pod_ns = pod.namespace().unwrap_or_else(|| namespace.to_string());
            for container in container_names(&pod) {
                match self.reader.pod_logs(&pod_ns, &pod_name, &container).await {
                    Ok(logs) => outcome
                        .messages
                        .extend(match_log_lines(&logs, pattern, &pod_name, &container)),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        debug!("Skipping logs of {}/{}: {}", pod_name, container, e);
                        outcome.skipped.push(Skipped {
                            namespace: Some(pod_ns.clone()),
                            name: format!("{}/{}", pod_name, container),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        sort_messages(&mut outcome.messages, sort);
        Ok(outcome)
    }

    pub async fn grep_default_namespace(
        &self,
        resource: Option<&str>,
        pattern: &str,
        sort: &SortKey,
    ) -> Result<GrepOutcome> {
        let namespace = self.default_namespace().await;
        self.grep(&namespace, resource, pattern, sort).await
    }

    /// Grep each namespace in turn; an empty list means the default namespace.
    ///
    /// Listing failures are only reported when exactly one explicit namespace
    /// was asked for. Otherwise the namespace is left out of the results.
    /// Results from several namespaces are sorted again as a whole.
    pub async fn grep_namespaces(
        &self,
        namespaces: &[String],
        resource: Option<&str>,
        pattern: &str,
        sort: &SortKey,
    ) -> Result<GrepOutcome> {
        if namespaces.is_empty() {
            return match self.grep_default_namespace(resource, pattern, sort).await {
                Err(e) if !e.is_fatal() => {
                    warn!("Could not search logs in the default namespace: {}", e);
                    Ok(GrepOutcome {
                        messages: Vec::new(),
                        skipped: vec![namespace_skipped(None, &e)],
                    })
                }
                other => other,
            };
        }

        let mut outcome = GrepOutcome::default();
        for ns in namespaces {
            match self.grep(ns, resource, pattern, sort).await {
                Ok(found) => outcome.extend(found),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) if namespaces.len() == 1 => {
                    return Err(SearchError::Cluster(format!(
                        "failed to search logs in namespace \"{}\": {}",
                        ns, e
                    )));
                }
                Err(e) => {
                    warn!("Skipping namespace {}: {}", ns, e);
                    outcome.skipped.push(namespace_skipped(Some(ns), &e));
                }
            }
        }

        if namespaces.len() > 1 {
            sort_messages(&mut outcome.messages, sort);
        }
        Ok(outcome)
    }
}

fn namespace_skipped(namespace: Option<&str>, err: &SearchError) -> Skipped {
    Skipped {
        namespace: namespace.map(str::to_string),
        name: String::new(),
        reason: err.to_string(),
    }
}
