use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0}")]
    Input(String),

    #[error("--all-namespaces and --namespace cannot be used together")]
    ConflictingScope,

    #[error(
        "no Kubernetes configuration found. Please ensure you have a valid kubeconfig file or that your KUBECONFIG environment variable is set: {0}"
    )]
    ConfigurationUnavailable(String),

    #[error(
        "you are not authorized to access the cluster. Please check if you are logged in and your credentials are valid: {0}"
    )]
    Unauthorized(String),

    #[error("you do not have permission to perform this action in the cluster: {0}")]
    Forbidden(String),

    #[error("could not find API version for kind '{0}'")]
    KindNotFound(String),

    #[error("error getting API groups: {0}")]
    DiscoveryUnavailable(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("error serializing resource: {0}")]
    Serialization(String),

    #[error("{0}")]
    Cluster(String),
}

pub type Result<T, E = SearchError> = std::result::Result<T, E>;

impl SearchError {
    /// Classify an error returned by the kube client.
    pub fn from_kube(err: kube::Error) -> Self {
        match &err {
            kube::Error::Api(resp) => match resp.code {
                401 => SearchError::Unauthorized(err.to_string()),
                403 => SearchError::Forbidden(err.to_string()),
                404 => SearchError::NotFound(resp.message.clone()),
                _ => SearchError::Cluster(err.to_string()),
            },
            kube::Error::InferConfig(_) | kube::Error::Auth(_) => {
                SearchError::ConfigurationUnavailable(err.to_string())
            }
            _ => Self::from_message(err.to_string()),
        }
    }

    /// Fallback classification for errors that only survive as text.
    pub fn from_message(message: String) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("no configuration has been provided")
            || lower.contains("unable to load in-cluster configuration")
            || lower.contains("couldn't find kubeconfig file")
        {
            SearchError::ConfigurationUnavailable(message)
        } else {
            SearchError::Cluster(message)
        }
    }

    /// Errors that no resilience path may swallow.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SearchError::ConfigurationUnavailable(_)
                | SearchError::Unauthorized(_)
                | SearchError::Forbidden(_)
        )
    }
}

impl From<kube::Error> for SearchError {
    fn from(err: kube::Error) -> Self {
        SearchError::from_kube(err)
    }
}
