use kube::api::DynamicObject;

use crate::error::{Result, SearchError};

/// Render an object the way `kubectl get -o yaml` would show it.
pub fn to_yaml(obj: &DynamicObject) -> Result<String> {
    serde_yaml::to_string(obj).map_err(|e| SearchError::Serialization(e.to_string()))
}
