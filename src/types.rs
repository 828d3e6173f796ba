use kube::discovery::ApiResource;
use kube::api::GroupVersionKind;

/// Group/version/kind/plural of one collection of objects, as resolved from a kind token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentity {
    /// API group, empty for the core group
    pub group: String,
    pub version: String,
    /// PascalCase singular kind, e.g. "Pod"
    pub kind: String,
    /// Lowercase plural resource name, e.g. "pods"
    pub plural: String,
    pub namespaced: bool,
}

impl ResourceIdentity {
    pub fn new(group: &str, version: &str, kind: &str, plural: &str, namespaced: bool) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
            plural: plural.to_lowercase(),
            namespaced,
        }
    }

    /// `group/version`, or bare `version` for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural)
    }
}

/// One matching line within one serialized resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub resource: String,
    /// Only set when searching across all namespaces
    pub namespace: Option<String>,
    /// 1-based
    pub line: usize,
    pub content: String,
}

/// One matching line of a container log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub pod_name: String,
    pub container_name: String,
    pub line_number: usize,
    pub text: String,
}

/// Something that was left out of the results because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub namespace: Option<String>,
    /// Object name, `pod/container`, or empty when a whole namespace was skipped
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub occurrences: Vec<Occurrence>,
    pub skipped: Vec<Skipped>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrepOutcome {
    pub messages: Vec<Message>,
    pub skipped: Vec<Skipped>,
}

impl GrepOutcome {
    pub fn extend(&mut self, other: GrepOutcome) {
        self.messages.extend(other.messages);
        self.skipped.extend(other.skipped);
    }
}

/// One (group, version) pair from the discovery catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupVersion {
    pub group: String,
    pub version: String,
}

impl GroupVersion {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

/// The parts of a discovered API resource the kind resolver looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredResource {
    pub name: String,
    pub singular_name: String,
    pub kind: String,
    pub namespaced: bool,
}
