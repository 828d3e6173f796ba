use crate::error::SearchError;
use crate::types::{Message, Occurrence};
use crate::utils::{
    highlight, message_prefix, occurrence_prefix, parse_namespace_list, version_info,
};

fn strip_ansi(s: &str) -> String {
    let re = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
    re.replace_all(s, "").into_owned()
}

#[test]
fn test_parse_namespace_list() {
    let result = parse_namespace_list(" a, b ,a,, c").unwrap();
    assert_eq!(result, vec!["a", "b", "c"]);
}

#[test]
fn test_parse_namespace_list_rejects_blank() {
    let err = parse_namespace_list(" , ,").unwrap_err();
    assert!(matches!(err, SearchError::Input(_)));
    assert!(err.to_string().contains("invalid namespace list"));
}

#[test]
fn test_highlight_is_case_insensitive() {
    let out = highlight("Database url, database port", "DATABASE");
    assert_eq!(strip_ansi(&out), "Database url, database port");
}

#[test]
fn test_highlight_escapes_pattern() {
    let out = highlight("a.b and axb", "a.b");
    assert_eq!(strip_ansi(&out), "a.b and axb");
    assert!(out.ends_with(" and axb"));
}

#[test]
fn test_prefixes() {
    let mut occurrence = Occurrence {
        resource: "test-config".to_string(),
        namespace: None,
        line: 7,
        content: String::new(),
    };
    assert_eq!(occurrence_prefix(&occurrence), "test-config[7]:");
    occurrence.namespace = Some("ns1".to_string());
    assert_eq!(occurrence_prefix(&occurrence), "ns1/test-config[7]:");

    let message = Message {
        pod_name: "web-1".to_string(),
        container_name: "nginx".to_string(),
        line_number: 3,
        text: String::new(),
    };
    assert_eq!(message_prefix(&message), "web-1/nginx[3]:");
}

#[test]
fn test_fatal_errors() {
    assert!(SearchError::Unauthorized("x".into()).is_fatal());
    assert!(SearchError::Forbidden("x".into()).is_fatal());
    assert!(SearchError::ConfigurationUnavailable("x".into()).is_fatal());
    assert!(!SearchError::NotFound("x".into()).is_fatal());
    assert!(!SearchError::Cluster("x".into()).is_fatal());
}

#[test]
fn test_config_errors_classified_from_message() {
    let err = SearchError::from_message("couldn't find kubeconfig file".to_string());
    assert!(matches!(err, SearchError::ConfigurationUnavailable(_)));
    assert!(err.to_string().starts_with("no Kubernetes configuration found"));
}

#[test]
fn test_version_info_lists_build_details() {
    let info = version_info();
    let lines: Vec<&str> = info.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], format!("kgrep version {}", env!("CARGO_PKG_VERSION")));
    assert!(lines[1].starts_with("Build time: "));
    assert!(lines[2].starts_with("Commit hash: "));
}
