use crate::types::{Message, Occurrence};

fn contains_ignore_case(line: &str, pattern_lower: &str) -> bool {
    line.to_lowercase().contains(pattern_lower)
}

/// Lines of serialized resource text containing `pattern`, ignoring case.
///
/// Lines are split on `\n` exactly, so line numbers line up with the text
/// as rendered. Occurrences are returned without a namespace.
pub fn match_lines(text: &str, pattern: &str, resource: &str) -> Vec<Occurrence> {
    let pattern = pattern.to_lowercase();
    text.split('\n')
        .enumerate()
        .filter(|(_, line)| contains_ignore_case(line, &pattern))
        .map(|(i, line)| Occurrence {
            resource: resource.to_string(),
            namespace: None,
            line: i + 1,
            content: line.to_string(),
        })
        .collect()
}

/// Log lines containing `pattern`, ignoring case. An empty pattern keeps every line.
pub fn match_log_lines(logs: &str, pattern: &str, pod_name: &str, container: &str) -> Vec<Message> {
    let pattern = pattern.to_lowercase();
    logs.lines()
        .enumerate()
        .filter(|(_, line)| pattern.is_empty() || contains_ignore_case(line, &pattern))
        .map(|(i, line)| Message {
            pod_name: pod_name.to_string(),
            container_name: container.to_string(),
            line_number: i + 1,
            text: line.to_string(),
        })
        .collect()
}
