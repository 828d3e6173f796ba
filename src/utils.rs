use crossterm::style::Stylize;
use regex::RegexBuilder;

use crate::error::{Result, SearchError};
use crate::types::{Message, Occurrence};

/// Split a comma-separated namespace flag, trimming and dropping blanks and duplicates.
pub fn parse_namespace_list(raw: &str) -> Result<Vec<String>> {
    let mut namespaces: Vec<String> = Vec::new();
    for token in raw.split(',') {
        let ns = token.trim();
        if ns.is_empty() || namespaces.iter().any(|seen| seen == ns) {
            continue;
        }
        namespaces.push(ns.to_string());
    }
    if namespaces.is_empty() {
        return Err(SearchError::Input(
            "invalid namespace list: no valid namespaces provided".to_string(),
        ));
    }
    Ok(namespaces)
}

/// Wrap every case-insensitive match of `pattern` in bold red.
pub fn highlight(line: &str, pattern: &str) -> String {
    if pattern.is_empty() {
        return line.to_string();
    }
    let re = match RegexBuilder::new(&regex::escape(pattern))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re,
        Err(_) => return line.to_string(),
    };

    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for m in re.find_iter(line) {
        out.push_str(&line[last..m.start()]);
        out.push_str(&m.as_str().red().bold().to_string());
        last = m.end();
    }
    out.push_str(&line[last..]);
    out
}

pub fn occurrence_prefix(occurrence: &Occurrence) -> String {
    match &occurrence.namespace {
        Some(ns) => format!("{}/{}[{}]:", ns, occurrence.resource, occurrence.line),
        None => format!("{}[{}]:", occurrence.resource, occurrence.line),
    }
}

pub fn message_prefix(message: &Message) -> String {
    format!(
        "{}/{}[{}]:",
        message.pod_name, message.container_name, message.line_number
    )
}

pub fn print_occurrences(occurrences: &[Occurrence], pattern: &str) {
    if occurrences.is_empty() {
        println!("No occurrences of '{}' found.", pattern);
        return;
    }

    println!(
        "Found {} occurrence(s) of '{}':\n",
        occurrences.len(),
        pattern
    );
    for occurrence in occurrences {
        println!(
            "{} {}",
            occurrence_prefix(occurrence).blue(),
            highlight(&occurrence.content, pattern)
        );
    }
}

pub fn print_messages(messages: &[Message], pattern: &str) {
    if messages.is_empty() {
        println!("No log messages matching '{}' found.", pattern);
        return;
    }

    for message in messages {
        println!(
            "{} {}",
            message_prefix(message).blue(),
            highlight(&message.text, pattern)
        );
    }
}

/// Version, build time and commit, the last two stamped in by the build environment.
pub fn version_info() -> String {
    format!(
        "kgrep version {}\nBuild time: {}\nCommit hash: {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("KGREP_BUILD_TIME").unwrap_or("unknown"),
        option_env!("KGREP_COMMIT_HASH").unwrap_or("unknown"),
    )
}
