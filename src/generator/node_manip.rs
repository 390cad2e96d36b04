//! Node preprocessing pipeline
//!
//! Stages run in a fixed order: enabled filter, type filter, keyword include,
//! keyword exclude, rename, sort. Each stage borrows its input and returns a
//! new list.

use std::cmp::Ordering;

use log::debug;
use regex::{Regex, RegexBuilder};

use crate::error::{ConvertError, Result};
use crate::models::{ConversionOptions, NodeFilter, ProxyNode, RenameRule, SortKey};
use crate::utils::contains_ignore_case;

/// Drop disabled nodes. Runs regardless of any user supplied filter.
pub fn filter_enabled(nodes: &[ProxyNode]) -> Vec<ProxyNode> {
    nodes.iter().filter(|node| node.enabled).cloned().collect()
}

/// Keep only nodes whose type is listed, or every node when the list is empty.
pub fn filter_types(nodes: &[ProxyNode], filter: &NodeFilter) -> Vec<ProxyNode> {
    if filter.types.is_empty() {
        return nodes.to_vec();
    }
    nodes
        .iter()
        .filter(|node| filter.types.contains(&node.proxy_type()))
        .cloned()
        .collect()
}

fn matches_keyword(node: &ProxyNode, keyword: &str) -> bool {
    !keyword.is_empty()
        && (contains_ignore_case(&node.name, keyword) || contains_ignore_case(&node.server, keyword))
}

/// Keep nodes matching any include keyword. No keywords keeps everything.
pub fn filter_include(nodes: &[ProxyNode], keywords: &[String]) -> Vec<ProxyNode> {
    if keywords.iter().all(|k| k.is_empty()) {
        return nodes.to_vec();
    }
    nodes
        .iter()
        .filter(|node| keywords.iter().any(|k| matches_keyword(node, k)))
        .cloned()
        .collect()
}

/// Drop nodes matching any exclude keyword.
pub fn filter_exclude(nodes: &[ProxyNode], keywords: &[String]) -> Vec<ProxyNode> {
    nodes
        .iter()
        .filter(|node| !keywords.iter().any(|k| matches_keyword(node, k)))
        .cloned()
        .collect()
}

/// Run every filter stage in order.
pub fn filter_nodes(nodes: &[ProxyNode], filter: &NodeFilter) -> Vec<ProxyNode> {
    let enabled = filter_enabled(nodes);
    let typed = filter_types(&enabled, filter);
    let included = filter_include(&typed, &filter.keywords);
    let result = filter_exclude(&included, &filter.exclude_keywords);
    debug!(
        "Filtered nodes: {} input, {} enabled, {} after type filter, {} after keywords",
        nodes.len(),
        enabled.len(),
        typed.len(),
        result.len()
    );
    result
}

fn group_exists(re: &Regex, name: &str) -> bool {
    match name.parse::<usize>() {
        Ok(index) => index < re.captures_len(),
        Err(_) => re.capture_names().flatten().any(|n| n == name),
    }
}

/// Rewrite a rename replacement into `Regex::replace_all` syntax.
///
/// References to groups the pattern really has (`$1`, `$12`, `${1}`, `$name`,
/// `${name}`, `$<name>`, `$&`) are kept. Any other `$` stays literal text
/// instead of expanding to nothing.
fn expand_replacement(re: &Regex, replacement: &str) -> String {
    let chars: Vec<char> = replacement.chars().collect();
    let mut out = String::with_capacity(replacement.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '$' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let rest = &chars[i + 1..];
        match rest.first().copied() {
            Some('$') => {
                out.push_str("$$");
                i += 2;
            }
            Some('&') => {
                out.push_str("${0}");
                i += 2;
            }
            Some(open @ ('{' | '<')) => {
                let close = if open == '{' { '}' } else { '>' };
                let name: Option<String> = rest[1..]
                    .iter()
                    .position(|&c| c == close)
                    .map(|end| rest[1..=end].iter().collect());
                match name {
                    Some(name) if group_exists(re, &name) => {
                        out.push_str(&format!("${{{}}}", name));
                        i += name.chars().count() + 3;
                    }
                    _ => {
                        out.push_str("$$");
                        i += 1;
                    }
                }
            }
            Some(c) if c.is_ascii_digit() => {
                let two: String = rest.iter().take(2).take_while(|c| c.is_ascii_digit()).collect();
                let one: String = two.chars().take(1).collect();
                let group = [two, one]
                    .into_iter()
                    .find(|g| g.parse::<usize>().map_or(false, |n| n > 0) && group_exists(re, g));
                match group {
                    Some(g) => {
                        out.push_str(&format!("${{{}}}", g));
                        i += g.len() + 1;
                    }
                    None => {
                        out.push_str("$$");
                        i += 1;
                    }
                }
            }
            Some(c) if c.is_alphabetic() || c == '_' => {
                let name: String = rest
                    .iter()
                    .take_while(|c| c.is_alphanumeric() || **c == '_')
                    .collect();
                if group_exists(re, &name) {
                    out.push_str(&format!("${{{}}}", name));
                    i += name.chars().count() + 1;
                } else {
                    out.push_str("$$");
                    i += 1;
                }
            }
            _ => {
                out.push_str("$$");
                i += 1;
            }
        }
    }
    out
}

fn compile_rename_rules(rules: &[RenameRule]) -> Result<Vec<(Regex, String)>> {
    rules
        .iter()
        .map(|rule| {
            RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .build()
                .map(|re| {
                    let replacement = expand_replacement(&re, &rule.replacement);
                    (re, replacement)
                })
                .map_err(|source| ConvertError::MalformedRenameRule {
                    pattern: rule.pattern.clone(),
                    source,
                })
        })
        .collect()
}

/// Apply rename rules to node names.
///
/// Rules are applied in order and each one sees the output of the previous
/// rule. Every pattern is compiled up front, so an invalid pattern fails the
/// call before any node is renamed.
pub fn node_rename(nodes: &[ProxyNode], rules: &[RenameRule]) -> Result<Vec<ProxyNode>> {
    let compiled = compile_rename_rules(rules)?;
    if compiled.is_empty() {
        return Ok(nodes.to_vec());
    }

    Ok(nodes
        .iter()
        .map(|node| {
            let mut renamed = node.clone();
            for (re, replacement) in &compiled {
                renamed.name = re.replace_all(&renamed.name, replacement.as_str()).into_owned();
            }
            renamed
        })
        .collect())
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sort nodes by the requested key. Sorting is stable and `None` keeps order.
pub fn sort_nodes(nodes: &[ProxyNode], sort: Option<SortKey>) -> Vec<ProxyNode> {
    let mut sorted = nodes.to_vec();
    match sort {
        Some(SortKey::Name) => sorted.sort_by(|a, b| compare_names(&a.name, &b.name)),
        Some(SortKey::Type) => {
            sorted.sort_by(|a, b| a.proxy_type().as_str().cmp(b.proxy_type().as_str()))
        }
        Some(SortKey::Latency) => {
            debug!("No latency data available, keeping node order");
        }
        None => {}
    }
    sorted
}

/// Preprocesses nodes before conversion
pub fn preprocess_nodes(nodes: &[ProxyNode], options: &ConversionOptions) -> Result<Vec<ProxyNode>> {
    let filtered = filter_nodes(nodes, &options.filter);
    let renamed = node_rename(&filtered, &options.rename)?;
    let sorted = sort_nodes(&renamed, options.sort);
    debug!("Node preprocessing completed for {} nodes", sorted.len());
    Ok(sorted)
}
