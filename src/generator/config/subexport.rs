//! Shared pieces for the format emitters

use log::warn;
use serde::Serialize;

use crate::models::{ProxyNode, ProxyType};

/// A node an emitter left out because the target format cannot express it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedNode {
    pub id: u64,
    pub name: String,
    pub proxy_type: ProxyType,
}

/// Record that `node` was skipped for `target` and keep going.
pub fn skip_node(skipped: &mut Vec<SkippedNode>, node: &ProxyNode, target: &str) {
    warn!(
        "Skipping node '{}' (id {}): {} is not supported by {}",
        node.name,
        node.id,
        node.proxy_type().display_name(),
        target
    );
    skipped.push(SkippedNode {
        id: node.id,
        name: node.name.clone(),
        proxy_type: node.proxy_type(),
    });
}

/// Wrap IPv6 literals in brackets for use in `host:port` strings.
pub fn format_host(server: &str) -> String {
    if server.contains(':') && !server.starts_with('[') {
        format!("[{}]", server)
    } else {
        server.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_host() {
        assert_eq!(format_host("a.com"), "a.com");
        assert_eq!(format_host("1.2.3.4"), "1.2.3.4");
        assert_eq!(format_host("2001:db8::1"), "[2001:db8::1]");
        assert_eq!(format_host("[2001:db8::1]"), "[2001:db8::1]");
    }
}
