use crate::error::Result;
use crate::generator::config::formats::single::proxy_to_uri_list;
use crate::generator::config::subexport::SkippedNode;
use crate::models::ProxyNode;
use crate::utils::base64_encode;

/// Convert proxies to a Shadowrocket subscription
///
/// Shadowrocket reads the same share links as V2Ray clients, so this shares
/// the URI construction and only differs in how skips are reported.
pub fn proxy_to_shadowrocket(
    nodes: &[ProxyNode],
    skipped: &mut Vec<SkippedNode>,
) -> Result<String> {
    let links = proxy_to_uri_list(nodes, "shadowrocket", skipped)?;
    Ok(base64_encode(&links.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64_decode;
    use serde_json::json;

    #[test]
    fn test_shadowrocket_matches_uri_list() {
        let nodes: Vec<ProxyNode> = serde_json::from_value(json!([
            {"id": 1, "name": "a", "type": "trojan", "server": "a.com", "port": 443, "password": "x"},
            {"id": 2, "name": "b", "type": "hy2", "server": "b.com", "port": 443, "password": "y"}
        ]))
        .unwrap();
        let mut skipped = Vec::new();
        let content = proxy_to_shadowrocket(&nodes, &mut skipped).unwrap();
        assert_eq!(
            base64_decode(&content, false),
            "trojan://x@a.com:443?security=tls&type=tcp#a"
        );
        assert_eq!(skipped.len(), 1);
    }
}
