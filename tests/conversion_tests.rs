use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;

use nodesub::models::{
    ConversionOptions, GroupBy, GroupingOptions, NodeFilter, ProxyNode, ProxyType, RenameRule,
    SortKey,
};
use nodesub::{convert_nodes, ConvertError};

fn fleet() -> Vec<ProxyNode> {
    serde_json::from_value(json!([
        {
            "id": 1, "name": "HK-01", "type": "vless", "server": "a.com", "port": 443,
            "enabled": true, "uuid": "u1", "network": "tcp", "security": "none"
        },
        {
            "id": 2, "name": "Zed JP", "type": "vmess", "server": "b.com", "port": 443,
            "uuid": "u2", "alterId": 0, "network": "ws", "tls": true,
            "wsPath": "/ray", "wsHeaders": {"Host": "cdn.b.com"}
        },
        {
            "id": 3, "name": "Alpha SG", "type": "trojan", "server": "c.com", "port": 443,
            "password": "pw", "sni": "c.com"
        },
        {
            "id": 4, "name": "US ss", "type": "ss", "server": "d.com", "port": 8388,
            "method": "aes-256-gcm", "password": "pw"
        },
        {
            "id": 5, "name": "KR socks", "type": "socks5", "server": "e.com", "port": 1080,
            "username": "u", "password": "p"
        },
        {
            "id": 6, "name": "TW hy2", "type": "hy2", "server": "f.com", "port": 443,
            "password": "h", "upMbps": 20, "downMbps": 100
        },
        {
            "id": 7, "name": "HK hy", "type": "hy", "server": "g.com", "port": 443,
            "auth": "secret", "upMbps": 20, "downMbps": 100
        },
        {
            "id": 8, "name": "Disabled", "type": "trojan", "server": "h.com", "port": 443,
            "password": "pw", "enabled": false
        }
    ]))
    .unwrap()
}

fn decode_links(content: &str) -> Vec<String> {
    let bytes = STANDARD.decode(content).unwrap();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn only_ids(nodes: &[ProxyNode], ids: &[u64]) -> Vec<ProxyNode> {
    nodes.iter().filter(|n| ids.contains(&n.id)).cloned().collect()
}

#[cfg(test)]
mod conversion_tests {
    use super::*;

    #[test]
    fn test_single_vless_share_link() {
        let nodes = only_ids(&fleet(), &[1]);
        let result = convert_nodes(&nodes, "v2ray", &ConversionOptions::default()).unwrap();
        assert_eq!(
            decode_links(&result.content),
            vec!["vless://u1@a.com:443?security=none&type=tcp#HK-01"]
        );
        assert_eq!(result.filename, "v2ray.txt");
        assert_eq!(result.content_type, "text/plain");
    }

    #[test]
    fn test_sort_by_name() {
        let options = ConversionOptions {
            sort: Some(SortKey::Name),
            ..Default::default()
        };
        let nodes = only_ids(&fleet(), &[2, 3]);
        let result = convert_nodes(&nodes, "clash", &options).unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(&result.content).unwrap();
        let names: Vec<&str> = doc["proxies"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Alpha SG", "Zed JP"]);
    }

    #[test]
    fn test_sort_two_ss_nodes_by_name() {
        let nodes: Vec<ProxyNode> = serde_json::from_value(json!([
            {"id": 1, "name": "Zed", "type": "ss", "server": "z.com", "port": 8388, "method": "aes-128-gcm", "password": "a"},
            {"id": 2, "name": "Alpha", "type": "ss", "server": "a.com", "port": 8388, "method": "aes-128-gcm", "password": "b"}
        ]))
        .unwrap();
        let options = ConversionOptions {
            sort: Some(SortKey::Name),
            ..Default::default()
        };
        let result = convert_nodes(&nodes, "v2ray", &options).unwrap();
        let fragments: Vec<String> = decode_links(&result.content)
            .iter()
            .map(|l| l.rsplit('#').next().unwrap().to_string())
            .collect();
        assert_eq!(fragments, vec!["Alpha", "Zed"]);
    }

    #[test]
    fn test_unknown_format() {
        let err = convert_nodes(&fleet(), "unknown-format", &ConversionOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_quantumult_x_skips_socks5() {
        let nodes = only_ids(&fleet(), &[3, 5]);
        let result = convert_nodes(&nodes, "quantumult-x", &ConversionOptions::default()).unwrap();
        assert!(!result.content.contains("KR socks"));
        assert!(!result.content.contains("e.com"));
        assert!(result.content.contains("trojan=c.com:443"));
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].proxy_type, ProxyType::Socks5);
    }

    #[test]
    fn test_output_is_deterministic() {
        let options = ConversionOptions {
            grouping: GroupingOptions {
                enabled: true,
                group_by: GroupBy::Type,
            },
            ..Default::default()
        };
        for format in ["v2ray", "v2ray-json", "clash", "shadowrocket", "quantumult-x", "surge"] {
            let first = convert_nodes(&fleet(), format, &options).unwrap();
            let second = convert_nodes(&fleet(), format, &options).unwrap();
            assert_eq!(first.content, second.content, "{} output differs", format);
        }
    }

    #[test]
    fn test_input_is_not_modified() {
        let nodes = fleet();
        let before = nodes.clone();
        let options = ConversionOptions {
            rename: vec![RenameRule {
                pattern: "HK".to_string(),
                replacement: "Hong Kong".to_string(),
            }],
            sort: Some(SortKey::Type),
            ..Default::default()
        };
        convert_nodes(&nodes, "clash", &options).unwrap();
        assert_eq!(nodes, before);
    }

    #[test]
    fn test_disabled_and_type_filter() {
        let mut filter = NodeFilter::default();
        filter.types.insert(ProxyType::Trojan);
        filter.types.insert(ProxyType::Shadowsocks);
        let options = ConversionOptions {
            filter,
            ..Default::default()
        };
        let result = convert_nodes(&fleet(), "clash", &options).unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(&result.content).unwrap();
        let proxies = doc["proxies"].as_sequence().unwrap();
        assert_eq!(proxies.len(), 2);
        for proxy in proxies {
            assert!(matches!(proxy["type"].as_str(), Some("trojan") | Some("ss")));
            assert_ne!(proxy["name"].as_str(), Some("Disabled"));
        }
    }

    #[test]
    fn test_v2ray_links_match_types() {
        let result = convert_nodes(&fleet(), "v2ray", &ConversionOptions::default()).unwrap();
        let links = decode_links(&result.content);
        let schemes: Vec<&str> = links
            .iter()
            .map(|l| l.split("://").next().unwrap())
            .collect();
        assert_eq!(schemes, vec!["vless", "vmess", "trojan", "ss"]);
        assert_eq!(result.skipped.len(), 3);
    }

    #[test]
    fn test_clash_document_validity() {
        let result = convert_nodes(&fleet(), "clash", &ConversionOptions::default()).unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(&result.content).unwrap();
        assert_eq!(doc["proxies"].as_sequence().map(Vec::len), Some(7));
        assert!(doc["proxy-groups"].as_sequence().map(Vec::len).unwrap_or(0) >= 5);
        assert_eq!(doc["proxies"][6]["auth-str"].as_str(), Some("secret"));
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_rename_composition_and_failure() {
        let options = ConversionOptions {
            rename: vec![
                RenameRule {
                    pattern: "alpha".to_string(),
                    replacement: "Beta".to_string(),
                },
                RenameRule {
                    pattern: "beta".to_string(),
                    replacement: "Gamma".to_string(),
                },
            ],
            ..Default::default()
        };
        let nodes = only_ids(&fleet(), &[3]);
        let result = convert_nodes(&nodes, "surge", &options).unwrap();
        assert!(result.content.contains("Gamma SG = trojan, c.com, 443"));

        let broken = ConversionOptions {
            rename: vec![RenameRule {
                pattern: "(".to_string(),
                replacement: String::new(),
            }],
            ..Default::default()
        };
        assert!(matches!(
            convert_nodes(&nodes, "surge", &broken),
            Err(ConvertError::MalformedRenameRule { .. })
        ));
    }

    #[test]
    fn test_v2ray_json_outbounds() {
        let result = convert_nodes(&fleet(), "v2ray-json", &ConversionOptions::default()).unwrap();
        assert_eq!(result.filename, "v2ray.json");
        assert_eq!(result.content_type, "application/json");
        let config: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        let outbounds = config["outbounds"].as_array().unwrap();
        assert_eq!(outbounds.len(), 4 + 2);
        assert_eq!(outbounds[4]["protocol"], "freedom");
        assert_eq!(outbounds[5]["protocol"], "blackhole");
    }
}
