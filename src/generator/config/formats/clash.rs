use log::debug;

use crate::error::Result;
use crate::generator::config::group::{
    avoid_reserved_name, baseline_groups, group_generate, GroupKind, ProxyGroup,
};
use crate::generator::config::ruleconvert::clash_rules;
use crate::generator::yaml::clash::{
    ClashProxy, ClashProxyGroup, ClashYamlOutput, CommonProxyOptions, GrpcOpts, H2Opts,
    PluginOpts, TransportOpts, WsOpts,
};
use crate::models::{non_empty, GroupingOptions, ProxyConfig, ProxyNode, TransportOptions};
use crate::utils::string::{is_obfs_plugin, is_v2ray_plugin, PluginOptions};

impl From<ProxyGroup> for ClashProxyGroup {
    fn from(group: ProxyGroup) -> Self {
        match group.kind {
            GroupKind::Select => ClashProxyGroup::Select {
                name: group.name,
                proxies: group.proxies,
            },
            GroupKind::UrlTest { url, interval } => ClashProxyGroup::UrlTest {
                name: group.name,
                proxies: group.proxies,
                url: url.to_string(),
                interval,
            },
        }
    }
}

fn transport_opts(network: &str, transport: &TransportOptions) -> TransportOpts {
    match network {
        "ws" => TransportOpts {
            ws_opts: Some(WsOpts {
                path: transport.path_for("ws").unwrap_or("/").to_string(),
                headers: transport.ws_headers.clone(),
            }),
            ..Default::default()
        },
        "h2" => TransportOpts {
            h2_opts: Some(H2Opts {
                host: transport
                    .host_for("h2")
                    .map(|h| h.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
                path: transport.path_for("h2").unwrap_or("/").to_string(),
            }),
            ..Default::default()
        },
        "grpc" => TransportOpts {
            grpc_opts: Some(GrpcOpts {
                grpc_service_name: transport.service_name().unwrap_or_default().to_string(),
            }),
            ..Default::default()
        },
        _ => TransportOpts::default(),
    }
}

fn mbps(value: Option<u32>) -> Option<String> {
    value.map(|v| format!("{} Mbps", v))
}

fn owned(value: &Option<String>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

/// Map a Shadowsocks plugin onto Clash's `plugin` / `plugin-opts` pair.
fn ss_plugin(plugin: &str, opts: Option<&str>) -> (String, Option<PluginOpts>) {
    let parsed = PluginOptions::parse(opts.unwrap_or_default());
    if is_obfs_plugin(plugin) {
        let opts = PluginOpts {
            mode: parsed.obfs.clone().unwrap_or_else(|| "http".to_string()),
            host: parsed.any_host().map(str::to_string),
            ..Default::default()
        };
        ("obfs".to_string(), Some(opts))
    } else if is_v2ray_plugin(plugin) {
        let opts = PluginOpts {
            mode: "websocket".to_string(),
            host: parsed.any_host().map(str::to_string),
            path: parsed.path.clone(),
            tls: parsed.tls.then_some(true),
        };
        ("v2ray-plugin".to_string(), Some(opts))
    } else {
        debug!("Unknown Shadowsocks plugin '{}', passing it through without options", plugin);
        (plugin.to_string(), None)
    }
}

/// Build the Clash proxy entry for a node. Every node type has one.
pub fn proxy_to_clash_proxy(node: &ProxyNode) -> ClashProxy {
    let builder = CommonProxyOptions::builder(node.name.clone(), node.server.clone(), node.port);

    match &node.config {
        ProxyConfig::Vless(cfg) => {
            let network = cfg.network();
            ClashProxy::Vless {
                common: builder
                    .udp(true)
                    .tls(cfg.is_tls())
                    .client_fingerprint(non_empty(&cfg.fingerprint))
                    .build(),
                uuid: cfg.uuid.clone(),
                flow: owned(&cfg.flow),
                network: network.to_string(),
                servername: owned(&cfg.sni),
                alpn: cfg.alpn.clone(),
                transport: transport_opts(network, &cfg.transport),
            }
        }
        ProxyConfig::VMess(cfg) => {
            let network = cfg.network();
            ClashProxy::VMess {
                common: builder.udp(true).tls(cfg.tls).build(),
                uuid: cfg.uuid.clone(),
                alter_id: cfg.alter_id,
                cipher: cfg.security.clone(),
                network: network.to_string(),
                servername: owned(&cfg.sni),
                alpn: cfg.alpn.clone(),
                transport: transport_opts(network, &cfg.transport),
            }
        }
        ProxyConfig::Trojan(cfg) => {
            let network = cfg.network();
            let (network, transport) = match network {
                "ws" | "grpc" => (
                    Some(network.to_string()),
                    transport_opts(network, &cfg.transport),
                ),
                _ => (None, TransportOpts::default()),
            };
            ClashProxy::Trojan {
                common: builder
                    .udp(true)
                    .skip_cert_verify(cfg.allow_insecure)
                    .build(),
                password: cfg.password.clone(),
                sni: owned(&cfg.sni),
                alpn: cfg.alpn.clone(),
                network,
                transport,
            }
        }
        ProxyConfig::Shadowsocks(cfg) => {
            let (plugin, plugin_opts) = match non_empty(&cfg.plugin) {
                Some(plugin) => {
                    let (name, opts) = ss_plugin(plugin, non_empty(&cfg.plugin_opts));
                    (Some(name), opts)
                }
                None => (None, None),
            };
            ClashProxy::Shadowsocks {
                common: builder.udp(true).build(),
                cipher: cfg.method.clone(),
                password: cfg.password.clone(),
                plugin,
                plugin_opts,
            }
        }
        ProxyConfig::Socks5(cfg) => {
            let builder = if cfg.tls { builder.tls(true) } else { builder };
            ClashProxy::Socks5 {
                common: builder.udp(true).build(),
                username: owned(&cfg.username),
                password: owned(&cfg.password),
                sni: owned(&cfg.sni),
            }
        }
        ProxyConfig::Hysteria2(cfg) => ClashProxy::Hysteria2 {
            common: builder.skip_cert_verify(cfg.allow_insecure).build(),
            password: owned(&cfg.password),
            obfs: owned(&cfg.obfs),
            obfs_password: owned(&cfg.obfs_password),
            up: mbps(cfg.up_mbps),
            down: mbps(cfg.down_mbps),
            sni: owned(&cfg.sni),
            alpn: cfg.alpn.clone(),
        },
        ProxyConfig::Hysteria(cfg) => ClashProxy::Hysteria {
            common: builder.skip_cert_verify(cfg.allow_insecure).build(),
            auth_str: owned(&cfg.auth_str),
            obfs: owned(&cfg.obfs),
            up: mbps(cfg.up_mbps),
            down: mbps(cfg.down_mbps),
            sni: owned(&cfg.sni),
            alpn: cfg.alpn.clone(),
        },
    }
}

/// Convert proxies to a Clash configuration
///
/// Emits the fixed header, one proxy per node, the baseline groups followed
/// by any bucket groups, and the baseline rules ending in `MATCH,Proxy`.
pub fn proxy_to_clash(nodes: &[ProxyNode], grouping: &GroupingOptions) -> Result<String> {
    let mut proxies: Vec<ClashProxy> = nodes.iter().map(proxy_to_clash_proxy).collect();
    for proxy in &mut proxies {
        let common = proxy.common_mut();
        common.name = avoid_reserved_name(std::mem::take(&mut common.name));
    }
    let names: Vec<String> = proxies.iter().map(|p| p.common().name.clone()).collect();

    let mut groups = baseline_groups(&names);
    if grouping.enabled {
        let buckets = group_generate(&names, grouping.group_by);
        debug!("Adding {} {:?} bucket groups", buckets.len(), grouping.group_by);
        groups.extend(buckets);
    }

    let output = ClashYamlOutput {
        proxies,
        proxy_groups: groups.into_iter().map(ClashProxyGroup::from).collect(),
        rules: clash_rules(),
        ..Default::default()
    };

    Ok(serde_yaml::to_string(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupBy;
    use serde_json::json;
    use serde_yaml::Value;

    fn nodes() -> Vec<ProxyNode> {
        serde_json::from_value(json!([
            {
                "id": 1, "name": "HK vless", "type": "vless", "server": "a.com", "port": 443,
                "uuid": "u1", "network": "ws", "security": "tls", "sni": "a.com",
                "fingerprint": "chrome", "wsPath": "/ws", "wsHeaders": {"Host": "cdn.a.com"}
            },
            {
                "id": 2, "name": "JP ss", "type": "ss", "server": "b.com", "port": 8388,
                "method": "aes-256-gcm", "password": "pw",
                "plugin": "obfs-local", "pluginOpts": "obfs=tls;obfs-host=bing.com"
            },
            {
                "id": 3, "name": "US hy2", "type": "hy2", "server": "c.com", "port": 443,
                "password": "h", "obfs": "salamander", "obfsPassword": "o",
                "upMbps": 50, "downMbps": 100
            },
            {"id": 4, "name": "s5", "type": "socks5", "server": "d.com", "port": 1080}
        ]))
        .unwrap()
    }

    fn parse(content: &str) -> Value {
        serde_yaml::from_str(content).unwrap()
    }

    #[test]
    fn test_clash_document_shape() {
        let content = proxy_to_clash(&nodes(), &GroupingOptions::default()).unwrap();
        let doc = parse(&content);

        assert_eq!(doc["port"].as_u64(), Some(7890));
        assert_eq!(doc["socks-port"].as_u64(), Some(7891));
        assert_eq!(doc["allow-lan"].as_bool(), Some(false));
        assert_eq!(doc["mode"].as_str(), Some("rule"));
        assert_eq!(doc["external-controller"].as_str(), Some("127.0.0.1:9090"));

        let proxies = doc["proxies"].as_sequence().unwrap();
        assert_eq!(proxies.len(), 4);

        let groups = doc["proxy-groups"].as_sequence().unwrap();
        let group_names: Vec<&str> = groups.iter().map(|g| g["name"].as_str().unwrap()).collect();
        assert_eq!(group_names, vec!["Proxy", "Auto", "Domestic", "AdBlock", "Others"]);
        assert_eq!(groups[1]["type"].as_str(), Some("url-test"));

        let rules = doc["rules"].as_sequence().unwrap();
        assert_eq!(rules.last().and_then(Value::as_str), Some("MATCH,Proxy"));
    }

    #[test]
    fn test_clash_proxy_fields() {
        let content = proxy_to_clash(&nodes(), &GroupingOptions::default()).unwrap();
        let doc = parse(&content);
        let proxies = &doc["proxies"];

        let vless = &proxies[0];
        assert_eq!(vless["type"].as_str(), Some("vless"));
        assert_eq!(vless["tls"].as_bool(), Some(true));
        assert_eq!(vless["servername"].as_str(), Some("a.com"));
        assert_eq!(vless["client-fingerprint"].as_str(), Some("chrome"));
        assert_eq!(vless["ws-opts"]["path"].as_str(), Some("/ws"));
        assert_eq!(vless["ws-opts"]["headers"]["Host"].as_str(), Some("cdn.a.com"));

        let ss = &proxies[1];
        assert_eq!(ss["cipher"].as_str(), Some("aes-256-gcm"));
        assert_eq!(ss["plugin"].as_str(), Some("obfs"));
        assert_eq!(ss["plugin-opts"]["mode"].as_str(), Some("tls"));
        assert_eq!(ss["plugin-opts"]["host"].as_str(), Some("bing.com"));

        let hy2 = &proxies[2];
        assert_eq!(hy2["type"].as_str(), Some("hysteria2"));
        assert_eq!(hy2["obfs-password"].as_str(), Some("o"));
        assert_eq!(hy2["up"].as_str(), Some("50 Mbps"));
        assert_eq!(hy2["down"].as_str(), Some("100 Mbps"));

        let socks = &proxies[3];
        assert_eq!(socks["type"].as_str(), Some("socks5"));
        assert!(socks.get("tls").is_none());
    }

    #[test]
    fn test_clash_grouping_adds_bucket_groups() {
        let grouping = GroupingOptions {
            enabled: true,
            group_by: GroupBy::Region,
        };
        let content = proxy_to_clash(&nodes(), &grouping).unwrap();
        let doc = parse(&content);
        let groups = doc["proxy-groups"].as_sequence().unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g["name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec![
                "Proxy",
                "Auto",
                "Domestic",
                "AdBlock",
                "Others",
                "Hong Kong Nodes",
                "Japan Nodes",
                "United States Nodes",
                "Other Nodes"
            ]
        );
        // bucket groups are not referenced from Proxy
        let proxy_members = groups[0]["proxies"].as_sequence().unwrap();
        assert_eq!(proxy_members.len(), 2 + 4);
    }

    #[test]
    fn test_clash_without_nodes() {
        let content = proxy_to_clash(&[], &GroupingOptions::default()).unwrap();
        let doc = parse(&content);
        assert_eq!(doc["proxies"].as_sequence().map(Vec::len), Some(0));
        assert_eq!(doc["proxy-groups"][1]["proxies"][0].as_str(), Some("DIRECT"));
    }

    #[test]
    fn test_clash_reserved_proxy_names() {
        let nodes: Vec<ProxyNode> = serde_json::from_value(json!([
            {"id": 1, "name": "DIRECT", "type": "socks5", "server": "a.com", "port": 1080},
            {"id": 2, "name": "Node 01", "type": "socks5", "server": "b.com", "port": 1080}
        ]))
        .unwrap();
        let doc = parse(&proxy_to_clash(&nodes, &GroupingOptions::default()).unwrap());
        assert_eq!(doc["proxies"][0]["name"].as_str(), Some("DIRECT (proxy)"));
        let members: Vec<&str> = doc["proxy-groups"][0]["proxies"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|m| m.as_str().unwrap())
            .collect();
        assert_eq!(members, vec!["Auto", "DIRECT", "DIRECT (proxy)", "Node 01"]);
    }
}
