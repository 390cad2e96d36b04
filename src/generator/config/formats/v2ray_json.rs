use log::debug;
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::generator::config::subexport::{skip_node, SkippedNode};
use crate::models::{non_empty, ProxyConfig, ProxyNode, TransportOptions};

const SOCKS_PORT: u16 = 10808;
const HTTP_PORT: u16 = 10809;

/// TLS-related inputs for a stream settings block.
struct StreamTls<'a> {
    security: &'a str,
    sni: Option<&'a str>,
    alpn: &'a [String],
    fingerprint: Option<&'a str>,
    allow_insecure: bool,
}

impl StreamTls<'_> {
    fn none() -> Self {
        StreamTls {
            security: "none",
            sni: None,
            alpn: &[],
            fingerprint: None,
            allow_insecure: false,
        }
    }
}

fn stream_settings(network: &str, tls: &StreamTls, transport: &TransportOptions) -> Value {
    let mut stream = Map::new();
    stream.insert("network".to_string(), json!(network));
    stream.insert("security".to_string(), json!(tls.security));

    if tls.security == "tls" || tls.security == "reality" {
        let mut tls_settings = Map::new();
        if let Some(sni) = tls.sni {
            tls_settings.insert("serverName".to_string(), json!(sni));
        }
        if !tls.alpn.is_empty() {
            tls_settings.insert("alpn".to_string(), json!(tls.alpn));
        }
        if let Some(fp) = tls.fingerprint {
            tls_settings.insert("fingerprint".to_string(), json!(fp));
        }
        if tls.allow_insecure {
            tls_settings.insert("allowInsecure".to_string(), json!(true));
        }
        let key = if tls.security == "reality" {
            "realitySettings"
        } else {
            "tlsSettings"
        };
        stream.insert(key.to_string(), Value::Object(tls_settings));
    }

    match network {
        "ws" => {
            let mut ws = Map::new();
            ws.insert("path".to_string(), json!(transport.path_for("ws").unwrap_or("/")));
            if let Some(host) = transport.ws_host() {
                ws.insert("headers".to_string(), json!({ "Host": host }));
            }
            stream.insert("wsSettings".to_string(), Value::Object(ws));
        }
        "h2" | "http" => {
            let mut http = Map::new();
            http.insert("path".to_string(), json!(transport.path_for("h2").unwrap_or("/")));
            if let Some(host) = transport.host_for("h2") {
                let hosts: Vec<&str> = host.split(',').map(str::trim).collect();
                http.insert("host".to_string(), json!(hosts));
            }
            stream.insert("httpSettings".to_string(), Value::Object(http));
        }
        "grpc" => {
            let multi_mode = non_empty(&transport.grpc_mode) == Some("multi");
            stream.insert(
                "grpcSettings".to_string(),
                json!({
                    "serviceName": transport.service_name().unwrap_or_default(),
                    "multiMode": multi_mode,
                }),
            );
        }
        _ => {}
    }

    Value::Object(stream)
}

/// Build a V2Ray outbound for a node, or `None` when the core has no outbound for it.
pub fn proxy_to_outbound(node: &ProxyNode) -> Option<Value> {
    let outbound = match &node.config {
        ProxyConfig::Vless(cfg) => {
            let mut user = json!({ "id": cfg.uuid, "encryption": cfg.encryption });
            if let Some(flow) = non_empty(&cfg.flow) {
                user["flow"] = json!(flow);
            }
            let tls = StreamTls {
                security: non_empty(&cfg.security).unwrap_or("none"),
                sni: non_empty(&cfg.sni),
                alpn: &cfg.alpn,
                fingerprint: non_empty(&cfg.fingerprint),
                allow_insecure: false,
            };
            json!({
                "tag": node.name,
                "protocol": "vless",
                "settings": {
                    "vnext": [{ "address": node.server, "port": node.port, "users": [user] }]
                },
                "streamSettings": stream_settings(cfg.network(), &tls, &cfg.transport),
            })
        }
        ProxyConfig::VMess(cfg) => {
            let tls = if cfg.tls {
                StreamTls {
                    security: "tls",
                    sni: non_empty(&cfg.sni),
                    alpn: &cfg.alpn,
                    fingerprint: None,
                    allow_insecure: false,
                }
            } else {
                StreamTls::none()
            };
            json!({
                "tag": node.name,
                "protocol": "vmess",
                "settings": {
                    "vnext": [{
                        "address": node.server,
                        "port": node.port,
                        "users": [{ "id": cfg.uuid, "alterId": cfg.alter_id, "security": cfg.security }]
                    }]
                },
                "streamSettings": stream_settings(cfg.network(), &tls, &cfg.transport),
            })
        }
        ProxyConfig::Trojan(cfg) => {
            let tls = StreamTls {
                security: "tls",
                sni: non_empty(&cfg.sni),
                alpn: &cfg.alpn,
                fingerprint: None,
                allow_insecure: cfg.allow_insecure,
            };
            json!({
                "tag": node.name,
                "protocol": "trojan",
                "settings": {
                    "servers": [{ "address": node.server, "port": node.port, "password": cfg.password }]
                },
                "streamSettings": stream_settings(cfg.network(), &tls, &cfg.transport),
            })
        }
        ProxyConfig::Shadowsocks(cfg) => {
            if non_empty(&cfg.plugin).is_some() {
                debug!(
                    "V2Ray core has no Shadowsocks plugin support, emitting '{}' without it",
                    node.name
                );
            }
            json!({
                "tag": node.name,
                "protocol": "shadowsocks",
                "settings": {
                    "servers": [{
                        "address": node.server,
                        "port": node.port,
                        "method": cfg.method,
                        "password": cfg.password
                    }]
                },
            })
        }
        ProxyConfig::Socks5(_) | ProxyConfig::Hysteria2(_) | ProxyConfig::Hysteria(_) => {
            return None
        }
    };
    Some(outbound)
}

/// Convert proxies to a V2Ray core JSON configuration
///
/// Local socks/http inbounds, one outbound per node tagged with its name,
/// then the `direct` and `block` fallbacks and China direct routing.
pub fn proxy_to_v2ray_json(nodes: &[ProxyNode], skipped: &mut Vec<SkippedNode>) -> Result<String> {
    let mut outbounds = Vec::with_capacity(nodes.len() + 2);
    for node in nodes {
        match proxy_to_outbound(node) {
            Some(outbound) => outbounds.push(outbound),
            None => skip_node(skipped, node, "v2ray-json"),
        }
    }
    outbounds.push(json!({ "tag": "direct", "protocol": "freedom", "settings": {} }));
    outbounds.push(json!({ "tag": "block", "protocol": "blackhole", "settings": {} }));

    let config = json!({
        "log": { "loglevel": "warning" },
        "inbounds": [
            {
                "tag": "socks-in",
                "port": SOCKS_PORT,
                "listen": "127.0.0.1",
                "protocol": "socks",
                "settings": { "auth": "noauth", "udp": true }
            },
            {
                "tag": "http-in",
                "port": HTTP_PORT,
                "listen": "127.0.0.1",
                "protocol": "http",
                "settings": {}
            }
        ],
        "outbounds": outbounds,
        "routing": {
            "domainStrategy": "IPIfNonMatch",
            "rules": [
                { "type": "field", "domain": ["geosite:cn"], "outboundTag": "direct" },
                { "type": "field", "ip": ["geoip:cn", "geoip:private"], "outboundTag": "direct" }
            ]
        }
    });

    Ok(serde_json::to_string_pretty(&config)?)
}
