use serde::Serialize;

use crate::error::Result;
use crate::generator::config::subexport::{format_host, skip_node, SkippedNode};
use crate::models::{
    non_empty, ProxyConfig, ProxyNode, ShadowsocksConfig, TransportOptions, TrojanConfig,
    VlessConfig, VmessConfig,
};
use crate::utils::{base64_encode, url_encode, url_safe_base64_encode, QueryBuilder};

/// Field layout of a `vmess://` share link, in the order clients expect.
#[derive(Debug, Serialize)]
struct VmessShareLink<'a> {
    v: &'a str,
    ps: &'a str,
    add: &'a str,
    port: String,
    id: &'a str,
    aid: String,
    scy: &'a str,
    net: &'a str,
    #[serde(rename = "type")]
    header_type: &'a str,
    host: &'a str,
    path: &'a str,
    tls: &'a str,
    sni: &'a str,
}

/// Append the transport parameters matching `network`.
fn push_transport(query: &mut QueryBuilder, network: &str, transport: &TransportOptions) {
    match network {
        "ws" | "h2" | "http" => {
            query
                .push_opt("path", transport.path_for(network))
                .push_opt("host", transport.host_for(network));
        }
        "grpc" => {
            query
                .push_opt("serviceName", transport.service_name())
                .push_opt("mode", non_empty(&transport.grpc_mode));
        }
        _ => {}
    }
}

fn with_query_and_fragment(mut uri: String, query: &QueryBuilder, name: &str) -> String {
    if !query.is_empty() {
        uri.push('?');
        uri.push_str(&query.build());
    }
    uri.push('#');
    uri.push_str(&url_encode(name));
    uri
}

/// Format: vless://uuid@server:port?params#name
pub fn vless_to_uri(node: &ProxyNode, cfg: &VlessConfig) -> String {
    let network = cfg.network();
    let mut query = QueryBuilder::new();
    if !cfg.encryption.eq_ignore_ascii_case("none") {
        query.push("encryption", &cfg.encryption);
    }
    query
        .push_opt("flow", non_empty(&cfg.flow))
        .push_opt("security", non_empty(&cfg.security))
        .push_opt("sni", non_empty(&cfg.sni))
        .push("alpn", &cfg.alpn.join(","))
        .push_opt("fp", non_empty(&cfg.fingerprint))
        .push("type", network);
    push_transport(&mut query, network, &cfg.transport);

    let uri = format!(
        "vless://{}@{}:{}",
        cfg.uuid,
        format_host(&node.server),
        node.port
    );
    with_query_and_fragment(uri, &query, &node.name)
}

/// Format: vmess://BASE64(JSON)
pub fn vmess_to_uri(node: &ProxyNode, cfg: &VmessConfig) -> Result<String> {
    let network = cfg.network();
    let path = match network {
        "grpc" => cfg.transport.service_name(),
        _ => cfg.transport.path_for(network),
    };
    let link = VmessShareLink {
        v: "2",
        ps: &node.name,
        add: &node.server,
        port: node.port.to_string(),
        id: &cfg.uuid,
        aid: cfg.alter_id.to_string(),
        scy: &cfg.security,
        net: network,
        header_type: "none",
        host: cfg.transport.host_for(network).unwrap_or_default(),
        path: path.unwrap_or_default(),
        tls: if cfg.tls { "tls" } else { "" },
        sni: non_empty(&cfg.sni).unwrap_or_default(),
    };
    let json = serde_json::to_string(&link)?;
    Ok(format!("vmess://{}", base64_encode(&json)))
}

/// Format: trojan://password@server:port?params#name
pub fn trojan_to_uri(node: &ProxyNode, cfg: &TrojanConfig) -> String {
    let network = cfg.network();
    let mut query = QueryBuilder::new();
    query
        .push("security", "tls")
        .push_opt("sni", non_empty(&cfg.sni))
        .push("alpn", &cfg.alpn.join(","));
    if cfg.allow_insecure {
        query.push("allowInsecure", "1");
    }
    query.push("type", network);
    push_transport(&mut query, network, &cfg.transport);

    let uri = format!(
        "trojan://{}@{}:{}",
        url_encode(&cfg.password),
        format_host(&node.server),
        node.port
    );
    with_query_and_fragment(uri, &query, &node.name)
}

/// Format: ss://BASE64(method:password)@server:port/?plugin=plugin_data#name
pub fn ss_to_uri(node: &ProxyNode, cfg: &ShadowsocksConfig) -> String {
    let user_info = url_safe_base64_encode(&format!("{}:{}", cfg.method, cfg.password));
    let mut uri = format!("ss://{}@{}:{}", user_info, format_host(&node.server), node.port);

    if let Some(plugin) = non_empty(&cfg.plugin) {
        let plugin_data = match non_empty(&cfg.plugin_opts) {
            Some(opts) => format!("{};{}", plugin, opts),
            None => plugin.to_string(),
        };
        uri.push_str("/?plugin=");
        uri.push_str(&url_encode(&plugin_data));
    }

    uri.push('#');
    uri.push_str(&url_encode(&node.name));
    uri
}

/// Convert a proxy to its share link.
///
/// Returns `Ok(None)` for node types that have no share-link form here.
pub fn proxy_to_uri(node: &ProxyNode) -> Result<Option<String>> {
    let uri = match &node.config {
        ProxyConfig::Vless(cfg) => vless_to_uri(node, cfg),
        ProxyConfig::VMess(cfg) => vmess_to_uri(node, cfg)?,
        ProxyConfig::Trojan(cfg) => trojan_to_uri(node, cfg),
        ProxyConfig::Shadowsocks(cfg) => ss_to_uri(node, cfg),
        ProxyConfig::Socks5(_) | ProxyConfig::Hysteria2(_) | ProxyConfig::Hysteria(_) => {
            return Ok(None)
        }
    };
    Ok(Some(uri))
}

/// Collect share links for every supported node, in input order.
pub fn proxy_to_uri_list(
    nodes: &[ProxyNode],
    target: &str,
    skipped: &mut Vec<SkippedNode>,
) -> Result<Vec<String>> {
    let mut links = Vec::with_capacity(nodes.len());
    for node in nodes {
        match proxy_to_uri(node)? {
            Some(uri) => links.push(uri),
            None => skip_node(skipped, node, target),
        }
    }
    Ok(links)
}

/// Convert proxies to a V2Ray subscription
///
/// One share link per line, the joined list Base64 encoded.
pub fn proxy_to_single(nodes: &[ProxyNode], skipped: &mut Vec<SkippedNode>) -> Result<String> {
    let links = proxy_to_uri_list(nodes, "v2ray", skipped)?;
    Ok(base64_encode(&links.join("\n")))
}
