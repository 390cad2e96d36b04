use crate::error::Result;
use crate::generator::config::group::TEST_URL;
use crate::generator::config::ruleconvert::quanx_rules;
use crate::generator::config::subexport::{format_host, skip_node, SkippedNode};
use crate::models::{non_empty, ProxyConfig, ProxyNode, TransportOptions};
use crate::utils::string::{is_obfs_plugin, is_v2ray_plugin, sanitize_remark, PluginOptions};

/// Push the `obfs-host` / `obfs-uri` pair for a WebSocket transport.
fn push_ws_params(params: &mut Vec<String>, transport: &TransportOptions) {
    if let Some(host) = transport.ws_host() {
        params.push(format!("obfs-host={}", host));
    }
    params.push(format!("obfs-uri={}", transport.path_for("ws").unwrap_or("/")));
}

fn push_ss_plugin(params: &mut Vec<String>, plugin: &str, opts: Option<&str>) {
    let parsed = PluginOptions::parse(opts.unwrap_or_default());
    if is_obfs_plugin(plugin) {
        if let Some(obfs) = &parsed.obfs {
            params.push(format!("obfs={}", obfs));
            if let Some(host) = parsed.any_host() {
                params.push(format!("obfs-host={}", host));
            }
            if let Some(path) = &parsed.path {
                params.push(format!("obfs-uri={}", path));
            }
        }
    } else if is_v2ray_plugin(plugin) && parsed.websocket {
        params.push(format!("obfs={}", if parsed.tls { "wss" } else { "ws" }));
        if let Some(host) = parsed.any_host() {
            params.push(format!("obfs-host={}", host));
        }
        params.push(format!("obfs-uri={}", parsed.path.as_deref().unwrap_or("/")));
    }
}

/// Build the `[server_local]` line for a node, or `None` for unsupported types.
pub fn proxy_to_quanx_line(node: &ProxyNode) -> Option<String> {
    let endpoint = format!("{}:{}", format_host(&node.server), node.port);
    let mut params: Vec<String> = Vec::new();

    let scheme = match &node.config {
        ProxyConfig::Shadowsocks(cfg) => {
            params.push(format!("method={}", cfg.method));
            params.push(format!("password={}", cfg.password));
            if let Some(plugin) = non_empty(&cfg.plugin) {
                push_ss_plugin(&mut params, plugin, non_empty(&cfg.plugin_opts));
            }
            "shadowsocks"
        }
        ProxyConfig::VMess(cfg) => {
            let method = match cfg.security.as_str() {
                "auto" | "" => "chacha20-ietf-poly1305",
                other => other,
            };
            params.push(format!("method={}", method));
            params.push(format!("password={}", cfg.uuid));
            match (cfg.network(), cfg.tls) {
                ("ws", tls) => {
                    params.push(format!("obfs={}", if tls { "wss" } else { "ws" }));
                    push_ws_params(&mut params, &cfg.transport);
                }
                (_, true) => params.push("obfs=over-tls".to_string()),
                _ => {}
            }
            if cfg.tls {
                if let Some(sni) = non_empty(&cfg.sni) {
                    params.push(format!("tls-host={}", sni));
                }
            }
            "vmess"
        }
        ProxyConfig::Trojan(cfg) => {
            params.push(format!("password={}", cfg.password));
            if cfg.network() == "ws" {
                params.push("obfs=wss".to_string());
                push_ws_params(&mut params, &cfg.transport);
            } else {
                params.push("over-tls=true".to_string());
            }
            if let Some(sni) = non_empty(&cfg.sni) {
                params.push(format!("tls-host={}", sni));
            }
            if cfg.allow_insecure {
                params.push("tls-verification=false".to_string());
            }
            "trojan"
        }
        ProxyConfig::Vless(_)
        | ProxyConfig::Socks5(_)
        | ProxyConfig::Hysteria2(_)
        | ProxyConfig::Hysteria(_) => return None,
    };

    params.push(format!("tag={}", sanitize_remark(&node.name)));
    Some(format!("{}={}, {}", scheme, endpoint, params.join(", ")))
}

/// Convert proxies to a Quantumult X configuration
pub fn proxy_to_quanx(nodes: &[ProxyNode], skipped: &mut Vec<SkippedNode>) -> Result<String> {
    let mut output = String::new();

    output.push_str("[general]\n");
    output.push_str(&format!("server_check_url={}\n\n", TEST_URL));

    output.push_str("[server_local]\n");
    for node in nodes {
        match proxy_to_quanx_line(node) {
            Some(line) => {
                output.push_str(&line);
                output.push('\n');
            }
            None => skip_node(skipped, node, "quantumult-x"),
        }
    }

    output.push_str("\n[filter_local]\n");
    for rule in quanx_rules() {
        output.push_str(&rule);
        output.push('\n');
    }

    output.push_str("\n[rewrite_local]\n");
    output.push_str("\n[task_local]\n");
    output.push_str("\n[mitm]\n");

    Ok(output)
}
