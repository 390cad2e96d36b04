use log::debug;

use crate::error::Result;
use crate::generator::config::group::{
    avoid_reserved_name, baseline_groups, GroupKind, ProxyGroup,
};
use crate::generator::config::ruleconvert::surge_rules;
use crate::generator::config::subexport::{skip_node, SkippedNode};
use crate::models::{non_empty, ProxyConfig, ProxyNode};
use crate::utils::string::{is_obfs_plugin, sanitize_remark, PluginOptions};

const GENERAL_SECTION: &str = "[General]
loglevel = notify
skip-proxy = 127.0.0.1, 192.168.0.0/16, 10.0.0.0/8, 172.16.0.0/12, 100.64.0.0/10, localhost, *.local
dns-server = system, 223.5.5.5, 114.114.114.114
";

/// Build the `[Proxy]` line for a node, or `None` for unsupported types.
pub fn proxy_to_surge_line(node: &ProxyNode, name: &str) -> Option<String> {
    let mut params: Vec<String> = Vec::new();

    let kind = match &node.config {
        ProxyConfig::VMess(cfg) => {
            params.push(format!("username={}", cfg.uuid));
            if cfg.network() == "ws" {
                params.push("ws=true".to_string());
                params.push(format!(
                    "ws-path={}",
                    cfg.transport.path_for("ws").unwrap_or("/")
                ));
                if let Some(host) = cfg.transport.ws_host() {
                    params.push(format!("ws-headers=Host:{}", host));
                }
            }
            if cfg.tls {
                params.push("tls=true".to_string());
                if let Some(sni) = non_empty(&cfg.sni) {
                    params.push(format!("sni={}", sni));
                }
            }
            if cfg.alter_id == 0 {
                params.push("vmess-aead=true".to_string());
            }
            "vmess"
        }
        ProxyConfig::Trojan(cfg) => {
            params.push(format!("password={}", cfg.password));
            if let Some(sni) = non_empty(&cfg.sni) {
                params.push(format!("sni={}", sni));
            }
            if cfg.allow_insecure {
                params.push("skip-cert-verify=true".to_string());
            }
            if cfg.network() == "ws" {
                params.push("ws=true".to_string());
                params.push(format!(
                    "ws-path={}",
                    cfg.transport.path_for("ws").unwrap_or("/")
                ));
                if let Some(host) = cfg.transport.ws_host() {
                    params.push(format!("ws-headers=Host:{}", host));
                }
            }
            "trojan"
        }
        ProxyConfig::Shadowsocks(cfg) => {
            params.push(format!("encrypt-method={}", cfg.method));
            params.push(format!("password={}", cfg.password));
            if let Some(plugin) = non_empty(&cfg.plugin).filter(|p| is_obfs_plugin(p)) {
                let opts = PluginOptions::parse(non_empty(&cfg.plugin_opts).unwrap_or_default());
                match opts.obfs.as_deref() {
                    Some(obfs @ ("http" | "tls")) => {
                        params.push(format!("obfs={}", obfs));
                        if let Some(host) = opts.any_host() {
                            params.push(format!("obfs-host={}", host));
                        }
                    }
                    _ => debug!("Ignoring '{}' options for Surge node '{}'", plugin, name),
                }
            }
            "ss"
        }
        ProxyConfig::Vless(_)
        | ProxyConfig::Socks5(_)
        | ProxyConfig::Hysteria2(_)
        | ProxyConfig::Hysteria(_) => return None,
    };

    let mut line = format!("{} = {}, {}, {}", name, kind, node.server, node.port);
    for param in params {
        line.push_str(", ");
        line.push_str(&param);
    }
    Some(line)
}

fn group_line(group: &ProxyGroup) -> String {
    match group.kind {
        GroupKind::Select => format!("{} = select, {}", group.name, group.proxies.join(", ")),
        GroupKind::UrlTest { url, interval } => format!(
            "{} = url-test, {}, url={}, interval={}",
            group.name,
            group.proxies.join(", "),
            url,
            interval
        ),
    }
}

/// Convert proxies to a Surge configuration
pub fn proxy_to_surge(nodes: &[ProxyNode], skipped: &mut Vec<SkippedNode>) -> Result<String> {
    let mut output = String::from(GENERAL_SECTION);
    let mut names = Vec::with_capacity(nodes.len());

    output.push_str("\n[Proxy]\n");
    for node in nodes {
        let name = avoid_reserved_name(sanitize_remark(&node.name));
        match proxy_to_surge_line(node, &name) {
            Some(line) => {
                output.push_str(&line);
                output.push('\n');
                names.push(name);
            }
            None => skip_node(skipped, node, "surge"),
        }
    }

    output.push_str("\n[Proxy Group]\n");
    for group in baseline_groups(&names) {
        output.push_str(&group_line(&group));
        output.push('\n');
    }

    output.push_str("\n[Rule]\n");
    for rule in surge_rules() {
        output.push_str(&rule);
        output.push('\n');
    }

    Ok(output)
}
