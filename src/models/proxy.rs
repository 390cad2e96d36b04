//! Proxy node model definitions
//!
//! A node is a set of common fields plus a protocol-specific configuration.
//! The protocol is selected by the `type` tag, and every consumer matches on
//! [`ProxyConfig`] exhaustively.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::deserializer::deserialize_string_or_seq;

/// Represents the type of a proxy.
/// This is the canonical enum used for proxy type identification across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProxyType {
    #[serde(rename = "vless")]
    Vless,
    #[serde(rename = "vmess")]
    VMess,
    #[serde(rename = "trojan")]
    Trojan,
    #[serde(rename = "ss")]
    Shadowsocks,
    #[serde(rename = "socks5")]
    Socks5,
    #[serde(rename = "hy2")]
    Hysteria2,
    #[serde(rename = "hy")]
    Hysteria,
}

impl ProxyType {
    pub const ALL: [ProxyType; 7] = [
        ProxyType::Vless,
        ProxyType::VMess,
        ProxyType::Trojan,
        ProxyType::Shadowsocks,
        ProxyType::Socks5,
        ProxyType::Hysteria2,
        ProxyType::Hysteria,
    ];

    /// The `type` tag as it appears in stored nodes and query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            ProxyType::Vless => "vless",
            ProxyType::VMess => "vmess",
            ProxyType::Trojan => "trojan",
            ProxyType::Shadowsocks => "ss",
            ProxyType::Socks5 => "socks5",
            ProxyType::Hysteria2 => "hy2",
            ProxyType::Hysteria => "hy",
        }
    }

    /// Converts a `ProxyType` into a human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            ProxyType::Vless => "VLESS",
            ProxyType::VMess => "VMess",
            ProxyType::Trojan => "Trojan",
            ProxyType::Shadowsocks => "SS",
            ProxyType::Socks5 => "SOCKS5",
            ProxyType::Hysteria2 => "Hysteria2",
            ProxyType::Hysteria => "Hysteria",
        }
    }

    /// Parse a type tag, ignoring case and surrounding whitespace.
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        ProxyType::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Transport settings shared by VLESS, VMess and Trojan nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_path: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ws_headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h2_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h2_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc_service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc_mode: Option<String>,
}

impl TransportOptions {
    /// The `Host` WebSocket header, matched case-insensitively.
    pub fn ws_host(&self) -> Option<&str> {
        self.ws_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("host"))
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Request path for the given network, if the network carries one.
    pub fn path_for(&self, network: &str) -> Option<&str> {
        match network {
            "ws" => non_empty(&self.ws_path),
            "h2" | "http" => non_empty(&self.h2_path),
            _ => None,
        }
    }

    /// Host header for the given network, if the network carries one.
    pub fn host_for(&self, network: &str) -> Option<&str> {
        match network {
            "ws" => self.ws_host(),
            "h2" | "http" => non_empty(&self.h2_host),
            _ => None,
        }
    }

    pub fn service_name(&self) -> Option<&str> {
        non_empty(&self.grpc_service_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VlessConfig {
    pub uuid: String,
    #[serde(default = "default_encryption")]
    pub encryption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub alpn: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(flatten)]
    pub transport: TransportOptions,
}

impl VlessConfig {
    pub fn network(&self) -> &str {
        network_or_tcp(&self.network)
    }

    /// Whether the node runs over TLS or REALITY.
    pub fn is_tls(&self) -> bool {
        matches!(self.security.as_deref(), Some("tls") | Some("reality"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmessConfig {
    pub uuid: String,
    #[serde(default)]
    pub alter_id: u32,
    /// Cipher, `auto` when unset.
    #[serde(default = "default_vmess_cipher")]
    pub security: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default)]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub alpn: Vec<String>,
    #[serde(flatten)]
    pub transport: TransportOptions,
}

impl VmessConfig {
    pub fn network(&self) -> &str {
        network_or_tcp(&self.network)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrojanConfig {
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub alpn: Vec<String>,
    #[serde(default)]
    pub allow_insecure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(flatten)]
    pub transport: TransportOptions,
}

impl TrojanConfig {
    pub fn network(&self) -> &str {
        network_or_tcp(&self.network)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowsocksConfig {
    pub method: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    /// Plugin options in the format of `key1=value1;key2=value2`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_opts: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Socks5Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hysteria2Config {
    #[serde(default, alias = "auth", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Obfuscation type, `salamander` is the only one Hysteria2 defines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfs_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_mbps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_mbps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub alpn: Vec<String>,
    #[serde(default)]
    pub allow_insecure: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HysteriaConfig {
    #[serde(default, alias = "auth", skip_serializing_if = "Option::is_none")]
    pub auth_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_mbps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_mbps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub alpn: Vec<String>,
    #[serde(default)]
    pub allow_insecure: bool,
}

/// Protocol-specific part of a node, keyed by the `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProxyConfig {
    #[serde(rename = "vless")]
    Vless(VlessConfig),
    #[serde(rename = "vmess")]
    VMess(VmessConfig),
    #[serde(rename = "trojan")]
    Trojan(TrojanConfig),
    #[serde(rename = "ss")]
    Shadowsocks(ShadowsocksConfig),
    #[serde(rename = "socks5")]
    Socks5(Socks5Config),
    #[serde(rename = "hy2")]
    Hysteria2(Hysteria2Config),
    #[serde(rename = "hy")]
    Hysteria(HysteriaConfig),
}

impl ProxyConfig {
    pub fn proxy_type(&self) -> ProxyType {
        match self {
            ProxyConfig::Vless(_) => ProxyType::Vless,
            ProxyConfig::VMess(_) => ProxyType::VMess,
            ProxyConfig::Trojan(_) => ProxyType::Trojan,
            ProxyConfig::Shadowsocks(_) => ProxyType::Shadowsocks,
            ProxyConfig::Socks5(_) => ProxyType::Socks5,
            ProxyConfig::Hysteria2(_) => ProxyType::Hysteria2,
            ProxyConfig::Hysteria(_) => ProxyType::Hysteria,
        }
    }
}

/// A stored proxy endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyNode {
    pub id: u64,
    pub name: String,
    pub server: String,
    pub port: u16,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub config: ProxyConfig,
}

impl ProxyNode {
    /// Create an enabled node with no tags, remark or timestamps.
    pub fn new(id: u64, name: &str, server: &str, port: u16, config: ProxyConfig) -> Self {
        Self {
            id,
            name: name.to_string(),
            server: server.to_string(),
            port,
            enabled: true,
            tags: Vec::new(),
            remark: None,
            created_at: None,
            updated_at: None,
            config,
        }
    }

    pub fn proxy_type(&self) -> ProxyType {
        self.config.proxy_type()
    }
}

fn default_enabled() -> bool {
    true
}

fn default_encryption() -> String {
    "none".to_string()
}

fn default_vmess_cipher() -> String {
    "auto".to_string()
}

fn network_or_tcp(network: &Option<String>) -> &str {
    match network.as_deref() {
        Some(n) if !n.is_empty() => n,
        _ => "tcp",
    }
}

/// Borrow an optional string, treating an empty value as absent.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_vless_node() {
        let node: ProxyNode = serde_json::from_value(json!({
            "id": 1,
            "name": "HK-01",
            "type": "vless",
            "server": "a.com",
            "port": 443,
            "enabled": true,
            "uuid": "u1",
            "network": "ws",
            "security": "tls",
            "alpn": "h2,http/1.1",
            "wsPath": "/ws",
            "wsHeaders": { "host": "cdn.a.com" }
        }))
        .unwrap();

        assert_eq!(node.proxy_type(), ProxyType::Vless);
        match &node.config {
            ProxyConfig::Vless(cfg) => {
                assert_eq!(cfg.encryption, "none");
                assert_eq!(cfg.network(), "ws");
                assert!(cfg.is_tls());
                assert_eq!(cfg.alpn, vec!["h2", "http/1.1"]);
                assert_eq!(cfg.transport.ws_host(), Some("cdn.a.com"));
                assert_eq!(cfg.transport.path_for("ws"), Some("/ws"));
                assert_eq!(cfg.transport.path_for("grpc"), None);
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_enabled_defaults_to_true() {
        let node: ProxyNode = serde_json::from_value(json!({
            "id": 2,
            "name": "ss",
            "type": "ss",
            "server": "b.com",
            "port": 8388,
            "method": "aes-256-gcm",
            "password": "pw"
        }))
        .unwrap();
        assert!(node.enabled);
        assert_eq!(node.proxy_type(), ProxyType::Shadowsocks);
    }

    #[test]
    fn test_hysteria_auth_aliases() {
        let hy: ProxyNode = serde_json::from_value(json!({
            "id": 3, "name": "hy", "type": "hy", "server": "c.com", "port": 443,
            "auth": "secret", "upMbps": 50, "downMbps": 100
        }))
        .unwrap();
        match hy.config {
            ProxyConfig::Hysteria(cfg) => {
                assert_eq!(cfg.auth_str.as_deref(), Some("secret"));
                assert_eq!(cfg.down_mbps, Some(100));
            }
            other => panic!("unexpected config: {:?}", other),
        }

        let hy2: ProxyNode = serde_json::from_value(json!({
            "id": 4, "name": "hy2", "type": "hy2", "server": "d.com", "port": 443,
            "auth": "pw2", "alpn": ["h3"]
        }))
        .unwrap();
        match hy2.config {
            ProxyConfig::Hysteria2(cfg) => {
                assert_eq!(cfg.password.as_deref(), Some("pw2"));
                assert_eq!(cfg.alpn, vec!["h3"]);
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: Result<ProxyNode, _> = serde_json::from_value(json!({
            "id": 5, "name": "x", "type": "wireguard", "server": "e.com", "port": 51820
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_proxy_type_from_str() {
        assert_eq!(ProxyType::from_str("VMESS"), Some(ProxyType::VMess));
        assert_eq!(ProxyType::from_str(" hy2 "), Some(ProxyType::Hysteria2));
        assert_eq!(ProxyType::from_str("ssr"), None);
    }
}
