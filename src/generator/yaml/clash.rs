use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn is_empty_option_string(s: &Option<String>) -> bool {
    s.as_deref().map_or(true, str::is_empty)
}

/// Represents a complete Clash configuration output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClashYamlOutput {
    pub port: u16,
    pub socks_port: u16,
    pub allow_lan: bool,
    pub mode: String,
    pub log_level: String,
    pub external_controller: String,
    pub proxies: Vec<ClashProxy>,
    pub proxy_groups: Vec<ClashProxyGroup>,
    pub rules: Vec<String>,
}

impl Default for ClashYamlOutput {
    fn default() -> Self {
        Self {
            port: 7890,
            socks_port: 7891,
            allow_lan: false,
            mode: "rule".to_string(),
            log_level: "info".to_string(),
            external_controller: "127.0.0.1:9090".to_string(),
            proxies: Vec::new(),
            proxy_groups: Vec::new(),
            rules: Vec::new(),
        }
    }
}

/// Common proxy options that can be used across different proxy types
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommonProxyOptions {
    pub name: String,
    pub server: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_cert_verify: Option<bool>,
    #[serde(skip_serializing_if = "is_empty_option_string")]
    pub client_fingerprint: Option<String>,
}

/// Factory methods for CommonProxyOptions
impl CommonProxyOptions {
    /// Create a new CommonProxyOptions with default values
    pub fn new(name: String, server: String, port: u16) -> Self {
        Self {
            name,
            server,
            port,
            udp: None,
            tls: None,
            skip_cert_verify: None,
            client_fingerprint: None,
        }
    }

    /// Create a builder for CommonProxyOptions
    pub fn builder(name: String, server: String, port: u16) -> CommonProxyOptionsBuilder {
        CommonProxyOptionsBuilder {
            common: Self::new(name, server, port),
        }
    }
}

/// Builder for CommonProxyOptions
pub struct CommonProxyOptionsBuilder {
    common: CommonProxyOptions,
}

impl CommonProxyOptionsBuilder {
    /// Set UDP option
    pub fn udp(mut self, value: bool) -> Self {
        self.common.udp = Some(value);
        self
    }

    /// Set TLS option
    pub fn tls(mut self, value: bool) -> Self {
        self.common.tls = Some(value);
        self
    }

    /// Set skip_cert_verify, only emitted when true
    pub fn skip_cert_verify(mut self, value: bool) -> Self {
        self.common.skip_cert_verify = value.then_some(true);
        self
    }

    pub fn client_fingerprint(mut self, value: Option<&str>) -> Self {
        self.common.client_fingerprint = value.map(str::to_string);
        self
    }

    pub fn build(self) -> CommonProxyOptions {
        self.common
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsOpts {
    pub path: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct H2Opts {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub host: Vec<String>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GrpcOpts {
    pub grpc_service_name: String,
}

/// Shadowsocks `plugin-opts` for obfs and v2ray-plugin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginOpts {
    pub mode: String,
    #[serde(skip_serializing_if = "is_empty_option_string", default)]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "is_empty_option_string", default)]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tls: Option<bool>,
}

/// Transport options shared by the V2Ray family of proxies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransportOpts {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ws_opts: Option<WsOpts>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub h2_opts: Option<H2Opts>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub grpc_opts: Option<GrpcOpts>,
}

/// Represents a single proxy in Clash configuration
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClashProxy {
    #[serde(rename = "vless", rename_all = "kebab-case")]
    Vless {
        #[serde(flatten)]
        common: CommonProxyOptions,
        uuid: String,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        flow: Option<String>,
        network: String,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        servername: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        alpn: Vec<String>,
        #[serde(flatten)]
        transport: TransportOpts,
    },
    #[serde(rename = "vmess", rename_all = "kebab-case")]
    VMess {
        #[serde(flatten)]
        common: CommonProxyOptions,
        uuid: String,
        #[serde(rename = "alterId")]
        alter_id: u32,
        cipher: String,
        network: String,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        servername: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        alpn: Vec<String>,
        #[serde(flatten)]
        transport: TransportOpts,
    },
    #[serde(rename = "trojan", rename_all = "kebab-case")]
    Trojan {
        #[serde(flatten)]
        common: CommonProxyOptions,
        password: String,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        sni: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        alpn: Vec<String>,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        network: Option<String>,
        #[serde(flatten)]
        transport: TransportOpts,
    },
    #[serde(rename = "ss", rename_all = "kebab-case")]
    Shadowsocks {
        #[serde(flatten)]
        common: CommonProxyOptions,
        cipher: String,
        password: String,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        plugin: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        plugin_opts: Option<PluginOpts>,
    },
    #[serde(rename = "socks5", rename_all = "kebab-case")]
    Socks5 {
        #[serde(flatten)]
        common: CommonProxyOptions,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        username: Option<String>,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        password: Option<String>,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        sni: Option<String>,
    },
    #[serde(rename = "hysteria2", rename_all = "kebab-case")]
    Hysteria2 {
        #[serde(flatten)]
        common: CommonProxyOptions,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        password: Option<String>,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        obfs: Option<String>,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        obfs_password: Option<String>,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        up: Option<String>,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        down: Option<String>,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        sni: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        alpn: Vec<String>,
    },
    #[serde(rename = "hysteria", rename_all = "kebab-case")]
    Hysteria {
        #[serde(flatten)]
        common: CommonProxyOptions,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        auth_str: Option<String>,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        obfs: Option<String>,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        up: Option<String>,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        down: Option<String>,
        #[serde(skip_serializing_if = "is_empty_option_string")]
        sni: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        alpn: Vec<String>,
    },
}

impl ClashProxy {
    pub fn common(&self) -> &CommonProxyOptions {
        match self {
            ClashProxy::Vless { common, .. }
            | ClashProxy::VMess { common, .. }
            | ClashProxy::Trojan { common, .. }
            | ClashProxy::Shadowsocks { common, .. }
            | ClashProxy::Socks5 { common, .. }
            | ClashProxy::Hysteria2 { common, .. }
            | ClashProxy::Hysteria { common, .. } => common,
        }
    }

    pub fn common_mut(&mut self) -> &mut CommonProxyOptions {
        match self {
            ClashProxy::Vless { common, .. }
            | ClashProxy::VMess { common, .. }
            | ClashProxy::Trojan { common, .. }
            | ClashProxy::Shadowsocks { common, .. }
            | ClashProxy::Socks5 { common, .. }
            | ClashProxy::Hysteria2 { common, .. }
            | ClashProxy::Hysteria { common, .. } => common,
        }
    }
}

/// Represents a proxy group in Clash configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClashProxyGroup {
    #[serde(rename = "select")]
    Select { name: String, proxies: Vec<String> },
    #[serde(rename = "url-test")]
    UrlTest {
        name: String,
        proxies: Vec<String>,
        url: String,
        interval: u32,
    },
}
