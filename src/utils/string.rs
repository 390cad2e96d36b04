//! String utility functions for text processing

/// Case-insensitive substring check.
///
/// # Arguments
///
/// * `haystack` - The string to search in
/// * `needle` - The substring to look for
///
/// # Returns
///
/// True if `needle` occurs in `haystack` ignoring case
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Make a node name safe for line-based formats such as Surge and Quantumult X,
/// where `,` separates fields and `=` separates keys from values.
pub fn sanitize_remark(remark: &str) -> String {
    let cleaned = remark.replace(',', " ").replace('=', "-");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The Shadowsocks plugin options this crate understands.
///
/// `pluginOpts` is a `;`-delimited `key=value` string. Only the keys below are
/// read, anything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginOptions {
    /// `obfs=http|tls` for simple-obfs
    pub obfs: Option<String>,
    pub obfs_host: Option<String>,
    /// `host=` for v2ray-plugin
    pub host: Option<String>,
    pub path: Option<String>,
    /// `mode=websocket`
    pub websocket: bool,
    /// A bare `tls` flag or `tls=true`
    pub tls: bool,
}

impl PluginOptions {
    pub fn parse(opts: &str) -> Self {
        let mut result = PluginOptions::default();
        for item in opts.split(';') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let (key, value) = match item.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (item, ""),
            };
            match key {
                "obfs" if !value.is_empty() => result.obfs = Some(value.to_string()),
                "obfs-host" if !value.is_empty() => result.obfs_host = Some(value.to_string()),
                "host" if !value.is_empty() => result.host = Some(value.to_string()),
                "path" if !value.is_empty() => result.path = Some(value.to_string()),
                "mode" => result.websocket = value.eq_ignore_ascii_case("websocket"),
                "tls" => result.tls = value.is_empty() || value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }
        result
    }

    /// Host for whichever plugin is in use, preferring `obfs-host`.
    pub fn any_host(&self) -> Option<&str> {
        self.obfs_host.as_deref().or(self.host.as_deref())
    }
}

/// Whether a Shadowsocks plugin name refers to simple-obfs.
pub fn is_obfs_plugin(plugin: &str) -> bool {
    matches!(plugin, "obfs" | "obfs-local" | "simple-obfs")
}

/// Whether a Shadowsocks plugin name refers to v2ray-plugin.
pub fn is_v2ray_plugin(plugin: &str) -> bool {
    matches!(plugin, "v2ray-plugin" | "v2ray")
}
