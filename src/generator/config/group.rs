//! Group generation utilities
//!
//! Baseline proxy groups shared by the Clash and Surge emitters, and the
//! name-based bucketing used for the optional extra Clash groups.

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

use crate::models::GroupBy;
use crate::utils::contains_ignore_case;

pub const PROXY_GROUP: &str = "Proxy";
pub const AUTO_GROUP: &str = "Auto";
pub const DOMESTIC_GROUP: &str = "Domestic";
pub const ADBLOCK_GROUP: &str = "AdBlock";
pub const FINAL_GROUP: &str = "Others";

pub const TEST_URL: &str = "http://www.gstatic.com/generate_204";
pub const TEST_INTERVAL: u32 = 300;

const OTHER_BUCKET: &str = "Other";

/// The kind of a generated proxy group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKind {
    Select,
    UrlTest { url: &'static str, interval: u32 },
}

/// A format-neutral proxy group, rendered by each emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyGroup {
    pub name: String,
    pub kind: GroupKind,
    pub proxies: Vec<String>,
}

impl ProxyGroup {
    fn select(name: &str, proxies: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            kind: GroupKind::Select,
            proxies,
        }
    }
}

/// The five groups every Clash and Surge document carries, in order:
/// manual select, auto select, direct only, ad block and catch-all.
pub fn baseline_groups(proxy_names: &[String]) -> Vec<ProxyGroup> {
    let mut manual = vec![AUTO_GROUP.to_string(), "DIRECT".to_string()];
    manual.extend(proxy_names.iter().cloned());

    // url-test needs at least one member
    let auto = if proxy_names.is_empty() {
        vec!["DIRECT".to_string()]
    } else {
        proxy_names.to_vec()
    };

    vec![
        ProxyGroup::select(PROXY_GROUP, manual),
        ProxyGroup {
            name: AUTO_GROUP.to_string(),
            kind: GroupKind::UrlTest {
                url: TEST_URL,
                interval: TEST_INTERVAL,
            },
            proxies: auto,
        },
        ProxyGroup::select(DOMESTIC_GROUP, vec!["DIRECT".to_string()]),
        ProxyGroup::select(ADBLOCK_GROUP, vec!["REJECT".to_string(), "DIRECT".to_string()]),
        ProxyGroup::select(
            FINAL_GROUP,
            vec![PROXY_GROUP.to_string(), "DIRECT".to_string()],
        ),
    ]
}

/// Whether a proxy name collides with a built-in policy or a generated group.
pub fn is_reserved_name(name: &str) -> bool {
    let builtin = [
        "DIRECT",
        "REJECT",
        PROXY_GROUP,
        AUTO_GROUP,
        DOMESTIC_GROUP,
        ADBLOCK_GROUP,
        FINAL_GROUP,
    ];
    if builtin.iter().any(|b| b.eq_ignore_ascii_case(name)) {
        return true;
    }
    match name.strip_suffix(" Nodes") {
        Some(bucket) => [GroupBy::Type, GroupBy::Region]
            .into_iter()
            .flat_map(bucket_order)
            .any(|b| b == bucket),
        None => false,
    }
}

/// Suffix proxy names that would shadow a policy or group name.
pub fn avoid_reserved_name(name: String) -> String {
    if is_reserved_name(&name) {
        let renamed = format!("{} (proxy)", name);
        warn!("Proxy name '{}' is reserved, renamed to '{}'", name, renamed);
        renamed
    } else {
        name
    }
}

/// Name keywords for each protocol bucket. Order matters: the first match wins,
/// so longer keywords that contain shorter ones come first.
const TYPE_BUCKETS: &[(&str, &[&str])] = &[
    ("VLESS", &["vless"]),
    ("VMess", &["vmess"]),
    ("Trojan", &["trojan"]),
    ("Hysteria2", &["hysteria2", "hy2"]),
    ("Hysteria", &["hysteria"]),
    ("Shadowsocks", &["shadowsocks", "ss"]),
    ("SOCKS5", &["socks"]),
];

lazy_static! {
    static ref REGION_BUCKETS: Vec<(&'static str, Regex)> = [
        ("Hong Kong", r"(?i)\bHK\b|hong ?kong|香港|🇭🇰"),
        ("Taiwan", r"(?i)\bTW\b|taiwan|台湾|台灣|🇹🇼"),
        ("Japan", r"(?i)\bJP\b|japan|日本|东京|大阪|🇯🇵"),
        ("Singapore", r"(?i)\bSG\b|singapore|新加坡|狮城|🇸🇬"),
        ("United States", r"(?i)\bUS\b|united states|america|美国|🇺🇸"),
        ("Korea", r"(?i)\bKR\b|korea|韩国|首尔|🇰🇷"),
        ("United Kingdom", r"(?i)\bUK\b|\bGB\b|united kingdom|britain|英国|🇬🇧"),
        ("Germany", r"(?i)\bDE\b|germany|德国|🇩🇪"),
    ]
    .into_iter()
    .filter_map(|(name, pattern)| Regex::new(pattern).ok().map(|re| (name, re)))
    .collect();
}

fn type_bucket(name: &str) -> &'static str {
    TYPE_BUCKETS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| contains_ignore_case(name, k)))
        .map_or(OTHER_BUCKET, |(bucket, _)| *bucket)
}

fn region_bucket(name: &str) -> &'static str {
    REGION_BUCKETS
        .iter()
        .find(|(_, re)| re.is_match(name))
        .map_or(OTHER_BUCKET, |(bucket, _)| *bucket)
}

fn bucket_order(group_by: GroupBy) -> Vec<&'static str> {
    let mut order: Vec<&'static str> = match group_by {
        GroupBy::Type => TYPE_BUCKETS.iter().map(|(bucket, _)| *bucket).collect(),
        GroupBy::Region => REGION_BUCKETS.iter().map(|(bucket, _)| *bucket).collect(),
    };
    order.push(OTHER_BUCKET);
    order
}

/// Bucket proxy names by a category inferred from the name alone.
///
/// Returns one `select` group per non-empty bucket, in bucket definition
/// order, with members in input order.
pub fn group_generate(proxy_names: &[String], group_by: GroupBy) -> Vec<ProxyGroup> {
    let classify: fn(&str) -> &'static str = match group_by {
        GroupBy::Type => type_bucket,
        GroupBy::Region => region_bucket,
    };

    bucket_order(group_by)
        .into_iter()
        .filter_map(|bucket| {
            let members: Vec<String> = proxy_names
                .iter()
                .filter(|name| classify(name) == bucket)
                .cloned()
                .collect();
            if members.is_empty() {
                None
            } else {
                Some(ProxyGroup::select(&format!("{} Nodes", bucket), members))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_baseline_groups() {
        let groups = baseline_groups(&names(&["a", "b"]));
        assert_eq!(groups.len(), 5);
        assert_eq!(groups[0].name, PROXY_GROUP);
        assert_eq!(groups[0].proxies, names(&["Auto", "DIRECT", "a", "b"]));
        assert_eq!(groups[1].proxies, names(&["a", "b"]));
        assert!(matches!(groups[1].kind, GroupKind::UrlTest { interval: 300, .. }));
        assert_eq!(groups[3].proxies, names(&["REJECT", "DIRECT"]));
    }

    #[test]
    fn test_baseline_groups_without_proxies() {
        let groups = baseline_groups(&[]);
        assert_eq!(groups[1].proxies, names(&["DIRECT"]));
    }

    #[test]
    fn test_reserved_names_get_suffix() {
        assert!(is_reserved_name("DIRECT"));
        assert!(is_reserved_name("proxy"));
        assert!(is_reserved_name("Japan Nodes"));
        assert!(is_reserved_name("Other Nodes"));
        assert!(!is_reserved_name("HK Nodes"));
        assert_eq!(avoid_reserved_name("Auto".to_string()), "Auto (proxy)");
        assert_eq!(avoid_reserved_name("HK-01".to_string()), "HK-01");
    }

    #[test]
    fn test_group_by_type() {
        let groups = group_generate(
            &names(&["HK vless 01", "JP-VMess", "ss-us", "hy2 node", "plain"]),
            GroupBy::Type,
        );
        let summary: Vec<(&str, Vec<String>)> = groups
            .iter()
            .map(|g| (g.name.as_str(), g.proxies.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("VLESS Nodes", names(&["HK vless 01"])),
                ("VMess Nodes", names(&["JP-VMess"])),
                ("Hysteria2 Nodes", names(&["hy2 node"])),
                ("Shadowsocks Nodes", names(&["ss-us"])),
                ("Other Nodes", names(&["plain"])),
            ]
        );
    }

    #[test]
    fn test_group_by_region() {
        let groups = group_generate(
            &names(&["HK-01", "香港 02", "JP 01", "Mars"]),
            GroupBy::Region,
        );
        assert_eq!(groups[0].name, "Hong Kong Nodes");
        assert_eq!(groups[0].proxies, names(&["HK-01", "香港 02"]));
        assert_eq!(groups[1].name, "Japan Nodes");
        assert_eq!(groups[2].name, "Other Nodes");
        assert_eq!(groups.len(), 3);
    }
}
