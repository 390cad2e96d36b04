use crate::generator::config::group::PROXY_GROUP;

/// Rule type, payload and target of the built-in routing baseline.
///
/// LAN and private ranges first, then mainland China domains and GeoIP.
const BASELINE_RULES: &[(&str, &str, &str)] = &[
    ("DOMAIN-SUFFIX", "local", "DIRECT"),
    ("IP-CIDR", "127.0.0.0/8", "DIRECT"),
    ("IP-CIDR", "172.16.0.0/12", "DIRECT"),
    ("IP-CIDR", "192.168.0.0/16", "DIRECT"),
    ("IP-CIDR", "10.0.0.0/8", "DIRECT"),
    ("IP-CIDR", "100.64.0.0/10", "DIRECT"),
    ("DOMAIN-SUFFIX", "cn", "DIRECT"),
    ("GEOIP", "CN", "DIRECT"),
];

fn baseline_lines() -> impl Iterator<Item = String> {
    BASELINE_RULES
        .iter()
        .map(|(kind, payload, target)| format!("{},{},{}", kind, payload, target))
}

/// Rules for the Clash `rules` list, ending with `MATCH,Proxy`.
pub fn clash_rules() -> Vec<String> {
    let mut rules: Vec<String> = baseline_lines().collect();
    rules.push(format!("MATCH,{}", PROXY_GROUP));
    rules
}

/// Rules for the Surge `[Rule]` section, ending with `FINAL,Proxy`.
pub fn surge_rules() -> Vec<String> {
    let mut rules: Vec<String> = baseline_lines().collect();
    rules.push(format!("FINAL,{}", PROXY_GROUP));
    rules
}

/// Rules for the Quantumult X `[filter_local]` section.
///
/// Quantumult X spells rule types and built-in policies in lowercase.
pub fn quanx_rules() -> Vec<String> {
    let mut rules: Vec<String> = BASELINE_RULES
        .iter()
        .map(|(kind, payload, _)| {
            let kind = match *kind {
                "DOMAIN-SUFFIX" => "host-suffix",
                "IP-CIDR" => "ip-cidr",
                "GEOIP" => "geoip",
                other => other,
            };
            format!("{}, {}, direct", kind, payload)
        })
        .collect();
    rules.push("final, proxy".to_string());
    rules
}
