use serde::Serialize;

/// Output formats a node list can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionFormat {
    V2Ray,
    V2RayJson,
    Clash,
    Shadowrocket,
    QuantumultX,
    Surge,
}

/// Discovery information for a format, as exposed by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub extension: &'static str,
    pub content_type: &'static str,
}

impl SubscriptionFormat {
    pub const ALL: [SubscriptionFormat; 6] = [
        SubscriptionFormat::V2Ray,
        SubscriptionFormat::V2RayJson,
        SubscriptionFormat::Clash,
        SubscriptionFormat::Shadowrocket,
        SubscriptionFormat::QuantumultX,
        SubscriptionFormat::Surge,
    ];

    /// Convert string to format enum, accepting the client aliases
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "v2ray" | "v2rayn" => Some(SubscriptionFormat::V2Ray),
            "v2ray-json" => Some(SubscriptionFormat::V2RayJson),
            "clash" | "clashx" => Some(SubscriptionFormat::Clash),
            "shadowrocket" => Some(SubscriptionFormat::Shadowrocket),
            "quantumult-x" | "quantumultx" => Some(SubscriptionFormat::QuantumultX),
            "surge" => Some(SubscriptionFormat::Surge),
            _ => None,
        }
    }

    /// Canonical identifier
    pub fn to_str(&self) -> &'static str {
        match self {
            SubscriptionFormat::V2Ray => "v2ray",
            SubscriptionFormat::V2RayJson => "v2ray-json",
            SubscriptionFormat::Clash => "clash",
            SubscriptionFormat::Shadowrocket => "shadowrocket",
            SubscriptionFormat::QuantumultX => "quantumult-x",
            SubscriptionFormat::Surge => "surge",
        }
    }

    pub fn info(&self) -> FormatInfo {
        match self {
            SubscriptionFormat::V2Ray => FormatInfo {
                name: "V2Ray",
                description: "Base64 encoded share link list for V2RayN and compatible clients",
                extension: "txt",
                content_type: "text/plain",
            },
            SubscriptionFormat::V2RayJson => FormatInfo {
                name: "V2Ray JSON",
                description: "V2Ray core configuration with routing rules",
                extension: "json",
                content_type: "application/json",
            },
            SubscriptionFormat::Clash => FormatInfo {
                name: "Clash",
                description: "Clash YAML configuration with proxy groups and rules",
                extension: "yaml",
                content_type: "text/yaml",
            },
            SubscriptionFormat::Shadowrocket => FormatInfo {
                name: "Shadowrocket",
                description: "Base64 encoded share link list for Shadowrocket",
                extension: "txt",
                content_type: "text/plain",
            },
            SubscriptionFormat::QuantumultX => FormatInfo {
                name: "Quantumult X",
                description: "Quantumult X configuration",
                extension: "conf",
                content_type: "text/plain",
            },
            SubscriptionFormat::Surge => FormatInfo {
                name: "Surge",
                description: "Surge configuration with proxy groups and rules",
                extension: "conf",
                content_type: "text/plain",
            },
        }
    }

    /// Filename used when the caller does not override it
    pub fn default_filename(&self) -> String {
        let stem = match self {
            SubscriptionFormat::V2RayJson => "v2ray",
            _ => self.to_str(),
        };
        format!("{}.{}", stem, self.info().extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_aliases() {
        assert_eq!(
            SubscriptionFormat::from_str("V2RayN"),
            Some(SubscriptionFormat::V2Ray)
        );
        assert_eq!(
            SubscriptionFormat::from_str("ClashX"),
            Some(SubscriptionFormat::Clash)
        );
        assert_eq!(
            SubscriptionFormat::from_str("quantumultx"),
            Some(SubscriptionFormat::QuantumultX)
        );
        assert_eq!(SubscriptionFormat::from_str("unknown-format"), None);
    }

    #[test]
    fn test_default_filenames() {
        assert_eq!(SubscriptionFormat::V2Ray.default_filename(), "v2ray.txt");
        assert_eq!(SubscriptionFormat::V2RayJson.default_filename(), "v2ray.json");
        assert_eq!(SubscriptionFormat::Clash.default_filename(), "clash.yaml");
        assert_eq!(
            SubscriptionFormat::QuantumultX.default_filename(),
            "quantumult-x.conf"
        );
    }

    #[test]
    fn test_round_trip_identifiers() {
        for format in SubscriptionFormat::ALL {
            assert_eq!(SubscriptionFormat::from_str(format.to_str()), Some(format));
        }
    }
}
