use serde::Deserialize;

/// Accept either a comma-separated string or a list of strings.
///
/// Stored nodes carry `alpn` in both shapes, e.g. `"h2,http/1.1"` or
/// `["h2", "http/1.1"]`. Empty entries are dropped.
pub fn deserialize_string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrSeq {
        Single(String),
        Seq(Vec<String>),
        Null(()),
    }

    let items = match StringOrSeq::deserialize(deserializer)? {
        StringOrSeq::Single(s) => s.split(',').map(|item| item.trim().to_string()).collect(),
        StringOrSeq::Seq(v) => v.into_iter().map(|item| item.trim().to_string()).collect(),
        StringOrSeq::Null(()) => Vec::new(),
    };
    Ok(items
        .into_iter()
        .filter(|item: &String| !item.is_empty())
        .collect())
}
