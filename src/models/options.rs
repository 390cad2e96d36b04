//! Conversion options supplied alongside a node list

use std::collections::{BTreeSet, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::models::ProxyType;
use crate::utils::url::url_decode;

/// Node selection applied before renaming and sorting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeFilter {
    /// Keep only these types; empty keeps every type.
    pub types: BTreeSet<ProxyType>,
    /// Keep a node if any keyword occurs in its name or server.
    pub keywords: Vec<String>,
    /// Drop a node if any keyword occurs in its name or server.
    pub exclude_keywords: Vec<String>,
}

/// A single regex rename rule, applied to node names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameRule {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Type,
    /// Accepted for compatibility; no latency data is available so order is kept.
    Latency,
}

impl SortKey {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Some(SortKey::Name),
            "type" => Some(SortKey::Type),
            "latency" => Some(SortKey::Latency),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Type,
    Region,
}

impl GroupBy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "type" => Some(GroupBy::Type),
            "region" => Some(GroupBy::Region),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupingOptions {
    pub enabled: bool,
    pub group_by: GroupBy,
}

/// Options for a single conversion call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionOptions {
    pub filter: NodeFilter,
    pub rename: Vec<RenameRule>,
    pub sort: Option<SortKey>,
    pub grouping: GroupingOptions,
    /// Overrides the per-format default filename.
    pub filename: Option<String>,
}

impl ConversionOptions {
    /// Build options from decoded query parameters.
    ///
    /// `types`, `include` and `exclude` are comma-separated lists, `rename` is a
    /// JSON array of `{pattern, replacement}` objects, `group` is a boolean and
    /// `sort` / `groupBy` are enum strings. Unknown keys are ignored.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self> {
        let mut options = ConversionOptions::default();

        if let Some(types) = params.get("types") {
            for item in split_list(types) {
                let proxy_type = ProxyType::from_str(&item)
                    .ok_or_else(|| invalid_option("types", &item))?;
                options.filter.types.insert(proxy_type);
            }
        }
        if let Some(include) = params.get("include") {
            options.filter.keywords = split_list(include);
        }
        if let Some(exclude) = params.get("exclude") {
            options.filter.exclude_keywords = split_list(exclude);
        }
        if let Some(rename) = params.get("rename").filter(|s| !s.trim().is_empty()) {
            options.rename = serde_json::from_str(rename)
                .or_else(|_| serde_json::from_str(&url_decode(rename)))
                .map_err(|_| invalid_option("rename", rename))?;
        }
        if let Some(sort) = params.get("sort").filter(|s| !s.trim().is_empty()) {
            options.sort = Some(SortKey::from_str(sort).ok_or_else(|| invalid_option("sort", sort))?);
        }
        if let Some(group) = params.get("group") {
            options.grouping.enabled = parse_bool(group).ok_or_else(|| invalid_option("group", group))?;
        }
        if let Some(group_by) = params.get("groupBy").filter(|s| !s.trim().is_empty()) {
            options.grouping.group_by =
                GroupBy::from_str(group_by).ok_or_else(|| invalid_option("groupBy", group_by))?;
        }
        if let Some(filename) = params.get("filename").filter(|s| !s.trim().is_empty()) {
            // quoted into Content-Disposition as is
            if filename.chars().any(|c| c == '"' || c == '\\' || c.is_control()) {
                return Err(invalid_option("filename", filename));
            }
            options.filename = Some(filename.trim().to_string());
        }

        debug!("Parsed conversion options: {:?}", options);
        Ok(options)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn invalid_option(name: &str, value: &str) -> ConvertError {
    ConvertError::InvalidOption {
        name: name.to_string(),
        value: value.to_string(),
    }
}
