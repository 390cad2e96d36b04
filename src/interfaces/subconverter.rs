use log::{debug, info};
use serde::Serialize;

use crate::error::{ConvertError, Result};
use crate::generator::config::formats::{
    proxy_to_clash, proxy_to_quanx, proxy_to_shadowrocket, proxy_to_single, proxy_to_surge,
    proxy_to_v2ray_json,
};
use crate::generator::config::subexport::SkippedNode;
use crate::generator::node_manip::preprocess_nodes;
use crate::models::{ConversionOptions, FormatInfo, ProxyNode, SubscriptionFormat};

/// Result of a conversion, ready to be written out by the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// Converted content
    pub content: String,
    pub content_type: String,
    pub filename: String,
    /// Nodes dropped because the format cannot express their type
    pub skipped: Vec<SkippedNode>,
}

/// Convert a node list into a subscription document.
///
/// The format is resolved first so an unknown format fails before any work.
/// Nodes then go through the filter, rename and sort pipeline and are handed
/// to the format's emitter. The input slice is never modified.
///
/// # Errors
///
/// * [`ConvertError::UnsupportedFormat`] when `format` is not a known identifier
/// * [`ConvertError::MalformedRenameRule`] when a rename pattern does not compile
/// * [`ConvertError::Serialize`] when the YAML or JSON encoder fails
pub fn convert_nodes(
    nodes: &[ProxyNode],
    format: &str,
    options: &ConversionOptions,
) -> Result<ConversionResult> {
    let target = SubscriptionFormat::from_str(format)
        .ok_or_else(|| ConvertError::UnsupportedFormat(format.to_string()))?;

    info!(
        "Processing conversion of {} nodes to {}",
        nodes.len(),
        target.to_str()
    );

    let processed = preprocess_nodes(nodes, options)?;
    debug!("{} nodes left after preprocessing", processed.len());

    let mut skipped = Vec::new();
    let content = match target {
        SubscriptionFormat::V2Ray => proxy_to_single(&processed, &mut skipped)?,
        SubscriptionFormat::V2RayJson => proxy_to_v2ray_json(&processed, &mut skipped)?,
        SubscriptionFormat::Clash => proxy_to_clash(&processed, &options.grouping)?,
        SubscriptionFormat::Shadowrocket => proxy_to_shadowrocket(&processed, &mut skipped)?,
        SubscriptionFormat::QuantumultX => proxy_to_quanx(&processed, &mut skipped)?,
        SubscriptionFormat::Surge => proxy_to_surge(&processed, &mut skipped)?,
    };

    let filename = options
        .filename
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| target.default_filename());

    info!(
        "Generated {} ({} bytes, {} nodes skipped)",
        filename,
        content.len(),
        skipped.len()
    );

    Ok(ConversionResult {
        content,
        content_type: target.info().content_type.to_string(),
        filename,
        skipped,
    })
}

/// Canonical identifiers of every supported format
pub fn get_supported_formats() -> Vec<&'static str> {
    SubscriptionFormat::ALL.iter().map(|f| f.to_str()).collect()
}

/// Whether `format` is any accepted identifier, aliases included
pub fn is_format_supported(format: &str) -> bool {
    SubscriptionFormat::from_str(format).is_some()
}

pub fn get_format_info(format: &str) -> Option<FormatInfo> {
    SubscriptionFormat::from_str(format).map(|f| f.info())
}
