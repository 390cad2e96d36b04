//! Core data models for the application
//!
//! This module contains the primary data structures used throughout the application,
//! separated from the logic that operates on them.
//!
//! # Usage
//!
//! Nodes are usually loaded from JSON supplied by the storage layer:
//!
//! ```rust
//! use nodesub::models::{ProxyNode, ProxyType};
//!
//! let node: ProxyNode = serde_json::from_str(
//!     r#"{"id":1,"name":"HK-01","type":"vless","server":"a.com","port":443,"uuid":"u1"}"#,
//! )
//! .unwrap();
//! assert_eq!(node.proxy_type(), ProxyType::Vless);
//! ```
//!
//! Or built directly:
//!
//! ```rust
//! use nodesub::models::{ProxyConfig, ProxyNode, ShadowsocksConfig};
//!
//! let node = ProxyNode::new(
//!     2,
//!     "SG-01",
//!     "b.com",
//!     8388,
//!     ProxyConfig::Shadowsocks(ShadowsocksConfig {
//!         method: "aes-256-gcm".to_string(),
//!         password: "secret".to_string(),
//!         plugin: None,
//!         plugin_opts: None,
//!     }),
//! );
//! assert!(node.enabled);
//! ```

mod deserializer;
pub mod options;
mod proxy;
pub mod target;

pub use options::{ConversionOptions, GroupBy, GroupingOptions, NodeFilter, RenameRule, SortKey};
pub use proxy::*;
pub use target::{FormatInfo, SubscriptionFormat};
