pub mod config;
pub mod node_manip;
pub mod yaml;

// Re-export common types
pub use config::subexport::SkippedNode;

// Re-export format converters
pub use config::formats::{
    proxy_to_clash, proxy_to_quanx, proxy_to_shadowrocket, proxy_to_single, proxy_to_surge,
    proxy_to_v2ray_json,
};

// Re-export node manipulation functions
pub use node_manip::{filter_nodes, node_rename, preprocess_nodes, sort_nodes};
