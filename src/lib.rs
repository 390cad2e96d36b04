pub mod error;
pub mod generator;
pub mod interfaces;
pub mod models;
pub mod settings;
pub mod store;
pub mod utils;

#[cfg(feature = "web-api")]
pub mod web_handlers;

// Re-export the main types for easier access
pub use error::{ConvertError, Result};
pub use interfaces::{convert_nodes, ConversionResult};
pub use models::{ConversionOptions, ProxyNode, ProxyType, SubscriptionFormat};
pub use settings::Settings;
