pub mod base64;
pub mod string;
pub mod url;

// Re-export common utilities
#[cfg(test)]
pub use base64::base64_decode;
pub use base64::{base64_encode, url_safe_base64_encode};
pub use string::{contains_ignore_case, sanitize_remark, PluginOptions};
pub use url::{url_decode, url_encode, QueryBuilder};
