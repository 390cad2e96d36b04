pub mod clash;
pub mod quanx;
pub mod shadowrocket;
pub mod single;
pub mod surge;
pub mod v2ray_json;

// Re-export all format converters
pub use clash::proxy_to_clash;
pub use quanx::proxy_to_quanx;
pub use shadowrocket::proxy_to_shadowrocket;
pub use single::proxy_to_single;
pub use surge::proxy_to_surge;
pub use v2ray_json::proxy_to_v2ray_json;
