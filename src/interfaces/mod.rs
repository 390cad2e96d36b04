pub mod subconverter;

pub use subconverter::{
    convert_nodes, get_format_info, get_supported_formats, is_format_supported, ConversionResult,
};
