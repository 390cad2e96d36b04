use base64::{engine::general_purpose, Engine as _};

/// Standard padded Base64, used for v2ray and Shadowrocket subscription bodies
/// and VMess share payloads.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// SIP002 userinfo encoding: URL-safe alphabet, no padding.
pub fn url_safe_base64_encode(input: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(input)
}

/// Lossy decoder for checking generated links. Invalid input decodes to "".
#[cfg(test)]
pub fn base64_decode(input: &str, url_safe: bool) -> String {
    let decoded = if url_safe {
        general_purpose::URL_SAFE_NO_PAD.decode(input.trim_end_matches('='))
    } else {
        general_purpose::STANDARD.decode(input)
    };
    decoded
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_userinfo_encoding() {
        let encoded = base64_encode("aes-256-gcm:pass?word");
        assert_eq!(base64_decode(&encoded, false), "aes-256-gcm:pass?word");
        // "??>" is "Pz8+" in the standard alphabet
        assert_eq!(base64_encode("??>"), "Pz8+");
        assert_eq!(url_safe_base64_encode("??>"), "Pz8-");
        assert_eq!(url_safe_base64_encode("a"), "YQ");
        assert_eq!(base64_decode("YQ", true), "a");
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(base64_decode("***", false), "");
    }
}
