//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3}\.){3}\d{1,3}$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SERVER_PORT" => {
            let v: u32 = value.parse().map_err(|_| "must be an integer")?;
            if !(1..=65535).contains(&v) {
                return Err("must be between 1 and 65535".into());
            }
        }
        "BIND_ADDRESS" => {
            if value != "localhost" && !RE_IPV4.is_match(value) {
                return Err("must be an IPv4 address or 'localhost'".into());
            }
        }
        "SYNC_BROADCAST" => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_setting;

    #[test]
    fn server_port_accepts_valid_range() {
        assert!(validate_setting("SERVER_PORT", "8080").is_ok());
        assert!(validate_setting("SERVER_PORT", "1").is_ok());
        assert!(validate_setting("SERVER_PORT", "65535").is_ok());
    }

    #[test]
    fn server_port_rejects_invalid() {
        assert!(validate_setting("SERVER_PORT", "0").is_err());
        assert!(validate_setting("SERVER_PORT", "65536").is_err());
        assert!(validate_setting("SERVER_PORT", "http").is_err());
    }

    #[test]
    fn bind_address_accepts_ipv4_and_localhost() {
        assert!(validate_setting("BIND_ADDRESS", "0.0.0.0").is_ok());
        assert!(validate_setting("BIND_ADDRESS", "127.0.0.1").is_ok());
        assert!(validate_setting("BIND_ADDRESS", "localhost").is_ok());
        assert!(validate_setting("BIND_ADDRESS", "example.com").is_err());
    }

    #[test]
    fn sync_broadcast_is_boolean() {
        assert!(validate_setting("SYNC_BROADCAST", "true").is_ok());
        assert!(validate_setting("SYNC_BROADCAST", "false").is_ok());
        assert!(validate_setting("SYNC_BROADCAST", "yes").is_err());
    }
}
