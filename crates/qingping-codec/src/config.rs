//! Decoder configuration and environment defaults.

/// What the decoder does with the trailing checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumPolicy {
    /// Accept frames without looking at the checksum (device-compatible)
    #[default]
    Ignore,
    /// Reject frames whose checksum is missing or wrong
    Verify,
}

/// Environment variable names
pub mod env_vars {
    /// `true`/`1` enables checksum verification
    pub const VERIFY_CHECKSUM: &str = "QINGPING_VERIFY_CHECKSUM";
}

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderConfig {
    pub checksum: ChecksumPolicy,
}

impl DecoderConfig {
    /// Strict mode: verify checksums.
    pub fn strict() -> Self {
        Self {
            checksum: ChecksumPolicy::Verify,
        }
    }

    /// Read settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let verify = std::env::var(env_vars::VERIFY_CHECKSUM)
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false);

        Self {
            checksum: if verify {
                ChecksumPolicy::Verify
            } else {
                ChecksumPolicy::Ignore
            },
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ignores_checksum() {
        assert_eq!(DecoderConfig::default().checksum, ChecksumPolicy::Ignore);
        assert_eq!(DecoderConfig::strict().checksum, ChecksumPolicy::Verify);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 1 "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
