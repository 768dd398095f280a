//! API Key generation
//!
//! Keys look like `hpx-16-<base36 millis>.<base64url 32 random bytes>`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::domain::api_key::{ApiKey, KEY_PREFIX};

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random bytes in the token segment
const KEY_BYTES: usize = 32;

/// Generator for unguessable, self-timestamped API keys
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiKeyGenerator;

impl ApiKeyGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a new API key stamped with the current time
    pub fn generate(&self) -> ApiKey {
        self.generate_at(Utc::now())
    }

    /// Generate a new API key stamped with `now`
    pub fn generate_at(&self, now: DateTime<Utc>) -> ApiKey {
        let mut random_bytes = [0u8; KEY_BYTES];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let token = URL_SAFE_NO_PAD.encode(&random_bytes);
        let stamp = to_base36(now.timestamp_millis().max(0) as u64);

        ApiKey::from_generated(format!("{}{}.{}", KEY_PREFIX, stamp, token))
    }
}

/// Lowercase base-36 rendering of an unsigned integer
fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(13);

    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }

    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;

    use super::*;
    use crate::domain::api_key::validate_api_key;

    #[test]
    fn test_generate_key_format() {
        let generator = ApiKeyGenerator::new();
        let key = generator.generate();

        assert!(key.as_str().starts_with("hpx-16-"));
        assert!(validate_api_key(key.as_str()).is_ok());
    }

    #[test]
    fn test_token_segment_length() {
        let key = ApiKeyGenerator::new().generate();
        let (_, token) = key.as_str().split_once('.').unwrap();

        // 32 bytes base64-encoded without padding = 43 chars
        assert_eq!(token.len(), 43);
        assert!(!token.contains('='));
        assert_eq!(URL_SAFE_NO_PAD.decode(token).unwrap().len(), KEY_BYTES);
    }

    #[test]
    fn test_embedded_timestamp() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let key = ApiKeyGenerator::new().generate_at(now);

        assert_eq!(key.timestamp_segment(), to_base36(1_700_000_000_123));
        assert_eq!(key.issued_at_millis(), Some(1_700_000_000_123));
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_295), "zz");

        for value in [1u64, 1_700_000_000_123, u64::MAX] {
            assert_eq!(u64::from_str_radix(&to_base36(value), 36).unwrap(), value);
        }
    }

    #[test]
    fn test_key_uniqueness() {
        let generator = ApiKeyGenerator::new();
        let mut seen = HashSet::new();

        for _ in 0..10_000 {
            let key = generator.generate();
            assert!(validate_api_key(key.as_str()).is_ok());
            assert!(seen.insert(String::from(key)));
        }

        assert_eq!(seen.len(), 10_000);
    }
}
