//! API key entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_api_key, ApiKeyValidationError, KEY_PREFIX};

/// Store-assigned record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyRecordId(i64);

impl ApiKeyRecordId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ApiKeyRecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A well-formed API key string
///
/// Construction goes through [`validate_api_key`], so holding an `ApiKey`
/// means the key has already passed the structural check.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiKey(String);

impl ApiKey {
    /// Parse and validate a key string
    pub fn parse(key: impl Into<String>) -> Result<Self, ApiKeyValidationError> {
        let key = key.into();
        validate_api_key(&key)?;
        Ok(Self(key))
    }

    /// Wrap a key produced by the generator, which always emits the key pattern
    pub(crate) fn from_generated(key: String) -> Self {
        debug_assert!(validate_api_key(&key).is_ok());
        Self(key)
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The base-36 timestamp segment between the prefix and the dot
    pub fn timestamp_segment(&self) -> &str {
        let rest = &self.0[KEY_PREFIX.len()..];
        rest.split_once('.').map(|(stamp, _)| stamp).unwrap_or(rest)
    }

    /// Millisecond Unix timestamp embedded in the key, if it fits in an i64
    pub fn issued_at_millis(&self) -> Option<i64> {
        i64::from_str_radix(self.timestamp_segment(), 36).ok()
    }

    /// Short form safe for logs
    pub fn redacted(&self) -> String {
        format!("{}{}.***", KEY_PREFIX, self.timestamp_segment())
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&self.redacted()).finish()
    }
}

impl TryFrom<String> for ApiKey {
    type Error = ApiKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ApiKey> for String {
    fn from(key: ApiKey) -> Self {
        key.0
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyStatus {
    /// Key passes validation
    #[default]
    Active,
    /// Key is stored but rejected by validation
    Inactive,
}

impl ApiKeyStatus {
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::str::FromStr for ApiKeyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!("unknown API key status '{}'", other)),
        }
    }
}

/// Persisted API key with its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    id: ApiKeyRecordId,
    key: ApiKey,
    status: ApiKeyStatus,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
}

impl ApiKeyRecord {
    /// Create a freshly inserted record
    pub fn new(id: ApiKeyRecordId, key: ApiKey, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            key,
            status: ApiKeyStatus::Active,
            created_at,
            last_used_at: None,
        }
    }

    /// Rebuild a record from persisted state
    pub fn restore(
        id: ApiKeyRecordId,
        key: ApiKey,
        status: ApiKeyStatus,
        created_at: DateTime<Utc>,
        last_used_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            key,
            status,
            created_at,
            last_used_at,
        }
    }

    pub fn id(&self) -> ApiKeyRecordId {
        self.id
    }

    pub fn key(&self) -> &ApiKey {
        &self.key
    }

    pub fn status(&self) -> ApiKeyStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        self.last_used_at
    }

    pub fn is_active(&self) -> bool {
        self.status.is_usable()
    }

    /// Record a successful validation at `at`
    ///
    /// The stamp never precedes creation or the previous use.
    pub fn record_usage_at(&mut self, at: DateTime<Utc>) -> DateTime<Utc> {
        let floor = self.last_used_at.unwrap_or(self.created_at).max(self.created_at);
        let used = at.max(floor);
        self.last_used_at = Some(used);
        used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key() -> ApiKey {
        ApiKey::parse("hpx-16-lq2x9z4k.AbCd_xyz-123").unwrap()
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            ApiKey::parse("not-a-key"),
            Err(ApiKeyValidationError::InvalidFormat)
        );
        assert_eq!(ApiKey::parse(""), Err(ApiKeyValidationError::Missing));
    }

    #[test]
    fn test_timestamp_segment() {
        let key = key();
        assert_eq!(key.timestamp_segment(), "lq2x9z4k");
        assert_eq!(
            key.issued_at_millis(),
            Some(i64::from_str_radix("lq2x9z4k", 36).unwrap())
        );
    }

    #[test]
    fn test_debug_is_redacted() {
        let debug = format!("{:?}", key());
        assert!(debug.contains("hpx-16-lq2x9z4k.***"));
        assert!(!debug.contains("AbCd"));
    }

    #[test]
    fn test_serde_validates() {
        let json = serde_json::to_string(&key()).unwrap();
        assert_eq!(json, "\"hpx-16-lq2x9z4k.AbCd_xyz-123\"");

        let bad: Result<ApiKey, _> = serde_json::from_str("\"hpx-16-\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!("active".parse::<ApiKeyStatus>(), Ok(ApiKeyStatus::Active));
        assert_eq!(
            "inactive".parse::<ApiKeyStatus>(),
            Ok(ApiKeyStatus::Inactive)
        );
        assert!("aktif".parse::<ApiKeyStatus>().is_err());
        assert_eq!(ApiKeyStatus::default(), ApiKeyStatus::Active);
    }

    #[test]
    fn test_new_record_defaults() {
        let now = Utc::now();
        let record = ApiKeyRecord::new(ApiKeyRecordId::new(1), key(), now);

        assert!(record.is_active());
        assert_eq!(record.created_at(), now);
        assert!(record.last_used_at().is_none());
    }

    #[test]
    fn test_usage_never_precedes_creation() {
        let now = Utc::now();
        let mut record = ApiKeyRecord::new(ApiKeyRecordId::new(1), key(), now);

        let used = record.record_usage_at(now - Duration::seconds(5));
        assert_eq!(used, now);
        assert_eq!(record.last_used_at(), Some(now));

        let later = now + Duration::seconds(5);
        assert_eq!(record.record_usage_at(later), later);
    }

    #[test]
    fn test_usage_never_moves_backwards() {
        let now = Utc::now();
        let previous = now + Duration::minutes(10);
        let mut record = ApiKeyRecord::restore(
            ApiKeyRecordId::new(1),
            key(),
            ApiKeyStatus::Active,
            now - Duration::hours(1),
            Some(previous),
        );

        assert_eq!(record.record_usage_at(now), previous);
        assert_eq!(record.last_used_at(), Some(previous));

        let later = previous + Duration::seconds(1);
        assert_eq!(record.record_usage_at(later), later);
    }
}
