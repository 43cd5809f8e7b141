use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session token captured from the Fit3D dashboard login flow.
/// The dashboard does not report an expiry; the records endpoint answers
/// 401 once the token has gone stale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionToken {
    pub token: String,
    pub captured_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            captured_at: Utc::now(),
        }
    }

    /// Returns the Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Seconds since the token was captured.
    pub fn age_seconds(&self) -> i64 {
        (Utc::now() - self.captured_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_header() {
        let token = SessionToken::new("abc123");
        assert_eq!(token.authorization_header(), "Bearer abc123");
    }

    #[test]
    fn test_age_is_non_negative() {
        let token = SessionToken::new("abc123");
        assert!(token.age_seconds() >= 0);
    }

    #[test]
    fn test_serialization_round_trip() {
        let token = SessionToken::new("abc123");
        let json = serde_json::to_string(&token).unwrap();
        let deserialized: SessionToken = serde_json::from_str(&json).unwrap();
        assert_eq!(token, deserialized);
    }
}
