/// Session token claims
///
/// The payload of a session token: who the subject is, who issued the
/// token, and the window in which it is accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject account identifier
    pub user_id: String,
    /// Subject email
    pub email: String,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Build claims issued at `now` and valid for `lifetime_seconds`
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        issuer: impl Into<String>,
        now: DateTime<Utc>,
        lifetime_seconds: i64,
    ) -> Self {
        let iat = now.timestamp();
        Self {
            user_id: user_id.into(),
            email: email.into(),
            iat,
            exp: iat + lifetime_seconds,
            iss: issuer.into(),
        }
    }

    /// A token is expired from the `exp` second onwards
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Clock, FixedClock};

    #[test]
    fn test_claims_creation() {
        let now = FixedClock::at_timestamp(1_000).now();
        let claims = Claims::new("abc", "ann@x.com", "user-api", now, 3600);

        assert_eq!(claims.user_id, "abc");
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.iss, "user-api");
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 4_600);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let claims = Claims::new("abc", "ann@x.com", "user-api", FixedClock::at_timestamp(0).now(), 10);

        assert!(!claims.is_expired_at(FixedClock::at_timestamp(9).now()));
        assert!(claims.is_expired_at(FixedClock::at_timestamp(10).now()));
        assert!(claims.is_expired_at(FixedClock::at_timestamp(11).now()));
    }

    #[test]
    fn test_wire_field_names() {
        let claims = Claims::new("abc", "ann@x.com", "user-api", FixedClock::at_timestamp(5).now(), 1);
        let json = serde_json::to_value(&claims).unwrap();

        for field in ["user_id", "email", "iat", "exp", "iss"] {
            assert!(json.get(field).is_some(), "missing claim {}", field);
        }
    }
}
