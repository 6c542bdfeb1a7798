//! Identity claims carried in tokens.
//!
//! The serialized field layout (`exp`, `iat`, `id`, `iss`, RFC 3339
//! timestamps) is the token payload format and must stay stable.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::Clock;

/// Issuer written into and required of every token.
pub const ISSUER: &str = "tooxoot";

/// Lifetime of freshly issued claims.
pub const TOKEN_LIFETIME: Duration = Duration::hours(24);

/// Tolerated clock skew for both expiry and issuance checks.
pub const CLOCK_SKEW: Duration = Duration::minutes(5);

/// Seconds from the Unix epoch back to `0001-01-01T00:00:00Z`.
const ZERO_TIME_SECS: i64 = -62_135_596_800;

/// Semantic validation failures, reported in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimsError {
    #[error("Issuer must be tooxoot")]
    IssuerMismatch,

    #[error("Token is expired")]
    Expired,

    #[error("Token is issued in the future")]
    IssuedInFuture,

    #[error("Token's ID is empty")]
    EmptySubject,
}

impl ClaimsError {
    /// Stable numeric code for the failed rule.
    pub fn code(&self) -> u32 {
        match self {
            Self::IssuerMismatch => 1,
            Self::Expired => 2,
            Self::IssuedInFuture => 3,
            Self::EmptySubject => 4,
        }
    }
}

/// Claims asserting the identity of a token holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Claims {
    /// Expiry instant.
    pub exp: DateTime<Utc>,
    /// Issued-at instant.
    pub iat: DateTime<Utc>,
    /// Subject identity; references a credential record id.
    pub id: String,
    /// Issuer.
    pub iss: String,
}

impl Default for Claims {
    fn default() -> Self {
        Self {
            exp: zero_time(),
            iat: zero_time(),
            id: String::new(),
            iss: String::new(),
        }
    }
}

impl Claims {
    /// Issue claims for `id`, valid for [`TOKEN_LIFETIME`] from now.
    ///
    /// Returns `None` for an empty id.
    pub fn new(id: &str, clock: &dyn Clock) -> Option<Self> {
        if id.is_empty() {
            return None;
        }

        let now = clock.now();
        Some(Self {
            exp: now + TOKEN_LIFETIME,
            iat: now,
            id: id.to_string(),
            iss: ISSUER.to_string(),
        })
    }

    /// Check issuer, expiry, issuance skew and subject, in that order.
    ///
    /// The first failing rule is returned.
    pub fn validate(&self, clock: &dyn Clock) -> Result<(), ClaimsError> {
        let now = clock.now();

        if self.iss != ISSUER {
            return Err(ClaimsError::IssuerMismatch);
        }

        if self.exp < now - CLOCK_SKEW {
            return Err(ClaimsError::Expired);
        }

        if self.iat > now + CLOCK_SKEW {
            return Err(ClaimsError::IssuedInFuture);
        }

        if self.id.is_empty() {
            return Err(ClaimsError::EmptySubject);
        }

        Ok(())
    }
}

/// The zero instant, `0001-01-01T00:00:00Z`.
fn zero_time() -> DateTime<Utc> {
    DateTime::from_timestamp(ZERO_TIME_SECS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn test_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-15T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn clock() -> FixedClock {
        FixedClock(test_time())
    }

    #[test]
    fn default_claims_serialize_with_zero_values() {
        let json = serde_json::to_string(&Claims::default()).unwrap();
        assert_eq!(
            json,
            r#"{"exp":"0001-01-01T00:00:00Z","iat":"0001-01-01T00:00:00Z","id":"","iss":""}"#
        );
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let claims: Claims = serde_json::from_str(r#"{"id":"SomeID"}"#).unwrap();
        assert_eq!(claims.id, "SomeID");
        assert_eq!(claims.iss, "");
        assert_eq!(claims.exp, Claims::default().exp);
    }

    #[test]
    fn new_sets_lifetime_and_issuer() {
        let claims = Claims::new("SomeID", &clock()).expect("claims for non-empty id");
        assert_eq!(claims.iat, test_time());
        assert_eq!(claims.exp, test_time() + Duration::hours(24));
        assert_eq!(claims.id, "SomeID");
        assert_eq!(claims.iss, "tooxoot");
    }

    #[test]
    fn new_rejects_empty_id() {
        assert!(Claims::new("", &clock()).is_none());
    }

    #[test]
    fn default_claims_fail_on_issuer_first() {
        let err = Claims::default().validate(&clock()).unwrap_err();
        assert_eq!(err, ClaimsError::IssuerMismatch);
        assert_eq!(err.to_string(), "Issuer must be tooxoot");
        assert_eq!(err.code(), 1);
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let mut claims = Claims::new("SomeID", &clock()).unwrap();
        claims.iss = "notTooxoot".to_string();
        assert_eq!(claims.validate(&clock()), Err(ClaimsError::IssuerMismatch));
    }

    #[test]
    fn expiry_tolerates_five_minutes() {
        let mut claims = Claims::new("SomeID", &clock()).unwrap();

        claims.exp = test_time() - Duration::minutes(6);
        let err = claims.validate(&clock()).unwrap_err();
        assert_eq!(err.to_string(), "Token is expired");
        assert_eq!(err.code(), 2);

        claims.exp = test_time() - Duration::minutes(4);
        assert!(claims.validate(&clock()).is_ok());
    }

    #[test]
    fn issuance_tolerates_five_minutes() {
        let mut claims = Claims::new("SomeID", &clock()).unwrap();

        claims.iat = test_time() + Duration::minutes(6);
        let err = claims.validate(&clock()).unwrap_err();
        assert_eq!(err.to_string(), "Token is issued in the future");
        assert_eq!(err.code(), 3);

        claims.iat = test_time() + Duration::minutes(4);
        assert!(claims.validate(&clock()).is_ok());
    }

    #[test]
    fn empty_subject_is_rejected() {
        let mut claims = Claims::new("SomeID", &clock()).unwrap();
        claims.id = String::new();
        let err = claims.validate(&clock()).unwrap_err();
        assert_eq!(err.to_string(), "Token's ID is empty");
        assert_eq!(err.code(), 4);
    }

    #[test]
    fn expiry_is_checked_before_issuance() {
        let mut claims = Claims::new("SomeID", &clock()).unwrap();
        claims.exp = test_time() - Duration::hours(1);
        claims.iat = test_time() + Duration::hours(1);
        claims.id = String::new();
        assert_eq!(claims.validate(&clock()), Err(ClaimsError::Expired));
    }

    #[test]
    fn fresh_claims_validate() {
        let claims = Claims::new("SomeID", &clock()).unwrap();
        assert!(claims.validate(&clock()).is_ok());
    }

    #[test]
    fn claims_expire_after_lifetime_plus_skew() {
        let claims = Claims::new("SomeID", &clock()).unwrap();
        let later = FixedClock(test_time() + TOKEN_LIFETIME + Duration::minutes(6));
        assert_eq!(claims.validate(&later), Err(ClaimsError::Expired));
    }
}
