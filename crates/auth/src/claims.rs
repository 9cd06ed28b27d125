use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{PrincipalId, Role};

/// JWT claims model (transport-agnostic).
///
/// The minimal set of claims the pipeline expects once a token has been
/// decoded and its signature verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Roles granted to the principal.
    pub roles: Vec<Role>,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Token-level failure, by named kind so the classifier can report which.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// is the validator's job.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenError::Malformed(
            "invalid time window (expires_at <= issued_at)".to_string(),
        ));
    }
    if now < claims.issued_at {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(issued_offset_mins: i64, ttl_mins: i64, now: DateTime<Utc>) -> JwtClaims {
        let issued_at = now + Duration::minutes(issued_offset_mins);
        JwtClaims {
            sub: PrincipalId::new(),
            roles: vec![Role::new("admin")],
            issued_at,
            expires_at: issued_at + Duration::minutes(ttl_mins),
        }
    }

    #[test]
    fn accepts_claims_inside_window() {
        let now = Utc::now();
        assert!(validate_claims(&claims(-5, 10, now), now).is_ok());
    }

    #[test]
    fn rejects_expired_claims() {
        let now = Utc::now();
        assert_eq!(
            validate_claims(&claims(-20, 10, now), now),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn rejects_future_claims() {
        let now = Utc::now();
        assert_eq!(
            validate_claims(&claims(5, 10, now), now),
            Err(TokenError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_window_as_malformed() {
        let now = Utc::now();
        let c = claims(-5, -10, now);
        assert!(matches!(
            validate_claims(&c, now),
            Err(TokenError::Malformed(_))
        ));
    }
}
