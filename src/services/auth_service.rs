//! Authentication service
//!
//! Identity is resolved upstream; this service only checks the bearer token
//! and exposes its subject as the participant id.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, models::ParticipantId};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Participant id (email or user id)
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Verify JWT token and extract claims
    pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Resolve the participant a token speaks for
    pub fn participant_from_token(token: &str, secret: &str) -> AppResult<ParticipantId> {
        let claims = Self::verify_token(token, secret)?;
        ParticipantId::new(&claims.sub)
    }

    /// Issue a token for `participant`; used by tooling and tests
    pub fn issue_token(
        participant: &ParticipantId,
        secret: &str,
        valid_for: Duration,
    ) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: participant.to_string(),
            exp: (now + valid_for).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, test_utils::participant};

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let token = AuthService::issue_token(&participant("alice"), SECRET, Duration::hours(1))
            .unwrap();
        let resolved = AuthService::participant_from_token(&token, SECRET).unwrap();
        assert_eq!(resolved, participant("alice"));
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token = AuthService::issue_token(&participant("alice"), SECRET, Duration::hours(1))
            .unwrap();
        assert!(matches!(
            AuthService::verify_token(&token, "other-secret"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let token =
            AuthService::issue_token(&participant("alice"), SECRET, Duration::hours(-2)).unwrap();
        assert!(matches!(
            AuthService::verify_token(&token, SECRET),
            Err(AppError::Unauthorized)
        ));
    }
}
