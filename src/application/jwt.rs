use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    #[serde(default)]
    pub admin: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Tokens are normally minted by the identity service; this is used by tooling and tests.
pub fn issue(user_id: Uuid, admin: bool, secret: &SecretString, ttl: Duration) -> AppResult<String> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let exp = now + ttl.whole_seconds();
    let claims = Claims {
        sub: user_id.to_string(),
        admin,
        iat: now,
        exp,
    };
    let header = Header::new(Algorithm::HS256);
    encode(
        &header,
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify(token: &str, secret: &SecretString) -> AppResult<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Token verification failed");
        AppError::InvalidCredentials
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::new("test-secret-key-for-jwt".into())
    }

    #[test]
    fn issued_token_verifies() {
        let user_id = Uuid::new_v4();
        let token = issue(user_id, false, &secret(), Duration::hours(1)).unwrap();

        let claims = verify(&token, &secret()).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert!(!claims.admin);
    }

    #[test]
    fn admin_flag_is_carried() {
        let token = issue(Uuid::new_v4(), true, &secret(), Duration::hours(1)).unwrap();
        assert!(verify(&token, &secret()).unwrap().admin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue(Uuid::new_v4(), false, &secret(), Duration::hours(1)).unwrap();
        let other = SecretString::new("another-secret".into());
        assert!(matches!(
            verify(&token, &other),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue(Uuid::new_v4(), false, &secret(), Duration::hours(-2)).unwrap();
        assert!(matches!(
            verify(&token, &secret()),
            Err(AppError::InvalidCredentials)
        ));
    }
}
