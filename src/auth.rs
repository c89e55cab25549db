// src/auth.rs
//
// Password hashing and bearer-token issuance/verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::Role,
};

/// Argon2id digest in PHC string form.
pub fn hash_password(plain: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Storage(format!("password hashing failed: {e}")))
}

/// A malformed digest counts as a mismatch.
pub fn verify_password(plain: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

/// `hash_password` on the blocking pool.
pub async fn hash_password_blocking(plain: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| AppError::Storage(format!("password hashing task failed: {e}")))?
}

/// `verify_password` on the blocking pool. A failed task counts as a mismatch.
pub async fn verify_password_blocking(plain: String, digest: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&plain, &digest))
        .await
        .unwrap_or(false)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Identity decoded from a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64, role: Role) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Storage(format!("token encoding failed: {e}")))
    }

    pub fn verify(&self, token: &str) -> AppResult<AuthUser> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AppError::Authentication("invalid token".into()))?;
        let user_id = data
            .claims
            .sub
            .parse()
            .map_err(|_| AppError::Authentication("invalid token".into()))?;
        Ok(AuthUser { user_id, role: data.claims.role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let digest = hash_password("hunter22").unwrap();
        assert!(digest.starts_with("$argon2"));
        assert!(verify_password("hunter22", &digest));
        assert!(!verify_password("hunter23", &digest));
        assert!(!verify_password("hunter22", "not-a-phc-string"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blocking_pool_variants_agree_with_the_sync_ones() {
        let digest = hash_password_blocking("hunter22".into()).await.unwrap();
        assert!(verify_password("hunter22", &digest));
        assert!(verify_password_blocking("hunter22".into(), digest.clone()).await);
        assert!(!verify_password_blocking("hunter23".into(), digest).await);
    }

    #[test]
    fn token_carries_identity_and_role() {
        let issuer = TokenIssuer::new(b"test-secret", Duration::hours(1));
        let token = issuer.issue(42, Role::CsrRep).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), AuthUser { user_id: 42, role: Role::CsrRep });
    }

    #[test]
    fn foreign_or_expired_tokens_are_rejected() {
        let issuer = TokenIssuer::new(b"test-secret", Duration::hours(1));
        let other = TokenIssuer::new(b"other-secret", Duration::hours(1));
        let token = other.issue(1, Role::Admin).unwrap();
        assert!(matches!(issuer.verify(&token), Err(AppError::Authentication(_))));

        let expired = TokenIssuer::new(b"test-secret", Duration::hours(-1));
        let token = expired.issue(1, Role::Admin).unwrap();
        assert!(matches!(issuer.verify(&token), Err(AppError::Authentication(_))));

        assert!(issuer.verify("garbage").is_err());
    }
}
