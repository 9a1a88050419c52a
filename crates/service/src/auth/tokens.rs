//! HS256 JWTs for sessions and email verification links.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::AuthUser;
use super::errors::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenPurpose {
    Session,
    VerifyEmail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub purpose: TokenPurpose,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

pub fn issue(secret: &str, user: &AuthUser, purpose: TokenPurpose, ttl: Duration) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        purpose,
        iat: now.timestamp() as usize,
        exp: (now + ttl).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Decode and check signature, expiry and purpose.
pub fn verify(secret: &str, token: &str, purpose: TokenPurpose) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| AuthError::TokenError(e.to_string()))?;
    if data.claims.purpose != purpose {
        return Err(AuthError::TokenError("token purpose mismatch".into()));
    }
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser { id: Uuid::new_v4(), email: "a@b.com".into(), name: "A".into(), email_verified_at: None }
    }

    #[test]
    fn issue_then_verify() {
        let u = user();
        let token = issue("secret", &u, TokenPurpose::Session, Duration::hours(1)).unwrap();
        let claims = verify("secret", &token, TokenPurpose::Session).unwrap();
        assert_eq!(claims.user_id().unwrap(), u.id);
        assert_eq!(claims.email, "a@b.com");
    }

    #[test]
    fn wrong_secret_or_purpose_rejected() {
        let token = issue("secret", &user(), TokenPurpose::VerifyEmail, Duration::hours(1)).unwrap();
        assert!(verify("other", &token, TokenPurpose::VerifyEmail).is_err());
        assert!(verify("secret", &token, TokenPurpose::Session).is_err());
    }

    #[test]
    fn expired_token_rejected() {
        // past the default 60s leeway
        let token = issue("secret", &user(), TokenPurpose::Session, Duration::minutes(-5)).unwrap();
        assert!(matches!(verify("secret", &token, TokenPurpose::Session), Err(AuthError::TokenError(_))));
    }
}
