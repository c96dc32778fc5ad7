//! Signed access/refresh token pairs (HS256).
//!
//! Access tokens are short-lived and carry the identity claims the clients
//! display (username, avatar). Refresh tokens carry only the subject and
//! are only accepted by [`TokenService::decode_refresh`].

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Present on access tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub user_profile_picture: Option<Option<String>>,
    pub token_type: TokenType,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

// Distinguishes an absent claim (`None`) from an explicit `null` (`Some(None)`).
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Identity embedded in issued tokens.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub username: String,
    /// Outer `None` leaves the claim out entirely (profile pictures
    /// disabled); inner `None` serializes as `null`.
    pub profile_picture_url: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: impl Into<String>, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    pub fn issue(&self, subject: &TokenSubject) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access: self.sign(subject, TokenType::Access, self.access_ttl_secs)?,
            refresh: self.sign(subject, TokenType::Refresh, self.refresh_ttl_secs)?,
        })
    }

    pub fn issue_access(&self, subject: &TokenSubject) -> AppResult<String> {
        self.sign(subject, TokenType::Access, self.access_ttl_secs)
    }

    /// Validates an access token. Any failure is `Unauthorized`.
    pub fn decode_access(&self, token: &str) -> AppResult<Claims> {
        match self.decode(token) {
            Some(claims) if claims.token_type == TokenType::Access => Ok(claims),
            _ => Err(AppError::Unauthorized),
        }
    }

    /// Validates a refresh token. Any failure is `InvalidToken`.
    pub fn decode_refresh(&self, token: &str) -> AppResult<Claims> {
        match self.decode(token) {
            Some(claims) if claims.token_type == TokenType::Refresh => Ok(claims),
            _ => Err(AppError::InvalidToken),
        }
    }

    fn sign(&self, subject: &TokenSubject, token_type: TokenType, ttl_secs: i64) -> AppResult<String> {
        let now = chrono::Utc::now().timestamp();
        // Refresh tokens carry identity only; display claims are reloaded on refresh.
        let (username, user_profile_picture) = match token_type {
            TokenType::Access => (
                Some(subject.username.clone()),
                subject.profile_picture_url.clone(),
            ),
            TokenType::Refresh => (None, None),
        };
        let claims = Claims {
            sub: subject.user_id.to_string(),
            username,
            user_profile_picture,
            token_type,
            iat: now.max(0) as usize,
            exp: (now + ttl_secs).max(0) as usize,
            jti: Uuid::new_v4().simple().to_string(),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("token signing failed: {e}")))
    }

    fn decode(&self, token: &str) -> Option<Claims> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        match jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => Some(data.claims),
            Err(err) => {
                tracing::debug!(error = %err, "token_rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: Uuid::new_v4(),
            username: "alice".into(),
            profile_picture_url: Some(None),
        }
    }

    #[test]
    fn access_token_round_trips_identity() {
        let svc = TokenService::new("test-secret", 300, 3600);
        let subject = subject();
        let pair = svc.issue(&subject).unwrap();

        let claims = svc.decode_access(&pair.access).unwrap();
        assert_eq!(claims.user_id(), Some(subject.user_id));
        assert_eq!(claims.username.as_deref(), Some("alice"));
        assert_eq!(claims.user_profile_picture, Some(None));
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let svc = TokenService::new("test-secret", 300, 3600);
        let pair = svc.issue(&subject()).unwrap();

        assert!(matches!(
            svc.decode_access(&pair.refresh),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            svc.decode_refresh(&pair.access),
            Err(AppError::InvalidToken)
        ));
        assert!(svc.decode_refresh(&pair.refresh).is_ok());
    }

    #[test]
    fn refresh_token_carries_identity_only() {
        let svc = TokenService::new("test-secret", 300, 3600);
        let subject = TokenSubject {
            profile_picture_url: Some(Some("http://localhost/a.png".into())),
            ..subject()
        };
        let pair = svc.issue(&subject).unwrap();

        let claims = svc.decode_refresh(&pair.refresh).unwrap();
        assert_eq!(claims.user_id(), Some(subject.user_id));
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert!(claims.username.is_none());
        assert!(claims.user_profile_picture.is_none());
        assert!(!claims.jti.is_empty());

        let payload = pair.refresh.split('.').nth(1).unwrap();
        let claims = svc.decode_access(&pair.access).unwrap();
        assert_eq!(
            claims.user_profile_picture,
            Some(Some("http://localhost/a.png".into()))
        );
        assert!(payload.len() < pair.access.split('.').nth(1).unwrap().len());
    }

    #[test]
    fn rejects_foreign_signature_and_garbage() {
        let svc = TokenService::new("test-secret", 300, 3600);
        let other = TokenService::new("other-secret", 300, 3600);
        let pair = other.issue(&subject()).unwrap();

        assert!(svc.decode_access(&pair.access).is_err());
        assert!(svc.decode_refresh("not.a.token").is_err());
        assert!(svc.decode_access("").is_err());
    }

    #[test]
    fn rejects_expired_tokens() {
        let svc = TokenService::new("test-secret", -120, -120);
        let pair = svc.issue(&subject()).unwrap();

        assert!(svc.decode_access(&pair.access).is_err());
        assert!(matches!(
            svc.decode_refresh(&pair.refresh),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn omits_avatar_claim_when_disabled() {
        let svc = TokenService::new("test-secret", 300, 3600);
        let subject = TokenSubject {
            profile_picture_url: None,
            ..subject()
        };
        let access = svc.issue_access(&subject).unwrap();
        let claims = svc.decode_access(&access).unwrap();
        assert_eq!(claims.user_profile_picture, None);
    }
}
