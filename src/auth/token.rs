//! Signed, time-bounded access tokens.
//!
//! Tokens are HS256 JWTs carrying the caller's email (`sub`), role, issue and
//! expiry timestamps. Nothing is stored server side: a token is valid exactly
//! when its signature verifies against the shared secret and `now < exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{Principal, Role};
use crate::config::{AuthConfig, MAX_TOKEN_TTL_HOURS};

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity (email) of the user the token was issued to
    pub sub: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// An issued token together with its expiry
#[derive(Debug, Clone, Serialize)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Why a presented token was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = match &config.jwt_secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!(
                    "auth.jwt_secret is not set; using a random secret, issued tokens will not survive a restart"
                );
                format!("{}{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4())
            }
        };
        let ttl_hours = config.token_ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS);
        Self::new(secret.as_bytes(), Duration::hours(ttl_hours))
    }

    /// Issue a token for `identity` valid for the configured lifetime
    pub fn issue(&self, identity: &str, role: Role) -> Result<Credential, jsonwebtoken::errors::Error> {
        self.issue_at(identity, role, Utc::now())
    }

    fn issue_at(
        &self,
        identity: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Credential, jsonwebtoken::errors::Error> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: identity.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(Credential { token, expires_at })
    }

    /// Verify signature and expiry and recover the principal.
    pub fn validate(&self, token: &str) -> Result<Principal, TokenRejection> {
        let claims: Claims = self.verified_claims(token)?;
        Ok(Principal::new(claims.sub, claims.role))
    }

    /// Read a single claim from a verified, unexpired token
    pub fn extract_claim(&self, token: &str, name: &str) -> Option<serde_json::Value> {
        let claims: serde_json::Map<String, serde_json::Value> =
            self.verified_claims(token).ok()?;
        claims.get(name).cloned()
    }

    fn verified_claims<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenRejection> {
        let data = decode::<serde_json::Value>(token, &self.decoding, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                _ => TokenRejection::Malformed,
            },
        )?;

        // A token is dead from the exact second it expires.
        let exp = data
            .claims
            .get("exp")
            .and_then(|v| v.as_i64())
            .ok_or(TokenRejection::Malformed)?;
        if Utc::now().timestamp() >= exp {
            return Err(TokenRejection::Expired);
        }

        serde_json::from_value(data.claims).map_err(|_| TokenRejection::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-signing-secret", Duration::hours(10))
    }

    #[test]
    fn test_issue_then_validate_round_trip() {
        let tokens = service();
        for role in Role::ALL {
            let credential = tokens.issue("someone@example.com", role).unwrap();
            let principal = tokens.validate(&credential.token).unwrap();
            assert_eq!(principal.identity, "someone@example.com");
            assert_eq!(principal.role, role);
        }
    }

    #[test]
    fn test_expiry_is_ttl_after_issue() {
        let tokens = service();
        let now = Utc::now();
        let credential = tokens.issue_at("a@example.com", Role::Patient, now).unwrap();
        assert_eq!(
            credential.expires_at.timestamp() - now.timestamp(),
            Duration::hours(10).num_seconds()
        );
    }

    #[test]
    fn test_out_of_range_ttl_is_clamped() {
        let config = AuthConfig {
            jwt_secret: Some("s3cret".to_string()),
            token_ttl_hours: 2_000_000_000_000,
            allow_admin_registration: false,
        };
        let tokens = TokenService::from_config(&config);
        let now = Utc::now();
        let credential = tokens.issue_at("a@example.com", Role::Patient, now).unwrap();
        assert_eq!(
            credential.expires_at.timestamp() - now.timestamp(),
            Duration::hours(MAX_TOKEN_TTL_HOURS).num_seconds()
        );
        assert!(tokens.validate(&credential.token).is_ok());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = service();
        let issued = Utc::now() - Duration::hours(10) - Duration::seconds(5);
        let credential = tokens.issue_at("a@example.com", Role::Doctor, issued).unwrap();
        assert_eq!(tokens.validate(&credential.token), Err(TokenRejection::Expired));
    }

    #[test]
    fn test_token_expiring_now_is_rejected() {
        let tokens = service();
        let issued = Utc::now() - Duration::hours(10);
        let credential = tokens.issue_at("a@example.com", Role::Doctor, issued).unwrap();
        assert_eq!(tokens.validate(&credential.token), Err(TokenRejection::Expired));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let credential = service().issue("a@example.com", Role::Admin).unwrap();
        let other = TokenService::new(b"another-secret", Duration::hours(10));
        assert_eq!(other.validate(&credential.token), Err(TokenRejection::BadSignature));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let tokens = service();
        let credential = tokens.issue("a@example.com", Role::Patient).unwrap();
        let mut parts: Vec<String> = credential.token.split('.').map(String::from).collect();
        let forged = service_payload_for_role(&tokens, Role::Admin);
        parts[1] = forged;
        let tampered = parts.join(".");
        assert!(tokens.validate(&tampered).is_err());
    }

    fn service_payload_for_role(tokens: &TokenService, role: Role) -> String {
        let other = tokens.issue("a@example.com", role).unwrap();
        other.token.split('.').nth(1).unwrap().to_string()
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let tokens = service();
        for garbage in ["", "abc", "a.b.c", "....", "Bearer xyz", "eyJhbGciOiJIUzI1NiJ9.e30.sig"] {
            assert!(tokens.validate(garbage).is_err(), "accepted {:?}", garbage);
        }
    }

    #[test]
    fn test_unknown_role_claim_is_malformed() {
        let tokens = service();
        let claims = serde_json::json!({
            "sub": "a@example.com",
            "role": "SUPERUSER",
            "iat": Utc::now().timestamp(),
            "exp": (Utc::now() + Duration::hours(1)).timestamp(),
            "jti": "x",
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-signing-secret"),
        )
        .unwrap();
        assert_eq!(tokens.validate(&token), Err(TokenRejection::Malformed));
    }

    #[test]
    fn test_extract_claim() {
        let tokens = service();
        let credential = tokens.issue("doc@example.com", Role::Doctor).unwrap();
        assert_eq!(
            tokens.extract_claim(&credential.token, "role"),
            Some(serde_json::json!("DOCTOR"))
        );
        assert_eq!(
            tokens.extract_claim(&credential.token, "sub"),
            Some(serde_json::json!("doc@example.com"))
        );
        assert_eq!(tokens.extract_claim(&credential.token, "missing"), None);
        assert_eq!(tokens.extract_claim("not-a-token", "role"), None);
    }

    #[test]
    fn test_each_token_has_unique_id() {
        let tokens = service();
        let a = tokens.issue("a@example.com", Role::Patient).unwrap();
        let b = tokens.issue("a@example.com", Role::Patient).unwrap();
        assert_ne!(
            tokens.extract_claim(&a.token, "jti"),
            tokens.extract_claim(&b.token, "jti")
        );
    }
}
