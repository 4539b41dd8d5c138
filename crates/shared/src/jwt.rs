//! Tenant-scoped bearer tokens (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::auth::Claims;
use crate::config::JwtSettings;
use crate::types::{OrganizationId, UserId};

/// Signing secret and token lifetime.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token lifetime in minutes.
    pub access_token_expires_minutes: i64,
}

impl From<&JwtSettings> for JwtConfig {
    fn from(settings: &JwtSettings) -> Self {
        Self {
            secret: settings.secret.clone(),
            access_token_expires_minutes: i64::try_from(settings.access_token_expiry_secs / 60)
                .unwrap_or(i64::MAX),
        }
    }
}

/// Why a token could not be issued or accepted.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Sign(String),

    /// Malformed, tampered or signed with another secret.
    #[error("invalid token: {0}")]
    Invalid(String),

    /// Past its `exp`.
    #[error("token has expired")]
    Expired,
}

/// Issues and verifies access tokens.
#[derive(Clone)]
pub struct JwtService {
    lifetime: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("lifetime_minutes", &self.lifetime.num_minutes())
            .field("keys", &"[hidden]")
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Builds the service from its configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            lifetime: Duration::minutes(config.access_token_expires_minutes),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token that scopes every request to `organization_id`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Sign` if encoding fails.
    pub fn generate_access_token(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        role: &str,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(
            user_id.into_inner(),
            organization_id.into_inner(),
            role,
            Utc::now() + self.lifetime,
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Sign(e.to_string()))
    }

    /// Verifies the signature and expiry and returns the claims.
    ///
    /// # Errors
    ///
    /// `JwtError::Expired` past `exp`, `JwtError::Invalid` for anything else.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(minutes: i64) -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            access_token_expires_minutes: minutes,
        })
    }

    #[test]
    fn test_token_carries_tenant_scope() {
        let user_id = UserId::new();
        let organization_id = OrganizationId::new();

        let token = service(15)
            .generate_access_token(user_id, organization_id, "accountant")
            .unwrap();
        let claims = service(15).validate_token(&token).unwrap();

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.organization_id(), organization_id);
        assert_eq!(claims.role, "accountant");
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert!(matches!(
            service(15).validate_token("invalid.token.here"),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_foreign_secret_is_invalid() {
        let other = JwtService::new(JwtConfig {
            secret: "another-secret".to_string(),
            access_token_expires_minutes: 15,
        });
        let token = other
            .generate_access_token(UserId::new(), OrganizationId::new(), "owner")
            .unwrap();
        assert!(matches!(
            service(15).validate_token(&token),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let stale = service(-10);
        let token = stale
            .generate_access_token(UserId::new(), OrganizationId::new(), "owner")
            .unwrap();
        assert!(matches!(stale.validate_token(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_lifetime_from_settings() {
        let settings = JwtSettings {
            secret: "s".to_string(),
            access_token_expiry_secs: 1800,
        };
        let config = JwtConfig::from(&settings);
        assert_eq!(config.access_token_expires_minutes, 30);
    }
}
