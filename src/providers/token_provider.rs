use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::config::SecretManager;
use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::types::internal::auth::Claims;
use crate::types::internal::permission::SystemRole;

/// A freshly signed access token
#[derive(Debug, Clone)]
pub struct IssuedJwt {
    pub token: String,
    pub jti: String,
    pub expires_at: i64,
    pub expires_in: i64,
}

/// Provides JWT generation and validation plus refresh token lifetimes
pub struct TokenProvider {
    secret_manager: Arc<SecretManager>,
    jwt_expiration_minutes: i64,
    refresh_expiration_days: i64,
}

impl TokenProvider {
    pub fn new(secret_manager: Arc<SecretManager>) -> Self {
        Self {
            secret_manager,
            jwt_expiration_minutes: 15,
            refresh_expiration_days: 7,
        }
    }

    /// Sign an HS256 access token for the given user
    pub fn generate_jwt(
        &self,
        user_id: &str,
        roles: Vec<SystemRole>,
        password_change_required: bool,
    ) -> Result<IssuedJwt, InternalError> {
        let now = Utc::now().timestamp();
        let expires_in = self.jwt_expiration_minutes * 60;
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + expires_in,
            iat: now,
            jti: jti.clone(),
            roles,
            password_change_required,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
        )
        .map_err(|e| InternalError::crypto("jwt_generation", e.to_string()))?;

        Ok(IssuedJwt {
            token,
            jti,
            expires_at: claims.exp,
            expires_in,
        })
    }

    /// Validate signature and expiry, returning the claims
    pub fn validate_jwt(&self, token: &str) -> Result<Claims, InternalError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => CredentialError::ExpiredToken("jwt".to_string()).into(),
            _ => CredentialError::invalid_token("jwt", e.to_string()).into(),
        })
    }

    /// Unix timestamp at which a refresh token issued now expires
    pub fn refresh_token_expiration(&self) -> i64 {
        Utc::now().timestamp() + self.refresh_expiration_days * 24 * 60 * 60
    }

    pub fn jwt_expiration_seconds(&self) -> i64 {
        self.jwt_expiration_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_token_provider(secret: &str) -> TokenProvider {
        TokenProvider::new(Arc::new(SecretManager::new(secret, "test-pepper-16chars")))
    }

    const SECRET: &str = "test-jwt-secret-that-is-at-least-32-characters";

    #[test]
    fn test_generate_and_validate_jwt() {
        let provider = create_test_token_provider(SECRET);
        let issued = provider
            .generate_jwt("user-1", vec![SystemRole::PanelUser], true)
            .unwrap();

        let claims = provider.validate_jwt(&issued.token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.roles, vec![SystemRole::PanelUser]);
        assert!(claims.password_change_required);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_jwt_signed_with_other_secret_is_rejected() {
        let issued = create_test_token_provider("another-secret-that-is-also-32-characters-long")
            .generate_jwt("user-1", vec![SystemRole::Admin], false)
            .unwrap();

        let result = create_test_token_provider(SECRET).validate_jwt(&issued.token);
        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::InvalidToken { .. }))
        ));
    }

    #[test]
    fn test_expired_jwt_is_reported_as_expired() {
        let claims = Claims {
            sub: "user-1".to_string(),
            exp: Utc::now().timestamp() - 60,
            iat: Utc::now().timestamp() - 960,
            jti: "jti".to_string(),
            roles: vec![],
            password_change_required: false,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = create_test_token_provider(SECRET).validate_jwt(&token);
        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::ExpiredToken(_)))
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let result = create_test_token_provider(SECRET).validate_jwt("not.a.jwt");
        assert!(result.is_err());
    }

    #[test]
    fn test_refresh_expiration_is_seven_days_out() {
        let provider = create_test_token_provider(SECRET);
        let delta = provider.refresh_token_expiration() - Utc::now().timestamp();
        assert!((7 * 24 * 3600 - 5..=7 * 24 * 3600).contains(&delta));
    }
}
