use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use base64::{Engine as _, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::seq::SliceRandom;
use sha2::Sha256;

use crate::config::SecretManager;
use crate::errors::InternalError;

type HmacSha256 = Hmac<Sha256>;

const UPPERCASE: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}";

/// Length of generated temporary passwords
pub const TEMPORARY_PASSWORD_LENGTH: usize = 20;

/// Password hashing, token hashing and random secret generation
///
/// Passwords are hashed with Argon2id keyed with the application pepper,
/// refresh tokens with HMAC-SHA256 keyed with the JWT secret.
pub struct CryptoProvider {
    secret_manager: Arc<SecretManager>,
}

impl CryptoProvider {
    pub fn new(secret_manager: Arc<SecretManager>) -> Self {
        Self { secret_manager }
    }

    fn argon2(&self) -> Result<Argon2<'_>, InternalError> {
        Argon2::new_with_secret(
            self.secret_manager.pepper().as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
    }

    /// Hash a password into PHC string format
    pub fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| InternalError::crypto("password_hash", e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored hash
    ///
    /// A malformed stored hash counts as a mismatch.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, InternalError> {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!("Stored password hash could not be parsed: {}", e);
                return Ok(false);
            }
        };

        Ok(self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Compute HMAC-SHA256 for a refresh token and return it as hex
    pub fn hmac_sha256_token(&self, token: &str) -> Result<String, InternalError> {
        let mut mac = HmacSha256::new_from_slice(self.secret_manager.jwt_secret().as_bytes())
            .map_err(|e| InternalError::crypto("hmac_init", e.to_string()))?;
        mac.update(token.as_bytes());
        Ok(format!("{:x}", mac.finalize().into_bytes()))
    }

    /// Opaque refresh token: 32 random bytes, base64 encoded
    pub fn generate_refresh_token(&self) -> String {
        let random_bytes: [u8; 32] = rand::rng().random();
        general_purpose::STANDARD.encode(random_bytes)
    }

    /// Generate a temporary password for newly created accounts
    ///
    /// Always contains at least one uppercase letter, lowercase letter, digit
    /// and symbol so it satisfies any password policy the settings allow.
    /// Ambiguous characters (0/O, 1/l/I) are left out.
    pub fn generate_secure_password(&self) -> String {
        let mut rng = rand::rng();
        let mut password: Vec<u8> = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS]
            .iter()
            .map(|class| class[rng.random_range(0..class.len())])
            .collect();

        let charset: Vec<u8> = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS].concat();
        while password.len() < TEMPORARY_PASSWORD_LENGTH {
            password.push(charset[rng.random_range(0..charset.len())]);
        }
        password.shuffle(&mut rng);

        password.into_iter().map(char::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_crypto_provider() -> CryptoProvider {
        CryptoProvider::new(Arc::new(SecretManager::new(
            "test-jwt-secret-that-is-at-least-32-characters",
            "test-pepper-16chars",
        )))
    }

    #[test]
    fn test_password_hash_and_verify() {
        let crypto = create_test_crypto_provider();
        let hash = crypto.hash_password("Correct-Horse-9").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(crypto.verify_password("Correct-Horse-9", &hash).unwrap());
        assert!(!crypto.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_password_verify_depends_on_pepper() {
        let crypto = create_test_crypto_provider();
        let hash = crypto.hash_password("Correct-Horse-9").unwrap();

        let other = CryptoProvider::new(Arc::new(SecretManager::new(
            "test-jwt-secret-that-is-at-least-32-characters",
            "a-different-pepper-value",
        )));
        assert!(!other.verify_password("Correct-Horse-9", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        let crypto = create_test_crypto_provider();
        assert!(!crypto.verify_password("anything", "not-a-phc-string").unwrap());
    }

    #[test]
    fn test_hmac_sha256_token_consistency_and_format() {
        let crypto = create_test_crypto_provider();
        let hash1 = crypto.hmac_sha256_token("token-12345").unwrap();
        let hash2 = crypto.hmac_sha256_token("token-12345").unwrap();
        let other = crypto.hmac_sha256_token("token-54321").unwrap();

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, other);
        assert_eq!(hash1.len(), 64);
        assert!(hash1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_refresh_tokens_are_random_32_bytes() {
        let crypto = create_test_crypto_provider();
        let token = crypto.generate_refresh_token();

        let decoded = general_purpose::STANDARD.decode(&token).unwrap();
        assert_eq!(decoded.len(), 32);
        assert_ne!(token, crypto.generate_refresh_token());
    }

    #[test]
    fn test_generated_password_covers_every_class() {
        let crypto = create_test_crypto_provider();
        for _ in 0..50 {
            let password = crypto.generate_secure_password();
            assert_eq!(password.len(), TEMPORARY_PASSWORD_LENGTH);
            assert!(password.chars().any(|c| c.is_ascii_uppercase()));
            assert!(password.chars().any(|c| c.is_ascii_lowercase()));
            assert!(password.chars().any(|c| c.is_ascii_digit()));
            assert!(password.chars().any(|c| !c.is_ascii_alphanumeric()));
        }
    }
}
