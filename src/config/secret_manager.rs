use std::fmt;

use crate::config::{ConfigError, EnvironmentProvider};

/// Minimum length and variable name of a required secret
struct SecretRule {
    name: &'static str,
    min_length: usize,
}

const JWT_SECRET: SecretRule = SecretRule {
    name: "JWT_SECRET",
    min_length: 32,
};

const PASSWORD_PEPPER: SecretRule = SecretRule {
    name: "PASSWORD_PEPPER",
    min_length: 16,
};

/// Centralized manager for application secrets
pub struct SecretManager {
    jwt_secret: String,
    pepper: String,
}

impl SecretManager {
    /// Load and validate all secrets from the given environment
    ///
    /// # Errors
    /// Returns `ConfigError` if any required secret is missing or too short
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, ConfigError> {
        Ok(Self {
            jwt_secret: load_secret(env, &JWT_SECRET)?,
            pepper: load_secret(env, &PASSWORD_PEPPER)?,
        })
    }

    pub fn init() -> Result<Self, ConfigError> {
        Self::from_env_provider(&crate::config::SystemEnvironment)
    }

    /// Build a manager from known values, used by tests and tooling
    pub fn new(jwt_secret: impl Into<String>, pepper: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            pepper: pepper.into(),
        }
    }

    /// Get the JWT secret
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Get the pepper for password hashing
    pub fn pepper(&self) -> &str {
        &self.pepper
    }
}

fn load_secret(env: &dyn EnvironmentProvider, rule: &SecretRule) -> Result<String, ConfigError> {
    let value = env.get_var(rule.name).ok_or_else(|| ConfigError::MissingSecret {
        secret_name: rule.name.to_string(),
    })?;

    if value.chars().count() < rule.min_length {
        return Err(ConfigError::SecretTooShort {
            secret_name: rule.name.to_string(),
            expected: rule.min_length,
            actual: value.chars().count(),
        });
    }

    Ok(value)
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("jwt_secret", &"<redacted>")
            .field("pepper", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    const VALID_JWT: &str = "this-is-a-valid-jwt-secret-with-32-characters";
    const VALID_PEPPER: &str = "valid-pepper-16ch";

    #[test]
    fn test_successful_initialization_with_valid_secrets() {
        let env = MockEnvironment::empty()
            .with_var("JWT_SECRET", VALID_JWT)
            .with_var("PASSWORD_PEPPER", VALID_PEPPER);

        let manager = SecretManager::from_env_provider(&env).unwrap();

        assert_eq!(manager.jwt_secret(), VALID_JWT);
        assert_eq!(manager.pepper(), VALID_PEPPER);
    }

    #[test]
    fn test_error_when_jwt_secret_missing() {
        let env = MockEnvironment::empty().with_var("PASSWORD_PEPPER", VALID_PEPPER);

        match SecretManager::from_env_provider(&env) {
            Err(ConfigError::MissingSecret { secret_name }) => assert_eq!(secret_name, "JWT_SECRET"),
            other => panic!("Expected MissingSecret, got {:?}", other),
        }
    }

    #[test]
    fn test_error_when_pepper_too_short() {
        let env = MockEnvironment::empty()
            .with_var("JWT_SECRET", VALID_JWT)
            .with_var("PASSWORD_PEPPER", "short");

        match SecretManager::from_env_provider(&env) {
            Err(ConfigError::SecretTooShort {
                secret_name,
                expected,
                actual,
            }) => {
                assert_eq!(secret_name, "PASSWORD_PEPPER");
                assert_eq!(expected, 16);
                assert_eq!(actual, 5);
            }
            other => panic!("Expected SecretTooShort, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let manager = SecretManager::new(VALID_JWT, VALID_PEPPER);
        let debug = format!("{:?}", manager);

        assert!(!debug.contains(VALID_JWT));
        assert!(debug.contains("<redacted>"));
    }
}
