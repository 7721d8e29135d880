use std::sync::Arc;

use sea_orm::ConnectionTrait;

use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::stores::SettingsStore;
use crate::stores::settings_store::{
    PASSWORD_MIN_LENGTH, PASSWORD_REQUIRE_LOWERCASE, PASSWORD_REQUIRE_NUMBER,
    PASSWORD_REQUIRE_SPECIAL, PASSWORD_REQUIRE_UPPERCASE,
};

const MAX_PASSWORD_LENGTH: usize = 128;

/// Password rules as currently configured in system settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_number: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_number: true,
            require_special: false,
        }
    }
}

impl PasswordPolicy {
    /// Check a password, failing fast with the first violated rule
    pub fn check(&self, password: &str, username: Option<&str>) -> Result<(), String> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(format!("Password must be at least {} characters", self.min_length));
        }
        if length > MAX_PASSWORD_LENGTH {
            return Err(format!("Password must be at most {} characters", MAX_PASSWORD_LENGTH));
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err("Password must contain an uppercase letter".to_string());
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            return Err("Password must contain a lowercase letter".to_string());
        }
        if self.require_number && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err("Password must contain a digit".to_string());
        }
        if self.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err("Password must contain a special character".to_string());
        }
        if let Some(username) = username.filter(|u| !u.is_empty()) {
            if password.to_lowercase().contains(&username.to_lowercase()) {
                return Err("Password must not contain the username".to_string());
            }
        }
        Ok(())
    }
}

/// Validates passwords against the rules stored in system settings
///
/// Settings are read on every call so a change applies to the next request.
pub struct PasswordPolicyProvider {
    settings_store: Arc<SettingsStore>,
}

impl PasswordPolicyProvider {
    pub fn new(settings_store: Arc<SettingsStore>) -> Self {
        Self { settings_store }
    }

    pub async fn current(&self, conn: &impl ConnectionTrait) -> Result<PasswordPolicy, InternalError> {
        let defaults = PasswordPolicy::default();
        let store = &self.settings_store;

        Ok(PasswordPolicy {
            min_length: store
                .get_u64(conn, PASSWORD_MIN_LENGTH, defaults.min_length as u64)
                .await? as usize,
            require_uppercase: store
                .get_bool(conn, PASSWORD_REQUIRE_UPPERCASE, defaults.require_uppercase)
                .await?,
            require_lowercase: store
                .get_bool(conn, PASSWORD_REQUIRE_LOWERCASE, defaults.require_lowercase)
                .await?,
            require_number: store
                .get_bool(conn, PASSWORD_REQUIRE_NUMBER, defaults.require_number)
                .await?,
            require_special: store
                .get_bool(conn, PASSWORD_REQUIRE_SPECIAL, defaults.require_special)
                .await?,
        })
    }

    /// # Errors
    /// `CredentialError::PasswordValidationFailed` naming the violated rule
    pub async fn validate(
        &self,
        conn: &impl ConnectionTrait,
        password: &str,
        username: Option<&str>,
    ) -> Result<(), InternalError> {
        self.current(conn)
            .await?
            .check(password, username)
            .map_err(|reason| CredentialError::PasswordValidationFailed(reason).into())
    }
}
