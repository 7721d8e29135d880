mod common;

use std::sync::Arc;

use union_admin_backend::config::{ConfigError, SecretManager};
use union_admin_backend::providers::TokenProvider;
use union_admin_backend::types::internal::permission::SystemRole;

const VALID_JWT_SECRET: &str = "this-is-a-valid-jwt-secret-with-32-characters";
const VALID_PEPPER: &str = "valid-pepper-16chars";

#[test]
fn test_application_startup_with_valid_secrets() {
    let _lock = common::ENV_TEST_MUTEX.lock().unwrap();
    let _guard = common::EnvGuard::new(vec!["JWT_SECRET", "PASSWORD_PEPPER"]);

    unsafe {
        std::env::set_var("JWT_SECRET", VALID_JWT_SECRET);
        std::env::set_var("PASSWORD_PEPPER", VALID_PEPPER);
    }

    let result = SecretManager::init();
    assert!(result.is_ok(), "SecretManager should initialize successfully with valid secrets");

    let secret_manager = Arc::new(result.unwrap());
    assert_eq!(secret_manager.jwt_secret(), VALID_JWT_SECRET);
    assert_eq!(secret_manager.pepper(), VALID_PEPPER);
}

#[test]
fn test_application_fails_gracefully_with_missing_jwt_secret() {
    let _lock = common::ENV_TEST_MUTEX.lock().unwrap();
    let _guard = common::EnvGuard::new(vec!["JWT_SECRET", "PASSWORD_PEPPER"]);

    unsafe {
        std::env::set_var("PASSWORD_PEPPER", VALID_PEPPER);
    }

    let err = SecretManager::init().unwrap_err();
    assert_eq!(err.to_string(), "Required secret 'JWT_SECRET' is missing");
    match err {
        ConfigError::MissingSecret { secret_name } => assert_eq!(secret_name, "JWT_SECRET"),
        other => panic!("Expected MissingSecret for JWT_SECRET, got {:?}", other),
    }
}

#[test]
fn test_application_fails_gracefully_with_short_pepper() {
    let _lock = common::ENV_TEST_MUTEX.lock().unwrap();
    let _guard = common::EnvGuard::new(vec!["JWT_SECRET", "PASSWORD_PEPPER"]);

    unsafe {
        std::env::set_var("JWT_SECRET", VALID_JWT_SECRET);
        std::env::set_var("PASSWORD_PEPPER", "short");
    }

    match SecretManager::init() {
        Err(ConfigError::SecretTooShort {
            secret_name,
            expected,
            actual,
        }) => {
            assert_eq!(secret_name, "PASSWORD_PEPPER");
            assert_eq!(expected, 16);
            assert_eq!(actual, 5);
        }
        other => panic!("Expected SecretTooShort for PASSWORD_PEPPER, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_tokens_signed_with_one_secret_fail_with_another() {
    let issuer = TokenProvider::new(Arc::new(SecretManager::new(VALID_JWT_SECRET, VALID_PEPPER)));
    let other = TokenProvider::new(Arc::new(SecretManager::new(
        "a-completely-different-secret-of-32-chars",
        VALID_PEPPER,
    )));

    let jwt = issuer.generate_jwt("user-1", vec![SystemRole::Admin], false).unwrap();

    assert!(issuer.validate_jwt(&jwt.token).is_ok());
    assert!(other.validate_jwt(&jwt.token).is_err());
}
