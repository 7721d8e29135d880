// Providers layer - Work performers and business logic
//
// Providers hold the rules coordinators compose: permission resolution,
// access evaluation, tokens, hashing and password policy.

pub mod access_provider;
pub mod crypto_provider;
pub mod password_policy_provider;
pub mod permission_provider;
pub mod token_provider;

pub use access_provider::{AccessProfile, AccessProvider};
pub use crypto_provider::CryptoProvider;
pub use password_policy_provider::PasswordPolicyProvider;
pub use token_provider::TokenProvider;
