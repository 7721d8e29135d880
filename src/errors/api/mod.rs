// API-facing error types
pub mod admin;
pub mod auth;

pub use admin::AdminError;
pub use auth::AuthError;


#[cfg(test)]
mod auth_test;
