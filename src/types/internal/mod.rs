// Internal types - never exposed through the API directly
pub mod audit;
pub mod auth;
pub mod context;
pub mod permission;
pub mod scope;
