// API data transfer objects
pub mod activity_logs;
pub mod applications;
pub mod auth;
pub mod common;
pub mod dues;
pub mod files;
pub mod members;
pub mod regions;
pub mod roles;
pub mod settings;
pub mod users;

use poem_openapi::types::MaybeUndefined;

/// Map an optional-and-nullable field onto "leave / clear / set"
pub fn into_change<T>(value: MaybeUndefined<T>) -> Option<Option<T>> {
    match value {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(None),
        MaybeUndefined::Value(value) => Some(Some(value)),
    }
}
