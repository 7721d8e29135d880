use thiserror::Error;

pub mod access;
pub mod application;
pub mod audit;
pub mod credential;
pub mod database;
pub mod dues;
pub mod file;
pub mod member;
pub mod region;
pub mod role;
pub mod setting;
pub mod user;

pub use access::AccessError;
pub use application::PanelApplicationError;
pub use audit::AuditError;
pub use credential::CredentialError;
pub use database::DatabaseError;
pub use dues::DuesError;
pub use file::FileError;
pub use member::MemberError;
pub use region::RegionError;
pub use role::RoleError;
pub use setting::SettingError;
pub use user::UserError;

/// Internal error type for store, provider and coordinator operations
///
/// Hybrid design separates infrastructure errors (shared) from domain errors (one per area).
/// Not exposed via API - endpoints must convert to AuthError or AdminError.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse {
        value_type: String,
        message: String,
    },

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto {
        operation: String,
        message: String,
    },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Role(#[from] RoleError),

    #[error(transparent)]
    Member(#[from] MemberError),

    #[error(transparent)]
    Application(#[from] PanelApplicationError),

    #[error(transparent)]
    Dues(#[from] DuesError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Setting(#[from] SettingError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl InternalError {
    /// Create a database error tagged with the failing operation
    pub fn database(operation: &str, source: sea_orm::DbErr) -> Self {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn transaction_begin(source: sea_orm::DbErr) -> Self {
        InternalError::Database(DatabaseError::TransactionBegin { source })
    }

    pub fn transaction_commit(source: sea_orm::DbErr) -> Self {
        InternalError::Database(DatabaseError::TransactionCommit { source })
    }

    /// Create a parse error with context
    pub fn parse(value_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            value_type: value_type.into(),
            message: message.into(),
        }
    }

    /// Create a crypto error with context
    pub fn crypto(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Crypto {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
