use thiserror::Error;

use crate::types::db::member::MemberStatus;

#[derive(Error, Debug)]
pub enum MemberError {
    #[error("Member not found: {0}")]
    NotFound(String),

    #[error("A member with this national id already exists")]
    DuplicateNationalId,

    #[error("National id must be exactly 11 digits")]
    InvalidNationalId,

    #[error("Invalid birth date: {0}")]
    InvalidBirthDate(String),

    #[error("Cannot change member status from {} to {}", .from.as_str(), .to.as_str())]
    InvalidTransition { from: MemberStatus, to: MemberStatus },

    #[error("Only PENDING or REJECTED members can be deleted, member is {}", .0.as_str())]
    NotDeletable(MemberStatus),

    #[error("A reason is required for this status change")]
    ReasonRequired,

    #[error("Member is not active")]
    NotActive,

    #[error("Registration numbers for {0} are exhausted")]
    RegistrationNumbersExhausted(i32),
}
