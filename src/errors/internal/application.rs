use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelApplicationError {
    #[error("Panel user application not found: {0}")]
    NotFound(String),

    #[error("Application has already been reviewed: {0}")]
    AlreadyReviewed(String),

    #[error("Member already has a pending application")]
    PendingExists,

    #[error("A review note is required when rejecting")]
    NoteRequired,
}
