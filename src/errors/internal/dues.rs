use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuesError {
    #[error("Dues payment not found: {0}")]
    NotFound(String),

    #[error("Dues for period {0} are already recorded")]
    DuplicatePeriod(String),

    #[error("Period must be formatted as YYYY-MM: {0}")]
    InvalidPeriod(String),

    #[error("Amount must be greater than zero and within the per-payment limit")]
    InvalidAmount,
}
