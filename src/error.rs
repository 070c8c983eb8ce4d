use std::collections::TryReserveError;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum LunixError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Seek position {requested} outside buffer of {len} bytes")]
    OutOfRange { requested: i128, len: usize },

    #[error("No fresh data available")]
    WouldBlock,

    #[error("Wait for fresh data was cancelled")]
    Cancelled,

    #[error("Allocation failed: {0}")]
    AllocationFailure(#[from] TryReserveError),
}

pub type Result<T> = std::result::Result<T, LunixError>;
