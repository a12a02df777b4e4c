//! Storage boundary error types.

use thiserror::Error;

/// Errors returned by a [`crate::TableStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage engine rejected the request.
    #[error("Storage returned {status}: {message}")]
    Rejected {
        /// HTTP-like status carried by the failure.
        status: u16,
        /// Message from the storage engine.
        message: String,
    },

    /// The request never produced a response.
    #[error("Storage transport error: {0}")]
    Transport(String),

    /// A row addressed by id does not exist.
    #[error("Row {id} not found in table '{table}'")]
    RowNotFound {
        /// Table that was addressed.
        table: String,
        /// Row id that was addressed.
        id: i64,
    },

    /// The storage engine answered with a body this client cannot read.
    #[error("Malformed storage response: {0}")]
    MalformedResponse(String),
}

impl StoreError {
    /// Returns the HTTP-like status for this failure.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Rejected { status, .. } => *status,
            Self::RowNotFound { .. } => 404,
            Self::Transport(_) | Self::MalformedResponse(_) => 502,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<StoreError> for konsern_shared::AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RowNotFound { table, id } => {
                Self::NotFound(format!("row {id} in '{table}'"))
            }
            other => Self::Storage(other.to_string()),
        }
    }
}
