//! Report ledger error types.

use thiserror::Error;

use konsern_shared::types::ReportId;
use konsern_store::StoreError;

use super::types::ReportStatus;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Report not found.
    #[error("Report {0} not found")]
    NotFound(ReportId),

    /// Attempted to edit an approved report.
    #[error("Report {0} is approved and read-only")]
    ApprovedReadOnly(ReportId),

    /// Attempted to delete an approved report.
    #[error("Report {0} is approved and cannot be deleted")]
    ApprovedUndeletable(ReportId),

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ReportStatus,
        /// The attempted target status.
        to: ReportStatus,
    },

    /// The operation is reserved for controllers.
    #[error("Controller role required")]
    ControllerRequired,

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReportError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::ApprovedReadOnly(_) | Self::ApprovedUndeletable(_) => 422,
            Self::InvalidTransition { .. } => 400,
            Self::ControllerRequired => 403,
            Self::Store(err) => err.status_code(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "REPORT_NOT_FOUND",
            Self::ApprovedReadOnly(_) => "REPORT_APPROVED_READ_ONLY",
            Self::ApprovedUndeletable(_) => "REPORT_APPROVED_UNDELETABLE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ControllerRequired => "CONTROLLER_REQUIRED",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ReportError::NotFound(ReportId::new(1)).status_code(), 404);
        assert_eq!(
            ReportError::ApprovedReadOnly(ReportId::new(1)).status_code(),
            422
        );
        assert_eq!(
            ReportError::ApprovedUndeletable(ReportId::new(1)).status_code(),
            422
        );
        assert_eq!(
            ReportError::InvalidTransition {
                from: ReportStatus::Submitted,
                to: ReportStatus::Draft,
            }
            .status_code(),
            400
        );
        assert_eq!(ReportError::ControllerRequired.status_code(), 403);
    }

    #[test]
    fn test_store_error_passthrough() {
        let err = ReportError::Store(StoreError::Rejected {
            status: 409,
            message: "conflict".into(),
        });
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }
}
