//! Errors surfaced by task store operations.

use thiserror::Error;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a store call. Cloneable so the UI can keep the last one
/// around in a notice.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No signed-in user; the request was never sent.
    #[error("not signed in")]
    NotAuthenticated,

    /// Input rejected before any request was issued.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Network failure or an unreachable backend.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend answered with a body we could not read.
    #[error("unexpected backend response: {0}")]
    Decode(String),

    /// No row with this id exists in the current user's scope.
    #[error("task {0} not found")]
    NotFound(Uuid),
}

impl StoreError {
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            StoreError::NotAuthenticated
                | StoreError::Rejected {
                    status: 401 | 403,
                    ..
                }
        )
    }
}
