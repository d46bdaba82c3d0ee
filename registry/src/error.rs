//! Failure categories surfaced by registry operations.

use thiserror::Error;

use crate::core::types::Rejection;
use crate::io::record_store::StoreError;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// A field failed validation or an update broke a business rule.
    #[error(transparent)]
    Rejected(#[from] Rejection),
    /// No record carries the requested identifier.
    #[error("no record with id {0:?}")]
    NotFound(String),
    /// The record store failed. The caller decides whether to retry.
    #[error("storage failure: {0}")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => RegistryError::NotFound(id),
            other => RegistryError::Storage(other),
        }
    }
}

impl RegistryError {
    /// Stable machine-readable reason for the failure.
    pub fn reason_code(&self) -> String {
        match self {
            RegistryError::Rejected(rejection) => rejection.reason_code(),
            RegistryError::NotFound(_) => "not_found".to_string(),
            RegistryError::Storage(StoreError::Duplicate(_)) => "duplicate_id".to_string(),
            RegistryError::Storage(_) => "storage_failure".to_string(),
        }
    }

    /// The rejection, if this is an expected refusal rather than a fault.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            RegistryError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}
