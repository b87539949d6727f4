use thiserror::Error;
use uuid::Uuid;

use crate::shipment::ShipmentStatus;
use crate::store::StoreError;

/// Domain errors surfaced by the workflow services.
///
/// Every variant maps to a distinct, user-visible failure; callers are expected
/// to retry by resubmission rather than rely on automatic retries in the core.
#[derive(Debug, Error)]
pub enum WaybillError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: ShipmentStatus,
        to: ShipmentStatus,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("manifest {0} already completed")]
    AlreadyCompleted(Uuid),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl WaybillError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        WaybillError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        WaybillError::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        WaybillError::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        WaybillError::Conflict(msg.into())
    }
}
