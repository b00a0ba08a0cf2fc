//! Service-level error kinds shared by the order and payment services.

use crate::payment::GatewayError;
use crate::store::StoreError;

/// Error returned by every service operation.
///
/// Handlers translate each kind to a status code with [`status_code`].
///
/// [`status_code`]: ServiceError::status_code
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Bad input: empty cart, non-positive quantity, negative price,
    /// empty payment reference.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No matching order, payment or refund.
    #[error("not found: {0}")]
    NotFound(String),

    /// A status precondition does not hold (e.g. paying a non-pending order).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The underlying store failed or timed out.
    #[error("storage error: {0}")]
    Storage(String),

    /// The payment provider rejected the request or could not be reached.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl ServiceError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::InvalidState(_) => 409,
            ServiceError::Storage(_) => 500,
            ServiceError::Gateway(_) => 500,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        ServiceError::InvalidState(msg.into())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { table, id } => {
                ServiceError::NotFound(format!("{} {}", table, id))
            }
            other => ServiceError::Storage(other.to_string()),
        }
    }
}
