use thiserror::Error;

use crate::traits::PaymentGatewayError;

/// Everything that can go wrong while handling a return, notify or customer callback from the gateway.
#[derive(Debug, Clone, Error)]
pub enum CallbackError {
    #[error("TradeSha validation failed. The payload has been tampered with or was signed with another key.")]
    IntegrityError,
    #[error("Malformed gateway payload. {0}")]
    MalformedPayload(String),
    #[error("{status}: {message}")]
    GatewayStatus { status: String, message: String },
    #[error("No basket could be found for payment {0}")]
    BasketNotFound(String),
    #[error("{0}")]
    Processing(#[from] PaymentGatewayError),
}
