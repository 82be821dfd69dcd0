use rust_decimal::Decimal;
use spg_common::AmountConversionError;
use spgateway_tools::SpgatewayError;
use thiserror::Error;

use crate::traits::{BasketManagement, OrderPlacement, ProcessorResponseManagement};

/// The complete set of behaviour a storage backend must provide to support the payment gateway.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone + BasketManagement + ProcessorResponseManagement + OrderPlacement {
    /// The URL of the database
    fn url(&self) -> &str;
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("The requested basket {0} does not exist")]
    BasketNotFound(i64),
    #[error("Basket {0} has already been submitted")]
    BasketAlreadySubmitted(i64),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(String),
    #[error("Cannot place order, since order {0} already exists")]
    OrderAlreadyExists(String),
    #[error("Amt response from spgateway is not the same as the basket total. {declared} != {total} (basket {basket_id})")]
    AmountMismatch { declared: i64, total: Decimal, basket_id: i64 },
    #[error("Unknown payment type: {0}")]
    UnknownPaymentType(String),
    #[error("The gateway response is malformed. {0}")]
    MalformedResponse(String),
    #[error("Gateway error. {0}")]
    GatewayError(String),
    #[error("Spgateway error. {0}")]
    SpgatewayError(#[from] SpgatewayError),
    #[error("{0}")]
    AmountConversion(#[from] AmountConversionError),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
