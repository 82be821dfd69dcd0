use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use spg_engine::{CallbackError, PaymentGatewayError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The request cannot be carried out in the current state. {0}")]
    InvalidState(String),
    #[error("The payment gateway rejected the request. {0}")]
    GatewayError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::GatewayError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<PaymentGatewayError> for ServerError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::BasketNotFound(_) | PaymentGatewayError::OrderNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            PaymentGatewayError::BasketAlreadySubmitted(_) | PaymentGatewayError::OrderAlreadyExists(_) => {
                Self::InvalidState(e.to_string())
            },
            PaymentGatewayError::GatewayError(_) | PaymentGatewayError::SpgatewayError(_) => {
                Self::GatewayError(e.to_string())
            },
            _ => Self::BackendError(e.to_string()),
        }
    }
}

impl From<CallbackError> for ServerError {
    fn from(e: CallbackError) -> Self {
        match e {
            CallbackError::IntegrityError | CallbackError::MalformedPayload(_) => Self::InvalidRequestBody(e.to_string()),
            CallbackError::GatewayStatus { .. } => Self::GatewayError(e.to_string()),
            CallbackError::BasketNotFound(_) => Self::NoRecordFound(e.to_string()),
            CallbackError::Processing(e) => e.into(),
        }
    }
}
