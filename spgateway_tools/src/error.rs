use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SpgatewayError {
    #[error("Invalid key material: {0}")]
    InvalidKeyLength(String),
    #[error("Encrypted trade info is not valid hex: {0}")]
    InvalidHex(String),
    #[error("Encrypted trade info could not be decrypted: {0}")]
    InvalidCiphertext(String),
    #[error("Decrypted trade info has invalid padding")]
    InvalidPadding,
    #[error("Decrypted trade info is not valid UTF-8")]
    InvalidUtf8,
    #[error("Gateway payload is missing the {0} field")]
    MissingField(String),
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}
