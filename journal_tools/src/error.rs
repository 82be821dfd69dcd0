use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum JournalApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Journal bundle {0} does not exist")]
    NotFound(String),
    #[error("{0:?} is not a valid journal bundle id")]
    InvalidBundleId(String),
    #[error("The journal API did not respond in time: {0}")]
    Timeout(String),
    #[error("Could not connect to the journal API: {0}")]
    Connection(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl From<reqwest::Error> for JournalApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else if e.is_decode() {
            Self::JsonError(e.to_string())
        } else {
            Self::RestResponseError(e.to_string())
        }
    }
}
