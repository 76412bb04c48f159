use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No session, or the backend refused the token
    #[error("not signed in")]
    Unauthenticated,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    Validation(String),
    /// An edge mutation did not match the assumed prior state
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("network failure: {0}")]
    Network(String),
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Network(error.to_string())
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(error: reqwest_middleware::Error) -> Self {
        Error::Network(error.to_string())
    }
}

/// Error body returned by PostgREST and the auth service.
///
/// Both services use different field names, so everything is optional.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BackendError {
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default, alias = "msg", alias = "error_description")]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl BackendError {
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    pub fn code(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            Some(serde_json::Value::Number(code)) => Some(code.to_string()),
            _ => None,
        }
    }

    fn describe(&self, fallback: &str) -> String {
        let mut text = self.message.clone().unwrap_or_else(|| fallback.to_string());
        if let Some(details) = &self.details {
            text.push_str(" (");
            text.push_str(details);
            text.push(')');
        }
        text
    }
}

impl Error {
    /// Classify a non-success relational or auth response.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let backend = BackendError::parse(body);
        let message = backend.describe(status.canonical_reason().unwrap_or("unknown"));

        match (status, backend.code().as_deref()) {
            (StatusCode::UNAUTHORIZED, _) => Error::Unauthenticated,
            (_, Some("PGRST116")) => Error::NotFound(message),
            (StatusCode::NOT_FOUND | StatusCode::NOT_ACCEPTABLE, _) => Error::NotFound(message),
            (_, Some("23505")) | (StatusCode::CONFLICT, _) => Error::Conflict(message),
            (status, _) => Error::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Classify a non-success storage response.
    pub fn from_storage_response(status: StatusCode, body: &[u8]) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            return Error::Unauthenticated;
        }
        let backend = BackendError::parse(body);
        Error::Storage(format!(
            "{} {}",
            status.as_u16(),
            backend.describe(status.canonical_reason().unwrap_or("unknown"))
        ))
    }

    /// Whether the caller should be routed to the login flow.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Unauthenticated)
    }
}
