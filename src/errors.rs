use axum::http::StatusCode;
use thiserror::Error;

/// Failure talking to the remote API. `status` is absent when no HTTP
/// response was received at all.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", describe(.status, .message))]
pub struct NetworkError {
    pub status: Option<u16>,
    pub message: String,
}

fn describe(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("HTTP {code}: {message}"),
        None => message.to_string(),
    }
}

impl NetworkError {
    pub fn transport(err: impl std::error::Error) -> Self {
        Self {
            status: None,
            message: err.to_string(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::status(status.as_u16(), err.to_string()),
            None => Self::transport(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to resolve {link}: {source}")]
pub struct ResolutionError {
    pub link: String,
    #[source]
    pub source: NetworkError,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    Missing(&'static str),
    #[error("invalid date '{0}'")]
    InvalidDate(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT value '{0}'")]
    Port(String),
    #[error("invalid DURATION_POLICY value '{0}', expected 'zero' or 'exclude'")]
    DurationPolicy(String),
    #[error("TRAINER_API_URL must be an http(s) URL, got '{0}'")]
    ApiUrl(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn bad_gateway(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<NetworkError> for AppError {
    fn from(err: NetworkError) -> Self {
        Self::bad_gateway(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
