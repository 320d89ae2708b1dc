use thiserror::Error;

/// Form-level validation, caught before a request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("interval must be a positive number of minutes")]
    InvalidInterval,
    #[error("filter id must be a number or blank")]
    InvalidFilterId,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered 401. The caller's counterpart of the browser
    /// redirect to the login page.
    #[error("authentication required")]
    Unauthorized,
    #[error("access denied: {0}")]
    Forbidden(String),
    #[error("login rejected: invalid credentials")]
    InvalidCredentials,
    #[error("unexpected status {status} from {endpoint}")]
    UnexpectedStatus { endpoint: &'static str, status: u16 },
    #[error("invalid server url: {0}")]
    InvalidServerUrl(String),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// True for failures that can only be resolved by signing in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::InvalidCredentials)
    }
}
