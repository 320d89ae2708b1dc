use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Internal,
}

/// Error envelope the API returns alongside non-2xx statuses:
/// `{"ok": false, "error": "unauthorized"}`.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("api failure: {error}")]
pub struct ApiFailure {
    pub ok: bool,
    pub error: String,
}

impl ApiFailure {
    pub fn code(&self) -> Option<ErrorCode> {
        match self.error.as_str() {
            "unauthorized" => Some(ErrorCode::Unauthorized),
            "forbidden" => Some(ErrorCode::Forbidden),
            "not_found" => Some(ErrorCode::NotFound),
            "validation" => Some(ErrorCode::Validation),
            "internal" => Some(ErrorCode::Internal),
            _ => None,
        }
    }
}
