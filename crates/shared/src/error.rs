use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unreachable,
    Timeout,
    NotFound,
    Validation,
    Server,
    Decode,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            400 | 422 => Self::Validation,
            408 => Self::Timeout,
            _ => Self::Server,
        }
    }
}

/// The failure half of every API call: `{error: true, detail}` on the wire
/// side of the original client, a typed value here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.code, ErrorCode::Unreachable | ErrorCode::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_http_status_to_code() {
        assert_eq!(ErrorCode::from_status(404), ErrorCode::NotFound);
        assert_eq!(ErrorCode::from_status(422), ErrorCode::Validation);
        assert_eq!(ErrorCode::from_status(503), ErrorCode::Server);
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = ApiError::new(ErrorCode::Timeout, "request timed out");
        assert_eq!(err.to_string(), "Timeout: request timed out");
        assert!(err.is_transport());
    }
}
