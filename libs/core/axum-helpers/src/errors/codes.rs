//! Type-safe error codes for structured logs.
//!
//! Every [`AppError`](super::AppError) is logged with an integer
//! `error_code` field so failures can be grouped in log search without
//! parsing messages. The codes never appear in response bodies.
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::NotFound;
//! assert_eq!(code.as_str(), "NOT_FOUND");
//! assert_eq!(code.code(), 1004);
//! assert_eq!(code.default_message(), "Not Found");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request was rejected by domain validation
    BadRequest,

    /// Request body could not be parsed as JSON
    InvalidJson,

    /// Route or resource does not exist
    NotFound,

    // Server errors (5000-5999)
    /// Unexpected failure; detail is only logged
    InternalError,

    /// A dependency is unreachable
    ServiceUnavailable,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidJson => "INVALID_JSON",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// Integer code for logging and monitoring.
    ///
    /// - 1000-1999: client errors
    /// - 5000-5999: server errors
    pub fn code(&self) -> i32 {
        match self {
            Self::BadRequest => 1001,
            Self::InvalidJson => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 5001,
            Self::ServiceUnavailable => 5003,
        }
    }

    /// Message used when the caller supplies none, or must not see the real one.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::InvalidJson => "Invalid JSON body",
            Self::NotFound => "Not Found",
            Self::InternalError => "Internal Server Error",
            Self::ServiceUnavailable => "Service Unavailable",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
