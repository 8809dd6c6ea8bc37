//! Error category taxonomy.
//!
//! Every [`StructuredError`](crate::StructuredError) belongs to exactly one
//! [`Category`]. The category drives default retryability and the transport
//! status chosen at a service boundary. Callers refine a category with a
//! free-text dotted sub-code, e.g. `bad_request.missing_param`.
//!
//! # Example
//!
//! ```rust
//! use service_errors::codes::{code_is_default_retryable, Category};
//!
//! assert!(Category::Timeout.is_default_retryable());
//! assert!(!Category::NotFound.is_default_retryable());
//!
//! // Retryability of a dotted code is a prefix test against the category set
//! assert!(code_is_default_retryable("internal_service.db_timeout"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between a category and its sub-codes.
pub const CODE_SEPARATOR: &str = ".";

/// Top-level classification of an error.
///
/// Serializes to its canonical snake_case string (`"not_found"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// The client sent an invalid request. Not retryable unless modified.
    BadRequest,

    /// A handler failed to produce a valid response (e.g. wrong format).
    BadResponse,

    /// The caller is authenticated but not permitted to perform the action.
    Forbidden,

    /// Something failed inside the service; little else is known.
    InternalService,

    /// The requested resource does not exist.
    NotFound,

    /// A condition supplied with the request evaluated to false.
    PreconditionFailed,

    /// A downstream call did not complete in time.
    Timeout,

    /// Authentication is required and has failed or was not provided.
    Unauthorized,

    /// Nothing is known about the failure.
    Unknown,
}

impl Category {
    /// The closed set of categories, in canonical order.
    pub const ALL: [Category; 9] = [
        Category::BadRequest,
        Category::BadResponse,
        Category::Forbidden,
        Category::InternalService,
        Category::NotFound,
        Category::PreconditionFailed,
        Category::Timeout,
        Category::Unauthorized,
        Category::Unknown,
    ];

    /// Categories whose errors are retryable unless told otherwise.
    pub const DEFAULT_RETRYABLE: [Category; 3] = [
        Category::InternalService,
        Category::Timeout,
        Category::Unknown,
    ];

    /// Canonical string form, used as the first segment of every code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::BadResponse => "bad_response",
            Self::Forbidden => "forbidden",
            Self::InternalService => "internal_service",
            Self::NotFound => "not_found",
            Self::PreconditionFailed => "precondition_failed",
            Self::Timeout => "timeout",
            Self::Unauthorized => "unauthorized",
            Self::Unknown => "unknown",
        }
    }

    /// Whether errors of this category are retryable by default.
    pub const fn is_default_retryable(self) -> bool {
        matches!(self, Self::InternalService | Self::Timeout | Self::Unknown)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a string that names no [`Category`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown error category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// The closed set of categories, for validation and documentation.
pub fn categories() -> &'static [Category] {
    &Category::ALL
}

/// Whether a dotted code falls under any default-retryable category.
///
/// This is a prefix test, so `timeout.upstream` is retryable just like
/// `timeout`.
pub fn code_is_default_retryable(code: &str) -> bool {
    Category::DEFAULT_RETRYABLE
        .iter()
        .any(|c| code.starts_with(c.as_str()))
}

/// Join a prefix and a sub-code with [`CODE_SEPARATOR`].
///
/// Either side may be empty, in which case the other is returned as-is.
pub fn join_code(prefix: &str, sub_code: &str) -> String {
    if sub_code.is_empty() {
        return prefix.to_string();
    }
    if prefix.is_empty() {
        return sub_code.to_string();
    }
    format!("{prefix}{CODE_SEPARATOR}{sub_code}")
}
