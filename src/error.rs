//! The structured error value.
//!
//! A [`StructuredError`] carries everything a service boundary needs to
//! handle a failure without inspecting its origin:
//! - a [`Category`] and a dotted `code` for classification and matching
//! - a human readable `message`
//! - free-form string `params` for structured logging
//! - a retryability flag, derived from the code unless set explicitly
//! - an optional in-process `cause`, forming a causal chain
//!
//! # Creating Errors
//!
//! Use the per-category constructors, or [`StructuredError::new`] when the
//! category is chosen at runtime:
//!
//! ```rust
//! use service_errors::{params, Category, StructuredError};
//!
//! let err = StructuredError::not_found("user", "no such user", Some(params([("id", "42")])));
//! assert_eq!(err.code(), "not_found.user");
//! assert!(!err.retryable());
//!
//! let err = StructuredError::new(Category::Timeout, "", "upstream took too long", None);
//! assert_eq!(err.code(), "timeout");
//! assert!(err.retryable());
//! ```
//!
//! # Serialized Form
//!
//! Serializes to `{"typecode", "code", "message", "params", "is_retryable"}`.
//! The cause is never serialized; it is process-local diagnostic
//! information only.

use crate::codes::{code_is_default_retryable, join_code, Category, CODE_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// String key/value context attached to an error.
pub type Params = HashMap<String, String>;

/// A shared, opaque link in a causal chain.
pub type Cause = Arc<dyn Error + Send + Sync + 'static>;

/// Convenient result type for fallible service operations.
pub type ServiceResult<T> = std::result::Result<T, StructuredError>;

/// Build a [`Params`] map from key/value pairs.
///
/// ```rust
/// use service_errors::params;
///
/// let p = params([("host", "db1"), ("port", "5432")]);
/// assert_eq!(p["host"], "db1");
/// ```
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// A classified, context-carrying error with an optional causal chain.
///
/// Values are immutable once built. Chain operations in [`crate::chain`]
/// consume an error and return a new one.
///
/// Deserialization rejects a `typecode` outside the nine [`Category`]
/// values. To map a raw typecode from an unknown peer to a transport status,
/// use [`status_code_for_typecode`](crate::http::status_code_for_typecode),
/// which falls back to 500.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    #[serde(rename = "typecode")]
    category: Category,

    code: String,

    message: String,

    #[serde(default)]
    params: Params,

    /// Unset only for values deserialized without a flag; every constructor
    /// stores the derived default.
    #[serde(rename = "is_retryable", default)]
    retryable: Option<bool>,

    #[serde(skip)]
    cause: Option<Cause>,
}

impl StructuredError {
    /// Create an error of a caller-chosen category.
    ///
    /// The code is `category` when `sub_code` is empty, otherwise
    /// `category.sub_code`. A `None` params map is treated as empty.
    pub fn new(
        category: Category,
        sub_code: &str,
        message: impl Into<String>,
        params: Option<Params>,
    ) -> Self {
        Self::build(
            category,
            join_code(category.as_str(), sub_code),
            message.into(),
            params,
        )
    }

    /// The client sent an invalid request. Not retryable unless the request
    /// is modified.
    pub fn bad_request(sub_code: &str, message: impl Into<String>, params: Option<Params>) -> Self {
        Self::new(Category::BadRequest, sub_code, message, params)
    }

    /// The service failed to produce a valid response, e.g. a handler
    /// returned an invalid message format.
    pub fn bad_response(
        sub_code: &str,
        message: impl Into<String>,
        params: Option<Params>,
    ) -> Self {
        Self::new(Category::BadResponse, sub_code, message, params)
    }

    /// The resource cannot be accessed with the current credentials.
    pub fn forbidden(sub_code: &str, message: impl Into<String>, params: Option<Params>) -> Self {
        Self::new(Category::Forbidden, sub_code, message, params)
    }

    /// Something failed and little is known about why. Most of these come
    /// from wrapping an opaque error rather than being built directly.
    pub fn internal_service(
        sub_code: &str,
        message: impl Into<String>,
        params: Option<Params>,
    ) -> Self {
        Self::new(Category::InternalService, sub_code, message, params)
    }

    /// The resource cannot be found. Sometimes an empty collection is the
    /// better answer.
    pub fn not_found(sub_code: &str, message: impl Into<String>, params: Option<Params>) -> Self {
        Self::new(Category::NotFound, sub_code, message, params)
    }

    /// A condition given in the request evaluated to false on the server.
    pub fn precondition_failed(
        sub_code: &str,
        message: impl Into<String>,
        params: Option<Params>,
    ) -> Self {
        Self::new(Category::PreconditionFailed, sub_code, message, params)
    }

    /// A call from client to server timed out.
    pub fn timeout(sub_code: &str, message: impl Into<String>, params: Option<Params>) -> Self {
        Self::new(Category::Timeout, sub_code, message, params)
    }

    /// Authentication is required and has failed or was not provided.
    pub fn unauthorized(
        sub_code: &str,
        message: impl Into<String>,
        params: Option<Params>,
    ) -> Self {
        Self::new(Category::Unauthorized, sub_code, message, params)
    }

    // Retryability is stored at construction so it no longer depends on the
    // taxonomy once the value exists.
    pub(crate) fn build(
        category: Category,
        code: String,
        message: String,
        params: Option<Params>,
    ) -> Self {
        let retryable = Some(code_is_default_retryable(&code));
        Self {
            category,
            code,
            message,
            params: params.unwrap_or_default(),
            retryable,
            cause: None,
        }
    }

    pub(crate) fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Merge `params` into this error's params; incoming keys win.
    pub(crate) fn with_merged_params(mut self, params: Option<Params>) -> Self {
        if let Some(params) = params {
            self.params.extend(params);
        }
        self
    }

    /// Replace the message and chain `self` underneath the result, keeping
    /// classification and retryability.
    pub(crate) fn augmented(self, message: String, params: Option<Params>) -> Self {
        let mut merged = self.params.clone();
        if let Some(params) = params {
            merged.extend(params);
        }
        let category = self.category;
        let code = self.code.clone();
        let retryable = self.retryable;
        let cause: Cause = Arc::new(self);
        Self {
            category,
            code,
            message,
            params: merged,
            retryable,
            cause: Some(cause),
        }
    }

    /// Explicitly set retryability, overriding the code-derived default.
    ///
    /// Errors built on top of this one through the chain operations inherit
    /// the explicit value.
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Dotted code, e.g. `bad_request.missing_param`.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The stored tri-state flag. `None` means "derive from the code".
    pub fn is_retryable(&self) -> Option<bool> {
        self.retryable
    }

    /// Whether the action that produced this error may be retried.
    ///
    /// An explicit flag wins; otherwise any code under `internal_service`,
    /// `timeout` or `unknown` is retryable.
    pub fn retryable(&self) -> bool {
        self.retryable.unwrap_or_else(|| code_is_default_retryable(&self.code))
    }

    /// The error this one was built on top of, if any.
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Params to merge into a structured logging event.
    pub fn log_metadata(&self) -> &Params {
        &self.params
    }

    /// Whether the rendered error (see [`Display`](fmt::Display)) contains
    /// `needle`. Matches dotted codes at any level, or message text.
    pub fn matches(&self, needle: &str) -> bool {
        self.to_string().contains(needle)
    }

    /// Whether the code starts with the dot-joined `parts`.
    ///
    /// `prefix_matches(&["bad_request", "missing_param"])` is the same as
    /// `prefix_matches(&["bad_request.missing_param"])`.
    pub fn prefix_matches(&self, parts: &[&str]) -> bool {
        self.code.starts_with(&parts.join(CODE_SEPARATOR))
    }

    fn fmt_without_cause(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            return f.write_str(&self.code);
        }
        if self.code.is_empty() {
            return f.write_str(&self.message);
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Without a cause this renders `code: message`. With a cause, the outermost
/// code is written once, followed by the message of every link in the chain,
/// most recent first. An opaque link contributes its own rendering and ends
/// the chain.
impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(cause) = self.cause.as_deref() else {
            return self.fmt_without_cause(f);
        };

        write!(f, "{}: {}", self.code, self.message)?;
        let mut next = Some(cause);
        while let Some(link) = next {
            match link.downcast_ref::<StructuredError>() {
                Some(structured) => {
                    write!(f, ": {}", structured.message)?;
                    next = structured.cause.as_deref();
                }
                None => {
                    write!(f, ": {link}")?;
                    next = None;
                }
            }
        }
        Ok(())
    }
}

impl Error for StructuredError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn Error + 'static))
    }
}
