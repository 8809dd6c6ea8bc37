//! Composing structured errors from existing errors.
//!
//! Every operation here accepts either a [`StructuredError`] or any opaque
//! error convertible into [`BoxError`]. Which of the two it got is decided
//! once, by a downcast, at the start of the operation.
//!
//! | Operation | Structured input | Opaque input |
//! |-----------|------------------|--------------|
//! | [`wrap`] | params merged, nothing else changes | new `internal_service` error, no cause |
//! | [`wrap_with_code`] | as `wrap` | new error of the given category, no cause |
//! | [`propagate`] | returned unchanged | new `internal_service` error, opaque error as cause |
//! | [`augment`] | new message, params merged, original as cause | new `internal_service` error, opaque error as cause |
//!
//! A `None` input means "no error" and always yields `None`.
//!
//! # Example
//!
//! ```rust
//! use service_errors::chain::{augment, is};
//! use service_errors::{params, StructuredError};
//!
//! let not_found = StructuredError::not_found("user", "no such user", Some(params([("id", "42")])));
//! let err = augment(Some(not_found), "while loading profile", None).unwrap();
//!
//! assert_eq!(err.code(), "not_found.user");
//! assert_eq!(err.to_string(), "not_found.user: while loading profile: no such user");
//! assert!(is(&err, &["not_found"]));
//! ```

use crate::codes::Category;
use crate::error::{Cause, Params, StructuredError};
use std::error::Error;
use std::sync::Arc;

/// Any error that can enter a chain operation.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

fn classify<E: Into<BoxError>>(err: E) -> Result<StructuredError, BoxError> {
    let boxed: BoxError = err.into();
    boxed.downcast::<StructuredError>().map(|structured| *structured)
}

/// Add params to an error, converting opaque errors to `internal_service`.
///
/// The opaque error is absorbed: its rendering becomes the message and it is
/// not kept as a cause. Use [`propagate`] to keep it.
pub fn wrap<E: Into<BoxError>>(err: Option<E>, params: Option<Params>) -> Option<StructuredError> {
    wrap_with_code(err, params, Category::InternalService)
}

/// Like [`wrap`], but opaque errors take `category` instead of
/// `internal_service`.
pub fn wrap_with_code<E: Into<BoxError>>(
    err: Option<E>,
    params: Option<Params>,
    category: Category,
) -> Option<StructuredError> {
    err.map(|err| wrap_error(err, params, category))
}

/// Normalize an error to a [`StructuredError`] without changing it.
///
/// Structured errors come back as-is. An opaque error becomes an
/// `internal_service` error carrying the same message, with the original
/// kept as its cause.
pub fn propagate<E: Into<BoxError>>(err: Option<E>) -> Option<StructuredError> {
    err.map(propagate_error)
}

/// Add a narrative message on top of an error, extending its causal chain.
///
/// For a structured error the result keeps the original category, code and
/// retryability, takes `message`, merges `params` and points at the
/// original as its cause. An opaque error is treated as by
/// [`new_internal_with_cause`].
pub fn augment<E: Into<BoxError>>(
    err: Option<E>,
    message: impl Into<String>,
    params: Option<Params>,
) -> Option<StructuredError> {
    err.map(|err| augment_error(err, message.into(), params))
}

/// Build an `internal_service` error with `err` as its cause.
///
/// If `err` is a structured error with an explicit retryability flag, the new
/// error inherits it, so a non-retryable failure stays non-retryable even
/// after being re-raised as an internal error. Prefer [`augment`] unless a
/// sub-code is needed.
pub fn new_internal_with_cause<E: Into<BoxError>>(
    err: E,
    message: impl Into<String>,
    params: Option<Params>,
    sub_code: &str,
) -> StructuredError {
    let boxed: BoxError = err.into();
    let cause: Cause = Arc::from(boxed);
    let inherited = cause
        .downcast_ref::<StructuredError>()
        .and_then(StructuredError::is_retryable);

    let created = StructuredError::new(Category::InternalService, sub_code, message, params);
    let created = match inherited {
        Some(retryable) => created.with_retryable(retryable),
        None => created,
    };
    created.with_cause(cause)
}

/// Whether `err` is structured and its rendering contains `needle`.
pub fn matches(err: &(dyn Error + 'static), needle: &str) -> bool {
    err.downcast_ref::<StructuredError>()
        .is_some_and(|structured| structured.matches(needle))
}

/// Whether `err` is structured and its code starts with the dot-joined
/// `parts`.
pub fn prefix_matches(err: &(dyn Error + 'static), parts: &[&str]) -> bool {
    err.downcast_ref::<StructuredError>()
        .is_some_and(|structured| structured.prefix_matches(parts))
}

/// Whether any structured link in the causal chain of `err` has a code
/// starting with the dot-joined `code` parts.
///
/// The walk stops with `false` at the first opaque link.
pub fn is(err: &(dyn Error + 'static), code: &[&str]) -> bool {
    let mut next = Some(err);
    while let Some(link) = next {
        let Some(structured) = link.downcast_ref::<StructuredError>() else {
            return false;
        };
        if structured.prefix_matches(code) {
            return true;
        }
        next = structured
            .cause()
            .map(|cause| cause as &(dyn Error + 'static));
    }
    false
}

fn wrap_error<E: Into<BoxError>>(
    err: E,
    params: Option<Params>,
    category: Category,
) -> StructuredError {
    match classify(err) {
        Ok(structured) => structured.with_merged_params(params),
        Err(opaque) => StructuredError::new(category, "", opaque.to_string(), params),
    }
}

fn propagate_error<E: Into<BoxError>>(err: E) -> StructuredError {
    match classify(err) {
        Ok(structured) => structured,
        Err(opaque) => {
            let message = opaque.to_string();
            new_internal_with_cause(opaque, message, None, "")
        }
    }
}

fn augment_error<E: Into<BoxError>>(
    err: E,
    message: String,
    params: Option<Params>,
) -> StructuredError {
    match classify(err) {
        Ok(structured) => structured.augmented(message, params),
        Err(opaque) => new_internal_with_cause(opaque, message, params, ""),
    }
}

/// Chain operations on the error side of a `Result`. `Ok` passes through.
///
/// ```rust
/// use service_errors::chain::ResultExt;
/// use service_errors::{params, ServiceResult};
///
/// fn read_config() -> Result<String, std::io::Error> {
///     Err(std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml missing"))
/// }
///
/// fn load() -> ServiceResult<String> {
///     read_config().augment_err("while loading settings", Some(params([("file", "config.toml")])))
/// }
///
/// let err = load().unwrap_err();
/// assert_eq!(err.code(), "internal_service");
/// assert!(err.to_string().ends_with("config.toml missing"));
/// ```
pub trait ResultExt<T> {
    /// See [`wrap`].
    fn wrap_err(self, params: Option<Params>) -> Result<T, StructuredError>;

    /// See [`wrap_with_code`].
    fn wrap_err_with_code(
        self,
        params: Option<Params>,
        category: Category,
    ) -> Result<T, StructuredError>;

    /// See [`propagate`].
    fn propagate_err(self) -> Result<T, StructuredError>;

    /// See [`augment`].
    fn augment_err(
        self,
        message: impl Into<String>,
        params: Option<Params>,
    ) -> Result<T, StructuredError>;
}

impl<T, E: Into<BoxError>> ResultExt<T> for Result<T, E> {
    fn wrap_err(self, params: Option<Params>) -> Result<T, StructuredError> {
        self.map_err(|err| wrap_error(err, params, Category::InternalService))
    }

    fn wrap_err_with_code(
        self,
        params: Option<Params>,
        category: Category,
    ) -> Result<T, StructuredError> {
        self.map_err(|err| wrap_error(err, params, category))
    }

    fn propagate_err(self) -> Result<T, StructuredError> {
        self.map_err(propagate_error)
    }

    fn augment_err(
        self,
        message: impl Into<String>,
        params: Option<Params>,
    ) -> Result<T, StructuredError> {
        self.map_err(|err| augment_error(err, message.into(), params))
    }
}
