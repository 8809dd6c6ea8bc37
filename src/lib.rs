//! # service-errors
//!
//! Structured errors for service backends: every error carries a category,
//! a dotted code, a message, string params and a retryability flag, and may
//! point at the error that caused it.
//!
//! ## Key Features
//!
//! - **Classification**: nine fixed [`Category`] values refined by free-text
//!   dotted sub-codes (`bad_request.missing_param`)
//! - **Retryability**: derived from the code, or set explicitly and carried
//!   through every wrap
//! - **Causal chains**: [`chain::augment`] adds narrative at each layer while
//!   keeping the original classification; [`chain::is`] searches the chain
//! - **Boundaries**: status mapping and a request wrapper in [`http`],
//!   structured event logging in [`telemetry`]
//!
//! ## Example
//!
//! ```rust
//! use service_errors::chain::{augment, is, propagate};
//! use service_errors::{params, StructuredError};
//!
//! let err = StructuredError::bad_request(
//!     "missing_param",
//!     "amount is required",
//!     Some(params([("param", "amount")])),
//! );
//! let err = augment(Some(err), "while validating payment", None).unwrap();
//!
//! assert_eq!(err.to_string(), "bad_request.missing_param: while validating payment: amount is required");
//! assert!(is(&err, &["bad_request", "missing_param"]));
//! assert!(!err.retryable());
//! assert_eq!(err.status_code(), 400);
//!
//! let disk = propagate(Some("disk full")).unwrap();
//! assert_eq!(disk.code(), "internal_service");
//! assert!(disk.retryable());
//! ```

pub mod chain;
pub mod codes;
pub mod config;
pub mod error;
pub mod http;
pub(crate) mod logging;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use chain::{BoxError, ResultExt};
pub use codes::Category;
pub use config::LoggerConfig;
pub use error::{params, Params, ServiceResult, StructuredError};
pub use telemetry::{EventLogger, LogContext, TracingLogger};
