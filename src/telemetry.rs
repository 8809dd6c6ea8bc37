//! Structured event logging for service boundaries.
//!
//! [`EventLogger`] is the contract a telemetry backend implements.
//! [`TracingLogger`] is the provided implementation, emitting `tracing`
//! events; install any `tracing` subscriber to collect them.
//!
//! Errors reach the logger through [`record_error`], which merges the
//! error's [`log_metadata`](crate::StructuredError::log_metadata) with any
//! extra data and logs the full rendered chain.

use crate::config::LoggerConfig;
use crate::error::{Params, StructuredError};
use crate::logging::{log_error, log_info, log_warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Identifies who and which request an event belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogContext {
    pub correlation_id: String,
    pub user_id: String,
}

impl LogContext {
    pub fn new(correlation_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Context for a new request, with a fresh v4 UUID as correlation id.
    pub fn for_request(user_id: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), user_id)
    }

    /// Correlation id to tag an event with; `None` when empty.
    pub fn correlation_tag(&self) -> Option<&str> {
        non_empty(&self.correlation_id)
    }

    /// User id to tag an event with; `None` when empty.
    pub fn user_tag(&self) -> Option<&str> {
        non_empty(&self.user_id)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// A failure to record, with the classification a backend needs to pick
/// severity and alerting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    /// Full rendered error, including the causal chain.
    pub message: String,
    /// The error's dotted code, e.g. `not_found.user`.
    pub code: String,
    pub retryable: bool,
    pub data: Params,
}

/// A completed request, as seen by the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEvent {
    pub method: String,
    pub url: String,
    pub duration: Duration,
    /// Status code in string form, e.g. `"404"`.
    pub response_code: String,
    pub client_address: String,
}

/// Sink for structured service events.
#[cfg_attr(test, mockall::automock)]
pub trait EventLogger {
    /// Record a numeric value not tied to a specific event, such as a
    /// periodic performance indicator.
    fn metric(&self, name: &str, value: f64, context: &LogContext);

    fn info(&self, code: &str, message: &str, data: &Params, context: &LogContext);

    fn warning(&self, code: &str, message: &str, data: &Params, context: &LogContext);

    /// Record a failure under the event code `code`.
    fn error(&self, code: &str, event: &ErrorEvent, context: &LogContext);

    fn request(&self, event: &RequestEvent, context: &LogContext);
}

/// Log `err` under the event code `code`.
///
/// `data` is merged over the error's own params, so keys given here win.
pub fn record_error(
    logger: &dyn EventLogger,
    code: &str,
    err: &StructuredError,
    data: Option<&Params>,
    context: &LogContext,
) {
    let mut merged = err.log_metadata().clone();
    if let Some(data) = data {
        merged.extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    let event = ErrorEvent {
        message: err.to_string(),
        code: err.code().to_string(),
        retryable: err.retryable(),
        data: merged,
    };
    logger.error(code, &event, context);
}

/// [`EventLogger`] backed by `tracing` events.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    service_name: String,
    attach_params: bool,
}

impl TracingLogger {
    /// Logger for `service_name` with the default configuration otherwise.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            attach_params: LoggerConfig::default().attach_params,
        }
    }

    /// Build a logger from a validated configuration.
    pub fn from_config(config: LoggerConfig) -> Result<Self, StructuredError> {
        config.validate()?;
        Ok(Self {
            service_name: config.service_name,
            attach_params: config.attach_params,
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub(crate) fn attached<'a>(&self, data: &'a Params) -> Option<&'a Params> {
        self.attach_params.then_some(data)
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        let config = LoggerConfig::default();
        Self {
            service_name: config.service_name,
            attach_params: config.attach_params,
        }
    }
}

impl EventLogger for TracingLogger {
    fn metric(&self, name: &str, value: f64, context: &LogContext) {
        log_info!(
            service = %self.service_name,
            metric_name = %name,
            metric_value = value,
            correlation_id = context.correlation_tag(),
            user_id = context.user_tag(),
            "Metric recorded"
        );
    }

    fn info(&self, code: &str, message: &str, data: &Params, context: &LogContext) {
        log_info!(
            service = %self.service_name,
            event_code = %code,
            correlation_id = context.correlation_tag(),
            user_id = context.user_tag(),
            params = ?self.attached(data),
            "{message}"
        );
    }

    fn warning(&self, code: &str, message: &str, data: &Params, context: &LogContext) {
        log_warn!(
            service = %self.service_name,
            event_code = %code,
            correlation_id = context.correlation_tag(),
            user_id = context.user_tag(),
            params = ?self.attached(data),
            "{message}"
        );
    }

    fn error(&self, code: &str, event: &ErrorEvent, context: &LogContext) {
        log_error!(
            service = %self.service_name,
            event_code = %code,
            code = %event.code,
            retryable = event.retryable,
            correlation_id = context.correlation_tag(),
            user_id = context.user_tag(),
            params = ?self.attached(&event.data),
            "{}",
            event.message
        );
    }

    fn request(&self, event: &RequestEvent, context: &LogContext) {
        log_info!(
            service = %self.service_name,
            method = %event.method,
            url = %event.url,
            duration_ms = event.duration.as_millis() as u64,
            response_code = %event.response_code,
            client_address = %event.client_address,
            correlation_id = context.correlation_tag(),
            user_id = context.user_tag(),
            "Request handled"
        );
    }
}
