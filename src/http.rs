//! HTTP boundary glue.
//!
//! Maps error categories to status codes and runs a handler the way a
//! service endpoint expects: a fresh correlation id per request, timing, a
//! request log event, and the serialized error as the response body on
//! failure. No HTTP framework is assumed; adapt [`RequestInfo`] and
//! [`HandlerResponse`] to the one in use.

use crate::codes::Category;
use crate::error::StructuredError;
use crate::logging::log_error;
use crate::telemetry::{EventLogger, LogContext, RequestEvent};
use serde::Serialize;
use std::time::Instant;

pub const STATUS_OK: u16 = 200;
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;

/// Transport status for a category.
pub const fn status_code(category: Category) -> u16 {
    match category {
        Category::BadRequest => 400,
        Category::BadResponse => 406,
        Category::Forbidden => 403,
        Category::InternalService => 500,
        Category::NotFound => 404,
        Category::PreconditionFailed => 412,
        Category::Timeout => 504,
        Category::Unauthorized => 401,
        Category::Unknown => STATUS_INTERNAL_SERVER_ERROR,
    }
}

/// Transport status for a serialized `typecode`. Unrecognized typecodes map
/// to 500.
pub fn status_code_for_typecode(typecode: &str) -> u16 {
    typecode
        .parse::<Category>()
        .map(status_code)
        .unwrap_or(STATUS_INTERNAL_SERVER_ERROR)
}

impl StructuredError {
    /// Transport status for this error's category.
    pub fn status_code(&self) -> u16 {
        status_code(self.category())
    }
}

/// The parts of an incoming request the boundary needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: String,
    /// URL scheme if known; `https` is assumed otherwise.
    pub scheme: Option<String>,
    pub host: String,
    /// Path and query as received.
    pub request_uri: String,
    /// Value of the `X-Forwarded-For` header.
    pub forwarded_for: Option<String>,
}

impl RequestInfo {
    pub fn new(
        method: impl Into<String>,
        host: impl Into<String>,
        request_uri: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            host: host.into(),
            request_uri: request_uri.into(),
            ..Self::default()
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn with_forwarded_for(mut self, forwarded_for: impl Into<String>) -> Self {
        self.forwarded_for = Some(forwarded_for.into());
        self
    }

    /// `scheme://host/request_uri`
    pub fn url(&self) -> String {
        let scheme = match self.scheme.as_deref() {
            Some(scheme) if !scheme.is_empty() => scheme,
            _ => "https",
        };
        format!("{scheme}://{}{}", self.host, self.request_uri)
    }

    pub fn client_address(&self) -> &str {
        self.forwarded_for.as_deref().unwrap_or_default()
    }
}

/// Status and JSON body to write back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Option<String>,
}

impl HandlerResponse {
    /// Response for a failed request: the mapped status and the serialized
    /// error. The causal chain is not part of the body.
    pub fn from_error(err: &StructuredError) -> Self {
        let body = match serde_json::to_string(err) {
            Ok(body) => Some(body),
            Err(e) => {
                log_error!(
                    code = %err.code(),
                    error = %e,
                    "Failed to serialize error response body"
                );
                None
            }
        };
        Self {
            status: err.status_code(),
            body,
        }
    }
}

/// Run `handler` for `request` and produce the response to send.
///
/// The handler gets a [`LogContext`] with a fresh correlation id for
/// `user_id`. A success value is serialized as the body with status 200; if
/// that fails, the request is answered as a `bad_response` error. Every
/// request is logged through `logger` with its final status.
pub fn handle_request<T, F>(
    logger: &dyn EventLogger,
    request: &RequestInfo,
    user_id: &str,
    handler: F,
) -> HandlerResponse
where
    T: Serialize,
    F: FnOnce(&LogContext) -> Result<T, StructuredError>,
{
    let context = LogContext::for_request(user_id);
    let start = Instant::now();
    let outcome = handler(&context);
    let duration = start.elapsed();

    let response = match outcome.and_then(|value| {
        serde_json::to_string(&value).map_err(|e| {
            StructuredError::bad_response("serialize", e.to_string(), None)
        })
    }) {
        Ok(body) => HandlerResponse {
            status: STATUS_OK,
            body: Some(body),
        },
        Err(err) => HandlerResponse::from_error(&err),
    };

    let event = RequestEvent {
        method: request.method.clone(),
        url: request.url(),
        duration,
        response_code: response.status.to_string(),
        client_address: request.client_address().to_string(),
    };
    logger.request(&event, &context);

    response
}
