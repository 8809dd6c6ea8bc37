// Unit Tests for the HTTP Boundary
//
// UNIT UNDER TEST: status_code, RequestInfo, HandlerResponse, handle_request
//
// BUSINESS RESPONSIBILITY:
//   - Maps error categories to transport status codes
//   - Reconstructs the request URL and client address for request logs
//   - Answers failed requests with the mapped status and serialized error
//   - Logs every request exactly once with its final status
//
// TEST COVERAGE:
//   - Full category to status table, including the 500 fallback
//   - URL building with and without an explicit scheme
//   - Success, failure and unserializable-success handler outcomes
//   - Request logging through a mocked EventLogger

use crate::chain::augment;
use crate::codes::Category;
use crate::error::{params, StructuredError};
use crate::http::{
    handle_request, status_code, status_code_for_typecode, HandlerResponse, RequestInfo,
};
use crate::telemetry::MockEventLogger;
use serde_json::{json, Value};
use std::collections::HashMap;

#[cfg(test)]
mod status_mapping_tests {
    use super::*;

    #[test]
    fn test_category_status_table() {
        let expected = [
            (Category::BadRequest, 400),
            (Category::BadResponse, 406),
            (Category::Forbidden, 403),
            (Category::InternalService, 500),
            (Category::NotFound, 404),
            (Category::PreconditionFailed, 412),
            (Category::Timeout, 504),
            (Category::Unauthorized, 401),
            (Category::Unknown, 500),
        ];

        for (category, status) in expected {
            assert_eq!(status_code(category), status, "status for {category}");
        }
    }

    #[test]
    fn test_unmapped_typecode_defaults_to_500() {
        assert_eq!(status_code_for_typecode("not_found"), 404);
        assert_eq!(status_code_for_typecode("teapot"), 500);
        assert_eq!(status_code_for_typecode(""), 500);
    }

    #[test]
    fn test_error_status_follows_category_not_sub_code() {
        let err = StructuredError::unauthorized("token.expired", "expired", None);
        assert_eq!(err.status_code(), 401);
    }
}

#[cfg(test)]
mod request_info_tests {
    use super::*;

    #[test]
    fn test_url_defaults_to_https() {
        let request = RequestInfo::new("GET", "api.example.com", "/users/42?full=1");

        assert_eq!(request.url(), "https://api.example.com/users/42?full=1");
        assert_eq!(request.client_address(), "");
    }

    #[test]
    fn test_url_uses_explicit_scheme_and_forwarded_for() {
        let request = RequestInfo::new("POST", "localhost:8080", "/orders")
            .with_scheme("http")
            .with_forwarded_for("203.0.113.7");

        assert_eq!(request.url(), "http://localhost:8080/orders");
        assert_eq!(request.client_address(), "203.0.113.7");
    }
}

#[cfg(test)]
mod handler_response_tests {
    use super::*;

    #[test]
    fn test_error_body_excludes_cause() {
        // Arrange
        let root = StructuredError::not_found("user", "no such user", Some(params([("id", "42")])));
        let err = augment(Some(root), "while loading profile", None).unwrap();

        // Act
        let response = HandlerResponse::from_error(&err);

        // Assert
        assert_eq!(response.status, 404);
        let body: Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "typecode": "not_found",
                "code": "not_found.user",
                "message": "while loading profile",
                "params": {"id": "42"},
                "is_retryable": false,
            })
        );
    }
}

#[cfg(test)]
mod handle_request_tests {
    use super::*;

    #[test]
    fn test_success_logs_200_and_serializes_value() {
        // Arrange
        let mut logger = MockEventLogger::new();
        logger
            .expect_request()
            .times(1)
            .withf(|event, context| {
                event.method == "GET"
                    && event.url == "https://api.example.com/health"
                    && event.response_code == "200"
                    && event.client_address == "198.51.100.1"
                    && context.user_id == "user-1"
                    && !context.correlation_id.is_empty()
            })
            .return_const(());
        let request = RequestInfo::new("GET", "api.example.com", "/health")
            .with_forwarded_for("198.51.100.1");

        // Act
        let response = handle_request(&logger, &request, "user-1", |_| {
            Ok(json!({"status": "ok"}))
        });

        // Assert
        assert_eq!(response.status, 200);
        assert_eq!(response.body.as_deref(), Some(r#"{"status":"ok"}"#));
    }

    #[test]
    fn test_failure_maps_status_and_logs_it() {
        // Arrange
        let mut logger = MockEventLogger::new();
        logger
            .expect_request()
            .times(1)
            .withf(|event, _| event.response_code == "412")
            .return_const(());
        let request = RequestInfo::new("PUT", "api.example.com", "/docs/7");

        // Act
        let response = handle_request(&logger, &request, "user-1", |_| {
            Err::<Value, _>(StructuredError::precondition_failed("etag", "stale etag", None))
        });

        // Assert
        assert_eq!(response.status, 412);
        let body: Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["code"], "precondition_failed.etag");
    }

    #[test]
    fn test_handler_receives_request_context() {
        let mut logger = MockEventLogger::new();
        let mut seen_correlation = String::new();
        logger.expect_request().times(1).return_const(());

        let request = RequestInfo::new("GET", "h", "/");
        handle_request(&logger, &request, "user-9", |context| {
            seen_correlation = context.correlation_id.clone();
            assert_eq!(context.user_id, "user-9");
            Ok(())
        });

        assert_eq!(seen_correlation.len(), 36, "correlation id should be a UUID");
    }

    #[test]
    fn test_unserializable_success_becomes_bad_response() {
        // Test verifies a handler returning an invalid message format is reported as 406

        // Arrange
        let mut logger = MockEventLogger::new();
        logger
            .expect_request()
            .times(1)
            .withf(|event, _| event.response_code == "406")
            .return_const(());
        let request = RequestInfo::new("GET", "h", "/broken");

        // Act
        let response = handle_request(&logger, &request, "", |_| {
            let mut bad = HashMap::new();
            bad.insert((1, 2), 3);
            Ok(bad)
        });

        // Assert
        assert_eq!(response.status, 406);
        let body: Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["code"], "bad_response.serialize");
    }
}
