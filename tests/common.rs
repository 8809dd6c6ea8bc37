//! Test helper utilities for service-errors integration tests
//!
//! Shared fixtures modelling a small service stack: a repository layer that
//! fails with opaque or structured errors, and a service layer that augments
//! them.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use service_errors::chain::ResultExt;
use service_errors::{params, ServiceResult, StructuredError};
use std::io;

/// Repository lookup that fails with a structured not-found error.
pub fn find_user(id: &str) -> ServiceResult<String> {
    Err(StructuredError::not_found(
        "user",
        "no such user",
        Some(params([("id", id)])),
    ))
}

/// Repository write that fails with an opaque I/O error.
pub fn write_audit_log() -> Result<(), io::Error> {
    Err(io::Error::new(io::ErrorKind::Other, "disk full"))
}

/// Service call layering narrative on top of the repository errors.
pub fn load_profile(id: &str, request_id: &str) -> ServiceResult<String> {
    find_user(id).augment_err(
        "while loading profile",
        Some(params([("request_id", request_id)])),
    )
}
