use crate::error::{params, StructuredError};
use serde::{Deserialize, Serialize};

/// Configuration for [`TracingLogger`](crate::telemetry::TracingLogger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Recorded on every event as `service`.
    pub service_name: String,
    /// Attach error params and event data to log events. Disable when params
    /// may carry data that must not reach the log backend.
    pub attach_params: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            service_name: "service".to_string(),
            attach_params: true,
        }
    }
}

impl LoggerConfig {
    /// Validate the configuration is complete
    ///
    /// # Errors
    ///
    /// Returns a `bad_request.config` error if the service name is empty or
    /// only whitespace.
    pub fn validate(&self) -> Result<(), StructuredError> {
        if self.service_name.trim().is_empty() {
            return Err(StructuredError::bad_request(
                "config",
                "Logger service name is required",
                Some(params([("field", "service_name")])),
            ));
        }
        Ok(())
    }
}
