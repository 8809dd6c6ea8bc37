//! Logging utilities for service-errors
//!
//! Only the boundary adapters log; the error core itself never does.

// Re-export tracing macros with log_* naming
pub use tracing::{error as log_error, info as log_info, warn as log_warn};
