// Test modules for service-errors crate
//
// Each source module has a corresponding test file that focuses on
// behavior verification.

pub mod http;
