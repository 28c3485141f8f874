//! Logging setup for host applications.
//!
//! The library itself only emits records through the `log` facade; hosts that
//! do not already install a logger can call `init_logger_with` once at startup.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
