//! Error handling.
//!
//! This module provides the error taxonomy of the crate:
//! - **Response errors**: construction, JSON decoding and wrapped sub-errors
//! - **Follow errors**: follow target validation and URL resolution
//! - **Query errors**: selector engine failures
//! - **Initialization errors**: logger setup
//!
//! Encoding detection has no error type: the detection chain always ends in a
//! default encoding and degrades to lossy decoding instead of failing.

mod types;

// Re-export public API
pub use types::{FollowError, InitializationError, QueryError, QueryKind, ResponseError};
