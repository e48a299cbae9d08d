//! Result type aliases

use crate::error::PulseError;

/// Standard Result type for Pulse ERP operations
pub type PulseResult<T> = Result<T, PulseError>;
