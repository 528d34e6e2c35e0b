//! Result type alias for squash operations

use crate::Error;

/// Result type alias for squash operations
pub type Result<T> = std::result::Result<T, Error>;
