//! Error types for the terra spatial index
//!
//! Only construction-time validation can fail. Entity and query operations
//! on a built index are total and never return these errors.

use std::fmt;

/// Result type for terra spatial operations
pub type Result<T> = std::result::Result<T, Error>;

/// Terra spatial errors
#[derive(Debug, Clone)]
pub enum Error {
    /// World bounds are inverted, empty on some axis, or not finite
    InvalidBounds(String),

    /// Maximum tree depth outside the accepted range
    InvalidDepth(u32),

    /// Minimum node size is zero, negative, or not finite
    InvalidNodeSize(f32),

    /// Leaf capacity of zero
    InvalidCapacity(usize),

    /// Cache TTL or entry budget rejected
    InvalidCacheConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidBounds(msg) => write!(f, "Invalid world bounds: {}", msg),
            Error::InvalidDepth(depth) => {
                write!(f, "Invalid max depth: {} (must be between 1 and 20)", depth)
            }
            Error::InvalidNodeSize(size) => {
                write!(f, "Invalid min node size: {} (must be positive)", size)
            }
            Error::InvalidCapacity(capacity) => {
                write!(f, "Invalid node capacity: {} (must be at least 1)", capacity)
            }
            Error::InvalidCacheConfig(msg) => write!(f, "Invalid cache config: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an error at ERROR severity (with file:line) and evaluate to it.
///
/// # Example
///
/// ```ignore
/// return Err(spatial_err!("terra::WorldConfig", Error::InvalidDepth(depth)));
/// ```
#[macro_export]
macro_rules! spatial_err {
    ($source:expr, $error:expr) => {{
        let error: $crate::terra::Error = $error;
        $crate::spatial_error!($source, "{}", error);
        error
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
