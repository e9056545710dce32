//! Result type alias for offboard

use super::errors::OffboardError;

/// Result type alias for offboard operations
///
/// # Examples
///
/// ```
/// use offboard::domain::result::Result;
/// use offboard::domain::errors::OffboardError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(OffboardError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, OffboardError>;
