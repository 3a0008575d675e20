//! Shared fallible-operation alias

use super::errors::CourierError;

/// Result carrying [`CourierError`], used across the fetch, build and
/// delivery layers where the error kind is not yet narrowed.
///
/// ```
/// use courier::domain::{CourierError, Result};
///
/// fn checked_endpoint(url: &str) -> Result<&str> {
///     if url.is_empty() {
///         return Err(CourierError::Configuration("endpoint is empty".to_string()));
///     }
///     Ok(url)
/// }
/// ```
pub type Result<T> = std::result::Result<T, CourierError>;
