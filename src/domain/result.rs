//! Result type alias
//!
//! Convenience Result alias that uses [`VeneerError`] as the error type.

use super::errors::VeneerError;

/// Result type alias for pipeline operations
///
/// # Examples
///
/// ```
/// use veneer::domain::result::Result;
/// use veneer::domain::errors::VeneerError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(VeneerError::Export("disk full".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, VeneerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::VeneerError;

    #[test]
    fn test_result_ok() {
        let result: Result<i32> = Ok(42);
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(VeneerError::Io("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
