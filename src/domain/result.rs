//! Result type alias for DMP Sync

use super::errors::DmpError;

/// Result type alias for DMP Sync operations
///
/// # Examples
///
/// ```
/// use dmp_sync::domain::result::Result;
/// use dmp_sync::domain::errors::DmpError;
///
/// fn failing_function() -> Result<()> {
///     Err(DmpError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DmpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{DmpError, StorageError};

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> std::result::Result<i32, StorageError> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(DmpError::Validation("test error".to_string()));
        assert!(result.is_err());
    }
}
