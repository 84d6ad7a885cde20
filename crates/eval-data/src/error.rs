//! Error types for the eval-data crate.
//!
//! Two families of failures live here:
//! - construction failures (a rating that is not a number)
//! - strict lookups of raw ids that were never part of a batch
//!
//! plus the I/O and parse errors raised while reading triplet files.
//!
//! Rust error handling concepts demonstrated:
//! - thiserror for defining custom error types
//! - Struct-like enum variants that carry context (the offending value, line, file)
//! - `#[from]` for automatic conversion of `std::io::Error` with `?`
//! - A crate-wide `Result<T>` alias

use thiserror::Error;

/// Errors that can occur while loading triplets or building a test set
///
/// Rust concept: an enum lets callers `match` on exactly the failure they care
/// about. `get_ratings` never appears here because an unknown mapped user is
/// not an error, only an empty slice.
/// The `#[derive(Error)]` macro from thiserror implements `std::error::Error`
/// and `Display` from the `#[error(...)]` attributes.
#[derive(Error, Debug)]
pub enum DataError {
    /// Rating value could not be interpreted as a floating-point number
    #[error("Invalid rating value: {value:?}")]
    InvalidRating { value: String },

    /// Raw user id is not part of this batch
    ///
    /// The raw id is stored as its `Debug` rendering, so the error type stays
    /// free of the generic raw id parameter.
    #[error("Unknown raw user id: {raw}")]
    UnknownUser { raw: String },

    /// Raw item id is not part of this batch
    #[error("Unknown raw item id: {raw}")]
    UnknownItem { raw: String },

    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a triplet file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// Line has fewer fields than a (user, item, rating) triplet needs
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },
}

/// Convenience type alias for Results in this crate
///
/// Rust concept: Type aliases make code more readable.
/// `Result<T>` here means `Result<T, DataError>`.
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DataError::InvalidRating {
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid rating value: \"abc\"");

        let err = DataError::UnknownUser {
            raw: "\"u9\"".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown raw user id: \"u9\"");

        let err = DataError::FieldCountMismatch {
            expected: 3,
            found: 2,
            line: 7,
        };
        assert_eq!(err.to_string(), "Expected 3 fields but found 2 in line 7");
    }
}
