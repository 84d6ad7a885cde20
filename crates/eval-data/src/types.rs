//! Core domain types shared by the registry, the test set and the parser.
//!
//! Key ideas:
//! - Raw ids are whatever the caller hands us (any `Clone + Eq + Hash` type)
//! - Mapped ids are dense `usize` indices handed out by the registry
//! - Ratings arrive in many shapes and are always stored as `f64`
//!
//! Rust concepts demonstrated here:
//! - Type aliases for domain clarity (MappedUserId, MappedItemId)
//! - A small trait (`RatingValue`) implemented for many types
//! - `macro_rules!` to stamp out the same impl for every integer type
//! - Derive macros (serde) for plain value types

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Dense index assigned to a raw user id by the registry
pub type MappedUserId = usize;

/// Dense index assigned to a raw item id by the registry
pub type MappedItemId = usize;

/// A (user, item, rating) observation straight out of a text file.
///
/// The rating stays a string so conversion errors surface when the batch
/// is built, not while reading.
pub type RawTriplet = (String, String, String);

// =============================================================================
// Rating conversion
// =============================================================================

/// Anything that can be turned into a stored rating.
///
/// Integers and floats always convert. Strings are trimmed and parsed as
/// floats, failing with `DataError::InvalidRating`.
///
/// Rust concept: a trait lets `TestSet::from_uir_triplets` accept `i32`,
/// `f64` or `String` ratings through one generic parameter `R: RatingValue`,
/// with the conversion picked at compile time.
pub trait RatingValue {
    fn to_rating(&self) -> Result<f64>;
}

impl RatingValue for f64 {
    fn to_rating(&self) -> Result<f64> {
        Ok(*self)
    }
}

impl RatingValue for f32 {
    fn to_rating(&self) -> Result<f64> {
        Ok(f64::from(*self))
    }
}

// Rust concept: `as f64` is exact for every integer up to 2^53, well past
// any rating scale.
macro_rules! int_rating_value {
    ($($t:ty),*) => {
        $(
            impl RatingValue for $t {
                fn to_rating(&self) -> Result<f64> {
                    Ok(*self as f64)
                }
            }
        )*
    };
}

int_rating_value!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl RatingValue for str {
    fn to_rating(&self) -> Result<f64> {
        let invalid = || DataError::InvalidRating {
            value: self.to_string(),
        };
        let trimmed = self.trim();

        // Digit grouping ("1_000") is accepted when every `_` sits between two digits
        let digits;
        let text = if trimmed.contains('_') {
            let bytes = trimmed.as_bytes();
            let grouped_ok = bytes.iter().enumerate().all(|(i, &b)| {
                b != b'_'
                    || (i > 0
                        && bytes[i - 1].is_ascii_digit()
                        && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
            });
            if !grouped_ok {
                return Err(invalid());
            }
            digits = trimmed.replace('_', "");
            digits.as_str()
        } else {
            trimmed
        };

        text.parse::<f64>().map_err(|_| invalid())
    }
}

impl RatingValue for &str {
    fn to_rating(&self) -> Result<f64> {
        (**self).to_rating()
    }
}

impl RatingValue for String {
    fn to_rating(&self) -> Result<f64> {
        self.as_str().to_rating()
    }
}

// =============================================================================
// Build statistics
// =============================================================================

/// Counters collected while building a test set.
///
/// The first three are the diagnostics printed in verbose mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Distinct mapped users with at least one rating in the batch
    pub tested_users: usize,
    /// Accepted triplets whose raw user was not yet in the global mapping
    pub unknown_users: usize,
    /// Accepted triplets whose raw item was not yet in the global mapping
    pub unknown_items: usize,
    /// Triplets dropped because their (user, item) pair was already seen
    pub skipped_duplicates: usize,
    /// Ratings stored in the batch
    pub ratings: usize,
}

// =============================================================================
// Triplet file format
// =============================================================================

/// How a triplet file is laid out on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripletFormat {
    /// Field separator, `::` for MovieLens `.dat` files
    pub separator: String,
    /// Header lines to drop before parsing
    pub skip_lines: usize,
}

impl TripletFormat {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            skip_lines: 0,
        }
    }

    /// Builder-style setter for the number of header lines
    pub fn skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = skip_lines;
        self
    }
}

impl Default for TripletFormat {
    fn default() -> Self {
        Self::new("::")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ratings() {
        assert_eq!(3i32.to_rating().unwrap(), 3.0);
        assert_eq!(5u8.to_rating().unwrap(), 5.0);
        assert_eq!(2.5f64.to_rating().unwrap(), 2.5);
        assert_eq!(4.5f32.to_rating().unwrap(), 4.5);
    }

    #[test]
    fn test_ratings_keep_double_precision() {
        // Values that an f32 would round or overflow
        assert_eq!(16_777_217i64.to_rating().unwrap(), 16_777_217.0);
        assert_eq!(0.1f64.to_rating().unwrap(), 0.1);
        assert_eq!("1e300".to_rating().unwrap(), 1e300);
        assert!("1e300".to_rating().unwrap().is_finite());
    }

    #[test]
    fn test_digit_grouping() {
        assert_eq!("1_000".to_rating().unwrap(), 1000.0);
        assert_eq!("2_5.0_5".to_rating().unwrap(), 25.05);

        for bad in ["_1", "1_", "1__0", "1_.5", "1._5"] {
            assert!(
                matches!(bad.to_rating(), Err(DataError::InvalidRating { ref value }) if value == bad),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_string_ratings() {
        assert_eq!("4".to_rating().unwrap(), 4.0);
        assert_eq!(" 3.5 ".to_rating().unwrap(), 3.5);
        assert_eq!(String::from("1e0").to_rating().unwrap(), 1.0);
    }

    #[test]
    fn test_invalid_string_rating() {
        let err = "five".to_rating().unwrap_err();
        assert!(matches!(err, DataError::InvalidRating { ref value } if value == "five"));
        assert!("".to_rating().is_err());
    }

    #[test]
    fn test_format_defaults() {
        let format = TripletFormat::default();
        assert_eq!(format.separator, "::");
        assert_eq!(format.skip_lines, 0);

        let format: TripletFormat = serde_json::from_str(r#"{"separator": ","}"#).unwrap();
        assert_eq!(format, TripletFormat::new(",").skip_lines(0));
    }
}
