//! Bounded product rating.

use serde::{Deserialize, Serialize};

/// Error returned when a rating is outside the allowed range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between {min} and {max}, got {value}", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingError {
    /// The rejected value.
    pub value: i32,
}

/// A star rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(i32);

impl Rating {
    /// Lowest allowed rating.
    pub const MIN: i32 = 1;
    /// Highest allowed rating.
    pub const MAX: i32 = 5;

    /// Create a rating, rejecting values outside `[1, 5]`.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError`] if `value` is out of range.
    pub const fn new(value: i32) -> Result<Self, RatingError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(RatingError { value })
        }
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Rating {
    type Error = RatingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert_eq!(Rating::new(0).unwrap_err().value, 0);
        assert_eq!(Rating::new(6).unwrap_err().value, 6);
        assert!(Rating::new(-3).is_err());
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        let ok: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(ok.as_i32(), 4);
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }
}
