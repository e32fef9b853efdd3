//! Star rating type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingError {
    /// No star has been selected yet.
    #[error("rating has not been set")]
    Unset,
    /// The value is above the five-star maximum.
    #[error("rating must be at most {max} (got {value})")]
    TooHigh {
        /// Maximum number of stars.
        max: u8,
        /// The rejected value.
        value: u8,
    },
}

/// A star rating between 1 and 5 inclusive.
///
/// Zero is the "not yet rated" sentinel used by rating widgets and is never a
/// valid `Rating`; construction rejects it so an unrated submission cannot
/// slip through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Minimum number of stars.
    pub const MIN: u8 = 1;
    /// Maximum number of stars.
    pub const MAX: u8 = 5;

    /// Create a `Rating`, rejecting values outside 1..=5.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::Unset`] for 0 and [`RatingError::TooHigh`] for
    /// values above 5.
    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if value < Self::MIN {
            return Err(RatingError::Unset);
        }
        if value > Self::MAX {
            return Err(RatingError::TooHigh {
                max: Self::MAX,
                value,
            });
        }
        Ok(Self(value))
    }

    /// Create a `Rating` by clamping the value into 1..=5.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value < Self::MIN {
            Self(Self::MIN)
        } else if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    /// Get the number of stars.
    #[must_use]
    pub const fn stars(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_valid_range() {
        for value in 1..=5 {
            assert_eq!(Rating::new(value).unwrap().stars(), value);
        }
    }

    #[test]
    fn test_new_rejects_zero() {
        assert_eq!(Rating::new(0), Err(RatingError::Unset));
    }

    #[test]
    fn test_new_rejects_above_max() {
        assert_eq!(
            Rating::new(6),
            Err(RatingError::TooHigh { max: 5, value: 6 })
        );
    }

    #[test]
    fn test_clamped() {
        assert_eq!(Rating::clamped(0).stars(), 1);
        assert_eq!(Rating::clamped(3).stars(), 3);
        assert_eq!(Rating::clamped(9).stars(), 5);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rating::new(4).unwrap().to_string(), "4/5");
    }

    #[test]
    fn test_serde_transparent() {
        let rating = Rating::new(5).unwrap();
        assert_eq!(serde_json::to_string(&rating).unwrap(), "5");
    }
}
