//! Delivered-item condition.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Condition of a delivered item, as reported by the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Condition {
    /// Factory-new, no visible wear.
    #[default]
    New,
    /// Minor wear, fully usable.
    Good,
    /// Noticeable wear.
    Average,
    /// Arrived damaged.
    Damaged,
}

impl Condition {
    /// All conditions in picker order.
    pub const ALL: [Self; 4] = [Self::New, Self::Good, Self::Average, Self::Damaged];

    /// Display label for the condition.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Damaged => "Damaged",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
