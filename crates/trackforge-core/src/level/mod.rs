//! Accessibility levels
//!
//! The graded verdict produced for every requirement, node and dungeon.
//! Levels form a total order and are combined with two reducers:
//!
//! - [`AccessibilityLevel::max_of`]: best of any path (sibling branches)
//! - [`AccessibilityLevel::min_of`]: worst of all required conditions (a chain)


use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TrackerError};

/// A graded reachability verdict.
///
/// The declaration order is the lattice order:
/// `None < Inspect < Partial < SequenceBreak < Normal < Cleared`.
///
/// # Examples
///
/// ```
/// use trackforge_core::AccessibilityLevel;
///
/// let level = AccessibilityLevel::min_of([
///     AccessibilityLevel::Normal,
///     AccessibilityLevel::SequenceBreak,
/// ]).unwrap();
///
/// assert_eq!(level, AccessibilityLevel::SequenceBreak);
/// assert!(AccessibilityLevel::max_of([]).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AccessibilityLevel {
    /// Not reachable.
    #[default]
    None,
    /// Visible but not obtainable.
    Inspect,
    /// Some, but not all, of a group is reachable.
    Partial,
    /// Reachable only through an out-of-logic trick.
    SequenceBreak,
    /// Reachable in logic.
    Normal,
    /// Already collected or completed.
    Cleared,
}

impl AccessibilityLevel {
    /// Every level, in ascending order.
    pub const ALL: [AccessibilityLevel; 6] = [
        AccessibilityLevel::None,
        AccessibilityLevel::Inspect,
        AccessibilityLevel::Partial,
        AccessibilityLevel::SequenceBreak,
        AccessibilityLevel::Normal,
        AccessibilityLevel::Cleared,
    ];

    /// Returns the greatest level, or [`TrackerError::EmptyLevels`] on empty input.
    pub fn max_of<I>(levels: I) -> Result<Self>
    where
        I: IntoIterator<Item = AccessibilityLevel>,
    {
        levels.into_iter().max().ok_or(TrackerError::EmptyLevels)
    }

    /// Returns the least level, or [`TrackerError::EmptyLevels`] on empty input.
    pub fn min_of<I>(levels: I) -> Result<Self>
    where
        I: IntoIterator<Item = AccessibilityLevel>,
    {
        levels.into_iter().min().ok_or(TrackerError::EmptyLevels)
    }

    /// Maps a boolean condition onto the lattice (`Normal` or `None`).
    #[inline]
    pub const fn from_met(met: bool) -> Self {
        if met {
            AccessibilityLevel::Normal
        } else {
            AccessibilityLevel::None
        }
    }

    /// Returns true if the level can actually be reached, in or out of logic.
    #[inline]
    pub fn is_reachable(self) -> bool {
        self >= AccessibilityLevel::SequenceBreak
    }

    /// Caps the level at what may be counted when sequence breaks are not tracked.
    ///
    /// A `SequenceBreak` verdict collapses to `None` unless `sequence_breaks` is set.
    #[inline]
    pub fn within_logic(self, sequence_breaks: bool) -> Self {
        if self == AccessibilityLevel::SequenceBreak && !sequence_breaks {
            AccessibilityLevel::None
        } else {
            self
        }
    }

    /// Lowest level admitted as reachable under the given tracking mode.
    #[inline]
    pub const fn threshold(sequence_breaks: bool) -> Self {
        if sequence_breaks {
            AccessibilityLevel::SequenceBreak
        } else {
            AccessibilityLevel::Normal
        }
    }

    /// Returns the lowercase name of this level.
    pub const fn as_str(self) -> &'static str {
        match self {
            AccessibilityLevel::None => "none",
            AccessibilityLevel::Inspect => "inspect",
            AccessibilityLevel::Partial => "partial",
            AccessibilityLevel::SequenceBreak => "sequence_break",
            AccessibilityLevel::Normal => "normal",
            AccessibilityLevel::Cleared => "cleared",
        }
    }
}

impl fmt::Display for AccessibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an [`AccessibilityLevel`] fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelParseError {
    input: String,
}

impl fmt::Display for LevelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid accessibility level: '{}'", self.input)
    }
}

impl std::error::Error for LevelParseError {}

impl FromStr for AccessibilityLevel {
    type Err = LevelParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        AccessibilityLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| LevelParseError {
                input: s.to_string(),
            })
    }
}
