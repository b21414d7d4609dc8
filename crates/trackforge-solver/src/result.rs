//! Search output.

use trackforge_core::AccessibilityLevel;

/// Result of one key-layout search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DungeonResult {
    /// Best level of each boss over all admitted layouts.
    pub bosses: Vec<AccessibilityLevel>,
    /// Most items reachable in any admitted layout.
    pub accessible: u32,
    /// Every layout reaching `accessible` used a sequence break.
    pub sequence_break: bool,
    /// Some admitted layout leaves an item inaccessible but visible.
    pub visible: bool,
    /// Fewest items left unreachable by any admitted layout.
    pub minimum_inaccessible: u32,
}

impl DungeonResult {
    /// A result in which nothing is reachable.
    pub fn unreachable(total_items: u32, boss_count: usize) -> Self {
        Self {
            bosses: vec![AccessibilityLevel::None; boss_count],
            accessible: 0,
            sequence_break: false,
            visible: false,
            minimum_inaccessible: total_items,
        }
    }

    /// Level of boss `index`; unknown bosses read as `None`.
    pub fn boss(&self, index: usize) -> AccessibilityLevel {
        self.bosses.get(index).copied().unwrap_or_default()
    }

    /// Folds the result into one level for a dungeon with `remaining`
    /// unchecked items.
    ///
    /// `Cleared` when nothing remains, `Normal` (or `SequenceBreak`) when
    /// at least `remaining` items are reachable, `Partial` when some are,
    /// `Inspect` when one is visible, `None` otherwise.
    pub fn item_accessibility(&self, remaining: u32) -> AccessibilityLevel {
        if remaining == 0 {
            AccessibilityLevel::Cleared
        } else if self.accessible >= remaining {
            if self.sequence_break {
                AccessibilityLevel::SequenceBreak
            } else {
                AccessibilityLevel::Normal
            }
        } else if self.accessible > 0 {
            AccessibilityLevel::Partial
        } else if self.visible {
            AccessibilityLevel::Inspect
        } else {
            AccessibilityLevel::None
        }
    }
}

/// Levels of every location under one explicit [`DungeonState`](crate::DungeonState).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateEvaluation {
    pub items: Vec<AccessibilityLevel>,
    pub bosses: Vec<AccessibilityLevel>,
}
