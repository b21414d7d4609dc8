//! Read-only view of the player's state.
//!
//! The engine never writes to this state. Collaborators that mutate it
//! (UI, undo stack, auto-tracking link) report each mutation as a
//! [`StateChange`] so that only dependent requirements are re-derived.

use crate::domain::{DungeonId, ItemId, SequenceBreakId, Setting};

/// Narrow read interface over item, key and setting state.
///
/// Counts are `Option`s: `None` means the value is currently unknown
/// (for example the emulator link is down). Unknown values never fail;
/// requirements observing them simply report not-met.
pub trait TrackerState: Send + Sync {
    /// Number of copies of `item` collected.
    fn item_count(&self, item: ItemId) -> Option<u32>;

    /// Small keys collected for `dungeon`.
    fn small_keys(&self, dungeon: DungeonId) -> Option<u32>;

    /// Whether the big key of `dungeon` has been collected.
    fn big_key(&self, dungeon: DungeonId) -> Option<bool>;

    /// Shared small keys, used when [`Setting::GenericKeys`] is on.
    fn generic_keys(&self) -> Option<u32> {
        None
    }

    /// Current value of a setting toggle.
    fn setting(&self, setting: Setting) -> bool;

    /// Whether the player has enabled tracking of a particular trick.
    fn sequence_break_enabled(&self, sequence_break: SequenceBreakId) -> bool;
}

/// A single externally observed mutation of [`TrackerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChange {
    /// An item count changed.
    Item(ItemId),
    /// A dungeon's small key count changed.
    SmallKeys(DungeonId),
    /// A dungeon's big key flag changed.
    BigKey(DungeonId),
    /// The shared small key count changed.
    GenericKeys,
    /// A setting toggle changed.
    Setting(Setting),
    /// A trick was enabled or disabled.
    SequenceBreak(SequenceBreakId),
    /// Anything may have changed (bulk reload, link restored).
    All,
}

impl StateChange {
    /// Returns the dungeon whose key inputs this change touches, if any.
    pub fn dungeon(&self) -> Option<DungeonId> {
        match self {
            StateChange::SmallKeys(d) | StateChange::BigKey(d) => Some(*d),
            _ => None,
        }
    }
}
