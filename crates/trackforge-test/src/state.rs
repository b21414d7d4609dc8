//! In-memory tracker state.
//!
//! Tests mutate the state through the setters and then report the
//! corresponding [`StateChange`](trackforge_core::StateChange) to the
//! component under test.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use trackforge_core::{DungeonId, ItemId, SequenceBreakId, Setting, TrackerState};

#[derive(Debug, Default)]
struct Inner {
    items: HashMap<ItemId, u32>,
    small_keys: HashMap<DungeonId, u32>,
    big_keys: HashSet<DungeonId>,
    generic_keys: u32,
    settings: HashSet<Setting>,
    sequence_breaks: HashSet<SequenceBreakId>,
    unavailable: bool,
}

/// A lock-protected, in-memory [`TrackerState`].
///
/// Missing entries read as zero / `false`. While [`set_unavailable`](Self::set_unavailable)
/// is on, every count reads as unknown, simulating a lost hardware link.
#[derive(Debug, Default)]
pub struct MemoryState {
    inner: RwLock<Inner>,
}

impl MemoryState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_item(&self, item: ItemId, count: u32) {
        self.inner.write().unwrap().items.insert(item, count);
    }

    pub fn set_small_keys(&self, dungeon: DungeonId, count: u32) {
        self.inner.write().unwrap().small_keys.insert(dungeon, count);
    }

    pub fn set_big_key(&self, dungeon: DungeonId, collected: bool) {
        let mut inner = self.inner.write().unwrap();
        if collected {
            inner.big_keys.insert(dungeon);
        } else {
            inner.big_keys.remove(&dungeon);
        }
    }

    pub fn set_generic_keys(&self, count: u32) {
        self.inner.write().unwrap().generic_keys = count;
    }

    pub fn set_setting(&self, setting: Setting, enabled: bool) {
        let mut inner = self.inner.write().unwrap();
        if enabled {
            inner.settings.insert(setting);
        } else {
            inner.settings.remove(&setting);
        }
    }

    pub fn set_sequence_break(&self, sequence_break: SequenceBreakId, enabled: bool) {
        let mut inner = self.inner.write().unwrap();
        if enabled {
            inner.sequence_breaks.insert(sequence_break);
        } else {
            inner.sequence_breaks.remove(&sequence_break);
        }
    }

    /// Makes every count read as unknown until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.write().unwrap().unavailable = unavailable;
    }
}

impl TrackerState for MemoryState {
    fn item_count(&self, item: ItemId) -> Option<u32> {
        let inner = self.inner.read().unwrap();
        if inner.unavailable {
            return None;
        }
        Some(inner.items.get(&item).copied().unwrap_or(0))
    }

    fn small_keys(&self, dungeon: DungeonId) -> Option<u32> {
        let inner = self.inner.read().unwrap();
        if inner.unavailable {
            return None;
        }
        Some(inner.small_keys.get(&dungeon).copied().unwrap_or(0))
    }

    fn big_key(&self, dungeon: DungeonId) -> Option<bool> {
        let inner = self.inner.read().unwrap();
        if inner.unavailable {
            return None;
        }
        Some(inner.big_keys.contains(&dungeon))
    }

    fn generic_keys(&self) -> Option<u32> {
        let inner = self.inner.read().unwrap();
        if inner.unavailable {
            return None;
        }
        Some(inner.generic_keys)
    }

    fn setting(&self, setting: Setting) -> bool {
        self.inner.read().unwrap().settings.contains(&setting)
    }

    fn sequence_break_enabled(&self, sequence_break: SequenceBreakId) -> bool {
        self.inner
            .read()
            .unwrap()
            .sequence_breaks
            .contains(&sequence_break)
    }
}
