//! Search inputs captured from the accessibility graph.

use trackforge_core::{AccessibilityLevel, Result, Setting};
use trackforge_logic::LogicGraph;

use crate::dungeon::Dungeon;
use crate::state::{DoorSet, DungeonState};

/// Everything a search reads from outside the dungeon.
///
/// Two equal snapshots always produce the same result, so callers can
/// skip a search when the snapshot has not changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DungeonInputs {
    /// Level of the overworld entry node.
    pub entry: AccessibilityLevel,
    /// Level of each requirement, in the dungeon's input-slot order.
    pub requirements: Vec<AccessibilityLevel>,
    /// Keys available to spend, clamped to what the dungeon can use.
    pub small_keys: u32,
    pub big_key: bool,
    pub sequence_breaks: bool,
    pub key_drop_shuffle: bool,
}

impl DungeonInputs {
    /// Reads the current inputs of `dungeon` from `graph` and its state.
    ///
    /// Unavailable key counts read as zero.
    pub fn capture(dungeon: &Dungeon, graph: &LogicGraph) -> Result<Self> {
        let state = graph.state();
        let entry = graph.node_accessibility(dungeon.entry())?;
        let requirements = dungeon
            .requirements()
            .iter()
            .map(|id| graph.requirement_accessibility(*id))
            .collect::<Result<Vec<_>>>()?;

        let key_drop_shuffle = state.setting(Setting::KeyDropShuffle);
        let small_keys = if state.setting(Setting::GenericKeys) {
            state.generic_keys().unwrap_or(0)
        } else {
            state
                .small_keys(dungeon.id())
                .unwrap_or(0)
                .min(dungeon.key_cap(key_drop_shuffle))
        };

        Ok(Self {
            entry,
            requirements,
            small_keys,
            big_key: state.big_key(dungeon.id()) == Some(true),
            sequence_breaks: state.setting(Setting::SequenceBreaks),
            key_drop_shuffle,
        })
    }

    /// Builds the state of one candidate layout.
    pub fn state(&self, unlocked: DoorSet) -> DungeonState {
        DungeonState::new(unlocked, self.small_keys, self.big_key, self.sequence_breaks)
    }

    /// Level of a requirement slot; slots past the end read as `None`.
    #[inline]
    pub(crate) fn requirement(&self, slot: usize) -> AccessibilityLevel {
        self.requirements.get(slot).copied().unwrap_or_default()
    }
}
