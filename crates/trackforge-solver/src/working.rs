//! Reusable working copies of a dungeon.
//!
//! A [`MutableDungeon`] holds the only mutable state of an evaluation:
//! the per-node levels and the `unlocked` flag of every key door. It is
//! owned by exactly one worker while checked out, and reset to the
//! pristine baseline before every layout it evaluates.

use std::sync::Arc;

use smallvec::SmallVec;
use trackforge_core::AccessibilityLevel;

use crate::dungeon::{BossIndex, Check, CompiledLocation, Dungeon, DungeonNode, ItemIndex, KeyDoorId};
use crate::inputs::DungeonInputs;
use crate::layout::LayoutOutcome;
use crate::state::DungeonState;

/// A mutable instance of one dungeon's interior graph.
#[derive(Debug, Clone)]
pub struct MutableDungeon {
    dungeon: Arc<Dungeon>,
    levels: Vec<AccessibilityLevel>,
    doors: Vec<bool>,
    items: Vec<AccessibilityLevel>,
    bosses: Vec<AccessibilityLevel>,
}

impl MutableDungeon {
    /// Allocates a pristine copy of `dungeon`.
    pub fn new(dungeon: Arc<Dungeon>) -> Self {
        Self {
            levels: vec![AccessibilityLevel::None; dungeon.node_count()],
            doors: vec![false; dungeon.door_count()],
            items: vec![AccessibilityLevel::None; dungeon.item_count()],
            bosses: vec![AccessibilityLevel::None; dungeon.boss_count()],
            dungeon,
        }
    }

    pub fn dungeon(&self) -> &Arc<Dungeon> {
        &self.dungeon
    }

    /// Locks every door and clears every derived level.
    pub fn reset(&mut self) {
        self.levels.fill(AccessibilityLevel::None);
        self.doors.fill(false);
        self.items.fill(AccessibilityLevel::None);
        self.bosses.fill(AccessibilityLevel::None);
    }

    /// Returns true if the copy reads as freshly reset.
    pub fn is_pristine(&self) -> bool {
        self.doors.iter().all(|unlocked| !unlocked)
            && self
                .levels
                .iter()
                .chain(&self.items)
                .chain(&self.bosses)
                .all(|level| *level == AccessibilityLevel::None)
    }

    pub fn door_unlocked(&self, door: KeyDoorId) -> bool {
        self.doors.get(door.index()).copied().unwrap_or(false)
    }

    pub fn node_level(&self, node: DungeonNode) -> AccessibilityLevel {
        self.levels.get(node.index()).copied().unwrap_or_default()
    }

    /// Raw level of an item location after the last evaluation.
    pub fn item_level(&self, item: ItemIndex) -> AccessibilityLevel {
        self.items.get(item.index()).copied().unwrap_or_default()
    }

    /// Raw level of a boss after the last evaluation.
    pub fn boss_level(&self, boss: BossIndex) -> AccessibilityLevel {
        self.bosses.get(boss.index()).copied().unwrap_or_default()
    }

    /// Evaluates `state` with its doors presumed unlocked, without
    /// checking that the layout could be realized.
    pub fn evaluate(&mut self, inputs: &DungeonInputs, state: &DungeonState) {
        self.reset();
        for door in state.unlocked.iter() {
            if let Some(flag) = self.doors.get_mut(door.index()) {
                *flag = true;
            }
        }
        self.propagate(inputs, state);
        self.collect_locations(inputs, state);
    }

    /// Evaluates one candidate layout of the key-layout search.
    ///
    /// Doors of the layout are opened only once they can be approached at
    /// the admission threshold, so a layout whose doors cannot all be
    /// reached from the entrance is rejected. A layout that leaves keys
    /// unspent while another locked door is approachable is not a leaf
    /// placement and is rejected as well. A layout naming doors this
    /// dungeon does not have is never admitted.
    pub fn assess(&mut self, inputs: &DungeonInputs, state: &DungeonState) -> Option<LayoutOutcome> {
        self.reset();
        if state.unlocked.bits().checked_shr(self.doors.len() as u32).unwrap_or(0) != 0 {
            return None;
        }
        let threshold = AccessibilityLevel::threshold(state.sequence_break);
        let mut sequence_break = false;

        if let Some(slot) = self.dungeon.end_gate {
            let gate = inputs.requirement(slot);
            if gate < threshold {
                return None;
            }
            sequence_break |= gate < AccessibilityLevel::Normal;
        }

        loop {
            self.propagate(inputs, state);
            let mut opened = false;
            for door in state.unlocked.iter() {
                if !self.doors[door.index()] && self.door_approach(door, inputs, state) >= threshold {
                    self.doors[door.index()] = true;
                    opened = true;
                }
            }
            if !opened {
                break;
            }
        }

        if state.unlocked.iter().any(|door| !self.doors[door.index()]) {
            return None;
        }
        sequence_break |= state
            .unlocked
            .iter()
            .any(|door| self.door_approach(door, inputs, state) < AccessibilityLevel::Normal);

        if !state.spends_all_keys() {
            let more = (0..self.doors.len() as u32).map(KeyDoorId).any(|door| {
                !state.unlocked.contains(door) && self.door_approach(door, inputs, state) >= threshold
            });
            if more {
                return None;
            }
        }

        self.collect_locations(inputs, state);

        let mut outcome = LayoutOutcome {
            sequence_break,
            ..LayoutOutcome::default()
        };
        for (item, raw) in self.dungeon.items.iter().zip(&self.items) {
            if item.key_drop && !inputs.key_drop_shuffle {
                continue;
            }
            let level = raw.within_logic(state.sequence_break);
            if level >= threshold {
                outcome.accessible += 1;
                outcome.sequence_break |= level < AccessibilityLevel::Normal;
            } else {
                outcome.inaccessible += 1;
                outcome.visible |= level >= AccessibilityLevel::Inspect;
            }
        }
        outcome.bosses = self
            .bosses
            .iter()
            .map(|raw| raw.within_logic(state.sequence_break))
            .collect::<SmallVec<_>>();

        tracing::trace!(
            event = "layout",
            dungeon = %self.dungeon.name(),
            unlocked = ?state.unlocked,
            accessible = outcome.accessible,
            sequence_break = outcome.sequence_break,
        );
        Some(outcome)
    }

    /// Recomputes node levels in topological order.
    fn propagate(&mut self, inputs: &DungeonInputs, state: &DungeonState) {
        let dungeon = Arc::clone(&self.dungeon);
        for node in &dungeon.order {
            let level = if node.index() == 0 {
                inputs.entry
            } else {
                dungeon.incoming[node.index()]
                    .iter()
                    .map(|edge| {
                        let source = self.levels[edge.from.index()];
                        edge.checks
                            .iter()
                            .map(|check| self.check_level(*check, inputs, state))
                            .fold(source, AccessibilityLevel::min)
                    })
                    .max()
                    .unwrap_or(AccessibilityLevel::None)
            };
            self.levels[node.index()] = level;
        }
    }

    /// Best level at which `door` itself can be reached.
    fn door_approach(
        &self,
        door: KeyDoorId,
        inputs: &DungeonInputs,
        state: &DungeonState,
    ) -> AccessibilityLevel {
        self.dungeon.door_edges[door.index()]
            .iter()
            .map(|(to, edge_index)| {
                let edge = &self.dungeon.incoming[to.index()][*edge_index];
                edge.checks
                    .iter()
                    .filter(|check| **check != Check::KeyDoor(door))
                    .map(|check| self.check_level(*check, inputs, state))
                    .fold(self.levels[edge.from.index()], AccessibilityLevel::min)
            })
            .max()
            .unwrap_or(AccessibilityLevel::None)
    }

    fn check_level(
        &self,
        check: Check,
        inputs: &DungeonInputs,
        state: &DungeonState,
    ) -> AccessibilityLevel {
        match check {
            Check::Requirement(slot) => inputs.requirement(slot),
            Check::KeyDoor(door) => AccessibilityLevel::from_met(self.doors[door.index()]),
            Check::BigKey => AccessibilityLevel::from_met(state.big_key),
        }
    }

    fn location_level(
        &self,
        location: &CompiledLocation,
        inputs: &DungeonInputs,
        state: &DungeonState,
    ) -> AccessibilityLevel {
        location
            .checks
            .iter()
            .map(|check| self.check_level(*check, inputs, state))
            .fold(self.levels[location.node.index()], AccessibilityLevel::min)
    }

    fn collect_locations(&mut self, inputs: &DungeonInputs, state: &DungeonState) {
        let dungeon = Arc::clone(&self.dungeon);
        for (index, item) in dungeon.items.iter().enumerate() {
            self.items[index] = self.location_level(item, inputs, state);
        }
        for (index, boss) in dungeon.bosses.iter().enumerate() {
            self.bosses[index] = self.location_level(boss, inputs, state);
        }
    }
}
