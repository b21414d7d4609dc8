//! Requirements: derived condition nodes.
//!
//! A requirement observes external state (an item count, a setting, a
//! published boss verdict, or other requirements) and derives a `met`
//! flag plus an [`AccessibilityLevel`]. Kinds form a closed sum type and
//! are matched exhaustively by [`evaluate`].
//!
//! # Requirement Kinds
//!
//! - **Leaves**: [`Static`](RequirementKind::Static), [`Setting`](RequirementKind::Setting),
//!   [`Item`](RequirementKind::Item), [`SmallKeys`](RequirementKind::SmallKeys),
//!   [`BigKey`](RequirementKind::BigKey), [`SequenceBreak`](RequirementKind::SequenceBreak),
//!   [`Boss`](RequirementKind::Boss)
//! - **Compositions**: [`Aggregate`](RequirementKind::Aggregate) (min) and
//!   [`Alternative`](RequirementKind::Alternative) (max)

mod registry;


use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;
use trackforge_core::{
    AccessibilityLevel, DungeonId, ItemId, SequenceBreakId, Setting, StateChange, TrackerState,
};

pub use registry::RequirementRegistry;
pub(crate) use registry::RequirementSlot;

/// Handle to a requirement owned by a [`LogicGraph`](crate::LogicGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequirementId(pub(crate) u32);

impl RequirementId {
    /// Returns the arena index of this requirement.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "requirement#{}", self.0)
    }
}

/// The closed set of requirement kinds.
///
/// A kind doubles as the deduplication key of the registry: two equal
/// kinds always resolve to the same shared [`RequirementId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequirementKind {
    /// A constant level.
    Static(AccessibilityLevel),
    /// Met when `setting` currently equals `expected`.
    Setting { setting: Setting, expected: bool },
    /// Met when at least `count` copies of `item` are collected.
    Item { item: ItemId, count: u32 },
    /// Met when at least `count` small keys are available for `dungeon`.
    SmallKeys { dungeon: DungeonId, count: u32 },
    /// Met when the big key of the dungeon is collected.
    BigKey(DungeonId),
    /// `SequenceBreak` while the trick is enabled, `None` otherwise.
    SequenceBreak(SequenceBreakId),
    /// Published accessibility of a solved dungeon's boss.
    Boss { dungeon: DungeonId, index: u32 },
    /// All children required: the minimum of their levels.
    Aggregate(Vec<RequirementId>),
    /// Any child suffices: the maximum of their levels.
    Alternative(Vec<RequirementId>),
}

/// External input a leaf requirement observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// A mutation of the tracker state.
    State(StateChange),
    /// A boss verdict published by the dungeon solver.
    Boss { dungeon: DungeonId, index: u32 },
}

impl RequirementKind {
    /// Child requirements of a composition (empty for leaves).
    pub fn children(&self) -> &[RequirementId] {
        match self {
            RequirementKind::Aggregate(children) | RequirementKind::Alternative(children) => {
                children
            }
            _ => &[],
        }
    }

    /// Returns true for kinds whose level is exactly `Normal` or `None`.
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            RequirementKind::Setting { .. }
                | RequirementKind::Item { .. }
                | RequirementKind::SmallKeys { .. }
                | RequirementKind::BigKey(_)
        )
    }

    /// Returns the canonical form used as the registry key.
    ///
    /// Composition children are sorted and deduplicated since both
    /// reducers are commutative and idempotent.
    pub fn normalized(self) -> Self {
        match self {
            RequirementKind::Aggregate(mut children) => {
                children.sort_unstable();
                children.dedup();
                RequirementKind::Aggregate(children)
            }
            RequirementKind::Alternative(mut children) => {
                children.sort_unstable();
                children.dedup();
                RequirementKind::Alternative(children)
            }
            other => other,
        }
    }

    /// External inputs this kind must be re-derived on.
    pub fn sources(&self) -> SmallVec<[Source; 3]> {
        let mut sources = SmallVec::new();
        match *self {
            RequirementKind::Setting { setting, .. } => {
                sources.push(Source::State(StateChange::Setting(setting)));
            }
            RequirementKind::Item { item, .. } => {
                sources.push(Source::State(StateChange::Item(item)));
            }
            RequirementKind::SmallKeys { dungeon, .. } => {
                sources.push(Source::State(StateChange::SmallKeys(dungeon)));
                sources.push(Source::State(StateChange::GenericKeys));
                sources.push(Source::State(StateChange::Setting(Setting::GenericKeys)));
            }
            RequirementKind::BigKey(dungeon) => {
                sources.push(Source::State(StateChange::BigKey(dungeon)));
            }
            RequirementKind::SequenceBreak(id) => {
                sources.push(Source::State(StateChange::SequenceBreak(id)));
            }
            RequirementKind::Boss { dungeon, index } => {
                sources.push(Source::Boss { dungeon, index });
            }
            RequirementKind::Static(_)
            | RequirementKind::Aggregate(_)
            | RequirementKind::Alternative(_) => {}
        }
        sources
    }
}

/// Everything a requirement may read while being derived.
pub(crate) struct EvalContext<'a> {
    pub state: &'a dyn TrackerState,
    pub registry: &'a RequirementRegistry,
    pub published: &'a HashMap<(DungeonId, u32), AccessibilityLevel>,
}

/// Derives `(met, accessibility)` for a requirement kind.
///
/// Compositions read the current values of their children, which the
/// caller guarantees are already up to date.
pub(crate) fn evaluate(kind: &RequirementKind, ctx: &EvalContext<'_>) -> (bool, AccessibilityLevel) {
    match kind {
        RequirementKind::Static(level) => (*level >= AccessibilityLevel::Normal, *level),
        RequirementKind::Setting { setting, expected } => {
            boolean(ctx.state.setting(*setting) == *expected)
        }
        RequirementKind::Item { item, count } => {
            boolean(ctx.state.item_count(*item).is_some_and(|have| have >= *count))
        }
        RequirementKind::SmallKeys { dungeon, count } => {
            let have = if ctx.state.setting(Setting::GenericKeys) {
                ctx.state.generic_keys()
            } else {
                ctx.state.small_keys(*dungeon)
            };
            boolean(have.is_some_and(|have| have >= *count))
        }
        RequirementKind::BigKey(dungeon) => boolean(ctx.state.big_key(*dungeon) == Some(true)),
        RequirementKind::SequenceBreak(id) => {
            if ctx.state.sequence_break_enabled(*id) {
                (true, AccessibilityLevel::SequenceBreak)
            } else {
                (false, AccessibilityLevel::None)
            }
        }
        RequirementKind::Boss { dungeon, index } => {
            let level = ctx
                .published
                .get(&(*dungeon, *index))
                .copied()
                .unwrap_or_default();
            (level >= AccessibilityLevel::Normal, level)
        }
        RequirementKind::Aggregate(children) => {
            let mut met = true;
            let mut level = AccessibilityLevel::Cleared;
            for child in children {
                let slot = ctx.registry.slot(*child);
                met &= slot.met;
                level = level.min(slot.accessibility);
                if level == AccessibilityLevel::None {
                    return (false, AccessibilityLevel::None);
                }
            }
            (met, level)
        }
        RequirementKind::Alternative(children) => {
            let mut met = false;
            let mut level = AccessibilityLevel::None;
            for child in children {
                let slot = ctx.registry.slot(*child);
                met |= slot.met;
                level = level.max(slot.accessibility);
                if level == AccessibilityLevel::Cleared {
                    return (true, AccessibilityLevel::Cleared);
                }
            }
            (met, level)
        }
    }
}

#[inline]
fn boolean(met: bool) -> (bool, AccessibilityLevel) {
    (met, AccessibilityLevel::from_met(met))
}
