//! Candidate key layouts and their reduction.
//!
//! Candidates are every set of at most `min(keys, doors)` key doors; the
//! working copy decides which of them are admitted. Outcomes of admitted
//! layouts fold into a [`LayoutSummary`] whose merge is commutative and
//! associative, so workers may reduce in any order.

use std::cmp::Ordering;

use smallvec::{smallvec, SmallVec};
use trackforge_core::{AccessibilityLevel, Result, TrackerError};

use crate::dungeon::{Dungeon, KeyLayout};
use crate::inputs::DungeonInputs;
use crate::result::DungeonResult;
use crate::state::{DoorSet, DungeonState};

/// Enumerates the candidate layouts for `inputs`.
///
/// # Errors
///
/// Returns [`TrackerError::EmptyLayoutSpace`] if no candidate exists.
pub fn candidates(dungeon: &Dungeon, inputs: &DungeonInputs) -> Result<Vec<DungeonState>> {
    let mut candidates = Vec::new();
    match dungeon.key_layout() {
        KeyLayout::End { .. } => candidates.push(inputs.state(DoorSet::empty())),
        KeyLayout::SmallKeys => {
            let doors = dungeon.door_count() as u32;
            for size in 0..=inputs.small_keys.min(doors) {
                for_each_subset(doors, size, |bits| {
                    candidates.push(inputs.state(DoorSet::from_bits(bits)));
                });
            }
        }
    }

    if candidates.is_empty() {
        return Err(TrackerError::EmptyLayoutSpace(dungeon.name().to_string()));
    }
    Ok(candidates)
}

/// Calls `visit` with every `size`-element subset of `n` doors.
fn for_each_subset(n: u32, size: u32, mut visit: impl FnMut(u64)) {
    if size == 0 {
        visit(0);
        return;
    }
    if size > n {
        return;
    }
    // Gosper's hack.
    let limit = 1u64 << n;
    let mut set: u64 = (1u64 << size) - 1;
    while set < limit {
        visit(set);
        let lowest = set & set.wrapping_neg();
        let ripple = set + lowest;
        set = (((ripple ^ set) >> 2) / lowest) | ripple;
    }
}

/// What one admitted layout makes reachable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutOutcome {
    pub accessible: u32,
    pub inaccessible: u32,
    /// Some inaccessible item is at least `Inspect`.
    pub visible: bool,
    /// The layout relied on a sequence-break door approach or item.
    pub sequence_break: bool,
    pub bosses: SmallVec<[AccessibilityLevel; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Best {
    accessible: u32,
    /// Some layout reaching `accessible` needed no sequence break.
    clean: bool,
}

impl Best {
    fn merge(a: Option<Best>, b: Option<Best>) -> Option<Best> {
        match (a, b) {
            (None, other) | (other, None) => other,
            (Some(a), Some(b)) => Some(match a.accessible.cmp(&b.accessible) {
                Ordering::Greater => a,
                Ordering::Less => b,
                Ordering::Equal => Best {
                    accessible: a.accessible,
                    clean: a.clean || b.clean,
                },
            }),
        }
    }
}

/// Order-independent fold of layout outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSummary {
    admitted: u64,
    best: Option<Best>,
    minimum_inaccessible: Option<u32>,
    bosses: SmallVec<[AccessibilityLevel; 2]>,
    visible: bool,
}

impl LayoutSummary {
    /// The identity of [`merge`](Self::merge).
    pub fn new(boss_count: usize) -> Self {
        Self {
            admitted: 0,
            best: None,
            minimum_inaccessible: None,
            bosses: smallvec![AccessibilityLevel::None; boss_count],
            visible: false,
        }
    }

    /// Number of admitted layouts folded in.
    pub fn admitted(&self) -> u64 {
        self.admitted
    }

    pub fn record(&mut self, outcome: &LayoutOutcome) {
        self.admitted += 1;
        self.best = Best::merge(
            self.best,
            Some(Best {
                accessible: outcome.accessible,
                clean: !outcome.sequence_break,
            }),
        );
        self.minimum_inaccessible = Some(
            self.minimum_inaccessible
                .map_or(outcome.inaccessible, |current| current.min(outcome.inaccessible)),
        );
        for (best, level) in self.bosses.iter_mut().zip(&outcome.bosses) {
            *best = (*best).max(*level);
        }
        self.visible |= outcome.visible;
    }

    pub fn merge(mut self, other: LayoutSummary) -> LayoutSummary {
        self.admitted += other.admitted;
        self.best = Best::merge(self.best, other.best);
        self.minimum_inaccessible = match (self.minimum_inaccessible, other.minimum_inaccessible) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        for (best, level) in self.bosses.iter_mut().zip(&other.bosses) {
            *best = (*best).max(*level);
        }
        self.visible |= other.visible;
        self
    }

    /// Assembles the result; with nothing admitted, nothing is reachable.
    pub fn into_result(self, total_items: u32) -> DungeonResult {
        match self.best {
            Some(best) => DungeonResult {
                bosses: self.bosses.into_vec(),
                accessible: best.accessible,
                sequence_break: !best.clean,
                visible: self.visible,
                minimum_inaccessible: self.minimum_inaccessible.unwrap_or(total_items),
            },
            None => DungeonResult::unreachable(total_items, self.bosses.len()),
        }
    }
}
