//! Per-layout dungeon state.

use std::fmt;

use crate::dungeon::KeyDoorId;

/// Upper bound on key doors per dungeon.
pub const MAX_KEY_DOORS: usize = 16;

/// A set of key doors, one bit per door.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DoorSet(u64);

impl DoorSet {
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn contains(self, door: KeyDoorId) -> bool {
        self.0 & (1u64 << door.index()) != 0
    }

    /// Returns a copy with `door` added.
    #[inline]
    pub fn with(self, door: KeyDoorId) -> Self {
        Self(self.0 | (1u64 << door.index()))
    }

    #[inline]
    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the doors in ascending order.
    pub fn iter(self) -> impl Iterator<Item = KeyDoorId> {
        let mut rest = self.0;
        std::iter::from_fn(move || {
            if rest == 0 {
                return None;
            }
            let index = rest.trailing_zeros();
            rest &= rest - 1;
            Some(KeyDoorId(index))
        })
    }
}

impl FromIterator<KeyDoorId> for DoorSet {
    fn from_iter<I: IntoIterator<Item = KeyDoorId>>(iter: I) -> Self {
        iter.into_iter().fold(DoorSet::empty(), DoorSet::with)
    }
}

impl fmt::Debug for DoorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|door| door.0)).finish()
    }
}

/// Snapshot of one candidate layout.
///
/// Built once per candidate and never mutated; the solver reads it while
/// toggling doors on a working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DungeonState {
    /// Doors presumed unlocked.
    pub unlocked: DoorSet,
    /// Small keys available to spend.
    pub small_keys: u32,
    /// Whether the big key is collected.
    pub big_key: bool,
    /// Whether sequence-break tracking is enabled.
    pub sequence_break: bool,
}

impl DungeonState {
    pub fn new(unlocked: DoorSet, small_keys: u32, big_key: bool, sequence_break: bool) -> Self {
        Self {
            unlocked,
            small_keys,
            big_key,
            sequence_break,
        }
    }

    /// Returns true if the layout spends every available key.
    pub fn spends_all_keys(&self) -> bool {
        self.unlocked.len() >= self.small_keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_set_basics() {
        let set: DoorSet = [KeyDoorId(0), KeyDoorId(3), KeyDoorId(63)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 3);
        assert!(set.contains(KeyDoorId(3)));
        assert!(!set.contains(KeyDoorId(1)));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![KeyDoorId(0), KeyDoorId(3), KeyDoorId(63)]
        );
        assert!(DoorSet::empty().is_empty());
        assert_eq!(format!("{:?}", set), "{0, 3, 63}");
    }

    #[test]
    fn test_spends_all_keys() {
        let one = DoorSet::empty().with(KeyDoorId(2));
        assert!(DungeonState::new(one, 1, false, false).spends_all_keys());
        assert!(!DungeonState::new(one, 2, false, false).spends_all_keys());
        assert!(DungeonState::new(DoorSet::empty(), 0, true, false).spends_all_keys());
    }
}
