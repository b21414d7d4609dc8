//! Domain identifiers.
//!
//! Items, dungeons and sequence breaks are defined by the surrounding
//! application; the engine only needs stable, hashable handles for them.

use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// Creates a new identifier.
            #[inline]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Returns the raw identifier.
            #[inline]
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

id_type!(
    /// An item the player can collect (possibly several times).
    ItemId,
    "item"
);

id_type!(
    /// A dungeon with its own key logic.
    DungeonId,
    "dungeon"
);

id_type!(
    /// An individually toggleable out-of-logic trick.
    SequenceBreakId,
    "sequence_break"
);

/// Setting toggles read by the logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Setting {
    /// Sequence-break tracking: count out-of-logic paths as reachable.
    SequenceBreaks,
    /// Enemy and pot key drops are shuffled into the item pool.
    KeyDropShuffle,
    /// Small keys are shared between all dungeons.
    GenericKeys,
    /// Small keys may be found outside their own dungeon.
    SmallKeyShuffle,
    /// Big keys may be found outside their own dungeon.
    BigKeyShuffle,
    /// Application-defined toggle.
    Custom(u16),
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::SequenceBreaks => write!(f, "SequenceBreaks"),
            Setting::KeyDropShuffle => write!(f, "KeyDropShuffle"),
            Setting::GenericKeys => write!(f, "GenericKeys"),
            Setting::SmallKeyShuffle => write!(f, "SmallKeyShuffle"),
            Setting::BigKeyShuffle => write!(f, "BigKeyShuffle"),
            Setting::Custom(n) => write!(f, "Custom({})", n),
        }
    }
}
