//! Dungeon definitions.
//!
//! A [`Dungeon`] is the canonical, immutable description of a dungeon's
//! interior: local nodes joined by gated edges, key doors, item and boss
//! locations, and the key budget. It is built once with a
//! [`DungeonBuilder`] and shared through `Arc` by every working copy.
//!
//! Local node 0 is the entrance. Its level is read from a node of the
//! overworld [`LogicGraph`](trackforge_logic::LogicGraph).

mod builder;

use std::fmt;

use smallvec::SmallVec;
use trackforge_core::DungeonId;
use trackforge_logic::{NodeId, RequirementId};

pub use builder::DungeonBuilder;

macro_rules! local_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub(crate) u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

local_id!(
    /// A node inside one dungeon.
    DungeonNode,
    "room"
);
local_id!(
    /// A lockable door inside one dungeon.
    KeyDoorId,
    "door"
);
local_id!(
    /// An item location inside one dungeon.
    ItemIndex,
    "item"
);
local_id!(
    /// A boss inside one dungeon.
    BossIndex,
    "boss"
);

/// A condition on an edge or location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// No condition.
    Open,
    /// An overworld requirement.
    Requirement(RequirementId),
    /// A small-key door; only passable in layouts that unlock it.
    KeyDoor(KeyDoorId),
    /// The dungeon's big key.
    BigKey,
}

/// How keys behave inside a dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLayout {
    /// No internal key logic. The single layout is admitted while `gate`
    /// is at the admission threshold.
    End { gate: Option<RequirementId> },
    /// Every placement of the collected small keys is explored.
    SmallKeys,
}

/// An item or boss location, as passed to the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub node: DungeonNode,
    pub gates: SmallVec<[Gate; 2]>,
    /// Enemy-drop and pot locations, only counted under key-drop shuffle.
    pub key_drop: bool,
}

impl Location {
    pub fn new(name: impl Into<String>, node: DungeonNode) -> Self {
        Self {
            name: name.into(),
            node,
            gates: SmallVec::new(),
            key_drop: false,
        }
    }

    /// Adds a gate to this location.
    pub fn gated(mut self, gate: Gate) -> Self {
        self.gates.push(gate);
        self
    }

    /// Marks this location as a key drop.
    pub fn key_drop(mut self) -> Self {
        self.key_drop = true;
        self
    }
}

/// A gate after compilation: requirements are resolved to input slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Check {
    Requirement(usize),
    KeyDoor(KeyDoorId),
    BigKey,
}

#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub from: DungeonNode,
    pub checks: SmallVec<[Check; 2]>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledLocation {
    pub name: String,
    pub node: DungeonNode,
    pub checks: SmallVec<[Check; 2]>,
    pub key_drop: bool,
}

/// The canonical definition of a dungeon.
#[derive(Debug)]
pub struct Dungeon {
    pub(crate) id: DungeonId,
    pub(crate) name: String,
    pub(crate) entry: NodeId,
    pub(crate) node_names: Vec<String>,
    /// Incoming edges per local node.
    pub(crate) incoming: Vec<Vec<Edge>>,
    /// Topological order of local nodes.
    pub(crate) order: Vec<DungeonNode>,
    pub(crate) doors: Vec<String>,
    /// `(target, edge)` pairs gated by each door.
    pub(crate) door_edges: Vec<Vec<(DungeonNode, usize)>>,
    pub(crate) items: Vec<CompiledLocation>,
    pub(crate) bosses: Vec<CompiledLocation>,
    pub(crate) requirements: Vec<RequirementId>,
    pub(crate) small_keys: u32,
    pub(crate) key_drop_keys: u32,
    pub(crate) layout: KeyLayout,
    pub(crate) end_gate: Option<usize>,
}

impl Dungeon {
    pub fn id(&self) -> DungeonId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overworld node whose level feeds the entrance.
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    pub fn key_layout(&self) -> KeyLayout {
        self.layout
    }

    /// Requirements read by this dungeon, in input-slot order.
    pub fn requirements(&self) -> &[RequirementId] {
        &self.requirements
    }

    pub fn node_count(&self) -> usize {
        self.node_names.len()
    }

    pub fn door_count(&self) -> usize {
        self.doors.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn boss_count(&self) -> usize {
        self.bosses.len()
    }

    pub fn small_keys(&self) -> u32 {
        self.small_keys
    }

    pub fn key_drop_keys(&self) -> u32 {
        self.key_drop_keys
    }

    /// Most keys the dungeon can hold under the given shuffle setting.
    pub fn key_cap(&self, key_drop_shuffle: bool) -> u32 {
        if key_drop_shuffle {
            self.small_keys + self.key_drop_keys
        } else {
            self.small_keys
        }
    }

    /// Number of locations that count towards results.
    pub fn counted_items(&self, key_drop_shuffle: bool) -> u32 {
        self.items
            .iter()
            .filter(|item| key_drop_shuffle || !item.key_drop)
            .count() as u32
    }

    pub fn node_by_name(&self, name: &str) -> Option<DungeonNode> {
        self.node_names
            .iter()
            .position(|candidate| candidate == name)
            .map(|index| DungeonNode(index as u32))
    }

    pub fn node_name(&self, node: DungeonNode) -> Option<&str> {
        self.node_names.get(node.index()).map(String::as_str)
    }

    pub fn door_name(&self, door: KeyDoorId) -> Option<&str> {
        self.doors.get(door.index()).map(String::as_str)
    }

    pub fn item_name(&self, item: ItemIndex) -> Option<&str> {
        self.items.get(item.index()).map(|item| item.name.as_str())
    }

    pub fn boss_name(&self, boss: BossIndex) -> Option<&str> {
        self.bosses.get(boss.index()).map(|boss| boss.name.as_str())
    }
}

impl fmt::Display for Dungeon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
