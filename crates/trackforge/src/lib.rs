//! trackforge - Accessibility tracking for randomizer playthroughs
//!
//! Wires the reactive accessibility graph to one key-layout solver per
//! dungeon and answers the tracker's queries.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use trackforge::prelude::*;
//! use trackforge_test::{ids, MemoryState};
//!
//! let state = Arc::new(MemoryState::new());
//! let mut tracker = Tracker::new(state.clone(), TrackerConfig::default()).unwrap();
//!
//! let graph = tracker.graph_mut();
//! let approach = graph.add_node("Eastern Approach").unwrap();
//! graph.connect_entry(graph.start(), approach).unwrap();
//!
//! let mut builder = DungeonBuilder::new(ids::EASTERN_PALACE, "Eastern Palace", approach);
//! let hall = builder.add_node("Hall");
//! let door = builder.add_key_door("Hall Door");
//! builder.connect(builder.entrance(), hall, [Gate::KeyDoor(door)]);
//! builder.add_item(Location::new("Compass Chest", builder.entrance()));
//! builder.add_item(Location::new("Hall Chest", hall));
//! builder.small_keys(1);
//! tracker.add_dungeon(builder.build().unwrap()).unwrap();
//!
//! assert_eq!(tracker.dungeon_result(ids::EASTERN_PALACE).unwrap().accessible, 1);
//!
//! state.set_small_keys(ids::EASTERN_PALACE, 1);
//! tracker.notify(StateChange::SmallKeys(ids::EASTERN_PALACE)).unwrap();
//! assert_eq!(tracker.dungeon_result(ids::EASTERN_PALACE).unwrap().accessible, 2);
//! ```

pub mod logging;
mod tracker;

pub use tracker::Tracker;

pub use trackforge_config::{
    ConfigError, EnvironmentMode, SearchConfig, TrackerConfig, WorkerCount,
};
pub use trackforge_core::{
    AccessibilityLevel, DungeonId, ItemId, Result, SequenceBreakId, Setting, StateChange,
    TrackerError, TrackerState,
};
pub use trackforge_logic::{
    CountingListener, LogicGraph, LogicListener, LoggingListener, NodeId, PropagationReport,
    RequirementId, RequirementKind,
};
pub use trackforge_solver::{
    DoorSet, Dungeon, DungeonBuilder, DungeonResult, Gate, KeyLayout, Location, SearchHandle,
    SearchStatistics, StateEvaluation,
};

pub mod prelude {
    pub use super::{
        AccessibilityLevel, DungeonBuilder, DungeonId, DungeonResult, Gate, KeyLayout, Location,
        LogicGraph, Setting, StateChange, Tracker, TrackerConfig, TrackerState,
    };
}
