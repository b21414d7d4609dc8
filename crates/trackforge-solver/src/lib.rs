//! trackforge Solver - dungeon key-door reachability
//!
//! This crate provides the key-layout search including:
//! - Dungeon definitions and their builder
//! - Immutable per-layout `DungeonState` snapshots
//! - Reusable working copies and the bounded pool they are checked out from
//! - Parallel layout evaluation and order-independent reduction
//! - Search supersession and statistics

pub mod dungeon;
pub mod inputs;
pub mod layout;
pub mod pool;
pub mod result;
pub mod search;
pub mod state;
pub mod stats;
pub mod working;

#[cfg(test)]
pub mod test_utils;

pub use dungeon::{
    BossIndex, Dungeon, DungeonBuilder, DungeonNode, Gate, ItemIndex, KeyDoorId, KeyLayout,
    Location,
};
pub use inputs::DungeonInputs;
pub use layout::{LayoutOutcome, LayoutSummary};
pub use pool::MutableDungeonPool;
pub use result::{DungeonResult, StateEvaluation};
pub use search::{DungeonSolver, SearchExecutor, SearchHandle, SearchTicket};
pub use state::{DoorSet, DungeonState};
pub use stats::SearchStatistics;
pub use working::MutableDungeon;
