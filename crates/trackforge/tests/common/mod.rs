//! World shared by the tracker integration tests.
//!
//! The overworld has two approaches. Eastern Palace hangs off the first;
//! its boss sits behind the big key. The Pyramid ledge is reachable only
//! once that boss is beatable, and Ganon's Tower is entered from there.

use std::sync::Arc;

use trackforge::prelude::*;
use trackforge::{Dungeon, EnvironmentMode, NodeId, TrackerError, WorkerCount};
use trackforge_test::{ids, MemoryState};

pub struct World {
    pub state: Arc<MemoryState>,
    pub tracker: Tracker,
    pub pyramid: NodeId,
}

pub fn config() -> TrackerConfig {
    TrackerConfig::new()
        .with_environment_mode(EnvironmentMode::FullAssert)
        .with_worker_count(WorkerCount::Specific(2))
        .with_sequential_threshold(1)
}

pub fn world() -> Result<World, TrackerError> {
    let state = Arc::new(MemoryState::new());
    let mut tracker = Tracker::new(state.clone(), config())?;

    let graph = tracker.graph_mut();
    let eastern_approach = graph.add_node("Eastern Approach")?;
    graph.connect_entry(graph.start(), eastern_approach)?;
    let boss = graph.boss(ids::EASTERN_PALACE, 0)?;
    let pyramid = graph.add_node("Pyramid")?;
    graph.connect(eastern_approach, pyramid, boss)?;

    tracker.add_dungeon(eastern_palace(eastern_approach)?)?;
    tracker.add_dungeon(ganons_tower(pyramid)?)?;

    Ok(World {
        state,
        tracker,
        pyramid,
    })
}

/// Two chests in front of a key door, three behind; the boss needs the big key.
pub fn eastern_palace(entry: NodeId) -> Result<Dungeon, TrackerError> {
    let mut builder = DungeonBuilder::new(ids::EASTERN_PALACE, "Eastern Palace", entry);
    let hall = builder.add_node("Hall");
    let boss_room = builder.add_node("Boss Room");
    let door = builder.add_key_door("Hall Door");
    let entrance = builder.entrance();
    builder
        .connect(entrance, hall, [Gate::KeyDoor(door)])
        .connect(entrance, boss_room, [Gate::BigKey]);
    builder.add_item(Location::new("Compass Chest", builder.entrance()));
    builder.add_item(Location::new("Map Chest", builder.entrance()));
    for name in ["Big Chest", "Hall Chest", "Cannonball Chest"] {
        builder.add_item(Location::new(name, hall));
    }
    builder.add_boss(Location::new("Armos Knights", boss_room));
    builder.small_keys(1);
    builder.build()
}

/// An end dungeon with nothing locked inside.
pub fn ganons_tower(entry: NodeId) -> Result<Dungeon, TrackerError> {
    let mut builder = DungeonBuilder::new(ids::GANONS_TOWER, "Ganon's Tower", entry);
    builder.key_layout(KeyLayout::End { gate: None });
    builder.add_item(Location::new("Torch Chest", builder.entrance()));
    builder.add_item(Location::new("Moldorm Chest", builder.entrance()));
    builder.build()
}
