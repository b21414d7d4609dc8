//! Fixture dungeons shared by the solver's unit tests.

use std::sync::Arc;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use trackforge_config::{EnvironmentMode, TrackerConfig};
use trackforge_core::{Setting, StateChange};
use trackforge_logic::LogicGraph;
use trackforge_test::{ids, MemoryState};

use crate::dungeon::{Dungeon, DungeonBuilder, Gate, KeyDoorId, Location};
use crate::inputs::DungeonInputs;
use crate::search::{DungeonSolver, SearchExecutor};

/// A dungeon together with the state and graph it reads.
pub struct Fixture {
    pub state: Arc<MemoryState>,
    pub graph: LogicGraph,
    pub dungeon: Arc<Dungeon>,
}

impl Fixture {
    /// Propagates a wholesale state change through the graph.
    pub fn refresh(&mut self) {
        self.graph.notify(StateChange::All).unwrap();
    }
}

/// Empty state and graph with an overworld node feeding `name`.
fn overworld(name: &str) -> (Arc<MemoryState>, LogicGraph, trackforge_logic::NodeId) {
    let state = Arc::new(MemoryState::new());
    let mut graph = LogicGraph::new(state.clone()).with_full_assert(true);
    let entry = graph.add_node(name).unwrap();
    graph.connect_entry(graph.start(), entry).unwrap();
    (state, graph, entry)
}

/// Two chests at the entrance and three behind one key door.
///
/// Items 0 and 1 are in front of the door; items 2, 3 and 4 behind it.
pub fn single_door() -> Fixture {
    let (state, graph, entry) = overworld("Eastern Palace Approach");
    let mut builder = DungeonBuilder::new(ids::EASTERN_PALACE, "Eastern Palace", entry);
    let hall = builder.add_node("Hall");
    let door = builder.add_key_door("Hall Door");
    builder.connect(builder.entrance(), hall, [Gate::KeyDoor(door)]);
    builder.add_item(Location::new("Compass Chest", builder.entrance()));
    builder.add_item(Location::new("Map Chest", builder.entrance()));
    builder.add_item(Location::new("Big Chest", hall));
    builder.add_item(Location::new("Hall Chest", hall));
    builder.add_item(Location::new("Hall Pot", hall));
    builder.small_keys(1);

    Fixture {
        state,
        graph,
        dungeon: Arc::new(builder.build().unwrap()),
    }
}

/// A boss behind the big-key door; one small-key door guards a side room.
pub fn big_key_boss() -> Fixture {
    let (state, graph, entry) = overworld("Desert Approach");
    let mut builder = DungeonBuilder::new(ids::DESERT_PALACE, "Desert Palace", entry);
    let side = builder.add_node("Side Room");
    let boss_room = builder.add_node("Boss Room");
    let door = builder.add_key_door("Side Door");
    builder.connect(builder.entrance(), side, [Gate::KeyDoor(door)]);
    builder.connect(builder.entrance(), boss_room, [Gate::BigKey]);
    builder.add_item(Location::new("Entrance Chest", builder.entrance()));
    builder.add_item(Location::new("Side Chest", side));
    builder.add_boss(Location::new("Lanmolas", boss_room));
    builder.small_keys(1);

    Fixture {
        state,
        graph,
        dungeon: Arc::new(builder.build().unwrap()),
    }
}

/// The only way to the key door leads through a dark room.
///
/// Items 0 and 1 are at the entrance, items 2, 3 and 4 behind the door.
/// The dark-room trick starts enabled.
pub fn dark_room() -> Fixture {
    let (state, mut graph, entry) = overworld("Swamp Approach");
    state.set_sequence_break(ids::DARK_ROOM, true);
    let dark = graph.sequence_break(ids::DARK_ROOM).unwrap();

    let mut builder = DungeonBuilder::new(ids::SWAMP_PALACE, "Swamp Palace", entry);
    let corridor = builder.add_node("Dark Corridor");
    let vault = builder.add_node("Vault");
    let door = builder.add_key_door("Vault Door");
    builder
        .connect(builder.entrance(), corridor, [Gate::Requirement(dark)])
        .connect(corridor, vault, [Gate::KeyDoor(door)]);
    builder.add_item(Location::new("Entrance Chest", builder.entrance()));
    builder.add_item(Location::new("Flooded Chest", builder.entrance()));
    for name in ["Vault Left", "Vault Right", "Vault Back"] {
        builder.add_item(Location::new(name, vault));
    }
    builder.small_keys(1);

    Fixture {
        state,
        graph,
        dungeon: Arc::new(builder.build().unwrap()),
    }
}

/// A random acyclic dungeon.
///
/// Every new room hangs off one or two earlier rooms through an open,
/// key-door, big-key or item-gated edge. The dungeon holds as many small
/// keys as it has doors.
pub fn random_dungeon(rng: &mut ChaCha8Rng) -> Fixture {
    let (state, mut graph, entry) = overworld("Tower Approach");
    let hookshot = graph.item(ids::HOOKSHOT, 1).unwrap();
    let mut builder = DungeonBuilder::new(ids::GANONS_TOWER, "Ganon's Tower", entry);

    let door_count = rng.random_range(0..=5u32);
    let doors: Vec<KeyDoorId> = (0..door_count)
        .map(|index| builder.add_key_door(format!("Door {}", index)))
        .collect();

    let mut rooms = vec![builder.entrance()];
    for index in 0..rng.random_range(1..=7usize) {
        let room = builder.add_node(format!("Room {}", index));
        let parents = rng.random_range(1..=2usize);
        for _ in 0..parents {
            let parent = rooms[rng.random_range(0..rooms.len())];
            let gate = match rng.random_range(0..5u32) {
                0 | 1 if !doors.is_empty() => {
                    Some(Gate::KeyDoor(doors[rng.random_range(0..doors.len())]))
                }
                2 => Some(Gate::BigKey),
                3 => Some(Gate::Requirement(hookshot)),
                _ => None,
            };
            builder.connect(parent, room, gate);
        }
        rooms.push(room);
    }

    for index in 0..rng.random_range(1..=8usize) {
        let room = rooms[rng.random_range(0..rooms.len())];
        let location = Location::new(format!("Chest {}", index), room);
        builder.add_item(if rng.random_bool(0.2) {
            location.gated(Gate::BigKey)
        } else {
            location
        });
    }
    builder.add_boss(Location::new("Boss", rooms[rng.random_range(0..rooms.len())]));
    builder.small_keys(door_count);

    Fixture {
        state,
        graph,
        dungeon: Arc::new(builder.build().unwrap()),
    }
}

/// Sets the dungeon's small keys and captures its inputs.
pub fn inputs(fixture: &Fixture, keys: u32) -> DungeonInputs {
    fixture.state.set_small_keys(fixture.dungeon.id(), keys);
    DungeonInputs::capture(&fixture.dungeon, &fixture.graph).unwrap()
}

/// Enables or disables sequence-break tracking.
pub fn track_sequence_breaks(fixture: &mut Fixture, enabled: bool) {
    fixture.state.set_setting(Setting::SequenceBreaks, enabled);
    fixture.refresh();
}

/// A full-assert solver; `threshold` 0 forces the parallel path.
pub fn solver(fixture: &Fixture, workers: usize, threshold: usize) -> DungeonSolver {
    let config = TrackerConfig::new()
        .with_environment_mode(EnvironmentMode::FullAssert)
        .with_sequential_threshold(threshold);
    let executor = SearchExecutor::with_workers(workers).unwrap();
    DungeonSolver::new(fixture.dungeon.clone(), executor, &config)
}

