//! Tests for the key-layout search.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use trackforge_core::{AccessibilityLevel, Setting, TrackerError};
use trackforge_test::ids;

use super::*;
use crate::dungeon::{DungeonBuilder, Gate, KeyDoorId, KeyLayout, Location};
use crate::state::DoorSet;
use crate::test_utils::{
    big_key_boss, dark_room, inputs, random_dungeon, single_door, solver, track_sequence_breaks,
    Fixture,
};

use AccessibilityLevel::*;

#[test]
fn test_single_door_without_key() {
    let fixture = single_door();
    let result = solver(&fixture, 2, 4).search(&inputs(&fixture, 0)).unwrap();
    assert_eq!(result.accessible, 2);
    assert_eq!(result.minimum_inaccessible, 3);
    assert!(!result.sequence_break);
    assert_eq!(result.item_accessibility(5), Partial);
}

#[test]
fn test_single_door_with_key() {
    let fixture = single_door();
    let result = solver(&fixture, 2, 4).search(&inputs(&fixture, 1)).unwrap();
    assert_eq!(result.accessible, 5);
    assert_eq!(result.minimum_inaccessible, 0);
    assert_eq!(result.item_accessibility(5), Normal);
    assert_eq!(result.item_accessibility(0), Cleared);
}

#[test]
fn test_boss_follows_big_key() {
    let fixture = big_key_boss();
    let solver = solver(&fixture, 2, 4);
    for keys in 0..=1 {
        fixture.state.set_big_key(fixture.dungeon.id(), false);
        let result = solver.search(&inputs(&fixture, keys)).unwrap();
        assert_eq!(result.boss(0), None, "{} keys without big key", keys);

        fixture.state.set_big_key(fixture.dungeon.id(), true);
        let result = solver.search(&inputs(&fixture, keys)).unwrap();
        assert_eq!(result.boss(0), Normal, "{} keys with big key", keys);
    }
}

#[test]
fn test_sequence_break_surfaces_when_tracked() {
    let mut fixture = dark_room();
    track_sequence_breaks(&mut fixture, true);
    let result = solver(&fixture, 2, 4).search(&inputs(&fixture, 1)).unwrap();
    assert_eq!(result.accessible, 5);
    assert!(result.sequence_break);
    assert_eq!(result.item_accessibility(5), SequenceBreak);
}

#[test]
fn test_sequence_break_excluded_when_untracked() {
    let mut fixture = dark_room();
    track_sequence_breaks(&mut fixture, false);
    let result = solver(&fixture, 2, 4).search(&inputs(&fixture, 1)).unwrap();
    assert_eq!(result.accessible, 2);
    assert_eq!(result.minimum_inaccessible, 3);
    assert!(!result.sequence_break);
    assert!(!result.visible);
}

#[test]
fn test_inspectable_item_is_visible() {
    let state = Arc::new(trackforge_test::MemoryState::new());
    let mut graph = trackforge_logic::LogicGraph::new(state.clone());
    let inspect = graph.constant(Inspect).unwrap();
    let entry = graph.add_node("Hyrule Approach").unwrap();
    graph.connect_entry(graph.start(), entry).unwrap();

    let mut builder = DungeonBuilder::new(ids::EASTERN_PALACE, "Eastern Palace", entry);
    builder.add_item(Location::new("Open Chest", builder.entrance()));
    builder.add_item(
        Location::new("Ledge Item", builder.entrance()).gated(Gate::Requirement(inspect)),
    );
    let fixture = Fixture {
        state,
        graph,
        dungeon: Arc::new(builder.build().unwrap()),
    };

    let result = solver(&fixture, 1, 4).search(&inputs(&fixture, 0)).unwrap();
    assert_eq!(result.accessible, 1);
    assert_eq!(result.minimum_inaccessible, 1);
    assert!(result.visible);
    assert!(!result.sequence_break);
}

#[test]
fn test_unreachable_entrance() {
    let state = Arc::new(trackforge_test::MemoryState::new());
    let mut graph = trackforge_logic::LogicGraph::new(state.clone());
    let lamp = graph.item(ids::LAMP, 1).unwrap();
    let entry = graph.add_node("Dark Approach").unwrap();
    graph.connect(graph.start(), entry, lamp).unwrap();

    let mut builder = DungeonBuilder::new(ids::EASTERN_PALACE, "Eastern Palace", entry);
    let hall = builder.add_node("Hall");
    let door = builder.add_key_door("Hall Door");
    builder.connect(builder.entrance(), hall, [Gate::KeyDoor(door)]);
    builder.add_item(Location::new("Chest", builder.entrance()));
    builder.add_item(Location::new("Hall Chest", hall));
    builder.small_keys(1);
    let fixture = Fixture {
        state,
        graph,
        dungeon: Arc::new(builder.build().unwrap()),
    };

    let solver = solver(&fixture, 1, 4);
    let result = solver.search(&inputs(&fixture, 1)).unwrap();
    assert_eq!(result.accessible, 0);
    assert_eq!(result.minimum_inaccessible, 2);
    assert_eq!(result.item_accessibility(2), None);
    assert_eq!(solver.last_statistics().unwrap().admitted, 1);
}

#[test]
fn test_end_layout_gate() {
    let state = Arc::new(trackforge_test::MemoryState::new());
    let mut graph = trackforge_logic::LogicGraph::new(state.clone());
    let crystals = graph.item(ids::CRYSTAL, 7).unwrap();
    let entry = graph.add_node("Tower Approach").unwrap();
    graph.connect_entry(graph.start(), entry).unwrap();

    let mut builder = DungeonBuilder::new(ids::GANONS_TOWER, "Ganon's Tower", entry);
    builder.key_layout(KeyLayout::End {
        gate: Some(crystals),
    });
    for name in ["Left", "Middle", "Right"] {
        builder.add_item(Location::new(name, builder.entrance()));
    }
    builder.add_boss(Location::new("Agahnim", builder.entrance()));
    let mut fixture = Fixture {
        state,
        graph,
        dungeon: Arc::new(builder.build().unwrap()),
    };
    let solver = solver(&fixture, 1, 4);

    let closed = solver.search(&inputs(&fixture, 0)).unwrap();
    assert_eq!(closed, DungeonResult::unreachable(3, 1));

    fixture.state.set_item(ids::CRYSTAL, 7);
    fixture.refresh();
    let open = solver.search(&inputs(&fixture, 0)).unwrap();
    assert_eq!(open.accessible, 3);
    assert_eq!(open.boss(0), Normal);
}

#[test]
fn test_key_drop_shuffle() {
    let state = Arc::new(trackforge_test::MemoryState::new());
    let mut graph = trackforge_logic::LogicGraph::new(state.clone());
    let entry = graph.add_node("Palace Approach").unwrap();
    graph.connect_entry(graph.start(), entry).unwrap();

    let mut builder = DungeonBuilder::new(ids::DESERT_PALACE, "Desert Palace", entry);
    let hall = builder.add_node("Hall");
    let door = builder.add_key_door("Hall Door");
    builder.connect(builder.entrance(), hall, [Gate::KeyDoor(door)]);
    builder.add_item(Location::new("Front Chest", builder.entrance()));
    builder.add_item(Location::new("Hall Chest", hall));
    builder.add_item(Location::new("Hall Pot", hall).key_drop());
    builder.key_drop_keys(1);
    let mut fixture = Fixture {
        state,
        graph,
        dungeon: Arc::new(builder.build().unwrap()),
    };
    let solver = solver(&fixture, 1, 4);

    // The key drop is not a check and its key cannot be spent.
    let plain = solver.search(&inputs(&fixture, 1)).unwrap();
    assert_eq!(plain.accessible, 1);
    assert_eq!(plain.minimum_inaccessible, 1);

    fixture.state.set_setting(Setting::KeyDropShuffle, true);
    fixture.refresh();
    let shuffled = solver.search(&inputs(&fixture, 1)).unwrap();
    assert_eq!(shuffled.accessible, 3);
    assert_eq!(shuffled.minimum_inaccessible, 0);
}

#[test]
fn test_generic_keys_replace_dungeon_keys() {
    let mut fixture = single_door();
    fixture.state.set_setting(Setting::GenericKeys, true);
    fixture.state.set_generic_keys(1);
    fixture.refresh();

    let inputs = inputs(&fixture, 0);
    assert_eq!(inputs.small_keys, 1);
    let result = solver(&fixture, 1, 4).search(&inputs).unwrap();
    assert_eq!(result.accessible, 5);
}

#[test]
fn test_search_is_idempotent() {
    let fixture = single_door();
    let solver = solver(&fixture, 2, 0);
    let inputs = inputs(&fixture, 1);
    let first = solver.search(&inputs).unwrap();
    let second = solver.search(&inputs).unwrap();
    assert_eq!(first, second);
    assert_eq!(solver.pool().available(), solver.pool().capacity());
}

#[test]
fn test_statistics_recorded() {
    let fixture = single_door();
    let sequential = solver(&fixture, 1, 4);
    assert!(sequential.last_statistics().is_none());

    sequential.search(&inputs(&fixture, 1)).unwrap();
    let stats = sequential.last_statistics().unwrap();
    assert_eq!(stats.candidates, 2);
    assert_eq!(stats.admitted, 1);
    assert_eq!(stats.rejected(), 1);
    assert!(!stats.parallel);

    let parallel = solver(&fixture, 2, 0);
    parallel.search(&inputs(&fixture, 1)).unwrap();
    assert!(parallel.last_statistics().unwrap().parallel);
}

#[test]
fn test_superseded_search_discards_result() {
    let fixture = single_door();
    for threshold in [0, 4] {
        let solver = solver(&fixture, 2, threshold);
        let ticket = solver.handle().ticket();
        solver.handle().supersede();

        let outcome = solver.search_with(&inputs(&fixture, 1), &ticket);
        assert!(matches!(outcome, Err(TrackerError::Superseded)));
        assert!(solver.last_statistics().is_none());
        assert_eq!(solver.pool().available(), solver.pool().capacity());

        assert!(solver.search(&inputs(&fixture, 1)).is_ok());
    }
}

#[test]
fn test_evaluate_state() {
    let fixture = big_key_boss();
    fixture.state.set_big_key(fixture.dungeon.id(), true);
    let solver = solver(&fixture, 1, 4);
    let inputs = inputs(&fixture, 0);

    let closed = solver
        .evaluate_state(&inputs, &inputs.state(DoorSet::empty()))
        .unwrap();
    assert_eq!(closed.items, vec![Normal, None]);
    assert_eq!(closed.bosses, vec![Normal]);

    let open = solver
        .evaluate_state(&inputs, &inputs.state(DoorSet::empty().with(KeyDoorId(0))))
        .unwrap();
    assert_eq!(open.items, vec![Normal, Normal]);
}

#[test]
fn test_parallel_matches_sequential() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    for _ in 0..40 {
        let fixture = random_dungeon(&mut rng);
        let sequential = solver(&fixture, 1, usize::MAX);
        let parallel = solver(&fixture, 3, 0);
        for keys in 0..=fixture.dungeon.small_keys() {
            let inputs = inputs(&fixture, keys);
            assert_eq!(
                sequential.search(&inputs).unwrap(),
                parallel.search(&inputs).unwrap(),
                "{} with {} keys",
                fixture.dungeon,
                keys
            );
        }
    }
}

#[test]
fn test_more_keys_never_hurt() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x7ac4);
    for _ in 0..60 {
        let fixture = random_dungeon(&mut rng);
        fixture.state.set_big_key(fixture.dungeon.id(), rng.random_bool(0.5));
        let solver = solver(&fixture, 2, 4);

        let mut previous: Option<DungeonResult> = Option::None;
        for keys in 0..=fixture.dungeon.small_keys() {
            let result = solver.search(&inputs(&fixture, keys)).unwrap();
            if let Some(previous) = &previous {
                assert!(result.accessible >= previous.accessible, "{}", fixture.dungeon);
                assert!(
                    result.minimum_inaccessible <= previous.minimum_inaccessible,
                    "{}",
                    fixture.dungeon
                );
                for (now, before) in result.bosses.iter().zip(&previous.bosses) {
                    assert!(now >= before, "{}", fixture.dungeon);
                }
            }
            previous = Some(result);
        }
    }
}
