mod common;

use std::sync::Arc;

use common::{config, eastern_palace, world};
use trackforge::prelude::*;
use trackforge::{logging, DoorSet, TrackerError};
use trackforge_test::{ids, MemoryState};

#[test]
fn test_initial_results() {
    let world = world().unwrap();
    let tracker = &world.tracker;

    let eastern = tracker.dungeon_result(ids::EASTERN_PALACE).unwrap();
    assert_eq!(eastern.accessible, 2);
    assert_eq!(eastern.minimum_inaccessible, 3);
    assert_eq!(eastern.boss(0), AccessibilityLevel::None);

    assert_eq!(
        tracker.location_accessibility(world.pyramid).unwrap(),
        AccessibilityLevel::None
    );
    let tower = tracker.dungeon_result(ids::GANONS_TOWER).unwrap();
    assert_eq!(tower.accessible, 0);
    assert_eq!(tracker.dungeon_count(), 2);
}

#[test]
fn test_small_keys_reach_subscribers() {
    let mut world = world().unwrap();
    let mut receiver = world.tracker.subscribe(ids::EASTERN_PALACE).unwrap();
    assert!(!receiver.has_changed().unwrap());

    world.state.set_small_keys(ids::EASTERN_PALACE, 1);
    world
        .tracker
        .notify(StateChange::SmallKeys(ids::EASTERN_PALACE))
        .unwrap();
    assert!(receiver.has_changed().unwrap());
    assert_eq!(receiver.borrow_and_update().accessible, 5);

    world.state.set_item(ids::BOW, 1);
    world.tracker.notify(StateChange::Item(ids::BOW)).unwrap();
    assert!(!receiver.has_changed().unwrap());
}

#[test]
fn test_boss_verdict_opens_overworld() {
    let mut world = world().unwrap();

    world.state.set_big_key(ids::EASTERN_PALACE, true);
    world
        .tracker
        .notify(StateChange::BigKey(ids::EASTERN_PALACE))
        .unwrap();

    let tracker = &world.tracker;
    assert_eq!(
        tracker.boss_accessibility(ids::EASTERN_PALACE, 0).unwrap(),
        AccessibilityLevel::Normal
    );
    assert_eq!(
        tracker.location_accessibility(world.pyramid).unwrap(),
        AccessibilityLevel::Normal
    );
    assert_eq!(
        tracker.dungeon_result(ids::GANONS_TOWER).unwrap().accessible,
        2
    );
    assert_eq!(
        tracker.item_accessibility(ids::GANONS_TOWER, 2).unwrap(),
        AccessibilityLevel::Normal
    );
}

#[test]
fn test_unchanged_inputs_skip_search() {
    let mut world = world().unwrap();
    let handle = world.tracker.search_handle(ids::EASTERN_PALACE).unwrap();
    let before = handle.generation();

    world.state.set_item(ids::HOOKSHOT, 1);
    world.tracker.notify(StateChange::Item(ids::HOOKSHOT)).unwrap();
    world
        .tracker
        .notify(StateChange::SmallKeys(ids::EASTERN_PALACE))
        .unwrap();
    assert_eq!(handle.generation(), before);

    world.state.set_small_keys(ids::EASTERN_PALACE, 1);
    world
        .tracker
        .notify(StateChange::SmallKeys(ids::EASTERN_PALACE))
        .unwrap();
    assert_eq!(handle.generation(), before + 1);

    let stats = world
        .tracker
        .search_statistics(ids::EASTERN_PALACE)
        .unwrap()
        .unwrap();
    assert_eq!(stats.candidates, 2);
    assert!(stats.parallel);
}

#[test]
fn test_item_accessibility_folds_result() {
    let world = world().unwrap();
    let tracker = &world.tracker;
    assert_eq!(
        tracker.item_accessibility(ids::EASTERN_PALACE, 5).unwrap(),
        AccessibilityLevel::Partial
    );
    assert_eq!(
        tracker.item_accessibility(ids::EASTERN_PALACE, 2).unwrap(),
        AccessibilityLevel::Normal
    );
    assert_eq!(
        tracker.item_accessibility(ids::EASTERN_PALACE, 0).unwrap(),
        AccessibilityLevel::Cleared
    );
}

#[test]
fn test_lost_link_degrades_and_recovers() {
    let mut world = world().unwrap();
    world.state.set_small_keys(ids::EASTERN_PALACE, 1);
    world.state.set_big_key(ids::EASTERN_PALACE, true);
    world.tracker.notify(StateChange::All).unwrap();
    assert_eq!(
        world
            .tracker
            .dungeon_result(ids::EASTERN_PALACE)
            .unwrap()
            .accessible,
        5
    );

    world.state.set_unavailable(true);
    world.tracker.notify(StateChange::All).unwrap();
    let degraded = world.tracker.dungeon_result(ids::EASTERN_PALACE).unwrap();
    assert_eq!(degraded.accessible, 2);
    assert_eq!(degraded.boss(0), AccessibilityLevel::None);
    assert_eq!(
        world.tracker.location_accessibility(world.pyramid).unwrap(),
        AccessibilityLevel::None
    );

    world.state.set_unavailable(false);
    world.tracker.notify(StateChange::All).unwrap();
    assert_eq!(
        world
            .tracker
            .dungeon_result(ids::EASTERN_PALACE)
            .unwrap()
            .accessible,
        5
    );
}

#[test]
fn test_evaluate_layout() {
    let world = world().unwrap();
    let evaluation = world
        .tracker
        .evaluate_layout(ids::EASTERN_PALACE, DoorSet::from_bits(1))
        .unwrap();
    assert_eq!(evaluation.items, vec![AccessibilityLevel::Normal; 5]);
    assert_eq!(evaluation.bosses, vec![AccessibilityLevel::None]);
}

#[test]
fn test_duplicate_dungeon_rejected() {
    let mut world = world().unwrap();
    let entry = world.tracker.graph().start();
    let again = eastern_palace(entry).unwrap();
    assert!(matches!(
        world.tracker.add_dungeon(again),
        Err(TrackerError::Config(_))
    ));
}

#[test]
fn test_unknown_dungeon() {
    let world = world().unwrap();
    assert!(matches!(
        world.tracker.dungeon_result(ids::SWAMP_PALACE),
        Err(TrackerError::UnknownDungeon(_))
    ));
    assert!(world.tracker.subscribe(ids::SWAMP_PALACE).is_err());
}

#[test]
fn test_foreign_handles_rejected() {
    let mut world = world().unwrap();
    let mut foreign = LogicGraph::new(Arc::new(MemoryState::new()));
    let mut last = None;
    for count in 1..=8 {
        last = Some(foreign.item(ids::HOOKSHOT, count).unwrap());
    }
    let mut node = foreign.start();
    for index in 0..8 {
        node = foreign.add_node(format!("Foreign {}", index)).unwrap();
    }

    let mut builder = DungeonBuilder::new(ids::SWAMP_PALACE, "Swamp Palace", world.pyramid);
    let requirement = last.unwrap();
    builder.add_item(Location::new("Chest", builder.entrance()).gated(Gate::Requirement(requirement)));
    assert!(matches!(
        world.tracker.add_dungeon(builder.build().unwrap()),
        Err(TrackerError::UnknownRequirement(_))
    ));

    let builder = DungeonBuilder::new(ids::SWAMP_PALACE, "Swamp Palace", node);
    assert!(matches!(
        world.tracker.add_dungeon(builder.build().unwrap()),
        Err(TrackerError::UnknownNode(_))
    ));
    assert_eq!(world.tracker.dungeon_count(), 2);
}

#[test]
fn test_config_file() {
    let path = std::env::temp_dir().join(format!("trackforge-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "environment_mode: full_assert\nsearch:\n  sequential_threshold: 7\n",
    )
    .unwrap();

    let tracker = Tracker::from_config_file(Arc::new(MemoryState::new()), &path).unwrap();
    assert!(tracker.config().is_full_assert());
    assert_eq!(tracker.config().search.sequential_threshold, 7);
    std::fs::remove_file(&path).unwrap();

    let missing = Tracker::from_config_file(Arc::new(MemoryState::new()), "missing.toml");
    assert!(matches!(missing, Err(TrackerError::Config(_))));
}

#[test]
fn test_logging_init_is_idempotent() {
    logging::init();
    logging::init();
    let tracker = Tracker::new(Arc::new(MemoryState::new()), config()).unwrap();
    assert_eq!(tracker.dungeon_count(), 0);
}
