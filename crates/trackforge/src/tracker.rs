//! The tracker: accessibility graph plus one solver per dungeon.
//!
//! State changes enter through [`Tracker::notify`]. The graph re-derives
//! the affected requirements and nodes, then every dungeon whose search
//! inputs moved is searched again. Boss verdicts are published back into
//! the graph, which can in turn move the inputs of other dungeons, so
//! dungeons are refreshed in passes until nothing changes.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};
use trackforge_config::TrackerConfig;
use trackforge_core::{
    AccessibilityLevel, DungeonId, Result, StateChange, TrackerError, TrackerState,
};
use trackforge_logic::{LogicGraph, NodeId, PropagationReport};
use trackforge_solver::{
    DoorSet, Dungeon, DungeonInputs, DungeonResult, DungeonSolver, SearchExecutor, SearchHandle,
    SearchStatistics, StateEvaluation,
};

/// Searches retried after being superseded before giving up.
const SUPERSEDED_RETRIES: usize = 3;

struct DungeonSlot {
    solver: Arc<DungeonSolver>,
    /// Inputs of the last completed search.
    inputs: Option<DungeonInputs>,
    results: watch::Sender<DungeonResult>,
}

/// Accessibility tracker for one playthrough.
pub struct Tracker {
    config: TrackerConfig,
    graph: LogicGraph,
    executor: SearchExecutor,
    dungeons: Vec<DungeonSlot>,
    index: HashMap<DungeonId, usize>,
}

impl Tracker {
    /// Creates a tracker reading `state`.
    ///
    /// The search thread pool is sized from `config.search.worker_count`.
    pub fn new(state: Arc<dyn TrackerState>, config: TrackerConfig) -> Result<Self> {
        let graph = LogicGraph::new(state).with_full_assert(config.is_full_assert());
        let executor = SearchExecutor::new(&config.search)?;
        info!(
            event = "tracker_created",
            workers = executor.workers(),
            environment_mode = ?config.environment_mode,
        );
        Ok(Self {
            config,
            graph,
            executor,
            dungeons: Vec::new(),
            index: HashMap::new(),
        })
    }

    /// Creates a tracker with configuration loaded from a file.
    ///
    /// `.yaml` and `.yml` files are read as YAML, anything else as TOML.
    pub fn from_config_file(state: Arc<dyn TrackerState>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        );
        let config = if yaml {
            TrackerConfig::from_yaml_file(path)
        } else {
            TrackerConfig::load(path)
        }
        .map_err(|err| TrackerError::Config(format!("{}: {}", path.display(), err)))?;
        Self::new(state, config)
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn graph(&self) -> &LogicGraph {
        &self.graph
    }

    /// Mutable access for authoring the overworld.
    ///
    /// Call [`refresh`](Self::refresh) after changing connections that
    /// feed registered dungeons.
    pub fn graph_mut(&mut self) -> &mut LogicGraph {
        &mut self.graph
    }

    /// Registers a dungeon and runs its first search.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::Config`] if a dungeon with the same id exists.
    /// - [`TrackerError::UnknownNode`] / [`TrackerError::UnknownRequirement`]
    ///   if the dungeon references handles this tracker's graph never issued.
    pub fn add_dungeon(&mut self, dungeon: Dungeon) -> Result<()> {
        if self.index.contains_key(&dungeon.id()) {
            return Err(TrackerError::Config(format!(
                "dungeon {} ({}) is already registered",
                dungeon.id(),
                dungeon.name()
            )));
        }
        self.graph.node_accessibility(dungeon.entry())?;
        for requirement in dungeon.requirements() {
            self.graph.requirement_accessibility(*requirement)?;
        }

        let id = dungeon.id();
        let initial = DungeonResult::unreachable(dungeon.counted_items(false), dungeon.boss_count());
        let dungeon = Arc::new(dungeon);
        info!(
            event = "dungeon_registered",
            dungeon = %dungeon.name(),
            nodes = dungeon.node_count(),
            key_doors = dungeon.door_count(),
            items = dungeon.item_count(),
            bosses = dungeon.boss_count(),
        );

        let solver = DungeonSolver::new(dungeon, self.executor.clone(), &self.config);
        let (results, _) = watch::channel(initial);
        self.index.insert(id, self.dungeons.len());
        self.dungeons.push(DungeonSlot {
            solver: Arc::new(solver),
            inputs: None,
            results,
        });
        self.refresh()
    }

    pub fn dungeon_count(&self) -> usize {
        self.dungeons.len()
    }

    /// Reports one state mutation and brings every result up to date.
    pub fn notify(&mut self, change: StateChange) -> Result<PropagationReport> {
        if let Some(dungeon) = change.dungeon() {
            if !self.index.contains_key(&dungeon) {
                warn!(event = "unknown_dungeon", dungeon = %dungeon, change = ?change);
            }
        }
        let report = self.graph.notify(change)?;
        self.refresh()?;
        Ok(report)
    }

    /// Re-searches every dungeon whose inputs changed.
    ///
    /// # Errors
    ///
    /// Fails with [`TrackerError::Cycle`] if boss verdicts keep moving
    /// each other's dungeons after one pass per registered dungeon.
    pub fn refresh(&mut self) -> Result<()> {
        let passes = self.dungeons.len() + 1;
        for _ in 0..passes {
            let mut published = false;
            for position in 0..self.dungeons.len() {
                published |= self.refresh_dungeon(position)?;
            }
            if !published {
                return Ok(());
            }
        }
        Err(TrackerError::Cycle(
            "boss verdicts did not settle between dungeons".to_string(),
        ))
    }

    /// Current overworld level of `node`.
    pub fn location_accessibility(&self, node: NodeId) -> Result<AccessibilityLevel> {
        self.graph.node_accessibility(node)
    }

    /// Latest search result of `dungeon`.
    pub fn dungeon_result(&self, dungeon: DungeonId) -> Result<DungeonResult> {
        Ok(self.slot(dungeon)?.results.borrow().clone())
    }

    /// Subscribes to the search results of `dungeon`.
    ///
    /// The receiver is marked changed only when a search produced a
    /// result different from the previous one.
    pub fn subscribe(&self, dungeon: DungeonId) -> Result<watch::Receiver<DungeonResult>> {
        Ok(self.slot(dungeon)?.results.subscribe())
    }

    /// Level of the dungeon's item section with `remaining` items unchecked.
    pub fn item_accessibility(&self, dungeon: DungeonId, remaining: u32) -> Result<AccessibilityLevel> {
        Ok(self
            .slot(dungeon)?
            .results
            .borrow()
            .item_accessibility(remaining))
    }

    pub fn boss_accessibility(&self, dungeon: DungeonId, index: usize) -> Result<AccessibilityLevel> {
        Ok(self.slot(dungeon)?.results.borrow().boss(index))
    }

    /// Levels of every location of `dungeon` with exactly `unlocked` open.
    pub fn evaluate_layout(&self, dungeon: DungeonId, unlocked: DoorSet) -> Result<StateEvaluation> {
        let solver = &self.slot(dungeon)?.solver;
        let inputs = DungeonInputs::capture(solver.dungeon(), &self.graph)?;
        solver.evaluate_state(&inputs, &inputs.state(unlocked))
    }

    /// Handle for superseding the dungeon's in-flight searches.
    pub fn search_handle(&self, dungeon: DungeonId) -> Result<SearchHandle> {
        Ok(self.slot(dungeon)?.solver.handle())
    }

    pub fn search_statistics(&self, dungeon: DungeonId) -> Result<Option<SearchStatistics>> {
        Ok(self.slot(dungeon)?.solver.last_statistics())
    }

    pub fn solver(&self, dungeon: DungeonId) -> Result<&Arc<DungeonSolver>> {
        Ok(&self.slot(dungeon)?.solver)
    }

    fn slot(&self, dungeon: DungeonId) -> Result<&DungeonSlot> {
        self.index
            .get(&dungeon)
            .map(|&position| &self.dungeons[position])
            .ok_or(TrackerError::UnknownDungeon(dungeon.0))
    }

    /// Searches one dungeon if its inputs moved; returns whether a boss
    /// publication changed the graph.
    fn refresh_dungeon(&mut self, position: usize) -> Result<bool> {
        let slot = &self.dungeons[position];
        let dungeon = slot.solver.dungeon();
        let inputs = DungeonInputs::capture(dungeon, &self.graph)?;
        if slot.inputs.as_ref() == Some(&inputs) {
            return Ok(false);
        }

        let id = dungeon.id();
        let result = search_until_current(&slot.solver, &inputs)?;
        let bosses = result.bosses.clone();
        slot.results.send_if_modified(|current| {
            if *current == result {
                false
            } else {
                *current = result;
                true
            }
        });
        self.dungeons[position].inputs = Some(inputs);

        let mut changed = false;
        for (index, level) in bosses.into_iter().enumerate() {
            let report = self.graph.publish_boss(id, index as u32, level)?;
            changed |= !report.is_empty();
        }
        Ok(changed)
    }
}

fn search_until_current(solver: &DungeonSolver, inputs: &DungeonInputs) -> Result<DungeonResult> {
    for attempt in 0..=SUPERSEDED_RETRIES {
        match solver.search(inputs) {
            Err(TrackerError::Superseded) => {
                debug!(
                    event = "search_retry",
                    dungeon = %solver.dungeon().name(),
                    attempt,
                );
            }
            outcome => return outcome,
        }
    }
    Err(TrackerError::Superseded)
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("dungeons", &self.dungeons.len())
            .field("nodes", &self.graph.node_count())
            .field("requirements", &self.graph.requirement_count())
            .field("executor", &self.executor)
            .finish()
    }
}
