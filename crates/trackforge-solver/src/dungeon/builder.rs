//! Fluent builder for [`Dungeon`] definitions.

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use smallvec::SmallVec;
use trackforge_core::{DungeonId, Result, TrackerError};
use trackforge_logic::{NodeId, RequirementId};

use super::{
    BossIndex, Check, CompiledLocation, Dungeon, DungeonNode, Edge, Gate, ItemIndex, KeyDoorId,
    KeyLayout, Location,
};
use crate::state::MAX_KEY_DOORS;

/// Builder for a [`Dungeon`].
///
/// Structural problems are reported by [`build`](Self::build), so a
/// definition can be assembled without checking every call.
///
/// # Example
///
/// ```
/// use trackforge_core::DungeonId;
/// use trackforge_logic::LogicGraph;
/// use trackforge_solver::{DungeonBuilder, Gate, Location};
/// use trackforge_test::MemoryState;
/// use std::sync::Arc;
///
/// let graph = LogicGraph::new(Arc::new(MemoryState::new()));
/// let mut builder = DungeonBuilder::new(DungeonId::new(1), "Eastern Palace", graph.start());
/// let hall = builder.add_node("Hall");
/// let door = builder.add_key_door("Hall Door");
/// builder.connect(builder.entrance(), hall, [Gate::KeyDoor(door)]);
/// builder.add_item(Location::new("Compass Chest", builder.entrance()));
/// builder.add_item(Location::new("Big Chest", hall).gated(Gate::BigKey));
/// builder.small_keys(1);
///
/// let dungeon = builder.build().unwrap();
/// assert_eq!(dungeon.door_count(), 1);
/// assert_eq!(dungeon.item_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DungeonBuilder {
    id: DungeonId,
    name: String,
    entry: NodeId,
    nodes: Vec<String>,
    edges: Vec<(DungeonNode, DungeonNode, SmallVec<[Gate; 2]>)>,
    doors: Vec<String>,
    items: Vec<Location>,
    bosses: Vec<Location>,
    small_keys: u32,
    key_drop_keys: u32,
    layout: KeyLayout,
}

impl DungeonBuilder {
    /// Starts a dungeon whose entrance is fed by the overworld node `entry`.
    pub fn new(id: DungeonId, name: impl Into<String>, entry: NodeId) -> Self {
        Self {
            id,
            name: name.into(),
            entry,
            nodes: vec!["Entrance".to_string()],
            edges: Vec::new(),
            doors: Vec::new(),
            items: Vec::new(),
            bosses: Vec::new(),
            small_keys: 0,
            key_drop_keys: 0,
            layout: KeyLayout::SmallKeys,
        }
    }

    /// The entrance node.
    pub fn entrance(&self) -> DungeonNode {
        DungeonNode(0)
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> DungeonNode {
        self.nodes.push(name.into());
        DungeonNode(self.nodes.len() as u32 - 1)
    }

    pub fn add_key_door(&mut self, name: impl Into<String>) -> KeyDoorId {
        self.doors.push(name.into());
        KeyDoorId(self.doors.len() as u32 - 1)
    }

    /// Adds an edge passable when every gate holds.
    pub fn connect(
        &mut self,
        from: DungeonNode,
        to: DungeonNode,
        gates: impl IntoIterator<Item = Gate>,
    ) -> &mut Self {
        self.edges.push((from, to, gates.into_iter().collect()));
        self
    }

    pub fn add_item(&mut self, location: Location) -> ItemIndex {
        self.items.push(location);
        ItemIndex(self.items.len() as u32 - 1)
    }

    pub fn add_boss(&mut self, location: Location) -> BossIndex {
        self.bosses.push(location);
        BossIndex(self.bosses.len() as u32 - 1)
    }

    /// Small keys placed in chests.
    pub fn small_keys(&mut self, count: u32) -> &mut Self {
        self.small_keys = count;
        self
    }

    /// Small keys dropped by enemies or found in pots.
    pub fn key_drop_keys(&mut self, count: u32) -> &mut Self {
        self.key_drop_keys = count;
        self
    }

    pub fn key_layout(&mut self, layout: KeyLayout) -> &mut Self {
        self.layout = layout;
        self
    }

    /// Validates and compiles the definition.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::Config`] for duplicate names, dangling node or
    ///   door handles, edges into the entrance, key-door gates on
    ///   locations, too many doors, or an `End` layout with doors.
    /// - [`TrackerError::Cycle`] if the edges do not form a DAG.
    pub fn build(self) -> Result<Dungeon> {
        let config = |message: String| TrackerError::Config(format!("{}: {}", self.name, message));

        if self.doors.len() > MAX_KEY_DOORS {
            return Err(config(format!(
                "{} key doors exceed the limit of {}",
                self.doors.len(),
                MAX_KEY_DOORS
            )));
        }
        if matches!(self.layout, KeyLayout::End { .. }) && !self.doors.is_empty() {
            return Err(config("an end layout cannot have key doors".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = self.nodes.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(config(format!("duplicate node name '{}'", duplicate)));
        }

        let node_count = self.nodes.len();
        let check_node = |node: DungeonNode| {
            if node.index() < node_count {
                Ok(())
            } else {
                Err(config(format!("dangling {}", node)))
            }
        };

        let mut slots: HashMap<RequirementId, usize> = HashMap::new();
        let mut requirements: Vec<RequirementId> = Vec::new();
        let mut compile = |gates: &[Gate], allow_doors: bool| -> Result<SmallVec<[Check; 2]>> {
            let mut checks = SmallVec::new();
            for gate in gates {
                match *gate {
                    Gate::Open => {}
                    Gate::Requirement(id) => {
                        let slot = *slots.entry(id).or_insert_with(|| {
                            requirements.push(id);
                            requirements.len() - 1
                        });
                        checks.push(Check::Requirement(slot));
                    }
                    Gate::KeyDoor(door) => {
                        if !allow_doors {
                            return Err(config(format!("{} gates a location", door)));
                        }
                        if door.index() >= self.doors.len() {
                            return Err(config(format!("dangling {}", door)));
                        }
                        checks.push(Check::KeyDoor(door));
                    }
                    Gate::BigKey => checks.push(Check::BigKey),
                }
            }
            Ok(checks)
        };

        let mut incoming: Vec<Vec<Edge>> = vec![Vec::new(); node_count];
        let mut door_edges: Vec<Vec<(DungeonNode, usize)>> = vec![Vec::new(); self.doors.len()];
        for (from, to, gates) in &self.edges {
            check_node(*from)?;
            check_node(*to)?;
            if to.index() == 0 {
                return Err(config("the entrance cannot have incoming edges".to_string()));
            }
            let checks = compile(gates, true)?;
            let edge_index = incoming[to.index()].len();
            for check in &checks {
                if let Check::KeyDoor(door) = check {
                    let gated = &mut door_edges[door.index()];
                    if !gated.contains(&(*to, edge_index)) {
                        gated.push((*to, edge_index));
                    }
                }
            }
            incoming[to.index()].push(Edge {
                from: *from,
                checks,
            });
        }

        let mut locations = |list: &[Location]| -> Result<Vec<CompiledLocation>> {
            list.iter()
                .map(|location| -> Result<CompiledLocation> {
                    check_node(location.node)?;
                    Ok(CompiledLocation {
                        name: location.name.clone(),
                        node: location.node,
                        checks: compile(&location.gates, false)?,
                        key_drop: location.key_drop,
                    })
                })
                .collect()
        };
        let items = locations(&self.items)?;
        let bosses = locations(&self.bosses)?;

        let end_gate = match self.layout {
            KeyLayout::End { gate: Some(id) } => compile(&[Gate::Requirement(id)], false)?
                .first()
                .and_then(|check| match check {
                    Check::Requirement(slot) => Some(*slot),
                    _ => None,
                }),
            _ => None,
        };

        let order = topological_order(&incoming).map_err(|stuck| {
            TrackerError::Cycle(format!(
                "{}: node '{}' lies on a cycle",
                self.name,
                self.nodes[stuck.index()]
            ))
        })?;

        Ok(Dungeon {
            id: self.id,
            name: self.name,
            entry: self.entry,
            node_names: self.nodes,
            incoming,
            order,
            doors: self.doors,
            door_edges,
            items,
            bosses,
            requirements,
            small_keys: self.small_keys,
            key_drop_keys: self.key_drop_keys,
            layout: self.layout,
            end_gate,
        })
    }
}

/// Orders the interior so every edge points forward.
///
/// Graph indices coincide with [`DungeonNode`] indices.
fn topological_order(
    incoming: &[Vec<Edge>],
) -> std::result::Result<Vec<DungeonNode>, DungeonNode> {
    let mut interior: DiGraph<(), ()> = DiGraph::with_capacity(incoming.len(), 0);
    for _ in incoming {
        interior.add_node(());
    }
    for (to, edges) in incoming.iter().enumerate() {
        for edge in edges {
            interior.add_edge(NodeIndex::new(edge.from.index()), NodeIndex::new(to), ());
        }
    }

    toposort(&interior, None)
        .map(|order| {
            order
                .into_iter()
                .map(|index| DungeonNode(index.index() as u32))
                .collect()
        })
        .map_err(|cycle| DungeonNode(cycle.node_id().index() as u32))
}
