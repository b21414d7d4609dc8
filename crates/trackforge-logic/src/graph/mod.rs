//! The accessibility graph.
//!
//! [`LogicGraph`] owns the requirement registry and the node arena. A node's
//! level is the `max` over its incoming connections of
//! `min(source level, requirement level)`; entry connections pass the source
//! level through unchanged.
//!
//! # Architecture
//!
//! - Requirements are created through the memoizing registry and computed
//!   immediately, so no requirement is ever observed uninitialized.
//! - Connections are checked for cycles when added; a cycle is an
//!   authoring bug and fails fast with [`TrackerError::Cycle`].
//! - State changes are pushed in with [`LogicGraph::notify`]; see
//!   `propagate.rs` for the cascade.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trackforge_core::{AccessibilityLevel, ItemId, StateChange};
//! use trackforge_logic::LogicGraph;
//! use trackforge_test::MemoryState;
//!
//! let state = Arc::new(MemoryState::new());
//! let mut graph = LogicGraph::new(state.clone());
//!
//! let hookshot = graph.item(ItemId::new(1), 1).unwrap();
//! let ledge = graph.add_node("Ledge").unwrap();
//! graph.connect(graph.start(), ledge, hookshot).unwrap();
//! assert_eq!(graph.node_accessibility(ledge).unwrap(), AccessibilityLevel::None);
//!
//! state.set_item(ItemId::new(1), 1);
//! graph.notify(StateChange::Item(ItemId::new(1))).unwrap();
//! assert_eq!(graph.node_accessibility(ledge).unwrap(), AccessibilityLevel::Normal);
//! ```

mod node;
mod propagate;


use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;
use trackforge_core::{
    AccessibilityLevel, DungeonId, ItemId, Result, SequenceBreakId, Setting, TrackerError,
    TrackerState,
};

use crate::listener::{ListenerSupport, LogicListener};
use crate::requirement::{
    evaluate, EvalContext, RequirementId, RequirementKind, RequirementRegistry, Source,
};

pub use node::{Connection, NodeId};
pub use propagate::PropagationReport;

use node::Node;

/// Reactive graph of requirements and traversal nodes.
pub struct LogicGraph {
    state: Arc<dyn TrackerState>,
    registry: RequirementRegistry,
    nodes: Vec<Node>,
    /// Connection topology; one edge per connected node pair.
    topology: DiGraphMap<NodeId, ()>,
    names: HashMap<String, NodeId>,
    observers: HashMap<Source, Vec<RequirementId>>,
    published: HashMap<(DungeonId, u32), AccessibilityLevel>,
    listeners: ListenerSupport,
    full_assert: bool,
}

impl LogicGraph {
    /// Creates a graph reading from `state`, containing only the start node.
    pub fn new(state: Arc<dyn TrackerState>) -> Self {
        let start = Node::start();
        let mut names = HashMap::new();
        names.insert(start.name.clone(), NodeId(0));
        let mut topology = DiGraphMap::new();
        topology.add_node(NodeId(0));
        Self {
            state,
            registry: RequirementRegistry::new(),
            nodes: vec![start],
            topology,
            names,
            observers: HashMap::new(),
            published: HashMap::new(),
            listeners: ListenerSupport::new(),
            full_assert: false,
        }
    }

    /// Enables re-deriving every vertex after each cascade to check the
    /// incremental result.
    pub fn with_full_assert(mut self, enabled: bool) -> Self {
        self.full_assert = enabled;
        self
    }

    /// The read-only state this graph observes.
    pub fn state(&self) -> &Arc<dyn TrackerState> {
        &self.state
    }

    /// The logical start node, fixed at `Normal`.
    #[inline]
    pub fn start(&self) -> NodeId {
        NodeId(0)
    }

    /// Registers a change listener.
    pub fn add_listener(&mut self, listener: Arc<dyn LogicListener>) {
        self.listeners.add_listener(listener);
    }

    /// The requirement registry.
    pub fn registry(&self) -> &RequirementRegistry {
        &self.registry
    }

    // === Requirements ===

    /// Returns the shared requirement for `kind`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Fails with [`TrackerError::UnknownRequirement`] if a child does not
    /// belong to this graph and with [`TrackerError::EmptyLevels`] for a
    /// composition without children.
    pub fn requirement(&mut self, kind: RequirementKind) -> Result<RequirementId> {
        let kind = kind.normalized();
        if let Some(id) = self.registry.get(&kind) {
            return Ok(id);
        }

        let is_composition = matches!(
            kind,
            RequirementKind::Aggregate(_) | RequirementKind::Alternative(_)
        );
        if is_composition && kind.children().is_empty() {
            return Err(TrackerError::EmptyLevels);
        }
        if let Some(missing) = kind
            .children()
            .iter()
            .find(|child| !self.registry.contains(**child))
        {
            return Err(TrackerError::UnknownRequirement(missing.0));
        }

        let (met, accessibility) = evaluate(&kind, &self.eval_context());
        let id = self.registry.insert(kind.clone(), met, accessibility);

        for child in kind.children() {
            self.registry.slot_mut(*child).dependents.push(id);
        }
        for source in kind.sources() {
            self.observers.entry(source).or_default().push(id);
        }
        Ok(id)
    }

    /// A constant requirement.
    pub fn constant(&mut self, level: AccessibilityLevel) -> Result<RequirementId> {
        self.requirement(RequirementKind::Static(level))
    }

    /// At least `count` copies of `item`.
    pub fn item(&mut self, item: ItemId, count: u32) -> Result<RequirementId> {
        self.requirement(RequirementKind::Item { item, count })
    }

    /// `setting` is currently `expected`.
    pub fn setting(&mut self, setting: Setting, expected: bool) -> Result<RequirementId> {
        self.requirement(RequirementKind::Setting { setting, expected })
    }

    /// At least `count` small keys for `dungeon`.
    pub fn small_keys(&mut self, dungeon: DungeonId, count: u32) -> Result<RequirementId> {
        self.requirement(RequirementKind::SmallKeys { dungeon, count })
    }

    /// The big key of `dungeon`.
    pub fn big_key(&mut self, dungeon: DungeonId) -> Result<RequirementId> {
        self.requirement(RequirementKind::BigKey(dungeon))
    }

    /// An out-of-logic trick.
    pub fn sequence_break(&mut self, id: SequenceBreakId) -> Result<RequirementId> {
        self.requirement(RequirementKind::SequenceBreak(id))
    }

    /// The published verdict for boss `index` of `dungeon`.
    pub fn boss(&mut self, dungeon: DungeonId, index: u32) -> Result<RequirementId> {
        self.requirement(RequirementKind::Boss { dungeon, index })
    }

    /// All of `children` (minimum).
    pub fn all_of(&mut self, children: &[RequirementId]) -> Result<RequirementId> {
        self.requirement(RequirementKind::Aggregate(children.to_vec()))
    }

    /// Any of `children` (maximum).
    pub fn any_of(&mut self, children: &[RequirementId]) -> Result<RequirementId> {
        self.requirement(RequirementKind::Alternative(children.to_vec()))
    }

    /// Whether a requirement is currently met.
    pub fn requirement_met(&self, id: RequirementId) -> Result<bool> {
        self.check_requirement(id)?;
        Ok(self.registry.slot(id).met)
    }

    /// Current level of a requirement.
    pub fn requirement_accessibility(&self, id: RequirementId) -> Result<AccessibilityLevel> {
        self.check_requirement(id)?;
        Ok(self.registry.slot(id).accessibility)
    }

    // === Nodes ===

    /// Adds an unconnected node. Names must be unique.
    pub fn add_node(&mut self, name: impl Into<String>) -> Result<NodeId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(TrackerError::Config(format!("duplicate node name '{}'", name)));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.names.insert(name.clone(), id);
        self.nodes.push(Node::new(name));
        self.topology.add_node(id);
        Ok(id)
    }

    /// Connects `from` to `to` through `requirement`.
    pub fn connect(
        &mut self,
        from: NodeId,
        to: NodeId,
        requirement: RequirementId,
    ) -> Result<PropagationReport> {
        self.check_requirement(requirement)?;
        self.add_connection(to, Connection::gated(from, requirement))
    }

    /// Connects `from` to `to` unconditionally.
    pub fn connect_entry(&mut self, from: NodeId, to: NodeId) -> Result<PropagationReport> {
        self.add_connection(to, Connection::entry(from))
    }

    /// Looks up a node by name.
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Returns the name of a node.
    pub fn node_name(&self, id: NodeId) -> Result<&str> {
        self.check_node(id)?;
        Ok(&self.nodes[id.index()].name)
    }

    /// Current level of a node.
    pub fn node_accessibility(&self, id: NodeId) -> Result<AccessibilityLevel> {
        self.check_node(id)?;
        Ok(self.nodes[id.index()].accessibility)
    }

    /// Incoming connections of a node.
    pub fn incoming(&self, id: NodeId) -> Result<&[Connection]> {
        self.check_node(id)?;
        Ok(&self.nodes[id.index()].incoming)
    }

    /// Number of nodes, including the start node.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct requirements.
    pub fn requirement_count(&self) -> usize {
        self.registry.len()
    }

    fn add_connection(&mut self, to: NodeId, connection: Connection) -> Result<PropagationReport> {
        let from = connection.from;
        self.check_node(from)?;
        self.check_node(to)?;
        if to == self.start() {
            return Err(TrackerError::Config(
                "the start node cannot have incoming connections".to_string(),
            ));
        }
        if from == to || has_path_connecting(&self.topology, to, from, None) {
            return Err(TrackerError::Cycle(format!(
                "{} -> {}",
                self.nodes[from.index()].name,
                self.nodes[to.index()].name
            )));
        }

        self.nodes[to.index()].incoming.push(connection);
        self.topology.add_edge(from, to, ());
        if let Some(requirement) = connection.requirement {
            let nodes = &mut self.registry.slot_mut(requirement).nodes;
            if !nodes.contains(&to) {
                nodes.push(to);
            }
        }
        let minimum_rank = self.nodes[from.index()].rank + 1;
        self.raise_rank(to, minimum_rank);

        self.cascade(Vec::new(), vec![to])
    }

    fn raise_rank(&mut self, node: NodeId, minimum: u32) {
        let mut stack = vec![(node, minimum)];
        while let Some((current, minimum)) = stack.pop() {
            let slot = &mut self.nodes[current.index()];
            if slot.rank >= minimum {
                continue;
            }
            slot.rank = minimum;
            stack.extend(
                self.topology
                    .neighbors(current)
                    .map(|next| (next, minimum + 1)),
            );
        }
    }

    fn check_requirement(&self, id: RequirementId) -> Result<()> {
        if self.registry.contains(id) {
            Ok(())
        } else {
            Err(TrackerError::UnknownRequirement(id.0))
        }
    }

    fn check_node(&self, id: NodeId) -> Result<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(TrackerError::UnknownNode(id.0))
        }
    }

    fn eval_context(&self) -> EvalContext<'_> {
        EvalContext {
            state: self.state.as_ref(),
            registry: &self.registry,
            published: &self.published,
        }
    }
}

impl Debug for LogicGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogicGraph")
            .field("requirements", &self.registry.len())
            .field("nodes", &self.nodes.len())
            .field("listeners", &self.listeners)
            .field("full_assert", &self.full_assert)
            .finish()
    }
}
