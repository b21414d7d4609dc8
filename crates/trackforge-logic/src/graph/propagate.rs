//! Incremental propagation.
//!
//! A cascade starts from the requirements observing a changed source and
//! walks dependents in topological order: requirements by id (children
//! always have smaller ids), then nodes by rank. Every vertex is derived
//! at most once per cascade, and listeners run only after the last one.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use trackforge_core::{AccessibilityLevel, DungeonId, Result, StateChange, TrackerError};

use super::{LogicGraph, NodeId};
use crate::requirement::{evaluate, RequirementId, Source};

/// Vertices whose value changed during one cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    pub requirements: Vec<RequirementId>,
    pub nodes: Vec<NodeId>,
}

impl PropagationReport {
    /// Returns true if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty() && self.nodes.is_empty()
    }

    /// Folds another report into this one.
    pub fn extend(&mut self, other: PropagationReport) {
        self.requirements.extend(other.requirements);
        self.nodes.extend(other.nodes);
    }
}

impl LogicGraph {
    /// Re-derives everything that observes `change`.
    pub fn notify(&mut self, change: StateChange) -> Result<PropagationReport> {
        let seeds: Vec<RequirementId> = match change {
            StateChange::All => {
                let mut all: Vec<RequirementId> = self
                    .observers
                    .iter()
                    .filter(|(source, _)| matches!(source, Source::State(_)))
                    .flat_map(|(_, ids)| ids.iter().copied())
                    .collect();
                all.sort_unstable();
                all.dedup();
                all
            }
            other => self
                .observers
                .get(&Source::State(other))
                .cloned()
                .unwrap_or_default(),
        };
        self.cascade(seeds, Vec::new())
    }

    /// Publishes the solver's verdict for a boss and propagates it.
    pub fn publish_boss(
        &mut self,
        dungeon: DungeonId,
        index: u32,
        accessibility: AccessibilityLevel,
    ) -> Result<PropagationReport> {
        let previous = self.published.insert((dungeon, index), accessibility);
        if previous == Some(accessibility) {
            return Ok(PropagationReport::default());
        }
        let seeds = self
            .observers
            .get(&Source::Boss { dungeon, index })
            .cloned()
            .unwrap_or_default();
        self.cascade(seeds, Vec::new())
    }

    /// Returns the last published verdict for a boss.
    pub fn published_boss(&self, dungeon: DungeonId, index: u32) -> Option<AccessibilityLevel> {
        self.published.get(&(dungeon, index)).copied()
    }

    pub(super) fn cascade(
        &mut self,
        requirement_seeds: Vec<RequirementId>,
        node_seeds: Vec<NodeId>,
    ) -> Result<PropagationReport> {
        let mut report = PropagationReport::default();

        let mut requirement_queue: BinaryHeap<Reverse<RequirementId>> = BinaryHeap::new();
        let mut queued_requirements: HashSet<RequirementId> = HashSet::new();
        let mut node_queue: BinaryHeap<Reverse<(u32, NodeId)>> = BinaryHeap::new();
        let mut queued_nodes: HashSet<NodeId> = HashSet::new();

        for id in requirement_seeds {
            if queued_requirements.insert(id) {
                requirement_queue.push(Reverse(id));
            }
        }
        for id in node_seeds {
            if queued_nodes.insert(id) {
                node_queue.push(Reverse((self.nodes[id.index()].rank, id)));
            }
        }

        while let Some(Reverse(id)) = requirement_queue.pop() {
            let (met, accessibility) = {
                let slot = self.registry.slot(id);
                evaluate(&slot.kind, &self.eval_context())
            };
            let slot = self.registry.slot_mut(id);
            if slot.met == met && slot.accessibility == accessibility {
                continue;
            }
            slot.met = met;
            slot.accessibility = accessibility;
            report.requirements.push(id);

            for dependent in &slot.dependents {
                if queued_requirements.insert(*dependent) {
                    requirement_queue.push(Reverse(*dependent));
                }
            }
            for node in &slot.nodes {
                if queued_nodes.insert(*node) {
                    node_queue.push(Reverse((self.nodes[node.index()].rank, *node)));
                }
            }
        }

        while let Some(Reverse((_, id))) = node_queue.pop() {
            let accessibility = self.derive_node(id);
            if self.nodes[id.index()].accessibility == accessibility {
                continue;
            }
            self.nodes[id.index()].accessibility = accessibility;
            report.nodes.push(id);

            for next in self.topology.neighbors(id) {
                if queued_nodes.insert(next) {
                    node_queue.push(Reverse((self.nodes[next.index()].rank, next)));
                }
            }
        }

        tracing::trace!(
            event = "propagation",
            requirements_changed = report.requirements.len(),
            nodes_changed = report.nodes.len(),
        );

        if self.full_assert {
            self.verify()?;
        }

        for id in &report.requirements {
            let slot = self.registry.slot(*id);
            self.listeners
                .fire_requirement_changed(*id, slot.met, slot.accessibility);
        }
        for id in &report.nodes {
            self.listeners
                .fire_node_changed(*id, self.nodes[id.index()].accessibility);
        }

        Ok(report)
    }

    /// `max` over incoming connections of `min(source, requirement)`.
    fn derive_node(&self, id: NodeId) -> AccessibilityLevel {
        let node = &self.nodes[id.index()];
        if let Some(fixed) = node.fixed {
            return fixed;
        }
        node.incoming
            .iter()
            .map(|connection| {
                let source = self.nodes[connection.from.index()].accessibility;
                match connection.requirement {
                    Some(requirement) => {
                        source.min(self.registry.slot(requirement).accessibility)
                    }
                    None => source,
                }
            })
            .max()
            .unwrap_or(AccessibilityLevel::None)
    }

    /// Checks every stored value against a fresh derivation.
    ///
    /// Stored values are a fixpoint of the local rules iff they equal a
    /// full re-evaluation, since both vertex sets are acyclic.
    fn verify(&self) -> Result<()> {
        let ctx = self.eval_context();
        for id in self.registry.ids() {
            let slot = self.registry.slot(id);
            let (met, accessibility) = evaluate(&slot.kind, &ctx);
            if slot.met != met || slot.accessibility != accessibility {
                return Err(TrackerError::Internal(format!(
                    "{} is stale: stored ({}, {}) derived ({}, {})",
                    id, slot.met, slot.accessibility, met, accessibility
                )));
            }
        }
        for index in 0..self.nodes.len() {
            let id = NodeId(index as u32);
            let derived = self.derive_node(id);
            if self.nodes[index].accessibility != derived {
                return Err(TrackerError::Internal(format!(
                    "{} '{}' is stale: stored {} derived {}",
                    id, self.nodes[index].name, self.nodes[index].accessibility, derived
                )));
            }
        }
        Ok(())
    }
}
