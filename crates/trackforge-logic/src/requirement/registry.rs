//! Memoizing requirement registry.
//!
//! The registry owns every requirement of a graph and maps each
//! normalized [`RequirementKind`] to its single shared instance. It lives
//! as long as the owning [`LogicGraph`](crate::LogicGraph), which in a
//! running tracker is the whole session.

use std::collections::HashMap;

use trackforge_core::AccessibilityLevel;

use super::{RequirementId, RequirementKind};
use crate::graph::NodeId;

/// Arena entry for one requirement.
#[derive(Debug, Clone)]
pub(crate) struct RequirementSlot {
    pub kind: RequirementKind,
    pub met: bool,
    pub accessibility: AccessibilityLevel,
    /// Compositions that read this requirement.
    pub dependents: Vec<RequirementId>,
    /// Nodes with an incoming connection gated by this requirement.
    pub nodes: Vec<NodeId>,
}

/// Deduplicating arena of requirements.
///
/// Ids are handed out in creation order. Compositions can only reference
/// existing requirements, so id order is a topological order.
#[derive(Debug, Default)]
pub struct RequirementRegistry {
    slots: Vec<RequirementSlot>,
    index: HashMap<RequirementKind, RequirementId>,
}

impl RequirementRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the shared instance for an already normalized kind.
    pub fn get(&self, kind: &RequirementKind) -> Option<RequirementId> {
        self.index.get(kind).copied()
    }

    /// Returns true if `id` belongs to this registry.
    #[inline]
    pub fn contains(&self, id: RequirementId) -> bool {
        id.index() < self.slots.len()
    }

    /// Number of distinct requirements.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no requirement was created yet.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the kind of a requirement.
    pub fn kind(&self, id: RequirementId) -> Option<&RequirementKind> {
        self.slots.get(id.index()).map(|slot| &slot.kind)
    }

    /// Iterates over all ids in topological order.
    pub fn ids(&self) -> impl Iterator<Item = RequirementId> + '_ {
        (0..self.slots.len() as u32).map(RequirementId)
    }

    pub(crate) fn insert(
        &mut self,
        kind: RequirementKind,
        met: bool,
        accessibility: AccessibilityLevel,
    ) -> RequirementId {
        let id = RequirementId(self.slots.len() as u32);
        self.slots.push(RequirementSlot {
            kind: kind.clone(),
            met,
            accessibility,
            dependents: Vec::new(),
            nodes: Vec::new(),
        });
        self.index.insert(kind, id);
        id
    }

    #[inline]
    pub(crate) fn slot(&self, id: RequirementId) -> &RequirementSlot {
        &self.slots[id.index()]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, id: RequirementId) -> &mut RequirementSlot {
        &mut self.slots[id.index()]
    }
}
