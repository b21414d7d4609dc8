//! Traversal nodes and their connections.

use std::fmt;

use smallvec::SmallVec;
use trackforge_core::AccessibilityLevel;

use crate::requirement::RequirementId;

/// Handle to a node owned by a [`LogicGraph`](super::LogicGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the arena index of this node.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// An incoming edge of a node.
///
/// Entry connections carry no requirement and pass the source level through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub from: NodeId,
    pub requirement: Option<RequirementId>,
}

impl Connection {
    /// A connection gated by `requirement`.
    pub fn gated(from: NodeId, requirement: RequirementId) -> Self {
        Self {
            from,
            requirement: Some(requirement),
        }
    }

    /// An unconditional entry connection.
    pub fn entry(from: NodeId) -> Self {
        Self {
            from,
            requirement: None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub name: String,
    pub accessibility: AccessibilityLevel,
    pub incoming: SmallVec<[Connection; 4]>,
    /// Strictly greater than the rank of every source node.
    pub rank: u32,
    /// Pinned level (the start node).
    pub fixed: Option<AccessibilityLevel>,
}

impl Node {
    pub fn new(name: String) -> Self {
        Self {
            name,
            accessibility: AccessibilityLevel::None,
            incoming: SmallVec::new(),
            rank: 0,
            fixed: None,
        }
    }

    pub fn start() -> Self {
        Self {
            accessibility: AccessibilityLevel::Normal,
            fixed: Some(AccessibilityLevel::Normal),
            ..Self::new("Start".to_string())
        }
    }
}
