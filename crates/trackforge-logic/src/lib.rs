//! Reactive accessibility graph
//!
//! This crate derives an [`AccessibilityLevel`](trackforge_core::AccessibilityLevel)
//! for every requirement and location node from the player's state:
//! - Requirements: deduplicated condition nodes (item counts, settings, compositions)
//! - Nodes: traversal points whose level is the best of their incoming connections
//! - Incremental propagation: a state change re-derives only dependent vertices,
//!   in topological order, and notifies listeners once the cascade is complete

pub mod graph;
pub mod listener;
pub mod requirement;

pub use graph::{Connection, LogicGraph, NodeId, PropagationReport};
pub use listener::{CountingListener, ListenerSupport, LoggingListener, LogicListener};
pub use requirement::{RequirementId, RequirementKind, RequirementRegistry, Source};
