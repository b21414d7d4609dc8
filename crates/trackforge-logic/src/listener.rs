//! Change notification for requirements and nodes.
//!
//! Listeners are notified after a propagation cascade has completed, so
//! every value they read back from the graph is already consistent.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use trackforge_logic::{CountingListener, ListenerSupport};
//!
//! let mut support = ListenerSupport::new();
//! let counter = Arc::new(CountingListener::new());
//! support.add_listener(counter.clone());
//! assert_eq!(support.listener_count(), 1);
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use trackforge_core::AccessibilityLevel;

use crate::graph::NodeId;
use crate::requirement::RequirementId;

/// Listener for accessibility changes.
///
/// Each changed vertex is reported exactly once per cascade.
pub trait LogicListener: Send + Sync + Debug {
    /// Called when a requirement's `met` flag or level changed.
    fn on_requirement_changed(
        &self,
        _requirement: RequirementId,
        _met: bool,
        _accessibility: AccessibilityLevel,
    ) {
    }

    /// Called when a node's level changed.
    fn on_node_changed(&self, _node: NodeId, _accessibility: AccessibilityLevel) {}
}

/// Broadcaster for [`LogicListener`]s.
///
/// Listeners are called synchronously in registration order.
#[derive(Default)]
pub struct ListenerSupport {
    listeners: Vec<Arc<dyn LogicListener>>,
}

impl ListenerSupport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn LogicListener>) {
        self.listeners.push(listener);
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub fn fire_requirement_changed(
        &self,
        requirement: RequirementId,
        met: bool,
        accessibility: AccessibilityLevel,
    ) {
        for listener in &self.listeners {
            listener.on_requirement_changed(requirement, met, accessibility);
        }
    }

    pub fn fire_node_changed(&self, node: NodeId, accessibility: AccessibilityLevel) {
        for listener in &self.listeners {
            listener.on_node_changed(node, accessibility);
        }
    }
}

impl Debug for ListenerSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSupport")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Forwards every change to `tracing` at debug level.
#[derive(Debug, Clone, Default)]
pub struct LoggingListener;

impl LoggingListener {
    pub fn new() -> Self {
        Self
    }
}

impl LogicListener for LoggingListener {
    fn on_requirement_changed(
        &self,
        requirement: RequirementId,
        met: bool,
        accessibility: AccessibilityLevel,
    ) {
        tracing::debug!(
            event = "requirement_changed",
            requirement = requirement.index(),
            met,
            accessibility = accessibility.as_str(),
        );
    }

    fn on_node_changed(&self, node: NodeId, accessibility: AccessibilityLevel) {
        tracing::debug!(
            event = "node_changed",
            node = node.index(),
            accessibility = accessibility.as_str(),
        );
    }
}

/// Counts notifications; useful in tests.
#[derive(Debug, Default)]
pub struct CountingListener {
    requirement_changes: AtomicUsize,
    node_changes: AtomicUsize,
}

impl CountingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requirement_changes(&self) -> usize {
        self.requirement_changes.load(Ordering::SeqCst)
    }

    pub fn node_changes(&self) -> usize {
        self.node_changes.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.requirement_changes.store(0, Ordering::SeqCst);
        self.node_changes.store(0, Ordering::SeqCst);
    }
}

impl LogicListener for CountingListener {
    fn on_requirement_changed(
        &self,
        _requirement: RequirementId,
        _met: bool,
        _accessibility: AccessibilityLevel,
    ) {
        self.requirement_changes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_node_changed(&self, _node: NodeId, _accessibility: AccessibilityLevel) {
        self.node_changes.fetch_add(1, Ordering::SeqCst);
    }
}
