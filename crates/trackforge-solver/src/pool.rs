//! Bounded pool of working copies.
//!
//! The pool is the only structure shared between search workers. Copies
//! travel through a bounded channel: checking one out receives it, and
//! requeueing resets it and sends it back. Once every copy is checked out,
//! [`get_next`](MutableDungeonPool::get_next) blocks until one is returned.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trackforge_core::DungeonId;
//! use trackforge_logic::LogicGraph;
//! use trackforge_solver::{DungeonBuilder, MutableDungeonPool};
//! use trackforge_test::MemoryState;
//!
//! let graph = LogicGraph::new(Arc::new(MemoryState::new()));
//! let dungeon = DungeonBuilder::new(DungeonId::new(1), "Tower", graph.start())
//!     .build()
//!     .unwrap();
//! let pool = MutableDungeonPool::new(Arc::new(dungeon), 2);
//!
//! let copy = pool.get_next().unwrap();
//! assert_eq!(pool.available(), 1);
//! pool.requeue(copy).unwrap();
//! assert_eq!(pool.available(), 2);
//! ```

use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use trackforge_core::{Result, TrackerError};

use crate::dungeon::Dungeon;
use crate::working::MutableDungeon;

/// Fixed-size pool of [`MutableDungeon`] copies of one dungeon.
pub struct MutableDungeonPool {
    dungeon: Arc<Dungeon>,
    sender: Sender<MutableDungeon>,
    receiver: Receiver<MutableDungeon>,
    capacity: usize,
    full_assert: bool,
}

impl MutableDungeonPool {
    /// Allocates `capacity` copies (at least one).
    pub fn new(dungeon: Arc<Dungeon>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = channel::bounded(capacity);
        for _ in 0..capacity {
            // Cannot fail: the channel has room for every copy and we hold the receiver.
            let _ = sender.try_send(MutableDungeon::new(Arc::clone(&dungeon)));
        }
        Self {
            dungeon,
            sender,
            receiver,
            capacity,
            full_assert: false,
        }
    }

    /// Enables checking that requeued copies read as pristine.
    pub fn with_full_assert(mut self, enabled: bool) -> Self {
        self.full_assert = enabled;
        self
    }

    /// Checks out a copy, waiting for one to be requeued if none is free.
    pub fn get_next(&self) -> Result<MutableDungeon> {
        self.receiver
            .recv()
            .map_err(|_| TrackerError::Internal("working-copy pool disconnected".to_string()))
    }

    /// Checks out a copy if one is free.
    pub fn try_get_next(&self) -> Option<MutableDungeon> {
        self.receiver.try_recv().ok()
    }

    /// Checks out a copy, giving up after `timeout`.
    pub fn get_next_timeout(&self, timeout: Duration) -> Option<MutableDungeon> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Resets `copy` and makes it available again.
    ///
    /// # Errors
    ///
    /// Fails with [`TrackerError::Internal`] if the copy belongs to another
    /// dungeon, the pool is already full, or (under full assert) the reset
    /// left state behind.
    pub fn requeue(&self, mut copy: MutableDungeon) -> Result<()> {
        if !Arc::ptr_eq(copy.dungeon(), &self.dungeon) {
            return Err(TrackerError::Internal(format!(
                "working copy of {} requeued into the pool of {}",
                copy.dungeon().name(),
                self.dungeon.name()
            )));
        }
        copy.reset();
        if self.full_assert && !copy.is_pristine() {
            return Err(TrackerError::Internal(format!(
                "working copy of {} is not pristine after reset",
                self.dungeon.name()
            )));
        }
        self.sender.try_send(copy).map_err(|err| match err {
            TrySendError::Full(_) => TrackerError::Internal(format!(
                "pool of {} is over capacity",
                self.dungeon.name()
            )),
            TrySendError::Disconnected(_) => {
                TrackerError::Internal("working-copy pool disconnected".to_string())
            }
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copies currently free.
    pub fn available(&self) -> usize {
        self.receiver.len()
    }

    pub fn dungeon(&self) -> &Arc<Dungeon> {
        &self.dungeon
    }
}

impl Debug for MutableDungeonPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableDungeonPool")
            .field("dungeon", &self.dungeon.name())
            .field("capacity", &self.capacity)
            .field("available", &self.available())
            .finish()
    }
}
