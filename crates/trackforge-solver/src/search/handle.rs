//! Search supersession.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle for superseding in-flight searches.
///
/// Every search runs under a [`SearchTicket`] stamped with the handle's
/// generation. Bumping the generation makes every outstanding ticket
/// stale; workers holding a stale ticket stop picking up layouts and the
/// search reports [`TrackerError::Superseded`](trackforge_core::TrackerError::Superseded).
///
/// # Example
///
/// ```
/// use trackforge_solver::SearchHandle;
///
/// let handle = SearchHandle::new();
/// let ticket = handle.begin();
/// assert!(ticket.is_current());
///
/// // A newer state change arrives from another thread.
/// handle.supersede();
/// assert!(!ticket.is_current());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchHandle {
    generation: Arc<AtomicU64>,
}

impl SearchHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes every outstanding ticket and issues a ticket for the
    /// new generation.
    pub fn begin(&self) -> SearchTicket {
        let issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        SearchTicket {
            generation: Arc::clone(&self.generation),
            issued,
        }
    }

    /// Issues a ticket for the current generation without superseding.
    pub fn ticket(&self) -> SearchTicket {
        SearchTicket {
            generation: Arc::clone(&self.generation),
            issued: self.generation.load(Ordering::SeqCst),
        }
    }

    /// Makes every outstanding ticket stale.
    pub fn supersede(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Permission to run one search; see [`SearchHandle`].
#[derive(Debug, Clone)]
pub struct SearchTicket {
    generation: Arc<AtomicU64>,
    issued: u64,
}

impl SearchTicket {
    /// Returns true until the issuing handle moves to a newer generation.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.issued
    }

    pub fn generation(&self) -> u64 {
        self.issued
    }
}
