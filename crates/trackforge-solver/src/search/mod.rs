//! Key-layout search.
//!
//! [`DungeonSolver`] enumerates the candidate layouts of one dungeon,
//! evaluates each on a working copy, and reduces the admitted outcomes
//! into a [`DungeonResult`].
//!
//! # Execution
//!
//! - Small candidate spaces run sequentially on the solver's reserved copy.
//! - Larger spaces are split into one batch per worker on the shared
//!   [`SearchExecutor`]. Each batch checks out a copy from the
//!   [`MutableDungeonPool`], evaluates its layouts, and requeues the copy.
//! - Partial summaries are merged in whatever order batches finish.

mod handle;

#[cfg(test)]
mod tests;

use std::fmt::{self, Debug};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPool;
use trackforge_config::{SearchConfig, TrackerConfig};
use trackforge_core::{AccessibilityLevel, Result, TrackerError};

use crate::dungeon::{BossIndex, Dungeon, ItemIndex};
use crate::inputs::DungeonInputs;
use crate::layout::{self, LayoutSummary};
use crate::pool::MutableDungeonPool;
use crate::result::{DungeonResult, StateEvaluation};
use crate::state::DungeonState;
use crate::stats::SearchStatistics;
use crate::working::MutableDungeon;

pub use handle::{SearchHandle, SearchTicket};

/// Thread pool shared by every dungeon's parallel searches.
#[derive(Clone)]
pub struct SearchExecutor {
    pool: Arc<ThreadPool>,
    workers: usize,
}

impl SearchExecutor {
    /// Builds an executor with the configured worker count.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Self::with_workers(config.worker_count.resolve())
    }

    pub fn with_workers(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("trackforge-search-{}", index))
            .build()
            .map_err(|err| TrackerError::Internal(format!("search thread pool: {}", err)))?;
        Ok(Self {
            pool: Arc::new(pool),
            workers,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }
}

impl Debug for SearchExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchExecutor")
            .field("workers", &self.workers)
            .finish()
    }
}

/// Solver for one dungeon.
///
/// Searches take `&self`, so a solver can be shared across threads; a
/// newer search supersedes any search still running on the same solver.
pub struct DungeonSolver {
    dungeon: Arc<Dungeon>,
    executor: SearchExecutor,
    pool: MutableDungeonPool,
    reserved: Mutex<MutableDungeon>,
    handle: SearchHandle,
    sequential_threshold: usize,
    log_searches: bool,
    last_statistics: Mutex<Option<SearchStatistics>>,
}

impl DungeonSolver {
    /// Creates a solver whose pool matches the executor's worker count.
    pub fn new(dungeon: Arc<Dungeon>, executor: SearchExecutor, config: &TrackerConfig) -> Self {
        let pool = MutableDungeonPool::new(Arc::clone(&dungeon), executor.workers())
            .with_full_assert(config.is_full_assert());
        Self {
            reserved: Mutex::new(MutableDungeon::new(Arc::clone(&dungeon))),
            dungeon,
            executor,
            pool,
            handle: SearchHandle::new(),
            sequential_threshold: config.search.sequential_threshold,
            log_searches: config.search.log_searches,
            last_statistics: Mutex::new(None),
        }
    }

    pub fn dungeon(&self) -> &Arc<Dungeon> {
        &self.dungeon
    }

    pub fn pool(&self) -> &MutableDungeonPool {
        &self.pool
    }

    /// A handle that can supersede this solver's searches from any thread.
    pub fn handle(&self) -> SearchHandle {
        self.handle.clone()
    }

    /// Statistics of the last completed search.
    pub fn last_statistics(&self) -> Option<SearchStatistics> {
        self.last_statistics.lock().ok().and_then(|stats| *stats)
    }

    /// Runs a search, superseding any search still in flight.
    pub fn search(&self, inputs: &DungeonInputs) -> Result<DungeonResult> {
        let ticket = self.handle.begin();
        self.search_with(inputs, &ticket)
    }

    /// Runs a search under an existing ticket.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::Superseded`] if the ticket went stale before the
    ///   search completed; partial results are discarded.
    /// - [`TrackerError::EmptyLayoutSpace`] if no candidate exists.
    pub fn search_with(&self, inputs: &DungeonInputs, ticket: &SearchTicket) -> Result<DungeonResult> {
        let started = Instant::now();
        let candidates = layout::candidates(&self.dungeon, inputs)?;
        let boss_count = self.dungeon.boss_count();
        let parallel = candidates.len() > self.sequential_threshold;

        tracing::debug!(
            event = "search_start",
            dungeon = %self.dungeon.name(),
            candidates = candidates.len(),
            small_keys = inputs.small_keys,
            big_key = inputs.big_key,
            parallel,
        );

        let summary = if parallel {
            self.search_parallel(&candidates, inputs, ticket, boss_count)?
        } else {
            self.search_sequential(&candidates, inputs, ticket, boss_count)?
        };

        if !ticket.is_current() {
            tracing::debug!(
                event = "search_superseded",
                dungeon = %self.dungeon.name(),
                generation = ticket.generation(),
            );
            return Err(TrackerError::Superseded);
        }

        let statistics = SearchStatistics {
            candidates: candidates.len(),
            admitted: summary.admitted(),
            duration: started.elapsed(),
            parallel,
        };
        if self.log_searches {
            tracing::debug!(
                event = "search_end",
                dungeon = %self.dungeon.name(),
                candidates = statistics.candidates,
                admitted = statistics.admitted,
                duration_us = statistics.duration.as_micros() as u64,
            );
        }
        if let Ok(mut last) = self.last_statistics.lock() {
            *last = Some(statistics);
        }

        Ok(summary.into_result(self.dungeon.counted_items(inputs.key_drop_shuffle)))
    }

    /// Evaluates one explicit state on the reserved copy.
    ///
    /// Doors of `state` are presumed unlocked; sequence-break levels are
    /// capped when tracking is disabled.
    pub fn evaluate_state(
        &self,
        inputs: &DungeonInputs,
        state: &DungeonState,
    ) -> Result<StateEvaluation> {
        let mut copy = self.reserved()?;
        copy.evaluate(inputs, state);
        let capped = |level: AccessibilityLevel| level.within_logic(state.sequence_break);
        let evaluation = StateEvaluation {
            items: (0..self.dungeon.item_count() as u32)
                .map(|index| capped(copy.item_level(ItemIndex(index))))
                .collect(),
            bosses: (0..self.dungeon.boss_count() as u32)
                .map(|index| capped(copy.boss_level(BossIndex(index))))
                .collect(),
        };
        copy.reset();
        Ok(evaluation)
    }

    fn search_sequential(
        &self,
        candidates: &[DungeonState],
        inputs: &DungeonInputs,
        ticket: &SearchTicket,
        boss_count: usize,
    ) -> Result<LayoutSummary> {
        let mut copy = self.reserved()?;
        let mut summary = LayoutSummary::new(boss_count);
        for state in candidates {
            if !ticket.is_current() {
                break;
            }
            if let Some(outcome) = copy.assess(inputs, state) {
                summary.record(&outcome);
            }
        }
        copy.reset();
        Ok(summary)
    }

    fn search_parallel(
        &self,
        candidates: &[DungeonState],
        inputs: &DungeonInputs,
        ticket: &SearchTicket,
        boss_count: usize,
    ) -> Result<LayoutSummary> {
        let batch = candidates.len().div_ceil(self.pool.capacity()).max(1);
        self.executor.install(|| {
            candidates
                .par_chunks(batch)
                .map(|layouts| -> Result<LayoutSummary> {
                    let mut copy = self.pool.get_next()?;
                    let mut summary = LayoutSummary::new(boss_count);
                    for state in layouts {
                        if !ticket.is_current() {
                            break;
                        }
                        if let Some(outcome) = copy.assess(inputs, state) {
                            summary.record(&outcome);
                        }
                    }
                    self.pool.requeue(copy)?;
                    Ok(summary)
                })
                .try_reduce(|| LayoutSummary::new(boss_count), |a, b| Ok(a.merge(b)))
        })
    }

    fn reserved(&self) -> Result<MutexGuard<'_, MutableDungeon>> {
        self.reserved.lock().map_err(|_| {
            TrackerError::Internal(format!(
                "reserved working copy of {} is poisoned",
                self.dungeon.name()
            ))
        })
    }
}

impl Debug for DungeonSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DungeonSolver")
            .field("dungeon", &self.dungeon.name())
            .field("pool", &self.pool)
            .field("sequential_threshold", &self.sequential_threshold)
            .finish()
    }
}
