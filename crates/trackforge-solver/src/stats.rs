//! Search statistics.

use std::time::Duration;

/// Statistics of one completed key-layout search.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use trackforge_solver::SearchStatistics;
///
/// let stats = SearchStatistics {
///     candidates: 8,
///     admitted: 3,
///     duration: Duration::from_millis(2),
///     parallel: true,
/// };
/// assert_eq!(stats.rejected(), 5);
/// assert!(stats.layouts_per_second() > 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Candidate layouts enumerated.
    pub candidates: usize,
    /// Candidate layouts admitted.
    pub admitted: u64,
    /// Wall time of the search.
    pub duration: Duration,
    /// Whether the search ran on the worker pool.
    pub parallel: bool,
}

impl SearchStatistics {
    /// Candidates that were not admitted.
    pub fn rejected(&self) -> u64 {
        (self.candidates as u64).saturating_sub(self.admitted)
    }

    /// Returns the evaluated layouts per second.
    pub fn layouts_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.candidates as f64 / secs
        } else {
            0.0
        }
    }
}
