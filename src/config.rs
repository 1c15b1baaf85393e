use std::time::Duration;

/// Tunable knobs for a [`crate::solver::Solver`].
///
/// Deliberately small: restart schedules, branching heuristics, clause
/// deletion policy and preprocessing are all non-goals of this crate (see
/// `SPEC_FULL.md` §1), so the only thing left to configure is the wall-clock
/// search budget.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Wall-clock budget for a single `solve()` call. `None` means no limit.
    pub timeout: Option<Duration>,
}

impl SolverConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        SolverConfig {
            timeout: Some(timeout),
        }
    }

    pub fn unbounded() -> Self {
        SolverConfig { timeout: None }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig::unbounded()
    }
}
