use thiserror::Error;

/// Errors that can surface across the public API.
///
/// `ImpossibleAssignment` is only ever produced by calling [`crate::solver::Solver::bcp`]
/// directly: it signals that the current round of unit propagation demands
/// contradictory values for some variable. `solve()`'s outer loop drives an
/// internal, crate-private sibling of `bcp` that carries the same signal as
/// a lightweight marker type rather than a `SolverError`, catches it in the
/// same iteration that produces it, and turns it into a backtrack-and-flip
/// step - so `solve()` itself never returns this variant. See
/// `SPEC_FULL.md`'s REDESIGN FLAGS for the rationale.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SolverError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("bcp forces contradictory assignments")]
    ImpossibleAssignment,

    #[error("implication graph invariant violated: {0}")]
    ImplicationGraphError(String),

    #[error("solver timed out after the configured budget")]
    TimedOut,
}
