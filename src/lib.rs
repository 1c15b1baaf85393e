//! A non-recursive DPLL SAT solver core: two-watched-literal Boolean
//! constraint propagation over a dense assignment, plus an implication
//! graph that can extract a first-UIP learned clause and backjump level
//! from a completed conflict.
//!
//! The crate exposes its pieces individually (`lit`, `assignment`,
//! `clause`, `trail`, `graph`) as well as the `Solver` that wires them
//! into a search loop, since `bcp()`, `add_decision()` and the implication
//! graph are all meant to be driven directly, not only through `solve()`.

pub mod assignment;
pub mod clause;
pub mod config;
pub mod error;
pub mod graph;
pub mod lit;
pub mod solver;
pub mod trail;

pub use assignment::Assignment;
pub use clause::{Clause, Status};
pub use config::SolverConfig;
pub use error::SolverError;
pub use graph::{GraphState, ImplicationGraph};
pub use lit::Lit;
pub use solver::Solver;
pub use trail::Trail;
