use std::collections::HashMap;
use std::time::Instant;

use crate::assignment::Assignment;
use crate::clause::{Clause, Status};
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::graph::{self, ImplicationGraph};
use crate::lit::Lit;
use crate::trail::Trail;

/// Internal signal raised when a round of BCP demands contradictory values
/// for some variable. Never implements `std::error::Error`: it is local
/// control flow consumed entirely inside the crate (see `error.rs`'s doc
/// comment and `SPEC_FULL.md`'s REDESIGN FLAGS).
pub(crate) struct Conflict;

/// The overall status of the formula under the current assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverallStatus {
    Satisfied,
    Contradiction,
    Unsaturated,
}

/// A non-recursive DPLL solver using two-watched-literal BCP, with an
/// implication graph maintained alongside the search for first-UIP conflict
/// analysis (see `graph::ImplicationGraph`).
pub struct Solver {
    clauses: Vec<Clause>,
    assignment: Assignment,
    trail: Trail,
    /// `Some(clause_index)` antecedent for a BCP-forced variable, `None`
    /// for a decision (or an unassigned variable).
    reason: Vec<Option<usize>>,
    /// Whether each 0-based variable index appears in the original formula.
    present: Vec<bool>,
    num_vars: usize,
    num_decisions: usize,
    config: SolverConfig,
    graph: ImplicationGraph,
}

impl Solver {
    /// Builds a solver from a CNF given as a list of clauses, each a list of
    /// non-zero signed integers with 1-based variable ids.
    pub fn new(clauses: Vec<Vec<i32>>, config: SolverConfig) -> Result<Self, SolverError> {
        let mut num_vars = 0usize;
        let mut built = Vec::with_capacity(clauses.len());

        for raw in &clauses {
            if raw.is_empty() {
                return Err(SolverError::InvalidInput(
                    "clauses must be non-empty".into(),
                ));
            }
            let mut lits = Vec::with_capacity(raw.len());
            for &value in raw {
                if value == 0 {
                    return Err(SolverError::InvalidInput(
                        "literal 0 is not a valid variable reference".into(),
                    ));
                }
                num_vars = num_vars.max(value.unsigned_abs() as usize);
                lits.push(Lit::from_dimacs(value));
            }
            built.push(Clause::new(lits));
        }

        let mut present = vec![false; num_vars];
        for clause in &built {
            for lit in &clause.literals {
                present[lit.var_index()] = true;
            }
        }

        Ok(Solver {
            clauses: built,
            assignment: Assignment::new(num_vars),
            trail: Trail::new(),
            reason: vec![None; num_vars],
            present,
            num_vars,
            num_decisions: 0,
            config,
            graph: ImplicationGraph::new(),
        })
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn get_num_decisions(&self) -> usize {
        self.num_decisions
    }

    pub fn decision_level(&self) -> usize {
        self.trail.decision_level()
    }

    pub fn backtracking_stack(&self) -> &[usize] {
        self.trail.backtracking_stack()
    }

    /// The model found by `solve()`, as 1-based variable ids mapped to
    /// their truth value. Empty unless the formula is currently satisfied.
    pub fn get_model(&self) -> HashMap<i64, bool> {
        if self.overall_status() != OverallStatus::Satisfied {
            return HashMap::new();
        }
        (0..self.num_vars)
            .filter(|&v| self.assignment.is_assigned(v))
            .map(|v| ((v + 1) as i64, self.assignment.value(v)))
            .collect()
    }

    /// Adds a decision: `variable` (1-based, must be `> 0`, present in the
    /// formula and currently unassigned) is set to `value`.
    pub fn add_decision(&mut self, variable: i64, value: bool) -> Result<(), SolverError> {
        let var_index = self.validate_variable(variable)?;
        if self.assignment.is_assigned(var_index) {
            return Err(SolverError::InvalidOperation(format!(
                "variable {variable} is already assigned"
            )));
        }

        self.num_decisions += 1;
        self.trail.push_decision(var_index);
        self.assignment.set(var_index, value);
        self.reason[var_index] = None;
        for clause in &mut self.clauses {
            clause.update_watchers(&self.assignment, var_index);
        }

        let node_id = graph::literal_id(var_index, value);
        let dl = self.trail.decision_level() as i32;
        self.graph
            .create_node(node_id, dl, &[])
            .map_err(|_| {
                SolverError::ImplicationGraphError(format!(
                    "decision for variable {variable} collided with a stale implication-graph node"
                ))
            })?;
        Ok(())
    }

    /// Undoes the most recent decision and everything propagated from it.
    /// Idempotent at decision level 0.
    pub fn backtrack(&mut self) {
        for var_index in self.trail.backtrack() {
            let value = self.assignment.value(var_index);
            self.graph.forget(graph::literal_id(var_index, value));
            self.assignment.clear(var_index);
            self.reason[var_index] = None;
        }
    }

    /// One sweep of unit propagation against every clause. Returns the
    /// forced `(variable_index, value)` pairs applied this round, or
    /// `Err(SolverError::ImpossibleAssignment)` if two clauses demand
    /// contradictory values. Run in a loop (as `solve()` does internally)
    /// until an empty map is returned to reach a fixed point.
    pub fn bcp(&mut self) -> Result<HashMap<usize, bool>, SolverError> {
        self.bcp_internal().map_err(|Conflict| SolverError::ImpossibleAssignment)
    }

    pub(crate) fn bcp_internal(&mut self) -> Result<HashMap<usize, bool>, Conflict> {
        let mut forced: HashMap<usize, (bool, usize)> = HashMap::new();

        for (idx, clause) in self.clauses.iter_mut().enumerate() {
            if clause.status(&self.assignment) == Status::Satisfied {
                continue;
            }
            let Some((var, value)) = clause.propagate(&self.assignment) else {
                continue;
            };

            if let Some(&(existing, _)) = forced.get(&var) {
                if existing != value {
                    return Err(Conflict);
                }
                continue;
            }
            if self.assignment.is_assigned(var) && self.assignment.value(var) != value {
                return Err(Conflict);
            }
            forced.insert(var, (value, idx));
        }

        for (&var, &(value, clause_idx)) in &forced {
            self.assignment.set(var, value);
            self.trail.push_forced(var);
            self.reason[var] = Some(clause_idx);
            for clause in &mut self.clauses {
                clause.update_watchers(&self.assignment, var);
            }

            let parents = self.antecedent_parents(clause_idx, var);
            let node_id = graph::literal_id(var, value);
            let dl = self.trail.decision_level() as i32;
            if self.graph.create_node(node_id, dl, &parents).is_err() {
                // A stale node from an un-backtracked branch; the search
                // itself stays sound (the graph is a diagnostic aid, not
                // the source of truth for the trail), so this is logged
                // and otherwise ignored rather than aborting the sweep.
                log::debug!(
                    "implication graph rejected node {node_id} at level {dl}; leaving it unrecorded"
                );
            }
        }

        Ok(forced.into_iter().map(|(var, (value, _))| (var, value)).collect())
    }

    fn antecedent_parents(&self, clause_idx: usize, forced_var: usize) -> Vec<i64> {
        self.clauses[clause_idx]
            .literals
            .iter()
            .filter(|lit| lit.var_index() != forced_var)
            .map(|lit| -lit.to_dimacs() as i64)
            .collect()
    }

    fn overall_status(&self) -> OverallStatus {
        let mut any_unsaturated = false;
        for clause in &self.clauses {
            match clause.status(&self.assignment) {
                Status::Contradiction => return OverallStatus::Contradiction,
                Status::Unsaturated => any_unsaturated = true,
                Status::Satisfied => {}
            }
        }
        if any_unsaturated {
            OverallStatus::Unsaturated
        } else {
            OverallStatus::Satisfied
        }
    }

    fn smallest_unassigned_variable(&self) -> Option<i64> {
        (0..self.num_vars)
            .find(|&v| self.present[v] && !self.assignment.is_assigned(v))
            .map(|v| (v + 1) as i64)
    }

    fn validate_variable(&self, variable: i64) -> Result<usize, SolverError> {
        if variable <= 0 {
            return Err(SolverError::InvalidOperation(
                "variable must be greater than 0".into(),
            ));
        }
        let var_index = (variable - 1) as usize;
        if var_index >= self.num_vars || !self.present[var_index] {
            return Err(SolverError::InvalidOperation(format!(
                "variable {variable} does not appear in the formula"
            )));
        }
        Ok(var_index)
    }

    /// Non-recursive DPLL search: decide -> propagate -> (backtrack or
    /// learn). Variable selection is the smallest unassigned id; a decision
    /// first tries `true`, and on conflict-driven pop tries `false` before
    /// the pop cascades (see `SPEC_FULL.md` §4.5).
    pub fn solve(&mut self) -> Result<bool, SolverError> {
        let deadline = self.config.timeout.map(|budget| (Instant::now(), budget));
        let mut decision_history: Vec<(i64, usize)> = Vec::new();

        loop {
            if let Some((start, budget)) = deadline {
                if start.elapsed() > budget {
                    return Err(SolverError::TimedOut);
                }
            }

            let mut conflict_by_bcp = false;
            loop {
                match self.bcp_internal() {
                    Ok(forced) if forced.is_empty() => break,
                    Ok(_) => continue,
                    Err(Conflict) => {
                        conflict_by_bcp = true;
                        break;
                    }
                }
            }

            let status = self.overall_status();
            if status == OverallStatus::Satisfied {
                log::debug!("solve: SAT after {} decisions", self.num_decisions);
                return Ok(true);
            }

            if status == OverallStatus::Contradiction || conflict_by_bcp {
                let Some((variable, dl)) = decision_history.pop() else {
                    log::debug!("solve: UNSAT after {} decisions", self.num_decisions);
                    return Ok(false);
                };
                while self.trail.decision_level() != dl {
                    self.backtrack();
                }
                log::trace!("solve: backjump to level {dl}, flipping variable {variable}");
                // The variable was freed by the backtrack above; a prior
                // true-branch conflict can never make the flip itself
                // invalid, since `variable` is guaranteed unassigned here.
                self.add_decision(variable, false)
                    .expect("variable was just freed by backtrack");
            } else {
                let variable = self
                    .smallest_unassigned_variable()
                    .expect("status is Unsaturated, so some variable must be unassigned");
                decision_history.push((variable, self.trail.decision_level()));
                log::trace!("solve: deciding variable {variable} := true");
                self.add_decision(variable, true)
                    .expect("variable was confirmed unassigned above");
            }
        }
    }
}
