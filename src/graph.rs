use std::collections::HashMap;

use crate::error::SolverError;

/// The id of the distinguished conflict node.
pub const CONFLICT_NODE_ID: i64 = 0;

/// The signed node id for a 0-based variable index forced to `value`:
/// `+v` (1-based) if `value` is true, `-v` if false.
#[inline]
pub fn literal_id(var_index: usize, value: bool) -> i64 {
    let v = (var_index + 1) as i64;
    if value { v } else { -v }
}

/// Outcome of [`ImplicationGraph::create_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    Conflict,
    NotConflict,
}

/// A node in the implication graph: a forced literal assignment (signed
/// variable id, `+v` for `v := true`, `-v` for `v := false`) or the
/// distinguished conflict node (id 0).
#[derive(Debug, Clone)]
struct Node {
    level: i32,
    /// The literals whose falsity forced this one, in the order they were
    /// supplied to `create_node` (insertion order matters for the
    /// determinism of `get_conflict_clause`).
    parents: Vec<i64>,
    children: Vec<i64>,
}

/// DAG over forced literal assignments, used to extract a first-UIP learned
/// clause and backjump level once a conflict node has been created.
///
/// Storage is a hash map keyed by signed literal id (see `SPEC_FULL.md`
/// DESIGN NOTES); parent/child adjacency is kept as insertion-ordered,
/// deduplicated `Vec`s rather than `HashSet`s so that the reverse-order scan
/// in `get_conflict_clause` is deterministic.
#[derive(Debug, Default)]
pub struct ImplicationGraph {
    nodes: HashMap<i64, Node>,
}

impl ImplicationGraph {
    pub fn new() -> Self {
        ImplicationGraph {
            nodes: HashMap::new(),
        }
    }

    pub fn has_conflict(&self) -> bool {
        self.nodes.contains_key(&CONFLICT_NODE_ID)
    }

    /// Discards all nodes, so a fresh conflict analysis can begin. The graph
    /// otherwise forbids insertion forever after a conflict node appears.
    pub fn reset(&mut self) {
        self.nodes.clear();
    }

    /// Removes `literal`'s node (used when backtracking unwinds the
    /// assignment that created it), cleaning up the reference from each of
    /// its parents' children lists. If `literal` was one of the conflict
    /// node's two parents, the conflict node is removed too, since the
    /// conflict it recorded no longer holds.
    pub fn forget(&mut self, literal: i64) {
        if let Some(conflict) = self.nodes.get(&CONFLICT_NODE_ID) {
            if conflict.parents.contains(&literal) {
                self.nodes.remove(&CONFLICT_NODE_ID);
            }
        }
        if let Some(node) = self.nodes.remove(&literal) {
            for p in node.parents {
                if let Some(parent) = self.nodes.get_mut(&p) {
                    parent.children.retain(|&c| c != literal);
                }
            }
        }
    }

    /// Inserts a node for `literal` at decision level `dl` with the given
    /// `parents`. Returns [`GraphState::Conflict`] if inserting `literal`
    /// completes an opposite-polarity pair, in which case the conflict node
    /// (id 0) is also created.
    pub fn create_node(
        &mut self,
        literal: i64,
        dl: i32,
        parents: &[i64],
    ) -> Result<GraphState, SolverError> {
        if literal == CONFLICT_NODE_ID {
            return Err(SolverError::ImplicationGraphError(
                "the conflict node cannot be created manually".into(),
            ));
        }
        if self.nodes.contains_key(&literal) {
            return Err(SolverError::ImplicationGraphError(format!(
                "literal {literal} is already present in the graph"
            )));
        }
        if dl < 0 {
            return Err(SolverError::ImplicationGraphError(
                "decision level cannot be negative".into(),
            ));
        }
        if let Some(&missing) = parents.iter().find(|p| !self.nodes.contains_key(p)) {
            return Err(SolverError::ImplicationGraphError(format!(
                "parent {missing} is not present in the graph"
            )));
        }
        if self.has_conflict() {
            return Err(SolverError::ImplicationGraphError(
                "the graph already holds a conflict; reset before inserting again".into(),
            ));
        }

        let mut dedup_parents = Vec::with_capacity(parents.len());
        for &p in parents {
            if !dedup_parents.contains(&p) {
                dedup_parents.push(p);
            }
        }
        for &p in &dedup_parents {
            let parent = self.nodes.get_mut(&p).expect("checked present above");
            if !parent.children.contains(&literal) {
                parent.children.push(literal);
            }
        }

        self.nodes.insert(
            literal,
            Node {
                level: dl,
                parents: dedup_parents,
                children: Vec::new(),
            },
        );

        if self.nodes.contains_key(&-literal) {
            self.nodes
                .get_mut(&literal)
                .unwrap()
                .children
                .push(CONFLICT_NODE_ID);
            self.nodes
                .get_mut(&-literal)
                .unwrap()
                .children
                .push(CONFLICT_NODE_ID);
            self.nodes.insert(
                CONFLICT_NODE_ID,
                Node {
                    level: dl,
                    parents: vec![literal, -literal],
                    children: Vec::new(),
                },
            );
            return Ok(GraphState::Conflict);
        }

        Ok(GraphState::NotConflict)
    }

    /// First-UIP conflict analysis: returns the learned clause's literals
    /// (the negated UIP cut) together with the backjump level.
    pub fn get_conflict_clause(&self) -> Result<(Vec<i64>, i32), SolverError> {
        let conflict = self.nodes.get(&CONFLICT_NODE_ID).ok_or_else(|| {
            SolverError::ImplicationGraphError("no conflict node present".into())
        })?;
        let dl_star = conflict.level;

        let mut groups: HashMap<i32, Vec<i64>> = HashMap::new();
        groups.insert(dl_star, conflict.parents.clone());

        let mut visited: Vec<i64> = vec![CONFLICT_NODE_ID];

        loop {
            let current = groups.get(&dl_star).cloned().unwrap_or_default();
            if current.len() <= 1 {
                break;
            }

            let mut chosen_idx = None;
            for (idx, &lit) in current.iter().enumerate().rev() {
                let node = &self.nodes[&lit];
                if node.children.iter().all(|c| visited.contains(c)) {
                    chosen_idx = Some(idx);
                    break;
                }
            }
            let idx = chosen_idx.ok_or_else(|| {
                SolverError::ImplicationGraphError(
                    "no resolvable node found at the conflict's decision level".into(),
                )
            })?;

            let lit = current[idx];
            let mut remaining = current;
            remaining.remove(idx);
            let parents = self.nodes[&lit].parents.clone();
            for p in parents {
                let p_level = self.nodes[&p].level;
                if p_level == dl_star {
                    if !remaining.contains(&p) {
                        remaining.push(p);
                    }
                } else {
                    let group = groups.entry(p_level).or_default();
                    if !group.contains(&p) {
                        group.push(p);
                    }
                }
            }
            groups.insert(dl_star, remaining);
            visited.push(lit);
        }

        let mut literals = Vec::new();
        let mut backjump_level = 0;
        for (&level, lits) in &groups {
            if lits.is_empty() {
                continue;
            }
            literals.extend(lits.iter().copied());
            if level != dl_star && level > backjump_level {
                backjump_level = level;
            }
        }

        Ok((literals, backjump_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_insertion_and_children_tracking() {
        let mut g = ImplicationGraph::new();
        assert_eq!(g.create_node(1, 0, &[]).unwrap(), GraphState::NotConflict);
        assert_eq!(g.create_node(-2, 1, &[]).unwrap(), GraphState::NotConflict);
        assert_eq!(
            g.create_node(3, 1, &[1, -2]).unwrap(),
            GraphState::NotConflict
        );
        assert_eq!(g.nodes[&1].children, vec![3]);
        assert_eq!(g.nodes[&-2].children, vec![3]);
    }

    #[test]
    fn opposite_polarity_triggers_conflict() {
        let mut g = ImplicationGraph::new();
        g.create_node(1, 0, &[]).unwrap();
        g.create_node(-2, 1, &[]).unwrap();
        g.create_node(3, 1, &[1, -2]).unwrap();
        let state = g.create_node(-3, 1, &[-2]).unwrap();
        assert_eq!(state, GraphState::Conflict);
        assert_eq!(g.nodes[&CONFLICT_NODE_ID].parents, vec![-3, 3]);
        assert!(g.has_conflict());
    }

    #[test]
    fn rejects_conflict_literal_duplicate_and_missing_parent() {
        let mut g = ImplicationGraph::new();
        g.create_node(1, 0, &[]).unwrap();
        assert!(g.create_node(0, 0, &[]).is_err());
        assert!(g.create_node(1, 0, &[]).is_err());
        assert!(g.create_node(2, -1, &[]).is_err());
        assert!(g.create_node(2, 0, &[999]).is_err());
    }

    #[test]
    fn insertion_forbidden_after_conflict_until_reset() {
        let mut g = ImplicationGraph::new();
        g.create_node(1, 0, &[]).unwrap();
        g.create_node(-1, 0, &[]).unwrap();
        assert!(g.has_conflict());
        assert!(g.create_node(2, 0, &[]).is_err());
        g.reset();
        assert!(!g.has_conflict());
        assert_eq!(g.create_node(2, 0, &[]).unwrap(), GraphState::NotConflict);
    }

    #[test]
    fn forget_allows_reassigning_the_opposite_polarity() {
        let mut g = ImplicationGraph::new();
        g.create_node(1, 0, &[]).unwrap();
        g.create_node(5, 1, &[1]).unwrap();
        g.forget(5);
        assert!(!g.nodes.contains_key(&5));
        assert!(g.nodes[&1].children.is_empty());
        // Re-deciding the same variable with the opposite polarity must not
        // spuriously look like a conflict against the forgotten node.
        assert_eq!(g.create_node(-5, 1, &[]).unwrap(), GraphState::NotConflict);
    }

    /// Scenario 7 of the spec's test vectors.
    #[test]
    fn first_uip_extraction_matches_reference_scenario() {
        let mut g = ImplicationGraph::new();
        g.create_node(-7, 1, &[]).unwrap();
        g.create_node(-8, 2, &[]).unwrap();
        g.create_node(-9, 3, &[]).unwrap();
        g.create_node(-1, 4, &[]).unwrap();
        g.create_node(2, 4, &[-1]).unwrap();
        g.create_node(3, 4, &[-1, -7]).unwrap();
        g.create_node(4, 4, &[2, 3]).unwrap();
        g.create_node(6, 4, &[4, -9]).unwrap();
        g.create_node(5, 4, &[-8, 4]).unwrap();
        let state = g.create_node(-5, 4, &[6]).unwrap();
        assert_eq!(state, GraphState::Conflict);

        let (mut literals, backjump_level) = g.get_conflict_clause().unwrap();
        literals.sort();
        let mut expected = vec![-9, -8, 4];
        expected.sort();
        assert_eq!(literals, expected);
        assert_eq!(backjump_level, 3);
    }
}
