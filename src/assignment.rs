use crate::lit::Lit;

/// Dense, array-backed partial assignment of truth values to variables.
///
/// Keeps a `value`/`assigned` twin vector indexed by 0-based variable index
/// rather than a hashed map, per the "dynamic dictionaries -> dense arrays"
/// design note: membership is a flag check, not a hash lookup.
#[derive(Debug, Clone)]
pub struct Assignment {
    value: Vec<bool>,
    assigned: Vec<bool>,
}

impl Assignment {
    pub fn new(num_vars: usize) -> Self {
        Assignment {
            value: vec![false; num_vars],
            assigned: vec![false; num_vars],
        }
    }

    #[inline]
    pub fn is_assigned(&self, var_index: usize) -> bool {
        self.assigned[var_index]
    }

    /// The boolean value of `var_index`. Only meaningful when assigned.
    #[inline]
    pub fn value(&self, var_index: usize) -> bool {
        self.value[var_index]
    }

    #[inline]
    pub fn set(&mut self, var_index: usize, value: bool) {
        self.assigned[var_index] = true;
        self.value[var_index] = value;
    }

    #[inline]
    pub fn clear(&mut self, var_index: usize) {
        self.assigned[var_index] = false;
    }

    /// The truth value of a literal under this assignment, or `None` if its
    /// variable is unassigned.
    #[inline]
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        let var = lit.var_index();
        if !self.assigned[var] {
            return None;
        }
        Some(self.value[var] != lit.is_neg())
    }

    pub fn num_vars(&self) -> usize {
        self.value.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassigned_reads_none() {
        let a = Assignment::new(3);
        assert_eq!(a.lit_value(Lit::from_dimacs(1)), None);
    }

    #[test]
    fn set_and_negate_agree() {
        let mut a = Assignment::new(3);
        a.set(0, true);
        assert_eq!(a.lit_value(Lit::from_dimacs(1)), Some(true));
        assert_eq!(a.lit_value(Lit::from_dimacs(-1)), Some(false));
    }

    #[test]
    fn clear_reverts_to_unassigned() {
        let mut a = Assignment::new(1);
        a.set(0, true);
        a.clear(0);
        assert!(!a.is_assigned(0));
        assert_eq!(a.lit_value(Lit::from_dimacs(1)), None);
    }
}
