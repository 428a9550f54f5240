//! Satisfiability helpers: witness extraction and exact model counting.

use hashbrown::HashMap;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::bdd::BddManager;
use crate::node::Ref;

impl BddManager {
    /// One satisfying partial assignment as `(level, value)` pairs, or
    /// `None` when the function is the contradiction. The high branch is
    /// preferred, so positive witnesses come out first.
    pub fn one_sat(&self, root: Ref) -> Option<Vec<(u32, bool)>> {
        let mut path = Vec::new();
        let mut node = root;
        loop {
            if self.is_zero(node) {
                return None;
            }
            if self.is_one(node) {
                return Some(path);
            }
            let level = self.level(node);
            if self.is_zero(self.high(node)) {
                path.push((level, false));
                node = self.low(node);
            } else {
                path.push((level, true));
                node = self.high(node);
            }
        }
    }

    /// Exact number of satisfying assignments over `num_vars` variables.
    ///
    /// Counts paths weighted by the number of levels skipped along them,
    /// memoized per node.
    pub fn sat_count(&self, root: Ref, num_vars: usize) -> BigUint {
        let mut memo: HashMap<Ref, BigUint> = HashMap::new();
        self.count_below(root, 0, num_vars, &mut memo)
    }

    /// Assignments of variables in `level..num_vars` satisfying `node`.
    fn count_below(&self, node: Ref, level: usize, num_vars: usize, memo: &mut HashMap<Ref, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::zero();
        }
        let node_level = if self.is_one(node) {
            num_vars
        } else {
            self.level(node) as usize
        };
        // Free variables between the query level and the node's own level
        // double the count.
        let gap = node_level - level;
        if self.is_one(node) {
            return BigUint::one() << gap;
        }

        if let Some(cached) = memo.get(&node) {
            return cached.clone() << gap;
        }

        let low = self.count_below(self.low(node), node_level + 1, num_vars, memo);
        let high = self.count_below(self.high(node), node_level + 1, num_vars, memo);
        let here = low + high;
        memo.insert(node, here.clone());
        here << gap
    }
}
