//! Iterator over satisfying paths of a BDD.
//!
//! Each yielded path is a partial assignment: the sequence of
//! `(level, value)` decisions taken from the root to the `⊤` terminal.
//! Variables skipped on the way are free, so a path covers `2^k` full
//! assignments. The number of paths can be exponential; callers enumerate
//! with care.

use crate::bdd::BddManager;
use crate::node::Ref;

impl BddManager {
    /// Iterate all paths from `root` to `⊤`.
    pub fn paths(&self, root: Ref) -> BddPaths<'_> {
        BddPaths {
            bdd: self,
            stack: vec![(root, Vec::new())],
        }
    }
}

pub struct BddPaths<'a> {
    bdd: &'a BddManager,
    stack: Vec<(Ref, Vec<(u32, bool)>)>,
}

impl Iterator for BddPaths<'_> {
    /// A conjunction of `(level, value)` decisions.
    type Item = Vec<(u32, bool)>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path)) = self.stack.pop() {
            if self.bdd.is_zero(node) {
                continue;
            }
            if self.bdd.is_one(node) {
                return Some(path);
            }
            let level = self.bdd.level(node);
            let mut high_path = path.clone();
            high_path.push((level, true));
            let mut low_path = path;
            low_path.push((level, false));
            // Low pushed last so paths come out in low-first order.
            self.stack.push((self.bdd.high(node), high_path));
            self.stack.push((self.bdd.low(node), low_path));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_paths() {
        let bdd = BddManager::new();
        assert_eq!(bdd.paths(Ref::ONE).collect::<Vec<_>>(), vec![Vec::new()]);
        assert_eq!(bdd.paths(Ref::ZERO).count(), 0);
    }

    #[test]
    fn test_single_variable() {
        let mut bdd = BddManager::new();
        let x = bdd.mk_var(0);
        let paths: Vec<_> = bdd.paths(x).collect();
        assert_eq!(paths, vec![vec![(0, true)]]);
    }

    #[test]
    fn test_xor_has_two_paths() {
        let mut bdd = BddManager::new();
        let x = bdd.mk_var(0);
        let y = bdd.mk_var(1);
        let f = bdd.apply_xor(x, y);
        let mut paths: Vec<_> = bdd.paths(f).collect();
        paths.sort();
        assert_eq!(paths, vec![vec![(0, false), (1, true)], vec![(0, true), (1, false)]]);
    }

    #[test]
    fn test_skipped_levels_stay_free() {
        let mut bdd = BddManager::new();
        let x = bdd.mk_var(0);
        let z = bdd.mk_var(2);
        let f = bdd.apply_and(x, z);
        let paths: Vec<_> = bdd.paths(f).collect();
        // Level 1 never appears: it is free on the only path.
        assert_eq!(paths, vec![vec![(0, true), (2, true)]]);
    }
}
