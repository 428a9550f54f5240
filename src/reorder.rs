//! Dynamic variable reordering: adjacent level swap and Rudell's sifting.
//!
//! The size of a BDD is highly sensitive to its variable order; for some
//! functions the gap between a good and a bad order is linear versus
//! exponential. Finding the optimum is NP-complete, so sifting improves the
//! order greedily: each variable slides across every level while the node
//! count is tracked, then settles at its best position. The primitive move
//! is the adjacent swap, a memoized functional transform that produces a
//! new root over the permuted levels and leaves all other levels intact.
//!
//! References: R. Rudell, "Dynamic variable ordering for ordered binary
//! decision diagrams", ICCAD 1993.

use hashbrown::HashMap;
use log::debug;

use crate::bdd::BddManager;
use crate::node::Ref;

/// Statistics of one sifting run.
#[derive(Debug, Clone, Default)]
pub struct ReorderStats {
    /// Number of adjacent swaps performed.
    pub swaps: usize,
    /// Node count before reordering.
    pub initial_size: usize,
    /// Node count after reordering.
    pub final_size: usize,
    /// Number of sifting passes over all variables.
    pub passes: usize,
}

impl ReorderStats {
    /// Fractional size reduction achieved, in `0..=1`.
    pub fn reduction_ratio(&self) -> f64 {
        if self.initial_size == 0 {
            return 0.0;
        }
        1.0 - (self.final_size as f64 / self.initial_size as f64)
    }
}

/// Outcome of sifting: the transformed root and the level permutation,
/// `level_to_origin[level]` naming the original level of the variable now
/// sitting at `level`.
pub struct SiftResult {
    pub root: Ref,
    pub level_to_origin: Vec<usize>,
    pub stats: ReorderStats,
}

impl BddManager {
    /// Swap the variables at `level` and `level + 1`, returning the root of
    /// the transformed diagram.
    ///
    /// A node at `level` regroups its four grandchild cofactors so the
    /// deeper variable is tested first; a node at `level + 1` reached
    /// without passing `level` is relabeled; everything below is shared
    /// unchanged. The recursion is memoized per call so sharing in the
    /// input survives in the output.
    pub fn swap_levels(&mut self, root: Ref, level: u32) -> Ref {
        let mut memo = HashMap::new();
        let result = self.swap_rec(root, level, &mut memo);
        debug!("swap_levels(root = {}, level = {}) -> {}", root, level, result);
        result
    }

    fn swap_rec(&mut self, node: Ref, level: u32, memo: &mut HashMap<Ref, Ref>) -> Ref {
        if node.is_terminal() || self.level(node) > level + 1 {
            return node;
        }
        if let Some(&cached) = memo.get(&node) {
            return cached;
        }

        let node_level = self.level(node);
        let result = if node_level < level {
            let low = self.swap_rec(self.low(node), level, memo);
            let high = self.swap_rec(self.high(node), level, memo);
            self.mk_node(node_level, low, high)
        } else if node_level == level {
            let (f00, f01) = self.cofactors(self.low(node), level + 1);
            let (f10, f11) = self.cofactors(self.high(node), level + 1);
            let new_low = self.mk_node(level + 1, f00, f10);
            let new_high = self.mk_node(level + 1, f01, f11);
            self.mk_node(level, new_low, new_high)
        } else {
            // Reached without an ancestor at `level`: the variable moves up
            // one level with its structure intact.
            self.mk_node(level, self.low(node), self.high(node))
        };

        memo.insert(node, result);
        result
    }

    /// Sift every variable to its locally optimal level, repeating full
    /// passes until one yields no improvement. The resulting diagram is
    /// never larger than the input.
    pub fn sift(&mut self, root: Ref, num_levels: usize) -> SiftResult {
        let initial_size = self.size(root);
        let mut stats = ReorderStats {
            initial_size,
            final_size: initial_size,
            ..ReorderStats::default()
        };
        let mut level_to_origin: Vec<usize> = (0..num_levels).collect();
        let mut root = root;

        if num_levels < 2 {
            return SiftResult {
                root,
                level_to_origin,
                stats,
            };
        }

        loop {
            stats.passes += 1;
            let pass_start_size = self.size(root);

            // Most-used variables first: moving them has the largest effect.
            let order = self.origins_by_usage(root, &level_to_origin);
            for origin in order {
                let Some(mut level) = level_to_origin.iter().position(|&o| o == origin) else {
                    continue;
                };

                let mut best_level = level;
                let mut best_size = self.size(root);

                // Slide down to the bottom...
                while level + 1 < num_levels {
                    root = self.swap_levels(root, level as u32);
                    level_to_origin.swap(level, level + 1);
                    level += 1;
                    stats.swaps += 1;
                    let size = self.size(root);
                    if size < best_size {
                        best_size = size;
                        best_level = level;
                    }
                }
                // ...then up to the top, scanning the remaining positions.
                while level > 0 {
                    root = self.swap_levels(root, level as u32 - 1);
                    level_to_origin.swap(level - 1, level);
                    level -= 1;
                    stats.swaps += 1;
                    let size = self.size(root);
                    if size < best_size {
                        best_size = size;
                        best_level = level;
                    }
                }
                // Settle at the best position seen.
                while level < best_level {
                    root = self.swap_levels(root, level as u32);
                    level_to_origin.swap(level, level + 1);
                    level += 1;
                    stats.swaps += 1;
                }
                debug!(
                    "sift: variable from level {} settled at level {} (size {})",
                    origin, best_level, best_size
                );
            }

            let pass_end_size = self.size(root);
            if pass_end_size >= pass_start_size {
                break;
            }
        }

        stats.final_size = self.size(root);
        debug!(
            "sift: {} -> {} nodes in {} passes, {} swaps",
            stats.initial_size, stats.final_size, stats.passes, stats.swaps
        );
        SiftResult {
            root,
            level_to_origin,
            stats,
        }
    }

    /// Original levels ordered by how many nodes currently test them,
    /// descending.
    fn origins_by_usage(&self, root: Ref, level_to_origin: &[usize]) -> Vec<usize> {
        let mut counts: HashMap<u32, usize> = HashMap::new();
        let mut visited = hashbrown::HashSet::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_terminal() || !visited.insert(node) {
                continue;
            }
            *counts.entry(self.level(node)).or_insert(0) += 1;
            stack.push(self.low(node));
            stack.push(self.high(node));
        }

        let mut origins: Vec<(usize, usize)> = level_to_origin
            .iter()
            .enumerate()
            .map(|(level, &origin)| (origin, counts.get(&(level as u32)).copied().unwrap_or(0)))
            .collect();
        origins.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        origins.into_iter().map(|(origin, _)| origin).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    /// Exhaustively compare two roots over `n` variables, mapping inputs of
    /// `b` through the permutation (input for `a`'s level `l` feeds `b`'s
    /// level `perm[l]`).
    fn equivalent_under(bdd: &BddManager, a: Ref, b: Ref, n: usize, perm: &[usize]) -> bool {
        for bits in 0..(1u32 << n) {
            let inputs_a: Vec<bool> = (0..n).map(|i| bits & (1 << i) != 0).collect();
            let mut inputs_b = vec![false; n];
            for (level, &origin) in perm.iter().enumerate() {
                inputs_b[level] = inputs_a[origin];
            }
            if bdd.eval(a, &inputs_a) != bdd.eval(b, &inputs_b) {
                return false;
            }
        }
        true
    }

    #[test]
    fn test_swap_preserves_function() {
        let mut bdd = BddManager::new();
        let x = bdd.mk_var(0);
        let y = bdd.mk_var(1);
        let f = bdd.apply_and(x, y);

        let swapped = bdd.swap_levels(f, 0);
        // Variable 1 now sits at level 0 and vice versa.
        assert!(equivalent_under(&bdd, f, swapped, 2, &[1, 0]));
        assert_eq!(bdd.size(f), bdd.size(swapped));
    }

    #[test]
    fn test_swap_below_root() {
        let mut bdd = BddManager::new();
        let x = bdd.mk_var(0);
        let y = bdd.mk_var(1);
        let z = bdd.mk_var(2);
        let yz = bdd.apply_xor(y, z);
        let f = bdd.apply_and(x, yz);

        let swapped = bdd.swap_levels(f, 1);
        assert!(equivalent_under(&bdd, f, swapped, 3, &[0, 2, 1]));
    }

    #[test]
    fn test_swap_relabels_skipped_level() {
        let mut bdd = BddManager::new();
        // Function of level 1 only: swapping levels 0/1 moves it to level 0.
        let y = bdd.mk_var(1);
        let swapped = bdd.swap_levels(y, 0);
        assert_eq!(bdd.level(swapped), 0);
        assert_eq!(bdd.low(swapped), Ref::ZERO);
        assert_eq!(bdd.high(swapped), Ref::ONE);
    }

    #[test]
    fn test_swap_twice_is_identity() {
        let mut bdd = BddManager::new();
        let x = bdd.mk_var(0);
        let y = bdd.mk_var(1);
        let z = bdd.mk_var(2);
        let xy = bdd.apply_or(x, y);
        let f = bdd.apply_xor(xy, z);

        let once = bdd.swap_levels(f, 1);
        let twice = bdd.swap_levels(once, 1);
        assert_eq!(f, twice);
    }

    #[test]
    fn test_sift_never_increases_size() {
        let mut bdd = BddManager::new();
        // (x0 & x2) | (x1 & x3): interleaved order is suboptimal.
        let x0 = bdd.mk_var(0);
        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);
        let a = bdd.apply_and(x0, x2);
        let b = bdd.apply_and(x1, x3);
        let f = bdd.apply_or(a, b);

        let before = bdd.size(f);
        let result = bdd.sift(f, 4);
        assert!(result.stats.final_size <= before);
        assert_eq!(result.stats.final_size, bdd.size(result.root));
        assert!(equivalent_under(&bdd, f, result.root, 4, &result.level_to_origin));
    }

    #[test]
    fn test_sift_improves_disjoint_pairs() {
        let mut bdd = BddManager::new();
        // (x0 & x2) | (x1 & x3) needs crossing structure under the given
        // order; pairing the conjuncts shrinks it.
        let x0 = bdd.mk_var(0);
        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);
        let a = bdd.apply_and(x0, x2);
        let b = bdd.apply_and(x1, x3);
        let f = bdd.apply_or(a, b);

        let before = bdd.size(f);
        let result = bdd.sift(f, 4);
        assert!(
            result.stats.final_size < before,
            "expected improvement from {before} nodes, got {}",
            result.stats.final_size
        );
    }

    #[test]
    fn test_sift_handles_terminal_and_single_level() {
        let mut bdd = BddManager::new();
        let result = bdd.sift(Ref::ONE, 0);
        assert_eq!(result.root, Ref::ONE);

        let x = bdd.mk_var(0);
        let result = bdd.sift(x, 1);
        assert_eq!(result.root, x);
        assert_eq!(result.level_to_origin, vec![0]);
    }

    #[test]
    fn test_stats_reduction_ratio() {
        let stats = ReorderStats {
            swaps: 12,
            initial_size: 10,
            final_size: 5,
            passes: 2,
        };
        assert!((stats.reduction_ratio() - 0.5).abs() < 1e-12);
    }
}
