//! Conversion from a BDD back to a formula tree.
//!
//! Shannon expansion with per-node memoization: `(v, low, high)` becomes
//! `(v & C(high)) | (~v & C(low))`, with the trivial conjuncts and the
//! empty disjunct simplified away on the spot. The DNF and CNF covers are
//! derived from the satisfying and falsifying paths instead, so they come
//! out flat.

use hashbrown::HashMap;

use crate::ast::Expr;
use crate::bdd::BddManager;
use crate::node::Ref;

impl BddManager {
    /// Rebuild a formula tree from `root`; `vars[level]` names the variable
    /// tested at each level.
    pub fn to_expr(&self, root: Ref, vars: &[String]) -> Expr {
        let mut memo: HashMap<Ref, Expr> = HashMap::new();
        self.shannon(root, vars, &mut memo)
    }

    fn shannon(&self, node: Ref, vars: &[String], memo: &mut HashMap<Ref, Expr>) -> Expr {
        if node.is_terminal() {
            return Expr::Const(node.terminal_value());
        }
        if let Some(cached) = memo.get(&node) {
            return cached.clone();
        }

        let level = self.level(node) as usize;
        let var = Expr::var(vars[level].clone());
        let high = self.shannon(self.high(node), vars, memo);
        let low = self.shannon(self.low(node), vars, memo);

        // `v & 1` collapses to `v`, `v & 0` drops the term; dually for the
        // negated branch, and an absent branch disappears from the join.
        let high_term = match high {
            Expr::Const(true) => Some(var.clone()),
            Expr::Const(false) => None,
            other => Some(Expr::and(var.clone(), other)),
        };
        let low_term = match low {
            Expr::Const(true) => Some(Expr::not(var)),
            Expr::Const(false) => None,
            other => Some(Expr::and(Expr::not(var), other)),
        };

        let result = match (high_term, low_term) {
            (Some(h), Some(l)) => Expr::or(h, l),
            (Some(h), None) => h,
            (None, Some(l)) => l,
            (None, None) => Expr::Const(false),
        };

        memo.insert(node, result.clone());
        result
    }

    /// Disjunctive normal form from the satisfying paths of `root`.
    pub fn to_dnf_expr(&self, root: Ref, vars: &[String]) -> Expr {
        if root.is_terminal() {
            return Expr::Const(root.terminal_value());
        }
        let mut terms = Vec::new();
        for path in self.paths(root) {
            let term = path
                .into_iter()
                .map(|(level, value)| literal(&vars[level as usize], value))
                .reduce(Expr::and)
                .unwrap_or(Expr::Const(true));
            terms.push(term);
        }
        terms.into_iter().reduce(Expr::or).unwrap_or(Expr::Const(false))
    }

    /// Conjunctive normal form from the falsifying paths of `root`: each
    /// such path, negated, is one clause.
    pub fn to_cnf_expr(&mut self, root: Ref, vars: &[String]) -> Expr {
        if root.is_terminal() {
            return Expr::Const(root.terminal_value());
        }
        let complement = self.apply_not(root);
        let mut clauses = Vec::new();
        for path in self.paths(complement) {
            let clause = path
                .into_iter()
                .map(|(level, value)| literal(&vars[level as usize], !value))
                .reduce(Expr::or)
                .unwrap_or(Expr::Const(false));
            clauses.push(clause);
        }
        clauses.into_iter().reduce(Expr::and).unwrap_or(Expr::Const(true))
    }
}

fn literal(name: &str, positive: bool) -> Expr {
    if positive {
        Expr::var(name)
    } else {
        Expr::not(Expr::var(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::{index_variables, normalize};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Round-trip check: rebuild the converted tree in a fresh manager and
    /// compare handles against the rebuilt original.
    fn assert_same_function(bdd: &mut BddManager, root: Ref, converted: &Expr, vars: &[String]) {
        let indices: std::collections::HashMap<String, usize> =
            vars.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();
        let indexed = index_variables(converted, &indices).unwrap();
        let rebuilt = bdd.build(&indexed).unwrap();
        assert_eq!(rebuilt, root, "conversion changed the function");
    }

    #[test]
    fn test_terminals_become_constants() {
        let bdd = BddManager::new();
        let vars = names(&[]);
        assert_eq!(bdd.to_expr(Ref::ONE, &vars), Expr::Const(true));
        assert_eq!(bdd.to_expr(Ref::ZERO, &vars), Expr::Const(false));
    }

    #[test]
    fn test_single_variable_round_trip() {
        let mut bdd = BddManager::new();
        let x = bdd.mk_var(0);
        let vars = names(&["x"]);
        let expr = bdd.to_expr(x, &vars);
        assert_eq!(expr.to_string(), "x");

        let not_x = bdd.apply_not(x);
        let expr = bdd.to_expr(not_x, &vars);
        assert_eq!(expr.to_string(), "~x");
    }

    #[test]
    fn test_conjunction_shape() {
        let mut bdd = BddManager::new();
        let x = bdd.mk_var(0);
        let y = bdd.mk_var(1);
        let f = bdd.apply_and(x, y);
        let vars = names(&["x", "y"]);
        let expr = bdd.to_expr(f, &vars);
        assert_eq!(expr.to_string(), "(x & y)");
    }

    #[test]
    fn test_shannon_round_trip() {
        let mut bdd = BddManager::new();
        let x = bdd.mk_var(0);
        let y = bdd.mk_var(1);
        let z = bdd.mk_var(2);
        let xy = bdd.apply_xor(x, y);
        let f = bdd.apply_imply(xy, z);
        let vars = names(&["x", "y", "z"]);
        let expr = bdd.to_expr(f, &vars);
        assert_same_function(&mut bdd, f, &expr, &vars);
    }

    #[test]
    fn test_consensus_cover() {
        let mut bdd = BddManager::new();
        // (x & y) | (x & ~y) collapses to x in the diagram.
        let x = bdd.mk_var(0);
        let y = bdd.mk_var(1);
        let not_y = bdd.apply_not(y);
        let a = bdd.apply_and(x, y);
        let b = bdd.apply_and(x, not_y);
        let f = bdd.apply_or(a, b);
        let expr = bdd.to_expr(f, &names(&["x", "y"]));
        assert_eq!(expr.to_string(), "x");
    }

    #[test]
    fn test_dnf_cover() {
        let mut bdd = BddManager::new();
        let x = bdd.mk_var(0);
        let y = bdd.mk_var(1);
        let f = bdd.apply_xor(x, y);
        let vars = names(&["x", "y"]);
        let dnf = bdd.to_dnf_expr(f, &vars);
        assert_same_function(&mut bdd, f, &dnf, &vars);
        // Terms are conjunctions of literals only.
        assert_eq!(normalize(dnf.clone()), dnf);
    }

    #[test]
    fn test_cnf_cover() {
        let mut bdd = BddManager::new();
        let x = bdd.mk_var(0);
        let y = bdd.mk_var(1);
        let f = bdd.apply_xor(x, y);
        let vars = names(&["x", "y"]);
        let cnf = bdd.to_cnf_expr(f, &vars);
        assert_same_function(&mut bdd, f, &cnf, &vars);
    }

    #[test]
    fn test_covers_of_terminals() {
        let mut bdd = BddManager::new();
        let vars = names(&[]);
        assert_eq!(bdd.to_dnf_expr(Ref::ONE, &vars), Expr::Const(true));
        assert_eq!(bdd.to_dnf_expr(Ref::ZERO, &vars), Expr::Const(false));
        assert_eq!(bdd.to_cnf_expr(Ref::ONE, &vars), Expr::Const(true));
        assert_eq!(bdd.to_cnf_expr(Ref::ZERO, &vars), Expr::Const(false));
    }
}
