//! Variable ordering strategies.
//!
//! A strategy maps a formula and its current variable vector to a new
//! vector governing subsequent BDD builds. `Auto` races the cheap
//! heuristics in parallel, one isolated manager per candidate, and keeps
//! the smallest diagram; managers are never shared across threads.

use std::collections::HashMap;

use itertools::Itertools;
use log::debug;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ast::Expr;
use crate::bdd::BddManager;
use crate::rewrite::index_variables;

/// Variable limit up to which `Auto` races candidate orders in parallel.
const AUTO_RACE_LIMIT: usize = 40;
/// Variable limit up to which `Auto` finishes with a sifting pass.
const AUTO_SIFT_LIMIT: usize = 60;

pub trait OrderingStrategy {
    /// Produce a new ordering of `vars` for `expr`. Implementations return
    /// a permutation: same names, possibly different positions.
    fn order(&self, expr: &Expr, vars: &[String]) -> Vec<String>;
}

/// Lexicographic by variable name. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct Alphabetical;

impl OrderingStrategy for Alphabetical {
    fn order(&self, _expr: &Expr, vars: &[String]) -> Vec<String> {
        let mut ordered = vars.to_vec();
        ordered.sort();
        ordered
    }
}

/// Descending by occurrence count in the tree, ties alphabetical.
#[derive(Debug, Default, Clone, Copy)]
pub struct Frequency;

impl OrderingStrategy for Frequency {
    fn order(&self, expr: &Expr, vars: &[String]) -> Vec<String> {
        let counts = expr.variable_counts();
        vars.iter()
            .cloned()
            .sorted_by(|a, b| {
                let ca = counts.get(a).copied().unwrap_or(0);
                let cb = counts.get(b).copied().unwrap_or(0);
                cb.cmp(&ca).then_with(|| a.cmp(b))
            })
            .collect()
    }
}

/// Shuffled order; deterministic when seeded.
#[derive(Debug, Default, Clone, Copy)]
pub struct Random {
    pub seed: Option<u64>,
}

impl Random {
    pub fn seeded(seed: u64) -> Self {
        Random { seed: Some(seed) }
    }
}

impl OrderingStrategy for Random {
    fn order(&self, _expr: &Expr, vars: &[String]) -> Vec<String> {
        let mut ordered = vars.to_vec();
        match self.seed {
            Some(seed) => ordered.shuffle(&mut ChaCha8Rng::seed_from_u64(seed)),
            None => ordered.shuffle(&mut rand::thread_rng()),
        }
        ordered
    }
}

/// Rudell's sifting applied to the BDD built under the current order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sifting;

impl OrderingStrategy for Sifting {
    fn order(&self, expr: &Expr, vars: &[String]) -> Vec<String> {
        if vars.len() < 2 {
            return vars.to_vec();
        }
        let Some(root_and_manager) = build_under(expr, vars) else {
            return vars.to_vec();
        };
        let (mut bdd, root) = root_and_manager;
        let result = bdd.sift(root, vars.len());
        result
            .level_to_origin
            .iter()
            .map(|&origin| vars[origin].clone())
            .collect()
    }
}

/// Race alphabetical, frequency and a seeded shuffle in parallel, keep the
/// smallest diagram, then sift when the variable count permits. Beyond
/// [`AUTO_RACE_LIMIT`] variables only the frequency heuristic runs.
#[derive(Debug, Clone, Copy)]
pub struct Auto {
    pub seed: u64,
}

impl Default for Auto {
    fn default() -> Self {
        Auto { seed: 0x5eed }
    }
}

impl OrderingStrategy for Auto {
    fn order(&self, expr: &Expr, vars: &[String]) -> Vec<String> {
        if vars.len() > AUTO_RACE_LIMIT {
            return Frequency.order(expr, vars);
        }

        let candidates: Vec<Vec<String>> = vec![
            Alphabetical.order(expr, vars),
            Frequency.order(expr, vars),
            Random::seeded(self.seed).order(expr, vars),
        ];

        let sizes: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = candidates
                .iter()
                .map(|candidate| scope.spawn(move || bdd_size_under(expr, candidate)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("ordering candidate thread panicked"))
                .collect()
        });

        let best = sizes
            .iter()
            .enumerate()
            .min_by_key(|(_, size)| **size)
            .map(|(i, _)| i)
            .unwrap_or(0);
        debug!("auto ordering: candidate sizes {:?}, picked #{}", sizes, best);
        let winner = candidates.into_iter().nth(best).expect("candidate index in range");

        if vars.len() <= AUTO_SIFT_LIMIT {
            Sifting.order(expr, &winner)
        } else {
            winner
        }
    }
}

/// Chain of strategies, each consuming the previous result.
pub struct Composite {
    steps: Vec<Box<dyn OrderingStrategy + Send + Sync>>,
}

impl Composite {
    pub fn new(steps: Vec<Box<dyn OrderingStrategy + Send + Sync>>) -> Self {
        Composite { steps }
    }
}

impl OrderingStrategy for Composite {
    fn order(&self, expr: &Expr, vars: &[String]) -> Vec<String> {
        self.steps
            .iter()
            .fold(vars.to_vec(), |current, step| step.order(expr, &current))
    }
}

/// Build `expr` in a fresh manager under the given order. `None` when the
/// expression contains a variable missing from `vars`.
fn build_under(expr: &Expr, vars: &[String]) -> Option<(BddManager, crate::node::Ref)> {
    let indices: HashMap<String, usize> = vars.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();
    let indexed = index_variables(expr, &indices).ok()?;
    let mut bdd = BddManager::new();
    let root = bdd.build(&indexed).ok()?;
    Some((bdd, root))
}

fn bdd_size_under(expr: &Expr, vars: &[String]) -> usize {
    match build_under(expr, vars) {
        Some((bdd, root)) => bdd.size(root),
        None => usize::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn vars_of(expr: &Expr) -> Vec<String> {
        expr.variables()
    }

    fn sample() -> Expr {
        parse::parse("(a & c) | (b & d) | (a & d)").unwrap()
    }

    #[test]
    fn test_alphabetical() {
        let e = parse::parse("zeta & alpha & mid").unwrap();
        let ordered = Alphabetical.order(&e, &vars_of(&e));
        assert_eq!(ordered, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_frequency_with_alphabetical_ties() {
        let e = parse::parse("(b & a) | (b & c) | a | b").unwrap();
        let ordered = Frequency.order(&e, &vars_of(&e));
        // b occurs three times, a twice, c once.
        assert_eq!(ordered, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_random_is_deterministic_when_seeded() {
        let e = sample();
        let vars = vars_of(&e);
        let one = Random::seeded(7).order(&e, &vars);
        let two = Random::seeded(7).order(&e, &vars);
        assert_eq!(one, two);
        let mut sorted = one.clone();
        sorted.sort();
        let mut expected = vars.clone();
        expected.sort();
        assert_eq!(sorted, expected, "shuffle must be a permutation");
    }

    #[test]
    fn test_sifting_returns_permutation() {
        let e = sample();
        let vars = vars_of(&e);
        let ordered = Sifting.order(&e, &vars);
        let mut sorted = ordered.clone();
        sorted.sort();
        let mut expected = vars.clone();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_sifting_never_yields_larger_bdd() {
        let e = parse::parse("(p & r) | (q & s)").unwrap();
        let vars = vars_of(&e);
        let before = bdd_size_under(&e, &vars);
        let after = bdd_size_under(&e, &Sifting.order(&e, &vars));
        assert!(after <= before, "sifting grew the diagram: {before} -> {after}");
    }

    #[test]
    fn test_auto_picks_a_permutation() {
        let e = sample();
        let vars = vars_of(&e);
        let ordered = Auto::default().order(&e, &vars);
        let mut sorted = ordered.clone();
        sorted.sort();
        let mut expected = vars;
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_auto_is_no_worse_than_alphabetical() {
        let e = sample();
        let vars = vars_of(&e);
        let auto_size = bdd_size_under(&e, &Auto::default().order(&e, &vars));
        let alpha_size = bdd_size_under(&e, &Alphabetical.order(&e, &vars));
        assert!(auto_size <= alpha_size);
    }

    #[test]
    fn test_composite_chains() {
        let e = sample();
        let vars = vars_of(&e);
        let composite = Composite::new(vec![Box::new(Random::seeded(3)), Box::new(Alphabetical)]);
        // Whatever the shuffle did, the final step restores alphabetical.
        assert_eq!(composite.order(&e, &vars), Alphabetical.order(&e, &vars));
    }
}
