//! The user-facing expression wrapper.
//!
//! An `Expression` owns a formula tree and the variable-ordering vector
//! that governs evaluation input layout and BDD construction. Reordering
//! produces a new wrapper; the tree itself is immutable. All semantic
//! queries (tautology, satisfiability, equivalence) go through a private
//! BDD manager built on demand and discarded afterwards.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};

use num_bigint::BigUint;

use crate::ast::Expr;
use crate::bdd::BddManager;
use crate::config;
use crate::error::{EvalError, OrderError, ParseError};
use crate::eval::{eval_tree_named, CompiledEvaluator};
use crate::node::Ref;
use crate::order::{Alphabetical, OrderingStrategy};
use crate::parse;
use crate::rewrite::{canonical_string, index_variables, normalize};

#[derive(Debug, Clone)]
pub struct Expression {
    /// The tree, indexed against `vars`.
    ast: Expr,
    /// The ordering vector; position is both evaluation input offset and
    /// BDD level.
    vars: Vec<String>,
}

impl Expression {
    /// Parse with the process-wide settings; the result is normalized and
    /// ordered alphabetically.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Ok(Self::new(parse::parse(input)?))
    }

    /// Like [`Expression::parse`], but any fault is reported as the
    /// catch-all sequence error with the original attached.
    pub fn try_parse(input: &str) -> Result<Self, ParseError> {
        Ok(Self::new(parse::try_parse(input)?))
    }

    /// Wrap a tree under the default alphabetical ordering.
    pub fn new(ast: Expr) -> Self {
        Self::with_strategy(ast, &Alphabetical)
    }

    /// Wrap a tree, ordering its variables with the given strategy.
    pub fn with_strategy(ast: Expr, strategy: &dyn OrderingStrategy) -> Self {
        let current = ast.variables();
        let vars = strategy.order(&ast, &current);
        Self::indexed(ast, vars)
    }

    fn indexed(ast: Expr, vars: Vec<String>) -> Self {
        let indices: HashMap<String, usize> = vars.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();
        let ast = index_variables(&ast, &indices).expect("ordering must cover every variable of the tree");
        Expression { ast, vars }
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// The ordering vector: position is evaluation input offset.
    pub fn variables(&self) -> &[String] {
        &self.vars
    }

    /// Re-wrap under an explicit ordering. The ordering must be a
    /// permutation of the current variables: duplicates, names foreign to
    /// the expression, and missing originals are all rejected.
    pub fn with_variable_order(&self, vars: &[String]) -> Result<Self, OrderError> {
        let mut seen = HashSet::new();
        for name in vars {
            if !seen.insert(name.as_str()) {
                return Err(OrderError::DuplicateVariable(name.clone()));
            }
            if !self.vars.iter().any(|n| n == name) {
                return Err(OrderError::UnknownVariable(name.clone()));
            }
        }
        for original in &self.vars {
            if !seen.contains(original.as_str()) {
                return Err(OrderError::MissingVariable(original.clone()));
            }
        }
        Ok(Self::indexed(self.ast.clone(), vars.to_vec()))
    }

    /// Evaluate against a positional input vector (compiled path, cached
    /// process-wide).
    pub fn evaluate(&self, inputs: &[bool]) -> Result<bool, EvalError> {
        if inputs.len() != self.vars.len() {
            return Err(EvalError::InputLengthMismatch {
                expected: self.vars.len(),
                actual: inputs.len(),
            });
        }
        self.compiled()?.eval(inputs)
    }

    /// Evaluate against a name-keyed map (tree-walk path).
    pub fn evaluate_named(&self, inputs: &HashMap<String, bool>) -> Result<bool, EvalError> {
        eval_tree_named(&self.ast, inputs)
    }

    fn compiled(&self) -> Result<CompiledEvaluator, EvalError> {
        let settings = config::settings();
        let key = (
            settings.use_short_circuiting,
            canonical_string(&self.ast),
            self.vars.clone(),
        );
        if let Some(cached) = config::delegate_cache_get(&key) {
            return Ok(cached);
        }
        let compiled = CompiledEvaluator::compile(&self.ast, self.vars.len(), settings.use_short_circuiting)?;
        config::delegate_cache_put(key, compiled.clone(), &settings);
        Ok(compiled)
    }

    /// Apply the normalizer, keeping the ordering vector.
    pub fn normalize(&self) -> Self {
        Self::indexed(normalize(self.ast.clone()), self.vars.clone())
    }

    /// Minimize through the BDD: build, convert back, normalize. The
    /// ordering vector is kept even when minimization eliminates variables.
    pub fn minimize(&self) -> Self {
        let (bdd, root) = self.build_bdd();
        let expr = bdd.to_expr(root, &self.vars);
        Self::indexed(normalize(expr), self.vars.clone())
    }

    /// Disjunctive normal form derived from the BDD cover.
    pub fn to_dnf(&self) -> Self {
        let (bdd, root) = self.build_bdd();
        let expr = bdd.to_dnf_expr(root, &self.vars);
        Self::indexed(normalize(expr), self.vars.clone())
    }

    /// Conjunctive normal form derived from the BDD cover.
    pub fn to_cnf(&self) -> Self {
        let (mut bdd, root) = self.build_bdd();
        let expr = bdd.to_cnf_expr(root, &self.vars);
        Self::indexed(normalize(expr), self.vars.clone())
    }

    pub fn is_tautology(&self) -> bool {
        let (bdd, root) = self.build_bdd();
        bdd.is_one(root)
    }

    pub fn is_contradiction(&self) -> bool {
        let (bdd, root) = self.build_bdd();
        bdd.is_zero(root)
    }

    pub fn is_satisfiable(&self) -> bool {
        let (bdd, root) = self.build_bdd();
        !bdd.is_zero(root)
    }

    /// Semantic equivalence: both trees are rebuilt over the union of the
    /// two ordering vectors in one shared manager; by canonicity they are
    /// equivalent exactly when they come out as the same handle.
    pub fn equivalent_to(&self, other: &Expression) -> bool {
        let mut union = self.vars.clone();
        for name in &other.vars {
            if !union.iter().any(|n| n == name) {
                union.push(name.clone());
            }
        }
        let indices: HashMap<String, usize> = union.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();

        let mut bdd = BddManager::new();
        let lhs_ast = index_variables(&self.ast, &indices).expect("union ordering covers both trees");
        let rhs_ast = index_variables(&other.ast, &indices).expect("union ordering covers both trees");
        let lhs = bdd.build(&lhs_ast).expect("indexed tree builds");
        let rhs = bdd.build(&rhs_ast).expect("indexed tree builds");
        lhs == rhs
    }

    /// Direct structural comparison of the trees, indices included.
    pub fn structural_eq(&self, other: &Expression) -> bool {
        self.ast == other.ast
    }

    /// Exact number of satisfying assignments over this ordering vector.
    pub fn sat_count(&self) -> BigUint {
        let (bdd, root) = self.build_bdd();
        bdd.sat_count(root, self.vars.len())
    }

    /// One satisfying assignment as name/value pairs, `None` for the
    /// contradiction. Variables free in the witness are omitted.
    pub fn one_sat(&self) -> Option<Vec<(String, bool)>> {
        let (bdd, root) = self.build_bdd();
        let path = bdd.one_sat(root)?;
        Some(
            path.into_iter()
                .map(|(level, value)| (self.vars[level as usize].clone(), value))
                .collect(),
        )
    }

    fn build_bdd(&self) -> (BddManager, Ref) {
        let mut bdd = BddManager::new();
        let root = bdd.build(&self.ast).expect("expression trees are indexed on construction");
        (bdd, root)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ast)
    }
}
