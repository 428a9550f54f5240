//! The BDD manager: unique-table, apply-cache, and Bryant's `apply`.
//!
//! A manager owns every node it ever created; handles from different
//! managers must not be mixed. Reducedness (`low != high`) and ordering
//! (levels strictly increase toward the terminals) are enforced by
//! construction, so two functions are equal exactly when their root handles
//! are equal within one manager.

use log::debug;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::cache::OpCache;
use crate::error::EvalError;
use crate::node::{BddNode, Ref, TERMINAL_LEVEL};
use crate::storage::NodeStore;

/// Binary connectives the apply-cache distinguishes. `Not` shares the table
/// using [`Ref::NONE`] as its right operand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum ApplyOp {
    Not = 0,
    And = 1,
    Or = 2,
    Xor = 3,
    Imply = 4,
}

impl ApplyOp {
    fn combine(self, a: bool, b: bool) -> bool {
        match self {
            ApplyOp::Not => unreachable!("negation has no terminal combinator"),
            ApplyOp::And => a && b,
            ApplyOp::Or => a || b,
            ApplyOp::Xor => a ^ b,
            ApplyOp::Imply => !a || b,
        }
    }
}

pub struct BddManager {
    store: NodeStore,
    apply_cache: OpCache<(u8, Ref, Ref), Ref>,
}

impl BddManager {
    /// Create a manager with `2^bucket_bits` unique-table buckets and
    /// `2^cache_bits` apply-cache slots.
    pub fn with_capacity(bucket_bits: usize, cache_bits: usize) -> Self {
        BddManager {
            store: NodeStore::new(bucket_bits),
            apply_cache: OpCache::new(cache_bits),
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(16, 16)
    }

    pub fn zero(&self) -> Ref {
        Ref::ZERO
    }

    pub fn one(&self) -> Ref {
        Ref::ONE
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == Ref::ZERO
    }

    pub fn is_one(&self, node: Ref) -> bool {
        node == Ref::ONE
    }

    pub fn is_terminal(&self, node: Ref) -> bool {
        node.is_terminal()
    }

    /// Variable level of a node; terminals report [`TERMINAL_LEVEL`], below
    /// every real variable.
    pub fn level(&self, node: Ref) -> u32 {
        self.store.node(node).level
    }

    pub fn low(&self, node: Ref) -> Ref {
        self.store.node(node).low
    }

    pub fn high(&self, node: Ref) -> Ref {
        self.store.node(node).high
    }

    /// Total number of nodes ever allocated, terminals included.
    pub fn num_nodes(&self) -> usize {
        self.store.len()
    }

    pub fn cache_hits(&self) -> usize {
        self.apply_cache.hits()
    }

    pub fn cache_misses(&self) -> usize {
        self.apply_cache.misses()
    }

    /// Find or create the node `(level, low, high)`, collapsing redundant
    /// tests.
    pub fn mk_node(&mut self, level: u32, low: Ref, high: Ref) -> Ref {
        debug_assert_ne!(level, TERMINAL_LEVEL, "terminal level is reserved");
        debug_assert!(self.level(low) > level, "low child must sit below level {level}");
        debug_assert!(self.level(high) > level, "high child must sit below level {level}");

        if low == high {
            return low;
        }
        let node = self.store.put(level, low, high);
        debug!("mk_node(level = {}, low = {}, high = {}) -> {}", level, low, high, node);
        node
    }

    /// The single-variable function for the variable at `level`.
    pub fn mk_var(&mut self, level: u32) -> Ref {
        self.mk_node(level, Ref::ZERO, Ref::ONE)
    }

    /// Cofactors of `node` with respect to the variable at `level`. A node
    /// testing a deeper variable is untouched by the split.
    pub fn cofactors(&self, node: Ref, level: u32) -> (Ref, Ref) {
        if self.level(node) == level {
            (self.low(node), self.high(node))
        } else {
            (node, node)
        }
    }

    /// Negation, as the unary specialization of apply.
    pub fn apply_not(&mut self, node: Ref) -> Ref {
        if node.is_terminal() {
            return if node.terminal_value() { Ref::ZERO } else { Ref::ONE };
        }

        let key = (ApplyOp::Not as u8, node, Ref::NONE);
        if let Some(cached) = self.apply_cache.get(&key) {
            return cached;
        }

        let BddNode { level, low, high, .. } = *self.store.node(node);
        let low = self.apply_not(low);
        let high = self.apply_not(high);
        let result = self.mk_node(level, low, high);

        debug!("apply_not({}) -> {}", node, result);
        self.apply_cache.insert(key, result);
        result
    }

    /// Bryant's apply, generalized over the terminal combinator of `op`.
    pub fn apply(&mut self, op: ApplyOp, u: Ref, v: Ref) -> Ref {
        debug_assert_ne!(op, ApplyOp::Not, "negation goes through apply_not");

        if u.is_terminal() && v.is_terminal() {
            return if op.combine(u.terminal_value(), v.terminal_value()) {
                Ref::ONE
            } else {
                Ref::ZERO
            };
        }

        let key = (op as u8, u, v);
        if let Some(cached) = self.apply_cache.get(&key) {
            return cached;
        }

        // Terminals sit at the reserved bottom level, so the minimum picks
        // whichever operand tests the topmost variable.
        let level = self.level(u).min(self.level(v));
        let (u0, u1) = self.cofactors(u, level);
        let (v0, v1) = self.cofactors(v, level);

        let low = self.apply(op, u0, v0);
        let high = self.apply(op, u1, v1);
        let result = self.mk_node(level, low, high);

        debug!("apply({:?}, {}, {}) -> {}", op, u, v, result);
        self.apply_cache.insert(key, result);
        result
    }

    pub fn apply_and(&mut self, u: Ref, v: Ref) -> Ref {
        self.apply(ApplyOp::And, u, v)
    }

    pub fn apply_or(&mut self, u: Ref, v: Ref) -> Ref {
        self.apply(ApplyOp::Or, u, v)
    }

    pub fn apply_xor(&mut self, u: Ref, v: Ref) -> Ref {
        self.apply(ApplyOp::Xor, u, v)
    }

    pub fn apply_imply(&mut self, u: Ref, v: Ref) -> Ref {
        self.apply(ApplyOp::Imply, u, v)
    }

    /// Build the BDD of an indexed AST. Variable indices select levels, so
    /// the caller's variable-order vector governs the diagram shape.
    pub fn build(&mut self, expr: &Expr) -> Result<Ref, EvalError> {
        match expr {
            Expr::Const(value) => Ok(if *value { Ref::ONE } else { Ref::ZERO }),
            Expr::Var { name, index } => {
                let level = index.ok_or_else(|| EvalError::UnindexedVariable(name.clone()))?;
                Ok(self.mk_var(level as u32))
            }
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => {
                let operand = self.build(operand)?;
                Ok(self.apply_not(operand))
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.build(lhs)?;
                let rhs = self.build(rhs)?;
                Ok(match op {
                    BinaryOp::And => self.apply_and(lhs, rhs),
                    BinaryOp::Or => self.apply_or(lhs, rhs),
                    BinaryOp::Xor => self.apply_xor(lhs, rhs),
                    BinaryOp::Imply => self.apply_imply(lhs, rhs),
                    BinaryOp::Iff => {
                        let xor = self.apply_xor(lhs, rhs);
                        self.apply_not(xor)
                    }
                    BinaryOp::Nand => {
                        let and = self.apply_and(lhs, rhs);
                        self.apply_not(and)
                    }
                    BinaryOp::Nor => {
                        let or = self.apply_or(lhs, rhs);
                        self.apply_not(or)
                    }
                })
            }
        }
    }

    /// Number of distinct non-terminal nodes reachable from `root`.
    pub fn size(&self, root: Ref) -> usize {
        let mut visited = hashbrown::HashSet::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_terminal() || !visited.insert(node) {
                continue;
            }
            stack.push(self.low(node));
            stack.push(self.high(node));
        }
        visited.len()
    }

    /// Evaluate the function under a full assignment, `inputs[level]` giving
    /// the value of the variable at that level.
    pub fn eval(&self, root: Ref, inputs: &[bool]) -> bool {
        let mut node = root;
        while !node.is_terminal() {
            let level = self.level(node) as usize;
            node = if inputs.get(level).copied().unwrap_or(false) {
                self.high(node)
            } else {
                self.low(node)
            };
        }
        node.terminal_value()
    }
}

impl Default for BddManager {
    fn default() -> Self {
        BddManager::new()
    }
}

impl std::fmt::Debug for BddManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BddManager")
            .field("nodes", &self.store.len())
            .field("cache_hits", &self.apply_cache.hits())
            .field("cache_misses", &self.apply_cache.misses())
            .finish()
    }
}
