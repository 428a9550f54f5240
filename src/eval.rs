//! Evaluation: the tree-walk interpreter and the compiled closure path.
//!
//! The compiled path translates an indexed AST into a tree of boxed
//! closures reading `input[index]`, with configurable short-circuiting for
//! `&` and `|`. Compilation output is shareable (`Arc`) so the process-wide
//! delegate cache can hand the same compiled function to every caller.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::EvalError;

/// Direct recursive evaluation against an indexed input slice.
pub fn eval_tree(expr: &Expr, inputs: &[bool]) -> Result<bool, EvalError> {
    match expr {
        Expr::Const(value) => Ok(*value),
        Expr::Var { name, index } => {
            let index = index.ok_or_else(|| EvalError::UnindexedVariable(name.clone()))?;
            inputs
                .get(index)
                .copied()
                .ok_or_else(|| EvalError::MissingVariable(name.clone()))
        }
        Expr::Unary { op, operand } => Ok(op.apply(eval_tree(operand, inputs)?)),
        Expr::Binary { op, lhs, rhs } => {
            // The interpreter is the strict path; short-circuiting belongs
            // to the compiled one.
            let lhs = eval_tree(lhs, inputs)?;
            let rhs = eval_tree(rhs, inputs)?;
            Ok(op.apply(lhs, rhs))
        }
    }
}

/// Evaluation against a name-keyed map, the fallback for callers without a
/// fixed ordering.
pub fn eval_tree_named(expr: &Expr, inputs: &HashMap<String, bool>) -> Result<bool, EvalError> {
    match expr {
        Expr::Const(value) => Ok(*value),
        Expr::Var { name, .. } => inputs
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::MissingVariable(name.clone())),
        Expr::Unary { op, operand } => Ok(op.apply(eval_tree_named(operand, inputs)?)),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval_tree_named(lhs, inputs)?;
            let rhs = eval_tree_named(rhs, inputs)?;
            Ok(op.apply(lhs, rhs))
        }
    }
}

type EvalFn = dyn Fn(&[bool]) -> bool + Send + Sync;

/// A compiled evaluator: arity-checked entry over a closure tree.
#[derive(Clone)]
pub struct CompiledEvaluator {
    func: Arc<EvalFn>,
    arity: usize,
}

impl CompiledEvaluator {
    /// Compile an indexed AST for inputs of length `arity`.
    pub fn compile(expr: &Expr, arity: usize, short_circuit: bool) -> Result<Self, EvalError> {
        let func = compile_node(expr, short_circuit)?;
        Ok(CompiledEvaluator {
            func: Arc::from(func),
            arity,
        })
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn eval(&self, inputs: &[bool]) -> Result<bool, EvalError> {
        if inputs.len() != self.arity {
            return Err(EvalError::InputLengthMismatch {
                expected: self.arity,
                actual: inputs.len(),
            });
        }
        Ok((self.func)(inputs))
    }
}

impl std::fmt::Debug for CompiledEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledEvaluator").field("arity", &self.arity).finish()
    }
}

fn compile_node(expr: &Expr, short_circuit: bool) -> Result<Box<EvalFn>, EvalError> {
    Ok(match expr {
        Expr::Const(value) => {
            let value = *value;
            Box::new(move |_| value)
        }
        Expr::Var { name, index } => {
            let index = index.ok_or_else(|| EvalError::UnindexedVariable(name.clone()))?;
            Box::new(move |inputs| inputs[index])
        }
        Expr::Unary {
            op: UnaryOp::Not,
            operand,
        } => {
            let operand = compile_node(operand, short_circuit)?;
            Box::new(move |inputs| !operand(inputs))
        }
        Expr::Binary { op, lhs, rhs } => {
            let lhs = compile_node(lhs, short_circuit)?;
            let rhs = compile_node(rhs, short_circuit)?;
            match (op, short_circuit) {
                (BinaryOp::And, true) => Box::new(move |x| lhs(x) && rhs(x)),
                (BinaryOp::And, false) => Box::new(move |x| lhs(x) & rhs(x)),
                (BinaryOp::Or, true) => Box::new(move |x| lhs(x) || rhs(x)),
                (BinaryOp::Or, false) => Box::new(move |x| lhs(x) | rhs(x)),
                (BinaryOp::Xor, _) => Box::new(move |x| lhs(x) ^ rhs(x)),
                (BinaryOp::Imply, _) => Box::new(move |x| !lhs(x) | rhs(x)),
                (BinaryOp::Iff, _) => Box::new(move |x| lhs(x) == rhs(x)),
                (BinaryOp::Nand, true) => Box::new(move |x| !(lhs(x) && rhs(x))),
                (BinaryOp::Nand, false) => Box::new(move |x| !(lhs(x) & rhs(x))),
                (BinaryOp::Nor, true) => Box::new(move |x| !(lhs(x) || rhs(x))),
                (BinaryOp::Nor, false) => Box::new(move |x| !(lhs(x) | rhs(x))),
            }
        }
    })
}
