//! Tree rewriters: normalizer, canonicalizer, expander and variable indexer.
//!
//! All rewriters consume a tree and return a new one; the input is never
//! mutated. The normalizer is idempotent. The canonicalizer orders
//! commutative operands by their canonical string, which makes the printed
//! form of a canonicalized tree a stable equality key for caches.

use std::collections::HashMap;

use itertools::Itertools;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::OrderError;

/// Bottom-up normalization: constant folding, double-negation elimination,
/// De Morgan push-down over `&`/`|`, identity and annihilator laws.
pub fn normalize(expr: Expr) -> Expr {
    match expr {
        Expr::Const(_) | Expr::Var { .. } => expr,
        Expr::Unary {
            op: UnaryOp::Not,
            operand,
        } => normalize_not(normalize(*operand)),
        Expr::Binary { op, lhs, rhs } => fold_binary(op, normalize(*lhs), normalize(*rhs)),
    }
}

/// Negation over an already-normalized operand.
fn normalize_not(operand: Expr) -> Expr {
    match operand {
        Expr::Const(value) => Expr::Const(!value),
        Expr::Unary {
            op: UnaryOp::Not,
            operand: inner,
        } => *inner,
        Expr::Binary {
            op: BinaryOp::And,
            lhs,
            rhs,
        } => Expr::or(normalize_not(*lhs), normalize_not(*rhs)),
        Expr::Binary {
            op: BinaryOp::Or,
            lhs,
            rhs,
        } => Expr::and(normalize_not(*lhs), normalize_not(*rhs)),
        other => Expr::not(other),
    }
}

/// Folding over already-normalized operands.
fn fold_binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    if let (Expr::Const(a), Expr::Const(b)) = (&lhs, &rhs) {
        return Expr::Const(op.apply(*a, *b));
    }
    match (op, &lhs, &rhs) {
        (BinaryOp::And, Expr::Const(true), _) => rhs,
        (BinaryOp::And, _, Expr::Const(true)) => lhs,
        (BinaryOp::And, Expr::Const(false), _) | (BinaryOp::And, _, Expr::Const(false)) => Expr::Const(false),
        (BinaryOp::Or, Expr::Const(false), _) => rhs,
        (BinaryOp::Or, _, Expr::Const(false)) => lhs,
        (BinaryOp::Or, Expr::Const(true), _) | (BinaryOp::Or, _, Expr::Const(true)) => Expr::Const(true),
        _ => Expr::binary(op, lhs, rhs),
    }
}

/// Reorder commutative operands into a canonical shape.
///
/// Associative commutative operators (`&`, `|`, `^`, `<=>`) are flattened
/// into an operand list, deduplicated by canonical-string key (`^`/`<=>`
/// cancel pairwise), sorted and rebuilt left-leaning. `!&`/`!|` only get
/// their two operands order-normalized.
pub fn canonicalize(expr: Expr) -> Expr {
    match expr {
        Expr::Const(_) | Expr::Var { .. } => expr,
        Expr::Unary {
            op: UnaryOp::Not,
            operand,
        } => Expr::not(canonicalize(*operand)),
        Expr::Binary { op, lhs, rhs } if op.is_associative() => {
            let mut operands = Vec::new();
            flatten_into(op, *lhs, &mut operands);
            flatten_into(op, *rhs, &mut operands);

            let mut counts: Vec<(String, Expr, usize)> = Vec::new();
            for operand in operands {
                let key = operand.to_string();
                match counts.iter_mut().find(|(k, _, _)| *k == key) {
                    Some((_, _, n)) => *n += 1,
                    None => counts.push((key, operand, 1)),
                }
            }

            let parity_matters = matches!(op, BinaryOp::Xor | BinaryOp::Iff);
            let kept: Vec<(String, Expr)> = counts
                .into_iter()
                .filter(|(_, _, n)| !parity_matters || n % 2 == 1)
                .map(|(key, operand, _)| (key, operand))
                .sorted_by(|a, b| a.0.cmp(&b.0))
                .collect();

            match kept.len() {
                0 => Expr::Const(op.neutral()),
                _ => kept
                    .into_iter()
                    .map(|(_, operand)| operand)
                    .reduce(|acc, operand| Expr::binary(op, acc, operand))
                    .expect("non-empty operand list"),
            }
        }
        Expr::Binary { op, lhs, rhs } if op.is_commutative() => {
            let lhs = canonicalize(*lhs);
            let rhs = canonicalize(*rhs);
            if lhs.to_string() <= rhs.to_string() {
                Expr::binary(op, lhs, rhs)
            } else {
                Expr::binary(op, rhs, lhs)
            }
        }
        Expr::Binary { op, lhs, rhs } => Expr::binary(op, canonicalize(*lhs), canonicalize(*rhs)),
    }
}

fn flatten_into(op: BinaryOp, expr: Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Binary {
            op: child_op,
            lhs,
            rhs,
        } if child_op == op => {
            flatten_into(op, *lhs, out);
            flatten_into(op, *rhs, out);
        }
        other => out.push(canonicalize(other)),
    }
}

/// Canonical serialization: stable under commutative reordering, used as an
/// equality key by the caches.
pub fn canonical_string(expr: &Expr) -> String {
    canonicalize(normalize(expr.clone())).to_string()
}

/// One-step expansion laws: De Morgan over negated `&`/`|` children and
/// distribution of `&` over `|`, iterated to a fixpoint.
pub fn expand(expr: Expr) -> Expr {
    let mut current = expr;
    loop {
        let (next, changed) = expand_step(current);
        current = next;
        if !changed {
            return current;
        }
    }
}

fn expand_step(expr: Expr) -> (Expr, bool) {
    match expr {
        Expr::Const(_) | Expr::Var { .. } => (expr, false),
        Expr::Unary {
            op: UnaryOp::Not,
            operand,
        } => match *operand {
            Expr::Binary {
                op: BinaryOp::And,
                lhs,
                rhs,
            } => (Expr::or(Expr::not(*lhs), Expr::not(*rhs)), true),
            Expr::Binary {
                op: BinaryOp::Or,
                lhs,
                rhs,
            } => (Expr::and(Expr::not(*lhs), Expr::not(*rhs)), true),
            inner => {
                let (inner, changed) = expand_step(inner);
                (Expr::not(inner), changed)
            }
        },
        Expr::Binary {
            op: BinaryOp::And,
            lhs,
            rhs,
        } => match (*lhs, *rhs) {
            (
                Expr::Binary {
                    op: BinaryOp::Or,
                    lhs: a,
                    rhs: b,
                },
                c,
            ) => (
                Expr::or(Expr::and(*a, c.clone()), Expr::and(*b, c)),
                true,
            ),
            (
                c,
                Expr::Binary {
                    op: BinaryOp::Or,
                    lhs: a,
                    rhs: b,
                },
            ) => (
                Expr::or(Expr::and(c.clone(), *a), Expr::and(c, *b)),
                true,
            ),
            (lhs, rhs) => {
                let (lhs, changed_l) = expand_step(lhs);
                let (rhs, changed_r) = expand_step(rhs);
                (Expr::and(lhs, rhs), changed_l || changed_r)
            }
        },
        Expr::Binary { op, lhs, rhs } => {
            let (lhs, changed_l) = expand_step(*lhs);
            let (rhs, changed_r) = expand_step(*rhs);
            (Expr::binary(op, lhs, rhs), changed_l || changed_r)
        }
    }
}

/// Rewrite every variable node to carry its index in the given mapping.
pub fn index_variables(expr: &Expr, indices: &HashMap<String, usize>) -> Result<Expr, OrderError> {
    match expr {
        Expr::Const(value) => Ok(Expr::Const(*value)),
        Expr::Var { name, .. } => {
            let index = indices
                .get(name)
                .copied()
                .ok_or_else(|| OrderError::MissingVariable(name.clone()))?;
            Ok(Expr::Var {
                name: name.clone(),
                index: Some(index),
            })
        }
        Expr::Unary { op, operand } => Ok(Expr::Unary {
            op: *op,
            operand: Box::new(index_variables(operand, indices)?),
        }),
        Expr::Binary { op, lhs, rhs } => Ok(Expr::Binary {
            op: *op,
            lhs: Box::new(index_variables(lhs, indices)?),
            rhs: Box::new(index_variables(rhs, indices)?),
        }),
    }
}
