//! # boolex-rs: propositional boolean formulas in Rust
//!
//! **`boolex-rs`** parses, rewrites, evaluates and minimizes propositional
//! boolean formulas over named variables, and answers semantic questions
//! (tautology, contradiction, satisfiability, equivalence) through
//! **Reduced Ordered Binary Decision Diagrams (ROBDDs)**.
//!
//! ## What is a BDD?
//!
//! A binary decision diagram represents a boolean function as a directed
//! acyclic graph. It is **canonical**: for a fixed variable ordering, every
//! function has exactly one reduced diagram, so equivalence and validity
//! checks become handle comparisons.
//!
//! ## Key Features
//!
//! - **Rich operator alphabet**: `&`, `|`, `~`, `^`, `=>`, `<=>`, `!&`,
//!   `!|` plus word and Unicode synonyms (`AND`, `∧`, `→`, `¬`, ...), all
//!   driven by one extensible operator registry.
//! - **Two parser strategies**: shunting-yard and Pratt, sharing the
//!   tokenizer, the validator and the registry, producing identical trees.
//! - **Rewriters**: a normalizer (constant folding, double negation, De
//!   Morgan push-down), a canonicalizer for commutative operands, and an
//!   expander.
//! - **Manager-centric BDD engine**: bucket-chained unique-table,
//!   direct-mapped apply-cache, Bryant's `apply`, dynamic reordering by
//!   Rudell's sifting, model counting and satisfying-path enumeration.
//! - **Two evaluation paths**: a tree-walk interpreter and a compiled
//!   closure tree with configurable short-circuiting, cached process-wide.
//!
//! ## Basic Usage
//!
//! ```rust
//! use boolex_rs::Expression;
//!
//! let e = Expression::parse("(A & B) | ~C").unwrap();
//!
//! // Inputs follow the alphabetical ordering A, B, C.
//! assert_eq!(e.evaluate(&[false, true, false]), Ok(true));
//!
//! assert!(!e.is_tautology());
//! assert!(e.is_satisfiable());
//! assert!(Expression::parse("A | ~A").unwrap().is_tautology());
//!
//! // Minimization goes through the BDD and back.
//! let m = Expression::parse("(A & B) | (A & ~B)").unwrap().minimize();
//! assert!(m.equivalent_to(&Expression::parse("A").unwrap()));
//! ```
//!
//! ## Core Components
//!
//! - [`expr`]: the user-facing [`Expression`] wrapper.
//! - [`parse`]: the parsing pipeline and strategy selection.
//! - [`bdd`]: the [`BddManager`][crate::bdd::BddManager] and core
//!   algorithms.
//! - [`order`]: variable-ordering strategies, including the parallel
//!   `Auto` race.

pub mod ast;
pub mod bdd;
pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod eval;
pub mod expr;
pub mod lexer;
pub mod node;
pub mod order;
pub mod parse;
pub mod paths;
pub mod pratt;
pub mod registry;
pub mod reorder;
pub mod rewrite;
pub mod sat;
pub mod shunting;
pub mod storage;
pub mod token;
pub mod utils;
pub mod validate;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use bdd::BddManager;
pub use config::{configure, settings, Settings};
pub use error::{ErrorCode, EvalError, OrderError, ParseError};
pub use expr::Expression;
pub use node::Ref;
pub use parse::{parse, try_parse, ParserStrategy};
pub use reorder::ReorderStats;
