//! The parsing pipeline: tokenize, validate, parse, normalize, cache.
//!
//! Both strategies share the token stream, the validator and the operator
//! registry, and are required to produce identical trees. Results are
//! memoized in the process-wide AST cache keyed by strategy, normalization
//! flag and the serialized token stream, so textual variants of the same
//! stream (`A && B`, `A AND B`) share one entry.

use crate::ast::Expr;
use crate::config::{self, Settings};
use crate::error::ParseError;
use crate::lexer::Tokenizer;
use crate::registry::{self, OperatorRegistry};
use crate::rewrite::normalize;
use crate::token;
use crate::validate;
use crate::{pratt, shunting};

/// Parser algorithm selector.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ParserStrategy {
    ShuntingYard,
    Pratt,
}

/// Parse with the process-wide settings and registry.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let settings = config::settings();
    let reg = registry::global();
    parse_with(input, &settings, &reg)
}

/// Parse under explicit settings and registry.
pub fn parse_with(input: &str, settings: &Settings, reg: &OperatorRegistry) -> Result<Expr, ParseError> {
    let tokens = Tokenizer::new(reg)
        .normalize_unicode(settings.enable_unicode_normalization)
        .enable_suggestions(settings.enable_alias_suggestions)
        .tokenize(input)?;

    let cache_key = format!(
        "{:?}|{}|{}",
        settings.strategy,
        settings.enable_unicode_normalization,
        token::serialize(&tokens)
    );
    if let Some(cached) = config::ast_cache_get(&cache_key, settings) {
        return Ok(cached);
    }

    validate::validate(&tokens, reg, input)?;

    let ast = match settings.strategy {
        ParserStrategy::ShuntingYard => shunting::parse(&tokens, reg, input)?,
        ParserStrategy::Pratt => pratt::parse(&tokens, reg, input)?,
    };
    let ast = normalize(ast);

    config::ast_cache_put(cache_key, ast.clone(), settings);
    Ok(ast)
}

/// Like [`parse`], but any fault is converted into the catch-all
/// [`crate::ErrorCode::InvalidTokenSequence`] with the original error
/// attached as its cause.
pub fn try_parse(input: &str) -> Result<Expr, ParseError> {
    parse(input).map_err(ParseError::into_sequence_fault)
}
