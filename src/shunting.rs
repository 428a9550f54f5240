//! Shunting-yard parsing: infix tokens to postfix, postfix to AST.
//!
//! Dijkstra's algorithm with the registry's precedence table. The postfix
//! builder pops operands per registered arity and applies the registered
//! node factory, so custom operators parse without touching this module.

use crate::ast::Expr;
use crate::error::{ErrorCode, ParseError};
use crate::registry::OperatorRegistry;
use crate::token::{Token, TokenKind};

/// Parse a validated token stream into an AST.
pub fn parse(tokens: &[Token], registry: &OperatorRegistry, source: &str) -> Result<Expr, ParseError> {
    let postfix = to_postfix(tokens, registry, source)?;
    build_ast(&postfix, registry, source)
}

/// Rearrange infix tokens into postfix order.
fn to_postfix<'t>(
    tokens: &'t [Token],
    registry: &OperatorRegistry,
    source: &str,
) -> Result<Vec<&'t Token>, ParseError> {
    let mut output: Vec<&Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<&Token> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Identifier | TokenKind::Constant => output.push(token),
            TokenKind::LeftParen => stack.push(token),
            TokenKind::RightParen => {
                loop {
                    match stack.pop() {
                        Some(top) if top.kind == TokenKind::LeftParen => break,
                        Some(top) => output.push(top),
                        None => {
                            return Err(ParseError::new(
                                ErrorCode::UnmatchedClosingParenthesis,
                                token.index,
                                source,
                            )
                            .with_token(0, &token.lexeme, token.kind.category()));
                        }
                    }
                }
            }
            TokenKind::Operator => {
                let prec = precedence_of(token, registry, source)?;
                let right_assoc = registry.is_right_associative(&token.lexeme);
                while let Some(top) = stack.last() {
                    if top.kind != TokenKind::Operator {
                        break;
                    }
                    let top_prec = precedence_of(top, registry, source)?;
                    if top_prec > prec || (top_prec == prec && !right_assoc) {
                        output.push(stack.pop().expect("stack top just observed"));
                    } else {
                        break;
                    }
                }
                stack.push(token);
            }
        }
    }

    while let Some(top) = stack.pop() {
        if top.kind == TokenKind::LeftParen {
            return Err(ParseError::new(ErrorCode::UnmatchedParentheses, top.index, source)
                .with_token(0, &top.lexeme, top.kind.category()));
        }
        output.push(top);
    }

    Ok(output)
}

/// Reduce a postfix stream to a single tree, applying registry factories.
fn build_ast(postfix: &[&Token], registry: &OperatorRegistry, source: &str) -> Result<Expr, ParseError> {
    let mut operands: Vec<Expr> = Vec::new();

    for token in postfix {
        match token.kind {
            TokenKind::Constant => operands.push(Expr::Const(token.lexeme == "1")),
            TokenKind::Identifier => operands.push(Expr::var(token.lexeme.clone())),
            TokenKind::Operator => {
                if let Some(factory) = registry.unary_factory(&token.lexeme) {
                    let operand = operands.pop().ok_or_else(|| sequence_fault(token, source))?;
                    operands.push(factory(operand));
                } else if let Some(factory) = registry.binary_factory(&token.lexeme) {
                    let rhs = operands.pop().ok_or_else(|| sequence_fault(token, source))?;
                    let lhs = operands.pop().ok_or_else(|| sequence_fault(token, source))?;
                    operands.push(factory(lhs, rhs));
                } else {
                    return Err(sequence_fault(token, source));
                }
            }
            TokenKind::LeftParen | TokenKind::RightParen => {
                return Err(sequence_fault(token, source));
            }
        }
    }

    match (operands.pop(), operands.is_empty()) {
        (Some(ast), true) => Ok(ast),
        _ => Err(ParseError::new(ErrorCode::InvalidTokenSequence, 0, source)),
    }
}

fn precedence_of(token: &Token, registry: &OperatorRegistry, source: &str) -> Result<u8, ParseError> {
    registry
        .precedence(&token.lexeme)
        .ok_or_else(|| sequence_fault(token, source))
}

fn sequence_fault(token: &Token, source: &str) -> ParseError {
    ParseError::new(ErrorCode::InvalidTokenSequence, token.index, source).with_token(
        0,
        &token.lexeme,
        token.kind.category(),
    )
}
