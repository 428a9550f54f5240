//! Structural validation of a token stream before parsing.
//!
//! A single left-to-right scan enforces the context rules for parentheses
//! and operators and reports the first violation. Both parser strategies
//! run only on validated streams, which keeps their own error handling to
//! genuine algorithmic faults.

use crate::error::{ErrorCode, ParseError};
use crate::registry::OperatorRegistry;
use crate::token::{Token, TokenKind};

/// Classified role of a token within the context rules.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Role {
    Open,
    Close,
    Unary,
    Binary,
    Operand,
}

fn role(token: &Token, registry: &OperatorRegistry) -> Role {
    match token.kind {
        TokenKind::LeftParen => Role::Open,
        TokenKind::RightParen => Role::Close,
        TokenKind::Identifier | TokenKind::Constant => Role::Operand,
        TokenKind::Operator => {
            if registry.is_unary(&token.lexeme) {
                Role::Unary
            } else {
                Role::Binary
            }
        }
    }
}

/// Check the context rules; return the first violation, if any.
pub fn validate(tokens: &[Token], registry: &OperatorRegistry, source: &str) -> Result<(), ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::new(ErrorCode::EmptyExpression, 0, source));
    }

    let fail = |code: ErrorCode, at: usize| -> ParseError {
        let tok = &tokens[at];
        ParseError::new(code, tok.index, source).with_token(at, &tok.lexeme, tok.kind.category())
    };

    let roles: Vec<Role> = tokens.iter().map(|t| role(t, registry)).collect();
    let mut depth: usize = 0;
    let mut open_stack: Vec<usize> = Vec::new();

    for (i, r) in roles.iter().copied().enumerate() {
        let prev = if i > 0 { Some(roles[i - 1]) } else { None };
        let next = roles.get(i + 1).copied();

        match r {
            // An invalid token before `(` is reported by the arm of that
            // token (operand adjacency, close-paren context), always pointing
            // at the parenthesis itself.
            Role::Open => {
                depth += 1;
                open_stack.push(i);
            }
            Role::Close => {
                if depth == 0 {
                    return Err(fail(ErrorCode::UnmatchedClosingParenthesis, i));
                }
                depth -= 1;
                open_stack.pop();
                if !matches!(prev, Some(Role::Operand) | Some(Role::Close)) {
                    return Err(fail(ErrorCode::InvalidTokenSequence, i));
                }
                if !matches!(next, None | Some(Role::Close) | Some(Role::Binary)) {
                    return Err(fail(ErrorCode::InvalidTokenAfterCloseParen, i));
                }
            }
            Role::Unary => {
                if !matches!(next, Some(Role::Operand) | Some(Role::Open) | Some(Role::Unary)) {
                    return Err(fail(ErrorCode::UnaryOperatorMissingOperand, i));
                }
            }
            Role::Binary => {
                if i == 0 || i == roles.len() - 1 {
                    return Err(fail(ErrorCode::BinaryOperatorAtEnds, i));
                }
                let left_ok = matches!(prev, Some(Role::Operand) | Some(Role::Close));
                let right_ok = matches!(next, Some(Role::Operand) | Some(Role::Open) | Some(Role::Unary));
                if !left_ok || !right_ok {
                    return Err(fail(ErrorCode::InvalidBinaryOperatorContext, i));
                }
            }
            Role::Operand => match next {
                None | Some(Role::Close) | Some(Role::Binary) => {}
                Some(Role::Open) => return Err(fail(ErrorCode::InvalidTokenBeforeOpenParen, i + 1)),
                Some(_) => return Err(fail(ErrorCode::InvalidTokenSequence, i + 1)),
            },
        }
    }

    if depth > 0 {
        let at = open_stack.last().copied().unwrap_or(0);
        return Err(fail(ErrorCode::UnmatchedParentheses, at));
    }

    Ok(())
}
