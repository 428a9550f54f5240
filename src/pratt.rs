//! Pratt parsing: top-down operator precedence.
//!
//! The null-denotation handles groups, prefix negation, constants and
//! identifiers; the left-denotation loop consumes binary operators while
//! their left binding power reaches the caller's minimum. Right binding
//! power is `precedence + 1` for left-associative operators and the bare
//! precedence for right-associative ones, which yields exactly the same
//! trees as the shunting-yard strategy.

use crate::ast::Expr;
use crate::error::{ErrorCode, ParseError};
use crate::registry::OperatorRegistry;
use crate::token::{Token, TokenKind};

/// Parse a validated token stream into an AST.
pub fn parse(tokens: &[Token], registry: &OperatorRegistry, source: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        registry,
        source,
    };
    let ast = parser.parse_min_bp(0)?;
    match parser.peek() {
        None => Ok(ast),
        Some(tok) => Err(parser.fault(ErrorCode::InvalidTokenSequence, tok)),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    registry: &'a OperatorRegistry,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn fault(&self, code: ErrorCode, token: &Token) -> ParseError {
        ParseError::new(code, token.index, self.source).with_token(
            self.pos.min(self.tokens.len().saturating_sub(1)),
            &token.lexeme,
            token.kind.category(),
        )
    }

    fn end_fault(&self) -> ParseError {
        let at = self.source.chars().count();
        ParseError::new(ErrorCode::InvalidTokenSequence, at, self.source)
    }

    fn parse_min_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.null_denotation()?;

        while let Some(token) = self.peek() {
            if token.kind == TokenKind::RightParen {
                break;
            }
            if token.kind != TokenKind::Operator || !self.registry.is_binary(&token.lexeme) {
                return Err(self.fault(ErrorCode::InvalidTokenSequence, token));
            }
            let prec = self
                .registry
                .precedence(&token.lexeme)
                .ok_or_else(|| self.fault(ErrorCode::InvalidTokenSequence, token))?;
            if prec < min_bp {
                break;
            }
            let factory = self
                .registry
                .binary_factory(&token.lexeme)
                .ok_or_else(|| self.fault(ErrorCode::InvalidTokenSequence, token))?;
            self.advance();

            let right_bp = if self.registry.is_right_associative(&token.lexeme) {
                prec
            } else {
                prec + 1
            };
            let rhs = self.parse_min_bp(right_bp)?;
            lhs = factory(lhs, rhs);
        }

        Ok(lhs)
    }

    fn null_denotation(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance().ok_or_else(|| self.end_fault())?;
        match token.kind {
            TokenKind::Constant => Ok(Expr::Const(token.lexeme == "1")),
            TokenKind::Identifier => Ok(Expr::var(token.lexeme.clone())),
            TokenKind::LeftParen => {
                let inner = self.parse_min_bp(0)?;
                match self.advance() {
                    Some(tok) if tok.kind == TokenKind::RightParen => Ok(inner),
                    _ => Err(ParseError::new(ErrorCode::UnmatchedParentheses, token.index, self.source)
                        .with_token(0, &token.lexeme, token.kind.category())),
                }
            }
            TokenKind::Operator if self.registry.is_unary(&token.lexeme) => {
                let prec = self
                    .registry
                    .precedence(&token.lexeme)
                    .ok_or_else(|| self.fault(ErrorCode::InvalidTokenSequence, token))?;
                let factory = self
                    .registry
                    .unary_factory(&token.lexeme)
                    .ok_or_else(|| self.fault(ErrorCode::InvalidTokenSequence, token))?;
                let operand = self.parse_min_bp(prec)?;
                Ok(factory(operand))
            }
            _ => Err(self.fault(ErrorCode::InvalidTokenSequence, token)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Tokenizer;
    use crate::shunting;

    fn parse_str(input: &str) -> Expr {
        let reg = OperatorRegistry::default();
        let tokens = Tokenizer::new(&reg).tokenize(input).unwrap();
        parse(&tokens, &reg, input).unwrap()
    }

    #[test]
    fn test_precedence_layers() {
        assert_eq!(parse_str("A | B & C").to_string(), "(A | (B & C))");
        assert_eq!(parse_str("A & B | C").to_string(), "((A & B) | C)");
        assert_eq!(parse_str("~A & B").to_string(), "(~A & B)");
    }

    #[test]
    fn test_associativity() {
        assert_eq!(parse_str("A & B & C").to_string(), "((A & B) & C)");
        assert_eq!(parse_str("A => B => C").to_string(), "(A => (B => C))");
    }

    #[test]
    fn test_prefix_binding_power() {
        // Negation binds tighter than any binary operator but groups stack.
        assert_eq!(parse_str("~A & B").to_string(), "(~A & B)");
        assert_eq!(parse_str("~~A | B").to_string(), "(~~A | B)");
        assert_eq!(parse_str("~(A | B)").to_string(), "~(A | B)");
    }

    #[test]
    fn test_agrees_with_shunting_yard() {
        let reg = OperatorRegistry::default();
        for input in [
            "A & B | C ^ D",
            "A => B => C <=> D",
            "~A !& ~(B !| C)",
            "((A))",
            "A XOR B IMPLIES NOT C",
            "1 | x & 0",
        ] {
            let tokens = Tokenizer::new(&reg).tokenize(input).unwrap();
            let pratt_ast = parse(&tokens, &reg, input).unwrap();
            let yard_ast = shunting::parse(&tokens, &reg, input).unwrap();
            assert_eq!(pratt_ast, yard_ast, "strategy mismatch on {input}");
        }
    }
}
