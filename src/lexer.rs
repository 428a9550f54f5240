//! Unicode-aware tokenizer with longest-match operator detection.
//!
//! The scan is a single left-to-right pass dispatching per character:
//! whitespace, parenthesis, digit constant, alphabetic identifier run, or
//! symbolic operator candidate. Unknown characters are rejected with nearby
//! alias suggestions attached.

use unicode_normalization::UnicodeNormalization;

use crate::error::{ErrorCode, ParseError};
use crate::registry::OperatorRegistry;
use crate::token::{Token, TokenKind};

/// Tokenizer over a borrowed registry. Pure: the same input and registry
/// always produce the same token stream.
pub struct Tokenizer<'r> {
    registry: &'r OperatorRegistry,
    normalize_unicode: bool,
    enable_suggestions: bool,
}

impl<'r> Tokenizer<'r> {
    pub fn new(registry: &'r OperatorRegistry) -> Self {
        Tokenizer {
            registry,
            normalize_unicode: true,
            enable_suggestions: true,
        }
    }

    pub fn normalize_unicode(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    pub fn enable_suggestions(mut self, enabled: bool) -> Self {
        self.enable_suggestions = enabled;
        self
    }

    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, ParseError> {
        let source: String = if self.normalize_unicode {
            input.nfkc().collect()
        } else {
            input.to_string()
        };
        let chars: Vec<char> = source.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if c.is_whitespace() {
                i += 1;
                continue;
            }

            if c == '(' {
                tokens.push(Token::new(TokenKind::LeftParen, "(", i));
                i += 1;
                continue;
            }
            if c == ')' {
                tokens.push(Token::new(TokenKind::RightParen, ")", i));
                i += 1;
                continue;
            }

            if c == '0' || c == '1' {
                tokens.push(Token::new(TokenKind::Constant, c, i));
                i += 1;
                continue;
            }

            if c.is_alphabetic() {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if self.registry.is_negation_word(&word) {
                    tokens.push(Token::new(TokenKind::Operator, "~", start));
                } else if let Some(canonical) = self.registry.resolve_operator(&word) {
                    tokens.push(Token::new(TokenKind::Operator, canonical, start));
                } else if let Some(value) = self.registry.resolve_constant(&word) {
                    tokens.push(Token::new(TokenKind::Constant, if value { "1" } else { "0" }, start));
                } else {
                    tokens.push(Token::new(TokenKind::Identifier, word, start));
                }
                continue;
            }

            if let Some((canonical, len)) = self.registry.longest_match(&chars[i..]) {
                tokens.push(Token::new(TokenKind::Operator, canonical, i));
                i += len;
                continue;
            }

            let suggestions = if self.enable_suggestions {
                self.registry.suggestions_for(&c.to_string())
            } else {
                Vec::new()
            };
            return Err(ParseError::new(ErrorCode::UnknownToken, i, &source)
                .with_token(tokens.len(), &c.to_string(), "unknown")
                .with_char_code(c)
                .with_suggestions(suggestions));
        }

        Ok(tokens)
    }
}
