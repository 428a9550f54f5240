//! Error types for parsing, evaluation and variable ordering.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

/// Fault category of a [`ParseError`], one variant per way an input can be
/// rejected.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorCode {
    /// The input contains no tokens.
    EmptyExpression,
    /// An opening parenthesis is preceded by a token that cannot precede it.
    InvalidTokenBeforeOpenParen,
    /// A closing parenthesis is followed by a token that cannot follow it.
    InvalidTokenAfterCloseParen,
    /// A unary operator is not followed by an operand.
    UnaryOperatorMissingOperand,
    /// A binary operator appears at the start or the end of the input.
    BinaryOperatorAtEnds,
    /// A binary operator has an invalid neighbor on either side.
    InvalidBinaryOperatorContext,
    /// A closing parenthesis without a matching opening one.
    UnmatchedClosingParenthesis,
    /// Opening parentheses left unclosed at the end of the input.
    UnmatchedParentheses,
    /// A character or word that is no operator, alias, constant or identifier.
    UnknownToken,
    /// Catch-all for violations detected past the structural validator.
    InvalidTokenSequence,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::EmptyExpression => "EmptyExpression",
            ErrorCode::InvalidTokenBeforeOpenParen => "InvalidTokenBeforeOpenParen",
            ErrorCode::InvalidTokenAfterCloseParen => "InvalidTokenAfterCloseParen",
            ErrorCode::UnaryOperatorMissingOperand => "UnaryOperatorMissingOperand",
            ErrorCode::BinaryOperatorAtEnds => "BinaryOperatorAtEnds",
            ErrorCode::InvalidBinaryOperatorContext => "InvalidBinaryOperatorContext",
            ErrorCode::UnmatchedClosingParenthesis => "UnmatchedClosingParenthesis",
            ErrorCode::UnmatchedParentheses => "UnmatchedParentheses",
            ErrorCode::UnknownToken => "UnknownToken",
            ErrorCode::InvalidTokenSequence => "InvalidTokenSequence",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected parse, with enough position information to point at the
/// offending column of the original input.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub code: ErrorCode,
    /// Index of the offending token in the token stream, if one exists.
    pub token_index: Option<usize>,
    /// 0-based char index where the offending lexeme starts.
    pub char_start: usize,
    /// 0-based char index one past the end of the offending lexeme.
    pub char_end: usize,
    /// Code point of the offending character, for single-character faults.
    pub char_code: Option<u32>,
    /// The offending lexeme (empty when the fault is positional only).
    pub lexeme: String,
    /// Token category of the offending token ("operator", "identifier", ...).
    pub category: &'static str,
    /// Nearest registered aliases, by edit distance.
    pub suggestions: Vec<String>,
    /// The input line the error occurred in.
    pub line: String,
    /// The underlying fault, for errors wrapped by `try_parse`.
    pub cause: Option<Box<ParseError>>,
}

impl ParseError {
    pub fn new(code: ErrorCode, char_start: usize, line: &str) -> Self {
        ParseError {
            code,
            token_index: None,
            char_start,
            char_end: char_start + 1,
            char_code: None,
            lexeme: String::new(),
            category: "",
            suggestions: Vec::new(),
            line: line.to_string(),
            cause: None,
        }
    }

    pub fn with_token(mut self, token_index: usize, lexeme: &str, category: &'static str) -> Self {
        self.token_index = Some(token_index);
        self.lexeme = lexeme.to_string();
        self.char_end = self.char_start + lexeme.chars().count().max(1);
        self.category = category;
        self
    }

    pub fn with_char_code(mut self, c: char) -> Self {
        self.char_code = Some(c as u32);
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Wrap this error into the catch-all [`ErrorCode::InvalidTokenSequence`],
    /// keeping the original as the cause.
    pub fn into_sequence_fault(self) -> Self {
        if self.code == ErrorCode::InvalidTokenSequence {
            return self;
        }
        ParseError {
            code: ErrorCode::InvalidTokenSequence,
            token_index: self.token_index,
            char_start: self.char_start,
            char_end: self.char_end,
            char_code: self.char_code,
            lexeme: self.lexeme.clone(),
            category: self.category,
            suggestions: Vec::new(),
            line: self.line.clone(),
            cause: Some(Box::new(self)),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.code)?;
        match self.code {
            ErrorCode::EmptyExpression => write!(f, "the expression is empty")?,
            ErrorCode::UnknownToken => {
                write!(f, "unknown token '{}' at index {}", self.lexeme, self.char_start)?;
            }
            _ => {
                if self.lexeme.is_empty() {
                    write!(f, "at index {}", self.char_start)?;
                } else {
                    write!(
                        f,
                        "'{}' ({}) at index {}",
                        self.lexeme, self.category, self.char_start
                    )?;
                }
            }
        }
        if !self.suggestions.is_empty() {
            write!(f, "; did you mean {}?", self.suggestions.join(", "))?;
        }
        if !self.line.is_empty() {
            write!(f, "\n  {}\n  {}^", self.line, " ".repeat(self.char_start))?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|e| e as _)
    }
}

/// Failure to evaluate an expression against a concrete input.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum EvalError {
    #[error("expected {expected} input values, got {actual}")]
    InputLengthMismatch { expected: usize, actual: usize },
    #[error("no value provided for variable '{0}'")]
    MissingVariable(String),
    #[error("variable '{0}' has not been assigned an input index")]
    UnindexedVariable(String),
}

/// Failure to apply a variable ordering to an expression.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum OrderError {
    #[error("duplicate variable '{0}' in ordering")]
    DuplicateVariable(String),
    #[error("variable '{0}' is not part of this expression")]
    UnknownVariable(String),
    #[error("ordering is missing variable '{0}'")]
    MissingVariable(String),
}
