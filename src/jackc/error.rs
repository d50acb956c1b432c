use std::{fmt, io};

use thiserror::Error;

/// Location of a token in the source text, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("integer constant '{0}' is out of range")]
    IntegerOutOfRange(String),
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{position}: {kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

impl LexError {
    pub fn new(kind: LexErrorKind, position: Position) -> Self {
        LexError { kind, position }
    }
}

/// Errors raised by a symbol table, which knows names but not positions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("duplicate declaration of '{0}'")]
    DuplicateDeclaration(String),
    #[error("undeclared identifier '{0}'")]
    UndeclaredIdentifier(String),
}

impl ScopeError {
    pub fn at(self, position: Position) -> CompileError {
        match self {
            ScopeError::DuplicateDeclaration(name) => {
                CompileError::DuplicateDeclaration { name, position }
            }
            ScopeError::UndeclaredIdentifier(name) => {
                CompileError::UndeclaredIdentifier { name, position }
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("{position}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("{position}: undeclared identifier '{name}'")]
    UndeclaredIdentifier { name: String, position: Position },

    #[error("{position}: duplicate declaration of '{name}'")]
    DuplicateDeclaration { name: String, position: Position },

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_error_lifts_to_positioned_error() {
        let err = ScopeError::UndeclaredIdentifier("x".into()).at(Position::new(3, 7));
        assert!(matches!(
            err,
            CompileError::UndeclaredIdentifier { ref name, position } if name == "x" && position == Position::new(3, 7)
        ));
        assert_eq!(err.to_string(), "line 3, column 7: undeclared identifier 'x'");
    }

    #[test]
    fn test_lex_error_message_carries_position() {
        let err: CompileError =
            LexError::new(LexErrorKind::InvalidCharacter('#'), Position::new(2, 5)).into();
        assert!(matches!(&err, CompileError::Lex(lex) if lex.position == Position::new(2, 5)));
        assert_eq!(err.to_string(), "line 2, column 5: invalid character '#'");
    }
}
