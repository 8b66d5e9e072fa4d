//! Error types for Trine Graph.
//!
//! This module provides a unified `Error` type for term, statement and parsing operations.

use std::fmt;

/// A specialized `Result` type for graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines the errors that can occur while building or loading statements.
#[derive(Debug)]
pub enum Error {
    /// A term position index outside of subject/predicate/object was requested.
    InvalidPosition(usize),

    /// A statement containing a variable was offered where only facts are allowed.
    NotAFact(String),

    /// The textual input could not be tokenized or parsed.
    Parse {
        /// 1-based line of the offending token.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// An error from the underlying I/O system.
    Io(std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Parse`] at the given line.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPosition(idx) => write!(f, "invalid term position: {}", idx),
            Self::NotAFact(stmt) => write!(f, "not a fact (contains variables): {}", stmt),
            Self::Parse { line, message } => write!(f, "parse error at line {}: {}", line, message),
            Self::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotAFact("?x <p> <o> .".to_string());
        assert!(err.to_string().contains("not a fact"));
        assert!(err.to_string().contains("?x"));
    }

    #[test]
    fn test_parse_error_line() {
        let err = Error::parse(7, "expected '.'");
        assert_eq!(err.to_string(), "parse error at line 7: expected '.'");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
