//! Error types for the Trine Logic engine.

use thiserror::Error;

/// A specialized `Result` type for logic engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines the errors that can occur while building rules or loading rule text.
///
/// Inference itself never fails; these only arise at construction boundaries.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A rule was defined incorrectly.
    #[error("Invalid rule definition: {0}")]
    InvalidRule(String),

    /// A builtin name is not in the registry.
    #[error("Unknown builtin: {0}")]
    UnknownBuiltin(String),

    /// A builtin was given the wrong number of arguments.
    #[error("Builtin '{name}' expects {expected} arguments, found {found}")]
    BuiltinArity {
        /// The builtin's registered name.
        name: String,
        /// Human-readable arity, e.g. `2` or `at least 2`.
        expected: String,
        /// Number of arguments supplied.
        found: usize,
    },

    /// The rule text could not be parsed.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line of the offending token.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// An error originating from the graph layer.
    #[error("Graph error: {0}")]
    Graph(String),

    /// An I/O error while reading rule files.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<trine_graph::Error> for Error {
    fn from(e: trine_graph::Error) -> Self {
        match e {
            trine_graph::Error::Parse { line, message } => Error::Parse { line, message },
            trine_graph::Error::Io(err) => Error::Io(err.to_string()),
            other => Error::Graph(other.to_string()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
