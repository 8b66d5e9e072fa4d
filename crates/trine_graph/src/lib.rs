//! Trine Graph - Triple Model and Statement Index
//!
//! The data layer of the Trine forward-chaining reasoner: terms, statements,
//! and a bucketed statement set that serves both as the fact store and as the
//! rule clause index.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Trine Graph                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                 Text Collaborators                    │   │
//! │  │        Lexer  │  Fact parser  │  Fact writer         │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                   Statement Set                       │   │
//! │  │  ┌─────────┐  ┌─────────┐  ┌──────────┐             │   │
//! │  │  │ bucket  │  │ bucket  │  │ wildcard │  one index   │   │
//! │  │  └─────────┘  └─────────┘  └──────────┘  position    │   │
//! │  │           MatchCursor / Matches (lazy)               │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │            Term  │  Statement  │  TermPos             │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use trine_graph::{parse_facts, Statement, StatementSet, Term, TermPos};
//!
//! let mut store = StatementSet::new(TermPos::P);
//! for fact in parse_facts("<alice> <knows> <bob> .\n<bob> <knows> <carol> .")? {
//!     store.add_fact(fact)?;
//! }
//!
//! // Who does anyone know?
//! let query = Statement::new(Term::variable("x"), Term::iri("knows"), Term::variable("y"));
//! assert_eq!(store.find_matches(&query).count(), 2);
//! # Ok::<(), trine_graph::Error>(())
//! ```
//!
//! # Matching
//!
//! Two terms compare either *exactly* (variables equal only same-named
//! variables) or in *pattern* mode, where a variable on either side matches
//! anything:
//! ```text
//! <alice> <knows> ?who     matches     <alice> <knows> <bob>
//! <alice> <knows> ?who     matches     ?x <knows> <carol>
//! <alice> <knows> ?who     no match    <alice> <age> "17"
//! ```

pub mod error;
pub mod index;
pub mod lexer;
pub mod matches;
pub mod parser;
pub mod statement;
pub mod term;

// Re-exports
pub use error::{Error, Result};
pub use index::{IndexKey, StatementSet};
pub use matches::{MatchCursor, Matches};
pub use parser::{parse_facts, parse_file, write_facts};
pub use statement::{Statement, TermPos};
pub use term::{Term, Variable};

/// Version of the graph crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_store_roundtrip() {
        let mut store = StatementSet::default();
        for fact in parse_facts("<a> <p> <b> .\n<b> <p> <c> .\n<c> <q> \"x\" .").unwrap() {
            store.add_fact(fact).unwrap();
        }
        assert_eq!(store.len(), 3);

        let query = Statement::new(Term::variable("s"), Term::iri("p"), Term::iri("c"));
        let found: Vec<_> = store.find_matches(&query).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].subject, Term::iri("b"));
    }
}
