//! Statements: ordered subject-predicate-object triples of [`Term`]s.

use crate::error::{Error, Result};
use crate::term::Term;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three positions of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermPos {
    /// Subject
    S,
    /// Predicate
    P,
    /// Object
    O,
}

impl TermPos {
    /// All positions in statement order.
    pub const ALL: [TermPos; 3] = [TermPos::S, TermPos::P, TermPos::O];

    /// The zero-based index of this position.
    pub fn index(self) -> usize {
        match self {
            Self::S => 0,
            Self::P => 1,
            Self::O => 2,
        }
    }
}

impl TryFrom<usize> for TermPos {
    type Error = Error;

    fn try_from(idx: usize) -> Result<Self> {
        match idx {
            0 => Ok(Self::S),
            1 => Ok(Self::P),
            2 => Ok(Self::O),
            other => Err(Error::InvalidPosition(other)),
        }
    }
}

impl fmt::Display for TermPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::S => "subject",
            Self::P => "predicate",
            Self::O => "object",
        };
        write!(f, "{}", name)
    }
}

/// A triple of terms; the unit of both facts and patterns.
///
/// A statement is a *fact* when none of its terms is a variable.
///
/// # Examples
///
/// ```
/// use trine_graph::{Statement, Term, TermPos};
///
/// let fact = Statement::new(Term::iri("alice"), Term::iri("age"), Term::literal("17"));
/// assert!(fact.is_fact());
/// assert_eq!(fact.get(TermPos::P), &Term::iri("age"));
/// assert_eq!(fact.to_string(), "<alice> <age> \"17\" .");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    /// The subject term
    pub subject: Term,
    /// The predicate term
    pub predicate: Term,
    /// The object term
    pub object: Term,
}

impl Statement {
    /// Create a new statement
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Returns the term at `pos`.
    pub fn get(&self, pos: TermPos) -> &Term {
        match pos {
            TermPos::S => &self.subject,
            TermPos::P => &self.predicate,
            TermPos::O => &self.object,
        }
    }

    /// Mutable access to the term at `pos`.
    pub fn get_mut(&mut self, pos: TermPos) -> &mut Term {
        match pos {
            TermPos::S => &mut self.subject,
            TermPos::P => &mut self.predicate,
            TermPos::O => &mut self.object,
        }
    }

    /// Replaces the term at `pos`.
    pub fn set(&mut self, pos: TermPos, term: Term) {
        *self.get_mut(pos) = term;
    }

    /// The three terms in subject, predicate, object order.
    pub fn terms(&self) -> [&Term; 3] {
        [&self.subject, &self.predicate, &self.object]
    }

    /// Mutable access to all three terms.
    pub fn terms_mut(&mut self) -> [&mut Term; 3] {
        [&mut self.subject, &mut self.predicate, &mut self.object]
    }

    /// Returns `true` if any term is a variable.
    pub fn includes_variables(&self) -> bool {
        self.terms().iter().any(|t| t.is_variable())
    }

    /// Returns `true` if no term is a variable.
    pub fn is_fact(&self) -> bool {
        !self.includes_variables()
    }

    /// Position-wise [`Term::equals`] with the same `exact` flag.
    pub fn equals(&self, other: &Statement, exact: bool) -> bool {
        self.subject.equals(&other.subject, exact)
            && self.predicate.equals(&other.predicate, exact)
            && self.object.equals(&other.object, exact)
    }
}

impl AsRef<Statement> for Statement {
    fn as_ref(&self) -> &Statement {
        self
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
