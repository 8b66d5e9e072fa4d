//! Single-position statement index.
//!
//! A [`StatementSet`] buckets its statements by the value of one chosen term
//! position. Statements holding a variable at that position go to a reserved
//! wildcard bucket, since they can match any query value there.
//!
//! The same structure serves as the fact store (facts only, see
//! [`StatementSet::add_fact`]) and as a rule clause index, where the stored
//! items wrap patterns that may contain variables.

use crate::error::{Error, Result};
use crate::matches::{MatchCursor, Matches};
use crate::statement::{Statement, TermPos};
use crate::term::Term;
use indexmap::IndexMap;
use log::trace;
use std::fmt;

/// The key of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// Statements whose indexed term is this constant value
    Value(String),
    /// Statements whose indexed term is a variable
    Wildcard,
}

impl IndexKey {
    /// The key a term falls under.
    pub fn of(term: &Term) -> Self {
        match term {
            Term::Constant(value) => Self::Value(value.clone()),
            Term::Variable(_) => Self::Wildcard,
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{}", value),
            Self::Wildcard => write!(f, "<wildcard>"),
        }
    }
}

/// A bucketed collection of statements indexed on one position.
///
/// `T` is anything that exposes a [`Statement`]; plain statements by default.
/// Buckets keep insertion order, so iteration and match order are
/// deterministic for a given sequence of `add` calls.
///
/// # Examples
///
/// ```
/// use trine_graph::{Statement, StatementSet, Term, TermPos};
///
/// let mut facts = StatementSet::new(TermPos::P);
/// facts.add_fact(Statement::new(Term::iri("a"), Term::iri("knows"), Term::iri("b"))).unwrap();
///
/// let query = Statement::new(Term::variable("x"), Term::iri("knows"), Term::variable("y"));
/// assert_eq!(facts.find_matches(&query).count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct StatementSet<T = Statement> {
    position: TermPos,
    buckets: IndexMap<IndexKey, Vec<T>>,
    len: usize,
}

impl<T: AsRef<Statement>> StatementSet<T> {
    /// Creates an empty set indexed on `position`.
    pub fn new(position: TermPos) -> Self {
        Self {
            position,
            buckets: IndexMap::new(),
            len: 0,
        }
    }

    /// The indexed position.
    pub fn position(&self) -> TermPos {
        self.position
    }

    /// Appends an item to the bucket of its indexed term.
    ///
    /// No structural deduplication happens here; callers that need set
    /// semantics check [`contains`](Self::contains) first.
    pub fn add(&mut self, item: T) {
        let key = IndexKey::of(item.as_ref().get(self.position));
        trace!("index add [{}] {}", key, item.as_ref());
        self.buckets.entry(key).or_default().push(item);
        self.len += 1;
    }

    /// Like [`add`](Self::add), but refuses statements containing variables.
    pub fn add_fact(&mut self, item: T) -> Result<()> {
        if item.as_ref().includes_variables() {
            return Err(Error::NotAFact(item.as_ref().to_string()));
        }
        self.add(item);
        Ok(())
    }

    /// Removes the first item exactly equal to `stmt`.
    ///
    /// Only the one bucket that can hold `stmt` is scanned. The bucket itself
    /// stays in place even when emptied, so bucket order never shifts.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, stmt: &Statement) -> bool {
        let key = IndexKey::of(stmt.get(self.position));
        let Some(bucket) = self.buckets.get_mut(&key) else {
            return false;
        };
        match bucket.iter().position(|item| item.as_ref().equals(stmt, true)) {
            Some(idx) => {
                bucket.remove(idx);
                self.len -= 1;
                trace!("index remove [{}] {}", key, stmt);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if at least one stored item matches `query`.
    ///
    /// Matching is wildcard-aware, so a pattern query asks whether any
    /// instance is present. Stops at the first match.
    pub fn contains(&self, query: &Statement) -> bool {
        self.find_matches(query).next().is_some()
    }

    /// Lazily yields every stored item that matches `query` in pattern mode.
    pub fn find_matches(&self, query: &Statement) -> Matches<'_, T> {
        Matches::new(self, self.cursor(query))
    }

    /// Creates a detached cursor over the current matches of `query`.
    ///
    /// Unlike [`find_matches`](Self::find_matches) the cursor does not borrow
    /// the set, so the set may grow between pulls. Items added after the
    /// cursor was created are not visited.
    pub fn cursor(&self, query: &Statement) -> MatchCursor {
        let sources = match query.get(self.position) {
            Term::Constant(value) => {
                let mut sources = Vec::with_capacity(2);
                let exact = self.buckets.get_full(&IndexKey::Value(value.clone()));
                if let Some((idx, _, bucket)) = exact {
                    sources.push((idx, bucket.len()));
                }
                if let Some((idx, _, bucket)) = self.buckets.get_full(&IndexKey::Wildcard) {
                    sources.push((idx, bucket.len()));
                }
                sources
            }
            Term::Variable(_) => self
                .buckets
                .values()
                .enumerate()
                .map(|(idx, bucket)| (idx, bucket.len()))
                .collect(),
        };
        MatchCursor::new(query.clone(), sources)
    }

    /// Iterates every stored item, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.buckets.values().flatten()
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets, including emptied ones.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn bucket_at(&self, idx: usize) -> &[T] {
        self.buckets
            .get_index(idx)
            .map(|(_, bucket)| bucket.as_slice())
            .unwrap_or(&[])
    }
}

impl<T: AsRef<Statement>> Default for StatementSet<T> {
    /// A predicate-indexed set.
    fn default() -> Self {
        Self::new(TermPos::P)
    }
}

impl<T: AsRef<Statement>> Extend<T> for StatementSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T: AsRef<Statement>> fmt::Display for StatementSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, bucket) in &self.buckets {
            for item in bucket {
                writeln!(f, "{} : {}", key, item.as_ref())?;
            }
        }
        Ok(())
    }
}
