//! Lazy, bucket-merging match iteration.

use crate::index::StatementSet;
use crate::statement::Statement;
use std::iter::FusedIterator;

/// Pull-based position over the candidate buckets of one query.
///
/// A cursor records which buckets to visit and how long each was when the
/// cursor was created. It holds no borrow of the set, so a caller can add to
/// the set between pulls; the new items are simply out of the cursor's view.
/// Each pull re-borrows the set for the lifetime of the returned item.
#[derive(Debug, Clone)]
pub struct MatchCursor {
    query: Statement,
    /// (bucket index, bucket length at creation)
    sources: Vec<(usize, usize)>,
    source: usize,
    offset: usize,
}

impl MatchCursor {
    pub(crate) fn new(query: Statement, sources: Vec<(usize, usize)>) -> Self {
        Self {
            query,
            sources,
            source: 0,
            offset: 0,
        }
    }

    /// The pattern this cursor filters by.
    pub fn query(&self) -> &Statement {
        &self.query
    }

    /// Returns `true` once every candidate bucket has been drained.
    pub fn is_exhausted(&self) -> bool {
        self.source >= self.sources.len()
    }

    /// Produces the next matching item of `set`, or `None` when exhausted.
    ///
    /// `set` must be the set the cursor was created from.
    pub fn next_match<'s, T: AsRef<Statement>>(
        &mut self,
        set: &'s StatementSet<T>,
    ) -> Option<&'s T> {
        while let Some(&(bucket_idx, snapshot_len)) = self.sources.get(self.source) {
            let bucket = set.bucket_at(bucket_idx);
            let end = snapshot_len.min(bucket.len());
            while self.offset < end {
                let item = &bucket[self.offset];
                self.offset += 1;
                if item.as_ref().equals(&self.query, false) {
                    return Some(item);
                }
            }
            self.source += 1;
            self.offset = 0;
        }
        None
    }
}

/// Borrowing iterator over the matches of one query.
///
/// Created by [`StatementSet::find_matches`]. Finite and single-pass.
#[derive(Debug)]
pub struct Matches<'a, T = Statement> {
    set: &'a StatementSet<T>,
    cursor: MatchCursor,
}

impl<'a, T: AsRef<Statement>> Matches<'a, T> {
    pub(crate) fn new(set: &'a StatementSet<T>, cursor: MatchCursor) -> Self {
        Self { set, cursor }
    }
}

impl<'a, T: AsRef<Statement>> Iterator for Matches<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_match(self.set)
    }
}

impl<T: AsRef<Statement>> FusedIterator for Matches<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Term, TermPos};

    fn fact(s: &str, p: &str, o: &str) -> Statement {
        Statement::new(Term::iri(s), Term::iri(p), Term::iri(o))
    }

    #[test]
    fn test_empty_set_is_immediately_exhausted() {
        let set: StatementSet = StatementSet::new(TermPos::P);
        let query = Statement::new(Term::variable("s"), Term::iri("p"), Term::variable("o"));
        let mut cursor = set.cursor(&query);
        assert!(cursor.is_exhausted());
        assert!(cursor.next_match(&set).is_none());

        let all = Statement::new(Term::variable("s"), Term::variable("p"), Term::variable("o"));
        assert_eq!(set.find_matches(&all).count(), 0);
    }

    #[test]
    fn test_iterator_is_fused() {
        let mut set = StatementSet::new(TermPos::P);
        set.add(fact("a", "p", "b"));
        let query = Statement::new(Term::variable("s"), Term::iri("p"), Term::variable("o"));
        let mut matches = set.find_matches(&query);
        assert!(matches.next().is_some());
        assert!(matches.next().is_none());
        assert!(matches.next().is_none());
    }

    #[test]
    fn test_cursor_ignores_items_added_later() {
        let mut set = StatementSet::new(TermPos::P);
        set.add(fact("a", "p", "b"));
        let query = Statement::new(Term::variable("s"), Term::iri("p"), Term::variable("o"));
        let mut cursor = set.cursor(&query);

        set.add(fact("c", "p", "d"));
        set.add(fact("e", "q", "f"));

        let first = cursor.next_match(&set).cloned();
        assert_eq!(first, Some(fact("a", "p", "b")));
        assert!(cursor.next_match(&set).is_none());
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_cursor_filters_non_indexed_positions() {
        let mut set = StatementSet::new(TermPos::P);
        set.add(fact("a", "p", "b"));
        set.add(fact("a", "p", "c"));
        set.add(fact("x", "p", "b"));
        let query = Statement::new(Term::iri("a"), Term::iri("p"), Term::variable("o"));

        let mut cursor = set.cursor(&query);
        let mut objects = Vec::new();
        while let Some(stmt) = cursor.next_match(&set) {
            objects.push(stmt.object.clone());
        }
        assert_eq!(objects, vec![Term::iri("b"), Term::iri("c")]);
    }
}
