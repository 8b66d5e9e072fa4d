//! A fact store wired to a reasoner.

use trine_graph::{Matches, Statement, StatementSet, TermPos};

use crate::engine::Reasoner;
use crate::error::Result;
use crate::rule::Rule;

/// A predicate-indexed fact store whose insertions run inference.
///
/// Every fact added through [`add`](Self::add) is followed by
/// [`Reasoner::infer`], so the store always holds the closure of its seed
/// facts under the rules.
#[derive(Debug)]
pub struct KnowledgeBase {
    store: StatementSet,
    reasoner: Reasoner,
}

impl KnowledgeBase {
    /// Creates an empty knowledge base around `reasoner`.
    pub fn new(reasoner: Reasoner) -> Self {
        Self {
            store: StatementSet::new(TermPos::P),
            reasoner,
        }
    }

    /// Shorthand for a knowledge base over `rules` with default settings.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self::new(Reasoner::new(rules))
    }

    /// Adds a seed fact and derives its consequences.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the fact was new, `Ok(false)` if the store already held
    /// it (nothing is inferred then), and an error if `fact` contains a
    /// variable.
    pub fn add(&mut self, fact: Statement) -> Result<bool> {
        if fact.includes_variables() {
            return Err(trine_graph::Error::NotAFact(fact.to_string()).into());
        }
        if self.store.contains(&fact) {
            return Ok(false);
        }
        self.store.add(fact.clone());
        self.reasoner.infer(&mut self.store, &fact);
        Ok(true)
    }

    /// Adds facts in order, stopping at the first error.
    ///
    /// Returns how many of them were new.
    pub fn extend<I>(&mut self, facts: I) -> Result<usize>
    where
        I: IntoIterator<Item = Statement>,
    {
        let mut added = 0;
        for fact in facts {
            if self.add(fact)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Returns `true` if a stored fact matches `query`.
    pub fn contains(&self, query: &Statement) -> bool {
        self.store.contains(query)
    }

    /// Lazily yields stored facts matching `query`.
    pub fn find_matches(&self, query: &Statement) -> Matches<'_> {
        self.store.find_matches(query)
    }

    /// Every stored fact, seeds and derived alike.
    pub fn facts(&self) -> impl Iterator<Item = &Statement> + '_ {
        self.store.iter()
    }

    /// Number of stored facts.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The underlying fact store.
    pub fn store(&self) -> &StatementSet {
        &self.store
    }

    /// The reasoner.
    pub fn reasoner(&self) -> &Reasoner {
        &self.reasoner
    }

    /// Mutable access to the reasoner, e.g. to toggle tracing.
    pub fn reasoner_mut(&mut self) -> &mut Reasoner {
        &mut self.reasoner
    }

    /// Consumes the knowledge base, returning the fact store.
    pub fn into_store(self) -> StatementSet {
        self.store
    }
}
