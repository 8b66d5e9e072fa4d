//! Incremental forward-chaining reasoner
//!
//! The reasoner reacts to one new fact at a time:
//! 1. Find every rule body pattern the fact matches (via a predicate-indexed
//!    clause index built once from all rules)
//! 2. Bind that pattern's variables from the fact
//! 3. Join the rest of the rule body against the store, depth first and in
//!    body order, evaluating builtins against the current binding
//! 4. For each complete binding, ground the head and assert every fact the
//!    store does not yet contain, recursing into `infer` for each
//!
//! Termination is structural: an already-contained fact is never re-asserted,
//! so the recursion bottoms out once nothing new can be derived.

use std::fmt;
use std::sync::Arc;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use trine_graph::{Statement, StatementSet, TermPos};

use crate::binding::{Binding, BindingStack};
use crate::listener::InferenceListener;
use crate::rule::{Clause, Rule};

/// A clause index entry: one body pattern and where it lives.
#[derive(Debug, Clone)]
pub struct ClauseRef {
    /// Index of the owning rule in the reasoner's rule list.
    pub rule: usize,
    /// Position of the pattern in the rule body.
    pub position: usize,
    pattern: Statement,
}

impl ClauseRef {
    /// The indexed body pattern.
    pub fn pattern(&self) -> &Statement {
        &self.pattern
    }
}

impl AsRef<Statement> for ClauseRef {
    fn as_ref(&self) -> &Statement {
        &self.pattern
    }
}

/// Counters collected by the [`Reasoner`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonerStats {
    /// Clause index matches (rule body patterns triggered by a new fact).
    pub triggers: usize,
    /// Store matches found while joining rule bodies.
    pub data_matches: usize,
    /// Complete body bindings, i.e. head firings.
    pub rules_fired: usize,
    /// New facts asserted.
    pub facts_inferred: usize,
    /// Builtin evaluations that failed.
    pub builtin_failures: usize,
    /// Head statements left with unbound variables and discarded.
    pub unbound_heads: usize,
}

/// The forward-chaining engine.
///
/// Holds a fixed rule set and its clause index. The fact store is passed in
/// to [`infer`](Self::infer), so it can be owned elsewhere; see
/// [`KnowledgeBase`](crate::KnowledgeBase) for a store wired to a reasoner.
///
/// # Examples
///
/// ```
/// use trine_graph::{Statement, StatementSet, Term, TermPos};
/// use trine_logic::{Reasoner, Rule};
///
/// let rule = Rule::builder("parent-is-ancestor")
///     .when(Statement::new(Term::variable("x"), Term::iri("parent"), Term::variable("y")))
///     .then(Statement::new(Term::variable("x"), Term::iri("ancestor"), Term::variable("y")))
///     .build()?;
/// let mut reasoner = Reasoner::new(vec![rule]);
///
/// let mut store = StatementSet::new(TermPos::P);
/// let fact = Statement::new(Term::iri("ann"), Term::iri("parent"), Term::iri("bea"));
/// store.add(fact.clone());
/// assert_eq!(reasoner.infer(&mut store, &fact), 1);
/// assert!(store.contains(&Statement::new(Term::iri("ann"), Term::iri("ancestor"), Term::iri("bea"))));
/// # Ok::<(), trine_logic::Error>(())
/// ```
pub struct Reasoner {
    rules: Arc<[Rule]>,
    clause_index: StatementSet<ClauseRef>,
    listener: Option<Box<dyn InferenceListener>>,
    tracing: bool,
    stats: ReasonerStats,
}

impl Reasoner {
    /// Creates a reasoner over `rules` and builds the clause index.
    ///
    /// The store is not touched.
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut clause_index = StatementSet::new(TermPos::P);
        for (rule_idx, rule) in rules.iter().enumerate() {
            for (position, clause) in rule.body().iter().enumerate() {
                if let Clause::Pattern(pattern) = clause {
                    clause_index.add(ClauseRef {
                        rule: rule_idx,
                        position,
                        pattern: pattern.statement().clone(),
                    });
                }
            }
        }
        debug!(
            "reasoner: {} rules, {} indexed clauses",
            rules.len(),
            clause_index.len()
        );

        Self {
            rules: rules.into(),
            clause_index,
            listener: None,
            tracing: false,
            stats: ReasonerStats::default(),
        }
    }

    /// Sets the inference listener.
    pub fn with_listener(mut self, listener: impl InferenceListener + 'static) -> Self {
        self.set_listener(listener);
        self
    }

    /// Replaces the inference listener.
    pub fn set_listener(&mut self, listener: impl InferenceListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Removes the inference listener.
    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Enables or disables step-by-step debug logging.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    /// Enables or disables step-by-step debug logging.
    pub fn set_tracing(&mut self, enabled: bool) {
        self.tracing = enabled;
    }

    /// Returns `true` if step-by-step logging is on.
    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    /// The rule set.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The predicate-indexed set of all rule body patterns.
    pub fn clause_index(&self) -> &StatementSet<ClauseRef> {
        &self.clause_index
    }

    /// Counters since construction or the last reset.
    pub fn stats(&self) -> &ReasonerStats {
        &self.stats
    }

    /// Resets all counters to zero.
    pub fn reset_stats(&mut self) {
        self.stats = ReasonerStats::default();
    }

    /// Derives every consequence of `fact`, which must already be in `store`.
    ///
    /// # Arguments
    ///
    /// * `store` - The fact store; derived facts are added to it.
    /// * `fact` - The newly asserted fact.
    ///
    /// # Returns
    ///
    /// The number of new facts asserted, including those derived recursively.
    pub fn infer(&mut self, store: &mut StatementSet, fact: &Statement) -> usize {
        let rules = Arc::clone(&self.rules);
        let triggers: Vec<(usize, usize)> = self
            .clause_index
            .find_matches(fact)
            .map(|c| (c.rule, c.position))
            .collect();

        let mut inferred = 0;
        for (rule_idx, position) in triggers {
            self.stats.triggers += 1;
            let rule = &rules[rule_idx];
            let Some(pattern) = rule.body()[position].as_pattern() else {
                continue;
            };
            if self.tracing {
                debug!(
                    "clause match: {} matches rule {} clause {} [{}]",
                    fact,
                    rule.id(),
                    position,
                    pattern
                );
            }

            let mut binding = Binding::new(rule.num_vars());
            if !binding.bind(pattern.statement(), fact) {
                trace!("rule {}: {} conflicts with [{}]", rule.id(), fact, pattern);
                continue;
            }
            let mut stack = BindingStack::new(binding);
            inferred += self.match_clauses(rule, position, 0, &mut stack, store);
        }
        inferred
    }

    /// Joins body clauses `next..` (skipping `consumed`) against the store.
    ///
    /// Returns the number of new facts asserted along this branch.
    fn match_clauses(
        &mut self,
        rule: &Rule,
        consumed: usize,
        next: usize,
        stack: &mut BindingStack,
        store: &mut StatementSet,
    ) -> usize {
        let next = if next == consumed { next + 1 } else { next };
        let Some(clause) = rule.body().get(next) else {
            return self.fire_rule(rule, stack.current(), store);
        };

        match clause {
            Clause::Builtin(builtin) => {
                let grounded = stack.current().ground_terms(builtin.args());
                stack.windup();
                let holds = builtin.evaluate(&grounded, stack.current_mut());
                if self.tracing {
                    debug!(
                        "builtin: rule {} {} -> {}",
                        rule.id(),
                        builtin,
                        if holds { "ok" } else { "fail" }
                    );
                }
                let inferred = if holds {
                    self.match_clauses(rule, consumed, next + 1, stack, store)
                } else {
                    self.stats.builtin_failures += 1;
                    0
                };
                stack.unwind();
                inferred
            }
            Clause::Pattern(pattern) => {
                let grounded = stack.current().ground(pattern.statement());
                if self.tracing {
                    debug!("next clause: rule {} [{}]", rule.id(), grounded);
                }

                let mut cursor = store.cursor(&grounded);
                let mut inferred = 0;
                while let Some(found) = cursor.next_match(store).cloned() {
                    self.stats.data_matches += 1;
                    stack.windup();
                    if stack.current_mut().bind(&grounded, &found) {
                        if self.tracing {
                            debug!(
                                "data match: {} binding {}",
                                found,
                                describe(rule, stack.current())
                            );
                        }
                        inferred += self.match_clauses(rule, consumed, next + 1, stack, store);
                    }
                    stack.unwind();
                }
                inferred
            }
        }
    }

    /// Grounds and asserts the head of `rule` under `binding`.
    fn fire_rule(&mut self, rule: &Rule, binding: &Binding, store: &mut StatementSet) -> usize {
        self.stats.rules_fired += 1;
        if self.tracing {
            debug!("fire: rule {} with {}", rule.id(), describe(rule, binding));
        }

        let mut inferred = 0;
        for head in rule.head() {
            let fact = binding.ground(head);
            if fact.includes_variables() {
                warn!(
                    "rule {}: head {} has unbound variables, not asserted",
                    rule.id(),
                    fact
                );
                self.stats.unbound_heads += 1;
                continue;
            }
            if store.contains(&fact) {
                if self.tracing {
                    debug!("known: {}", fact);
                }
                continue;
            }

            store.add(fact.clone());
            self.stats.facts_inferred += 1;
            inferred += 1;
            if self.tracing {
                debug!("assert: {} (rule {})", fact, rule.id());
            }
            if let Some(listener) = self.listener.as_mut() {
                listener.inference(&fact);
            }
            inferred += self.infer(store, &fact);
        }
        inferred
    }
}

/// Renders a binding with variable names, e.g. `{?x=<a>, ?y=_}`.
fn describe(rule: &Rule, binding: &Binding) -> String {
    let parts: Vec<String> = rule
        .variables()
        .iter()
        .map(|var| match binding.get(var) {
            Some(value) => format!("{}={}", var, value),
            None => format!("{}=_", var),
        })
        .collect();
    format!("{{{}}}", parts.join(", "))
}

impl fmt::Debug for Reasoner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reasoner")
            .field("rules", &self.rules.len())
            .field("clause_index", &self.clause_index.len())
            .field("listener", &self.listener.is_some())
            .field("tracing", &self.tracing)
            .field("stats", &self.stats)
            .finish()
    }
}
