//! Rule definitions for the forward-chaining engine
//!
//! A rule is an ordered body of clauses and an ordered head of statement
//! patterns. Whenever the body is satisfied by facts in the store (and its
//! builtins hold), the grounded head statements are asserted.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use log::warn;
use trine_graph::{Statement, Term, Variable};

use crate::builtin::Builtin;
use crate::error::{Error, Result};

/// A triple pattern in a rule body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    statement: Statement,
    position: Option<usize>,
}

impl Pattern {
    /// Wraps a statement as a body pattern.
    pub fn new(statement: Statement) -> Self {
        Self {
            statement,
            position: None,
        }
    }

    /// The pattern's statement.
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Zero-based position in the owning rule's body, once the rule is built.
    pub fn position(&self) -> Option<usize> {
        self.position
    }
}

impl AsRef<Statement> for Pattern {
    fn as_ref(&self) -> &Statement {
        &self.statement
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.statement;
        write!(f, "{} {} {}", s.subject, s.predicate, s.object)
    }
}

/// One element of a rule body.
#[derive(Debug, Clone)]
pub enum Clause {
    /// Matched against facts in the store.
    Pattern(Pattern),
    /// Computed over already-bound terms.
    Builtin(Builtin),
}

impl Clause {
    /// Zero-based position in the owning rule's body, once the rule is built.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Pattern(p) => p.position(),
            Self::Builtin(b) => b.position(),
        }
    }

    /// Returns the pattern, if this clause is one.
    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            Self::Pattern(p) => Some(p),
            Self::Builtin(_) => None,
        }
    }

    /// Returns `true` for builtin clauses.
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }

    fn stamp(&mut self, position: usize) {
        match self {
            Self::Pattern(p) => p.position = Some(position),
            Self::Builtin(b) => b.set_position(position),
        }
    }

    fn terms_mut(&mut self) -> Vec<&mut Term> {
        match self {
            Self::Pattern(p) => p.statement.terms_mut().into_iter().collect(),
            Self::Builtin(b) => b.args_mut().iter_mut().collect(),
        }
    }
}

impl From<Statement> for Clause {
    fn from(statement: Statement) -> Self {
        Self::Pattern(Pattern::new(statement))
    }
}

impl From<Builtin> for Clause {
    fn from(builtin: Builtin) -> Self {
        Self::Builtin(builtin)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(p) => write!(f, "{}", p),
            Self::Builtin(b) => write!(f, "{}", b),
        }
    }
}

/// A forward-chaining rule.
///
/// Construction assigns every distinct variable a dense slot index in
/// first-occurrence order over body then head, and stamps each body clause
/// with its position. Rules are immutable afterwards.
#[derive(Debug, Clone)]
pub struct Rule {
    id: String,
    body: Vec<Clause>,
    head: Vec<Statement>,
    variables: Vec<Variable>,
}

impl Rule {
    /// Creates a rule.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier used in diagnostics.
    /// * `body` - Clauses that must all hold, evaluated in order.
    /// * `head` - Statements asserted for every satisfying binding.
    ///
    /// # Returns
    ///
    /// `Error::InvalidRule` if the body or head is empty, if the body has no
    /// triple pattern (such a rule could never be triggered by a fact), or if
    /// a builtin reads a variable that no earlier body clause binds.
    pub fn new(id: impl Into<String>, body: Vec<Clause>, head: Vec<Statement>) -> Result<Self> {
        let id = id.into();
        if body.is_empty() {
            return Err(Error::InvalidRule(format!("rule {} has an empty body", id)));
        }
        if head.is_empty() {
            return Err(Error::InvalidRule(format!("rule {} has an empty head", id)));
        }
        if body.iter().all(Clause::is_builtin) {
            return Err(Error::InvalidRule(format!(
                "rule {} has no triple pattern in its body",
                id
            )));
        }
        check_builtin_inputs(&id, &body)?;

        let mut rule = Self {
            id,
            body,
            head,
            variables: Vec::new(),
        };
        rule.assign_slots();
        Ok(rule)
    }

    /// Starts a fluent builder.
    pub fn builder(id: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(id)
    }

    fn assign_slots(&mut self) {
        let mut slots: IndexMap<String, usize> = IndexMap::new();
        for (position, clause) in self.body.iter_mut().enumerate() {
            clause.stamp(position);
            for term in clause.terms_mut() {
                stamp_slot(&mut slots, term);
            }
        }
        let body_vars = slots.len();
        for stmt in &mut self.head {
            for term in stmt.terms_mut() {
                stamp_slot(&mut slots, term);
            }
        }

        for name in slots.keys().skip(body_vars) {
            warn!(
                "rule {}: head variable ?{} is never bound by the body",
                self.id, name
            );
        }
        self.variables = slots
            .into_iter()
            .map(|(name, slot)| {
                let mut var = Variable::new(name);
                var.set_slot(slot);
                var
            })
            .collect();
    }

    /// The rule's identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Body clauses in evaluation order.
    pub fn body(&self) -> &[Clause] {
        &self.body
    }

    /// Head statements.
    pub fn head(&self) -> &[Statement] {
        &self.head
    }

    /// Number of distinct variables.
    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    /// Distinct variables, indexed by slot, each carrying its slot.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }
}

/// Every builtin input must be bound by an earlier pattern or by an earlier
/// mutating builtin's output. Whichever pattern a fact triggers, the join
/// then reaches each builtin with its inputs grounded.
fn check_builtin_inputs(id: &str, body: &[Clause]) -> Result<()> {
    let mut bound: HashSet<&str> = HashSet::new();
    for (position, clause) in body.iter().enumerate() {
        match clause {
            Clause::Pattern(pattern) => bound.extend(
                pattern
                    .statement()
                    .terms()
                    .into_iter()
                    .filter_map(Term::as_variable)
                    .map(Variable::name),
            ),
            Clause::Builtin(builtin) => {
                let args = builtin.args();
                let (inputs, output) = match args.split_last() {
                    Some((last, rest)) if builtin.kind().is_mutating() => (rest, Some(last)),
                    _ => (args, None),
                };
                if let Some(var) = inputs
                    .iter()
                    .filter_map(Term::as_variable)
                    .find(|var| !bound.contains(var.name()))
                {
                    return Err(Error::InvalidRule(format!(
                        "rule {}: builtin {} at position {} reads {} before any earlier clause binds it",
                        id, builtin, position, var
                    )));
                }
                bound.extend(output.and_then(Term::as_variable).map(Variable::name));
            }
        }
    }
    Ok(())
}

fn stamp_slot(slots: &mut IndexMap<String, usize>, term: &mut Term) {
    if let Some(var) = term.as_variable_mut() {
        let next = slots.len();
        let slot = *slots.entry(var.name().to_string()).or_insert(next);
        var.set_slot(slot);
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{} {{ ", self.id)?;
        for (i, clause) in self.body.iter().enumerate() {
            if i > 0 {
                write!(f, " . ")?;
            }
            write!(f, "{}", clause)?;
        }
        write!(f, " }} => {{ ")?;
        for (i, stmt) in self.head.iter().enumerate() {
            if i > 0 {
                write!(f, " . ")?;
            }
            write!(f, "{} {} {}", stmt.subject, stmt.predicate, stmt.object)?;
        }
        write!(f, " }} .")
    }
}

/// A builder for creating `Rule`s using a fluent API.
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    id: String,
    body: Vec<Clause>,
    head: Vec<Statement>,
}

impl RuleBuilder {
    /// Creates a new `RuleBuilder` with a given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: Vec::new(),
            head: Vec::new(),
        }
    }

    /// Appends a triple pattern to the body.
    pub fn when(mut self, pattern: Statement) -> Self {
        self.body.push(Clause::from(pattern));
        self
    }

    /// Appends a builtin to the body.
    pub fn when_builtin(mut self, builtin: Builtin) -> Self {
        self.body.push(Clause::from(builtin));
        self
    }

    /// Appends a statement to the head.
    pub fn then(mut self, head: Statement) -> Self {
        self.head.push(head);
        self
    }

    /// Builds the rule.
    pub fn build(self) -> Result<Rule> {
        Rule::new(self.id, self.body, self.head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BuiltinRegistry;

    fn v(name: &str) -> Term {
        Term::variable(name)
    }

    fn st(s: Term, p: Term, o: Term) -> Statement {
        Statement::new(s, p, o)
    }

    fn slot_of(term: &Term) -> Option<usize> {
        term.as_variable().and_then(|var| var.slot())
    }

    #[test]
    fn test_slot_assignment_first_occurrence() {
        let registry = BuiltinRegistry::standard();
        let rule = Rule::builder("minor")
            .when(st(v("x"), Term::iri("age"), v("a")))
            .when_builtin(
                registry
                    .instantiate("lt", vec![v("a"), Term::literal("18")])
                    .unwrap(),
            )
            .then(st(v("x"), Term::iri("status"), Term::literal("minor")))
            .build()
            .unwrap();

        assert_eq!(rule.num_vars(), 2);
        assert_eq!(rule.variables()[0].name(), "x");
        assert_eq!(rule.variables()[1].name(), "a");
        assert_eq!(rule.variables()[1].slot(), Some(1));

        let Clause::Pattern(first) = &rule.body()[0] else {
            panic!("expected a pattern")
        };
        assert_eq!(slot_of(&first.statement().subject), Some(0));
        assert_eq!(slot_of(&first.statement().object), Some(1));

        let Clause::Builtin(lt) = &rule.body()[1] else {
            panic!("expected a builtin")
        };
        assert_eq!(slot_of(&lt.args()[0]), Some(1));
        assert_eq!(slot_of(&rule.head()[0].subject), Some(0));
    }

    #[test]
    fn test_positions_are_stamped() {
        let rule = Rule::builder("chain")
            .when(st(v("a"), Term::iri("p"), v("b")))
            .when(st(v("b"), Term::iri("p"), v("c")))
            .then(st(v("a"), Term::iri("p2"), v("c")))
            .build()
            .unwrap();
        let positions: Vec<_> = rule.body().iter().map(Clause::position).collect();
        assert_eq!(positions, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_repeated_variable_shares_slot() {
        let rule = Rule::builder("self")
            .when(st(v("x"), Term::iri("knows"), v("x")))
            .then(st(v("x"), Term::iri("type"), Term::iri("Narcissist")))
            .build()
            .unwrap();
        assert_eq!(rule.num_vars(), 1);
    }

    #[test]
    fn test_head_only_variable_gets_slot() {
        let rule = Rule::builder("bad")
            .when(st(v("x"), Term::iri("p"), v("y")))
            .then(st(v("x"), Term::iri("q"), v("z")))
            .build()
            .unwrap();
        assert_eq!(rule.num_vars(), 3);
        assert_eq!(slot_of(&rule.head()[0].object), Some(2));
    }

    #[test]
    fn test_invalid_rules() {
        let empty_body = Rule::builder("r").then(st(v("x"), Term::iri("p"), v("y"))).build();
        assert!(matches!(empty_body, Err(Error::InvalidRule(_))));

        let empty_head = Rule::builder("r").when(st(v("x"), Term::iri("p"), v("y"))).build();
        assert!(matches!(empty_head, Err(Error::InvalidRule(_))));

        let registry = BuiltinRegistry::standard();
        let only_builtins = Rule::builder("r")
            .when_builtin(
                registry
                    .instantiate("eq", vec![Term::literal("1"), Term::literal("1")])
                    .unwrap(),
            )
            .then(st(Term::iri("a"), Term::iri("p"), Term::iri("b")))
            .build();
        assert!(matches!(only_builtins, Err(Error::InvalidRule(_))));
    }

    #[test]
    fn test_builtin_input_bound_later_is_rejected() {
        let registry = BuiltinRegistry::standard();
        let rule = Rule::builder("late")
            .when(st(v("x"), Term::iri("p"), v("a")))
            .when_builtin(registry.instantiate("lt", vec![v("a"), v("b")]).unwrap())
            .when(st(v("x"), Term::iri("q"), v("b")))
            .then(st(v("x"), Term::iri("r"), Term::literal("yes")))
            .build();
        assert!(matches!(rule, Err(Error::InvalidRule(_))));

        let never_bound = Rule::builder("never")
            .when(st(v("x"), Term::iri("p"), v("a")))
            .when_builtin(
                registry
                    .instantiate("concat", vec![v("a"), v("z"), v("out")])
                    .unwrap(),
            )
            .then(st(v("x"), Term::iri("r"), v("out")))
            .build();
        assert!(matches!(never_bound, Err(Error::InvalidRule(_))));
    }

    #[test]
    fn test_builtin_output_feeds_later_builtin() {
        let registry = BuiltinRegistry::standard();
        let rule = Rule::builder("chain")
            .when(st(v("x"), Term::iri("name"), v("n")))
            .when_builtin(
                registry
                    .instantiate("concat", vec![v("n"), Term::literal("!"), v("loud")])
                    .unwrap(),
            )
            .when_builtin(
                registry
                    .instantiate("regex", vec![v("loud"), Term::literal("!$")])
                    .unwrap(),
            )
            .then(st(v("x"), Term::iri("shout"), v("loud")))
            .build();
        assert!(rule.is_ok());
    }

    #[test]
    fn test_display() {
        let registry = BuiltinRegistry::standard();
        let rule = Rule::builder("minor")
            .when(st(v("x"), Term::iri("age"), v("a")))
            .when_builtin(
                registry
                    .instantiate("lt", vec![v("a"), Term::literal("18")])
                    .unwrap(),
            )
            .then(st(v("x"), Term::iri("status"), Term::literal("minor")))
            .build()
            .unwrap();
        assert_eq!(
            rule.to_string(),
            "@minor { ?x <age> ?a . lt(?a, \"18\") } => { ?x <status> \"minor\" } ."
        );
    }
}
