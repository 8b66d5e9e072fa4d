//! Variable bindings for one rule-firing attempt.
//!
//! A [`Binding`] is a dense array with one slot per rule variable. The join
//! driver never mutates a frame across a branch boundary: it winds up a copy
//! on a [`BindingStack`] before each alternative and unwinds it afterwards,
//! so sibling branches never observe each other's assignments.

use std::fmt;
use trine_graph::{Statement, Term, Variable};

/// Slot array of optional constants, sized by [`Rule::num_vars`](crate::Rule::num_vars).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Binding {
    slots: Vec<Option<Term>>,
}

impl Binding {
    /// Creates a frame with `num_vars` unbound slots.
    pub fn new(num_vars: usize) -> Self {
        Self {
            slots: vec![None; num_vars],
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the frame has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots currently holding a value.
    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// The value bound to `var`, if any.
    pub fn get(&self, var: &Variable) -> Option<&Term> {
        var.slot()
            .and_then(|slot| self.slots.get(slot))
            .and_then(Option::as_ref)
    }

    /// Binds `var` to `value`.
    ///
    /// Returns `false` if the variable has no slot in this frame, if `value`
    /// is not a constant, or if the slot already holds a different constant.
    /// Rebinding to the same constant succeeds.
    pub fn bind_var(&mut self, var: &Variable, value: Term) -> bool {
        if !value.is_constant() {
            return false;
        }
        let Some(slot) = var.slot().and_then(|s| self.slots.get_mut(s)) else {
            return false;
        };
        match slot {
            Some(existing) => *existing == value,
            None => {
                *slot = Some(value);
                true
            }
        }
    }

    /// Binds every variable of `pattern` from the same position of `fact`.
    ///
    /// Constants in `pattern` must equal the fact's terms exactly. Returns
    /// `false` on the first mismatch or conflicting assignment; the frame may
    /// then be partially written, which is why callers bind into a fresh copy.
    pub fn bind(&mut self, pattern: &Statement, fact: &Statement) -> bool {
        pattern
            .terms()
            .into_iter()
            .zip(fact.terms())
            .all(|(p, f)| match p {
                Term::Variable(var) => self.bind_var(var, f.clone()),
                Term::Constant(_) => p == f,
            })
    }

    /// Replaces a bound variable with its value; anything else is returned as is.
    pub fn ground_term(&self, term: &Term) -> Term {
        match term {
            Term::Variable(var) => self.get(var).cloned().unwrap_or_else(|| term.clone()),
            Term::Constant(_) => term.clone(),
        }
    }

    /// Grounds each term of a builtin argument list.
    pub fn ground_terms(&self, terms: &[Term]) -> Vec<Term> {
        terms.iter().map(|t| self.ground_term(t)).collect()
    }

    /// Grounds a statement. Unbound variables pass through unchanged.
    pub fn ground(&self, stmt: &Statement) -> Statement {
        Statement::new(
            self.ground_term(&stmt.subject),
            self.ground_term(&stmt.predicate),
            self.ground_term(&stmt.object),
        )
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match slot {
                Some(term) => write!(f, "{}: {}", i, term)?,
                None => write!(f, "{}: _", i)?,
            }
        }
        write!(f, "]")
    }
}

/// A stack of binding frames for depth-first search.
///
/// The bottom frame is the one the stack was created with and is never
/// popped.
#[derive(Debug, Clone)]
pub struct BindingStack {
    frames: Vec<Binding>,
}

impl BindingStack {
    /// Creates a stack whose root frame is `root`.
    pub fn new(root: Binding) -> Self {
        Self { frames: vec![root] }
    }

    /// Pushes a copy of the current frame.
    pub fn windup(&mut self) {
        let top = self.current().clone();
        self.frames.push(top);
    }

    /// Discards the current frame, returning to its parent.
    ///
    /// Unwinding the root frame is a no-op.
    pub fn unwind(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// The frame the current branch reads and writes.
    pub fn current(&self) -> &Binding {
        // frames is never empty
        &self.frames[self.frames.len() - 1]
    }

    /// Mutable access to the current frame.
    pub fn current_mut(&mut self) -> &mut Binding {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Number of frames, root included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
