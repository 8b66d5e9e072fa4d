//! Outbound notification of derived facts.

use trine_graph::Statement;

/// Observes each fact the reasoner derives and asserts.
///
/// Called once per newly asserted fact, in depth-first derivation order.
/// Seed facts and re-derivations of known facts are not reported.
///
/// Any `FnMut(&Statement)` closure is a listener:
///
/// ```
/// use trine_graph::Statement;
/// use trine_logic::InferenceListener;
///
/// let mut count = 0;
/// let mut listener = |_: &Statement| count += 1;
/// # let fact = trine_graph::parse_facts("<a> <p> <b> .").unwrap().remove(0);
/// listener.inference(&fact);
/// assert_eq!(count, 1);
/// ```
pub trait InferenceListener {
    /// Called with the newly asserted fact.
    fn inference(&mut self, fact: &Statement);
}

impl<F> InferenceListener for F
where
    F: FnMut(&Statement),
{
    fn inference(&mut self, fact: &Statement) {
        self(fact)
    }
}
