//! Terms: the constants and variables that fill a statement's three positions.
//!
//! Constants carry their textual value exactly as the producer wrote it,
//! delimiters included (`<alice>`, `"17"`, `42`). Variables carry a name and,
//! once a rule has been built around them, a dense slot index that is unique
//! within that rule.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single position value in a [`Statement`](crate::Statement).
///
/// # Examples
///
/// ```
/// use trine_graph::Term;
///
/// let alice = Term::iri("alice");
/// let x = Term::variable("x");
///
/// // exact: a constant never equals a variable
/// assert!(!alice.equals(&x, true));
/// // wildcard: a variable matches anything
/// assert!(alice.equals(&x, false));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// An opaque, immutable textual value.
    Constant(String),
    /// A named placeholder, resolved through a rule's binding.
    Variable(Variable),
}

impl Term {
    /// Creates a constant from an already delimited value.
    pub fn constant(value: impl Into<String>) -> Self {
        Self::Constant(value.into())
    }

    /// Creates a bracketed identifier constant, `<value>`.
    pub fn iri(value: impl AsRef<str>) -> Self {
        Self::Constant(format!("<{}>", value.as_ref()))
    }

    /// Creates a quoted string constant, escaping embedded quotes and backslashes.
    pub fn literal(value: impl AsRef<str>) -> Self {
        let mut quoted = String::with_capacity(value.as_ref().len() + 2);
        quoted.push('"');
        for c in value.as_ref().chars() {
            if c == '"' || c == '\\' {
                quoted.push('\\');
            }
            quoted.push(c);
        }
        quoted.push('"');
        Self::Constant(quoted)
    }

    /// Creates an unassigned variable.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(Variable::new(name))
    }

    /// Returns `true` for constants.
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// Returns `true` for variables.
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Returns the constant's raw value, delimiters included.
    pub fn as_constant(&self) -> Option<&str> {
        match self {
            Self::Constant(value) => Some(value),
            Self::Variable(_) => None,
        }
    }

    /// Returns the variable, if this term is one.
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Self::Variable(var) => Some(var),
            Self::Constant(_) => None,
        }
    }

    /// Mutable access to the variable, used when a rule stamps slots.
    pub fn as_variable_mut(&mut self) -> Option<&mut Variable> {
        match self {
            Self::Variable(var) => Some(var),
            Self::Constant(_) => None,
        }
    }

    /// Compares two terms.
    ///
    /// With `exact`, constants compare by value, variables by name, and a
    /// constant never equals a variable. Without `exact` (pattern mode) a
    /// variable on either side matches unconditionally.
    pub fn equals(&self, other: &Term, exact: bool) -> bool {
        match (self, other) {
            (Self::Constant(a), Self::Constant(b)) => a == b,
            (Self::Variable(a), Self::Variable(b)) => !exact || a.name == b.name,
            _ => !exact,
        }
    }

    /// Returns the value without one level of `"..."` or `<...>` delimiters.
    ///
    /// Quoted strings are also unescaped. For variables this is the name.
    pub fn unpacked(&self) -> Cow<'_, str> {
        match self {
            Self::Variable(var) => Cow::Borrowed(&var.name),
            Self::Constant(value) => {
                if value.len() >= 2 && value.starts_with('<') && value.ends_with('>') {
                    Cow::Borrowed(&value[1..value.len() - 1])
                } else if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                    let inner = &value[1..value.len() - 1];
                    if inner.contains('\\') {
                        Cow::Owned(unescape(inner))
                    } else {
                        Cow::Borrowed(inner)
                    }
                } else {
                    Cow::Borrowed(value)
                }
            }
        }
    }

    /// Interprets the unpacked value as a finite number, if it is one.
    ///
    /// Words `f64` parsing accepts (`inf`, `NaN`, ...) are not numbers here.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            Self::Constant(_) => self
                .unpacked()
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite()),
            Self::Variable(_) => None,
        }
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "{}", value),
            Self::Variable(var) => write!(f, "{}", var),
        }
    }
}

impl From<Variable> for Term {
    fn from(var: Variable) -> Self {
        Self::Variable(var)
    }
}

/// A rule variable.
///
/// Identity is the name alone; the slot is bookkeeping stamped by rule
/// construction and does not take part in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    #[serde(skip)]
    slot: Option<usize>,
}

impl Variable {
    /// Creates a variable with no slot yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: None,
        }
    }

    /// The variable's name, without the leading `?`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rule-local slot index, once assigned.
    pub fn slot(&self) -> Option<usize> {
        self.slot
    }

    /// Stamps the rule-local slot index.
    ///
    /// Only rule construction calls this; it runs once per rule over
    /// freshly parsed clauses.
    pub fn set_slot(&mut self, slot: usize) {
        self.slot = Some(slot);
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}
