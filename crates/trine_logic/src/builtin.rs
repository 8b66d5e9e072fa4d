//! Builtin predicates
//!
//! A builtin is a body clause computed rather than looked up in the store.
//! Two capabilities exist:
//! - Functional builtins test their grounded arguments and never bind
//!   (`lt`, `le`, `eq`, `ge`, `gt`, `ne`, `regex`)
//! - Mutating builtins compute a value from every argument but the last, then
//!   bind the last argument or check it against the result (`concat`)
//!
//! Builtins are resolved by name through a [`BuiltinRegistry`], which is
//! built once and handed by reference to the rule parser.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;
use log::warn;
use trine_graph::Term;

use crate::binding::Binding;
use crate::error::{Error, Result};

/// A pure test over grounded arguments.
pub type FunctionalFn = fn(&[Term]) -> bool;

/// Computes a value from grounded input arguments; `None` means failure.
pub type MutatingFn = fn(&[Term]) -> Option<Term>;

/// The two builtin capabilities.
#[derive(Clone, Copy)]
pub enum BuiltinKind {
    /// Boolean test, never binds.
    Functional(FunctionalFn),
    /// Computes into its trailing argument.
    Mutating(MutatingFn),
}

impl BuiltinKind {
    /// Returns `true` for mutating builtins.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Mutating(_))
    }
}

impl fmt::Debug for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Functional(_) => write!(f, "Functional"),
            Self::Mutating(_) => write!(f, "Mutating"),
        }
    }
}

/// Number of arguments a builtin accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many.
    Exact(usize),
    /// This many or more.
    AtLeast(usize),
}

impl Arity {
    /// Returns `true` if `n` arguments are acceptable.
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Self::Exact(k) => n == k,
            Self::AtLeast(k) => n >= k,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(k) => write!(f, "{}", k),
            Self::AtLeast(k) => write!(f, "at least {}", k),
        }
    }
}

/// A builtin clause: a registered builtin applied to an argument list.
#[derive(Debug, Clone)]
pub struct Builtin {
    name: String,
    kind: BuiltinKind,
    args: Vec<Term>,
    position: Option<usize>,
}

impl Builtin {
    /// The registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The builtin's capability.
    pub fn kind(&self) -> BuiltinKind {
        self.kind
    }

    /// Arguments as written in the rule.
    pub fn args(&self) -> &[Term] {
        &self.args
    }

    pub(crate) fn args_mut(&mut self) -> &mut [Term] {
        &mut self.args
    }

    /// Zero-based position in the owning rule's body, once the rule is built.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = Some(position);
    }

    /// Evaluates the builtin over `grounded` arguments.
    ///
    /// # Arguments
    ///
    /// * `grounded` - This builtin's arguments after grounding against `binding`.
    /// * `binding` - The current frame; only mutating builtins write to it.
    ///
    /// # Returns
    ///
    /// `true` if the clause is satisfied. An argument that is still a variable
    /// where a value is needed makes the clause fail; it never panics.
    pub fn evaluate(&self, grounded: &[Term], binding: &mut Binding) -> bool {
        match self.kind {
            BuiltinKind::Functional(test) => {
                if let Some(unbound) = grounded.iter().find(|t| t.is_variable()) {
                    warn!("builtin {}: argument {} is unbound", self.name, unbound);
                    return false;
                }
                test(grounded)
            }
            BuiltinKind::Mutating(compute) => {
                let Some((output, inputs)) = grounded.split_last() else {
                    return false;
                };
                if let Some(unbound) = inputs.iter().find(|t| t.is_variable()) {
                    warn!("builtin {}: input {} is unbound", self.name, unbound);
                    return false;
                }
                let Some(result) = compute(inputs) else {
                    return false;
                };
                match output {
                    Term::Variable(var) => binding.bind_var(var, result),
                    Term::Constant(_) => output.equals(&result, true),
                }
            }
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, Copy)]
struct BuiltinDef {
    kind: BuiltinKind,
    arity: Arity,
}

/// Name-keyed table of available builtins.
///
/// # Examples
///
/// ```
/// use trine_graph::Term;
/// use trine_logic::BuiltinRegistry;
///
/// let registry = BuiltinRegistry::standard();
/// assert!(registry.contains("lt"));
///
/// let lt = registry
///     .instantiate("lt", vec![Term::variable("age"), Term::literal("18")])
///     .unwrap();
/// assert_eq!(lt.to_string(), "lt(?age, \"18\")");
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuiltinRegistry {
    entries: IndexMap<String, BuiltinDef>,
}

impl BuiltinRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the standard comparison, regex and concat builtins.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        let binary = Arity::Exact(2);
        registry.register("lt", BuiltinKind::Functional(lt), binary);
        registry.register("le", BuiltinKind::Functional(le), binary);
        registry.register("eq", BuiltinKind::Functional(eq), binary);
        registry.register("ge", BuiltinKind::Functional(ge), binary);
        registry.register("gt", BuiltinKind::Functional(gt), binary);
        registry.register("ne", BuiltinKind::Functional(ne), binary);
        registry.register("regex", BuiltinKind::Functional(regex_match), binary);
        registry.register("concat", BuiltinKind::Mutating(concat), Arity::AtLeast(2));
        registry
    }

    /// Adds or replaces a builtin.
    pub fn register(&mut self, name: impl Into<String>, kind: BuiltinKind, arity: Arity) {
        self.entries.insert(name.into(), BuiltinDef { kind, arity });
    }

    /// Looks up a builtin's capability and arity.
    pub fn get(&self, name: &str) -> Option<(BuiltinKind, Arity)> {
        self.entries.get(name).map(|def| (def.kind, def.arity))
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered builtins.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a builtin clause, checking the name and argument count.
    pub fn instantiate(&self, name: &str, args: Vec<Term>) -> Result<Builtin> {
        let def = self
            .entries
            .get(name)
            .ok_or_else(|| Error::UnknownBuiltin(name.to_string()))?;
        if !def.arity.accepts(args.len()) {
            return Err(Error::BuiltinArity {
                name: name.to_string(),
                expected: def.arity.to_string(),
                found: args.len(),
            });
        }
        Ok(Builtin {
            name: name.to_string(),
            kind: def.kind,
            args,
            position: None,
        })
    }
}

/// Numeric when both sides parse as numbers, lexical otherwise.
fn compare(a: &Term, b: &Term) -> Ordering {
    if let (Some(x), Some(y)) = (a.numeric(), b.numeric()) {
        if let Some(ord) = x.partial_cmp(&y) {
            return ord;
        }
    }
    a.unpacked().cmp(&b.unpacked())
}

fn lt(args: &[Term]) -> bool {
    compare(&args[0], &args[1]) == Ordering::Less
}

fn le(args: &[Term]) -> bool {
    compare(&args[0], &args[1]) != Ordering::Greater
}

fn eq(args: &[Term]) -> bool {
    compare(&args[0], &args[1]) == Ordering::Equal
}

fn ge(args: &[Term]) -> bool {
    compare(&args[0], &args[1]) != Ordering::Less
}

fn gt(args: &[Term]) -> bool {
    compare(&args[0], &args[1]) == Ordering::Greater
}

fn ne(args: &[Term]) -> bool {
    !eq(args)
}

fn regex_match(args: &[Term]) -> bool {
    let pattern = args[1].unpacked();
    match regex::Regex::new(&pattern) {
        Ok(re) => re.is_match(&args[0].unpacked()),
        Err(e) => {
            warn!("regex: invalid pattern {}: {}", pattern, e);
            false
        }
    }
}

fn concat(inputs: &[Term]) -> Option<Term> {
    let joined: String = inputs.iter().map(|t| t.unpacked()).collect();
    Some(Term::literal(joined))
}
