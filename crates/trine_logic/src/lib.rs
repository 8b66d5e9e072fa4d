//! Trine Logic - Incremental Forward-Chaining Reasoner
//!
//! This crate derives the logical consequences of facts under a fixed set of
//! rules, one new fact at a time. Each assertion triggers exactly the rules
//! whose body can use it, joins the rest of those bodies against the store,
//! and asserts whatever new facts result until nothing more follows.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Trine Logic                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │          KnowledgeBase  (store + reasoner)            │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                     Reasoner                          │   │
//! │  │  Clause index │ Backtracking join │ Head firing       │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │  Rule / Clause  │  Binding stack  │  Builtin registry │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use trine_graph::parse_facts;
//! use trine_logic::{BuiltinRegistry, KnowledgeBase, RuleParser};
//!
//! let registry = BuiltinRegistry::standard();
//! let rules = RuleParser::new(&registry).parse(
//!     r#"@minor { ?x <age> ?a . ?a lt "18" } => { ?x <status> "minor" } ."#,
//! )?;
//!
//! let mut kb = KnowledgeBase::with_rules(rules);
//! kb.extend(parse_facts(r#"<alice> <age> "17" . <bob> <age> "21" ."#)?)?;
//!
//! assert_eq!(kb.len(), 3);
//! # Ok::<(), trine_logic::Error>(())
//! ```

pub mod binding;
pub mod builtin;
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod listener;
pub mod parser;
pub mod rule;

// Re-exports
pub use binding::{Binding, BindingStack};
pub use builtin::{Arity, Builtin, BuiltinKind, BuiltinRegistry, FunctionalFn, MutatingFn};
pub use engine::{ClauseRef, Reasoner, ReasonerStats};
pub use error::{Error, Result};
pub use knowledge::KnowledgeBase;
pub use listener::InferenceListener;
pub use parser::RuleParser;
pub use rule::{Clause, Pattern, Rule, RuleBuilder};

/// Version of the logic crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
