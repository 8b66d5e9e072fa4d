//! Rule syntax
//!
//! ```text
//! # a rule with an explicit id
//! @minor {
//!     ?x <age> ?a .
//!     ?a lt "18"              # binary builtin in triple form
//! } => {
//!     ?x <status> "minor"
//! } .
//!
//! # function form takes any arity; the last argument receives the result
//! { ?p <first> ?f . ?p <last> ?l . concat(?f, " ", ?l, ?n) } => { ?p <name> ?n }
//! ```
//!
//! Rules without an `@id` are named `rule-<n>` by their position in the
//! input, counting from 1.

use std::path::Path;

use log::debug;
use trine_graph::lexer::{tokenize, Token, TokenKind};
use trine_graph::{Statement, Term};

use crate::builtin::{Builtin, BuiltinRegistry};
use crate::error::{Error, Result};
use crate::rule::{Clause, Rule};

/// Parses rule text, resolving builtin names through a registry.
#[derive(Debug, Clone, Copy)]
pub struct RuleParser<'r> {
    registry: &'r BuiltinRegistry,
}

enum Item {
    Triple(Statement),
    Builtin(Builtin),
}

impl<'r> RuleParser<'r> {
    /// Creates a parser over `registry`.
    pub fn new(registry: &'r BuiltinRegistry) -> Self {
        Self { registry }
    }

    /// Parses every rule in `input`.
    pub fn parse(&self, input: &str) -> Result<Vec<Rule>> {
        let tokens = tokenize(input)?;
        let mut cursor = Cursor::new(&tokens);
        let mut rules = Vec::new();
        while !cursor.at_end() {
            let rule = self.rule(&mut cursor, rules.len() + 1)?;
            rules.push(rule);
        }
        Ok(rules)
    }

    /// Reads and parses a rule file.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<Rule>> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)?;
        let rules = self.parse(&input)?;
        debug!("parsed {} rules from {}", rules.len(), path.display());
        Ok(rules)
    }

    fn rule(&self, cursor: &mut Cursor<'_>, ordinal: usize) -> Result<Rule> {
        let id = match cursor.peek_kind() {
            Some(TokenKind::Label(label)) => {
                let label = label.clone();
                cursor.advance();
                label
            }
            _ => format!("rule-{}", ordinal),
        };
        let line = cursor.line();

        cursor.expect(&TokenKind::LBrace)?;
        let body_items = self.block(cursor)?;
        cursor.expect(&TokenKind::Implies)?;
        cursor.expect(&TokenKind::LBrace)?;
        let head_items = self.block(cursor)?;
        if cursor.peek_kind() == Some(&TokenKind::Dot) {
            cursor.advance();
        }

        let body = body_items
            .into_iter()
            .map(|item| match item {
                Item::Triple(stmt) => Clause::from(stmt),
                Item::Builtin(builtin) => Clause::from(builtin),
            })
            .collect();
        let head = head_items
            .into_iter()
            .map(|item| match item {
                Item::Triple(stmt) => Ok(stmt),
                Item::Builtin(builtin) => Err(Error::InvalidRule(format!(
                    "rule {} (line {}): builtin {} is not allowed in a rule head",
                    id, line, builtin
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Rule::new(id, body, head)
    }

    /// Items up to and including the closing brace. The opening brace has
    /// already been consumed.
    fn block(&self, cursor: &mut Cursor<'_>) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        loop {
            match cursor.peek_kind() {
                Some(TokenKind::RBrace) => {
                    cursor.advance();
                    return Ok(items);
                }
                Some(TokenKind::Dot) => {
                    cursor.advance();
                }
                Some(_) => items.push(self.item(cursor)?),
                None => return Err(cursor.eof("expected '}'")),
            }
        }
    }

    fn item(&self, cursor: &mut Cursor<'_>) -> Result<Item> {
        // name(arg, ...)
        if let (Some(TokenKind::Word(name)), Some(TokenKind::LParen)) =
            (cursor.peek_kind(), cursor.peek_kind_at(1))
        {
            let name = name.clone();
            let line = cursor.line();
            cursor.advance();
            cursor.advance();
            let args = self.arguments(cursor)?;
            return self
                .registry
                .instantiate(&name, args)
                .map(Item::Builtin)
                .map_err(|e| at_line(e, line));
        }

        let subject = cursor.term()?;
        let line = cursor.line();
        // s builtin o
        if let Some(TokenKind::Word(name)) = cursor.peek_kind() {
            if self.registry.contains(name) {
                let name = name.clone();
                cursor.advance();
                let object = cursor.term()?;
                return self
                    .registry
                    .instantiate(&name, vec![subject, object])
                    .map(Item::Builtin)
                    .map_err(|e| at_line(e, line));
            }
        }
        let predicate = cursor.term()?;
        let object = cursor.term()?;
        Ok(Item::Triple(Statement::new(subject, predicate, object)))
    }

    fn arguments(&self, cursor: &mut Cursor<'_>) -> Result<Vec<Term>> {
        let mut args = Vec::new();
        if cursor.peek_kind() == Some(&TokenKind::RParen) {
            cursor.advance();
            return Ok(args);
        }
        loop {
            args.push(cursor.term()?);
            match cursor.bump() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => continue,
                Some(Token {
                    kind: TokenKind::RParen,
                    ..
                }) => return Ok(args),
                Some(tok) => {
                    return Err(Error::Parse {
                        line: tok.line,
                        message: format!("expected ',' or ')', found {}", tok.kind),
                    })
                }
                None => return Err(cursor.eof("expected ')'")),
            }
        }
    }
}

/// Attaches a line to builtin resolution errors.
fn at_line(err: Error, line: usize) -> Error {
    match err {
        Error::UnknownBuiltin(name) => Error::UnknownBuiltin(format!("{} (line {})", name, line)),
        other => other,
    }
}

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek_kind(&self) -> Option<&'t TokenKind> {
        self.peek_kind_at(0)
    }

    fn peek_kind_at(&self, offset: usize) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn bump(&mut self) -> Option<&'t Token> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Line of the next token, or of the last one at end of input.
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn eof(&self, message: &str) -> Error {
        Error::Parse {
            line: self.line(),
            message: format!("unexpected end of input: {}", message),
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<()> {
        match self.bump() {
            Some(tok) if &tok.kind == kind => Ok(()),
            Some(tok) => Err(Error::Parse {
                line: tok.line,
                message: format!("expected {}, found {}", kind, tok.kind),
            }),
            None => Err(self.eof(&format!("expected {}", kind))),
        }
    }

    fn term(&mut self) -> Result<Term> {
        match self.bump() {
            Some(tok) => tok.to_term().ok_or_else(|| Error::Parse {
                line: tok.line,
                message: format!("expected a term, found {}", tok.kind),
            }),
            None => Err(self.eof("expected a term")),
        }
    }
}
