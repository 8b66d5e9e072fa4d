//! Fact syntax: a sequence of `subject predicate object .` lines.
//!
//! ```text
//! # comments run to end of line
//! <alice> <age> "17" .
//! <alice> <knows> <bob> .
//! ex:bob ex:age 21 .
//! ```

use crate::error::{Error, Result};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::statement::Statement;
use crate::term::Term;
use log::debug;
use std::io::Write;
use std::path::Path;

/// Parses facts from text.
///
/// A statement containing a variable is rejected with [`Error::NotAFact`].
pub fn parse_facts(input: &str) -> Result<Vec<Statement>> {
    let tokens = tokenize(input)?;
    let eof_line = tokens.last().map_or(1, |t| t.line);
    let mut facts = Vec::new();
    let mut iter = tokens.iter();

    while let Some(first) = iter.next() {
        let subject = expect_term(Some(first), eof_line)?;
        let predicate = expect_term(iter.next(), eof_line)?;
        let object = expect_term(iter.next(), eof_line)?;
        match iter.next() {
            Some(Token {
                kind: TokenKind::Dot,
                ..
            }) => {}
            Some(tok) => {
                return Err(Error::parse(
                    tok.line,
                    format!("expected '.' after statement, found {}", tok.kind),
                ))
            }
            None => return Err(Error::parse(eof_line, "expected '.' at end of input")),
        }

        let fact = Statement::new(subject, predicate, object);
        if fact.includes_variables() {
            return Err(Error::NotAFact(fact.to_string()));
        }
        facts.push(fact);
    }

    Ok(facts)
}

/// Reads and parses a fact file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Statement>> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path)?;
    let facts = parse_facts(&input)?;
    debug!("parsed {} facts from {}", facts.len(), path.display());
    Ok(facts)
}

/// Writes statements one per line, in the same syntax [`parse_facts`] reads.
pub fn write_facts<'a, W, I>(mut writer: W, statements: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Statement>,
{
    for stmt in statements {
        writeln!(writer, "{}", stmt)?;
    }
    Ok(())
}

fn expect_term(token: Option<&Token>, eof_line: usize) -> Result<Term> {
    match token {
        Some(tok) => tok.to_term().ok_or_else(|| {
            Error::parse(tok.line, format!("expected a term, found {}", tok.kind))
        }),
        None => Err(Error::parse(eof_line, "unexpected end of input inside statement")),
    }
}
