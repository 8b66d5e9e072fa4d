//! Tokenizer shared by the fact and rule syntaxes.
//!
//! Constants keep their delimiters (`<iri>`, `"literal"`), so a token's text
//! can become a [`Term::Constant`] without further processing.

use crate::error::{Error, Result};
use crate::term::Term;
use std::fmt;

/// What a token is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `<...>`, brackets included
    Iri(String),
    /// `"..."`, quotes included, escapes left as written
    Literal(String),
    /// `?name`, without the `?`
    Variable(String),
    /// A bare word: numbers, prefixed names, builtin names
    Word(String),
    /// `@name`, without the `@`
    Label(String),
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `=>`
    Implies,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(s) | Self::Literal(s) | Self::Word(s) => write!(f, "{}", s),
            Self::Variable(name) => write!(f, "?{}", name),
            Self::Label(name) => write!(f, "@{}", name),
            Self::Dot => write!(f, "'.'"),
            Self::Comma => write!(f, "','"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::LBrace => write!(f, "'{{'"),
            Self::RBrace => write!(f, "'}}'"),
            Self::Implies => write!(f, "'=>'"),
        }
    }
}

/// A token and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token itself
    pub kind: TokenKind,
    /// 1-based source line
    pub line: usize,
}

impl Token {
    /// The term this token denotes, if it denotes one.
    pub fn to_term(&self) -> Option<Term> {
        match &self.kind {
            TokenKind::Iri(s) | TokenKind::Literal(s) | TokenKind::Word(s) => {
                Some(Term::constant(s.clone()))
            }
            TokenKind::Variable(name) => Some(Term::variable(name.clone())),
            _ => None,
        }
    }
}

/// Splits `input` into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).run()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

fn is_word_char(c: char) -> bool {
    is_name_char(c) || c == '+'
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn run(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
                continue;
            }
            if c == '#' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }

            let line = self.line;
            let kind = match c {
                '<' => self.iri()?,
                '"' => self.literal()?,
                '?' => {
                    self.bump();
                    TokenKind::Variable(self.name(is_name_char, "variable")?)
                }
                '@' => {
                    self.bump();
                    TokenKind::Label(self.name(is_name_char, "label")?)
                }
                '=' if self.peek_at(1) == Some('>') => {
                    self.pos += 2;
                    TokenKind::Implies
                }
                '.' if !self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => {
                    self.bump();
                    TokenKind::Dot
                }
                ',' => self.single(TokenKind::Comma),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                c if is_word_char(c) => TokenKind::Word(self.name(is_word_char, "word")?),
                other => {
                    return Err(Error::parse(line, format!("unexpected character '{}'", other)))
                }
            };
            tokens.push(Token { kind, line });
        }
        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    /// Reads a run of `accept` chars. A `.` is only taken when another name
    /// char follows it, so `?x.` leaves the dot as a terminator.
    fn name(&mut self, accept: fn(char) -> bool, what: &str) -> Result<String> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !accept(c) {
                break;
            }
            if c == '.' && !self.peek_at(1).is_some_and(|n| accept(n) && n != '.') {
                break;
            }
            out.push(c);
            self.bump();
        }
        if out.is_empty() {
            return Err(Error::parse(self.line, format!("empty {} name", what)));
        }
        Ok(out)
    }

    fn iri(&mut self) -> Result<TokenKind> {
        let line = self.line;
        let mut out = String::new();
        self.bump();
        out.push('<');
        loop {
            match self.bump() {
                Some('>') => break,
                Some(c) if c.is_whitespace() => {
                    return Err(Error::parse(line, "whitespace inside <...>"));
                }
                Some(c) => out.push(c),
                None => return Err(Error::parse(line, "unterminated <...>")),
            }
        }
        out.push('>');
        Ok(TokenKind::Iri(out))
    }

    fn literal(&mut self) -> Result<TokenKind> {
        let line = self.line;
        let mut out = String::new();
        self.bump();
        out.push('"');
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => {
                    out.push('\\');
                    match self.bump() {
                        Some(c) => out.push(c),
                        None => return Err(Error::parse(line, "unterminated string")),
                    }
                }
                Some(c) => out.push(c),
                None => return Err(Error::parse(line, "unterminated string")),
            }
        }
        out.push('"');
        Ok(TokenKind::Literal(out))
    }
}
