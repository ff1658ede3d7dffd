use nom::{
    IResult,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{map, value},
};
use std::fmt;
use std::iter::Peekable;

use crate::ast::{Atom, Expr, is_letter};
use crate::LispError;

/// Lexical tokens of the canonical dotted-pair dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Atom(&'a str),
    LParen,
    RParen,
    /// Separator between the two components of a pair
    Dot,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Atom(name) => f.write_str(name),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Dot => f.write_str("."),
        }
    }
}

/// A token and the byte offset where it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub token: Token<'a>,
    pub position: usize,
}

/// Scan a single token from the front of the input
fn scan_token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
        value(Token::Dot, char('.')),
        map(take_while1(is_letter), Token::Atom),
    ))(input)
}

/// Lazy token stream over a source string
///
/// Tokens are produced one at a time as the parser asks for them. After a lexical
/// error the stream yields nothing more.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    source: &'a str,
    remaining: &'a str,
    failed: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(source: &'a str) -> Self {
        Tokens {
            source,
            remaining: source,
            failed: false,
        }
    }

    /// Byte offset of the next unread character
    fn offset(&self) -> usize {
        self.source.len() - self.remaining.len()
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Lexeme<'a>, LispError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining.is_empty() {
            return None;
        }

        let position = self.offset();
        match scan_token(self.remaining) {
            Ok((rest, token)) => {
                self.remaining = rest;
                Some(Ok(Lexeme { token, position }))
            }
            Err(_) => {
                self.failed = true;
                let character = self.remaining.chars().next().unwrap_or_default();
                Some(Err(LispError::LexError {
                    character,
                    position,
                }))
            }
        }
    }
}

/// Recursive-descent reader producing one complete expression per call
///
/// Iterating a `Reader` yields successive expressions from concatenated input
/// such as `a(b.c)`, stopping after the first error.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    tokens: Peekable<Tokens<'a>>,
    failed: bool,
}

impl<'a> Reader<'a> {
    pub fn new(source: &'a str) -> Self {
        Reader {
            tokens: Tokens::new(source).peekable(),
            failed: false,
        }
    }

    /// True once every token has been consumed
    pub fn is_exhausted(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    /// Read exactly one expression
    pub fn read_expr(&mut self) -> Result<Expr, LispError> {
        let lexeme = self.next_lexeme("expression")?;
        match lexeme.token {
            Token::Atom(name) => Atom::new(name).map(Expr::Atom),
            Token::LParen => self.read_pair(),
            Token::RParen | Token::Dot => Err(unexpected("expression", lexeme)),
        }
    }

    /// Read the rest of a pair after its opening parenthesis
    ///
    /// A pair whose tail is another pair is followed along the tail spine with a
    /// loop, so reading a long list does not nest a call per element. Only nesting
    /// in head position recurses.
    fn read_pair(&mut self) -> Result<Expr, LispError> {
        let mut heads = Vec::new();
        let tail = loop {
            heads.push(self.read_expr()?);
            self.expect(Token::Dot, "'.'")?;
            if self.next_is(Token::LParen) {
                self.tokens.next();
                continue;
            }
            break self.read_expr()?;
        };
        for _ in 0..heads.len() {
            self.expect(Token::RParen, "')'")?;
        }
        Ok(heads
            .into_iter()
            .rev()
            .fold(tail, |tail, head| Expr::cons(head, tail)))
    }

    fn next_is(&mut self, wanted: Token<'static>) -> bool {
        matches!(self.tokens.peek(), Some(Ok(lexeme)) if lexeme.token == wanted)
    }

    fn expect(&mut self, wanted: Token<'static>, expected: &'static str) -> Result<(), LispError> {
        let lexeme = self.next_lexeme(expected)?;
        if lexeme.token == wanted {
            Ok(())
        } else {
            Err(unexpected(expected, lexeme))
        }
    }

    fn next_lexeme(&mut self, expected: &'static str) -> Result<Lexeme<'a>, LispError> {
        match self.tokens.next() {
            Some(lexeme) => lexeme,
            None => Err(LispError::UnexpectedEof { expected }),
        }
    }
}

impl Iterator for Reader<'_> {
    type Item = Result<Expr, LispError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.is_exhausted() {
            return None;
        }
        let result = self.read_expr();
        self.failed = result.is_err();
        Some(result)
    }
}

fn unexpected(expected: &'static str, lexeme: Lexeme<'_>) -> LispError {
    LispError::SyntaxError {
        expected,
        found: lexeme.token.to_string(),
        position: lexeme.position,
    }
}

/// Parse a complete S-expression from input
///
/// The input must hold exactly one expression in canonical dotted-pair syntax.
pub fn parse(input: &str) -> Result<Expr, LispError> {
    let mut reader = Reader::new(input);
    let expr = reader.read_expr()?;
    match reader.tokens.next() {
        None => Ok(expr),
        Some(Ok(lexeme)) => Err(unexpected("end of input", lexeme)),
        Some(Err(err)) => Err(err),
    }
}
