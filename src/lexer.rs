//! Tokenization for auryn statements
//!
//! A statement is a flat run of bare words, `$name` stream references and
//! quoted strings. Quoted strings keep their raw contents (apart from `\"`)
//! because they are handed to a shell unchanged.

use nom::{
    branch::alt,
    bytes::complete::{escaped, take_while, take_while1},
    character::complete::{anychar, char, multispace0, none_of},
    combinator::{map, opt},
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A bare word (keyword, parser name, ...)
    Word(String),
    /// Stream reference: $name
    Variable(String),
    /// A double-quoted string
    DoubleQuoted(String),
    /// A single-quoted string
    SingleQuoted(String),
}

impl Token {
    /// True if this token is the bare word `keyword`
    pub fn is_word(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w == keyword)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("Unexpected character: {0}")]
    UnexpectedChar(char),
    #[error("Unterminated string")]
    UnterminatedString,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parse a double-quoted string
fn double_quoted_string(input: &str) -> IResult<&str, Token> {
    let (input, content) = delimited(
        char('"'),
        map(
            opt(escaped(none_of("\"\\"), '\\', anychar)),
            |o: Option<&str>| o.unwrap_or(""),
        ),
        char('"'),
    )(input)?;
    Ok((input, Token::DoubleQuoted(content.replace("\\\"", "\""))))
}

/// Parse a single-quoted string
fn single_quoted_string(input: &str) -> IResult<&str, Token> {
    let (input, content) = delimited(char('\''), take_while(|c: char| c != '\''), char('\''))(input)?;
    Ok((input, Token::SingleQuoted(content.to_string())))
}

/// Parse a stream reference: $name
fn variable(input: &str) -> IResult<&str, Token> {
    map(preceded(char('$'), take_while1(is_ident_char)), |s: &str| {
        Token::Variable(s.to_string())
    })(input)
}

/// Parse a bare word
fn word(input: &str) -> IResult<&str, Token> {
    map(
        take_while1(|c: char| !c.is_whitespace() && c != '"' && c != '\''),
        |s: &str| Token::Word(s.to_string()),
    )(input)
}

/// Parse any single token
fn token(input: &str) -> IResult<&str, Token> {
    preceded(
        multispace0,
        alt((double_quoted_string, single_quoted_string, variable, word)),
    )(input)
}

/// Tokenize one logical statement
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    let (remaining, tokens) = match many0(token)(input) {
        Ok(parsed) => parsed,
        Err(_) => return Err(LexError::UnexpectedChar(input.chars().next().unwrap_or(' '))),
    };

    let remaining = remaining.trim_start();
    match remaining.chars().next() {
        None => Ok(tokens),
        Some('"') | Some('\'') => Err(LexError::UnterminatedString),
        Some(c) => Err(LexError::UnexpectedChar(c)),
    }
}
