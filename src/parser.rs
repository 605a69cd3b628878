//! Parser for auryn statements
//!
//! Turns the tokens of one (already constant-substituted) logical statement
//! into a typed [`Instruction`]. Trailing clauses are accepted in any order.

use crate::ast::{
    Binding, Clauses, CommandText, InputMapInstruction, Instruction, MapInstruction, Quote,
    RunInstruction,
};
use crate::lexer::{lex, LexError, Token};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{0}")]
    Lex(#[from] LexError),
    #[error("Empty statement")]
    EmptyStatement,
    #[error("Unknown instruction: {0}")]
    UnknownInstruction(String),
    #[error("'{0}' needs a quoted command")]
    MissingCommand(&'static str),
    #[error("Expected 'do' after map inputs")]
    MissingDo,
    #[error("Expected a $stream before 'do', got {0:?}")]
    ExpectedVariable(Token),
    #[error("'{0}' clause is missing its argument")]
    MissingArgument(&'static str),
    #[error("'{0}' clause given more than once")]
    DuplicateClause(&'static str),
    #[error("Unexpected token: {0:?}")]
    UnexpectedToken(Token),
    #[error("Single-quoted command cannot contain variables or {{line}}: '{0}'")]
    QuotingContract(String),
    #[error("Malformed input-map statement: {statement} ({reason})")]
    MalformedInputMap { statement: String, reason: String },
}

impl ParseError {
    /// Errors that abort the whole run instead of skipping one statement
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ParseError::QuotingContract(_) | ParseError::MalformedInputMap { .. }
        )
    }
}

/// Parser state
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the bare word `keyword` if it is next
    fn eat_word(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_word(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Parse one statement
    pub fn parse(&mut self) -> Result<Instruction, ParseError> {
        match self.advance() {
            None => Err(ParseError::EmptyStatement),
            Some(Token::Word(w)) if w == "run" => self.parse_run().map(Instruction::Run),
            Some(Token::Word(w)) if w == "map" => self.parse_map().map(Instruction::Map),
            Some(Token::Word(w)) if w == "input" => self.parse_input().map(Instruction::InputMap),
            Some(Token::Word(w)) => Err(ParseError::UnknownInstruction(w)),
            Some(other) => Err(ParseError::UnexpectedToken(other)),
        }
    }

    fn parse_run(&mut self) -> Result<RunInstruction, ParseError> {
        let command = match self.advance() {
            Some(Token::DoubleQuoted(s)) | Some(Token::SingleQuoted(s)) => s,
            _ => return Err(ParseError::MissingCommand("run")),
        };
        let clauses = self.parse_clauses()?;
        Ok(RunInstruction { command, clauses })
    }

    fn parse_map(&mut self) -> Result<MapInstruction, ParseError> {
        let inputs = self
            .parse_variables()?
            .into_iter()
            .map(Binding::named)
            .collect();
        let (command, clauses) = self.parse_body()?;
        Ok(MapInstruction {
            inputs,
            command,
            clauses,
        })
    }

    fn parse_input(&mut self) -> Result<InputMapInstruction, ParseError> {
        let path = match self.advance() {
            Some(Token::DoubleQuoted(s)) => s,
            _ => return Err(malformed("expected a quoted file path")),
        };
        if !self.eat_word("map") {
            return Err(malformed("expected 'map' after the file path"));
        }
        let variables = self.parse_variables().map_err(|e| malformed(&e.to_string()))?;
        let (command, clauses) = self.parse_body().map_err(|e| match e {
            ParseError::QuotingContract(_) => e,
            other => malformed(&other.to_string()),
        })?;
        Ok(InputMapInstruction {
            path,
            variables,
            command,
            clauses,
        })
    }

    /// `$a $b ... do`
    fn parse_variables(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = Vec::new();
        loop {
            match self.advance() {
                Some(Token::Variable(name)) => names.push(name),
                Some(t) if t.is_word("do") => return Ok(names),
                Some(other) => return Err(ParseError::ExpectedVariable(other)),
                None => return Err(ParseError::MissingDo),
            }
        }
    }

    /// The quoted command after `do`, then the clauses
    fn parse_body(&mut self) -> Result<(CommandText, Clauses), ParseError> {
        let command = match self.advance() {
            Some(Token::DoubleQuoted(s)) => CommandText::double(s),
            Some(Token::SingleQuoted(s)) => CommandText::single(s),
            _ => return Err(ParseError::MissingCommand("do")),
        };
        if command.quote == Quote::Single && interpolates(&command.text) {
            return Err(ParseError::QuotingContract(command.text));
        }
        let clauses = self.parse_clauses()?;
        Ok((command, clauses))
    }

    fn parse_clauses(&mut self) -> Result<Clauses, ParseError> {
        let mut clauses = Clauses::default();

        while let Some(keyword) = self.advance() {
            if keyword.is_word("parsewith") {
                let name = match self.advance() {
                    Some(Token::Word(name)) => name,
                    _ => return Err(ParseError::MissingArgument("parsewith")),
                };
                set_once(&mut clauses.parser, name, "parsewith")?;
            } else if keyword.is_word("output") {
                let path = match self.advance() {
                    Some(Token::DoubleQuoted(p)) | Some(Token::SingleQuoted(p)) => p,
                    _ => return Err(ParseError::MissingArgument("output")),
                };
                set_once(&mut clauses.output, path, "output")?;
            } else if keyword.is_word("as") {
                let name = match self.advance() {
                    Some(Token::Variable(name)) => name,
                    _ => return Err(ParseError::MissingArgument("as")),
                };
                set_once(&mut clauses.stream, name, "as")?;
            } else {
                return Err(ParseError::UnexpectedToken(keyword));
            }
        }

        Ok(clauses)
    }
}

fn set_once(slot: &mut Option<String>, value: String, clause: &'static str) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::DuplicateClause(clause));
    }
    *slot = Some(value);
    Ok(())
}

fn malformed(reason: &str) -> ParseError {
    ParseError::MalformedInputMap {
        statement: String::new(),
        reason: reason.to_string(),
    }
}

/// True if `text` contains a `$name` reference or `{line}`
pub fn interpolates(text: &str) -> bool {
    if text.contains("{line}") {
        return true;
    }
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' && chars.peek().is_some_and(|n| n.is_alphanumeric() || *n == '_') {
            return true;
        }
    }
    false
}

/// Parse one logical statement
pub fn parse_statement(text: &str) -> Result<Instruction, ParseError> {
    let is_input = text.starts_with("input");
    let result = lex(text)
        .map_err(ParseError::from)
        .and_then(|tokens| Parser::new(tokens).parse());

    match result {
        Err(ParseError::MalformedInputMap { reason, .. }) => Err(ParseError::MalformedInputMap {
            statement: text.to_string(),
            reason,
        }),
        Err(ParseError::Lex(e)) if is_input => Err(ParseError::MalformedInputMap {
            statement: text.to_string(),
            reason: e.to_string(),
        }),
        other => other,
    }
}
