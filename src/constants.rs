//! Constant table and `__NAME__` substitution
//!
//! Constants are declared at the top of a script as `__NAME__ = "value"`.
//! Their values are resolved once, at declaration time, against the
//! constants declared before them. Every later statement is run through
//! [`ConstantTable::substitute`] before it is parsed.

use thiserror::Error;
use tracing::debug;

/// Default number of substitution passes before giving up
pub const DEFAULT_SUBSTITUTION_LIMIT: usize = 10;

const DELIMITER: &str = "__";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstantError {
    #[error("Constant '{0}' declared after the first instruction; constants must come first")]
    DeclaredAfterStatement(String),
    #[error("Constant '{0}' is already defined")]
    Duplicate(String),
    #[error("Invalid constant name: {0:?}")]
    InvalidName(String),
    #[error("Circular constant reference while resolving: {0}")]
    Circular(String),
    #[error("Unresolved constant reference in value: {0}")]
    Unresolved(String),
}

/// Check whether a logical line is a constant declaration
pub fn is_declaration(text: &str) -> bool {
    text.starts_with(DELIMITER) && text.contains('=')
}

/// Split `__NAME__ = "value"` into the bare name and the unquoted raw value.
pub fn parse_declaration(text: &str) -> Result<(String, String), ConstantError> {
    let (lhs, rhs) = text
        .split_once('=')
        .ok_or_else(|| ConstantError::InvalidName(text.to_string()))?;

    let name = lhs.trim().trim_matches('_');
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(ConstantError::InvalidName(lhs.trim().to_string()));
    }

    Ok((name.to_string(), unquote(rhs.trim()).to_string()))
}

/// Strip one layer of matching quotes
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Resolved constants, in declaration order.
#[derive(Debug, Clone)]
pub struct ConstantTable {
    entries: Vec<(String, String)>,
    limit: usize,
    sealed: bool,
}

impl Default for ConstantTable {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSTITUTION_LIMIT)
    }
}

impl ConstantTable {
    pub fn new(limit: usize) -> Self {
        ConstantTable {
            entries: Vec::new(),
            limit: limit.max(1),
            sealed: false,
        }
    }

    /// Look up a resolved constant
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Close the table: any later [`define`](Self::define) fails.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Resolve `raw` against the existing constants and store it under `name`.
    pub fn define(&mut self, name: &str, raw: &str) -> Result<&str, ConstantError> {
        if self.sealed {
            return Err(ConstantError::DeclaredAfterStatement(name.to_string()));
        }
        if self.get(name).is_some() {
            return Err(ConstantError::Duplicate(name.to_string()));
        }

        let resolved = self.substitute(raw)?;
        if resolved.contains(&token(name)) {
            return Err(ConstantError::Circular(raw.to_string()));
        }
        if resolved.contains(DELIMITER) {
            return Err(ConstantError::Unresolved(raw.to_string()));
        }

        debug!(constant = name, value = %resolved, "defined constant");
        self.entries.push((name.to_string(), resolved));
        Ok(&self.entries[self.entries.len() - 1].1)
    }

    /// Replace every `__NAME__` token until the text stops changing.
    pub fn substitute(&self, text: &str) -> Result<String, ConstantError> {
        let mut current = text.to_string();
        for _ in 0..self.limit {
            let mut next = current.clone();
            for (name, value) in &self.entries {
                next = next.replace(&token(name), value);
            }
            if next == current {
                return Ok(current);
            }
            current = next;
        }
        Err(ConstantError::Circular(text.to_string()))
    }
}

fn token(name: &str) -> String {
    format!("{DELIMITER}{name}{DELIMITER}")
}
