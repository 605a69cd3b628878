//! Logical line reconstruction
//!
//! Raw script lines become logical statements: indented lines continue the
//! statement above them, blank lines and `#` comments disappear.

/// One reconstructed statement and the source line it starts on (1-based).
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalLine {
    pub line: usize,
    pub text: String,
}

impl LogicalLine {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        LogicalLine {
            line,
            text: text.into(),
        }
    }
}

fn is_continuation(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}

/// Merge continuation lines into the statement they belong to.
pub fn logical_lines<'a, I>(lines: I) -> Vec<LogicalLine>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut statements = Vec::new();
    let mut current: Option<LogicalLine> = None;

    for (idx, raw) in lines.into_iter().enumerate() {
        let line = raw.trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if is_continuation(line) {
            if let Some(stmt) = current.as_mut() {
                stmt.text.push(' ');
                stmt.text.push_str(trimmed);
                continue;
            }
            // A continuation with nothing above it opens a statement of its own
        }

        if let Some(done) = current.take() {
            statements.push(done);
        }
        current = Some(LogicalLine::new(idx + 1, trimmed));
    }

    if let Some(done) = current {
        statements.push(done);
    }
    statements
}

/// Convenience wrapper over [`logical_lines`] for a whole script.
pub fn split_source(source: &str) -> Vec<LogicalLine> {
    logical_lines(source.lines())
}
