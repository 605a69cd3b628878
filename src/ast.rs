//! Typed instructions
//!
//! Every executable statement parses into one [`Instruction`] before
//! anything runs. Constant declarations never reach this stage; they are
//! consumed by the constant table.

/// How a command body was quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    /// `"..."`: `$var` and `{line}` are interpolated
    Double,
    /// `'...'`: used verbatim
    Single,
}

/// A quoted shell command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandText {
    pub text: String,
    pub quote: Quote,
}

impl CommandText {
    pub fn double(text: impl Into<String>) -> Self {
        CommandText {
            text: text.into(),
            quote: Quote::Double,
        }
    }

    pub fn single(text: impl Into<String>) -> Self {
        CommandText {
            text: text.into(),
            quote: Quote::Single,
        }
    }
}

/// Where a statement's result lines go. All optional, order-free in source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clauses {
    /// `parsewith NAME`
    pub parser: Option<String>,
    /// `output "path"`
    pub output: Option<String>,
    /// `as $name`
    pub stream: Option<String>,
}

/// `run "<command>" [clauses]`
#[derive(Debug, Clone, PartialEq)]
pub struct RunInstruction {
    pub command: String,
    pub clauses: Clauses,
}

/// One `map` input: the variable used in the body and the stream it reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub variable: String,
    pub stream: String,
}

impl Binding {
    /// A variable bound to the stream of the same name
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Binding {
            variable: name.clone(),
            stream: name,
        }
    }
}

/// `map $a $b ... do <body> [clauses]`
#[derive(Debug, Clone, PartialEq)]
pub struct MapInstruction {
    pub inputs: Vec<Binding>,
    pub command: CommandText,
    pub clauses: Clauses,
}

/// `input "<path>" map $v ... do <body> [clauses]`
#[derive(Debug, Clone, PartialEq)]
pub struct InputMapInstruction {
    pub path: String,
    pub variables: Vec<String>,
    pub command: CommandText,
    pub clauses: Clauses,
}

impl InputMapInstruction {
    /// Name of the stream that holds the file's lines
    pub fn stream_name(&self) -> String {
        format!("_input_{}", self.path)
    }

    /// Rewrite as a `map` whose first variable reads the file stream.
    pub fn desugar(&self) -> MapInstruction {
        let stream = self.stream_name();
        let mut variables = self.variables.iter();
        let first = Binding {
            variable: variables.next().cloned().unwrap_or_else(|| stream.clone()),
            stream,
        };

        let mut inputs = vec![first];
        inputs.extend(variables.map(|v| Binding::named(v.clone())));

        MapInstruction {
            inputs,
            command: self.command.clone(),
            clauses: self.clauses.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Run(RunInstruction),
    Map(MapInstruction),
    InputMap(InputMapInstruction),
}
