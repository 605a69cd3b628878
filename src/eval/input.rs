use super::{Interpreter, RunError};
use crate::ast::{InputMapInstruction, MapInstruction};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

impl Interpreter {
    /// Load the file of an `input ... map` statement into its stream and
    /// return the equivalent `map`.
    pub(crate) fn load_input(
        &mut self,
        line: usize,
        input: &InputMapInstruction,
    ) -> Result<MapInstruction, RunError> {
        let contents = fs::read_to_string(&input.path).map_err(|source| RunError::InputFile {
            line,
            path: PathBuf::from(&input.path),
            source,
        })?;

        let lines: Vec<String> = contents.lines().map(String::from).collect();
        debug!(file = %input.path, lines = lines.len(), "loaded input file");
        self.streams.store(&input.stream_name(), lines);

        Ok(input.desugar())
    }
}
