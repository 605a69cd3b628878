//! Common test utilities for auryn integration tests

pub use auryn::{Config, Interpreter, RunError, RunReport};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch directory with a `parsers/` folder
pub struct Workspace {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("parsers")).unwrap();
        Workspace { dir }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Display form of a path, for splicing into scripts
    pub fn p(&self, rel: &str) -> String {
        self.path(rel).display().to_string()
    }

    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn parser(&self, name: &str, body: &str) {
        self.write(&format!("parsers/{name}.sh"), body);
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap()
    }

    pub fn config(&self) -> Config {
        Config::default().with_parser_dir(self.path("parsers"))
    }

    /// Run a script against real shells and this workspace's parsers
    pub fn run(&self, source: &str) -> (Interpreter, Result<RunReport, RunError>) {
        let mut interp = Interpreter::new(self.config());
        let result = interp.run_source(source);
        (interp, result)
    }
}

/// Owned lines, for comparisons against stream contents
#[allow(dead_code)]
pub fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
