//! Error types for material script parsing and registry loading

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// 1-based position of a token inside a material script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SourceLocation {
    /// Line number (starting at 1)
    pub line: usize,
    /// Column number in characters (starting at 1)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new location
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// What went wrong with a single singleton block
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Block does not follow the `singleton Material(name) { ... };` shape
    #[error("malformed block: {reason}")]
    MalformedBlock {
        /// Human readable description of the offending token
        reason: String,
    },

    /// Same property key assigned twice inside one block
    #[error("duplicate key '{key}' (first assigned on line {first_line})")]
    DuplicateKey {
        /// The repeated key, including any layer suffix
        key: String,
        /// Line of the first assignment
        first_line: usize,
    },

    /// Block body never reached its closing `};`
    #[error("unterminated block")]
    UnterminatedBlock,
}

/// A located, per-record parse failure
///
/// Parse errors never abort a load: the offending record is skipped and the
/// error is handed back in the [`LoadReport`](super::LoadReport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_name}:{location}: {kind}{}", record_suffix(.record))]
pub struct ParseError {
    /// Label of the source the error came from (usually a file path)
    pub source_name: String,
    /// Position of the offending token
    pub location: SourceLocation,
    /// Name of the record being parsed, if the header got that far
    pub record: Option<String>,
    /// Failure category
    pub kind: ParseErrorKind,
}

fn record_suffix(record: &Option<String>) -> String {
    record
        .as_ref()
        .map(|name| format!(" in material '{name}'"))
        .unwrap_or_default()
}

/// Whole-source failures surfaced by the registry and loader
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Source could not be read
    #[error("failed to read material source {path:?}: {source}")]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// Level root given to discovery is not a directory
    #[error("material root {0:?} is not a directory")]
    NotADirectory(PathBuf),

    /// Registry configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
