//! Interface Error Types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the relation access layer.
///
/// Contract violations (cursor overrun, column type mismatch, double
/// registration) are not represented here: they panic. Lookup misses are
/// `Option`s. What remains are failures the host can act on.
#[derive(Error, Debug)]
pub enum InterfaceError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Relation not found in a program
    #[error("Relation '{0}' not found")]
    RelationNotFound(String),

    /// No factory registered under the given name
    #[error("No program registered under '{0}'")]
    ProgramNotFound(String),

    /// Literal value list does not match the relation's arity
    #[error("Relation '{relation}' has arity {expected}, got {actual} values")]
    ArityMismatch {
        relation: String,
        expected: usize,
        actual: usize,
    },

    /// Malformed line in a fact file
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Attribute type tag outside {i, u, f, r, s}
    #[error("Unknown attribute type tag '{0}'")]
    UnknownAttrType(char),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<figment::Error> for InterfaceError {
    fn from(e: figment::Error) -> Self {
        InterfaceError::Config(e.to_string())
    }
}

/// Result type for interface operations
pub type InterfaceResult<T> = Result<T, InterfaceError>;
