use std::fmt;

use poly_common::{Diagnostic, Line};

/// Errors raised while reducing type aliases and type-level application
/// (§4.2), mirroring `type_solver.py`'s two `TypeError` call sites.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    UnknownType { name: String, line: Line },
    ForAllExpected { found: String, line: Line },
}

impl ResolveError {
    pub fn line(&self) -> Line {
        match self {
            ResolveError::UnknownType { line, .. } | ResolveError::ForAllExpected { line, .. } => *line,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnknownType { name, .. } => write!(f, "Unknown type '{name}'"),
            ResolveError::ForAllExpected { found, .. } => {
                write!(f, "For-all type expected, got '{found}'")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<ResolveError> for Diagnostic {
    fn from(err: ResolveError) -> Diagnostic {
        let line = err.line();
        Diagnostic::type_error(line, err.to_string())
    }
}
