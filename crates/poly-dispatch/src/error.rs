use std::fmt;

use poly_common::{Diagnostic, Line};

/// Dispatch-time failures, mirroring `dispatcher.py`'s two failure modes:
/// a bare trait field accessor that never got rewritten into a `TypeApp`
/// (`_error` in `visit_NamedExpr`), and a `(trait, type)` pair with no
/// registered dictionary (a `KeyError` on `self.get_inst` in the source).
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    UnsolvedTraitFieldAccessor { name: String, line: Line },
    MissingInstance { trait_name: String, type_param: String, line: Line },
}

impl DispatchError {
    pub fn line(&self) -> Line {
        match self {
            DispatchError::UnsolvedTraitFieldAccessor { line, .. }
            | DispatchError::MissingInstance { line, .. } => *line,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnsolvedTraitFieldAccessor { name, .. } => {
                write!(f, "Unsolved trait field accessor, use '{name} @T' instead")
            }
            DispatchError::MissingInstance { trait_name, type_param, .. } => {
                write!(f, "No instance of '{trait_name}' for '{type_param}'")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<DispatchError> for Diagnostic {
    fn from(err: DispatchError) -> Diagnostic {
        let line = err.line();
        Diagnostic::type_error(line, err.to_string())
    }
}
