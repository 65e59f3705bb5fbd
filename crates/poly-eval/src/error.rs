use std::fmt;

use poly_common::{Diagnostic, Line};

/// §7's enumerated runtime errors, plus `InvalidIntLiteral` for
/// `string_to_int` on a non-numeric string — a failure mode the type system
/// cannot rule out (the argument is a `String` of arbitrary content) and
/// which therefore isn't "defensive only" the way an unbound variable is.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    DivisionByZero { line: Line },
    ArithmeticOverflow { op: String, line: Line },
    EmptyListOperation { op: String, line: Line },
    UnboundVariable { name: String, line: Line },
    InvalidIntLiteral { text: String, line: Line },
}

impl EvalError {
    pub fn line(&self) -> Line {
        match self {
            EvalError::DivisionByZero { line }
            | EvalError::ArithmeticOverflow { line, .. }
            | EvalError::EmptyListOperation { line, .. }
            | EvalError::UnboundVariable { line, .. }
            | EvalError::InvalidIntLiteral { line, .. } => *line,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::DivisionByZero { .. } => write!(f, "Division by zero"),
            EvalError::ArithmeticOverflow { op, .. } => write!(f, "'{op}' overflowed an Int"),
            EvalError::EmptyListOperation { op, .. } => write!(f, "'{op}' of an empty list"),
            EvalError::UnboundVariable { name, .. } => write!(f, "Var '{name}' not found"),
            EvalError::InvalidIntLiteral { text, .. } => {
                write!(f, "'{text}' is not a valid Int literal")
            }
        }
    }
}

impl std::error::Error for EvalError {}

impl From<EvalError> for Diagnostic {
    fn from(err: EvalError) -> Diagnostic {
        let line = err.line();
        Diagnostic::runtime_error(line, err.to_string())
    }
}
