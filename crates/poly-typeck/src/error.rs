use std::fmt;

use poly_common::{Diagnostic, Line};

/// Every rule violation from §4.3, mirroring `type_checker.py`'s
/// `TypeCheckerVisitor._error` call sites (each one raises with the same
/// `"Expected '...', got '...'"` shape).
#[derive(Debug, Clone, PartialEq)]
pub enum TypeckError {
    ExpectedBool { found: String, line: Line },
    BranchMismatch { then_ty: String, else_ty: String, line: Line },
    LogicalBothBool { left: String, right: String, line: Line },
    RelEqMismatch { left: String, right: String, line: Line },
    ExpectedInt2 { left: String, right: String, line: Line },
    ExpectedInt1 { found: String, line: Line },
    ExpectedRecord { found: String, line: Line },
    UnknownField { field: String, record: String, line: Line },
    ArrowExpected { found: String, line: Line },
    ArgMismatch { expected: String, found: String, line: Line },
    ForAllExpected { found: String, line: Line },
    AnnotatedMismatch { annotated: String, found: String, line: Line },
    IdentifierIsType { name: String, line: Line },
    UnboundVariable { name: String, line: Line },
    UnsatisfiedTraitBound { ty: String, trait_name: String, line: Line },
    NoUniqueSolution { line: Line },
    ListElementMismatch { expected: String, found: String, line: Line },
}

impl TypeckError {
    pub fn line(&self) -> Line {
        match self {
            TypeckError::ExpectedBool { line, .. }
            | TypeckError::BranchMismatch { line, .. }
            | TypeckError::LogicalBothBool { line, .. }
            | TypeckError::RelEqMismatch { line, .. }
            | TypeckError::ExpectedInt2 { line, .. }
            | TypeckError::ExpectedInt1 { line, .. }
            | TypeckError::ExpectedRecord { line, .. }
            | TypeckError::UnknownField { line, .. }
            | TypeckError::ArrowExpected { line, .. }
            | TypeckError::ArgMismatch { line, .. }
            | TypeckError::ForAllExpected { line, .. }
            | TypeckError::AnnotatedMismatch { line, .. }
            | TypeckError::IdentifierIsType { line, .. }
            | TypeckError::UnboundVariable { line, .. }
            | TypeckError::UnsatisfiedTraitBound { line, .. }
            | TypeckError::NoUniqueSolution { line, .. }
            | TypeckError::ListElementMismatch { line, .. } => *line,
        }
    }
}

impl fmt::Display for TypeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeckError::ExpectedBool { found, .. } => write!(f, "Expected 'Bool', got '{found}'"),
            TypeckError::BranchMismatch { then_ty, else_ty, .. } => {
                write!(f, "Expected '{then_ty}', got '{else_ty}'")
            }
            TypeckError::LogicalBothBool { left, right, .. } => {
                write!(f, "Expected 'Bool', got '{left}' and '{right}'")
            }
            TypeckError::RelEqMismatch { left, right, .. } => {
                write!(f, "Expected '{left}', got '{right}'")
            }
            TypeckError::ExpectedInt2 { left, right, .. } => {
                write!(f, "Expected 'Int', got '{left}' and '{right}'")
            }
            TypeckError::ExpectedInt1 { found, .. } => write!(f, "Expected 'Int', got '{found}'"),
            TypeckError::ExpectedRecord { found, .. } => write!(f, "Expected record, got '{found}'"),
            TypeckError::UnknownField { field, record, .. } => {
                write!(f, "Unknown field '{field}' in {record}")
            }
            TypeckError::ArrowExpected { found, .. } => write!(f, "Arrow type expected, got '{found}'"),
            TypeckError::ArgMismatch { expected, found, .. } => {
                write!(f, "Expected '{expected}', got '{found}'")
            }
            TypeckError::ForAllExpected { found, .. } => {
                write!(f, "For-all type expected, got '{found}'")
            }
            TypeckError::AnnotatedMismatch { annotated, found, .. } => {
                write!(f, "Annotated type '{annotated}', got '{found}'")
            }
            TypeckError::IdentifierIsType { name, .. } => {
                write!(f, "Identifier '{name}' is a type, not a variable")
            }
            TypeckError::UnboundVariable { name, .. } => write!(f, "Unbound variable '{name}'"),
            TypeckError::UnsatisfiedTraitBound { ty, trait_name, .. } => {
                write!(f, "Type '{ty}' does not satisfy trait bound '{trait_name}'")
            }
            TypeckError::NoUniqueSolution { .. } => {
                write!(f, "No unique solution for implicit type application")
            }
            TypeckError::ListElementMismatch { expected, found, .. } => {
                write!(f, "Expected '{expected}', got '{found}'")
            }
        }
    }
}

impl std::error::Error for TypeckError {}

impl From<TypeckError> for Diagnostic {
    fn from(err: TypeckError) -> Diagnostic {
        let line = err.line();
        Diagnostic::type_error(line, err.to_string())
    }
}
