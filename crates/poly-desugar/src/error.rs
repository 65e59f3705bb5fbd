use std::fmt;

use poly_common::{Diagnostic, Line};

/// Errors raised while eliminating `Trait`/`Struct`/`Impl` (§4.1). These are
/// reported as `TypeError`s per §7 — desugaring is a syntactic rewrite, but
/// the source raises these through the same `TypeError` constructor the
/// checker uses, and §7 doesn't carve out a separate category for it.
#[derive(Debug, Clone, PartialEq)]
pub enum DesugarError {
    DuplicateField {
        owner: String,
        field: String,
        line: Line,
    },
    /// A `trait` statement bound a number of type parameters other than
    /// exactly one (§4.1: "A trait must bind exactly one type parameter").
    TraitArity {
        name: String,
        found: usize,
        line: Line,
    },
    /// A trait field's type mentions the trait's own type variable under a
    /// nested quantifier (§9, "non-prenex position").
    NonPrenexSelfReference {
        trait_name: String,
        type_param: String,
        field: String,
        line: Line,
    },
}

impl DesugarError {
    pub fn line(&self) -> Line {
        match self {
            DesugarError::DuplicateField { line, .. }
            | DesugarError::TraitArity { line, .. }
            | DesugarError::NonPrenexSelfReference { line, .. } => *line,
        }
    }
}

impl fmt::Display for DesugarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesugarError::DuplicateField { owner, field, .. } => {
                write!(f, "Duplicate field name '{field}' in '{owner}'")
            }
            DesugarError::TraitArity { name, found, .. } => write!(
                f,
                "Trait '{name}' must bind exactly one type parameter, found {found}"
            ),
            DesugarError::NonPrenexSelfReference {
                trait_name,
                type_param,
                field,
                ..
            } => write!(
                f,
                "Field '{field}' of trait '{trait_name}' mentions type variable '{type_param}' under a nested quantifier"
            ),
        }
    }
}

impl std::error::Error for DesugarError {}

impl From<DesugarError> for Diagnostic {
    fn from(err: DesugarError) -> Diagnostic {
        let line = err.line();
        Diagnostic::type_error(line, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        let err = DesugarError::TraitArity {
            name: "Show".into(),
            found: 2,
            line: 3,
        };
        assert_eq!(
            err.to_string(),
            "Trait 'Show' must bind exactly one type parameter, found 2"
        );
    }
}
