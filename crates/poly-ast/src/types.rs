//! The type language (§3.2): base types are spelled as `Type::Named("Int")`
//! etc. — there is no separate `Prim` variant, matching the source where
//! `IntType`/`BoolType`/`StringType` are just distinguished `NamedType`
//! values recognized by name (see `poly_ast::builtin`).

use std::fmt;

use indexmap::IndexMap;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Type {
    /// A base type, alias, or (while still in scope) a bound type variable.
    Named(String),
    /// Type-level application: `F A`.
    App(Box<Type>, Box<Type>),
    /// Function type: domain `->` codomain.
    Arrow(Box<Type>, Box<Type>),
    /// `[T]`. `None` is the placeholder element type the checker assigns an
    /// empty list literal (§9, "Empty-list type").
    List(Option<Box<Type>>),
    /// Field-labeled record type. Order is irrelevant to equality.
    Record(IndexMap<String, Type>),
    ForAll {
        param_name: String,
        trait_bounds: Vec<String>,
        body: Box<Type>,
    },
}

impl Type {
    fn precedence(&self) -> u8 {
        match self {
            Type::ForAll { .. } => 0,
            Type::Arrow(..) => 1,
            Type::App(..) => 2,
            Type::Named(_) | Type::List(_) | Type::Record(_) => 3,
        }
    }

    fn wrap(&self, arg: &Type) -> String {
        if arg.precedence() < self.precedence() {
            format!("({arg})")
        } else {
            format!("{arg}")
        }
    }
}

/// Structural equality. `ForAll` deliberately compares `param_name` and
/// `body` only — trait bounds are not part of the source's `__eq__` for
/// `ForAllType`, so two foralls that bind the same name to the same body
/// but differ in bounds still compare equal. `Record` equality ignores
/// field declaration order (`IndexMap`'s `PartialEq` already does this).
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Named(a), Type::Named(b)) => a == b,
            (Type::App(fa, aa), Type::App(fb, ab)) => fa == fb && aa == ab,
            (Type::Arrow(la, ra), Type::Arrow(lb, rb)) => la == lb && ra == rb,
            (Type::List(a), Type::List(b)) => a == b,
            (Type::Record(a), Type::Record(b)) => a == b,
            (
                Type::ForAll {
                    param_name: pa,
                    body: ba,
                    ..
                },
                Type::ForAll {
                    param_name: pb,
                    body: bb,
                    ..
                },
            ) => pa == pb && ba == bb,
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::App(func, arg) => write!(f, "{} {}", self.wrap(func), self.wrap(arg)),
            Type::Arrow(left, right) => {
                if matches!(**left, Type::Arrow(..)) {
                    write!(f, "({left}) -> {}", self.wrap(right))
                } else {
                    write!(f, "{} -> {}", self.wrap(left), self.wrap(right))
                }
            }
            Type::List(Some(elem)) => write!(f, "[{elem}]"),
            Type::List(None) => write!(f, "[?]"),
            Type::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                write!(f, "}}")
            }
            Type::ForAll {
                param_name,
                trait_bounds,
                body,
            } => {
                if trait_bounds.is_empty() {
                    write!(f, "forall {param_name}. {body}")
                } else {
                    write!(f, "forall {param_name} impl {}. {body}", trait_bounds.join(" + "))
                }
            }
        }
    }
}

/// The three built-in base types (§3.2).
pub const BOOL: &str = "Bool";
pub const INT: &str = "Int";
pub const STRING: &str = "String";

/// The pseudo-type bound to every type-parameter name in the checking
/// environment (§4.3's "sentinel `*`").
pub const KIND_OF_TYPES: &str = "*";

/// The placeholder a `Lambda`'s `param_type` is rewritten to once evaluation
/// has reduced its body (§4.5's "param-type erased to a placeholder") — our
/// `Term::Lambda` always carries a `Type`, never an `Option<Type>`, so the
/// evaluator needs a concrete stand-in rather than `None`. Renders as `?`,
/// matching `Type::List(None)`'s `[?]` rendering for the same "erased/
/// unknown" idea.
pub const ERASED_TYPE: &str = "?";

pub fn is_builtin_type_name(name: &str) -> bool {
    matches!(name, BOOL | INT | STRING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forall_equality_ignores_trait_bounds() {
        let a = Type::ForAll {
            param_name: "a".into(),
            trait_bounds: vec!["Show".into()],
            body: Box::new(Type::Named("a".into())),
        };
        let b = Type::ForAll {
            param_name: "a".into(),
            trait_bounds: vec![],
            body: Box::new(Type::Named("a".into())),
        };
        assert_eq!(a, b);
    }

    #[test]
    fn record_equality_ignores_field_order() {
        let mut fa = IndexMap::new();
        fa.insert("x".to_string(), Type::Named(INT.into()));
        fa.insert("y".to_string(), Type::Named(INT.into()));
        let mut fb = IndexMap::new();
        fb.insert("y".to_string(), Type::Named(INT.into()));
        fb.insert("x".to_string(), Type::Named(INT.into()));
        assert_eq!(Type::Record(fa), Type::Record(fb));
    }

    #[test]
    fn display_matches_source_rendering() {
        let arrow = Type::Arrow(
            Box::new(Type::Named("Int".into())),
            Box::new(Type::Arrow(
                Box::new(Type::Named("Int".into())),
                Box::new(Type::Named("Int".into())),
            )),
        );
        assert_eq!(arrow.to_string(), "Int -> Int -> Int");
    }
}
