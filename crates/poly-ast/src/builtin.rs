//! Recognized built-in names, grounded on `builtin.py`: the checker and
//! evaluator both need to know which identifiers are wired in rather than
//! user-defined, and which `Named` types are primitive rather than aliases.

use crate::types::{is_builtin_type_name, Type, BOOL, INT, STRING};

fn poly_endo() -> Type {
    Type::ForAll {
        param_name: "a".to_string(),
        trait_bounds: Vec::new(),
        body: Box::new(Type::Arrow(
            Box::new(Type::Named("a".to_string())),
            Box::new(Type::Named("a".to_string())),
        )),
    }
}

/// `Γ`-bootstrap: the type each built-in function is seeded with before a
/// program's own statements run.
///
/// `cons` is deliberately absent: it is a fixed desugaring
/// (`\x. \xs. [x] + xs`), expanded by `poly_desugar` before the checker ever
/// sees a `cons` reference, not a primitive with its own `Γ` entry.
pub fn builtin_function_names() -> &'static [&'static str] {
    &[
        "print",
        "println",
        "read",
        "string_to_int",
        "int_to_string",
        "head",
        "tail",
    ]
}

/// Γ entries the checker seeds itself with before a program's own statements
/// run, one per name in `builtin_function_names()`. `print`/`println` are
/// polymorphic in the value they pass through; `read` is a nullary constant
/// (its type is `String`, not an arrow — it is looked up, not applied);
/// `string_to_int`/`int_to_string`/`head`/`tail` are ordinary monomorphic or
/// list-polymorphic arrows.
pub fn builtin_function_types() -> Vec<(&'static str, Type)> {
    let list_a = || Type::List(Some(Box::new(Type::Named("a".to_string()))));
    vec![
        ("print", poly_endo()),
        ("println", poly_endo()),
        ("read", Type::Named(STRING.to_string())),
        (
            "string_to_int",
            Type::Arrow(Box::new(Type::Named(STRING.to_string())), Box::new(Type::Named(INT.to_string()))),
        ),
        (
            "int_to_string",
            Type::Arrow(Box::new(Type::Named(INT.to_string())), Box::new(Type::Named(STRING.to_string()))),
        ),
        (
            "head",
            Type::ForAll {
                param_name: "a".to_string(),
                trait_bounds: Vec::new(),
                body: Box::new(Type::Arrow(Box::new(list_a()), Box::new(Type::Named("a".to_string())))),
            },
        ),
        (
            "tail",
            Type::ForAll {
                param_name: "a".to_string(),
                trait_bounds: Vec::new(),
                body: Box::new(Type::Arrow(Box::new(list_a()), Box::new(list_a()))),
            },
        ),
    ]
}

pub fn bool_type() -> Type {
    Type::Named(BOOL.to_string())
}

pub fn int_type() -> Type {
    Type::Named(INT.to_string())
}

pub fn string_type() -> Type {
    Type::Named(STRING.to_string())
}

pub fn is_builtin_type(ty: &Type) -> bool {
    matches!(ty, Type::Named(name) if is_builtin_type_name(name))
}
