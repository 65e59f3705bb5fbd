//! "Simple first-argument unification" (§4.3): given a polymorphic
//! function's domain type (possibly mentioning the bound variable `α`
//! nested inside arrows/applications/lists/records) and a concrete argument
//! type, find the unique `σ` such that `domain[α := σ] = argument`.
//!
//! This is deliberately not a general Hindley-Milner unifier: there is
//! exactly one flexible variable (`α`), it is never unified against another
//! flexible variable, and there is no occurs-check bookkeeping across a
//! union-find table — a single accumulated binding, checked for consistency
//! on every further occurrence, is enough.

use poly_ast::Type;

/// Returns `Some(σ)` if `pattern[var := σ] == concrete` has a (unique, as far
/// as this pass can tell) solution, `None` otherwise.
pub fn unify_first_arg(var: &str, pattern: &Type, concrete: &Type) -> Option<Type> {
    let mut binding: Option<Type> = None;
    if try_unify(var, pattern, concrete, &mut binding) {
        binding
    } else {
        None
    }
}

fn try_unify(var: &str, pattern: &Type, concrete: &Type, binding: &mut Option<Type>) -> bool {
    match pattern {
        Type::Named(name) if name == var => match binding {
            None => {
                *binding = Some(concrete.clone());
                true
            }
            Some(bound) => bound == concrete,
        },
        Type::App(pf, pa) => match concrete {
            Type::App(cf, ca) => try_unify(var, pf, cf, binding) && try_unify(var, pa, ca, binding),
            _ => false,
        },
        Type::Arrow(pl, pr) => match concrete {
            Type::Arrow(cl, cr) => try_unify(var, pl, cl, binding) && try_unify(var, pr, cr, binding),
            _ => false,
        },
        Type::List(Some(pe)) => match concrete {
            Type::List(Some(ce)) => try_unify(var, pe, ce, binding),
            Type::List(None) => true,
            _ => false,
        },
        Type::List(None) => matches!(concrete, Type::List(_)),
        Type::Record(pf) => match concrete {
            Type::Record(cf) => {
                pf.len() == cf.len()
                    && pf
                        .iter()
                        .all(|(label, pv)| cf.get(label).is_some_and(|cv| try_unify(var, pv, cv, binding)))
            }
            _ => false,
        },
        Type::ForAll {
            param_name: pn,
            body: pb,
            ..
        } => match concrete {
            Type::ForAll {
                param_name: cn,
                body: cb,
                ..
            } if pn == cn => try_unify(var, pb, cb, binding),
            _ => false,
        },
        _ => pattern == concrete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Type {
        Type::Named(name.into())
    }

    #[test]
    fn binds_the_variable_directly() {
        assert_eq!(unify_first_arg("a", &named("a"), &named("Int")), Some(named("Int")));
    }

    #[test]
    fn unifies_through_nested_structure() {
        let pattern = Type::List(Some(Box::new(named("a"))));
        let concrete = Type::List(Some(Box::new(named("String"))));
        assert_eq!(unify_first_arg("a", &pattern, &concrete), Some(named("String")));
    }

    #[test]
    fn rejects_inconsistent_occurrences() {
        let pattern = Type::Arrow(Box::new(named("a")), Box::new(named("a")));
        let concrete = Type::Arrow(Box::new(named("Int")), Box::new(named("String")));
        assert_eq!(unify_first_arg("a", &pattern, &concrete), None);
    }

    #[test]
    fn rejects_structural_mismatch_outside_the_variable() {
        let pattern = Type::Arrow(Box::new(named("Int")), Box::new(named("a")));
        let concrete = Type::Arrow(Box::new(named("String")), Box::new(named("Bool")));
        assert_eq!(unify_first_arg("a", &pattern, &concrete), None);
    }
}
