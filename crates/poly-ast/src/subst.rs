//! Capture-avoiding type substitution `σ[α := τ]` (§4.3.1), shared by the
//! type resolver (β-reducing `App(ForAll, _)`) and the checker
//! (`TypeApp` elaboration) — in the source both call sites are byte-for-byte
//! copies of the same `TypeSubstitutionVisitor`.
//!
//! The fresh-name counter is supplied by the caller rather than owned here,
//! per §5's "encapsulate the fresh-name counter per pass" — each pass holds
//! its own `FreshNameGen`.

use indexmap::IndexMap;

use poly_common::FreshNameGen;

use crate::types::Type;
use crate::visit::free_type_vars;

/// `body[old_name := new]`.
pub fn substitute_type(old_name: &str, new: &Type, body: &Type, fresh: &mut FreshNameGen) -> Type {
    match body {
        Type::Named(name) => {
            if name == old_name {
                new.clone()
            } else {
                body.clone()
            }
        }
        Type::App(func, arg) => Type::App(
            Box::new(substitute_type(old_name, new, func, fresh)),
            Box::new(substitute_type(old_name, new, arg, fresh)),
        ),
        Type::Arrow(left, right) => Type::Arrow(
            Box::new(substitute_type(old_name, new, left, fresh)),
            Box::new(substitute_type(old_name, new, right, fresh)),
        ),
        Type::List(elem) => {
            Type::List(elem.as_ref().map(|e| Box::new(substitute_type(old_name, new, e, fresh))))
        }
        Type::Record(fields) => {
            let out: IndexMap<String, Type> = fields
                .iter()
                .map(|(label, field_ty)| (label.clone(), substitute_type(old_name, new, field_ty, fresh)))
                .collect();
            Type::Record(out)
        }
        Type::ForAll {
            param_name,
            trait_bounds,
            body: inner,
        } => {
            // (∀α. B)[α := τ] = ∀α. B
            if param_name == old_name {
                body.clone()
            // (∀β. B)[α := τ] = ∀β. B[α := τ]   if β ∉ FV(τ)
            } else if !free_type_vars(new).contains(param_name) {
                Type::ForAll {
                    param_name: param_name.clone(),
                    trait_bounds: trait_bounds.clone(),
                    body: Box::new(substitute_type(old_name, new, inner, fresh)),
                }
            // else pick a fresh γ; ∀γ. (B[β := γ])[α := τ]
            } else {
                let fresh_name = fresh.fresh(param_name);
                let renamed_inner =
                    substitute_type(param_name, &Type::Named(fresh_name.clone()), inner, fresh);
                Type::ForAll {
                    param_name: fresh_name,
                    trait_bounds: trait_bounds.clone(),
                    body: Box::new(substitute_type(old_name, new, &renamed_inner, fresh)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_free_occurrences() {
        let mut fresh = FreshNameGen::new();
        let body = Type::Arrow(
            Box::new(Type::Named("a".into())),
            Box::new(Type::Named("Int".into())),
        );
        let result = substitute_type("a", &Type::Named("String".into()), &body, &mut fresh);
        assert_eq!(
            result,
            Type::Arrow(
                Box::new(Type::Named("String".into())),
                Box::new(Type::Named("Int".into())),
            )
        );
    }

    #[test]
    fn leaves_shadowed_forall_untouched() {
        let mut fresh = FreshNameGen::new();
        let body = Type::ForAll {
            param_name: "a".into(),
            trait_bounds: vec![],
            body: Box::new(Type::Named("a".into())),
        };
        let result = substitute_type("a", &Type::Named("Int".into()), &body, &mut fresh);
        assert_eq!(result, body);
    }

    #[test]
    fn alpha_renames_to_avoid_capture() {
        let mut fresh = FreshNameGen::new();
        // (forall b. b -> a)[a := b]  must not let the substituted `b` be
        // captured by the binder `b`.
        let body = Type::ForAll {
            param_name: "b".into(),
            trait_bounds: vec![],
            body: Box::new(Type::Arrow(
                Box::new(Type::Named("b".into())),
                Box::new(Type::Named("a".into())),
            )),
        };
        let result = substitute_type("a", &Type::Named("b".into()), &body, &mut fresh);
        match result {
            Type::ForAll { param_name, body, .. } => {
                assert_ne!(param_name, "b");
                match *body {
                    Type::Arrow(left, right) => {
                        assert_eq!(*left, Type::Named(param_name.clone()));
                        assert_eq!(*right, Type::Named("b".into()));
                    }
                    other => panic!("expected Arrow, got {other:?}"),
                }
            }
            other => panic!("expected ForAll, got {other:?}"),
        }
    }
}
