//! Generic tree traversal, generalizing the source's `NodeVisitor` /
//! `TransformVisitor` (`visitor.py`) from dynamic-dispatch-by-class-name to
//! two Rust traits with a default, exhaustive-`match` structural recursion.
//! A pass overrides only the node kinds it cares about and calls back into
//! the default for everything else — exactly `generic_visit`'s role.
//!
//! Only `Type` gets a full default-recursing pair here: it is the one tree
//! shape reused verbatim by three independent passes (alias resolution,
//! type-substitution, free-variable collection). `Term` and `Stmt` rewrites
//! differ enough pass to pass (desugaring expands one `Stmt` into several;
//! dispatch rewrites `TypeApp` based on an external table) that each pass
//! writes its own exhaustive `match` directly, the way `mesh-typeck::infer`
//! does for its expression tree.

use std::collections::HashSet;

use crate::types::Type;

/// Read-only traversal over a `Type` tree. Override the hooks you need;
/// anything left alone still gets visited via the default `visit_type`.
pub trait VisitType {
    fn visit_named(&mut self, _name: &str) {}

    fn visit_forall_enter(&mut self, _param_name: &str) {}
    fn visit_forall_exit(&mut self, _param_name: &str) {}

    fn visit_type(&mut self, ty: &Type) {
        match ty {
            Type::Named(name) => self.visit_named(name),
            Type::App(func, arg) => {
                self.visit_type(func);
                self.visit_type(arg);
            }
            Type::Arrow(left, right) => {
                self.visit_type(left);
                self.visit_type(right);
            }
            Type::List(Some(elem)) => self.visit_type(elem),
            Type::List(None) => {}
            Type::Record(fields) => {
                for field_ty in fields.values() {
                    self.visit_type(field_ty);
                }
            }
            Type::ForAll {
                param_name, body, ..
            } => {
                self.visit_forall_enter(param_name);
                self.visit_type(body);
                self.visit_forall_exit(param_name);
            }
        }
    }
}

/// Rebuilding traversal over a `Type` tree: every unhandled variant is
/// reconstructed from its (possibly-transformed) children, mirroring
/// `TransformVisitor.generic_visit`'s `dataclasses.replace`.
pub trait TransformType {
    fn transform_named(&mut self, name: String) -> Type {
        Type::Named(name)
    }

    fn transform_type(&mut self, ty: Type) -> Type {
        match ty {
            Type::Named(name) => self.transform_named(name),
            Type::App(func, arg) => Type::App(
                Box::new(self.transform_type(*func)),
                Box::new(self.transform_type(*arg)),
            ),
            Type::Arrow(left, right) => Type::Arrow(
                Box::new(self.transform_type(*left)),
                Box::new(self.transform_type(*right)),
            ),
            Type::List(elem) => Type::List(elem.map(|e| Box::new(self.transform_type(*e)))),
            Type::Record(fields) => Type::Record(
                fields
                    .into_iter()
                    .map(|(name, ty)| (name, self.transform_type(ty)))
                    .collect(),
            ),
            Type::ForAll {
                param_name,
                trait_bounds,
                body,
            } => Type::ForAll {
                param_name,
                trait_bounds,
                body: Box::new(self.transform_type(*body)),
            },
        }
    }
}

struct FreeTypeVarCollector {
    bound: Vec<String>,
    free: HashSet<String>,
}

impl VisitType for FreeTypeVarCollector {
    fn visit_named(&mut self, name: &str) {
        if !self.bound.contains(&name.to_string()) {
            self.free.insert(name.to_string());
        }
    }

    fn visit_forall_enter(&mut self, param_name: &str) {
        self.bound.push(param_name.to_string());
    }

    fn visit_forall_exit(&mut self, _param_name: &str) {
        self.bound.pop();
    }
}

/// The free type-variable names of `ty`, grounded on `_FreeVarVisitor` in
/// `type_checker.py`. Used by capture-avoiding substitution (§4.3.1) to
/// decide whether a bound name needs fresh-renaming before descending.
pub fn free_type_vars(ty: &Type) -> HashSet<String> {
    let mut collector = FreeTypeVarCollector {
        bound: Vec::new(),
        free: HashSet::new(),
    };
    collector.visit_type(ty);
    collector.free
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_type_vars_excludes_forall_bound_name() {
        let ty = Type::ForAll {
            param_name: "a".into(),
            trait_bounds: vec![],
            body: Box::new(Type::Arrow(
                Box::new(Type::Named("a".into())),
                Box::new(Type::Named("b".into())),
            )),
        };
        let free = free_type_vars(&ty);
        assert!(!free.contains("a"));
        assert!(free.contains("b"));
    }

    struct RenameNamed {
        from: String,
        to: String,
    }

    impl TransformType for RenameNamed {
        fn transform_named(&mut self, name: String) -> Type {
            if name == self.from {
                Type::Named(self.to.clone())
            } else {
                Type::Named(name)
            }
        }
    }

    #[test]
    fn transform_type_rebuilds_nested_named() {
        let ty = Type::List(Some(Box::new(Type::Named("a".into()))));
        let mut r = RenameNamed {
            from: "a".into(),
            to: "b".into(),
        };
        assert_eq!(r.transform_type(ty), Type::List(Some(Box::new(Type::Named("b".into())))));
    }
}
