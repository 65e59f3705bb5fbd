//! Capture-avoiding term substitution (§4.5), the term-level mirror of
//! `poly_ast::substitute_type`. Grounded on `interpreter.py`'s
//! `_TermSubstitutionVisitor` for the three-case `Lambda` rule:
//!
//! ```text
//! (λx. E)[x := N] = λx. E
//! (λy. E)[x := N] = λy. E[x := N]        if y ∉ FV(N)
//! (λy. E)[x := N] = λz. E[y := z][x := N] otherwise, z fresh
//! ```
//!
//! The filtered source's own `_FreeVarVisitor` only overrides
//! `visit_ForAllType`/`visit_NamedType` — it computes free variables of
//! *types*, not terms, so calling it on `self.new` (a `Term`) the way
//! `_TermSubstitutionVisitor` does would silently collect nothing and never
//! trigger the rename branch. That can't be the intended behavior given
//! spec §8 requires capture-avoidance at the term level as a testable
//! property, so `free_vars_term` below is a direct, correct implementation
//! of term-level free-variable collection rather than a port of the
//! (apparently truncated) source class.

use rustc_hash::FxHashSet;

use poly_ast::Term;
use poly_common::FreshNameGen;

pub fn free_vars_term(term: &Term) -> FxHashSet<String> {
    let mut out = FxHashSet::default();
    let mut bound = Vec::new();
    collect_free_vars(term, &mut bound, &mut out);
    out
}

fn collect_free_vars(term: &Term, bound: &mut Vec<String>, out: &mut FxHashSet<String>) {
    match term {
        Term::Var { name, .. } => {
            if !bound.contains(name) {
                out.insert(name.clone());
            }
        }
        Term::Lit { .. } => {}
        Term::List { elements, .. } => elements.iter().for_each(|e| collect_free_vars(e, bound, out)),
        Term::Record { fields, .. } => fields.values().for_each(|v| collect_free_vars(v, bound, out)),
        Term::Lambda { param_name, body, .. } => {
            bound.push(param_name.clone());
            collect_free_vars(body, bound, out);
            bound.pop();
        }
        Term::TypeLambda { body, .. } => collect_free_vars(body, bound, out),
        Term::App { func, arg, .. } => {
            collect_free_vars(func, bound, out);
            collect_free_vars(arg, bound, out);
        }
        Term::TypeApp { func, .. } => collect_free_vars(func, bound, out),
        Term::FieldAccess { record, .. } => collect_free_vars(record, bound, out),
        Term::Annotated { expr, .. } => collect_free_vars(expr, bound, out),
        Term::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            collect_free_vars(cond, bound, out);
            collect_free_vars(then_branch, bound, out);
            collect_free_vars(else_branch, bound, out);
        }
        Term::Or { left, right, .. }
        | Term::And { left, right, .. }
        | Term::Rel { left, right, .. }
        | Term::Add { left, right, .. }
        | Term::Mul { left, right, .. } => {
            collect_free_vars(left, bound, out);
            collect_free_vars(right, bound, out);
        }
        Term::Not { expr, .. } | Term::Neg { expr, .. } => collect_free_vars(expr, bound, out),
    }
}

/// `body[var := replacement]`.
pub fn substitute_term(var: &str, replacement: &Term, body: Term, fresh: &mut FreshNameGen) -> Term {
    match body {
        Term::Var { name, line } => {
            if name == var {
                replacement.clone()
            } else {
                Term::Var { name, line }
            }
        }
        Term::Lit { .. } => body,
        Term::List { elements, line } => Term::List {
            elements: elements
                .into_iter()
                .map(|e| substitute_term(var, replacement, e, fresh))
                .collect(),
            line,
        },
        Term::Record { fields, line } => Term::Record {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k, substitute_term(var, replacement, v, fresh)))
                .collect(),
            line,
        },
        Term::Lambda {
            param_name,
            param_type,
            body: inner,
            line,
        } => {
            if param_name == var {
                Term::Lambda {
                    param_name,
                    param_type,
                    body: inner,
                    line,
                }
            } else if !free_vars_term(replacement).contains(&param_name) {
                Term::Lambda {
                    param_name,
                    param_type,
                    body: Box::new(substitute_term(var, replacement, *inner, fresh)),
                    line,
                }
            } else {
                let fresh_name = fresh.fresh(&param_name);
                let renamed = substitute_term(
                    &param_name,
                    &Term::Var {
                        name: fresh_name.clone(),
                        line,
                    },
                    *inner,
                    fresh,
                );
                Term::Lambda {
                    param_name: fresh_name,
                    param_type,
                    body: Box::new(substitute_term(var, replacement, renamed, fresh)),
                    line,
                }
            }
        }
        Term::TypeLambda {
            param_name,
            trait_bounds,
            body: inner,
            line,
        } => Term::TypeLambda {
            param_name,
            trait_bounds,
            body: Box::new(substitute_term(var, replacement, *inner, fresh)),
            line,
        },
        Term::App { func, arg, line } => Term::App {
            func: Box::new(substitute_term(var, replacement, *func, fresh)),
            arg: Box::new(substitute_term(var, replacement, *arg, fresh)),
            line,
        },
        Term::TypeApp { func, type_arg, line } => Term::TypeApp {
            func: Box::new(substitute_term(var, replacement, *func, fresh)),
            type_arg,
            line,
        },
        Term::FieldAccess {
            record,
            field_name,
            line,
        } => Term::FieldAccess {
            record: Box::new(substitute_term(var, replacement, *record, fresh)),
            field_name,
            line,
        },
        Term::Annotated { expr, ty, line } => Term::Annotated {
            expr: Box::new(substitute_term(var, replacement, *expr, fresh)),
            ty,
            line,
        },
        Term::If {
            cond,
            then_branch,
            else_branch,
            line,
        } => Term::If {
            cond: Box::new(substitute_term(var, replacement, *cond, fresh)),
            then_branch: Box::new(substitute_term(var, replacement, *then_branch, fresh)),
            else_branch: Box::new(substitute_term(var, replacement, *else_branch, fresh)),
            line,
        },
        Term::Or { left, right, line } => Term::Or {
            left: Box::new(substitute_term(var, replacement, *left, fresh)),
            right: Box::new(substitute_term(var, replacement, *right, fresh)),
            line,
        },
        Term::And { left, right, line } => Term::And {
            left: Box::new(substitute_term(var, replacement, *left, fresh)),
            right: Box::new(substitute_term(var, replacement, *right, fresh)),
            line,
        },
        Term::Not { expr, line } => Term::Not {
            expr: Box::new(substitute_term(var, replacement, *expr, fresh)),
            line,
        },
        Term::Rel { op, left, right, line } => Term::Rel {
            op,
            left: Box::new(substitute_term(var, replacement, *left, fresh)),
            right: Box::new(substitute_term(var, replacement, *right, fresh)),
            line,
        },
        Term::Add { op, left, right, line } => Term::Add {
            op,
            left: Box::new(substitute_term(var, replacement, *left, fresh)),
            right: Box::new(substitute_term(var, replacement, *right, fresh)),
            line,
        },
        Term::Mul { op, left, right, line } => Term::Mul {
            op,
            left: Box::new(substitute_term(var, replacement, *left, fresh)),
            right: Box::new(substitute_term(var, replacement, *right, fresh)),
            line,
        },
        Term::Neg { expr, line } => Term::Neg {
            expr: Box::new(substitute_term(var, replacement, *expr, fresh)),
            line,
        },
    }
}
