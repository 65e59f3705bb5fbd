//! Dictionary-passing elaboration (§4.4), grounded on `dispatcher.py`'s
//! `DispatcherVisitor` line for line: `which_trait` maps a trait field name
//! to the trait that declares it, `get_inst` maps `(trait, instance type)`
//! to the dictionary expression an `impl` registered for it.
//!
//! `Type` has no `Hash`/`Eq` impl (only the structural `PartialEq` in
//! `poly_ast::types`), so `get_inst` is keyed on `(trait_name,
//! type_param.to_string())` rather than on `Type` directly — `Display`
//! renders a type canonically enough for this purpose, since every instance
//! type reaching this pass is the ground (non-variable) argument of a
//! `TypeApp`.
//!
//! This pass never re-derives a type of its own; wherever it needs to know
//! a subterm's type (the general bounded-`TypeApp` rewrite) it reads
//! `poly-typeck`'s `TypeTable`, which is why `Dispatcher` takes one to
//! construct.

mod error;

pub use error::DispatchError;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use poly_ast::{Program, Stmt, Term, Type, KIND_OF_TYPES};
use poly_common::{FreshNameGen, Line};
use poly_typeck::TypeTable;

#[derive(Debug)]
pub struct Dispatcher {
    which_trait: FxHashMap<String, String>,
    get_inst: FxHashMap<(String, String), Term>,
    fresh: FreshNameGen,
    table: TypeTable,
}

impl Dispatcher {
    pub fn new(table: TypeTable) -> Self {
        Dispatcher {
            which_trait: FxHashMap::default(),
            get_inst: FxHashMap::default(),
            fresh: FreshNameGen::new(),
            table,
        }
    }

    pub fn dispatch_program(mut self, program: Program) -> Result<Program, DispatchError> {
        let mut statements = Vec::with_capacity(program.statements.len());
        for stmt in program.statements {
            statements.push(self.dispatch_stmt(stmt)?);
        }
        Ok(Program::new(statements))
    }

    fn dispatch_stmt(&mut self, stmt: Stmt) -> Result<Stmt, DispatchError> {
        match stmt {
            Stmt::TraitFieldEnv {
                field_name,
                trait_name,
                ty,
                line,
            } => {
                self.which_trait.insert(field_name.clone(), trait_name.clone());
                Ok(Stmt::TraitFieldEnv {
                    field_name,
                    trait_name,
                    ty,
                    line,
                })
            }
            Stmt::InstanceEnv {
                trait_name,
                type_param,
                inst_expr,
                line,
            } => {
                self.get_inst
                    .insert((trait_name.clone(), type_param.to_string()), inst_expr.clone());
                Ok(Stmt::InstanceEnv {
                    trait_name,
                    type_param,
                    inst_expr,
                    line,
                })
            }
            Stmt::Assign { name, expr, line } => {
                self.which_trait.remove(&name);
                let expr = self.dispatch_term(expr)?;
                Ok(Stmt::Assign { name, expr, line })
            }
            Stmt::ExprStmt { expr, line } => {
                let expr = self.dispatch_term(expr)?;
                Ok(Stmt::ExprStmt { expr, line })
            }
            Stmt::TypeAssign { name, ty, line } => {
                log::warn!("TypeAssign '{name}' reached dispatch; poly-resolve should have erased it");
                Ok(Stmt::TypeAssign { name, ty, line })
            }
            surface @ (Stmt::Trait { .. } | Stmt::Struct { .. } | Stmt::Impl { .. }) => {
                log::warn!("surface form reached dispatch; poly-desugar should have eliminated it");
                Ok(surface)
            }
        }
    }

    fn dispatch_term(&mut self, term: Term) -> Result<Term, DispatchError> {
        match term {
            Term::Var { name, line } => {
                if self.which_trait.contains_key(&name) {
                    return Err(DispatchError::UnsolvedTraitFieldAccessor { name, line });
                }
                Ok(Term::Var { name, line })
            }
            Term::Lit { value, line } => Ok(Term::Lit { value, line }),
            Term::List { elements, line } => {
                let elements = elements
                    .into_iter()
                    .map(|e| self.dispatch_term(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Term::List { elements, line })
            }
            Term::Record { fields, line } => {
                let mut out = IndexMap::new();
                for (name, value) in fields {
                    out.insert(name, self.dispatch_term(value)?);
                }
                Ok(Term::Record { fields: out, line })
            }
            Term::Lambda {
                param_name,
                param_type,
                body,
                line,
            } => {
                let shadowed = self.which_trait.remove(&param_name);
                let body = self.dispatch_term(*body)?;
                if let Some(trait_name) = shadowed {
                    self.which_trait.insert(param_name.clone(), trait_name);
                }
                Ok(Term::Lambda {
                    param_name,
                    param_type,
                    body: Box::new(body),
                    line,
                })
            }
            Term::TypeLambda {
                param_name,
                trait_bounds,
                body,
                line,
            } => self.dispatch_type_lambda(param_name, trait_bounds, body, line),
            Term::App { func, arg, line } => {
                let func = self.dispatch_term(*func)?;
                let arg = self.dispatch_term(*arg)?;
                Ok(Term::App {
                    func: Box::new(func),
                    arg: Box::new(arg),
                    line,
                })
            }
            Term::TypeApp { func, type_arg, line } => self.dispatch_type_app(func, type_arg, line),
            Term::FieldAccess {
                record,
                field_name,
                line,
            } => {
                let record = self.dispatch_term(*record)?;
                Ok(Term::FieldAccess {
                    record: Box::new(record),
                    field_name,
                    line,
                })
            }
            Term::Annotated { expr, ty, line } => {
                let expr = self.dispatch_term(*expr)?;
                Ok(Term::Annotated {
                    expr: Box::new(expr),
                    ty,
                    line,
                })
            }
            Term::If {
                cond,
                then_branch,
                else_branch,
                line,
            } => {
                let cond = self.dispatch_term(*cond)?;
                let then_branch = self.dispatch_term(*then_branch)?;
                let else_branch = self.dispatch_term(*else_branch)?;
                Ok(Term::If {
                    cond: Box::new(cond),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                    line,
                })
            }
            Term::Or { left, right, line } => {
                let left = self.dispatch_term(*left)?;
                let right = self.dispatch_term(*right)?;
                Ok(Term::Or {
                    left: Box::new(left),
                    right: Box::new(right),
                    line,
                })
            }
            Term::And { left, right, line } => {
                let left = self.dispatch_term(*left)?;
                let right = self.dispatch_term(*right)?;
                Ok(Term::And {
                    left: Box::new(left),
                    right: Box::new(right),
                    line,
                })
            }
            Term::Not { expr, line } => {
                let expr = self.dispatch_term(*expr)?;
                Ok(Term::Not {
                    expr: Box::new(expr),
                    line,
                })
            }
            Term::Rel { op, left, right, line } => {
                let left = self.dispatch_term(*left)?;
                let right = self.dispatch_term(*right)?;
                Ok(Term::Rel {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    line,
                })
            }
            Term::Add { op, left, right, line } => {
                let left = self.dispatch_term(*left)?;
                let right = self.dispatch_term(*right)?;
                Ok(Term::Add {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    line,
                })
            }
            Term::Mul { op, left, right, line } => {
                let left = self.dispatch_term(*left)?;
                let right = self.dispatch_term(*right)?;
                Ok(Term::Mul {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    line,
                })
            }
            Term::Neg { expr, line } => {
                let expr = self.dispatch_term(*expr)?;
                Ok(Term::Neg {
                    expr: Box::new(expr),
                    line,
                })
            }
        }
    }

    /// `\T. body` shadows `T` over `body` like any other binder if it has no
    /// bounds; `\T impl A + B. body` additionally wraps `body` in one fresh
    /// dictionary-value lambda per bound, in declaration order, registering
    /// each one in `get_inst` under `(bound, Named(T))` before descending —
    /// matching `visit_TypeLambdaExpr`'s two branches exactly.
    fn dispatch_type_lambda(
        &mut self,
        param_name: String,
        trait_bounds: Vec<String>,
        body: Box<Term>,
        line: Line,
    ) -> Result<Term, DispatchError> {
        let shadowed = self.which_trait.remove(&param_name);

        let body = if trait_bounds.is_empty() {
            self.dispatch_term(*body)?
        } else {
            let lambda_param_type = Type::Named(param_name.clone());
            let mut wrapped = *body;
            for trait_name in &trait_bounds {
                let dict_name = self.fresh.fresh(&format!("__dictp_{trait_name}"));
                self.get_inst.insert(
                    (trait_name.clone(), lambda_param_type.to_string()),
                    Term::Var {
                        name: dict_name.clone(),
                        line,
                    },
                );
                // The dictionary parameter's declared type is never read again
                // after typeck, which runs strictly before this pass — so, like
                // the source, it is stamped with the "kind of types" sentinel
                // rather than the dictionary's real type.
                wrapped = Term::Lambda {
                    param_name: dict_name,
                    param_type: Type::Named(KIND_OF_TYPES.to_string()),
                    body: Box::new(wrapped),
                    line,
                };
            }
            self.dispatch_term(wrapped)?
        };

        if let Some(trait_name) = shadowed {
            self.which_trait.insert(param_name.clone(), trait_name);
        }
        Ok(Term::TypeLambda {
            param_name,
            trait_bounds,
            body: Box::new(body),
            line,
        })
    }

    /// The two `TypeApp` rewrites (§4.4): a trait field accessor specializes
    /// to a record-field read off the matching dictionary; a general
    /// bounded-polymorphic application grows one dictionary argument per
    /// trait bound, in order. Neither case recurses into `func` — matching
    /// `visit_TypeAppExpr`, which rebuilds from `node`/`node.func` as given.
    /// Everything else falls through to plain recursion into `func`.
    fn dispatch_type_app(
        &mut self,
        func: Box<Term>,
        type_arg: Type,
        line: Line,
    ) -> Result<Term, DispatchError> {
        if let Term::Var { name, .. } = func.as_ref() {
            if let Some(trait_name) = self.which_trait.get(name).cloned() {
                let inst_expr = self.lookup_instance(&trait_name, &type_arg, line)?;
                return Ok(Term::FieldAccess {
                    record: Box::new(inst_expr),
                    field_name: name.clone(),
                    line,
                });
            }
        }

        let func_ty = self.table.get(&func).cloned();
        if let Some(Type::ForAll { trait_bounds, .. }) = &func_ty {
            if !trait_bounds.is_empty() {
                let mut app = Term::TypeApp {
                    func,
                    type_arg: type_arg.clone(),
                    line,
                };
                for trait_name in trait_bounds.clone() {
                    let inst_expr = self.lookup_instance(&trait_name, &type_arg, line)?;
                    app = Term::App {
                        func: Box::new(app),
                        arg: Box::new(inst_expr),
                        line,
                    };
                }
                return Ok(app);
            }
        }

        let func = self.dispatch_term(*func)?;
        Ok(Term::TypeApp {
            func: Box::new(func),
            type_arg,
            line,
        })
    }

    fn lookup_instance(&self, trait_name: &str, type_param: &Type, line: Line) -> Result<Term, DispatchError> {
        self.get_inst
            .get(&(trait_name.to_string(), type_param.to_string()))
            .cloned()
            .ok_or_else(|| DispatchError::MissingInstance {
                trait_name: trait_name.to_string(),
                type_param: type_param.to_string(),
                line,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poly_ast::{Lit, Stmt};

    fn named(name: &str) -> Type {
        Type::Named(name.to_string())
    }

    #[test]
    fn trait_field_accessor_rewrites_to_field_access_on_instance() {
        let mut d = Dispatcher::new(TypeTable::new());
        let program = Program::new(vec![
            Stmt::TraitFieldEnv {
                field_name: "show".into(),
                trait_name: "Show".into(),
                ty: Type::ForAll {
                    param_name: "a".into(),
                    trait_bounds: vec!["Show".into()],
                    body: Box::new(Type::Arrow(Box::new(named("a")), Box::new(named("String")))),
                },
                line: 1,
            },
            Stmt::InstanceEnv {
                trait_name: "Show".into(),
                type_param: named("Int"),
                inst_expr: Term::Var {
                    name: "__Show_inst_1".into(),
                    line: 2,
                },
                line: 2,
            },
            Stmt::ExprStmt {
                expr: Term::TypeApp {
                    func: Box::new(Term::Var {
                        name: "show".into(),
                        line: 3,
                    }),
                    type_arg: named("Int"),
                    line: 3,
                },
                line: 3,
            },
        ]);
        let out = d.dispatch_program(program).unwrap();
        match &out.statements[2] {
            Stmt::ExprStmt { expr, .. } => match expr {
                Term::FieldAccess { record, field_name, .. } => {
                    assert_eq!(field_name, "show");
                    assert!(matches!(record.as_ref(), Term::Var { name, .. } if name == "__Show_inst_1"));
                }
                other => panic!("expected FieldAccess, got {other:?}"),
            },
            other => panic!("expected ExprStmt, got {other:?}"),
        }
    }

    #[test]
    fn unsolved_trait_field_accessor_is_rejected() {
        let mut d = Dispatcher::new(TypeTable::new());
        let program = Program::new(vec![
            Stmt::TraitFieldEnv {
                field_name: "show".into(),
                trait_name: "Show".into(),
                ty: named("a"),
                line: 1,
            },
            Stmt::ExprStmt {
                expr: Term::Var {
                    name: "show".into(),
                    line: 2,
                },
                line: 2,
            },
        ]);
        let err = d.dispatch_program(program).unwrap_err();
        assert!(matches!(err, DispatchError::UnsolvedTraitFieldAccessor { .. }));
    }

    #[test]
    fn type_lambda_with_bounds_wraps_one_dictionary_lambda_per_bound() {
        let mut d = Dispatcher::new(TypeTable::new());
        let program = Program::new(vec![Stmt::Assign {
            name: "f".into(),
            expr: Term::TypeLambda {
                param_name: "a".into(),
                trait_bounds: vec!["Show".into(), "Eq".into()],
                body: Box::new(Term::Lit {
                    value: Lit::Int(1),
                    line: 1,
                }),
                line: 1,
            },
            line: 1,
        }]);
        let out = d.dispatch_program(program).unwrap();
        match &out.statements[0] {
            Stmt::Assign { expr, .. } => match expr {
                Term::TypeLambda { body, .. } => {
                    // Two dictionary lambdas, innermost wrapping the Int literal.
                    match body.as_ref() {
                        Term::Lambda { body: inner, .. } => {
                            assert!(matches!(inner.as_ref(), Term::Lambda { .. }));
                        }
                        other => panic!("expected dictionary Lambda, got {other:?}"),
                    }
                }
                other => panic!("expected TypeLambda, got {other:?}"),
            },
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn plain_lambda_body_is_recursed_into() {
        let mut d = Dispatcher::new(TypeTable::new());
        let program = Program::new(vec![Stmt::Assign {
            name: "f".into(),
            expr: Term::Lambda {
                param_name: "x".into(),
                param_type: named("Int"),
                body: Box::new(Term::Var {
                    name: "x".into(),
                    line: 1,
                }),
                line: 1,
            },
            line: 1,
        }]);
        let out = d.dispatch_program(program).unwrap();
        assert!(matches!(&out.statements[0], Stmt::Assign { .. }));
    }
}
