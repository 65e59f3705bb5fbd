//! The bidirectional-style type checker (§4.3), grounded on
//! `type_checker.py`'s `TypeCheckerVisitor` for the typing rules themselves
//! and on `mesh-typeck`'s `error.rs`/`traits.rs` for the ambient shape
//! (manual `Display` error enum, a trait-instance registry keyed by trait
//! name).
//!
//! Unlike the filtered source's checker (a pure `Visit` that only ever reads
//! `func_type.left != arg_type`), this one also performs §4.3's implicit
//! type-application rewrite: applying a bounded-free polymorphic function
//! directly to an argument (without an explicit `f @T`) unifies the
//! argument's type against the function's domain and rewrites the term to
//! insert an explicit `TypeApp` before re-checking the application. That
//! rewrite makes this pass a genuine `Transform`, not a pure `Visit` — see
//! `table` for how node identity survives the rebuild anyway.

mod error;
mod table;
mod unify;

pub use error::TypeckError;
pub use table::TypeTable;
pub use unify::unify_first_arg;

use indexmap::IndexMap;

use poly_ast::{bool_type, int_type, string_type, substitute_type, AddOp, Lit, Program, RelOp, Stmt, Term, Type};
use poly_common::{FreshNameGen, Line, ScopeStack};

/// Γ (`gamma`) and `Inst` from §4.3, plus the per-statement `(line, rendered
/// type)` log spec §4.5 keeps for the evaluator and this expansion restores
/// symmetrically for the checker (see SPEC_FULL.md's "Supplemented
/// features").
#[derive(Debug, Default)]
pub struct Checker {
    gamma: ScopeStack<Type>,
    inst: rustc_hash::FxHashMap<String, Vec<Type>>,
    fresh: FreshNameGen,
    table: TypeTable,
    pub stmt_type_info: Vec<(Line, String)>,
}

impl Checker {
    pub fn new() -> Self {
        let mut checker = Checker::default();
        for (name, ty) in poly_ast::builtin_function_types() {
            checker.gamma.define(name, ty);
        }
        checker
    }

    pub fn check_program(mut self, program: Program) -> Result<(Program, TypeTable, Vec<(Line, String)>), TypeckError> {
        let mut statements = Vec::with_capacity(program.statements.len());
        for stmt in program.statements {
            statements.push(self.check_stmt(stmt)?);
        }
        Ok((Program::new(statements), self.table, self.stmt_type_info))
    }

    fn check_stmt(&mut self, stmt: Stmt) -> Result<Stmt, TypeckError> {
        match stmt {
            Stmt::Assign { name, expr, line } => {
                let (checked, ty) = self.check_term(expr)?;
                self.stmt_type_info.push((line, ty.to_string()));
                self.gamma.define(name.clone(), ty);
                Ok(Stmt::Assign { name, expr: checked, line })
            }
            Stmt::ExprStmt { expr, line } => {
                let (checked, ty) = self.check_term(expr)?;
                self.stmt_type_info.push((line, ty.to_string()));
                Ok(Stmt::ExprStmt { expr: checked, line })
            }
            Stmt::TraitFieldEnv {
                field_name,
                trait_name,
                ty,
                line,
            } => {
                self.gamma.define(field_name.clone(), ty.clone());
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
                self.inst.entry(trait_name.clone()).or_default().push(type_param.clone());
                Ok(Stmt::InstanceEnv {
                    trait_name,
                    type_param,
                    inst_expr,
                    line,
                })
            }
            // Neither should survive desugar/resolve; passed through rather
            // than re-asserted, since this pass doesn't own that invariant.
            other @ (Stmt::TypeAssign { .. } | Stmt::Trait { .. } | Stmt::Struct { .. } | Stmt::Impl { .. }) => {
                log::warn!("type checker saw a statement that should have been eliminated earlier: {other:?}");
                Ok(other)
            }
        }
    }

    fn check_boxed(&mut self, term: Box<Term>) -> Result<(Box<Term>, Type), TypeckError> {
        let (checked, ty) = self.check_term(*term)?;
        let boxed = Box::new(checked);
        self.table.insert(&boxed, ty.clone());
        Ok((boxed, ty))
    }

    fn check_term(&mut self, term: Term) -> Result<(Term, Type), TypeckError> {
        match term {
            Term::Var { name, line } => match self.gamma.lookup(&name) {
                Some(ty) if *ty == Type::Named(poly_ast::KIND_OF_TYPES.to_string()) => {
                    Err(TypeckError::IdentifierIsType { name, line })
                }
                Some(ty) => {
                    let ty = ty.clone();
                    Ok((Term::Var { name, line }, ty))
                }
                None => Err(TypeckError::UnboundVariable { name, line }),
            },
            Term::Lit { value, line } => {
                let ty = match &value {
                    Lit::Bool(_) => bool_type(),
                    Lit::Int(_) => int_type(),
                    Lit::Str(_) => string_type(),
                };
                Ok((Term::Lit { value, line }, ty))
            }
            Term::List { elements, line } => {
                if elements.is_empty() {
                    return Ok((Term::List { elements, line }, Type::List(None)));
                }
                let mut iter = elements.into_iter();
                let (first_checked, first_ty) = self.check_term(iter.next().unwrap())?;
                let mut checked = vec![first_checked];
                for elem in iter {
                    let (elem_checked, elem_ty) = self.check_term(elem)?;
                    if elem_ty != first_ty {
                        return Err(TypeckError::ListElementMismatch {
                            expected: first_ty.to_string(),
                            found: elem_ty.to_string(),
                            line,
                        });
                    }
                    checked.push(elem_checked);
                }
                Ok((
                    Term::List { elements: checked, line },
                    Type::List(Some(Box::new(first_ty))),
                ))
            }
            Term::Record { fields, line } => {
                let mut checked = IndexMap::with_capacity(fields.len());
                let mut types = IndexMap::with_capacity(fields.len());
                for (label, value) in fields {
                    let (value_checked, value_ty) = self.check_term(value)?;
                    types.insert(label.clone(), value_ty);
                    checked.insert(label, value_checked);
                }
                Ok((Term::Record { fields: checked, line }, Type::Record(types)))
            }
            Term::Lambda {
                param_name,
                param_type,
                body,
                line,
            } => {
                self.gamma.push();
                self.gamma.define(param_name.clone(), param_type.clone());
                let body_result = self.check_term(*body);
                self.gamma.pop();
                let (body_checked, body_ty) = body_result?;
                Ok((
                    Term::Lambda {
                        param_name,
                        param_type: param_type.clone(),
                        body: Box::new(body_checked),
                        line,
                    },
                    Type::Arrow(Box::new(param_type), Box::new(body_ty)),
                ))
            }
            Term::TypeLambda {
                param_name,
                trait_bounds,
                body,
                line,
            } => {
                self.gamma.push();
                self.gamma
                    .define(param_name.clone(), Type::Named(poly_ast::KIND_OF_TYPES.to_string()));
                // The bound variable satisfies its own bounds within this
                // abstraction's scope, mirroring `poly_dispatch`'s
                // `dispatch_type_lambda`, which registers a dictionary for
                // `(bound, Named(param_name))` over the same body.
                let self_ty = Type::Named(param_name.clone());
                for bound in &trait_bounds {
                    self.inst.entry(bound.clone()).or_default().push(self_ty.clone());
                }
                let body_result = self.check_term(*body);
                for bound in &trait_bounds {
                    if let Some(insts) = self.inst.get_mut(bound) {
                        insts.pop();
                    }
                }
                self.gamma.pop();
                let (body_checked, body_ty) = body_result?;
                Ok((
                    Term::TypeLambda {
                        param_name: param_name.clone(),
                        trait_bounds: trait_bounds.clone(),
                        body: Box::new(body_checked),
                        line,
                    },
                    Type::ForAll {
                        param_name,
                        trait_bounds,
                        body: Box::new(body_ty),
                    },
                ))
            }
            Term::App { func, arg, line } => {
                let (func_checked, func_ty) = self.check_boxed(func)?;
                let (arg_checked, arg_ty) = self.check_term(*arg)?;
                self.check_app(func_checked, func_ty, arg_checked, arg_ty, line)
            }
            Term::TypeApp { func, type_arg, line } => {
                let (func_checked, func_ty) = self.check_boxed(func)?;
                match func_ty {
                    Type::ForAll {
                        param_name,
                        trait_bounds,
                        body,
                    } => {
                        for bound in &trait_bounds {
                            let satisfied = self
                                .inst
                                .get(bound)
                                .is_some_and(|insts| insts.contains(&type_arg));
                            if !satisfied {
                                return Err(TypeckError::UnsatisfiedTraitBound {
                                    ty: type_arg.to_string(),
                                    trait_name: bound.clone(),
                                    line,
                                });
                            }
                        }
                        let result_ty = substitute_type(&param_name, &type_arg, &body, &mut self.fresh);
                        Ok((
                            Term::TypeApp {
                                func: func_checked,
                                type_arg,
                                line,
                            },
                            result_ty,
                        ))
                    }
                    other => Err(TypeckError::ForAllExpected {
                        found: other.to_string(),
                        line,
                    }),
                }
            }
            Term::FieldAccess { record, field_name, line } => {
                let (record_checked, record_ty) = self.check_boxed(record)?;
                match record_ty {
                    Type::Record(fields) => match fields.get(&field_name) {
                        Some(field_ty) => {
                            let field_ty = field_ty.clone();
                            Ok((
                                Term::FieldAccess {
                                    record: record_checked,
                                    field_name,
                                    line,
                                },
                                field_ty,
                            ))
                        }
                        None => Err(TypeckError::UnknownField {
                            field: field_name,
                            record: Type::Record(fields).to_string(),
                            line,
                        }),
                    },
                    other => Err(TypeckError::ExpectedRecord {
                        found: other.to_string(),
                        line,
                    }),
                }
            }
            Term::Annotated { expr, ty, line } => {
                let (expr_checked, expr_ty) = self.check_term(*expr)?;
                if expr_ty != ty {
                    return Err(TypeckError::AnnotatedMismatch {
                        annotated: ty.to_string(),
                        found: expr_ty.to_string(),
                        line,
                    });
                }
                Ok((
                    Term::Annotated {
                        expr: Box::new(expr_checked),
                        ty: ty.clone(),
                        line,
                    },
                    ty,
                ))
            }
            Term::If {
                cond,
                then_branch,
                else_branch,
                line,
            } => {
                let (cond_checked, cond_ty) = self.check_term(*cond)?;
                let (then_checked, then_ty) = self.check_term(*then_branch)?;
                let (else_checked, else_ty) = self.check_term(*else_branch)?;
                if cond_ty != bool_type() {
                    return Err(TypeckError::ExpectedBool {
                        found: cond_ty.to_string(),
                        line,
                    });
                }
                if then_ty != else_ty {
                    return Err(TypeckError::BranchMismatch {
                        then_ty: then_ty.to_string(),
                        else_ty: else_ty.to_string(),
                        line,
                    });
                }
                Ok((
                    Term::If {
                        cond: Box::new(cond_checked),
                        then_branch: Box::new(then_checked),
                        else_branch: Box::new(else_checked),
                        line,
                    },
                    then_ty,
                ))
            }
            Term::Or { left, right, line } => {
                let (left_checked, left_ty) = self.check_term(*left)?;
                let (right_checked, right_ty) = self.check_term(*right)?;
                if left_ty != bool_type() || right_ty != bool_type() {
                    return Err(TypeckError::LogicalBothBool {
                        left: left_ty.to_string(),
                        right: right_ty.to_string(),
                        line,
                    });
                }
                Ok((
                    Term::Or {
                        left: Box::new(left_checked),
                        right: Box::new(right_checked),
                        line,
                    },
                    bool_type(),
                ))
            }
            Term::And { left, right, line } => {
                let (left_checked, left_ty) = self.check_term(*left)?;
                let (right_checked, right_ty) = self.check_term(*right)?;
                if left_ty != bool_type() || right_ty != bool_type() {
                    return Err(TypeckError::LogicalBothBool {
                        left: left_ty.to_string(),
                        right: right_ty.to_string(),
                        line,
                    });
                }
                Ok((
                    Term::And {
                        left: Box::new(left_checked),
                        right: Box::new(right_checked),
                        line,
                    },
                    bool_type(),
                ))
            }
            Term::Not { expr, line } => {
                let (expr_checked, expr_ty) = self.check_term(*expr)?;
                if expr_ty != bool_type() {
                    return Err(TypeckError::ExpectedBool {
                        found: expr_ty.to_string(),
                        line,
                    });
                }
                Ok((Term::Not { expr: Box::new(expr_checked), line }, bool_type()))
            }
            Term::Rel { op, left, right, line } => {
                let (left_checked, left_ty) = self.check_term(*left)?;
                let (right_checked, right_ty) = self.check_term(*right)?;
                match op {
                    RelOp::Eq | RelOp::Neq => {
                        if left_ty != right_ty {
                            return Err(TypeckError::RelEqMismatch {
                                left: left_ty.to_string(),
                                right: right_ty.to_string(),
                                line,
                            });
                        }
                    }
                    RelOp::Gt | RelOp::Lt | RelOp::Geq | RelOp::Leq => {
                        if left_ty != int_type() || right_ty != int_type() {
                            return Err(TypeckError::ExpectedInt2 {
                                left: left_ty.to_string(),
                                right: right_ty.to_string(),
                                line,
                            });
                        }
                    }
                }
                Ok((
                    Term::Rel {
                        op,
                        left: Box::new(left_checked),
                        right: Box::new(right_checked),
                        line,
                    },
                    bool_type(),
                ))
            }
            Term::Add { op, left, right, line } => {
                let (left_checked, left_ty) = self.check_term(*left)?;
                let (right_checked, right_ty) = self.check_term(*right)?;
                let result_ty = self.add_result_type(op, &left_ty, &right_ty, line)?;
                Ok((
                    Term::Add {
                        op,
                        left: Box::new(left_checked),
                        right: Box::new(right_checked),
                        line,
                    },
                    result_ty,
                ))
            }
            Term::Mul { op, left, right, line } => {
                let (left_checked, left_ty) = self.check_term(*left)?;
                let (right_checked, right_ty) = self.check_term(*right)?;
                if left_ty != int_type() || right_ty != int_type() {
                    return Err(TypeckError::ExpectedInt2 {
                        left: left_ty.to_string(),
                        right: right_ty.to_string(),
                        line,
                    });
                }
                Ok((
                    Term::Mul {
                        op,
                        left: Box::new(left_checked),
                        right: Box::new(right_checked),
                        line,
                    },
                    int_type(),
                ))
            }
            Term::Neg { expr, line } => {
                let (expr_checked, expr_ty) = self.check_term(*expr)?;
                if expr_ty != int_type() {
                    return Err(TypeckError::ExpectedInt1 {
                        found: expr_ty.to_string(),
                        line,
                    });
                }
                Ok((Term::Neg { expr: Box::new(expr_checked), line }, int_type()))
            }
        }
    }

    /// §4.3's `Add`/`Sub` rule, extended per DESIGN.md's open-question
    /// decision 7: `Add` (never `Sub`) also accepts two `List` operands of
    /// the same element type, since §4.5's list-concatenation reduction and
    /// `cons`'s fixed desugaring both depend on it type-checking.
    fn add_result_type(&self, op: AddOp, left: &Type, right: &Type, line: Line) -> Result<Type, TypeckError> {
        if *left == int_type() && *right == int_type() {
            return Ok(int_type());
        }
        if op == AddOp::Add {
            if let (Type::List(left_elem), Type::List(right_elem)) = (left, right) {
                let result = match (left_elem, right_elem) {
                    (None, None) => Type::List(None),
                    (Some(_), None) => left.clone(),
                    (None, Some(_)) => right.clone(),
                    (Some(a), Some(b)) if a == b => left.clone(),
                    _ => {
                        return Err(TypeckError::ExpectedInt2 {
                            left: left.to_string(),
                            right: right.to_string(),
                            line,
                        })
                    }
                };
                return Ok(result);
            }
        }
        Err(TypeckError::ExpectedInt2 {
            left: left.to_string(),
            right: right.to_string(),
            line,
        })
    }

    fn check_app(
        &mut self,
        func_checked: Box<Term>,
        func_ty: Type,
        arg_checked: Term,
        arg_ty: Type,
        line: Line,
    ) -> Result<(Term, Type), TypeckError> {
        match func_ty {
            Type::Arrow(domain, codomain) => {
                if *domain != arg_ty {
                    return Err(TypeckError::ArgMismatch {
                        expected: domain.to_string(),
                        found: arg_ty.to_string(),
                        line,
                    });
                }
                Ok((
                    Term::App {
                        func: func_checked,
                        arg: Box::new(arg_checked),
                        line,
                    },
                    *codomain,
                ))
            }
            Type::ForAll {
                param_name,
                trait_bounds,
                body,
            } if trait_bounds.is_empty() => match *body {
                Type::Arrow(domain, codomain) => match unify_first_arg(&param_name, &domain, &arg_ty) {
                    Some(solution) => {
                        let rewritten_domain = substitute_type(&param_name, &solution, &domain, &mut self.fresh);
                        let rewritten_codomain = substitute_type(&param_name, &solution, &codomain, &mut self.fresh);
                        let type_app_ty = Type::Arrow(Box::new(rewritten_domain.clone()), Box::new(rewritten_codomain.clone()));
                        let type_app_term = Term::TypeApp {
                            func: func_checked,
                            type_arg: solution,
                            line,
                        };
                        let boxed_type_app = Box::new(type_app_term);
                        self.table.insert(&boxed_type_app, type_app_ty);
                        if rewritten_domain != arg_ty {
                            return Err(TypeckError::ArgMismatch {
                                expected: rewritten_domain.to_string(),
                                found: arg_ty.to_string(),
                                line,
                            });
                        }
                        Ok((
                            Term::App {
                                func: boxed_type_app,
                                arg: Box::new(arg_checked),
                                line,
                            },
                            rewritten_codomain,
                        ))
                    }
                    None => Err(TypeckError::NoUniqueSolution { line }),
                },
                other => Err(TypeckError::ArrowExpected {
                    found: other.to_string(),
                    line,
                }),
            },
            other => Err(TypeckError::ArrowExpected {
                found: other.to_string(),
                line,
            }),
        }
    }
}
