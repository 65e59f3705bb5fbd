//! Type-alias erasure and type-level application (§4.2).
//!
//! `TypeAssign name = τ` statements are recorded in an alias table and then
//! dropped from the program — nothing downstream ever sees a `TypeAssign`
//! again (§3.5). Every other statement has its embedded `Type`s resolved
//! against that table: `Named` aliases are substituted away, and `App(F, A)`
//! where `F` resolves to an unbounded `ForAll` is β-reduced via
//! `poly_ast::substitute_type`.
//!
//! Resolution walks the whole term tree, not just type annotations in
//! isolation, because a `Named` type can appear nested arbitrarily deep
//! inside a `Lambda`'s `param_type`, an `Annotated` node, or a `TypeApp`'s
//! `type_arg` — mirroring `type_solver.py`'s `TypeSolverVisitor`, which is a
//! `TransformVisitor` over the *whole* AST, not a type-only pass.

mod error;

pub use error::ResolveError;

use rustc_hash::FxHashMap;

use poly_ast::{is_builtin_type_name, substitute_type, Program, Stmt, Term, Type};
use poly_common::{FreshNameGen, Line};

/// Reduces type aliases and type-level application over a whole program.
///
/// `bounded` tracks names currently in scope as type variables — pushed on
/// `ForAll`/`TypeLambda` entry and, matching the source's `TypeSolverVisitor`
/// exactly, also on plain term-level `Lambda` entry (the source pushes
/// `node.param_name` there too, so a value parameter shadows a same-named
/// alias for the scope of its body).
#[derive(Debug, Default)]
pub struct Resolver {
    aliases: FxHashMap<String, Type>,
    bounded: Vec<String>,
    fresh: FreshNameGen,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver::default()
    }

    /// Resolves every statement in order, threading the alias table forward
    /// so a `TypeAssign` can only see aliases declared earlier in the
    /// program — the same left-to-right visibility `visit_TypeAssignStmt`
    /// gets from a single top-to-bottom pass.
    pub fn resolve_program(&mut self, program: Program) -> Result<Program, ResolveError> {
        let mut statements = Vec::with_capacity(program.statements.len());
        for stmt in program.statements {
            if let Some(resolved) = self.resolve_stmt(stmt)? {
                statements.push(resolved);
            }
        }
        Ok(Program::new(statements))
    }

    fn resolve_stmt(&mut self, stmt: Stmt) -> Result<Option<Stmt>, ResolveError> {
        match stmt {
            Stmt::TypeAssign { name, ty, line } => {
                let resolved = self.resolve_type(&ty, line)?;
                log::debug!("resolve: alias {name} = {resolved}");
                self.aliases.insert(name, resolved);
                Ok(None)
            }
            Stmt::Assign { name, expr, line } => Ok(Some(Stmt::Assign {
                name,
                expr: self.resolve_term(expr)?,
                line,
            })),
            Stmt::ExprStmt { expr, line } => Ok(Some(Stmt::ExprStmt {
                expr: self.resolve_term(expr)?,
                line,
            })),
            Stmt::TraitFieldEnv {
                field_name,
                trait_name,
                ty,
                line,
            } => Ok(Some(Stmt::TraitFieldEnv {
                field_name,
                trait_name,
                ty: self.resolve_type(&ty, line)?,
                line,
            })),
            Stmt::InstanceEnv {
                trait_name,
                type_param,
                inst_expr,
                line,
            } => Ok(Some(Stmt::InstanceEnv {
                trait_name,
                type_param: self.resolve_type(&type_param, line)?,
                inst_expr: self.resolve_term(inst_expr)?,
                line,
            })),
            // `poly_desugar` removes these before the resolver ever runs;
            // passed through unchanged rather than re-asserted here.
            other @ (Stmt::Trait { .. } | Stmt::Struct { .. } | Stmt::Impl { .. }) => Ok(Some(other)),
        }
    }

    fn resolve_term(&mut self, term: Term) -> Result<Term, ResolveError> {
        match term {
            Term::Var { .. } | Term::Lit { .. } => Ok(term),
            Term::List { elements, line } => {
                let elements = elements
                    .into_iter()
                    .map(|e| self.resolve_term(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Term::List { elements, line })
            }
            Term::Record { fields, line } => {
                let mut out = indexmap::IndexMap::with_capacity(fields.len());
                for (label, value) in fields {
                    out.insert(label, self.resolve_term(value)?);
                }
                Ok(Term::Record { fields: out, line })
            }
            Term::Lambda {
                param_name,
                param_type,
                body,
                line,
            } => {
                let resolved_type = self.resolve_type(&param_type, line)?;
                self.bounded.push(param_name.clone());
                let resolved_body = self.resolve_term(*body);
                self.bounded.pop();
                Ok(Term::Lambda {
                    param_name,
                    param_type: resolved_type,
                    body: Box::new(resolved_body?),
                    line,
                })
            }
            Term::TypeLambda {
                param_name,
                trait_bounds,
                body,
                line,
            } => {
                self.bounded.push(param_name.clone());
                let resolved_body = self.resolve_term(*body);
                self.bounded.pop();
                Ok(Term::TypeLambda {
                    param_name,
                    trait_bounds,
                    body: Box::new(resolved_body?),
                    line,
                })
            }
            Term::App { func, arg, line } => Ok(Term::App {
                func: Box::new(self.resolve_term(*func)?),
                arg: Box::new(self.resolve_term(*arg)?),
                line,
            }),
            Term::TypeApp { func, type_arg, line } => {
                let resolved_func = self.resolve_term(*func)?;
                let resolved_arg = self.resolve_type(&type_arg, line)?;
                Ok(Term::TypeApp {
                    func: Box::new(resolved_func),
                    type_arg: resolved_arg,
                    line,
                })
            }
            Term::FieldAccess {
                record, field_name, line
            } => Ok(Term::FieldAccess {
                record: Box::new(self.resolve_term(*record)?),
                field_name,
                line,
            }),
            Term::Annotated { expr, ty, line } => {
                let resolved_ty = self.resolve_type(&ty, line)?;
                Ok(Term::Annotated {
                    expr: Box::new(self.resolve_term(*expr)?),
                    ty: resolved_ty,
                    line,
                })
            }
            Term::If {
                cond,
                then_branch,
                else_branch,
                line,
            } => Ok(Term::If {
                cond: Box::new(self.resolve_term(*cond)?),
                then_branch: Box::new(self.resolve_term(*then_branch)?),
                else_branch: Box::new(self.resolve_term(*else_branch)?),
                line,
            }),
            Term::Or { left, right, line } => Ok(Term::Or {
                left: Box::new(self.resolve_term(*left)?),
                right: Box::new(self.resolve_term(*right)?),
                line,
            }),
            Term::And { left, right, line } => Ok(Term::And {
                left: Box::new(self.resolve_term(*left)?),
                right: Box::new(self.resolve_term(*right)?),
                line,
            }),
            Term::Not { expr, line } => Ok(Term::Not {
                expr: Box::new(self.resolve_term(*expr)?),
                line,
            }),
            Term::Rel { op, left, right, line } => Ok(Term::Rel {
                op,
                left: Box::new(self.resolve_term(*left)?),
                right: Box::new(self.resolve_term(*right)?),
                line,
            }),
            Term::Add { op, left, right, line } => Ok(Term::Add {
                op,
                left: Box::new(self.resolve_term(*left)?),
                right: Box::new(self.resolve_term(*right)?),
                line,
            }),
            Term::Mul { op, left, right, line } => Ok(Term::Mul {
                op,
                left: Box::new(self.resolve_term(*left)?),
                right: Box::new(self.resolve_term(*right)?),
                line,
            }),
            Term::Neg { expr, line } => Ok(Term::Neg {
                expr: Box::new(self.resolve_term(*expr)?),
                line,
            }),
        }
    }

    fn resolve_type(&mut self, ty: &Type, line: Line) -> Result<Type, ResolveError> {
        match ty {
            Type::Named(name) => {
                if is_builtin_type_name(name) || self.bounded.contains(name) {
                    Ok(Type::Named(name.clone()))
                } else if let Some(aliased) = self.aliases.get(name) {
                    Ok(aliased.clone())
                } else {
                    Err(ResolveError::UnknownType {
                        name: name.clone(),
                        line,
                    })
                }
            }
            Type::App(func, arg) => {
                let resolved_func = self.resolve_type(func, line)?;
                let resolved_arg = self.resolve_type(arg, line)?;
                match resolved_func {
                    Type::ForAll {
                        param_name,
                        trait_bounds,
                        body,
                    } if trait_bounds.is_empty() => {
                        Ok(substitute_type(&param_name, &resolved_arg, &body, &mut self.fresh))
                    }
                    other => Err(ResolveError::ForAllExpected {
                        found: other.to_string(),
                        line,
                    }),
                }
            }
            Type::Arrow(left, right) => Ok(Type::Arrow(
                Box::new(self.resolve_type(left, line)?),
                Box::new(self.resolve_type(right, line)?),
            )),
            Type::List(Some(elem)) => Ok(Type::List(Some(Box::new(self.resolve_type(elem, line)?)))),
            Type::List(None) => Ok(Type::List(None)),
            Type::Record(fields) => {
                let mut out = indexmap::IndexMap::with_capacity(fields.len());
                for (label, field_ty) in fields {
                    out.insert(label.clone(), self.resolve_type(field_ty, line)?);
                }
                Ok(Type::Record(out))
            }
            Type::ForAll {
                param_name,
                trait_bounds,
                body,
            } => {
                self.bounded.push(param_name.clone());
                let resolved_body = self.resolve_type(body, line);
                self.bounded.pop();
                Ok(Type::ForAll {
                    param_name: param_name.clone(),
                    trait_bounds: trait_bounds.clone(),
                    body: Box::new(resolved_body?),
                })
            }
        }
    }
}
