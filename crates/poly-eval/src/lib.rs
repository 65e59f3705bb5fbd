//! The partial, substitution-based evaluator (§4.5), grounded on
//! `interpreter.py`'s `InterpreterVisitor`: every reduction rule below
//! mirrors one `visit_*` method there, including the "partial evaluation"
//! behavior of returning a rebuilt residual node (rather than erroring) when
//! a subexpression doesn't reduce to something concrete enough to continue.
//!
//! Builtins (`print`/`println`/`read`/`string_to_int`/`int_to_string`/
//! `head`/`tail`) have no counterpart in the filtered `original_source` —
//! see `poly_ast::builtin` — so their evaluation semantics here are derived
//! directly from spec §4.5's prose rather than ported from a source method.
//! `cons` is not among them: every reference is expanded to an ordinary
//! lambda at its use site before this pass ever runs
//! (`poly_desugar::rewrite_cons_in_term`).

mod error;
mod subst;

pub use error::EvalError;
pub use subst::{free_vars_term, substitute_term};

use rustc_hash::FxHashMap;

use poly_ast::{AddOp, Lit, MulOp, Program, RelOp, Stmt, Term};
use poly_common::{FreshNameGen, Line};

/// Owns the global value table, the stack of names currently bound by an
/// enclosing (not-yet-applied) `Lambda`, and the `(line, rendered)` trace
/// `stmt_eval_info` mirrors from the source's `self.stmt_eval_info`.
#[derive(Debug, Default)]
pub struct Evaluator {
    globals: FxHashMap<String, Term>,
    bounded: Vec<String>,
    fresh: FreshNameGen,
    cur_line: Line,
    pub stmt_eval_info: Vec<(Line, String)>,
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator::default()
    }

    pub fn eval_program(&mut self, program: Program) -> Result<Program, EvalError> {
        let mut statements = Vec::with_capacity(program.statements.len());
        for stmt in program.statements {
            statements.push(self.eval_stmt(stmt)?);
        }
        Ok(Program::new(statements))
    }

    fn eval_stmt(&mut self, stmt: Stmt) -> Result<Stmt, EvalError> {
        match stmt {
            Stmt::Assign { name, expr, line } => {
                self.cur_line = line;
                let value = self.eval_term(expr)?;
                self.globals.insert(name.clone(), value.clone());
                self.stmt_eval_info.push((line, format!("{name} = {value}")));
                Ok(Stmt::Assign { name, expr: value, line })
            }
            Stmt::ExprStmt { expr, line } => {
                self.cur_line = line;
                let value = self.eval_term(expr)?;
                self.stmt_eval_info.push((line, format!("= {value}")));
                Ok(Stmt::ExprStmt { expr: value, line })
            }
            // `TypeAssign` is consumed by `poly_resolve`; `Trait`/`Struct`/
            // `Impl` by `poly_desugar`; `TraitFieldEnv`/`InstanceEnv` by
            // `poly_dispatch`. None should still be present by this pass.
            other => {
                log::warn!("poly-eval saw a non-expression statement: {other:?}");
                Ok(other)
            }
        }
    }

    fn eval_term(&mut self, term: Term) -> Result<Term, EvalError> {
        match term {
            Term::Var { name, line } => self.eval_var(name, line),
            Term::Lit { .. } => Ok(term),
            Term::List { elements, line } => {
                let elements = elements
                    .into_iter()
                    .map(|e| self.eval_term(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Term::List { elements, line })
            }
            Term::Record { fields, line } => {
                let fields = fields
                    .into_iter()
                    .map(|(name, value)| Ok((name, self.eval_term(value)?)))
                    .collect::<Result<_, EvalError>>()?;
                Ok(Term::Record { fields, line })
            }
            Term::Lambda {
                param_name,
                body,
                line,
                ..
            } => {
                self.bounded.push(param_name.clone());
                let body = self.eval_term(*body)?;
                self.bounded.pop();
                Ok(Term::Lambda {
                    param_name,
                    param_type: poly_ast::Type::Named(poly_ast::ERASED_TYPE.to_string()),
                    body: Box::new(body),
                    line,
                })
            }
            // Type-parameter erasure: the body is evaluated directly, no
            // scope to push (unlike `Lambda`, a type parameter never shows
            // up as a `Var` a value reduction could collide with).
            Term::TypeLambda { body, .. } => self.eval_term(*body),
            Term::If {
                cond,
                then_branch,
                else_branch,
                line,
            } => {
                let cond_eval = self.eval_term(*cond)?;
                match bool_value(&cond_eval) {
                    Some(true) => self.eval_term(*then_branch),
                    Some(false) => self.eval_term(*else_branch),
                    None => Ok(Term::If {
                        cond: Box::new(cond_eval),
                        then_branch: Box::new(self.eval_term(*then_branch)?),
                        else_branch: Box::new(self.eval_term(*else_branch)?),
                        line,
                    }),
                }
            }
            Term::Or { left, right, line } => {
                let left_eval = self.eval_term(*left)?;
                if bool_value(&left_eval) == Some(true) {
                    return Ok(left_eval);
                }
                let right_eval = self.eval_term(*right)?;
                if bool_value(&right_eval) == Some(true) {
                    return Ok(right_eval);
                }
                if bool_value(&left_eval) == Some(false) && bool_value(&right_eval) == Some(false) {
                    return Ok(left_eval);
                }
                Ok(Term::Or {
                    left: Box::new(left_eval),
                    right: Box::new(right_eval),
                    line,
                })
            }
            Term::And { left, right, line } => {
                let left_eval = self.eval_term(*left)?;
                if bool_value(&left_eval) == Some(false) {
                    return Ok(left_eval);
                }
                let right_eval = self.eval_term(*right)?;
                if bool_value(&right_eval) == Some(false) {
                    return Ok(right_eval);
                }
                if bool_value(&left_eval) == Some(true) && bool_value(&right_eval) == Some(true) {
                    return Ok(left_eval);
                }
                Ok(Term::And {
                    left: Box::new(left_eval),
                    right: Box::new(right_eval),
                    line,
                })
            }
            Term::Not { expr, line } => {
                let eval = self.eval_term(*expr)?;
                match bool_value(&eval) {
                    Some(b) => Ok(lit_bool(!b, line)),
                    None => Ok(Term::Not { expr: Box::new(eval), line }),
                }
            }
            Term::Rel { op, left, right, line } => {
                let left_eval = self.eval_term(*left)?;
                let right_eval = self.eval_term(*right)?;
                if let (Term::Lit { value: l, .. }, Term::Lit { value: r, .. }) = (&left_eval, &right_eval) {
                    return Ok(lit_bool(eval_rel(op, l, r), line));
                }
                Ok(Term::Rel {
                    op,
                    left: Box::new(left_eval),
                    right: Box::new(right_eval),
                    line,
                })
            }
            Term::Add { op, left, right, line } => {
                let left_eval = self.eval_term(*left)?;
                let right_eval = self.eval_term(*right)?;
                if let (Term::Lit { value: Lit::Int(l), .. }, Term::Lit { value: Lit::Int(r), .. }) =
                    (&left_eval, &right_eval)
                {
                    let n = match op {
                        AddOp::Add => l.checked_add(*r),
                        AddOp::Sub => l.checked_sub(*r),
                    };
                    let n = n.ok_or(EvalError::ArithmeticOverflow {
                        op: op.to_string(),
                        line,
                    })?;
                    return Ok(Term::Lit { value: Lit::Int(n), line });
                }
                if op == AddOp::Add {
                    if let (Term::List { elements: l, .. }, Term::List { elements: r, .. }) =
                        (&left_eval, &right_eval)
                    {
                        let mut elements = l.clone();
                        elements.extend(r.clone());
                        return Ok(Term::List { elements, line });
                    }
                }
                Ok(Term::Add {
                    op,
                    left: Box::new(left_eval),
                    right: Box::new(right_eval),
                    line,
                })
            }
            Term::Mul { op, left, right, line } => {
                let left_eval = self.eval_term(*left)?;
                let right_eval = self.eval_term(*right)?;
                if let (Term::Lit { value: Lit::Int(l), .. }, Term::Lit { value: Lit::Int(r), .. }) =
                    (&left_eval, &right_eval)
                {
                    let n = match op {
                        MulOp::Mul => l.checked_mul(*r),
                        MulOp::Div => {
                            if *r == 0 {
                                return Err(EvalError::DivisionByZero { line });
                            }
                            l.checked_div(*r)
                        }
                        MulOp::Mod => {
                            if *r == 0 {
                                return Err(EvalError::DivisionByZero { line });
                            }
                            l.checked_rem(*r)
                        }
                    };
                    let n = n.ok_or(EvalError::ArithmeticOverflow {
                        op: op.to_string(),
                        line,
                    })?;
                    return Ok(Term::Lit { value: Lit::Int(n), line });
                }
                Ok(Term::Mul {
                    op,
                    left: Box::new(left_eval),
                    right: Box::new(right_eval),
                    line,
                })
            }
            Term::Neg { expr, line } => {
                let eval = self.eval_term(*expr)?;
                if let Term::Lit { value: Lit::Int(n), .. } = eval {
                    Ok(Term::Lit { value: Lit::Int(-n), line })
                } else {
                    Ok(Term::Neg { expr: Box::new(eval), line })
                }
            }
            Term::App { func, arg, line } => self.eval_app(*func, *arg, line),
            Term::TypeApp { func, .. } => self.eval_term(*func),
            Term::Annotated { expr, .. } => self.eval_term(*expr),
            Term::FieldAccess {
                record, field_name, line,
            } => {
                let record_eval = self.eval_term(*record)?;
                if let Term::Record { fields, .. } = &record_eval {
                    if let Some(value) = fields.get(&field_name) {
                        return self.eval_term(value.clone());
                    }
                }
                Ok(Term::FieldAccess {
                    record: Box::new(record_eval),
                    field_name,
                    line,
                })
            }
        }
    }

    fn eval_var(&mut self, name: String, line: Line) -> Result<Term, EvalError> {
        if self.bounded.contains(&name) {
            return Ok(Term::Var { name, line });
        }
        if name == "read" {
            return Ok(Term::Lit {
                value: Lit::Str(read_stdin_line()),
                line,
            });
        }
        if let Some(value) = self.globals.get(&name) {
            return Ok(value.clone());
        }
        if poly_ast::builtin_function_names().contains(&name.as_str()) {
            // An opaque, not-yet-applied builtin value — left as a bare
            // `Var` so `eval_app` can recognize it by name once it's used.
            return Ok(Term::Var { name, line });
        }
        Err(EvalError::UnboundVariable { name, line })
    }

    fn eval_app(&mut self, func: Term, arg: Term, line: Line) -> Result<Term, EvalError> {
        let func_eval = self.eval_term(func)?;
        let arg_eval = self.eval_term(arg)?;
        if let Term::Lambda {
            param_name, body, ..
        } = &func_eval
        {
            let substituted = substitute_term(param_name, &arg_eval, (**body).clone(), &mut self.fresh);
            return self.eval_term(substituted);
        }
        if let Term::Var { name, .. } = &func_eval {
            if let Some(result) = self.apply_builtin(name, &arg_eval, line)? {
                return Ok(result);
            }
        }
        Ok(Term::App {
            func: Box::new(func_eval),
            arg: Box::new(arg_eval),
            line,
        })
    }

    /// `Ok(None)` means `name` isn't a recognized builtin, or is one but
    /// `arg` hasn't reduced to a shape it can act on yet (e.g. `head` of a
    /// still-residual list expression) — the caller leaves the application
    /// as a stuck `App` rather than treating it as an error.
    fn apply_builtin(&self, name: &str, arg: &Term, line: Line) -> Result<Option<Term>, EvalError> {
        match name {
            "print" => {
                print!("{arg}");
                Ok(Some(arg.clone()))
            }
            "println" => {
                println!("{arg}");
                Ok(Some(arg.clone()))
            }
            "string_to_int" => match arg {
                Term::Lit { value: Lit::Str(s), .. } => match s.trim().parse::<i64>() {
                    Ok(n) => Ok(Some(Term::Lit { value: Lit::Int(n), line })),
                    Err(_) => Err(EvalError::InvalidIntLiteral { text: s.clone(), line }),
                },
                _ => Ok(None),
            },
            "int_to_string" => match arg {
                Term::Lit { value: Lit::Int(n), .. } => {
                    Ok(Some(Term::Lit { value: Lit::Str(n.to_string()), line }))
                }
                _ => Ok(None),
            },
            "head" => match arg {
                Term::List { elements, .. } => match elements.first() {
                    Some(first) => Ok(Some(first.clone())),
                    None => Err(EvalError::EmptyListOperation { op: "head".to_string(), line }),
                },
                _ => Ok(None),
            },
            "tail" => match arg {
                Term::List { elements, line: elem_line } => {
                    if elements.is_empty() {
                        Err(EvalError::EmptyListOperation { op: "tail".to_string(), line })
                    } else {
                        Ok(Some(Term::List {
                            elements: elements[1..].to_vec(),
                            line: *elem_line,
                        }))
                    }
                }
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }
}

fn bool_value(term: &Term) -> Option<bool> {
    match term {
        Term::Lit { value: Lit::Bool(b), .. } => Some(*b),
        _ => None,
    }
}

fn lit_bool(b: bool, line: Line) -> Term {
    Term::Lit { value: Lit::Bool(b), line }
}

fn eval_rel(op: RelOp, left: &Lit, right: &Lit) -> bool {
    match op {
        RelOp::Eq => left == right,
        RelOp::Neq => left != right,
        RelOp::Gt => compare(left, right).is_gt(),
        RelOp::Lt => compare(left, right).is_lt(),
        RelOp::Geq => !compare(left, right).is_lt(),
        RelOp::Leq => !compare(left, right).is_gt(),
    }
}

fn compare(left: &Lit, right: &Lit) -> std::cmp::Ordering {
    match (left, right) {
        (Lit::Int(a), Lit::Int(b)) => a.cmp(b),
        (Lit::Str(a), Lit::Str(b)) => a.cmp(b),
        (Lit::Bool(a), Lit::Bool(b)) => a.cmp(b),
        _ => std::cmp::Ordering::Equal,
    }
}

fn read_stdin_line() -> String {
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).unwrap_or(0);
    line.trim_end_matches(['\n', '\r']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use poly_ast::Type;

    fn lit_int(n: i64) -> Term {
        Term::Lit { value: Lit::Int(n), line: 1 }
    }

    fn var(name: &str) -> Term {
        Term::Var { name: name.into(), line: 1 }
    }

    fn single_stmt(name: &str, expr: Term) -> Program {
        Program::new(vec![Stmt::Assign {
            name: name.to_string(),
            expr,
            line: 1,
        }])
    }

    fn evaluated_expr(program: Program) -> Term {
        match program.statements.into_iter().next().unwrap() {
            Stmt::Assign { expr, .. } => expr,
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn beta_reduces_identity_application() {
        let mut ev = Evaluator::new();
        let identity = Term::Lambda {
            param_name: "x".into(),
            param_type: Type::Named("Int".into()),
            body: Box::new(var("x")),
            line: 1,
        };
        let app = Term::App {
            func: Box::new(identity),
            arg: Box::new(lit_int(42)),
            line: 1,
        };
        let program = single_stmt("result", app);
        let out = ev.eval_program(program).unwrap();
        assert_eq!(evaluated_expr(out), lit_int(42));
    }

    #[test]
    fn capture_avoiding_substitution_under_beta_reduction() {
        // (\x. \y. x) y  ==>  \z. y   (renaming the inner binder, not y -> y capture)
        let mut ev = Evaluator::new();
        let inner = Term::Lambda {
            param_name: "y".into(),
            param_type: Type::Named("Int".into()),
            body: Box::new(var("x")),
            line: 1,
        };
        let outer = Term::Lambda {
            param_name: "x".into(),
            param_type: Type::Named("Int".into()),
            body: Box::new(inner),
            line: 1,
        };
        let app = Term::App {
            func: Box::new(outer),
            arg: Box::new(var("y")),
            line: 1,
        };
        let program = single_stmt("result", app);
        let out = ev.eval_program(program).unwrap();
        match evaluated_expr(out) {
            Term::Lambda { param_name, body, .. } => {
                assert_ne!(param_name, "y");
                assert_eq!(*body, var("y"));
            }
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn short_circuits_or_without_evaluating_right_when_left_is_true() {
        let mut ev = Evaluator::new();
        let term = Term::Or {
            left: Box::new(Term::Lit { value: Lit::Bool(true), line: 1 }),
            right: Box::new(var("undefined_var")),
            line: 1,
        };
        let out = ev.eval_term(term).unwrap();
        assert_eq!(out, Term::Lit { value: Lit::Bool(true), line: 1 });
    }

    #[test]
    fn short_circuits_and_without_evaluating_right_when_left_is_false() {
        let mut ev = Evaluator::new();
        let term = Term::And {
            left: Box::new(Term::Lit { value: Lit::Bool(false), line: 1 }),
            right: Box::new(var("undefined_var")),
            line: 1,
        };
        let out = ev.eval_term(term).unwrap();
        assert_eq!(out, Term::Lit { value: Lit::Bool(false), line: 1 });
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let mut ev = Evaluator::new();
        let term = Term::Mul {
            op: MulOp::Div,
            left: Box::new(lit_int(1)),
            right: Box::new(lit_int(0)),
            line: 7,
        };
        let err = ev.eval_term(term).unwrap_err();
        assert_eq!(err, EvalError::DivisionByZero { line: 7 });
    }

    #[test]
    fn mul_overflow_is_an_error_not_a_silent_zero() {
        let mut ev = Evaluator::new();
        let term = Term::Mul {
            op: MulOp::Div,
            left: Box::new(lit_int(i64::MIN)),
            right: Box::new(lit_int(-1)),
            line: 4,
        };
        let err = ev.eval_term(term).unwrap_err();
        assert_eq!(
            err,
            EvalError::ArithmeticOverflow {
                op: "/".to_string(),
                line: 4,
            }
        );
    }

    #[test]
    fn add_overflow_is_an_error() {
        let mut ev = Evaluator::new();
        let term = Term::Add {
            op: AddOp::Add,
            left: Box::new(lit_int(i64::MAX)),
            right: Box::new(lit_int(1)),
            line: 9,
        };
        let err = ev.eval_term(term).unwrap_err();
        assert_eq!(
            err,
            EvalError::ArithmeticOverflow {
                op: "+".to_string(),
                line: 9,
            }
        );
    }

    #[test]
    fn head_of_empty_list_is_an_error() {
        let mut ev = Evaluator::new();
        let term = Term::App {
            func: Box::new(var("head")),
            arg: Box::new(Term::List { elements: vec![], line: 3 }),
            line: 3,
        };
        let err = ev.eval_term(term).unwrap_err();
        assert_eq!(
            err,
            EvalError::EmptyListOperation { op: "head".to_string(), line: 3 }
        );
    }

    #[test]
    fn list_concatenation_via_add() {
        let mut ev = Evaluator::new();
        let term = Term::Add {
            op: AddOp::Add,
            left: Box::new(Term::List { elements: vec![lit_int(1)], line: 1 }),
            right: Box::new(Term::List { elements: vec![lit_int(2)], line: 1 }),
            line: 1,
        };
        let out = ev.eval_term(term).unwrap();
        assert_eq!(
            out,
            Term::List { elements: vec![lit_int(1), lit_int(2)], line: 1 }
        );
    }

    #[test]
    fn string_to_int_rejects_non_numeric_text() {
        let mut ev = Evaluator::new();
        let term = Term::App {
            func: Box::new(var("string_to_int")),
            arg: Box::new(Term::Lit { value: Lit::Str("abc".into()), line: 2 }),
            line: 2,
        };
        let err = ev.eval_term(term).unwrap_err();
        assert_eq!(
            err,
            EvalError::InvalidIntLiteral { text: "abc".to_string(), line: 2 }
        );
    }

    #[test]
    fn int_to_string_converts_a_literal() {
        let mut ev = Evaluator::new();
        let term = Term::App {
            func: Box::new(var("int_to_string")),
            arg: Box::new(lit_int(9)),
            line: 1,
        };
        let out = ev.eval_term(term).unwrap();
        assert_eq!(out, Term::Lit { value: Lit::Str("9".to_string()), line: 1 });
    }

    #[test]
    fn unbound_variable_is_an_error() {
        let mut ev = Evaluator::new();
        let err = ev.eval_term(var("nope")).unwrap_err();
        assert_eq!(err, EvalError::UnboundVariable { name: "nope".to_string(), line: 1 });
    }

    #[test]
    fn tail_of_non_empty_list() {
        let mut ev = Evaluator::new();
        let term = Term::App {
            func: Box::new(var("tail")),
            arg: Box::new(Term::List {
                elements: vec![lit_int(1), lit_int(2), lit_int(3)],
                line: 1,
            }),
            line: 1,
        };
        let out = ev.eval_term(term).unwrap();
        assert_eq!(out, Term::List { elements: vec![lit_int(2), lit_int(3)], line: 1 });
    }
}
