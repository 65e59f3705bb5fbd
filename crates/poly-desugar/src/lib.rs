//! Eliminates `Trait`/`Struct`/`Impl` surface forms (§4.1), grounded on
//! `trait.py`'s `TraitDesugarVisitor` for the record/currying shape and on
//! spec §4.1 for the `TraitFieldEnv`/`InstanceEnv` statements the filtered
//! source's `trait.py` never emitted. Also expands `cons` (§4.5, §9 decision
//! 4) at each of its use sites: a reference `Var "cons"` becomes
//! `\a. \x: a. \xs: [a]. [x] + xs`, the same way a macro or an inlined
//! builtin would, rather than a binding injected into every program.
//!
//! A tree with none of the three surface forms and no `cons` reference is
//! returned unchanged (desugar idempotence, §8 property 1) since every other
//! `Stmt`/`Term` variant passes through untouched.

mod error;

pub use error::DesugarError;

use indexmap::IndexMap;
use log::debug;

use poly_ast::{free_type_vars, AssignItem, Program, Stmt, Term, Type, TypeBindItem};
use poly_common::Line;

/// Owns the monotonically increasing instance counter (`__T_inst_k`, §4.1)
/// across a single desugaring run.
#[derive(Debug, Default)]
pub struct Desugarer {
    inst_counter: u64,
}

impl Desugarer {
    pub fn new() -> Self {
        Desugarer::default()
    }

    pub fn desugar_program(&mut self, program: Program) -> Result<Program, DesugarError> {
        let mut statements = Vec::with_capacity(program.statements.len());
        for stmt in program.statements {
            for out in self.desugar_stmt(stmt)? {
                statements.push(rewrite_cons_in_stmt(out));
            }
        }
        Ok(Program::new(statements))
    }

    fn desugar_stmt(&mut self, stmt: Stmt) -> Result<Vec<Stmt>, DesugarError> {
        match stmt {
            Stmt::Trait {
                name,
                type_params,
                items,
                line,
            } => desugar_trait(name, type_params, items, line),
            Stmt::Struct { name, items, line } => desugar_struct(name, items, line),
            Stmt::Impl {
                name,
                type_param,
                items,
                line,
            } => self.desugar_impl(name, type_param, items, line),
            other => Ok(vec![other]),
        }
    }

    fn desugar_impl(
        &mut self,
        trait_name: String,
        type_param: Type,
        items: Vec<AssignItem>,
        line: Line,
    ) -> Result<Vec<Stmt>, DesugarError> {
        let mut fields = IndexMap::new();
        for item in &items {
            if fields
                .insert(item.name.clone(), item.value.clone())
                .is_some()
            {
                return Err(DesugarError::DuplicateField {
                    owner: trait_name.clone(),
                    field: item.name.clone(),
                    line,
                });
            }
        }

        self.inst_counter += 1;
        let inst_name = format!("__{trait_name}_inst_{}", self.inst_counter);

        let dict_value = Term::Record { fields, line };
        let dict_ty = Type::App(
            Box::new(Type::Named(trait_name.clone())),
            Box::new(type_param.clone()),
        );
        let annotated = Term::Annotated {
            expr: Box::new(dict_value),
            ty: dict_ty,
            line,
        };
        let assign = Stmt::Assign {
            name: inst_name.clone(),
            expr: annotated,
            line,
        };
        let instance_env = Stmt::InstanceEnv {
            trait_name,
            type_param,
            inst_expr: Term::Var {
                name: inst_name,
                line,
            },
            line,
        };
        debug!("desugared impl into {assign:?} + instance env entry");
        Ok(vec![assign, instance_env])
    }
}

/// `\a. \x: a. \xs: [a]. [x] + xs` (DESIGN.md open-question decision 4,
/// spec §9): what a reference to `cons` expands to. Its reduction rides on
/// the very same `Add(List)` rule list-literal concatenation already needs,
/// so once expanded it needs no special casing in `poly_typeck`/`poly_eval`.
/// Carries `line` (the line of the `cons` reference being expanded) on every
/// synthesized node, per `term.rs`'s "synthetic nodes carry the line of the
/// statement that produced them".
fn cons_expansion(line: Line) -> Term {
    let elem = Type::Named("a".to_string());
    let list_a = Type::List(Some(Box::new(elem.clone())));
    let body = Term::Lambda {
        param_name: "x".to_string(),
        param_type: elem,
        body: Box::new(Term::Lambda {
            param_name: "xs".to_string(),
            param_type: list_a,
            body: Box::new(Term::Add {
                op: poly_ast::AddOp::Add,
                left: Box::new(Term::List {
                    elements: vec![Term::Var {
                        name: "x".to_string(),
                        line,
                    }],
                    line,
                }),
                right: Box::new(Term::Var {
                    name: "xs".to_string(),
                    line,
                }),
                line,
            }),
            line,
        }),
        line,
    };
    Term::TypeLambda {
        param_name: "a".to_string(),
        trait_bounds: Vec::new(),
        body: Box::new(body),
        line,
    }
}

/// Rewrites every `Term` carried by `stmt`, expanding `cons` references in
/// place. `Trait`/`Struct`/`Impl` never reach this point (desugared away
/// earlier in the same pass); `TypeAssign`/`TraitFieldEnv` carry no `Term`.
fn rewrite_cons_in_stmt(stmt: Stmt) -> Stmt {
    match stmt {
        Stmt::Assign { name, expr, line } => Stmt::Assign {
            name,
            expr: rewrite_cons_in_term(expr),
            line,
        },
        Stmt::ExprStmt { expr, line } => Stmt::ExprStmt {
            expr: rewrite_cons_in_term(expr),
            line,
        },
        Stmt::InstanceEnv {
            trait_name,
            type_param,
            inst_expr,
            line,
        } => Stmt::InstanceEnv {
            trait_name,
            type_param,
            inst_expr: rewrite_cons_in_term(inst_expr),
            line,
        },
        other => other,
    }
}

/// Replaces every `Var { name: "cons", .. }` in `term` with its expansion,
/// recursing through every other variant structurally.
fn rewrite_cons_in_term(term: Term) -> Term {
    match term {
        Term::Var { name, line } if name == "cons" => cons_expansion(line),
        Term::Var { .. } | Term::Lit { .. } => term,
        Term::List { elements, line } => Term::List {
            elements: elements.into_iter().map(rewrite_cons_in_term).collect(),
            line,
        },
        Term::Record { fields, line } => Term::Record {
            fields: fields
                .into_iter()
                .map(|(label, value)| (label, rewrite_cons_in_term(value)))
                .collect(),
            line,
        },
        Term::Lambda {
            param_name,
            param_type,
            body,
            line,
        } => Term::Lambda {
            param_name,
            param_type,
            body: Box::new(rewrite_cons_in_term(*body)),
            line,
        },
        Term::TypeLambda {
            param_name,
            trait_bounds,
            body,
            line,
        } => Term::TypeLambda {
            param_name,
            trait_bounds,
            body: Box::new(rewrite_cons_in_term(*body)),
            line,
        },
        Term::App { func, arg, line } => Term::App {
            func: Box::new(rewrite_cons_in_term(*func)),
            arg: Box::new(rewrite_cons_in_term(*arg)),
            line,
        },
        Term::TypeApp { func, type_arg, line } => Term::TypeApp {
            func: Box::new(rewrite_cons_in_term(*func)),
            type_arg,
            line,
        },
        Term::FieldAccess {
            record,
            field_name,
            line,
        } => Term::FieldAccess {
            record: Box::new(rewrite_cons_in_term(*record)),
            field_name,
            line,
        },
        Term::Annotated { expr, ty, line } => Term::Annotated {
            expr: Box::new(rewrite_cons_in_term(*expr)),
            ty,
            line,
        },
        Term::If {
            cond,
            then_branch,
            else_branch,
            line,
        } => Term::If {
            cond: Box::new(rewrite_cons_in_term(*cond)),
            then_branch: Box::new(rewrite_cons_in_term(*then_branch)),
            else_branch: Box::new(rewrite_cons_in_term(*else_branch)),
            line,
        },
        Term::Or { left, right, line } => Term::Or {
            left: Box::new(rewrite_cons_in_term(*left)),
            right: Box::new(rewrite_cons_in_term(*right)),
            line,
        },
        Term::And { left, right, line } => Term::And {
            left: Box::new(rewrite_cons_in_term(*left)),
            right: Box::new(rewrite_cons_in_term(*right)),
            line,
        },
        Term::Not { expr, line } => Term::Not {
            expr: Box::new(rewrite_cons_in_term(*expr)),
            line,
        },
        Term::Rel { op, left, right, line } => Term::Rel {
            op,
            left: Box::new(rewrite_cons_in_term(*left)),
            right: Box::new(rewrite_cons_in_term(*right)),
            line,
        },
        Term::Add { op, left, right, line } => Term::Add {
            op,
            left: Box::new(rewrite_cons_in_term(*left)),
            right: Box::new(rewrite_cons_in_term(*right)),
            line,
        },
        Term::Mul { op, left, right, line } => Term::Mul {
            op,
            left: Box::new(rewrite_cons_in_term(*left)),
            right: Box::new(rewrite_cons_in_term(*right)),
            line,
        },
        Term::Neg { expr, line } => Term::Neg {
            expr: Box::new(rewrite_cons_in_term(*expr)),
            line,
        },
    }
}

fn desugar_trait(
    name: String,
    type_params: Vec<String>,
    items: Vec<TypeBindItem>,
    line: Line,
) -> Result<Vec<Stmt>, DesugarError> {
    if type_params.len() != 1 {
        return Err(DesugarError::TraitArity {
            name,
            found: type_params.len(),
            line,
        });
    }
    let type_param = type_params.into_iter().next().unwrap();

    let mut fields = IndexMap::new();
    for item in &items {
        if fields.insert(item.name.clone(), item.ty.clone()).is_some() {
            return Err(DesugarError::DuplicateField {
                owner: name.clone(),
                field: item.name.clone(),
                line,
            });
        }
        if contains_non_prenex_self_reference(&type_param, &item.ty) {
            return Err(DesugarError::NonPrenexSelfReference {
                trait_name: name.clone(),
                type_param: type_param.clone(),
                field: item.name.clone(),
                line: item.line,
            });
        }
    }

    let dict_type = Type::ForAll {
        param_name: type_param.clone(),
        trait_bounds: Vec::new(),
        body: Box::new(Type::Record(fields)),
    };

    let mut out = Vec::with_capacity(1 + items.len());
    out.push(Stmt::TypeAssign {
        name: name.clone(),
        ty: dict_type,
        line,
    });
    for item in items {
        out.push(Stmt::TraitFieldEnv {
            field_name: item.name,
            trait_name: name.clone(),
            ty: Type::ForAll {
                param_name: type_param.clone(),
                trait_bounds: vec![name.clone()],
                body: Box::new(item.ty),
            },
            line: item.line,
        });
    }
    debug!("desugared trait '{name}' into {} statements", out.len());
    Ok(out)
}

fn desugar_struct(name: String, items: Vec<TypeBindItem>, line: Line) -> Result<Vec<Stmt>, DesugarError> {
    let mut fields = IndexMap::new();
    for item in &items {
        if fields.insert(item.name.clone(), item.ty.clone()).is_some() {
            return Err(DesugarError::DuplicateField {
                owner: name.clone(),
                field: item.name.clone(),
                line,
            });
        }
    }
    let type_def = Stmt::TypeAssign {
        name: name.clone(),
        ty: Type::Record(fields),
        line,
    };

    let param_names: Vec<String> = (0..items.len()).map(|i| format!("__x{i}")).collect();
    let mut record_fields = IndexMap::new();
    for (param_name, item) in param_names.iter().zip(items.iter()) {
        record_fields.insert(
            item.name.clone(),
            Term::Var {
                name: param_name.clone(),
                line,
            },
        );
    }
    let mut body = Term::Record {
        fields: record_fields,
        line,
    };
    for (param_name, item) in param_names.into_iter().zip(items).rev() {
        body = Term::Lambda {
            param_name,
            param_type: item.ty,
            body: Box::new(body),
            line,
        };
    }
    let constructor_def = Stmt::Assign {
        name,
        expr: body,
        line,
    };
    Ok(vec![type_def, constructor_def])
}

/// Whether `trait_var` occurs free under a `ForAll` nested *inside* `ty`
/// (as opposed to occurring directly, e.g. as an arrow domain/codomain,
/// which is the ordinary dictionary-method shape like `show: a -> String`).
fn contains_non_prenex_self_reference(trait_var: &str, ty: &Type) -> bool {
    fn walk(trait_var: &str, ty: &Type, under_nested_forall: bool) -> bool {
        match ty {
            Type::Named(_) => false,
            Type::App(func, arg) => {
                walk(trait_var, func, under_nested_forall) || walk(trait_var, arg, under_nested_forall)
            }
            Type::Arrow(left, right) => {
                walk(trait_var, left, under_nested_forall) || walk(trait_var, right, under_nested_forall)
            }
            Type::List(Some(elem)) => walk(trait_var, elem, under_nested_forall),
            Type::List(None) => false,
            Type::Record(fields) => fields
                .values()
                .any(|field_ty| walk(trait_var, field_ty, under_nested_forall)),
            Type::ForAll {
                param_name, body, ..
            } => {
                if under_nested_forall && param_name != trait_var && free_type_vars(body).contains(trait_var) {
                    return true;
                }
                walk(trait_var, body, true)
            }
        }
    }
    walk(trait_var, ty, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use poly_ast::{Lit, RelOp};

    fn named(name: &str) -> Type {
        Type::Named(name.to_string())
    }

    #[test]
    fn trait_desugars_to_type_assign_and_field_env_per_field() {
        let out = desugar_trait(
            "Show".into(),
            vec!["a".into()],
            vec![TypeBindItem {
                name: "show".into(),
                ty: Type::Arrow(Box::new(named("a")), Box::new(named("String"))),
                line: 1,
            }],
            1,
        )
        .unwrap();
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], Stmt::TypeAssign { .. }));
        assert!(matches!(out[1], Stmt::TraitFieldEnv { .. }));
    }

    #[test]
    fn trait_with_more_than_one_type_param_is_rejected() {
        let err = desugar_trait("Pair".into(), vec!["a".into(), "b".into()], vec![], 1).unwrap_err();
        assert!(matches!(err, DesugarError::TraitArity { found: 2, .. }));
    }

    #[test]
    fn struct_desugars_to_type_assign_and_curried_constructor() {
        let out = desugar_struct(
            "P".into(),
            vec![
                TypeBindItem {
                    name: "x".into(),
                    ty: named("Int"),
                    line: 1,
                },
                TypeBindItem {
                    name: "y".into(),
                    ty: named("Int"),
                    line: 1,
                },
            ],
            1,
        )
        .unwrap();
        assert_eq!(out.len(), 2);
        match &out[1] {
            Stmt::Assign { expr, .. } => {
                assert!(matches!(expr, Term::Lambda { .. }));
            }
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn impl_desugars_to_assign_and_instance_env_with_increasing_names() {
        let mut d = Desugarer::new();
        let items = vec![AssignItem {
            name: "show".into(),
            value: Term::Var {
                name: "int_to_string".into(),
                line: 2,
            },
            line: 2,
        }];
        let first = d.desugar_impl("Show".into(), named("Int"), items.clone(), 2).unwrap();
        let second = d.desugar_impl("Show".into(), named("Int"), items, 2).unwrap();
        let first_name = match &first[0] {
            Stmt::Assign { name, .. } => name.clone(),
            _ => panic!("expected Assign"),
        };
        let second_name = match &second[0] {
            Stmt::Assign { name, .. } => name.clone(),
            _ => panic!("expected Assign"),
        };
        assert_ne!(first_name, second_name);
        assert!(matches!(first[1], Stmt::InstanceEnv { .. }));
    }

    #[test]
    fn duplicate_field_in_trait_is_rejected() {
        let items = vec![
            TypeBindItem {
                name: "show".into(),
                ty: named("a"),
                line: 1,
            },
            TypeBindItem {
                name: "show".into(),
                ty: named("a"),
                line: 1,
            },
        ];
        let err = desugar_trait("Show".into(), vec!["a".into()], items, 1).unwrap_err();
        assert!(matches!(err, DesugarError::DuplicateField { .. }));
    }

    #[test]
    fn non_prenex_self_reference_is_rejected() {
        // f: (forall b. b -> a) -> a   -- `a` escapes under the nested `forall b`.
        let nested = Type::ForAll {
            param_name: "b".into(),
            trait_bounds: vec![],
            body: Box::new(Type::Arrow(Box::new(named("b")), Box::new(named("a")))),
        };
        let field_ty = Type::Arrow(Box::new(nested), Box::new(named("a")));
        let err = desugar_trait(
            "Weird".into(),
            vec!["a".into()],
            vec![TypeBindItem {
                name: "f".into(),
                ty: field_ty,
                line: 5,
            }],
            5,
        )
        .unwrap_err();
        assert!(matches!(err, DesugarError::NonPrenexSelfReference { .. }));
    }

    #[test]
    fn ordinary_dictionary_method_shape_is_accepted() {
        // show: a -> String -- `a` is a direct arrow domain, not nested.
        let field_ty = Type::Arrow(Box::new(named("a")), Box::new(named("String")));
        let out = desugar_trait(
            "Show".into(),
            vec!["a".into()],
            vec![TypeBindItem {
                name: "show".into(),
                ty: field_ty,
                line: 1,
            }],
            1,
        )
        .unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn non_surface_statements_pass_through_unchanged() {
        let mut d = Desugarer::new();
        let stmt = Stmt::ExprStmt {
            expr: Term::Rel {
                op: RelOp::Eq,
                left: Box::new(Term::Lit {
                    value: Lit::Int(1),
                    line: 1,
                }),
                right: Box::new(Term::Lit {
                    value: Lit::Int(1),
                    line: 1,
                }),
                line: 1,
            },
            line: 1,
        };
        let program = Program::new(vec![stmt.clone()]);
        let out = d.desugar_program(program).unwrap();
        assert_eq!(out.statements, vec![stmt]);
    }

    #[test]
    fn a_program_with_no_cons_reference_gets_no_synthesized_binding() {
        let mut d = Desugarer::new();
        let program = Program::new(vec![]);
        let out = d.desugar_program(program).unwrap();
        assert!(out.statements.is_empty());
    }

    #[test]
    fn cons_reference_expands_at_its_use_site() {
        let mut d = Desugarer::new();
        let stmt = Stmt::Assign {
            name: "result".into(),
            expr: Term::Var {
                name: "cons".into(),
                line: 3,
            },
            line: 3,
        };
        let program = Program::new(vec![stmt]);
        let out = d.desugar_program(program).unwrap();
        match &out.statements[..] {
            [Stmt::Assign { name, expr, .. }] => {
                assert_eq!(name, "result");
                assert!(matches!(expr, Term::TypeLambda { param_name, .. } if param_name == "a"));
            }
            other => panic!("expected a single Assign with the expanded lambda, got {other:?}"),
        }
    }

    #[test]
    fn a_name_merely_containing_cons_is_not_rewritten() {
        let mut d = Desugarer::new();
        let stmt = Stmt::Assign {
            name: "result".into(),
            expr: Term::Var {
                name: "unicorns".into(),
                line: 1,
            },
            line: 1,
        };
        let program = Program::new(vec![stmt.clone()]);
        let out = d.desugar_program(program).unwrap();
        assert_eq!(out.statements, vec![stmt]);
    }
}
