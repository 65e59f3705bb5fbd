//! End-to-end integration tests (§8's S1-S6), grounded on `snowc`'s
//! `compile_and_run`/`compile_expect_error` shape: each test builds a
//! `Program` value directly (there is no lexer/parser in this workspace —
//! the external interface is a serialized AST, not source text), writes it
//! to a temp file as JSON, invokes the compiled `polyc` binary against it,
//! and asserts on stdout/stderr/exit status.

use std::path::PathBuf;
use std::process::{Command, Output};

use poly_ast::{AssignItem, Lit, Program, RelOp, Stmt, Term, Type, TypeBindItem};

fn named(name: &str) -> Type {
    Type::Named(name.to_string())
}

fn var(name: &str, line: u32) -> Term {
    Term::Var { name: name.to_string(), line }
}

fn lit_int(n: i64, line: u32) -> Term {
    Term::Lit { value: Lit::Int(n), line }
}

fn polyc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_polyc"))
}

fn run_program(program: Program) -> Output {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let ast_path = dir.path().join("ast.json");
    let json = serde_json::to_string(&program).expect("failed to serialize AST");
    std::fs::write(&ast_path, json).expect("failed to write AST fixture");

    Command::new(polyc_bin())
        .arg(&ast_path)
        .output()
        .expect("failed to invoke polyc")
}

fn run_ok(program: Program) -> String {
    let output = run_program(program);
    assert!(
        output.status.success(),
        "polyc failed:\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn run_err(program: Program) -> String {
    let output = run_program(program);
    assert!(
        !output.status.success(),
        "expected polyc to fail but it exited 0, stdout:\n{}",
        String::from_utf8_lossy(&output.stdout)
    );
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// S1: identity instantiated at `Int` and applied.
#[test]
fn s1_identity_at_int() {
    let identity = Term::TypeLambda {
        param_name: "a".into(),
        trait_bounds: vec![],
        body: Box::new(Term::Lambda {
            param_name: "x".into(),
            param_type: named("a"),
            body: Box::new(var("x", 1)),
            line: 1,
        }),
        line: 1,
    };
    let applied = Term::App {
        func: Box::new(Term::TypeApp {
            func: Box::new(identity),
            type_arg: named("Int"),
            line: 2,
        }),
        arg: Box::new(lit_int(5, 2)),
        line: 2,
    };
    let program = Program::new(vec![Stmt::Assign {
        name: "result".into(),
        expr: applied,
        line: 2,
    }]);
    let stdout = run_ok(program);
    assert!(stdout.contains("result = 5"), "stdout was:\n{stdout}");
}

/// S2: a `Show` trait with an `Int` instance, dispatched via `show @Int`.
#[test]
fn s2_show_trait_for_int() {
    let trait_stmt = Stmt::Trait {
        name: "Show".into(),
        type_params: vec!["a".into()],
        items: vec![TypeBindItem {
            name: "show".into(),
            ty: Type::Arrow(Box::new(named("a")), Box::new(named("String"))),
            line: 1,
        }],
        line: 1,
    };
    let impl_stmt = Stmt::Impl {
        name: "Show".into(),
        type_param: named("Int"),
        items: vec![AssignItem {
            name: "show".into(),
            value: var("int_to_string", 2),
            line: 2,
        }],
        line: 2,
    };
    let use_stmt = Stmt::Assign {
        name: "result".into(),
        expr: Term::App {
            func: Box::new(Term::TypeApp {
                func: Box::new(var("show", 3)),
                type_arg: named("Int"),
                line: 3,
            }),
            arg: Box::new(lit_int(5, 3)),
            line: 3,
        },
        line: 3,
    };
    let program = Program::new(vec![trait_stmt, impl_stmt, use_stmt]);
    let stdout = run_ok(program);
    assert!(stdout.contains(r#"result = "5""#), "stdout was:\n{stdout}");
}

/// S3: a struct's curried constructor, applied and field-accessed.
#[test]
fn s3_struct_constructor_and_field_access() {
    let struct_stmt = Stmt::Struct {
        name: "Point".into(),
        items: vec![
            TypeBindItem { name: "x".into(), ty: named("Int"), line: 1 },
            TypeBindItem { name: "y".into(), ty: named("Int"), line: 1 },
        ],
        line: 1,
    };
    let make_point = Stmt::Assign {
        name: "p".into(),
        expr: Term::App {
            func: Box::new(Term::App {
                func: Box::new(var("Point", 2)),
                arg: Box::new(lit_int(1, 2)),
                line: 2,
            }),
            arg: Box::new(lit_int(2, 2)),
            line: 2,
        },
        line: 2,
    };
    let access = Stmt::Assign {
        name: "result".into(),
        expr: Term::FieldAccess {
            record: Box::new(var("p", 3)),
            field_name: "x".into(),
            line: 3,
        },
        line: 3,
    };
    let program = Program::new(vec![struct_stmt, make_point, access]);
    let stdout = run_ok(program);
    assert!(stdout.contains("result = 1"), "stdout was:\n{stdout}");
}

/// S4: a `Show`-bounded generic function applied at `Int`.
#[test]
fn s4_bounded_generic_application() {
    let trait_stmt = Stmt::Trait {
        name: "Show".into(),
        type_params: vec!["a".into()],
        items: vec![TypeBindItem {
            name: "show".into(),
            ty: Type::Arrow(Box::new(named("a")), Box::new(named("String"))),
            line: 1,
        }],
        line: 1,
    };
    let impl_stmt = Stmt::Impl {
        name: "Show".into(),
        type_param: named("Int"),
        items: vec![AssignItem {
            name: "show".into(),
            value: var("int_to_string", 2),
            line: 2,
        }],
        line: 2,
    };
    let describe = Stmt::Assign {
        name: "describe".into(),
        expr: Term::TypeLambda {
            param_name: "a".into(),
            trait_bounds: vec!["Show".into()],
            body: Box::new(Term::Lambda {
                param_name: "x".into(),
                param_type: named("a"),
                body: Box::new(Term::App {
                    func: Box::new(Term::TypeApp {
                        func: Box::new(var("show", 3)),
                        type_arg: named("a"),
                        line: 3,
                    }),
                    arg: Box::new(var("x", 3)),
                    line: 3,
                }),
                line: 3,
            }),
            line: 3,
        },
        line: 3,
    };
    let use_stmt = Stmt::Assign {
        name: "result".into(),
        expr: Term::App {
            func: Box::new(Term::TypeApp {
                func: Box::new(var("describe", 4)),
                type_arg: named("Int"),
                line: 4,
            }),
            arg: Box::new(lit_int(7, 4)),
            line: 4,
        },
        line: 4,
    };
    let program = Program::new(vec![trait_stmt, impl_stmt, describe, use_stmt]);
    let stdout = run_ok(program);
    assert!(stdout.contains(r#"result = "7""#), "stdout was:\n{stdout}");
}

/// S5: `f = \y: Int. (\x: Int. \y: Int. x) y` — applying the inner lambda
/// to the outer-bound `y` must rename the inner lambda's own `y` binder
/// rather than letting it capture the reference to the outer one.
#[test]
fn s5_capture_avoidance() {
    let inner = Term::Lambda {
        param_name: "x".into(),
        param_type: named("Int"),
        body: Box::new(Term::Lambda {
            param_name: "y".into(),
            param_type: named("Int"),
            body: Box::new(var("x", 1)),
            line: 1,
        }),
        line: 1,
    };
    let applied = Term::App {
        func: Box::new(inner),
        arg: Box::new(var("y", 1)),
        line: 1,
    };
    let f = Term::Lambda {
        param_name: "y".into(),
        param_type: named("Int"),
        body: Box::new(applied),
        line: 1,
    };
    let program = Program::new(vec![Stmt::Assign { name: "f".into(), expr: f, line: 1 }]);
    let stdout = run_ok(program);
    // The inner shadowing `y` must have been renamed away from plain `y`,
    // and the surviving body must still refer to the *outer* `y`.
    assert!(stdout.contains("f = \\y: ?."), "stdout was:\n{stdout}");
    assert!(!stdout.contains(". \\y: ?. y"), "inner binder was not renamed:\n{stdout}");
    assert!(stdout.trim_end().ends_with(". y"), "body did not resolve to the outer `y`:\n{stdout}");
}

/// S6: a `show @Int` reference with no registered `Show Int` instance must
/// fail the pipeline rather than succeed or panic.
#[test]
fn s6_unbound_instance() {
    let trait_stmt = Stmt::Trait {
        name: "Show".into(),
        type_params: vec!["a".into()],
        items: vec![TypeBindItem {
            name: "show".into(),
            ty: Type::Arrow(Box::new(named("a")), Box::new(named("String"))),
            line: 1,
        }],
        line: 1,
    };
    let use_stmt = Stmt::Assign {
        name: "result".into(),
        expr: Term::App {
            func: Box::new(Term::TypeApp {
                func: Box::new(var("show", 2)),
                type_arg: named("Int"),
                line: 2,
            }),
            arg: Box::new(lit_int(5, 2)),
            line: 2,
        },
        line: 2,
    };
    let program = Program::new(vec![trait_stmt, use_stmt]);
    let stderr = run_err(program);
    assert!(stderr.contains("Show"), "stderr was:\n{stderr}");
}

/// Boundary case from §8: division by zero surfaces as the enumerated
/// runtime error, not a panic or a silent wrong answer.
#[test]
fn division_by_zero_is_a_runtime_error() {
    let program = Program::new(vec![Stmt::Assign {
        name: "result".into(),
        expr: Term::Mul {
            op: poly_ast::MulOp::Div,
            left: Box::new(lit_int(1, 1)),
            right: Box::new(lit_int(0, 1)),
            line: 1,
        },
        line: 1,
    }]);
    let stderr = run_err(program);
    assert!(stderr.to_lowercase().contains("division"), "stderr was:\n{stderr}");
}

/// Boundary case from §8: a zero-field trait still desugars and dispatches
/// successfully.
#[test]
fn zero_field_trait_succeeds() {
    let trait_stmt = Stmt::Trait {
        name: "Marker".into(),
        type_params: vec!["a".into()],
        items: vec![],
        line: 1,
    };
    let impl_stmt = Stmt::Impl {
        name: "Marker".into(),
        type_param: named("Int"),
        items: vec![],
        line: 2,
    };
    let use_stmt = Stmt::Assign {
        name: "result".into(),
        expr: Term::Rel {
            op: RelOp::Eq,
            left: Box::new(lit_int(1, 3)),
            right: Box::new(lit_int(1, 3)),
            line: 3,
        },
        line: 3,
    };
    let program = Program::new(vec![trait_stmt, impl_stmt, use_stmt]);
    let stdout = run_ok(program);
    assert!(stdout.contains("result = true"), "stdout was:\n{stdout}");
}

/// `cons` is a fixed desugaring (DESIGN.md decision 4), available in every
/// program without a user-written definition.
#[test]
fn cons_builds_a_list_without_a_user_definition() {
    let program = Program::new(vec![Stmt::Assign {
        name: "result".into(),
        expr: Term::App {
            func: Box::new(Term::App {
                func: Box::new(Term::TypeApp {
                    func: Box::new(var("cons", 1)),
                    type_arg: named("Int"),
                    line: 1,
                }),
                arg: Box::new(lit_int(1, 1)),
                line: 1,
            }),
            arg: Box::new(Term::List {
                elements: vec![lit_int(2, 1), lit_int(3, 1)],
                line: 1,
            }),
            line: 1,
        },
        line: 1,
    }]);
    let stdout = run_ok(program);
    assert!(stdout.contains("result = [1, 2, 3]"), "stdout was:\n{stdout}");
}
