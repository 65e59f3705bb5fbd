//! The `polyc` CLI: loads a serialized AST and runs it through
//! desugar -> resolve -> typeck -> dispatch -> eval (§6), grounded on
//! `snowc`'s subcommand-free `build` shape and `vex-cli`'s
//! `env_logger::init()` / `log::info!` / exit-code convention. Unlike
//! `snowc`, this front-end's external interface is a JSON AST, not source
//! text (no lexer/parser live in this workspace — see SPEC_FULL.md), so
//! there's nothing to parse before the pipeline begins.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;

use poly_ast::Program;
use poly_common::{Diagnostic, Severity};
use poly_desugar::Desugarer;
use poly_dispatch::Dispatcher;
use poly_eval::Evaluator;
use poly_resolve::Resolver;
use poly_typeck::Checker;

#[derive(Parser)]
#[command(name = "polyc", version, about = "Front end for a trait-polymorphic lambda calculus")]
struct Cli {
    /// Path to the serialized (JSON) AST to run.
    ast: PathBuf,

    /// Retain each diagnostic's trace and print the type-checking log
    /// alongside the evaluation log.
    #[arg(long)]
    debug: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => process::exit(0),
        Err(diag) => {
            let rendered = if cli.debug { diag.render_debug() } else { diag.render_terse() };
            eprintln!("{}", rendered.red());
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<(), Diagnostic> {
    log::info!("loading AST from {}", cli.ast.display());
    let text = std::fs::read_to_string(&cli.ast).map_err(|e| {
        Diagnostic::new(
            Severity::Syntax,
            0,
            format!("failed to read '{}': {e}", cli.ast.display()),
        )
    })?;
    let program: Program = serde_json::from_str(&text)
        .map_err(|e| Diagnostic::new(Severity::Syntax, 0, format!("invalid AST JSON: {e}")))?;

    log::debug!("desugaring");
    let program = Desugarer::new().desugar_program(program).map_err(Diagnostic::from)?;

    log::debug!("resolving");
    let program = Resolver::new().resolve_program(program).map_err(Diagnostic::from)?;

    log::debug!("type-checking");
    let (program, table, type_log) = Checker::new().check_program(program).map_err(Diagnostic::from)?;

    log::debug!("dispatching");
    let program = Dispatcher::new(table).dispatch_program(program).map_err(Diagnostic::from)?;

    log::debug!("evaluating");
    let mut evaluator = Evaluator::new();
    let _program = evaluator.eval_program(program).map_err(Diagnostic::from)?;

    if cli.debug {
        for (line, rendered) in &type_log {
            println!("// [Line {line}] type: {rendered}");
        }
    }
    for (line, rendered) in &evaluator.stmt_eval_info {
        println!("[Line {line}] {rendered}");
    }

    Ok(())
}
