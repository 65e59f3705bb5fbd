//! Statements and environment entries (§3.3). `Trait`/`Struct`/`Impl` are
//! surface forms eliminated by `poly_desugar`; `TraitFieldEnv`/`InstanceEnv`
//! are the synthetic statements it emits in their place.

use poly_common::Line;

use crate::term::Term;
use crate::types::Type;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TypeBindItem {
    pub name: String,
    pub ty: Type,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssignItem {
    pub name: String,
    pub value: Term,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Stmt {
    Assign {
        name: String,
        expr: Term,
        line: Line,
    },
    TypeAssign {
        name: String,
        ty: Type,
        line: Line,
    },
    ExprStmt {
        expr: Term,
        line: Line,
    },
    /// `trait T a { f: τ; … }`. Must bind exactly one type parameter
    /// (checked by the desugaring pass, not the parser).
    Trait {
        name: String,
        type_params: Vec<String>,
        items: Vec<TypeBindItem>,
        line: Line,
    },
    Struct {
        name: String,
        items: Vec<TypeBindItem>,
        line: Line,
    },
    Impl {
        name: String,
        type_param: Type,
        items: Vec<AssignItem>,
        line: Line,
    },
    /// Synthetic: registers a trait field accessor, `field ↦ trait`.
    TraitFieldEnv {
        field_name: String,
        trait_name: String,
        ty: Type,
        line: Line,
    },
    /// Synthetic: registers a dictionary, `(trait, inst-type) ↦ inst-expr`.
    InstanceEnv {
        trait_name: String,
        type_param: Type,
        inst_expr: Term,
        line: Line,
    },
}

impl Stmt {
    pub fn line(&self) -> Line {
        match self {
            Stmt::Assign { line, .. }
            | Stmt::TypeAssign { line, .. }
            | Stmt::ExprStmt { line, .. }
            | Stmt::Trait { line, .. }
            | Stmt::Struct { line, .. }
            | Stmt::Impl { line, .. }
            | Stmt::TraitFieldEnv { line, .. }
            | Stmt::InstanceEnv { line, .. } => *line,
        }
    }

    /// Whether this statement is one of the three surface forms the
    /// desugaring pass must remove (§3.5 invariant).
    pub fn is_surface_sugar(&self) -> bool {
        matches!(self, Stmt::Trait { .. } | Stmt::Struct { .. } | Stmt::Impl { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Program { statements }
    }
}
