//! The AST shared by every stage of the pipeline (§3): terms, types,
//! statements, and the generic traversal scaffolding the later passes build
//! on.
//!
//! The tree is built once by an external parser and is logically immutable
//! from here on (§3.6) — every pass below this crate returns a new tree
//! rather than mutating the one it was given.

mod builtin;
mod stmt;
mod subst;
mod term;
mod types;
mod visit;

pub use builtin::{
    bool_type, builtin_function_names, builtin_function_types, int_type, is_builtin_type, string_type,
};
pub use stmt::{AssignItem, Program, Stmt, TypeBindItem};
pub use subst::substitute_type;
pub use term::{AddOp, Lit, MulOp, RelOp, Term};
pub use types::{is_builtin_type_name, Type, BOOL, ERASED_TYPE, INT, KIND_OF_TYPES, STRING};
pub use visit::{free_type_vars, TransformType, VisitType};
