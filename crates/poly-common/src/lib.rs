//! Shared infrastructure for the pipeline crates: source line numbers, a
//! lexical scope stack, a per-pass fresh-name generator, and plain
//! (uncolored) diagnostics.
//!
//! Presentation — coloring, `--debug` trace retention — lives in `polyc`.
//! Everything here is data only, mirroring how `mesh-typeck::error` keeps
//! `TypeError` itself free of any rendering concern.

mod diagnostic;
mod fresh;
mod scope;

pub use diagnostic::{Diagnostic, Severity};
pub use fresh::FreshNameGen;
pub use scope::ScopeStack;

/// A 1-based source line number. `0` means "no known location" (used for
/// synthetic nodes introduced by a pass rather than copied from source).
pub type Line = u32;
