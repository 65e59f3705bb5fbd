//! Resolves what the filtered `dispatcher.py` reads as `node.func.checked_type`
//! — a mutated-in-place attribute the retrieved sources never visibly set
//! (see SPEC_FULL.md, "Node-identity resolution").
//!
//! The checker rebuilds the tree (§4.3's implicit-application rule can turn a
//! bare `App` into a `TypeApp`), so this can't be a field mutated on the
//! original nodes. Instead every `Box<Term>` child is finalized exactly once
//! — unboxed, checked, reboxed via a single `Box::new` — and the type is
//! recorded against that box's heap address at the moment it is created. No
//! later pass re-boxes a `Term`, so the address dispatch dereferences through
//! a parent's `func: Box<Term>` field is the same one recorded here.

use rustc_hash::FxHashMap;

use poly_ast::{Term, Type};

#[derive(Debug, Default)]
pub struct TypeTable {
    by_address: FxHashMap<usize, Type>,
}

impl TypeTable {
    pub fn new() -> Self {
        TypeTable::default()
    }

    pub fn insert(&mut self, term: &Term, ty: Type) {
        self.by_address.insert(term as *const Term as usize, ty);
    }

    pub fn get(&self, term: &Term) -> Option<&Type> {
        self.by_address.get(&(term as *const Term as usize))
    }
}
