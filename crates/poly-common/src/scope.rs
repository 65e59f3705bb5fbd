use rustc_hash::FxHashMap;

/// A lexically scoped mapping: a stack of frames, innermost last.
///
/// Used for the type checker's Γ and for the dispatch pass's shadow
/// tracking. Lookup walks outward from the innermost frame until a binding
/// is found or the root is reached, matching `env.py`'s `Env.get`
/// (`self.vars` then `self.outer`), generalized from a recursive
/// outer-pointer chain to a flat `Vec` of frames — idiomatic Rust avoids the
/// self-referential `Option<Box<Env>>` chain the source uses, and a `Vec`
/// push/pop is exactly how every binder entry/exit in this pipeline is
/// already shaped (enter scope, recurse, leave scope).
#[derive(Debug, Clone)]
pub struct ScopeStack<T> {
    frames: Vec<FxHashMap<String, T>>,
}

impl<T> ScopeStack<T> {
    /// A scope stack with a single, empty root frame.
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![FxHashMap::default()],
        }
    }

    /// Push a new, empty lexical frame (call on entering a binder).
    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Pop the innermost lexical frame (call on leaving a binder).
    ///
    /// Panics if called more times than `push` — every caller in this
    /// workspace pairs `push`/`pop` around a single recursive visit, so an
    /// imbalance is a bug in the pass, not a reachable user-facing error.
    pub fn pop(&mut self) {
        self.frames.pop();
        assert!(!self.frames.is_empty(), "ScopeStack: popped the root frame");
    }

    /// Bind `name` in the innermost frame. Shadows any outer binding of the
    /// same name for the lifetime of that frame, per §3.5's "shadowing is
    /// permitted".
    pub fn define(&mut self, name: impl Into<String>, value: T) {
        self.frames
            .last_mut()
            .expect("ScopeStack always has at least one frame")
            .insert(name.into(), value);
    }

    /// Look up `name`, walking from the innermost frame outward.
    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Whether `name` is bound in the innermost frame only (used by the
    /// dispatch pass's `WhichTrait` shadow check, which only cares whether
    /// the binder currently being entered collides with a trait field name).
    pub fn defined_in_current(&self, name: &str) -> bool {
        self.frames
            .last()
            .expect("ScopeStack always has at least one frame")
            .contains_key(name)
    }
}

impl<T> Default for ScopeStack<T> {
    fn default() -> Self {
        Self::new()
    }
}
