//! Type environment with scope stack.
//!
//! The type environment maps variable names to their type schemes. It uses
//! a scope stack (Vec of HashMaps) so that entering a new scope (function
//! body, `where` clause) pushes a new frame, and leaving pops it. Lookups
//! search from the innermost scope outward.

use rustc_hash::FxHashMap;

use crate::ty::Scheme;

/// A type environment: a stack of scopes mapping names to type schemes.
pub struct TypeEnv {
    /// The scope stack. Index 0 is the outermost (global) scope.
    scopes: Vec<FxHashMap<String, Scheme>>,
}

impl TypeEnv {
    /// Create a new type environment with one empty global scope.
    pub fn new() -> Self {
        TypeEnv {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Push a new empty scope onto the stack.
    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Pop the top scope from the stack.
    ///
    /// # Panics
    ///
    /// Panics if called when only the global scope remains.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    /// Insert a name-scheme binding into the current (topmost) scope.
    pub fn insert(&mut self, name: String, scheme: Scheme) {
        self.scopes
            .last_mut()
            .expect("scope stack should never be empty")
            .insert(name, scheme);
    }

    /// Look up a name, searching from the innermost scope outward.
    pub fn lookup(&self, name: &str) -> Option<&Scheme> {
        for scope in self.scopes.iter().rev() {
            if let Some(scheme) = scope.get(name) {
                return Some(scheme);
            }
        }
        None
    }

    /// Number of scopes on the stack.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// All schemes currently visible, except the binding named `name` in the
    /// innermost scope that has one. Used by `let`-generalization: the
    /// binding's own placeholder scheme must not keep its free variables from
    /// being quantified.
    pub fn schemes_excluding(&self, name: &str) -> Vec<&Scheme> {
        let mut skip_one = true;
        let mut out = Vec::new();
        for scope in self.scopes.iter().rev() {
            for (bound_name, scheme) in scope {
                if skip_one && bound_name == name {
                    skip_one = false;
                    continue;
                }
                out.push(scheme);
            }
        }
        out
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{Scheme, Ty};

    #[test]
    fn lookup_in_current_scope() {
        let mut env = TypeEnv::new();
        env.insert("x".into(), Scheme::mono(Ty::float()));

        assert!(env.lookup("x").is_some());
        assert!(env.lookup("y").is_none());
    }

    #[test]
    fn lookup_in_outer_scope() {
        let mut env = TypeEnv::new();
        env.insert("x".into(), Scheme::mono(Ty::float()));

        env.push_scope();
        assert!(env.lookup("x").is_some());
    }

    #[test]
    fn shadowing() {
        let mut env = TypeEnv::new();
        env.insert("x".into(), Scheme::mono(Ty::float()));

        env.push_scope();
        env.insert("x".into(), Scheme::mono(Ty::string()));

        let scheme = env.lookup("x").unwrap();
        assert_eq!(scheme.ty, Ty::string());

        env.pop_scope();
        let scheme = env.lookup("x").unwrap();
        assert_eq!(scheme.ty, Ty::float());
    }

    #[test]
    #[should_panic(expected = "cannot pop the global scope")]
    fn popping_global_scope_panics() {
        let mut env = TypeEnv::new();
        env.pop_scope();
    }
}
