//! Type inference, constraint solving, and AST decoration for Thrush.
//!
//! The public surface mirrors the external entry points a caller needs
//! (spec §6): [`type_program`] infers the type of a whole program without
//! rewriting it, and [`type_and_decorate`] does the same while returning a
//! copy of the program with every node's `ty` slot filled in. Both take an
//! optional carried-over [`TypeState`] so a REPL-style caller can type
//! successive inputs against one running environment (`Option<TypeState>` in
//! `type_and_decorate`'s signature) the way `Program::expression` threads a
//! single `;`-chain.

pub mod adt;
pub mod builtins;
pub mod constraints;
pub mod convert;
pub mod env;
pub mod error;
mod infer;
pub mod ty;
pub mod unify;

use thrush_parser::ast::Program;

pub use adt::{AdtInfo, AdtRegistry};
pub use convert::TypeVarScope;
pub use env::TypeEnv;
pub use error::{ConstraintOrigin, TypeError};
pub use ty::{Scheme, Ty, TyVar};
pub use unify::InferCtx;

/// Everything threaded through a type-checking run: the unification
/// context, the name environment, and the ADT registry. Fresh state starts
/// with the builtins installed (spec §4.4.4).
pub struct TypeState {
    pub ctx: InferCtx,
    pub env: TypeEnv,
    pub adts: AdtRegistry,
}

impl TypeState {
    pub fn new() -> Self {
        let mut ctx = InferCtx::new();
        let mut env = TypeEnv::new();
        let mut adts = AdtRegistry::new();
        builtins::install(&mut ctx, &mut env, &mut adts);
        TypeState { ctx, env, adts }
    }
}

impl Default for TypeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Infer the type of `program`, starting from `state` if given or a fresh
/// builtin-populated state otherwise. Returns the program's type and the
/// state as it stood after inference (for a caller that wants to keep
/// typing further input against the same environment).
pub fn type_program(program: &Program, state: Option<TypeState>) -> Result<(Ty, TypeState), TypeError> {
    let mut state = state.unwrap_or_default();
    let (ty, _) = infer::infer_program(&mut state, program)?;
    Ok((ty, state))
}

/// Infer and decorate `program`: every node of the returned program carries
/// its resolved type in its `ty` slot.
pub fn type_and_decorate(
    program: &Program,
    state: Option<TypeState>,
) -> Result<(Program, TypeState), TypeError> {
    let mut state = state.unwrap_or_default();
    let (_, decorated) = infer::infer_program(&mut state, program)?;
    Ok((decorated, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use thrush_common::Location;
    use thrush_parser::ast::{ExprKind, Expression, Literal};

    fn lit(n: f64) -> Expression {
        Expression::new(Location::synthetic(), ExprKind::Literal(Literal::Number(n)))
    }

    #[test]
    fn types_a_bare_literal() {
        let program = Program { expression: lit(1.0) };
        let (ty, _) = type_program(&program, None).unwrap();
        assert_eq!(ty, Ty::float());
    }

    #[test]
    fn decorates_every_node() {
        let program = Program { expression: lit(1.0) };
        let (decorated, _) = type_and_decorate(&program, None).unwrap();
        assert!(decorated.expression.ty.is_some());
    }
}
