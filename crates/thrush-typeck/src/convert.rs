//! Conversion between the parser's name-based `Type` (what annotations and
//! decorated nodes carry) and the type engine's unification-variable-based
//! `Ty`.

use rustc_hash::FxHashMap;

use thrush_parser::ast::{self, Type};

use crate::constraints::Constraint as CkConstraint;
use crate::ty::{greek_name, RecordField, Scheme, Ty, TyVar};
use crate::unify::InferCtx;

/// Per-annotation scope: the same variable name written twice (`a -> a`)
/// must resolve to the same `TyVar`.
#[derive(Default)]
pub struct TypeVarScope {
    named: FxHashMap<String, TyVar>,
}

impl TypeVarScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn var_for(&mut self, ctx: &mut InferCtx, name: &str) -> TyVar {
        self.resolve(ctx, name)
    }

    fn resolve(&mut self, ctx: &mut InferCtx, name: &str) -> TyVar {
        *self
            .named
            .entry(name.to_string())
            .or_insert_with(|| ctx.fresh_tyvar())
    }
}

/// Convert a parsed type annotation into an internal `Ty`, allocating a
/// fresh variable per distinct variable name within `scope` and attaching
/// any `given`-derived constraints found on `Type::Variable`/`Type::Function`.
pub fn type_to_ty(ctx: &mut InferCtx, scope: &mut TypeVarScope, ty: &Type) -> Ty {
    match ty {
        Type::Primitive(p) => Ty::Primitive(*p),
        Type::Variable { name, constraints } => {
            let var = scope.resolve(ctx, name);
            if let Some(cs) = constraints {
                for c in cs {
                    attach_constraint(ctx, scope, var, c);
                }
            }
            Ty::Var(var)
        }
        Type::Function { params, result, effects, constraints } => {
            let params: Vec<Ty> = params.iter().map(|p| type_to_ty(ctx, scope, p)).collect();
            let result = Box::new(type_to_ty(ctx, scope, result));
            if let Some(cs) = constraints {
                for c in cs {
                    let var = scope.resolve(ctx, c.type_var());
                    attach_constraint(ctx, scope, var, c);
                }
            }
            Ty::Function { params, result, effects: effects.iter().copied().collect() }
        }
        Type::List(elem) => Ty::List(Box::new(type_to_ty(ctx, scope, elem))),
        Type::Tuple(elems) => Ty::Tuple(elems.iter().map(|e| type_to_ty(ctx, scope, e)).collect()),
        Type::Record(fields) => Ty::Record(
            fields
                .iter()
                .map(|f| RecordField { name: f.name.clone(), ty: type_to_ty(ctx, scope, &f.ty) })
                .collect(),
        ),
        Type::Union(members) => Ty::Union(members.iter().map(|m| type_to_ty(ctx, scope, m)).collect()),
        Type::Variant { name, args } => Ty::Variant {
            name: name.clone(),
            args: args.iter().map(|a| type_to_ty(ctx, scope, a)).collect(),
        },
        Type::Unit => Ty::Unit,
        Type::Unknown => Ty::Unknown,
    }
}

fn attach_constraint(ctx: &mut InferCtx, scope: &mut TypeVarScope, var: TyVar, c: &ast::Constraint) {
    let converted = match c {
        ast::Constraint::Is { name, .. } => CkConstraint::Is(name.clone()),
        ast::Constraint::HasField { field, field_type, .. } => CkConstraint::HasField {
            field: field.clone(),
            field_type: type_to_ty(ctx, scope, field_type),
        },
        ast::Constraint::Implements { interface_name, .. } => {
            CkConstraint::Implements(interface_name.clone())
        }
        ast::Constraint::HasStructure { structure, .. } => CkConstraint::HasStructure(
            structure.iter().map(|f| (f.name.clone(), type_to_ty(ctx, scope, &f.ty))).collect(),
        ),
    };
    ctx.add_constraints(var, [converted]);
}

/// Flatten a parsed `given` clause into constraints and attach each to its
/// named variable within `scope`.
pub fn apply_constraint_expr(ctx: &mut InferCtx, scope: &mut TypeVarScope, expr: &ast::ConstraintExpr) {
    for c in expr.flatten() {
        let var = scope.resolve(ctx, c.type_var());
        attach_constraint(ctx, scope, var, &c);
    }
}

/// Convert a resolved internal `Ty` back into the parser's `Type`, for
/// writing into a decorated node's `ty` slot. Variables become display-only
/// named variables; their pending constraints are not round-tripped (the
/// decorated slot exists for the evaluator, which only needs shapes).
pub fn ty_to_type(ctx: &mut InferCtx, ty: &Ty) -> Type {
    let resolved = ctx.resolve(ty.clone());
    match resolved {
        Ty::Var(v) => Type::var(greek_name(v.0)),
        Ty::Primitive(p) => Type::Primitive(p),
        Ty::Function { params, result, effects } => {
            let mut sorted: Vec<_> = effects.into_iter().collect();
            sorted.sort_by_key(|e| e.name());
            Type::Function {
                params: params.iter().map(|p| ty_to_type(ctx, p)).collect(),
                result: Box::new(ty_to_type(ctx, &result)),
                effects: sorted,
                constraints: None,
            }
        }
        Ty::List(elem) => Type::List(Box::new(ty_to_type(ctx, &elem))),
        Ty::Tuple(elems) => Type::Tuple(elems.iter().map(|e| ty_to_type(ctx, e)).collect()),
        Ty::Record(fields) => Type::Record(
            fields
                .iter()
                .map(|f| ast::RecordTypeField { name: f.name.clone(), ty: ty_to_type(ctx, &f.ty) })
                .collect(),
        ),
        Ty::Union(members) => Type::Union(members.iter().map(|m| ty_to_type(ctx, m)).collect()),
        Ty::Variant { name, args } => {
            Type::Variant { name, args: args.iter().map(|a| ty_to_type(ctx, a)).collect() }
        }
        Ty::Unit => Type::Unit,
        Ty::Unknown => Type::Unknown,
    }
}

/// Build a public `TypeScheme` from an internal `Scheme`, for any external
/// surface that wants to show a generalized type (tooling, REPL `:type`).
pub fn scheme_to_type_scheme(ctx: &mut InferCtx, scheme: &Scheme) -> ast::TypeScheme {
    ast::TypeScheme {
        quantified_vars: scheme.vars.iter().map(|v| greek_name(v.0)).collect(),
        ty: ty_to_type(ctx, &scheme.ty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_maps_to_same_var() {
        let mut ctx = InferCtx::new();
        let mut scope = TypeVarScope::new();
        let a1 = type_to_ty(&mut ctx, &mut scope, &Type::var("a"));
        let a2 = type_to_ty(&mut ctx, &mut scope, &Type::var("a"));
        assert_eq!(a1, a2);
    }

    #[test]
    fn round_trips_primitive() {
        let mut ctx = InferCtx::new();
        let mut scope = TypeVarScope::new();
        let ty = type_to_ty(&mut ctx, &mut scope, &Type::Primitive(ast::Primitive::Float));
        assert_eq!(ty_to_type(&mut ctx, &ty), Type::Primitive(ast::Primitive::Float));
    }
}
