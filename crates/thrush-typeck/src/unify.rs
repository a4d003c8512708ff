//! Unification engine for Hindley-Milner inference.
//!
//! Built on `ena`'s union-find table: fresh variables, occurs check,
//! structural unification per the dispatch table, and let-generalization.

use std::collections::HashSet;

use ena::unify::InPlaceUnificationTable;
use rustc_hash::FxHashMap;

use crate::constraints::Constraint;
use crate::error::{ConstraintOrigin, TypeError};
use crate::ty::{RecordField, Scheme, Ty, TyVar};

/// The inference context: owns the unification table, the pending
/// per-variable constraint store, and accumulated errors.
pub struct InferCtx {
    table: InPlaceUnificationTable<TyVar>,
    /// Constraints attached to a variable (`Cv` in the unification rules)
    /// that haven't yet been discharged against a concrete type.
    var_constraints: FxHashMap<TyVar, Vec<Constraint>>,
    pub errors: Vec<TypeError>,
}

impl InferCtx {
    pub fn new() -> Self {
        InferCtx {
            table: InPlaceUnificationTable::new(),
            var_constraints: FxHashMap::default(),
            errors: Vec::new(),
        }
    }

    pub fn fresh_var(&mut self) -> Ty {
        let var = self.table.new_key(None);
        Ty::Var(var)
    }

    pub fn fresh_tyvar(&mut self) -> TyVar {
        self.table.new_key(None)
    }

    /// Attach constraints to a (still unbound) variable.
    pub fn add_constraints(&mut self, var: TyVar, constraints: impl IntoIterator<Item = Constraint>) {
        self.var_constraints.entry(var).or_default().extend(constraints);
    }

    pub fn constraints_of(&self, var: TyVar) -> &[Constraint] {
        self.var_constraints.get(&var).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a type by following union-find indirection, normalizing
    /// unbound variables to their root so equivalence-class members display
    /// identically.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(v) {
                Some(inner) => self.resolve(inner),
                None => Ty::Var(self.table.find(v)),
            },
            Ty::Function { params, result, effects } => Ty::Function {
                params: params.into_iter().map(|p| self.resolve(p)).collect(),
                result: Box::new(self.resolve(*result)),
                effects,
            },
            Ty::List(elem) => Ty::List(Box::new(self.resolve(*elem))),
            Ty::Tuple(elems) => Ty::Tuple(elems.into_iter().map(|e| self.resolve(e)).collect()),
            Ty::Record(fields) => Ty::Record(
                fields
                    .into_iter()
                    .map(|f| RecordField { name: f.name, ty: self.resolve(f.ty) })
                    .collect(),
            ),
            Ty::Union(members) => Ty::Union(members.into_iter().map(|m| self.resolve(m)).collect()),
            Ty::Variant { name, args } => Ty::Variant {
                name,
                args: args.into_iter().map(|a| self.resolve(a)).collect(),
            },
            other => other,
        }
    }

    pub fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v) => {
                if *v == var {
                    return true;
                }
                match self.table.probe_value(*v) {
                    Some(inner) => self.occurs_in(var, &inner),
                    None => false,
                }
            }
            Ty::Primitive(_) | Ty::Unit | Ty::Unknown => false,
            Ty::Function { params, result, .. } => {
                params.iter().any(|p| self.occurs_in(var, p)) || self.occurs_in(var, result)
            }
            Ty::List(elem) => self.occurs_in(var, elem),
            Ty::Tuple(elems) => elems.iter().any(|e| self.occurs_in(var, e)),
            Ty::Record(fields) => fields.iter().any(|f| self.occurs_in(var, &f.ty)),
            Ty::Union(members) => members.iter().any(|m| self.occurs_in(var, m)),
            Ty::Variant { args, .. } => args.iter().any(|a| self.occurs_in(var, a)),
        }
    }

    /// Bind `v` to `ty`, enforcing the occurs check and merging `v`'s
    /// accumulated constraints onto `ty` (spec §4.4.1 "Constraint merging").
    fn bind(&mut self, v: TyVar, ty: Ty, origin: &ConstraintOrigin) -> Result<(), TypeError> {
        if self.occurs_in(v, &ty) {
            let err = TypeError::OccursCheck {
                var: Ty::Var(v),
                ty: ty.clone(),
                origin: origin.clone(),
            };
            self.errors.push(err.clone());
            return Err(err);
        }
        let pending = self.var_constraints.remove(&v).unwrap_or_default();
        self.table
            .unify_var_value(v, Some(ty.clone()))
            .expect("binding a var after a passing occurs check should not fail");
        self.discharge_constraints(pending, &ty, origin)
    }

    /// Require that `ty` (or every variable reachable through it) satisfies
    /// the given constraints, recording a `TypeError` for the first failure.
    fn discharge_constraints(
        &mut self,
        constraints: Vec<Constraint>,
        ty: &Ty,
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let resolved = self.resolve(ty.clone());
        for c in constraints {
            match &c {
                Constraint::HasField { field, field_type } => match &resolved {
                    Ty::Record(fields) => {
                        if let Some(found) = fields.iter().find(|f| &f.name == field) {
                            self.unify(found.ty.clone(), field_type.clone(), origin.clone())?;
                        } else {
                            let err = TypeError::RecordMissingField {
                                field: field.clone(),
                                location: origin.location(),
                            };
                            self.errors.push(err.clone());
                            return Err(err);
                        }
                    }
                    Ty::Var(v) => {
                        self.add_constraints(*v, [c.clone()]);
                    }
                    _ => {
                        let err = TypeError::RecordMissingField {
                            field: field.clone(),
                            location: origin.location(),
                        };
                        self.errors.push(err.clone());
                        return Err(err);
                    }
                },
                Constraint::Is(name) => {
                    if !crate::constraints::satisfies_is(name, &resolved) {
                        if let Ty::Var(v) = &resolved {
                            self.add_constraints(*v, [c.clone()]);
                        } else {
                            let err = TypeError::ConstraintNotSatisfied {
                                constraint: name.clone(),
                                ty: resolved.clone(),
                                location: origin.location(),
                            };
                            self.errors.push(err.clone());
                            return Err(err);
                        }
                    }
                }
                Constraint::Implements(_) => {
                    self.propagate_into(&resolved, c.clone());
                }
                Constraint::HasStructure(_) => {
                    self.propagate_into(&resolved, c.clone());
                }
            }
        }
        Ok(())
    }

    /// Propagate an un-discharged constraint into every variable reachable
    /// from `ty` (the "otherwise" branch of constraint merging).
    fn propagate_into(&mut self, ty: &Ty, c: Constraint) {
        match ty {
            Ty::Var(v) => self.add_constraints(*v, [c]),
            Ty::Function { params, result, .. } => {
                for p in params {
                    self.propagate_into(p, c.clone());
                }
                self.propagate_into(result, c);
            }
            Ty::List(elem) => self.propagate_into(elem, c),
            Ty::Tuple(elems) => {
                for e in elems {
                    self.propagate_into(e, c.clone());
                }
            }
            Ty::Record(fields) => {
                for field in fields {
                    self.propagate_into(&field.ty, c.clone());
                }
            }
            Ty::Union(members) => {
                for m in members {
                    self.propagate_into(m, c.clone());
                }
            }
            Ty::Variant { args, .. } => {
                for a in args {
                    self.propagate_into(a, c.clone());
                }
            }
            Ty::Primitive(_) | Ty::Unit | Ty::Unknown => {}
        }
    }

    pub fn unify(&mut self, a: Ty, b: Ty, origin: ConstraintOrigin) -> Result<(), TypeError> {
        let a = self.resolve(a);
        let b = self.resolve(b);

        match (a, b) {
            (Ty::Var(v1), Ty::Var(v2)) if v1 == v2 => Ok(()),

            (Ty::Var(v1), Ty::Var(v2)) => {
                let c1 = self.var_constraints.remove(&v1).unwrap_or_default();
                let c2 = self.var_constraints.remove(&v2).unwrap_or_default();
                self.table
                    .unify_var_var(v1, v2)
                    .expect("unifying two unbound vars should not fail");
                let root = self.table.find(v1);
                let merged: Vec<Constraint> = c1.into_iter().chain(c2).collect();
                if !merged.is_empty() {
                    self.var_constraints.insert(root, merged);
                }
                Ok(())
            }

            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => self.bind(v, ty, &origin),

            (Ty::Primitive(p1), Ty::Primitive(p2)) => {
                if p1 == p2 {
                    Ok(())
                } else {
                    self.mismatch(Ty::Primitive(p1), Ty::Primitive(p2), origin)
                }
            }

            (Ty::Unit, Ty::Unit) => Ok(()),

            (
                Ty::Function { params: p1, result: r1, effects: e1 },
                Ty::Function { params: p2, result: r2, effects: e2 },
            ) => {
                if p1.len() != p2.len() {
                    return self.arity_mismatch(p1.len(), p2.len(), origin);
                }
                // Effects live on the concrete Function type, not on a
                // variable, so there is nowhere to merge a union into; two
                // already-resolved function types must carry the same set.
                if e1 != e2 {
                    let left = Ty::Function { params: p1, result: r1, effects: e1 };
                    let right = Ty::Function { params: p2, result: r2, effects: e2 };
                    return self.mismatch(left, right, origin);
                }
                for (x, y) in p1.into_iter().zip(p2.into_iter()) {
                    self.unify(x, y, origin.clone())?;
                }
                self.unify(*r1, *r2, origin)?;
                Ok(())
            }

            (Ty::List(a), Ty::List(b)) => self.unify(*a, *b, origin),

            (Ty::Tuple(e1), Ty::Tuple(e2)) => {
                if e1.len() != e2.len() {
                    return self.tuple_mismatch(e1.len(), e2.len(), origin);
                }
                for (x, y) in e1.into_iter().zip(e2.into_iter()) {
                    self.unify(x, y, origin.clone())?;
                }
                Ok(())
            }

            (Ty::Record(left), Ty::Record(right)) => {
                for field in left {
                    match right.iter().find(|f| f.name == field.name) {
                        Some(found) => self.unify(field.ty, found.ty.clone(), origin.clone())?,
                        None => {
                            let err = TypeError::RecordMissingField {
                                field: field.name,
                                location: origin.location(),
                            };
                            self.errors.push(err.clone());
                            return Err(err);
                        }
                    }
                }
                Ok(())
            }

            (Ty::Union(m1), Ty::Union(m2)) => {
                if m1.len() != m2.len() {
                    let err = TypeError::UnionMismatch { location: origin.location() };
                    self.errors.push(err.clone());
                    return Err(err);
                }
                for (x, y) in m1.into_iter().zip(m2.into_iter()) {
                    self.unify(x, y, origin.clone())?;
                }
                Ok(())
            }

            (Ty::Variant { name: n1, args: a1 }, Ty::Variant { name: n2, args: a2 }) => {
                if n1 != n2 || a1.len() != a2.len() {
                    let err = TypeError::VariantNameOrArity {
                        expected_name: n1,
                        found_name: n2,
                        location: origin.location(),
                    };
                    self.errors.push(err.clone());
                    return Err(err);
                }
                for (x, y) in a1.into_iter().zip(a2.into_iter()) {
                    self.unify(x, y, origin.clone())?;
                }
                Ok(())
            }

            (left, right) => self.mismatch(left, right, origin),
        }
    }

    fn mismatch(&mut self, expected: Ty, found: Ty, origin: ConstraintOrigin) -> Result<(), TypeError> {
        let err = TypeError::Unification { expected, found, origin };
        self.errors.push(err.clone());
        Err(err)
    }

    fn arity_mismatch(&mut self, expected: usize, found: usize, origin: ConstraintOrigin) -> Result<(), TypeError> {
        let err = TypeError::FunctionApplicationArityOrMismatch {
            expected,
            found,
            location: origin.location(),
        };
        self.errors.push(err.clone());
        Err(err)
    }

    fn tuple_mismatch(&mut self, expected: usize, found: usize, origin: ConstraintOrigin) -> Result<(), TypeError> {
        let err = TypeError::TupleLengthMismatch {
            expected,
            found,
            location: origin.location(),
        };
        self.errors.push(err.clone());
        Err(err)
    }

    /// Free type variables of `ty` under the current substitution.
    fn free_vars(&mut self, ty: &Ty, out: &mut HashSet<TyVar>) {
        let resolved = self.resolve(ty.clone());
        match resolved {
            Ty::Var(v) => {
                out.insert(v);
            }
            Ty::Function { params, result, .. } => {
                for p in &params {
                    self.free_vars(p, out);
                }
                self.free_vars(&result, out);
            }
            Ty::List(elem) => self.free_vars(&elem, out),
            Ty::Tuple(elems) => {
                for e in &elems {
                    self.free_vars(e, out);
                }
            }
            Ty::Record(fields) => {
                for f in &fields {
                    self.free_vars(&f.ty, out);
                }
            }
            Ty::Union(members) => {
                for m in &members {
                    self.free_vars(m, out);
                }
            }
            Ty::Variant { args, .. } => {
                for a in &args {
                    self.free_vars(a, out);
                }
            }
            Ty::Primitive(_) | Ty::Unit | Ty::Unknown => {}
        }
    }

    /// Generalize `ty` against the environment: quantify the free variables
    /// of `ty` that do not appear free in any scheme currently bound in
    /// `env_schemes` (the binding's own placeholder already removed by the
    /// caller).
    pub fn generalize(&mut self, ty: &Ty, env_schemes: &[&Scheme]) -> Scheme {
        let mut ty_vars = HashSet::new();
        self.free_vars(ty, &mut ty_vars);

        let mut env_vars = HashSet::new();
        for scheme in env_schemes {
            self.free_vars(&scheme.ty, &mut env_vars);
            for v in &scheme.vars {
                env_vars.remove(v);
            }
        }

        let mut quantified: Vec<TyVar> = ty_vars.difference(&env_vars).copied().collect();
        quantified.sort();
        Scheme { vars: quantified, ty: self.resolve(ty.clone()) }
    }

    /// Instantiate a scheme: allocate fresh variables for each quantified
    /// variable and rewrite the type, copying attached constraints onto the
    /// fresh variables.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Ty {
        let mut mapping = FxHashMap::default();
        for &v in &scheme.vars {
            let fresh = self.fresh_tyvar();
            let constraints = self.constraints_of(v).to_vec();
            if !constraints.is_empty() {
                self.add_constraints(fresh, constraints);
            }
            mapping.insert(v, fresh);
        }
        substitute_vars(&scheme.ty, &mapping)
    }
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn substitute_vars(ty: &Ty, mapping: &FxHashMap<TyVar, TyVar>) -> Ty {
    match ty {
        Ty::Var(v) => Ty::Var(*mapping.get(v).copied().as_ref().unwrap_or(v)),
        Ty::Primitive(p) => Ty::Primitive(*p),
        Ty::Function { params, result, effects } => Ty::Function {
            params: params.iter().map(|p| substitute_vars(p, mapping)).collect(),
            result: Box::new(substitute_vars(result, mapping)),
            effects: effects.clone(),
        },
        Ty::List(elem) => Ty::List(Box::new(substitute_vars(elem, mapping))),
        Ty::Tuple(elems) => Ty::Tuple(elems.iter().map(|e| substitute_vars(e, mapping)).collect()),
        Ty::Record(fields) => Ty::Record(
            fields
                .iter()
                .map(|f| RecordField { name: f.name.clone(), ty: substitute_vars(&f.ty, mapping) })
                .collect(),
        ),
        Ty::Union(members) => Ty::Union(members.iter().map(|m| substitute_vars(m, mapping)).collect()),
        Ty::Variant { name, args } => Ty::Variant {
            name: name.clone(),
            args: args.iter().map(|a| substitute_vars(a, mapping)).collect(),
        },
        Ty::Unit => Ty::Unit,
        Ty::Unknown => Ty::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unifies_equal_primitives() {
        let mut ctx = InferCtx::new();
        assert!(ctx.unify(Ty::float(), Ty::float(), ConstraintOrigin::Builtin).is_ok());
    }

    #[test]
    fn mismatched_primitives_error() {
        let mut ctx = InferCtx::new();
        assert!(ctx.unify(Ty::float(), Ty::string(), ConstraintOrigin::Builtin).is_err());
    }

    #[test]
    fn occurs_check_rejects_infinite_type() {
        let mut ctx = InferCtx::new();
        let v = ctx.fresh_tyvar();
        let recursive = Ty::List(Box::new(Ty::Var(v)));
        let err = ctx.unify(Ty::Var(v), recursive, ConstraintOrigin::Builtin);
        assert!(matches!(err, Err(TypeError::OccursCheck { .. })));
    }

    #[test]
    fn binds_variable_to_concrete_type() {
        let mut ctx = InferCtx::new();
        let v = ctx.fresh_tyvar();
        ctx.unify(Ty::Var(v), Ty::float(), ConstraintOrigin::Builtin).unwrap();
        assert_eq!(ctx.resolve(Ty::Var(v)), Ty::float());
    }

    #[test]
    fn generalize_then_instantiate_round_trips() {
        let mut ctx = InferCtx::new();
        let v = ctx.fresh_tyvar();
        let identity = Ty::function(vec![Ty::Var(v)], Ty::Var(v));
        let scheme = ctx.generalize(&identity, &[]);
        assert_eq!(scheme.vars.len(), 1);
        let instance = ctx.instantiate(&scheme);
        assert!(ctx
            .unify(instance.clone(), identity, ConstraintOrigin::Builtin)
            .is_ok());
        match instance {
            Ty::Function { params, result, .. } => {
                assert_eq!(params.len(), 1);
                assert_eq!(params[0], *result);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }
}
