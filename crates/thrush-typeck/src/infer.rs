//! Algorithm-J-style inference over the parser's AST (spec §4.4.2).
//!
//! Each expression is inferred and decorated in the same recursive pass: the
//! returned `Expression` is a copy of the input with every node's `ty` slot
//! filled in from the type resolved at that point. A later sibling that
//! further constrains a shared variable won't retroactively sharpen an
//! earlier node's displayed type; let-generalization already isolates
//! earlier definitions from later code, so this only under-resolves in rare
//! cases with no generalization boundary between the sites.

use std::collections::HashSet;

use thrush_common::Location;
use thrush_parser::ast::{
    self, ExprKind, Expression, ImplementationBinding, Literal, MatchCase, Pattern, PatternKind,
    Program, UserTypeBody,
};

use crate::adt::AdtInfo;
use crate::constraints::Constraint;
use crate::convert::{self, TypeVarScope};
use crate::error::{ConstraintOrigin, TypeError};
use crate::ty::{RecordField, Scheme, Ty, TyVar};
use crate::unify::substitute_vars;
use crate::TypeState;

/// Run `ctx.unify`, and on failure replace the generic error it recorded
/// with one `make_err` produces, so call sites that name a specific
/// `TypeError` kind get it instead of a bare `Unification`.
fn unify_or(
    state: &mut TypeState,
    a: Ty,
    b: Ty,
    origin: ConstraintOrigin,
    make_err: impl FnOnce() -> TypeError,
) -> Result<(), TypeError> {
    match state.ctx.unify(a, b, origin) {
        Ok(()) => Ok(()),
        Err(_) => {
            state.ctx.errors.pop();
            let err = make_err();
            state.ctx.errors.push(err.clone());
            Err(err)
        }
    }
}

fn undefined_variable(state: &mut TypeState, name: &str, location: Location) -> TypeError {
    let err = TypeError::UndefinedVariable { name: name.to_string(), location };
    state.ctx.errors.push(err.clone());
    err
}

fn decorate(state: &mut TypeState, location: Location, ty: &Ty, kind: ExprKind) -> Expression {
    Expression {
        location,
        ty: Some(convert::ty_to_type(&mut state.ctx, ty)),
        kind: Box::new(kind),
    }
}

/// Progressively apply a function type to a sequence of argument types,
/// supporting curried partial application: if fewer arguments are supplied
/// than the function has parameters, the result is a function over the rest.
fn apply_call(
    state: &mut TypeState,
    func_ty: Ty,
    arg_tys: Vec<Ty>,
    call_site: Location,
) -> Result<Ty, TypeError> {
    let total = arg_tys.len();
    let mut current = func_ty;
    for (i, arg_ty) in arg_tys.into_iter().enumerate() {
        let resolved = state.ctx.resolve(current.clone());
        current = match resolved {
            Ty::Function { mut params, result, effects } => {
                if params.is_empty() {
                    let err = TypeError::FunctionApplicationArityOrMismatch {
                        expected: i,
                        found: total,
                        location: call_site,
                    };
                    state.ctx.errors.push(err.clone());
                    return Err(err);
                }
                let head = params.remove(0);
                state.ctx.unify(
                    head,
                    arg_ty,
                    ConstraintOrigin::FunctionArgument { call_site, param_index: i },
                )?;
                if params.is_empty() {
                    *result
                } else {
                    Ty::Function { params, result, effects }
                }
            }
            Ty::Var(v) => {
                let param = state.ctx.fresh_var();
                let ret = state.ctx.fresh_var();
                state.ctx.unify(
                    Ty::Var(v),
                    Ty::function(vec![param.clone()], ret.clone()),
                    ConstraintOrigin::FunctionArgument { call_site, param_index: i },
                )?;
                state.ctx.unify(
                    param,
                    arg_ty,
                    ConstraintOrigin::FunctionArgument { call_site, param_index: i },
                )?;
                ret
            }
            other => {
                let err = TypeError::NonFunctionApplication { ty: other, location: call_site };
                state.ctx.errors.push(err.clone());
                return Err(err);
            }
        };
    }
    Ok(state.ctx.resolve(current))
}

fn infer_operator(
    state: &mut TypeState,
    operator: &str,
    left_ty: Ty,
    right_ty: Ty,
    span: Location,
) -> Result<Ty, TypeError> {
    let scheme = match state.env.lookup(operator) {
        Some(s) => s.clone(),
        None => {
            let err = TypeError::OperatorType { operator: operator.to_string(), location: span };
            state.ctx.errors.push(err.clone());
            return Err(err);
        }
    };
    let op_ty = state.ctx.instantiate(&scheme);
    let result = state.ctx.fresh_var();
    let expected = Ty::function(vec![left_ty, right_ty], result.clone());
    let origin = ConstraintOrigin::BinaryOperator { operator: operator.to_string(), span };
    unify_or(state, op_ty, expected, origin, || TypeError::OperatorType {
        operator: operator.to_string(),
        location: span,
    })?;
    Ok(state.ctx.resolve(result))
}

/// Register a declared ADT (from `variant` or a union-free `type` body) and,
/// if it has constructors, insert a generalized constructor scheme per
/// constructor into the environment.
fn register_adt(state: &mut TypeState, name: String, type_params: Vec<TyVar>, constructors: Vec<(String, Vec<Ty>)>) {
    state.adts.register(
        name.clone(),
        AdtInfo { type_params: type_params.clone(), constructors: constructors.clone() },
    );
    if constructors.is_empty() {
        return;
    }
    let head = Ty::Variant { name: name.clone(), args: type_params.iter().map(|v| Ty::Var(*v)).collect() };
    for (ctor_name, arg_tys) in constructors {
        let ctor_ty = if arg_tys.is_empty() { head.clone() } else { Ty::function(arg_tys, head.clone()) };
        let scheme = state.ctx.generalize(&ctor_ty, &[]);
        state.env.insert(ctor_name, scheme);
    }
}

/// Infer and decorate a single expression, returning its resolved type and a
/// copy of the node with `ty` filled in (and recursively, every subnode).
pub fn infer_and_decorate(state: &mut TypeState, expr: &Expression) -> Result<(Ty, Expression), TypeError> {
    let location = expr.location;
    match expr.kind.as_ref() {
        ExprKind::Literal(Literal::Number(n)) => {
            let ty = Ty::float();
            Ok((ty.clone(), decorate(state, location, &ty, ExprKind::Literal(Literal::Number(*n)))))
        }
        ExprKind::Literal(Literal::String(s)) => {
            let ty = Ty::string();
            let kind = ExprKind::Literal(Literal::String(s.clone()));
            Ok((ty.clone(), decorate(state, location, &ty, kind)))
        }
        ExprKind::Variable(name) => {
            let scheme = state
                .env
                .lookup(name)
                .cloned()
                .ok_or_else(|| undefined_variable(state, name, location))?;
            let ty = state.ctx.instantiate(&scheme);
            Ok((ty.clone(), decorate(state, location, &ty, ExprKind::Variable(name.clone()))))
        }
        ExprKind::Function { params, body } => {
            state.env.push_scope();
            let mut param_tys = Vec::new();
            for p in params {
                let v = state.ctx.fresh_var();
                state.env.insert(p.clone(), Scheme::mono(v.clone()));
                param_tys.push(v);
            }
            let (body_ty, body_deco) = infer_and_decorate(state, body)?;
            state.env.pop_scope();
            let ty = Ty::function(param_tys, body_ty);
            let kind = ExprKind::Function { params: params.clone(), body: body_deco };
            Ok((ty.clone(), decorate(state, location, &ty, kind)))
        }
        ExprKind::Application { func, args } => {
            let (func_ty, func_deco) = infer_and_decorate(state, func)?;
            let mut arg_tys = Vec::new();
            let mut arg_decos = Vec::new();
            for a in args {
                let (t, d) = infer_and_decorate(state, a)?;
                arg_tys.push(t);
                arg_decos.push(d);
            }
            let ty = apply_call(state, func_ty, arg_tys, location)?;
            let kind = ExprKind::Application { func: func_deco, args: arg_decos };
            Ok((ty.clone(), decorate(state, location, &ty, kind)))
        }
        ExprKind::Binary { operator, left, right } => match operator.as_str() {
            ";" => {
                let (_, left_deco) = infer_and_decorate(state, left)?;
                let (right_ty, right_deco) = infer_and_decorate(state, right)?;
                let kind = ExprKind::Binary {
                    operator: operator.clone(),
                    left: left_deco,
                    right: right_deco,
                };
                Ok((right_ty.clone(), decorate(state, location, &right_ty, kind)))
            }
            "|" => {
                // `a | f` passes `a` to `f`: the right side must be a
                // one-parameter function accepting the left.
                let (left_ty, left_deco) = infer_and_decorate(state, left)?;
                let (right_ty, right_deco) = infer_and_decorate(state, right)?;
                let right_resolved = state.ctx.resolve(right_ty.clone());
                let result = state.ctx.fresh_var();
                let expected = Ty::function(vec![left_ty], result.clone());
                unify_or(
                    state,
                    right_ty,
                    expected,
                    ConstraintOrigin::BinaryOperator { operator: operator.clone(), span: location },
                    || TypeError::PipelineComposition { found: right_resolved.clone(), location: right.location },
                )?;
                let ty = state.ctx.resolve(result);
                let kind = ExprKind::Binary {
                    operator: operator.clone(),
                    left: left_deco,
                    right: right_deco,
                };
                Ok((ty.clone(), decorate(state, location, &ty, kind)))
            }
            op => {
                let (left_ty, left_deco) = infer_and_decorate(state, left)?;
                let (right_ty, right_deco) = infer_and_decorate(state, right)?;
                let ty = infer_operator(state, op, left_ty, right_ty, location)?;
                let kind = ExprKind::Binary {
                    operator: operator.clone(),
                    left: left_deco,
                    right: right_deco,
                };
                Ok((ty.clone(), decorate(state, location, &ty, kind)))
            }
        },
        ExprKind::Pipeline { steps } => {
            let mut iter = steps.iter();
            let first = iter.next().expect("pipeline always has a seed value");
            let (mut acc_ty, first_deco) = infer_and_decorate(state, first)?;
            let mut decos = vec![first_deco];
            for step in iter {
                let (step_ty, step_deco) = infer_and_decorate(state, step)?;
                let result = state.ctx.fresh_var();
                let expected = Ty::function(vec![acc_ty.clone()], result.clone());
                let step_resolved = state.ctx.resolve(step_ty.clone());
                unify_or(
                    state,
                    step_ty,
                    expected,
                    ConstraintOrigin::Builtin,
                    || TypeError::PipelineComposition { found: step_resolved.clone(), location: step.location },
                )?;
                acc_ty = result;
                decos.push(step_deco);
            }
            let ty = state.ctx.resolve(acc_ty);
            let kind = ExprKind::Pipeline { steps: decos };
            Ok((ty.clone(), decorate(state, location, &ty, kind)))
        }
        ExprKind::If { condition, then_branch, else_branch } => {
            let (cond_ty, cond_deco) = infer_and_decorate(state, condition)?;
            let cond_resolved = state.ctx.resolve(cond_ty.clone());
            unify_or(
                state,
                cond_ty,
                Ty::bool(),
                ConstraintOrigin::IfBranches { span: location },
                || TypeError::ConditionNotBool { found: cond_resolved.clone(), location: condition.location },
            )?;
            let (then_ty, then_deco) = infer_and_decorate(state, then_branch)?;
            let (else_ty, else_deco) = infer_and_decorate(state, else_branch)?;
            let then_resolved = state.ctx.resolve(then_ty.clone());
            let else_resolved = state.ctx.resolve(else_ty.clone());
            unify_or(
                state,
                then_ty.clone(),
                else_ty,
                ConstraintOrigin::IfBranches { span: location },
                || TypeError::IfBranchMismatch {
                    then_ty: then_resolved.clone(),
                    else_ty: else_resolved.clone(),
                    location,
                },
            )?;
            let ty = state.ctx.resolve(then_ty);
            let kind = ExprKind::If { condition: cond_deco, then_branch: then_deco, else_branch: else_deco };
            Ok((ty.clone(), decorate(state, location, &ty, kind)))
        }
        ExprKind::List(elems) => {
            let mut decos = Vec::new();
            let mut elem_ty: Option<Ty> = None;
            for e in elems {
                let (t, d) = infer_and_decorate(state, e)?;
                match elem_ty.clone() {
                    None => elem_ty = Some(t),
                    Some(first) => {
                        let first_r = state.ctx.resolve(first.clone());
                        let t_r = state.ctx.resolve(t.clone());
                        unify_or(state, first, t, ConstraintOrigin::Builtin, || TypeError::ListElementMismatch {
                            expected: first_r.clone(),
                            found: t_r.clone(),
                            location: e.location,
                        })?;
                    }
                }
                decos.push(d);
            }
            let elem = elem_ty.unwrap_or_else(|| state.ctx.fresh_var());
            let ty = Ty::List(Box::new(elem));
            let kind = ExprKind::List(decos);
            Ok((ty.clone(), decorate(state, location, &ty, kind)))
        }
        ExprKind::Tuple(elems) => {
            let mut tys = Vec::new();
            let mut decos = Vec::new();
            for e in elems {
                let (t, d) = infer_and_decorate(state, e)?;
                tys.push(t);
                decos.push(d);
            }
            let ty = Ty::Tuple(tys);
            let kind = ExprKind::Tuple(decos);
            Ok((ty.clone(), decorate(state, location, &ty, kind)))
        }
        ExprKind::Record(fields) => {
            let mut tys = Vec::new();
            let mut decos = Vec::new();
            for f in fields {
                let (t, d) = infer_and_decorate(state, &f.value)?;
                tys.push(RecordField { name: f.name.clone(), ty: t });
                decos.push(ast::RecordField { name: f.name.clone(), value: d });
            }
            let ty = Ty::Record(tys);
            let kind = ExprKind::Record(decos);
            Ok((ty.clone(), decorate(state, location, &ty, kind)))
        }
        ExprKind::Accessor { field, optional } => {
            let record_var = state.ctx.fresh_tyvar();
            let field_ty = state.ctx.fresh_var();
            state.ctx.add_constraints(
                record_var,
                [Constraint::HasField { field: field.clone(), field_type: field_ty.clone() }],
            );
            let result = if *optional {
                Ty::Variant { name: "Option".to_string(), args: vec![field_ty] }
            } else {
                field_ty
            };
            let ty = Ty::function(vec![Ty::Var(record_var)], result);
            let kind = ExprKind::Accessor { field: field.clone(), optional: *optional };
            Ok((ty.clone(), decorate(state, location, &ty, kind)))
        }
        ExprKind::Unit => Ok((Ty::Unit, decorate(state, location, &Ty::Unit, ExprKind::Unit))),
        ExprKind::Definition { name, value } => {
            // Bind `name` to a fresh placeholder before typing the value so a
            // self-reference inside it (recursion) resolves to something.
            let placeholder = state.ctx.fresh_var();
            state.env.insert(name.clone(), Scheme::mono(placeholder.clone()));
            let (value_ty, value_deco) = infer_and_decorate(state, value)?;
            state.ctx.unify(placeholder, value_ty.clone(), ConstraintOrigin::Definition {
                name: name.clone(),
                span: location,
            })?;
            let excluded = state.env.schemes_excluding(name);
            let scheme = state.ctx.generalize(&value_ty, &excluded);
            state.env.insert(name.clone(), scheme);
            let kind = ExprKind::Definition { name: name.clone(), value: value_deco };
            Ok((Ty::Unit, decorate(state, location, &Ty::Unit, kind)))
        }
        ExprKind::MutableDefinition { name, value } => {
            let (value_ty, value_deco) = infer_and_decorate(state, value)?;
            state.env.insert(name.clone(), Scheme::mono(value_ty));
            let kind = ExprKind::MutableDefinition { name: name.clone(), value: value_deco };
            Ok((Ty::Unit, decorate(state, location, &Ty::Unit, kind)))
        }
        ExprKind::Mutation { name, value } => {
            let existing = state
                .env
                .lookup(name)
                .cloned()
                .ok_or_else(|| undefined_variable(state, name, location))?;
            let existing_ty = state.ctx.instantiate(&existing);
            let (value_ty, value_deco) = infer_and_decorate(state, value)?;
            let existing_r = state.ctx.resolve(existing_ty.clone());
            let value_r = state.ctx.resolve(value_ty.clone());
            unify_or(
                state,
                existing_ty,
                value_ty,
                ConstraintOrigin::Mutation { name: name.clone(), span: location },
                || TypeError::MutationTypeMismatch {
                    name: name.clone(),
                    expected: existing_r.clone(),
                    found: value_r.clone(),
                    location,
                },
            )?;
            let kind = ExprKind::Mutation { name: name.clone(), value: value_deco };
            Ok((Ty::Unit, decorate(state, location, &Ty::Unit, kind)))
        }
        ExprKind::Import { path } => {
            let kind = ExprKind::Import { path: path.clone() };
            Ok((Ty::Unit, decorate(state, location, &Ty::Unit, kind)))
        }
        ExprKind::Where { definitions, main } => {
            state.env.push_scope();
            let mut deco_defs = Vec::new();
            for d in definitions {
                let (_, deco) = infer_and_decorate(state, d)?;
                deco_defs.push(deco);
            }
            let (main_ty, main_deco) = infer_and_decorate(state, main)?;
            state.env.pop_scope();
            let kind = ExprKind::Where { definitions: deco_defs, main: main_deco };
            Ok((main_ty.clone(), decorate(state, location, &main_ty, kind)))
        }
        ExprKind::Typed { expr: inner, ty: annotated } => {
            let (inner_ty, inner_deco) = infer_and_decorate(state, inner)?;
            let mut scope = TypeVarScope::new();
            let annotated_ty = convert::type_to_ty(&mut state.ctx, &mut scope, annotated);
            let inner_r = state.ctx.resolve(inner_ty.clone());
            let annotated_r = state.ctx.resolve(annotated_ty.clone());
            unify_or(
                state,
                annotated_ty.clone(),
                inner_ty,
                ConstraintOrigin::Annotation { span: location },
                || TypeError::TypeAnnotationMismatch {
                    annotated: annotated_r.clone(),
                    inferred: inner_r.clone(),
                    location,
                },
            )?;
            let ty = state.ctx.resolve(annotated_ty);
            let kind = ExprKind::Typed { expr: inner_deco, ty: annotated.clone() };
            Ok((ty.clone(), decorate(state, location, &ty, kind)))
        }
        ExprKind::Constrained { expr: inner, ty: annotated, constraint } => {
            let (inner_ty, inner_deco) = infer_and_decorate(state, inner)?;
            let mut scope = TypeVarScope::new();
            let annotated_ty = convert::type_to_ty(&mut state.ctx, &mut scope, annotated);
            convert::apply_constraint_expr(&mut state.ctx, &mut scope, constraint);
            let inner_r = state.ctx.resolve(inner_ty.clone());
            let annotated_r = state.ctx.resolve(annotated_ty.clone());
            unify_or(
                state,
                annotated_ty.clone(),
                inner_ty,
                ConstraintOrigin::Annotation { span: location },
                || TypeError::TypeAnnotationMismatch {
                    annotated: annotated_r.clone(),
                    inferred: inner_r.clone(),
                    location,
                },
            )?;
            let ty = state.ctx.resolve(annotated_ty);
            let kind = ExprKind::Constrained {
                expr: inner_deco,
                ty: annotated.clone(),
                constraint: constraint.clone(),
            };
            Ok((ty.clone(), decorate(state, location, &ty, kind)))
        }
        ExprKind::TypeDefinition { name, type_params, constructors } => {
            let mut scope = TypeVarScope::new();
            let mut seen = HashSet::new();
            let mut tvars = Vec::new();
            for p in type_params {
                if !seen.insert(p.clone()) {
                    let err = TypeError::DuplicateTypeParam { name: p.clone(), location };
                    state.ctx.errors.push(err.clone());
                    return Err(err);
                }
                tvars.push(scope.var_for(&mut state.ctx, p));
            }
            let ctors: Vec<(String, Vec<Ty>)> = constructors
                .iter()
                .map(|c| {
                    (
                        c.name.clone(),
                        c.args.iter().map(|a| convert::type_to_ty(&mut state.ctx, &mut scope, a)).collect(),
                    )
                })
                .collect();
            register_adt(state, name.clone(), tvars, ctors);
            let kind = ExprKind::TypeDefinition {
                name: name.clone(),
                type_params: type_params.clone(),
                constructors: constructors.clone(),
            };
            Ok((Ty::Unit, decorate(state, location, &Ty::Unit, kind)))
        }
        ExprKind::UserDefinedType { name, params, body } => {
            let mut scope = TypeVarScope::new();
            let mut seen = HashSet::new();
            let mut tvars = Vec::new();
            for p in params {
                if !seen.insert(p.clone()) {
                    let err = TypeError::DuplicateTypeParam { name: p.clone(), location };
                    state.ctx.errors.push(err.clone());
                    return Err(err);
                }
                tvars.push(scope.var_for(&mut state.ctx, p));
            }
            // A union body is a pure alias: registered for introspection, but
            // (unlike `variant` and record/tuple bodies) it introduces no
            // constructor, since its members already name existing types.
            let constructors: Vec<(String, Vec<Ty>)> = match body {
                UserTypeBody::Record(fields) => {
                    let record_ty = Ty::Record(
                        fields
                            .iter()
                            .map(|(n, t)| RecordField {
                                name: n.clone(),
                                ty: convert::type_to_ty(&mut state.ctx, &mut scope, t),
                            })
                            .collect(),
                    );
                    vec![(name.clone(), vec![record_ty])]
                }
                UserTypeBody::Tuple(elems) => {
                    vec![(
                        name.clone(),
                        elems.iter().map(|t| convert::type_to_ty(&mut state.ctx, &mut scope, t)).collect(),
                    )]
                }
                UserTypeBody::Union(_) => Vec::new(),
            };
            register_adt(state, name.clone(), tvars, constructors);
            let kind = ExprKind::UserDefinedType {
                name: name.clone(),
                params: params.clone(),
                body: body.clone(),
            };
            Ok((Ty::Unit, decorate(state, location, &Ty::Unit, kind)))
        }
        ExprKind::Match { scrutinee, cases } => {
            let (scrutinee_ty, scrutinee_deco) = infer_and_decorate(state, scrutinee)?;
            let mut deco_cases = Vec::new();
            let mut common_ty: Option<Ty> = None;
            for case in cases {
                state.env.push_scope();
                let pattern_deco = infer_pattern(state, &case.pattern, scrutinee_ty.clone())?;
                let (body_ty, body_deco) = infer_and_decorate(state, &case.body)?;
                state.env.pop_scope();
                match common_ty.clone() {
                    None => common_ty = Some(body_ty),
                    Some(first) => {
                        let first_r = state.ctx.resolve(first.clone());
                        let body_r = state.ctx.resolve(body_ty.clone());
                        unify_or(state, first, body_ty, ConstraintOrigin::Builtin, || TypeError::Unification {
                            expected: first_r.clone(),
                            found: body_r.clone(),
                            origin: ConstraintOrigin::Builtin,
                        })?;
                    }
                }
                deco_cases.push(MatchCase { pattern: pattern_deco, body: body_deco });
            }
            let ty = state.ctx.resolve(common_ty.unwrap_or(Ty::Unit));
            let kind = ExprKind::Match { scrutinee: scrutinee_deco, cases: deco_cases };
            Ok((ty.clone(), decorate(state, location, &ty, kind)))
        }
        ExprKind::ConstraintDefinition { name, type_param, signatures } => {
            // Method signatures name required shapes for documentation; the
            // solver only ever checks the fixed built-in predicates plus
            // `hasField`/`implements`/`hasStructure`, so no new predicate is
            // registered here.
            let kind = ExprKind::ConstraintDefinition {
                name: name.clone(),
                type_param: type_param.clone(),
                signatures: signatures.clone(),
            };
            Ok((Ty::Unit, decorate(state, location, &Ty::Unit, kind)))
        }
        ExprKind::ImplementDefinition { constraint_name, type_name, implementations } => {
            let mut decos = Vec::new();
            for imp in implementations {
                let (_, d) = infer_and_decorate(state, &imp.value)?;
                decos.push(ImplementationBinding { name: imp.name.clone(), value: d });
            }
            let kind = ExprKind::ImplementDefinition {
                constraint_name: constraint_name.clone(),
                type_name: type_name.clone(),
                implementations: decos,
            };
            Ok((Ty::Unit, decorate(state, location, &Ty::Unit, kind)))
        }
    }
}

/// Infer a pattern against an expected scrutinee type, binding its variables
/// into the current (innermost) environment scope.
fn infer_pattern(state: &mut TypeState, pattern: &Pattern, expected: Ty) -> Result<Pattern, TypeError> {
    let location = pattern.location;
    match &pattern.kind {
        PatternKind::Wildcard => Ok(Pattern {
            location,
            ty: Some(convert::ty_to_type(&mut state.ctx, &expected)),
            kind: PatternKind::Wildcard,
        }),
        PatternKind::Variable(name) => {
            state.env.insert(name.clone(), Scheme::mono(expected.clone()));
            Ok(Pattern {
                location,
                ty: Some(convert::ty_to_type(&mut state.ctx, &expected)),
                kind: PatternKind::Variable(name.clone()),
            })
        }
        PatternKind::Literal(lit) => {
            let lit_ty = match lit {
                Literal::Number(_) => Ty::float(),
                Literal::String(_) => Ty::string(),
            };
            state.ctx.unify(lit_ty, expected.clone(), ConstraintOrigin::Builtin)?;
            Ok(Pattern {
                location,
                ty: Some(convert::ty_to_type(&mut state.ctx, &expected)),
                kind: PatternKind::Literal(lit.clone()),
            })
        }
        PatternKind::Constructor { name, args } => {
            let (owner, info) = state
                .adts
                .adt_for_constructor(name)
                .map(|(owner, info)| (owner.to_string(), info.clone()))
                .ok_or_else(|| {
                    let err = TypeError::UnknownConstructor { name: name.clone(), location };
                    state.ctx.errors.push(err.clone());
                    err
                })?;
            let declared_arity = info.arity_of(name).unwrap_or(0);
            if declared_arity != args.len() {
                let err = TypeError::ConstructorArity {
                    name: name.clone(),
                    expected: declared_arity,
                    found: args.len(),
                    location,
                };
                state.ctx.errors.push(err.clone());
                return Err(err);
            }

            let mut mapping = rustc_hash::FxHashMap::default();
            for &tv in &info.type_params {
                mapping.insert(tv, state.ctx.fresh_tyvar());
            }
            let head_ty = substitute_vars(&info.head_type(&owner), &mapping);
            state.ctx.unify(expected.clone(), head_ty, ConstraintOrigin::Builtin)?;

            let arg_tys: Vec<Ty> = info
                .args_of(name)
                .unwrap_or(&[])
                .iter()
                .map(|t| substitute_vars(t, &mapping))
                .collect();
            let mut deco_args = Vec::new();
            for (sub_pat, sub_expected) in args.iter().zip(arg_tys.into_iter()) {
                deco_args.push(infer_pattern(state, sub_pat, sub_expected)?);
            }
            Ok(Pattern {
                location,
                ty: Some(convert::ty_to_type(&mut state.ctx, &expected)),
                kind: PatternKind::Constructor { name: name.clone(), args: deco_args },
            })
        }
    }
}

/// Infer and decorate a whole program: its expression is a left-associative
/// `;`-chain, so this is just `infer_and_decorate` on the root.
pub fn infer_program(state: &mut TypeState, program: &Program) -> Result<(Ty, Program), TypeError> {
    let (ty, expression) = infer_and_decorate(state, &program.expression)?;
    Ok((ty, Program { expression }))
}
