//! The initial environment (spec §4.4.4): arithmetic, comparison, list and
//! string primitives, the `Option`/`Result` ADTs, and their predicates.

use thrush_parser::ast::Effect;

use crate::adt::{AdtInfo, AdtRegistry};
use crate::constraints::Constraint;
use crate::env::TypeEnv;
use crate::ty::{Scheme, Ty};
use crate::unify::InferCtx;

fn generalized(ctx: &mut InferCtx, ty: Ty) -> Scheme {
    ctx.generalize(&ty, &[])
}

fn var_with(ctx: &mut InferCtx, constraints: &[Constraint]) -> Ty {
    let var = ctx.fresh_tyvar();
    if !constraints.is_empty() {
        ctx.add_constraints(var, constraints.iter().cloned());
    }
    Ty::Var(var)
}

/// Populate `env` with every builtin named in §4.4.4 and register the
/// built-in `Option`/`Result` ADTs in `adts`.
pub fn install(ctx: &mut InferCtx, env: &mut TypeEnv, adts: &mut AdtRegistry) {
    install_arithmetic(ctx, env);
    install_comparison(ctx, env);
    install_list_primitives(ctx, env);
    install_string_primitives(ctx, env);
    install_record_primitives(ctx, env);
    install_math(ctx, env);
    install_operators(ctx, env);
    install_compose(ctx, env);
    install_print(ctx, env);
    install_option_and_result(ctx, env, adts);
    install_booleans(ctx, env);
}

/// `True`/`False` are ordinary nullary builtins, not `AdtRegistry` variant
/// constructors: the boolean type is the primitive `Bool`, not a variant.
fn install_booleans(ctx: &mut InferCtx, env: &mut TypeEnv) {
    let _ = ctx;
    env.insert("True".to_string(), Scheme::mono(Ty::bool()));
    env.insert("False".to_string(), Scheme::mono(Ty::bool()));
}

fn install_arithmetic(ctx: &mut InferCtx, env: &mut TypeEnv) {
    for op in ["+", "-", "*", "/"] {
        let ty = Ty::function(vec![Ty::float(), Ty::float()], Ty::float());
        env.insert(op.to_string(), Scheme::mono(ty));
    }
}

fn install_comparison(ctx: &mut InferCtx, env: &mut TypeEnv) {
    for op in ["==", "!=", "<", ">", "<=", ">="] {
        let a = var_with(ctx, &[Constraint::Is("Eq".to_string())]);
        let ty = Ty::function(vec![a.clone(), a], Ty::bool());
        let scheme = generalized(ctx, ty);
        env.insert(op.to_string(), scheme);
    }
}

fn install_list_primitives(ctx: &mut InferCtx, env: &mut TypeEnv) {
    {
        let a = var_with(ctx, &[]);
        let ty = Ty::function(vec![Ty::List(Box::new(a.clone()))], Ty::List(Box::new(a)));
        let scheme = generalized(ctx, ty);
        env.insert("tail".to_string(), scheme);
    }
    {
        let a = var_with(ctx, &[]);
        let ty = Ty::function(
            vec![a.clone(), Ty::List(Box::new(a.clone()))],
            Ty::List(Box::new(a)),
        );
        let scheme = generalized(ctx, ty);
        env.insert("cons".to_string(), scheme);
    }
    {
        let a = var_with(ctx, &[]);
        let b = var_with(ctx, &[]);
        let f = Ty::function(vec![a.clone()], b.clone());
        let ty = Ty::function(
            vec![f, Ty::List(Box::new(a))],
            Ty::List(Box::new(b)),
        );
        let scheme = generalized(ctx, ty);
        env.insert("map".to_string(), scheme);
    }
    {
        let a = var_with(ctx, &[]);
        let pred = Ty::function(vec![a.clone()], Ty::bool());
        let ty = Ty::function(
            vec![pred, Ty::List(Box::new(a.clone()))],
            Ty::List(Box::new(a)),
        );
        let scheme = generalized(ctx, ty);
        env.insert("filter".to_string(), scheme);
    }
    {
        let a = var_with(ctx, &[]);
        let b = var_with(ctx, &[]);
        let step = Ty::function(vec![b.clone(), a.clone()], b.clone());
        let ty = Ty::function(vec![step, b.clone(), Ty::List(Box::new(a))], b);
        let scheme = generalized(ctx, ty);
        env.insert("reduce".to_string(), scheme);
    }
    {
        let a = var_with(ctx, &[]);
        let ty = Ty::function(vec![Ty::List(Box::new(a))], Ty::float());
        let scheme = generalized(ctx, ty);
        env.insert("length".to_string(), scheme);
    }
    {
        let a = var_with(ctx, &[]);
        let ty = Ty::function(vec![Ty::List(Box::new(a))], Ty::bool());
        let scheme = generalized(ctx, ty);
        env.insert("isEmpty".to_string(), scheme);
    }
    {
        let a = var_with(ctx, &[]);
        let ty = Ty::function(
            vec![Ty::List(Box::new(a.clone())), Ty::List(Box::new(a.clone()))],
            Ty::List(Box::new(a)),
        );
        let scheme = generalized(ctx, ty);
        env.insert("append".to_string(), scheme);
    }
    {
        let a = var_with(ctx, &[]);
        let ty = Ty::function(vec![Ty::List(Box::new(a.clone())), Ty::float()], a);
        let scheme = generalized(ctx, ty);
        env.insert("list_get".to_string(), scheme);
    }
}

fn install_string_primitives(ctx: &mut InferCtx, env: &mut TypeEnv) {
    {
        let ty = Ty::function(vec![Ty::string(), Ty::string()], Ty::string());
        env.insert("concat".to_string(), Scheme::mono(ty));
    }
    {
        let a = var_with(ctx, &[Constraint::Is("Show".to_string())]);
        let ty = Ty::function(vec![a], Ty::string());
        let scheme = generalized(ctx, ty);
        env.insert("toString".to_string(), scheme);
    }
}

/// `hasKey`/`hasValue`/`set` operate on any record-shaped type. Without row
/// polymorphism the exact field can't be checked at this binding's type;
/// each call site's accessor/field usage does that work instead, so these
/// are typed permissively against a variable constrained to be a record.
fn install_record_primitives(ctx: &mut InferCtx, env: &mut TypeEnv) {
    {
        let r = var_with(ctx, &[Constraint::Is("Record".to_string())]);
        let ty = Ty::function(vec![r, Ty::string()], Ty::bool());
        let scheme = generalized(ctx, ty);
        env.insert("hasKey".to_string(), scheme);
    }
    {
        let r = var_with(ctx, &[Constraint::Is("Record".to_string())]);
        let v = var_with(ctx, &[]);
        let ty = Ty::function(vec![r, Ty::string(), v], Ty::bool());
        let scheme = generalized(ctx, ty);
        env.insert("hasValue".to_string(), scheme);
    }
    {
        let r = var_with(ctx, &[Constraint::Is("Record".to_string())]);
        let v = var_with(ctx, &[]);
        let ty = Ty::function(vec![r.clone(), Ty::string(), v], r);
        let scheme = generalized(ctx, ty);
        env.insert("set".to_string(), scheme);
    }
}

fn install_math(ctx: &mut InferCtx, env: &mut TypeEnv) {
    let _ = ctx;
    env.insert("abs".to_string(), Scheme::mono(Ty::function(vec![Ty::float()], Ty::float())));
    env.insert(
        "max".to_string(),
        Scheme::mono(Ty::function(vec![Ty::float(), Ty::float()], Ty::float())),
    );
    env.insert(
        "min".to_string(),
        Scheme::mono(Ty::function(vec![Ty::float(), Ty::float()], Ty::float())),
    );
}

/// `$` is the only operator besides `;`/`|`/comparison/arithmetic the parser
/// ever produces (`<|` and `|?` are reserved lexer tokens with no grammar
/// production), so it's the only one needing a plain builtin lookup here.
/// `f $ a` means `f a`: left is the function, right is the argument.
fn install_operators(ctx: &mut InferCtx, env: &mut TypeEnv) {
    let a = var_with(ctx, &[]);
    let b = var_with(ctx, &[]);
    let f = Ty::function(vec![a.clone()], b.clone());
    let ty = Ty::function(vec![f, a], b);
    let scheme = generalized(ctx, ty);
    env.insert("$".to_string(), scheme);
}

/// Not named in the initial-environment list but required by function
/// application's compose handling (spec §4.4.2) and exercised directly by a
/// testable scenario (spec §8 #4): `(b -> c) -> (a -> b) -> a -> c`.
fn install_compose(ctx: &mut InferCtx, env: &mut TypeEnv) {
    let a = var_with(ctx, &[]);
    let b = var_with(ctx, &[]);
    let c = var_with(ctx, &[]);
    let g = Ty::function(vec![a.clone()], b.clone());
    let f = Ty::function(vec![b], c.clone());
    let ty = Ty::function(vec![f, g], Ty::function(vec![a], c));
    let scheme = generalized(ctx, ty);
    env.insert("compose".to_string(), scheme);
}

fn install_print(ctx: &mut InferCtx, env: &mut TypeEnv) {
    let a = var_with(ctx, &[Constraint::Is("Show".to_string())]);
    let ty = Ty::Function {
        params: vec![a],
        result: Box::new(Ty::Unit),
        effects: std::collections::HashSet::from([Effect::Log]),
    };
    let scheme = generalized(ctx, ty);
    env.insert("print".to_string(), scheme);
}

fn install_option_and_result(ctx: &mut InferCtx, env: &mut TypeEnv, adts: &mut AdtRegistry) {
    let option_var = ctx.fresh_tyvar();
    adts.register(
        "Option".to_string(),
        AdtInfo {
            type_params: vec![option_var],
            constructors: vec![
                ("None".to_string(), vec![]),
                ("Some".to_string(), vec![Ty::Var(option_var)]),
            ],
        },
    );
    let option_head = Ty::Variant { name: "Option".to_string(), args: vec![Ty::Var(option_var)] };
    env.insert("None".to_string(), generalized(ctx, option_head.clone()));
    let some_ty = Ty::function(vec![Ty::Var(option_var)], option_head);
    env.insert("Some".to_string(), generalized(ctx, some_ty));

    let ok_var = ctx.fresh_tyvar();
    let err_var = ctx.fresh_tyvar();
    adts.register(
        "Result".to_string(),
        AdtInfo {
            type_params: vec![ok_var, err_var],
            constructors: vec![
                ("Ok".to_string(), vec![Ty::Var(ok_var)]),
                ("Err".to_string(), vec![Ty::Var(err_var)]),
            ],
        },
    );
    let result_head = Ty::Variant {
        name: "Result".to_string(),
        args: vec![Ty::Var(ok_var), Ty::Var(err_var)],
    };
    let ok_ty = Ty::function(vec![Ty::Var(ok_var)], result_head.clone());
    env.insert("Ok".to_string(), generalized(ctx, ok_ty));
    let err_ty = Ty::function(vec![Ty::Var(err_var)], result_head);
    env.insert("Err".to_string(), generalized(ctx, err_ty));

    {
        let a = var_with(ctx, &[]);
        let opt = Ty::Variant { name: "Option".to_string(), args: vec![a] };
        let ty = Ty::function(vec![opt], Ty::bool());
        let scheme = generalized(ctx, ty);
        env.insert("isSome".to_string(), scheme.clone());
        env.insert("isNone".to_string(), scheme);
    }
    {
        let a = var_with(ctx, &[]);
        let b = var_with(ctx, &[]);
        let result = Ty::Variant { name: "Result".to_string(), args: vec![a, b] };
        let ty = Ty::function(vec![result], Ty::bool());
        let scheme = generalized(ctx, ty);
        env.insert("isOk".to_string(), scheme.clone());
        env.insert("isErr".to_string(), scheme);
    }
    {
        let a = var_with(ctx, &[]);
        let opt = Ty::Variant { name: "Option".to_string(), args: vec![a.clone()] };
        let ty = Ty::function(vec![opt], a);
        let scheme = generalized(ctx, ty);
        env.insert("unwrap".to_string(), scheme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_monomorphic_float() {
        let mut ctx = InferCtx::new();
        let mut env = TypeEnv::new();
        let mut adts = AdtRegistry::new();
        install(&mut ctx, &mut env, &mut adts);
        let plus = env.lookup("+").unwrap();
        assert!(plus.vars.is_empty());
        assert_eq!(plus.ty, Ty::function(vec![Ty::float(), Ty::float()], Ty::float()));
    }

    #[test]
    fn map_is_polymorphic() {
        let mut ctx = InferCtx::new();
        let mut env = TypeEnv::new();
        let mut adts = AdtRegistry::new();
        install(&mut ctx, &mut env, &mut adts);
        let map = env.lookup("map").unwrap();
        assert_eq!(map.vars.len(), 2);
    }

    #[test]
    fn option_registered_as_adt() {
        let mut ctx = InferCtx::new();
        let mut env = TypeEnv::new();
        let mut adts = AdtRegistry::new();
        install(&mut ctx, &mut env, &mut adts);
        assert!(adts.get("Option").is_some());
        assert_eq!(adts.adt_for_constructor("Some").unwrap().0, "Option");
    }
}
