//! Whole-pipeline checks (tokenize -> parse -> type_and_decorate) against
//! the concrete worked scenarios and boundary behaviors the type engine is
//! expected to satisfy.

use thrush_typeck::{type_and_decorate, type_program, Ty};

fn program_of(src: &str) -> thrush_parser::ast::Program {
    let tokens = thrush_lexer::tokenize(src);
    thrush_parser::parse(&tokens).unwrap_or_else(|e| panic!("{src:?}: {e}"))
}

fn type_of(src: &str) -> Ty {
    let program = program_of(src);
    let (ty, _) = type_program(&program, None).unwrap_or_else(|e| panic!("{src:?}: {e}"));
    ty
}

#[test]
fn scenario_arithmetic() {
    assert_eq!(type_of("2 + 3"), Ty::float());
}

#[test]
fn scenario_curried_function() {
    let ty = type_of("fn x y => x + y");
    match ty {
        Ty::Function { params, result, effects } => {
            assert_eq!(params, vec![Ty::float()]);
            assert!(effects.is_empty());
            match *result {
                Ty::Function { params, result, effects } => {
                    assert_eq!(params, vec![Ty::float()]);
                    assert_eq!(*result, Ty::float());
                    assert!(effects.is_empty());
                }
                other => panic!("expected nested function, found {other:?}"),
            }
        }
        other => panic!("expected function, found {other:?}"),
    }
}

#[test]
fn scenario_variant_constructor() {
    let ty = type_of("variant Option a = None | Some a; Some 3");
    match ty {
        Ty::Variant { name, args } => {
            assert_eq!(name, "Option");
            assert_eq!(args, vec![Ty::float()]);
        }
        other => panic!("expected a variant, found {other:?}"),
    }
}

#[test]
fn scenario_thrush_pipes_record_into_accessor() {
    // `a | f` passes `a` to `f`.
    assert_eq!(type_of(r#"{@name "Alice", @age 30} | @name"#), Ty::string());
}

#[test]
fn scenario_match_on_option() {
    let src = "variant Option a = None | Some a; match Some 3 with (None => 0; Some x => x)";
    assert_eq!(type_of(src), Ty::float());
}

#[test]
fn scenario_pipeline_through_list_head() {
    let src = "head = fn xs => list_get xs 0; [1, 2, 3] |> head";
    assert_eq!(type_of(src), Ty::float());
}

#[test]
fn scenario_compose_inherits_head_constraint() {
    // `head`'s element type carries an `is Number` constraint; composing it
    // with `id` through `compose` still reports that inherited constraint
    // once the composed function is actually applied to a non-numeric list.
    let src = r#"
        head = (fn xs => list_get xs 0) : List a -> a given a is Number;
        composed = compose head (fn x => x);
        composed ["a", "b"]
    "#;
    let program = program_of(src);
    let err = type_program(&program, None).unwrap_err();
    assert!(matches!(err, thrush_typeck::TypeError::ConstraintNotSatisfied { .. }));
}

#[test]
fn type_and_decorate_fills_every_node() {
    let program = program_of("2 + 3");
    let (decorated, _) = type_and_decorate(&program, None).unwrap();
    assert!(decorated.expression.ty.is_some());
}

#[test]
fn type_and_decorate_is_idempotent_on_its_own_output() {
    let program = program_of("fn x => x + 1");
    let (decorated, state) = type_and_decorate(&program, None).unwrap();
    let (decorated_again, _) = type_and_decorate(&decorated, Some(state)).unwrap();
    assert_eq!(decorated.expression.ty, decorated_again.expression.ty);
}

#[test]
fn undefined_variable_is_reported() {
    let program = program_of("doesNotExist");
    let err = type_program(&program, None).unwrap_err();
    assert!(matches!(err, thrush_typeck::TypeError::UndefinedVariable { .. }));
}

#[test]
fn if_branch_mismatch_is_reported() {
    let program = program_of(r#"if True then 1 else "no""#);
    let err = type_program(&program, None).unwrap_err();
    assert!(matches!(err, thrush_typeck::TypeError::IfBranchMismatch { .. }));
}
