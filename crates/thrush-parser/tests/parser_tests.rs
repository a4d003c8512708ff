//! Grammar integration tests: tokenize with `thrush_lexer`, then feed the
//! token stream through `thrush_parser::parse`/`parse_type_expression` and
//! assert on the resulting tree shape.

use thrush_parser::ast::{Constraint, ConstraintExpr, ExprKind, Literal, PatternKind, Primitive, Type};

fn parse_expr(src: &str) -> ExprKind {
    let tokens = thrush_lexer::tokenize(src);
    let program = thrush_parser::parse(&tokens).unwrap_or_else(|e| panic!("{src:?}: {e}"));
    *program.expression.kind
}

fn parse_ty(src: &str) -> Type {
    let tokens = thrush_lexer::tokenize(src);
    thrush_parser::parse_type_expression(&tokens).unwrap_or_else(|e| panic!("{src:?}: {e}"))
}

#[test]
fn literal_number() {
    match parse_expr("42") {
        ExprKind::Literal(Literal::Number(n)) => assert_eq!(n, 42.0),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn literal_string_unescapes() {
    match parse_expr(r#""hi\nthere""#) {
        ExprKind::Literal(Literal::String(s)) => assert_eq!(s, "hi\nthere"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn variable_reference() {
    match parse_expr("x") {
        ExprKind::Variable(name) => assert_eq!(name, "x"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn additive_left_assoc() {
    match parse_expr("1 - 2 - 3") {
        ExprKind::Binary { operator, left, .. } => {
            assert_eq!(operator, "-");
            match *left.kind {
                ExprKind::Binary { operator, .. } => assert_eq!(operator, "-"),
                other => panic!("unexpected left: {other:?}"),
            }
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn multiplicative_binds_tighter_than_additive() {
    // a + b * c => a + (b * c)
    match parse_expr("a + b * c") {
        ExprKind::Binary { operator, right, .. } => {
            assert_eq!(operator, "+");
            match *right.kind {
                ExprKind::Binary { operator, .. } => assert_eq!(operator, "*"),
                other => panic!("unexpected right: {other:?}"),
            }
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn unary_minus_desugars_to_multiplication() {
    match parse_expr("-5") {
        ExprKind::Binary { operator, left, right } => {
            assert_eq!(operator, "*");
            match (*left.kind, *right.kind) {
                (ExprKind::Literal(Literal::Number(a)), ExprKind::Literal(Literal::Number(b))) => {
                    assert_eq!(a, -1.0);
                    assert_eq!(b, 5.0);
                }
                other => panic!("unexpected operands: {other:?}"),
            }
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn non_adjacent_minus_is_subtraction() {
    match parse_expr("a - 5") {
        ExprKind::Binary { operator, left, .. } => {
            assert_eq!(operator, "-");
            matches!(*left.kind, ExprKind::Variable(_));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn application_is_left_assoc_juxtaposition() {
    match parse_expr("f a b") {
        ExprKind::Application { func, args } => {
            assert_eq!(args.len(), 2);
            match *func.kind {
                ExprKind::Variable(name) => assert_eq!(name, "f"),
                other => panic!("unexpected func: {other:?}"),
            }
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn pipeline_collects_all_steps() {
    match parse_expr("f |> g |> h") {
        ExprKind::Pipeline { steps } => assert_eq!(steps.len(), 3),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn thrush_and_dollar_are_left_assoc_binary() {
    match parse_expr("a | f $ g") {
        ExprKind::Binary { operator, .. } => assert_eq!(operator, "$"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn empty_list() {
    match parse_expr("[]") {
        ExprKind::List(elems) => assert!(elems.is_empty()),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn list_with_trailing_comma() {
    match parse_expr("[1, 2, 3,]") {
        ExprKind::List(elems) => assert_eq!(elems.len(), 3),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn empty_brace_is_unit() {
    assert!(matches!(parse_expr("{}"), ExprKind::Unit));
}

#[test]
fn brace_with_accessor_fields_is_record() {
    match parse_expr("{@x 1, @y 2}") {
        ExprKind::Record(fields) => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].name, "x");
            assert_eq!(fields[1].name, "y");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn brace_without_accessor_is_tuple() {
    match parse_expr("{1, 2, 3}") {
        ExprKind::Tuple(elems) => assert_eq!(elems.len(), 3),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn single_element_brace_is_arity_one_tuple() {
    match parse_expr("{1}") {
        ExprKind::Tuple(elems) => assert_eq!(elems.len(), 1),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn accessor_optional_flag() {
    match parse_expr("@name?") {
        ExprKind::Accessor { field, optional } => {
            assert_eq!(field, "name");
            assert!(optional);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn function_with_multiple_params() {
    match parse_expr("fn a b => a + b") {
        ExprKind::Function { params, .. } => assert_eq!(params, vec!["a", "b"]),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn function_zero_params() {
    match parse_expr("fn () => 1") {
        ExprKind::Function { params, .. } => assert!(params.is_empty()),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn function_unit_param() {
    match parse_expr("fn {} => 1") {
        ExprKind::Function { params, .. } => assert_eq!(params, vec!["_unit"]),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn if_then_else() {
    assert!(matches!(parse_expr("if x then 1 else 2"), ExprKind::If { .. }));
}

#[test]
fn match_with_multiple_cases() {
    match parse_expr("match x with (Some y => y; None => 0)") {
        ExprKind::Match { cases, .. } => {
            assert_eq!(cases.len(), 2);
            match &cases[0].pattern.kind {
                PatternKind::Constructor { name, args } => {
                    assert_eq!(name, "Some");
                    assert_eq!(args.len(), 1);
                }
                other => panic!("unexpected: {other:?}"),
            }
            assert!(matches!(cases[1].pattern.kind, PatternKind::Constructor { .. }));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn where_clause_suffix() {
    match parse_expr("x where (x = 1)") {
        ExprKind::Where { definitions, .. } => assert_eq!(definitions.len(), 1),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn typed_expression_suffix() {
    match parse_expr("x : Float") {
        ExprKind::Typed { ty, .. } => assert_eq!(ty, Type::Primitive(Primitive::Float)),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn constrained_expression_suffix() {
    match parse_expr("x : a given a is Eq") {
        ExprKind::Constrained { constraint, .. } => {
            assert_eq!(
                constraint,
                ConstraintExpr::Leaf(Constraint::Is {
                    type_var: "a".to_string(),
                    name: "Eq".to_string(),
                })
            );
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn definition_statement() {
    match parse_expr("x = 1") {
        ExprKind::Definition { name, .. } => assert_eq!(name, "x"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn mutable_definition_statement() {
    match parse_expr("mut x = 1") {
        ExprKind::MutableDefinition { name, .. } => assert_eq!(name, "x"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn mutable_definition_with_bang() {
    match parse_expr("mut! x = 1") {
        ExprKind::MutableDefinition { name, .. } => assert_eq!(name, "x"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn mutation_statement() {
    match parse_expr("x := 2") {
        ExprKind::Mutation { name, .. } => assert_eq!(name, "x"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn import_statement() {
    match parse_expr(r#"import "core/list""#) {
        ExprKind::Import { path } => assert_eq!(path, "core/list"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn program_is_semicolon_chain() {
    match parse_expr("x = 1; y = 2; x + y") {
        ExprKind::Binary { operator, left, right } => {
            assert_eq!(operator, ";");
            assert!(matches!(*left.kind, ExprKind::Binary { .. }));
            assert!(matches!(*right.kind, ExprKind::Binary { operator, .. } if operator == "+"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn trailing_semicolon_is_allowed() {
    parse_expr("x = 1;");
}

#[test]
fn variant_declaration() {
    match parse_expr("variant Option a = Some a | None") {
        ExprKind::TypeDefinition {
            name,
            type_params,
            constructors,
        } => {
            assert_eq!(name, "Option");
            assert_eq!(type_params, vec!["a"]);
            assert_eq!(constructors.len(), 2);
            assert_eq!(constructors[0].name, "Some");
            assert_eq!(constructors[0].args.len(), 1);
            assert_eq!(constructors[1].name, "None");
            assert!(constructors[1].args.is_empty());
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn user_type_definition_record() {
    match parse_expr("type Point = {@x Float, @y Float}") {
        ExprKind::UserDefinedType { name, body, .. } => {
            assert_eq!(name, "Point");
            match body {
                thrush_parser::ast::UserTypeBody::Record(fields) => assert_eq!(fields.len(), 2),
                other => panic!("unexpected body: {other:?}"),
            }
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn constraint_definition() {
    match parse_expr("constraint Eq a (eq : a -> a -> Unit)") {
        ExprKind::ConstraintDefinition { name, type_param, signatures } => {
            assert_eq!(name, "Eq");
            assert_eq!(type_param, "a");
            assert_eq!(signatures.len(), 1);
            assert_eq!(signatures[0].name, "eq");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn implement_definition() {
    match parse_expr("implement Eq Point (eq = fn a b => true)") {
        ExprKind::ImplementDefinition { constraint_name, type_name, implementations } => {
            assert_eq!(constraint_name, "Eq");
            assert_eq!(type_name, "Point");
            assert_eq!(implementations.len(), 1);
            assert_eq!(implementations[0].name, "eq");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn type_expression_function_with_effect() {
    match parse_ty("Float -> Unit !log") {
        Type::Function { params, result, effects, .. } => {
            assert_eq!(params.len(), 1);
            assert_eq!(*result, Type::Unit);
            assert_eq!(effects, vec![thrush_parser::ast::Effect::Log]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn type_expression_invalid_effect_errors() {
    let tokens = thrush_lexer::tokenize("Float -> Unit !bogus");
    let err = thrush_parser::parse_type_expression(&tokens).unwrap_err();
    assert!(err.message.contains("Invalid effect"));
}

#[test]
fn type_expression_list_and_record() {
    match parse_ty("List {name: String, age: Float}") {
        Type::List(inner) => match *inner {
            Type::Record(fields) => assert_eq!(fields.len(), 2),
            other => panic!("unexpected: {other:?}"),
        },
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn type_expression_variant_with_args() {
    match parse_ty("Option Float") {
        Type::Variant { name, args } => {
            assert_eq!(name, "Option");
            assert_eq!(args.len(), 1);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn trailing_tokens_are_rejected() {
    let tokens = thrush_lexer::tokenize("1 2 )");
    assert!(thrush_parser::parse(&tokens).is_err());
}
