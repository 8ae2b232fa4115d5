use proptest::prelude::*;

use jot::lexer::{Span, KEYWORD_HASHMAP};
use jot::parser::{error::ParserErrorKind, parse, statement::Statement, Parser};

fn check(input: &str, expected: &str) {
    let program = match parse(input) {
        Ok(program) => program,
        Err(errors) => {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            panic!("failed to parse {input:?}: {messages:?}");
        }
    };
    assert_eq!(program.to_string(), expected, "Failed on input {input:?}");
}

fn check_errors(input: &str, expected: &[&str]) {
    let errors = parse(input).expect_err("input should not parse");
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages, expected, "Failed on input {input:?}");
}

#[test]
fn smoke_test() {
    let program = parse("").expect("empty input is a valid program");
    assert!(program.is_empty());
}

#[test]
fn operator_precedence() {
    let cases = [
        ("-a * b", "((-a) * b);"),
        ("!-a", "(!(-a));"),
        ("a + b + c", "((a + b) + c);"),
        ("a * b / c", "((a * b) / c);"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f);"),
        ("2 + 3 * 4", "(2 + (3 * 4));"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4));"),
        ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4));"),
        (
            "3 + 4 * 5 == 3 * 1 + 4 * 5",
            "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)));",
        ),
        ("true == !false", "(true == (!false));"),
        ("(5 + 5) * 2", "((5 + 5) * 2);"),
        ("-(5 + 5)", "(-(5 + 5));"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d);"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)));",
        ),
        (
            "a * [1, 2, 3, 4][b * c] * d",
            "((a * ([1, 2, 3, 4][(b * c)])) * d);",
        ),
        ("-a[0]", "(-(a[0]));"),
        ("f(1)(2)", "f(1)(2);"),
    ];
    for (input, expected) in cases {
        check(input, expected);
    }
}

#[test]
fn property_access_and_assignment() {
    check("obj.field.other", "obj.field.other;");
    check("-p.x", "(-p.x);");
    check("p.make().x", "p.make().x;");
    check("x = y = 3", "(x = (y = 3));");
    check("p.x = 1 + 2", "(p.x = (1 + 2));");
    check("a.b.c = d", "(a.b.c = d);");
}

#[test]
fn literals() {
    check("5; 2.5; 1.0", "5;\n2.5;\n1.0;");
    check("\"hello world\"", "\"hello world\";");
    check("true; false", "true;\nfalse;");
    check("[]", "[];");
    check("{}", "{};");
    check("{\"a\": 1, 2: true}", "{\"a\": 1, 2: true};");
    check("fn(x, y: int) { x + y }", "fn(x, y: int) { (x + y); };");
    check("fn(x) { x }(3)", "fn(x) { x; }(3);");
    check("new Point(1, 2)", "new Point(1, 2);");
    check("print(\"hi\", 1)", "print(\"hi\", 1);");
}

#[test]
fn declarations() {
    check("var x: int = 5;", "var x: int = 5;");
    check("var y", "var y;");
    check("var name: string", "var name: string;");
    check("var z = fn() { 1 }", "var z = fn() { 1; };");
    check(
        "fn add(a: int, b: int): int { return a + b; }",
        "fn add(a: int, b: int): int { return (a + b); }",
    );
    check("fn noop() {}", "fn noop() { }");
    check(
        "class Point { prop x: int; prop y: int; fn norm() { x * x } }",
        "class Point { prop x: int; prop y: int; fn norm() { (x * x); } }",
    );
    check("call main;", "call main;");
    check("call main", "call main;");
}

#[test]
fn return_statements() {
    check("return 5;", "return 5;");
    check("return;", "return;");
    check("fn f() { return }", "fn f() { return; }");
    check("return", "return;");
}

#[test]
fn if_expressions() {
    check("if x < y { x }", "if (x < y) { x; };");
    check("if (x) { 1 } else { 2 }", "if x { 1; } else { 2; };");
    check(
        "if a { 1 } else if b { 2 } else { 3 }",
        "if a { 1; } else { if b { 2; } else { 3; }; };",
    );
    check("var v = if a { 1 } else { 2 };", "var v = if a { 1; } else { 2; };");
}

#[test]
fn else_if_is_a_nested_if() {
    let program = parse("if a { 1 } else if b { 2 }").expect("valid program");
    let Some(Statement::Expression(stmt)) = program.get_statement(0) else {
        panic!("expected an expression statement");
    };
    let text = stmt.expr.to_string();
    assert_eq!(text, "if a { 1; } else { if b { 2; }; }");
}

#[test]
fn statements_are_separated_by_lines() {
    let program = parse("var a = 1; a + 2; print(a)").expect("valid program");
    assert_eq!(program.len(), 3);
    assert_eq!(program.to_string(), "var a = 1;\n(a + 2);\nprint(a);");
}

#[test]
fn printed_programs_parse_back_the_same() {
    let sources = [
        "var x: int = 5; fn add(a, b) { return a + b; } print(add(x, 2));",
        "class Counter { prop count: int; fn get() { count } } var c = new Counter(); c.count = 3;",
        "if a { 1 } else if b { 2 } else { 3 }",
        "var h = {\"k\": [1, 2.5, \"three\"], true: fn(x) { x }(4)};",
        "fn fib(n) { if n < 2 { return n; } return fib(n - 1) + fib(n - 2); } call main;",
    ];
    for source in sources {
        let first = parse(source).expect("source should parse").to_string();
        let second = parse(&first)
            .unwrap_or_else(|_| panic!("printed form should parse: {first}"))
            .to_string();
        assert_eq!(first, second);
    }
}

#[test]
fn float_literals_print_in_positional_form() {
    check("100000000000000000000.0", "100000000000000000000.0;");
    check("0.00000000000000000001", "0.00000000000000000001;");
    check("var x = 2.50;", "var x = 2.5;");
}

#[test]
fn missing_identifier_after_var() {
    check_errors(
        "var = 5;",
        &[
            "expected next token to be IDENT, got = instead",
            "no prefix parse function for = found",
        ],
    );
}

#[test]
fn errors_accumulate_across_statements() {
    check_errors(
        "var x = ;\nvar = 1;",
        &[
            "no prefix parse function for ; found",
            "expected next token to be IDENT, got = instead",
            "no prefix parse function for = found",
        ],
    );
}

#[test]
fn illegal_token_has_no_prefix_rule() {
    check_errors("5 @ 3;", &["no prefix parse function for ILLEGAL found"]);
}

#[test]
fn invalid_assignment_target() {
    check_errors("1 + 2 = 3;", &["invalid assignment target: (1 + 2)"]);
}

#[test]
fn class_body_only_holds_members() {
    check_errors(
        "class A { var x; }",
        &[
            "expected next token to be prop, got var instead",
            "no prefix parse function for } found",
        ],
    );
}

#[test]
fn unterminated_block() {
    check_errors("fn f() { 1", &["expected next token to be }, got EOF instead"]);
}

#[test]
fn integer_out_of_range() {
    let errors = parse("9999999999999999999999;").expect_err("integer overflows");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0].kind, ParserErrorKind::InvalidInteger(_)));
    assert_eq!(errors[0].code(), "P003");
}

#[test]
fn errors_point_at_the_offending_token() {
    let errors = parse("var = 5;").expect_err("missing identifier");
    assert_eq!(errors[0].span, Span::new(4, 5));
    assert_eq!(errors[1].span, Span::new(4, 5));
}

#[test]
fn parser_keeps_partial_program() {
    let mut parser = Parser::new("var a = 1; var = 2; var b = 3;");
    let program = parser.parse_program();
    assert_eq!(parser.get_errors().len(), 2);
    let names: Vec<String> = program
        .iter()
        .filter_map(|stmt| match stmt {
            Statement::VariableDecl(decl) => Some(decl.name.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

// Property-based tests

fn operator_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("+"),
        Just("-"),
        Just("*"),
        Just("/"),
        Just("<"),
        Just(">"),
        Just("=="),
        Just("!="),
    ]
}

fn leaf_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..10_000).prop_map(|v| v.to_string()),
        float_literal_strategy(),
        "[a-z][a-z_]{0,5}".prop_filter("keywords are not identifiers", |s: &String| {
            !KEYWORD_HASHMAP.contains_key(s.as_str())
        }),
        Just("true".to_string()),
        Just("\"text\"".to_string()),
    ]
}

/// Writes a float the way the printer does.
fn float_text(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

fn float_literal_strategy() -> impl Strategy<Value = String> {
    (1.0f64..10.0, -30i32..30)
        .prop_map(|(mantissa, exponent)| float_text(mantissa * 10f64.powi(exponent)))
}

/// Generates expressions already in the fully parenthesised printed form.
fn printed_expression_strategy() -> impl Strategy<Value = String> {
    leaf_strategy().prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), operator_strategy(), inner.clone())
                .prop_map(|(lhs, op, rhs)| format!("({lhs} {op} {rhs})")),
            inner.clone().prop_map(|rhs| format!("(-{rhs})")),
            inner.prop_map(|rhs| format!("(!{rhs})")),
        ]
    })
}

proptest! {
    #[test]
    fn printed_expressions_are_fixed_points(expr in printed_expression_strategy()) {
        let source = format!("{expr};");
        let program = parse(&source);
        prop_assert!(program.is_ok(), "failed to parse {}", source);
        if let Ok(program) = program {
            prop_assert_eq!(program.to_string(), source);
        }
    }

    #[test]
    fn float_literals_survive_a_round_trip(
        mantissa in 1.0f64..10.0,
        exponent in -300i32..300,
    ) {
        let source = format!("var x = {};", float_text(mantissa * 10f64.powi(exponent)));
        let first = parse(&source).map(|program| program.to_string());
        prop_assert!(first.is_ok(), "failed to parse {}", source);
        if let Ok(first) = first {
            prop_assert_eq!(&first, &source);
            let second = parse(&first).map(|program| program.to_string());
            prop_assert_eq!(second.ok(), Some(first));
        }
    }

    #[test]
    fn parser_terminates_on_arbitrary_input(input in "\\PC{0,64}") {
        // Either outcome is fine, it only has to return.
        let _ = parse(&input);
    }
}
