use color_eyre::eyre::{Context, Result};
use proptest::prelude::*;
use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use jot::lexer::{
    formatter::{BasicFormatter, ToFormatter, TokenFormatter},
    Lexer, Span, Token, TokenKind,
};

fn check(input: &str, expected: &str, test_name: &str) {
    let mut lexer = Lexer::new(input);
    let formatter: BasicFormatter = lexer.create_formatter();
    let mut buffer = String::new();
    loop {
        let token = lexer.next_token();
        buffer.push_str(&formatter.format(&token));
        buffer.push('\n');
        if matches!(token.kind, TokenKind::Eof) {
            break;
        }
    }

    assert_eq!(buffer, expected, "Failed the test {test_name}");
}

#[test]
fn smoke_test() {
    check("", "EOF\n", "smoke");
}

#[test]
fn two_character_operators() {
    check(
        "= == ! != < >",
        "=\n==\n!\n!=\n<\n>\nEOF\n",
        "two character operators",
    );
}

#[test]
fn second_dot_ends_a_number() {
    check("1.2.3", "FLOAT 1.2\n.\nINT 3\nEOF\n", "second dot");
}

#[test]
fn unterminated_string_runs_to_end() {
    check("\"abc def", "STRING \"abc def\"\nEOF\n", "unterminated string");
}

#[test]
fn strings_have_no_escapes() {
    check(r#""a\n""#, "STRING \"a\\n\"\nEOF\n", "no escapes");
}

#[test]
fn identifiers_stop_at_digits() {
    check("abc1", "IDENT abc\nINT 1\nEOF\n", "identifier digits");
}

#[test]
fn unknown_characters_are_illegal() {
    check("a @ b", "IDENT a\nILLEGAL @\nIDENT b\nEOF\n", "illegal");
}

#[test]
fn comments_are_skipped() {
    check("1 // one\n// two\n2", "INT 1\nINT 2\nEOF\n", "comments");
}

#[test]
fn eof_repeats_forever() {
    let source = "var x";
    let mut lexer = Lexer::new(source);
    let mut kinds = Vec::new();
    for _ in 0..8 {
        kinds.push(lexer.next_token().kind);
    }
    assert_eq!(
        kinds,
        vec![
            TokenKind::KeywordVar,
            TokenKind::Ident,
            TokenKind::Eof,
            TokenKind::Eof,
            TokenKind::Eof,
            TokenKind::Eof,
            TokenKind::Eof,
            TokenKind::Eof,
        ]
    );
    let eof = lexer.next_token();
    assert_eq!(eof.span, Span::new(source.len(), source.len()));
}

#[test]
fn spans_cover_the_lexeme() {
    let source = "var name = \"str\";";
    let mut lexer = Lexer::new(source);
    let tokens: Vec<Token> = std::iter::from_fn(|| {
        let token = lexer.next_token();
        (token.kind != TokenKind::Eof).then_some(token)
    })
    .collect();
    let lexemes: Vec<&str> = tokens.iter().map(|t| &source[t.span.range()]).collect();
    assert_eq!(lexemes, vec!["var", "name", "=", "\"str\"", ";"]);
    assert_eq!(tokens[3].literal, "str");
}

#[test]
fn test_all() -> Result<()> {
    let input_dir = Path::new("./test_data/lexer/in");
    let output_dir = Path::new("./test_data/lexer/out");

    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "jt" {
            continue;
        }

        let test_name = AsRef::<Path>::as_ref(
            path.file_name()
                .expect("File name can't be none as the path is to a real file."),
        );

        let input = read_to_string(&path).context("Failed to open input test data file")?;

        let expected = {
            let output_file_name = test_name.with_extension("txt");
            let output_path = output_dir.join(output_file_name);
            read_to_string(output_path).context("Failed to open output test data file")?
        };

        let res = std::panic::catch_unwind(|| {
            check(&input, &expected, &test_name.to_string_lossy());
        });
        if res.is_err() {
            succeeded = false;
        }
    }

    assert!(succeeded, "Some lexer test cases failed");

    Ok(())
}

// Property-based tests

fn symbol_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("(".to_string()),
        Just(")".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just("[".to_string()),
        Just("]".to_string()),
        Just(",".to_string()),
        Just(".".to_string()),
        Just(":".to_string()),
        Just(";".to_string()),
        Just("-".to_string()),
        Just("+".to_string()),
        Just("*".to_string()),
        Just("/".to_string()),
        Just("!".to_string()),
        Just("!=".to_string()),
        Just("=".to_string()),
        Just("==".to_string()),
        Just("<".to_string()),
        Just(">".to_string()),
    ]
}

fn numeric_literal_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]+".prop_map(|s| s),         // Integer literals
        "[0-9]+\\.[0-9]+".prop_map(|s| s) // Float literals
    ]
}

fn string_literal_strategy() -> impl Strategy<Value = String> {
    "[^\"]*".prop_map(|s: String| format!("\"{}\"", s))
}

fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z_]*".prop_map(|s: String| s)
}

fn keyword_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("fn".to_string()),
        Just("class".to_string()),
        Just("prop".to_string()),
        Just("true".to_string()),
        Just("false".to_string()),
        Just("if".to_string()),
        Just("else".to_string()),
        Just("return".to_string()),
        Just("new".to_string()),
        Just("var".to_string()),
        Just("void".to_string()),
        Just("int".to_string()),
        Just("float".to_string()),
        Just("string".to_string()),
        Just("bool".to_string()),
        Just("call".to_string()),
        Just("print".to_string()),
    ]
}

fn comment_strategy() -> impl Strategy<Value = String> {
    "[^\n]*".prop_map(|s: String| format!("//{}\n", s))
}

fn token_sequence_with_comments_strategy() -> impl Strategy<Value = String> {
    const MIN_TOKEN_COUNT: usize = 1;
    const MAX_TOKEN_COUNT: usize = 100;
    prop::collection::vec(
        prop_oneof![
            symbol_strategy(),
            numeric_literal_strategy(),
            string_literal_strategy(),
            identifier_strategy(),
            keyword_strategy(),
            comment_strategy(),
        ],
        MIN_TOKEN_COUNT..MAX_TOKEN_COUNT,
    )
    .prop_map(|tokens| tokens.join(" "))
}

fn token_sequence_without_comments_strategy() -> impl Strategy<Value = Vec<String>> {
    const MIN_TOKEN_COUNT: usize = 1;
    const MAX_TOKEN_COUNT: usize = 100;
    prop::collection::vec(
        prop_oneof![
            symbol_strategy(),
            numeric_literal_strategy(),
            string_literal_strategy(),
            identifier_strategy(),
            keyword_strategy(),
        ],
        MIN_TOKEN_COUNT..MAX_TOKEN_COUNT,
    )
}

proptest! {
    #[test]
    fn lexer_handles_valid_tokens_without_comments(
        input in token_sequence_without_comments_strategy(),
    ) {
        // Add 1 to include EOF token
        let expected_num_tokens = input.len() + 1;
        let input = input.join(" ");
        let mut lexer = Lexer::new(&input);
        let mut num_tokens = 0;
        loop {
            num_tokens += 1;
            let token = lexer.next_token();
            prop_assert_ne!(token.kind, TokenKind::Illegal);
            if token.kind == TokenKind::Eof {
                break;
            }
        }
        prop_assert_eq!(num_tokens, expected_num_tokens);
    }

    #[test]
    fn lexer_handles_valid_tokens_with_comments(input in token_sequence_with_comments_strategy()) {
        let mut lexer = Lexer::new(&input);
        loop {
            let token = lexer.next_token();
            prop_assert_ne!(token.kind, TokenKind::Illegal);
            if token.kind == TokenKind::Eof {
                break;
            }
        }
    }

    #[test]
    fn lexer_never_moves_past_the_end(input in "\\PC*", extra in 1usize..16) {
        let mut lexer = Lexer::new(&input);
        while lexer.next_token().kind != TokenKind::Eof {}
        for _ in 0..extra {
            let token = lexer.next_token();
            prop_assert_eq!(token.kind, TokenKind::Eof);
            prop_assert_eq!(token.span.range(), input.len()..input.len());
        }
    }
}
