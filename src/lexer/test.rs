use super::*;
use crate::diagnostics::DiagnosticBag;

/// 测试辅助：只取 Token 的种类，忽略位置信息。
fn kinds_of(source: &str) -> Vec<TokenKind> {
    let mut diagnostics = DiagnosticBag::new(source);
    lex(source, &mut diagnostics)
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn empty_source_yields_only_eof() {
    assert_eq!(kinds_of(""), vec![TokenKind::Eof]);
}

#[test]
fn keywords_and_identifiers() {
    let kinds = kinds_of("func let if else for while return print funcy");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Func,
            TokenKind::Let,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::For,
            TokenKind::While,
            TokenKind::Return,
            TokenKind::Print,
            // 最长匹配：`funcy` 是标识符而不是 `func` + `y`
            TokenKind::Ident("funcy".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn integer_literal_keeps_raw_text() {
    let kinds = kinds_of("0 42 9999999999999999999999");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Integer("0".to_string()),
            TokenKind::Integer("42".to_string()),
            // 溢出的字面量在词法阶段原样保留，到解析阶段才报告
            TokenKind::Integer("9999999999999999999999".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn string_literal_strips_quotes() {
    let kinds = kinds_of(r#"print("hi");"#);
    assert_eq!(
        kinds,
        vec![
            TokenKind::Print,
            TokenKind::LParen,
            TokenKind::Str("hi".to_string()),
            TokenKind::RParen,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn boolean_literals() {
    let kinds = kinds_of("true false truthy");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Boolean(true),
            TokenKind::Boolean(false),
            TokenKind::Ident("truthy".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn two_char_operators_win_over_prefixes() {
    let kinds = kinds_of(":= == <= >= = < > : ;");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Walrus,
            TokenKind::EqEq,
            TokenKind::LtEq,
            TokenKind::GtEq,
            TokenKind::Assign,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Colon,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn arithmetic_operators_and_delimiters() {
    let kinds = kinds_of("( ) { } , + - * / %");
    assert_eq!(
        kinds,
        vec![
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Comma,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn line_comments_are_skipped() {
    let kinds = kinds_of("let x = 1; // a comment\nlet y = 2;");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Let,
            TokenKind::Ident("x".to_string()),
            TokenKind::Assign,
            TokenKind::Integer("1".to_string()),
            TokenKind::Semicolon,
            TokenKind::Let,
            TokenKind::Ident("y".to_string()),
            TokenKind::Assign,
            TokenKind::Integer("2".to_string()),
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn unrecognized_character_reports_and_continues() {
    let source = "let x = 1 @ 2;";
    let mut diagnostics = DiagnosticBag::new(source);
    let tokens = lex(source, &mut diagnostics);

    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.iter().next().unwrap().code(), "E0001");

    // 非法字符留在流中，后续 Token 照常产出
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert!(kinds.contains(&TokenKind::Illegal('@')));
    assert!(kinds.contains(&TokenKind::Integer("2".to_string())));
    assert_eq!(kinds.last(), Some(&TokenKind::Eof));
}

#[test]
fn spans_point_into_the_source() {
    let source = "let abc = 5;";
    let mut diagnostics = DiagnosticBag::new(source);
    let tokens = lex(source, &mut diagnostics);

    let ident = tokens
        .iter()
        .find(|t| matches!(t.kind, TokenKind::Ident(_)))
        .unwrap();
    assert_eq!(&source[ident.span.into_range()], "abc");

    let eof = tokens.last().unwrap();
    assert_eq!(eof.span, crate::diagnostics::Span::new(source.len(), source.len()));
}
