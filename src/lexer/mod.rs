//! 词法分析器模块。
//!
//! 基于 `logos` 的扫描器：一次性把整个源文件切分为 Token 流，
//! 末尾补上 `Eof` 哨兵，供解析器做单 Token 前瞻。

pub mod token;

#[cfg(test)]
mod test;

use crate::diagnostics::codes::E0001_UNRECOGNIZED_CHARACTER;
use crate::diagnostics::{Diagnostic, DiagnosticBag, Label, Span};
use logos::Logos;
pub use token::{Token, TokenKind};

/// 对整个源码执行词法分析。
///
/// 词法阶段总会返回完整的 Token 流：无法识别的字符被报告为 E0001，
/// 并以 `Illegal` Token 的形式留在流中，让解析器在到达时以统一的
/// 语法错误路径拒绝它。
pub fn lex(source: &str, diagnostics: &mut DiagnosticBag) -> Vec<Token> {
    let mut tokens = Vec::new();

    for (result, range) in TokenKind::lexer(source).spanned() {
        let span = Span::from(range);
        match result {
            Ok(kind) => tokens.push(Token { kind, span }),
            Err(_) => {
                let ch = source[span.into_range()].chars().next().unwrap_or('\u{FFFD}');
                diagnostics.report(
                    Diagnostic::error(
                        &E0001_UNRECOGNIZED_CHARACTER,
                        Label::new(span, "this character is not part of the language"),
                    )
                    .with_dynamic_message(format!("Unrecognized character `{}`", ch)),
                );
                tokens.push(Token {
                    kind: TokenKind::Illegal(ch),
                    span,
                });
            }
        }
    }

    // Eof 的 span 落在源码末尾之后的空区间上。
    let end = source.len();
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
    });

    tokens
}
