//! 语法分析模块。
//!
//! `ast` 定义语法树结构，`main` 是手写的递归下降解析器本体。

pub mod ast;
mod main;


use crate::context::Context;
use crate::diagnostics::DiagnosticBag;
use crate::lexer::Token;
use main::Parse;

pub use main::Parser;

/// 把 Token 流解析为 `Program`。
///
/// 任何语法错误都是致命的：错误进入 `diagnostics` 后返回 `None`。
pub fn parse(
    tokens: &[Token],
    context: &mut Context,
    diagnostics: &mut DiagnosticBag,
) -> Option<ast::Program> {
    Parser::new(tokens, context, diagnostics).parse()
}
