//! Della 编译器库。
//!
//! 管道：词法分析 -> 递归下降解析 -> 直接代码生成，
//! 产出 QBE 风格的文本 IR（`.ssa`）。
//!
//! 错误模型分两档：词法/语法错误致命，`compile` 返回 `None`；
//! 作用域/类型错误可恢复，对应指令被跳过，其余输出照常产出。
//! 所有诊断都进入调用方提供的 `DiagnosticBag`。

pub mod codegen;
pub mod context;
pub mod diagnostics;
pub mod lexer;
pub mod parser;

use context::Context;
use diagnostics::DiagnosticBag;

/// 把一份源码编译为 IR 文本。
///
/// 返回 `None` 表示语法层面已经失败，没有可用的输出；
/// 返回 `Some` 时仍可能携带 E02xx 诊断，此时输出带洞，
/// 由调用方决定是否采用。
pub fn compile(source: &str, diagnostics: &mut DiagnosticBag) -> Option<String> {
    let tokens = lexer::lex(source, diagnostics);
    let mut context = Context::new();
    let program = parser::parse(&tokens, &mut context, diagnostics)?;
    Some(codegen::codegen(&program, &mut context, diagnostics))
}
