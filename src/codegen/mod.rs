//! 代码生成模块。
//!
//! 把 AST 直接翻译为 QBE 风格的文本 IR。没有独立的语义分析遍：
//! 作用域和类型规则在这里裁决，违规处报告 E02xx 并跳过对应指令，
//! 生成继续进行。

mod expression;
mod function;
mod statement;

#[cfg(test)]
mod test;

use crate::context::Context;
use crate::diagnostics::DiagnosticBag;
use crate::parser::ast::{Decl, Program};

use function::DeclarationCodeGen;
use statement::StatementCodeGen;

pub use expression::ltype_of;

pub struct CodeGenerator<'a> {
    context: &'a mut Context,
    diagnostics: &'a mut DiagnosticBag,
    out: String,
}

impl<'a> CodeGenerator<'a> {
    fn line(&mut self, line: String) {
        self.out.push_str(&line);
        self.out.push('\n');
    }
}

/// 为整个程序生成 IR 文本。
///
/// 语义错误（E0200/E0201/E0202）可恢复：对应的指令被跳过，
/// 其余输出照常产出。调用方通过 `diagnostics.has_errors()`
/// 判断输出是否带洞。
pub fn codegen(program: &Program, context: &mut Context, diagnostics: &mut DiagnosticBag) -> String {
    // 作用域在解析阶段已经走过一遍，这里从干净的全局帧重新开始；
    // 函数表保留，否则每个 func 都会被误判为重复声明
    context.begin_codegen();

    let mut generator = CodeGenerator {
        context,
        diagnostics,
        out: String::new(),
    };
    generator.gen_program(program);
    generator.out
}

impl<'a> CodeGenerator<'a> {
    fn gen_program(&mut self, program: &Program) {
        // printf 的整数格式串：%d + 换行 + 终止符
        self.line("data $fmt_int = { b \"%d\", b 10, b 0 }".to_string());

        for decl in &program.decls {
            match &decl.kind {
                Decl::Func(func) => self.gen_func_decl(func),
                Decl::Let(let_decl) => self.gen_let_decl(let_decl),
                Decl::Stmt(stmt) => self.gen_statement(stmt),
            }
        }
    }
}
