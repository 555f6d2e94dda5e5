//! 语句与控制流的指令生成。
//!
//! 每个 if / for 在进入时领取一个全局唯一的 id，其标签和辅助寄存器
//! （`@ift{id}`、`%lr{id}` 等）都带上这个编号，相邻或嵌套的控制流
//! 结构因此互不冲突。依赖子表达式结果的指令在子表达式没有产生值时
//! 被跳过（语义错误可恢复，见 expression 模块）。

use super::expression::{ltype_of, ExpressionCodeGen};
use super::CodeGenerator;
use crate::diagnostics::codes::E0200_DUPLICATE_DECLARATION;
use crate::diagnostics::{Diagnostic, Label};
use crate::parser::ast::*;

pub(super) trait StatementCodeGen {
    fn gen_statement(&mut self, stmt: &Stmt);
    fn gen_block(&mut self, block: &Block, new_scope: bool);
    fn gen_let_decl(&mut self, decl: &LetDecl);
    fn gen_print(&mut self, stmt: &PrintStmt);
    fn gen_return(&mut self, stmt: &ReturnStmt);
    fn gen_if(&mut self, stmt: &IfStmt);
    fn gen_for(&mut self, stmt: &ForStmt);
}

impl<'a> StatementCodeGen for CodeGenerator<'a> {
    fn gen_statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(decl) => self.gen_let_decl(decl),
            Stmt::Print(print) => self.gen_print(print),
            Stmt::Return(ret) => self.gen_return(ret),
            Stmt::If(if_stmt) => self.gen_if(if_stmt),
            Stmt::For(for_stmt) => self.gen_for(for_stmt),
            // 表达式语句丢弃值
            Stmt::Expr(expr) => {
                let _ = self.gen_expression(expr);
            }
        }
    }

    fn gen_block(&mut self, block: &Block, new_scope: bool) {
        if new_scope {
            self.context.scopes.enter();
        }
        for stmt in &block.stmts {
            self.gen_statement(&stmt.kind);
        }
        if new_scope {
            self.context.scopes.exit();
        }
    }

    fn gen_let_decl(&mut self, decl: &LetDecl) {
        if !self.context.scopes.declare(&decl.name.name, decl.ltype) {
            self.diagnostics.report(
                Diagnostic::error(
                    &E0200_DUPLICATE_DECLARATION,
                    Label::new(decl.name.span, "declared a second time here"),
                )
                .with_dynamic_message(format!(
                    "Variable `{}` is already declared in this scope",
                    decl.name.name
                )),
            );
            // 首个声明保持生效，这条 let 连初始化都不产出
            return;
        }

        let tag = decl.ltype.store_tag();
        if let Expr::Variable(src) = &decl.initializer.kind {
            self.line(format!("%{} ={} copy %{}", decl.name.name, tag, src.name.name));
        } else if let Some(reg) = self.gen_expression(&decl.initializer) {
            self.line(format!("%{} ={} copy %s{}", decl.name.name, tag, reg));
        }
    }

    fn gen_print(&mut self, stmt: &PrintStmt) {
        let ltype = ltype_of(&stmt.value.kind, self.context);

        let operand = if let Expr::Variable(var) = &stmt.value.kind {
            format!("%{}", var.name.name)
        } else {
            match self.gen_expression(&stmt.value) {
                Some(reg) => format!("%s{}", reg),
                // 没有可打印的值
                None => return,
            }
        };

        // 字符串本身就是 C 字符串指针，直接交给 printf；
        // 其余类型经 $fmt_int 以十进制打印
        if ltype == LType::Str {
            self.line(format!("call $printf(l {})", operand));
        } else {
            self.line(format!("call $printf(l $fmt_int, w {})", operand));
        }
    }

    fn gen_return(&mut self, stmt: &ReturnStmt) {
        let tag = ltype_of(&stmt.value.kind, self.context).base_tag();
        if let Expr::Variable(var) = &stmt.value.kind {
            self.line(format!("%r ={} copy %{}", tag, var.name.name));
        } else if let Some(reg) = self.gen_expression(&stmt.value) {
            self.line(format!("%r ={} copy %s{}", tag, reg));
        }
        // 统一经由函数尾部的 @retstmt 离开
        self.line("jmp @retstmt".to_string());
    }

    fn gen_if(&mut self, stmt: &IfStmt) {
        let id = self.context.fresh_reg();

        // 条件没有产生值时整个 if 跳过
        if !self.stage_word(&stmt.condition, &format!("%cond{}", id)) {
            return;
        }

        self.line(format!("jnz %cond{}, @ift{}, @iff{}", id, id, id));

        self.line(format!("@ift{}", id));
        self.gen_block(&stmt.then_block.kind, true);
        // then 分支若以 return 收尾就不再补跳转
        if stmt.then_block.kind.kind == BlockKind::Void {
            self.line(format!("jmp @ifend{}", id));
        }

        self.line(format!("@iff{}", id));
        if let Some(else_block) = &stmt.else_block {
            self.gen_block(&else_block.kind, true);
        }
        self.line(format!("@ifend{}", id));
    }

    /// 两种循环共用一个倒计数寄存器 `%lr{id}`。
    ///
    /// 无界形式从 0 起一直加 1，条件恒真；有界形式先算出
    /// `end - start` 的差值，每轮减 1，归零时跳出。
    fn gen_for(&mut self, stmt: &ForStmt) {
        let id = self.context.fresh_reg();

        match (&stmt.start, &stmt.end) {
            (Some(start), Some(end)) => {
                // 任一边界没有产生值时整个循环跳过
                if !self.stage_word(start, &format!("%start{}", id)) {
                    return;
                }
                if !self.stage_word(end, &format!("%end{}", id)) {
                    return;
                }
                self.line(format!("%lr{} =w sub %end{}, %start{}", id, id, id));
            }
            _ => {
                self.line(format!("%lr{} =w copy 0", id));
            }
        }

        self.line(format!("@loop{}", id));
        if stmt.start.is_some() {
            self.line(format!("%lr{} =w sub %lr{}, 1", id, id));
        } else {
            self.line(format!("%lr{} =w add %lr{}, 1", id, id));
        }

        self.gen_block(&stmt.body.kind, true);

        self.line(format!("jnz %lr{}, @loop{}, @end{}", id, id, id));
        self.line(format!("@end{}", id));
    }
}
