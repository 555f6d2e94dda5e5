//! 表达式的指令生成。
//!
//! 临时值住在编号寄存器栈 `%s0, %s1, ...` 上：每个子表达式返回
//! 自己的结果寄存器编号，二元运算消费栈顶两个寄存器并回退一格。
//! 不是所有表达式都有值：赋值、void 调用和被跳过的出错调用返回
//! `None`，消费方据此省略后续指令。裸变量引用走快路径，
//! 在各使用点直接以 `%name` 参与指令。

use super::CodeGenerator;
use crate::context::Context;
use crate::diagnostics::codes::{E0201_UNDECLARED_FUNCTION, E0202_ASSIGNMENT_TYPE_MISMATCH};
use crate::diagnostics::{Diagnostic, Label};
use crate::parser::ast::*;

/// 推导表达式的静态类型。
///
/// 变量优先查当前作用域帧，查不到时退回解析阶段记录的类型；
/// 调用查全局函数表，未知函数退化为 `Void`。
pub fn ltype_of(expr: &Expr, context: &Context) -> LType {
    match expr {
        Expr::Number(_) => LType::Int,
        Expr::Str(_) => LType::Str,
        Expr::Bool(_) => LType::Bool,
        Expr::Variable(var) => context
            .scopes
            .lookup(&var.name.name)
            .unwrap_or(var.ltype),
        Expr::Binary(binary) => match binary.op {
            BinOp::Assign => LType::Void,
            _ => LType::Int,
        },
        Expr::Comparison(_) => LType::Bool,
        Expr::Call(call) => context
            .functions
            .lookup(&call.name.name)
            .map(|info| info.return_type)
            .unwrap_or(LType::Void),
    }
}

/// 调用实参的两种形态：直接传递的变量，或已求值的临时寄存器。
enum Arg {
    Var(String, LType),
    Reg(u32),
}

pub(super) trait ExpressionCodeGen {
    fn gen_expression(&mut self, expr: &Node<Expr>) -> Option<u32>;
    fn gen_binary(&mut self, binary: &BinaryExpr) -> Option<u32>;
    fn gen_comparison(&mut self, cmp: &ComparisonExpr) -> Option<u32>;
    fn gen_string(&mut self, value: &str) -> u32;
    fn gen_assignment(&mut self, binary: &BinaryExpr, span: crate::diagnostics::Span);
    fn gen_call(&mut self, call: &CallExpr) -> Option<u32>;
}

impl<'a> ExpressionCodeGen for CodeGenerator<'a> {
    fn gen_expression(&mut self, expr: &Node<Expr>) -> Option<u32> {
        match &expr.kind {
            Expr::Number(value) => {
                let reg = self.context.fresh_reg();
                self.line(format!("%s{} =w copy {}", reg, value));
                Some(reg)
            }
            Expr::Bool(value) => {
                let reg = self.context.fresh_reg();
                self.line(format!("%s{} =w copy {}", reg, *value as i32));
                Some(reg)
            }
            Expr::Str(value) => Some(self.gen_string(value)),
            Expr::Variable(var) => {
                let ltype = ltype_of(&expr.kind, self.context);
                let reg = self.context.fresh_reg();
                self.line(format!(
                    "%s{} ={} copy %{}",
                    reg,
                    ltype.base_tag(),
                    var.name.name
                ));
                Some(reg)
            }
            Expr::Binary(binary) => match binary.op {
                // 赋值是语句性质的表达式，不产生值
                BinOp::Assign => {
                    self.gen_assignment(binary, expr.span);
                    None
                }
                _ => self.gen_binary(binary),
            },
            Expr::Comparison(cmp) => self.gen_comparison(cmp),
            Expr::Call(call) => self.gen_call(call),
        }
    }

    fn gen_binary(&mut self, binary: &BinaryExpr) -> Option<u32> {
        let lhs = self.gen_expression(&binary.lhs);
        let rhs = self.gen_expression(&binary.rhs);
        // 任一操作数没有产生值时整条运算跳过
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return None;
        };

        let op = match binary.op {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
            BinOp::Rem => "rem",
            // 赋值在 gen_expression 就被分流了
            BinOp::Assign => unreachable!("assignment is not an arithmetic operation"),
        };

        // 结果写回左操作数的槽位，栈顶回退一格
        self.line(format!("%s{} =w {} %s{}, %s{}", lhs, op, lhs, rhs));
        self.context.regs -= 1;
        Some(lhs)
    }

    fn gen_comparison(&mut self, cmp: &ComparisonExpr) -> Option<u32> {
        // 入口处的计数器值给这次比较的 %le/%re 对编号；
        // 结果寄存器在之后分配，保证相邻比较的编号不冲突
        let id = self.context.regs;

        // 两侧操作数先各自落位到 %le / %re，再做一次比较
        if !self.stage_word(&cmp.lhs, &format!("%le{}", id)) {
            return None;
        }
        if !self.stage_word(&cmp.rhs, &format!("%re{}", id)) {
            return None;
        }

        let op = match cmp.op {
            CmpOp::Eq => "ceqw",
            CmpOp::Gt => "csgtw",
            CmpOp::GtEq => "csgew",
            CmpOp::Lt => "csltw",
            CmpOp::LtEq => "cslew",
        };
        let result = self.context.fresh_reg();
        self.line(format!("%s{} =w {} %le{}, %re{}", result, op, id, id));
        Some(result)
    }

    /// 字符串被逐字节写进一块 alloc4 缓冲区，以 0 字节收尾。
    /// 表达式的值是缓冲区的起始指针。
    fn gen_string(&mut self, value: &str) -> u32 {
        let id = self.context.fresh_reg();
        self.line(format!("%A{} =l alloc4 {}", id, value.len()));
        self.line(format!("%cp{} =l copy %A{}", id, id));
        for byte in value.bytes() {
            self.line(format!("storeb {}, %cp{}", byte, id));
            self.line(format!("%cp{} =l add %cp{}, 1", id, id));
        }
        self.line(format!("storeb 0, %cp{}", id));
        self.line(format!("%s{} =l copy %A{}", id, id));
        id
    }

    fn gen_assignment(&mut self, binary: &BinaryExpr, span: crate::diagnostics::Span) {
        let Expr::Variable(var) = &binary.lhs.kind else {
            unreachable!("the parser only accepts variables as assignment targets");
        };

        let lhs_type = self
            .context
            .scopes
            .lookup(&var.name.name)
            .unwrap_or(LType::Void);
        let rhs_type = ltype_of(&binary.rhs.kind, self.context);

        if lhs_type != rhs_type {
            self.diagnostics.report(
                Diagnostic::error(
                    &E0202_ASSIGNMENT_TYPE_MISMATCH,
                    Label::new(span, "the two sides have different types"),
                )
                .with_dynamic_message(format!(
                    "Cannot assign a value of type {:?} to `{}` of type {:?}",
                    rhs_type, var.name.name, lhs_type
                )),
            );
            // 跳过这条赋值，不产出任何指令
            return;
        }

        if let Expr::Variable(src) = &binary.rhs.kind {
            self.line(format!(
                "%{} ={} copy %{}",
                var.name.name,
                rhs_type.base_tag(),
                src.name.name
            ));
        } else if let Some(reg) = self.gen_expression(&binary.rhs) {
            self.line(format!(
                "%{} ={} copy %s{}",
                var.name.name,
                rhs_type.base_tag(),
                reg
            ));
        }
    }

    fn gen_call(&mut self, call: &CallExpr) -> Option<u32> {
        let Some(info) = self.context.functions.lookup(&call.name.name) else {
            self.diagnostics.report(
                Diagnostic::error(
                    &E0201_UNDECLARED_FUNCTION,
                    Label::new(call.name.span, "this function was never declared"),
                )
                .with_dynamic_message(format!(
                    "Call to undeclared function `{}`",
                    call.name.name
                )),
            );
            // 调用点整个被跳过
            return None;
        };

        // 实参从左到右求值；裸变量不经过临时寄存器。
        // 任一实参没有产生值时整个调用跳过，避免错位的实参表。
        let mut args = Vec::new();
        for arg in &call.args {
            if let Expr::Variable(var) = &arg.kind {
                let ltype = ltype_of(&arg.kind, self.context);
                args.push(Arg::Var(var.name.name.clone(), ltype));
            } else {
                let reg = self.gen_expression(arg)?;
                args.push(Arg::Reg(reg));
            }
        }

        let rendered: Vec<String> = args
            .iter()
            .map(|arg| match arg {
                Arg::Var(name, ltype) => format!("{} %{}", ltype.base_tag(), name),
                Arg::Reg(reg) => format!("w %s{}", reg),
            })
            .collect();
        let rendered = rendered.join(", ");

        match info.return_type.return_tag() {
            // 返回值落进一个新的临时寄存器
            Some(tag) => {
                let reg = self.context.fresh_reg();
                self.line(format!(
                    "%s{} ={} call ${}({})",
                    reg, tag, call.name.name, rendered
                ));
                Some(reg)
            }
            None => {
                self.line(format!("call ${}({})", call.name.name, rendered));
                None
            }
        }
    }
}

impl<'a> CodeGenerator<'a> {
    /// 把一个表达式的值落位到指定的字寄存器（比较操作数、
    /// 条件、循环边界共用）。返回 `false` 表示表达式没有产生值，
    /// 调用方应当跳过依赖它的指令。
    pub(super) fn stage_word(&mut self, expr: &Node<Expr>, target: &str) -> bool {
        if let Expr::Variable(var) = &expr.kind {
            self.line(format!("{} =w copy %{}", target, var.name.name));
            true
        } else if let Some(reg) = self.gen_expression(expr) {
            self.line(format!("{} =w copy %s{}", target, reg));
            true
        } else {
            false
        }
    }
}
