//! 函数声明的指令生成。

use super::statement::StatementCodeGen;
use super::CodeGenerator;
use crate::parser::ast::*;

pub(super) trait DeclarationCodeGen {
    fn gen_func_decl(&mut self, func: &FuncDecl);
}

impl<'a> DeclarationCodeGen for CodeGenerator<'a> {
    fn gen_func_decl(&mut self, func: &FuncDecl) {
        let params: Vec<String> = func
            .params
            .iter()
            .map(|p| format!("{} %{}", p.kind.ltype.base_tag(), p.kind.name.name))
            .collect();
        let params = params.join(", ");

        // main 是程序入口，需要对链接器可见
        let export = if func.name.name == "main" { "export " } else { "" };
        let header = match func.return_type.return_tag() {
            Some(tag) => format!(
                "{}function {} ${}({}) {{",
                export, tag, func.name.name, params
            ),
            None => format!("{}function ${}({}) {{", export, func.name.name, params),
        };
        self.line(header);
        self.line("@start".to_string());

        // 参数与函数体共享同一个作用域帧
        self.context.scopes.enter();
        for param in &func.params {
            self.context
                .scopes
                .declare(&param.kind.name.name, param.kind.ltype);
        }
        self.gen_block(&func.body.kind, false);
        self.context.scopes.exit();

        // 所有 return 都跳到这里统一离开
        self.line("@retstmt".to_string());
        match func.return_type {
            LType::Void => self.line("ret".to_string()),
            _ => self.line("ret %r".to_string()),
        }
        self.line("}".to_string());
    }
}
