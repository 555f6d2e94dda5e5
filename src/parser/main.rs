//! 手写的递归下降解析器。
//!
//! 以单 Token 前瞻消费词法器产出的流，构建 `ast::Program`。
//! 语法错误是整条管道中唯一的致命错误：报告 E0100/E0101 之后
//! 解析立刻放弃，`parse` 返回 `None`，不做任何错误恢复。

use super::ast::*;
use crate::context::Context;
use crate::diagnostics::codes::{E0100_UNEXPECTED_TOKEN, E0101_INVALID_INTEGER_LITERAL};
use crate::diagnostics::{Diagnostic, DiagnosticBag, Label};
use crate::lexer::{Token, TokenKind};
use std::mem;

/// 解析失败只携带"已报告"这一个事实，具体信息都进了 DiagnosticBag。
type ParseResult<T> = Result<T, ()>;

pub struct Parser<'a> {
    tokens: &'a [Token],
    context: &'a mut Context,
    diagnostics: &'a mut DiagnosticBag,
    current: usize,
}

impl<'a> Parser<'a> {
    pub fn new(
        tokens: &'a [Token],
        context: &'a mut Context,
        diagnostics: &'a mut DiagnosticBag,
    ) -> Self {
        Self {
            tokens,
            context,
            diagnostics,
            current: 0,
        }
    }
}

// --- 1. 入口 ---

pub trait Parse {
    fn parse(self) -> Option<Program>;
}

impl<'a> Parse for Parser<'a> {
    fn parse(mut self) -> Option<Program> {
        let mut decls = Vec::new();
        while !self.is_at_end() {
            match self.parse_declaration() {
                Ok(decl) => decls.push(decl),
                // 语法错误致命：不同步、不恢复
                Err(()) => return None,
            }
        }
        Some(Program { decls })
    }
}

// --- 2. 声明 ---

pub trait DeclarationParser {
    fn parse_declaration(&mut self) -> ParseResult<Node<Decl>>;
    fn parse_func_decl(&mut self) -> ParseResult<Node<Decl>>;
    fn parse_let_decl(&mut self) -> ParseResult<Node<LetDecl>>;
    fn parse_type_annotation(&mut self) -> ParseResult<LType>;
}

impl<'a> DeclarationParser for Parser<'a> {
    fn parse_declaration(&mut self) -> ParseResult<Node<Decl>> {
        if self.check(&TokenKind::Func) {
            self.parse_func_decl()
        } else if self.check(&TokenKind::Let) {
            Ok(self.parse_let_decl()?.map(Decl::Let))
        } else {
            Ok(self.parse_statement()?.map(Decl::Stmt))
        }
    }

    fn parse_func_decl(&mut self) -> ParseResult<Node<Decl>> {
        let start = self.consume(&TokenKind::Func, "to begin a function declaration")?.span;
        let name = self.expect_ident("a function name")?;
        self.consume(&TokenKind::LParen, "after the function name")?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let param_name = self.expect_ident("a parameter name")?;
                let ltype = self.parse_type_annotation()?;
                let span = param_name.span;
                params.push(Node::new(
                    Param {
                        name: param_name,
                        ltype,
                    },
                    span,
                ));
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RParen, "after the parameter list")?;

        let return_type = self.parse_type_annotation()?;

        // 在解析函数体之前登记签名，体内的递归调用才能被解析
        self.context.functions.declare(&name.name, return_type);

        // 参数与函数体共享同一个作用域帧
        self.context.scopes.enter();
        for param in &params {
            self.context
                .scopes
                .declare(&param.kind.name.name, param.kind.ltype);
        }
        let body = self.parse_block(false)?;
        self.context.scopes.exit();

        let span = start.to(body.span);
        Ok(Node::new(
            Decl::Func(FuncDecl {
                name,
                params,
                return_type,
                body,
            }),
            span,
        ))
    }

    fn parse_let_decl(&mut self) -> ParseResult<Node<LetDecl>> {
        let start = self.consume(&TokenKind::Let, "to begin a variable declaration")?.span;
        let name = self.expect_ident("a variable name")?;
        let ltype = self.parse_type_annotation()?;
        self.consume(&TokenKind::Assign, "after the variable name")?;
        let initializer = self.parse_expression()?;
        let end = self.consume_semicolon()?;

        // 解析阶段登记类型供后续的变量引用解析使用；
        // 重复声明的裁决（E0200）留给代码生成阶段，避免报告两次。
        self.context.scopes.declare(&name.name, ltype);

        let span = start.to(end);
        Ok(Node::new(
            LetDecl {
                name,
                ltype,
                initializer,
            },
            span,
        ))
    }

    /// 解析可选的 `: int | str | bool` 标注。省略时类型为 `Void`。
    fn parse_type_annotation(&mut self) -> ParseResult<LType> {
        if !self.match_token(&TokenKind::Colon) {
            return Ok(LType::Void);
        }
        let type_name = self.expect_ident("a type name after `:`")?;
        match type_name.name.as_str() {
            "int" => Ok(LType::Int),
            "str" => Ok(LType::Str),
            "bool" => Ok(LType::Bool),
            other => {
                self.diagnostics.report(
                    Diagnostic::error(
                        &E0100_UNEXPECTED_TOKEN,
                        Label::new(type_name.span, "not a known type"),
                    )
                    .with_dynamic_message(format!(
                        "Unknown type name `{}`, expected `int`, `str` or `bool`",
                        other
                    )),
                );
                Err(())
            }
        }
    }
}

// --- 3. 语句 ---

pub trait StatementParser {
    fn parse_statement(&mut self) -> ParseResult<Node<Stmt>>;
    fn parse_block(&mut self, new_scope: bool) -> ParseResult<Node<Block>>;
    fn parse_if_stmt(&mut self) -> ParseResult<Node<Stmt>>;
    fn parse_for_stmt(&mut self) -> ParseResult<Node<Stmt>>;
    fn parse_return_stmt(&mut self) -> ParseResult<Node<Stmt>>;
    fn parse_print_stmt(&mut self) -> ParseResult<Node<Stmt>>;
}

impl<'a> StatementParser for Parser<'a> {
    fn parse_statement(&mut self) -> ParseResult<Node<Stmt>> {
        if self.check(&TokenKind::If) {
            self.parse_if_stmt()
        } else if self.check(&TokenKind::For) {
            self.parse_for_stmt()
        } else if self.check(&TokenKind::Return) {
            self.parse_return_stmt()
        } else if self.check(&TokenKind::Print) {
            self.parse_print_stmt()
        } else {
            let expr = self.parse_expression()?;
            let end = self.consume_semicolon()?;
            let span = expr.span.to(end);
            Ok(Node::new(Stmt::Expr(expr), span))
        }
    }

    fn parse_block(&mut self, new_scope: bool) -> ParseResult<Node<Block>> {
        if new_scope {
            self.context.scopes.enter();
        }
        let result = self.parse_block_inner();
        if new_scope {
            self.context.scopes.exit();
        }
        result
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.consume(&TokenKind::If, "to begin an if statement")?.span;
        self.consume(&TokenKind::LParen, "after `if`")?;
        let condition = self.parse_expression()?;
        self.consume(&TokenKind::RParen, "after the if condition")?;
        let then_block = self.parse_block(true)?;

        let else_block = if self.match_token(&TokenKind::Else) {
            Some(self.parse_block(true)?)
        } else {
            None
        };

        let end = else_block
            .as_ref()
            .map(|b| b.span)
            .unwrap_or(then_block.span);
        let span = start.to(end);
        Ok(Node::new(
            Stmt::If(IfStmt {
                condition,
                then_block,
                else_block,
            }),
            span,
        ))
    }

    /// `for { ... }` 无限循环，或 `for (start, end) { ... }` 有界循环。
    fn parse_for_stmt(&mut self) -> ParseResult<Node<Stmt>> {
        let start_span = self.consume(&TokenKind::For, "to begin a loop")?.span;

        let (start, end) = if self.match_token(&TokenKind::LParen) {
            let start = self.parse_expression()?;
            self.consume(&TokenKind::Comma, "between the loop bounds")?;
            let end = self.parse_expression()?;
            self.consume(&TokenKind::RParen, "after the loop bounds")?;
            (Some(start), Some(end))
        } else {
            (None, None)
        };

        let body = self.parse_block(true)?;
        let span = start_span.to(body.span);
        Ok(Node::new(Stmt::For(ForStmt { start, end, body }), span))
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.consume(&TokenKind::Return, "to begin a return statement")?.span;
        let value = self.parse_expression()?;
        let end = self.consume_semicolon()?;
        let span = start.to(end);
        Ok(Node::new(Stmt::Return(ReturnStmt { value }), span))
    }

    fn parse_print_stmt(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.consume(&TokenKind::Print, "to begin a print statement")?.span;
        self.consume(&TokenKind::LParen, "after `print`")?;
        let value = self.parse_expression()?;
        self.consume(&TokenKind::RParen, "after the print argument")?;
        let end = self.consume_semicolon()?;
        let span = start.to(end);
        Ok(Node::new(Stmt::Print(PrintStmt { value }), span))
    }
}

impl<'a> Parser<'a> {
    fn parse_block_inner(&mut self) -> ParseResult<Node<Block>> {
        let start = self.consume(&TokenKind::LBrace, "to open the block")?.span;

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let stmt = if self.check(&TokenKind::Let) {
                self.parse_let_decl()?.map(Stmt::Let)
            } else if self.check(&TokenKind::Func) {
                // 函数只能出现在顶层
                let span = self.peek().span;
                self.diagnostics.report(
                    Diagnostic::error(
                        &E0100_UNEXPECTED_TOKEN,
                        Label::new(span, "functions cannot be nested"),
                    )
                    .with_dynamic_message("`func` declarations are only allowed at the top level"),
                );
                return Err(());
            } else {
                self.parse_statement()?
            };
            stmts.push(stmt);
        }

        let end = self.consume(&TokenKind::RBrace, "to close the block")?.span;

        // 顶层含 return 的块在代码生成时不再补跳转
        let kind = if stmts.iter().any(|s| matches!(s.kind, Stmt::Return(_))) {
            BlockKind::Returning
        } else {
            BlockKind::Void
        };

        Ok(Node::new(Block { stmts, kind }, start.to(end)))
    }
}

// --- 4. 表达式 ---

pub trait ExpressionParser {
    fn parse_expression(&mut self) -> ParseResult<Node<Expr>>;
    fn parse_comparison(&mut self) -> ParseResult<Node<Expr>>;
    fn parse_additive(&mut self) -> ParseResult<Node<Expr>>;
    fn parse_multiplicative(&mut self) -> ParseResult<Node<Expr>>;
    fn parse_primary(&mut self) -> ParseResult<Node<Expr>>;
}

impl<'a> ExpressionParser for Parser<'a> {
    fn parse_expression(&mut self) -> ParseResult<Node<Expr>> {
        self.parse_comparison()
    }

    /// 比较不结合：`a < b < c` 不是合法表达式，第二个 `<` 会在
    /// 上层以多余 Token 的形式被拒绝。
    fn parse_comparison(&mut self) -> ParseResult<Node<Expr>> {
        let lhs = self.parse_additive()?;

        let op = match self.peek().kind {
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::LtEq => CmpOp::LtEq,
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::GtEq => CmpOp::GtEq,
            _ => return Ok(lhs),
        };
        self.advance();

        let rhs = self.parse_additive()?;
        let span = lhs.span.to(rhs.span);
        Ok(Node::new(
            Expr::Comparison(ComparisonExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }),
            span,
        ))
    }

    fn parse_additive(&mut self) -> ParseResult<Node<Expr>> {
        let mut lhs = self.parse_multiplicative()?;

        // 赋值伪装成二元运算：左侧必须是裸变量
        if lhs.kind.is_variable() && self.check(&TokenKind::Assign) {
            self.advance();
            let rhs = self.parse_expression()?;
            let span = lhs.span.to(rhs.span);
            return Ok(Node::new(
                Expr::Binary(BinaryExpr {
                    op: BinOp::Assign,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }),
                span,
            ));
        }

        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            let span = lhs.span.to(rhs.span);
            lhs = Node::new(
                Expr::Binary(BinaryExpr {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }),
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Node<Expr>> {
        let mut lhs = self.parse_primary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_primary()?;
            let span = lhs.span.to(rhs.span);
            lhs = Node::new(
                Expr::Binary(BinaryExpr {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }),
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_primary(&mut self) -> ParseResult<Node<Expr>> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Integer(text) => {
                self.advance();
                match text.parse::<i64>() {
                    Ok(value) => Ok(Node::new(Expr::Number(value), token.span)),
                    Err(_) => {
                        self.diagnostics.report(
                            Diagnostic::error(
                                &E0101_INVALID_INTEGER_LITERAL,
                                Label::new(token.span, "does not fit into a 64-bit integer"),
                            )
                            .with_dynamic_message(format!(
                                "Integer literal `{}` is out of range",
                                text
                            )),
                        );
                        Err(())
                    }
                }
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(Node::new(Expr::Str(value), token.span))
            }
            TokenKind::Boolean(value) => {
                self.advance();
                Ok(Node::new(Expr::Bool(value), token.span))
            }
            TokenKind::Ident(name) => {
                self.advance();
                let ident = Identifier {
                    name,
                    span: token.span,
                };
                if self.check(&TokenKind::LParen) {
                    self.parse_call(ident)
                } else {
                    // 查不到时类型退化为 Void，语义裁决留给代码生成
                    let ltype = self
                        .context
                        .scopes
                        .lookup(&ident.name)
                        .unwrap_or(LType::Void);
                    Ok(Node::new(
                        Expr::Variable(VariableRef { name: ident, ltype }),
                        token.span,
                    ))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(&TokenKind::RParen, "to close the grouping")?;
                Ok(expr)
            }
            other => {
                self.diagnostics.report(
                    Diagnostic::error(
                        &E0100_UNEXPECTED_TOKEN,
                        Label::new(token.span, "expected an expression here"),
                    )
                    .with_dynamic_message(format!(
                        "Expected an expression, but found {}",
                        other.describe()
                    )),
                );
                Err(())
            }
        }
    }
}

impl<'a> Parser<'a> {
    fn parse_call(&mut self, name: Identifier) -> ParseResult<Node<Expr>> {
        self.consume(&TokenKind::LParen, "after the function name")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.consume(&TokenKind::RParen, "after the arguments")?.span;
        let span = name.span.to(end);
        Ok(Node::new(Expr::Call(CallExpr { name, args }), span))
    }
}

// --- 5. Token 流工具 ---

pub trait Util {
    fn peek(&self) -> &Token;
    fn previous(&self) -> &Token;
    fn is_at_end(&self) -> bool;
    fn advance(&mut self) -> &Token;
    fn check(&self, kind: &TokenKind) -> bool;
    fn match_token(&mut self, kind: &TokenKind) -> bool;
    fn consume(&mut self, kind: &TokenKind, context_msg: &str) -> ParseResult<Token>;
    fn consume_semicolon(&mut self) -> ParseResult<crate::diagnostics::Span>;
    fn expect_ident(&mut self, context_msg: &str) -> ParseResult<Identifier>;
}

impl<'a> Util for Parser<'a> {
    fn peek(&self) -> &Token {
        // 词法器保证流以 Eof 结尾
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    /// 只比较变体，不比较携带的数据。
    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.peek().kind) == mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: &TokenKind, context_msg: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        let found = self.peek().clone();
        self.diagnostics.report(
            Diagnostic::error(
                &E0100_UNEXPECTED_TOKEN,
                Label::new(found.span, format!("expected {}", kind.describe())),
            )
            .with_dynamic_message(format!(
                "Expected {} {}, but found {}",
                kind.describe(),
                context_msg,
                found.kind.describe()
            )),
        );
        Err(())
    }

    fn consume_semicolon(&mut self) -> ParseResult<crate::diagnostics::Span> {
        Ok(self
            .consume(&TokenKind::Semicolon, "to end the statement")?
            .span)
    }

    fn expect_ident(&mut self, context_msg: &str) -> ParseResult<Identifier> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Identifier {
                    name,
                    span: token.span,
                })
            }
            other => {
                self.diagnostics.report(
                    Diagnostic::error(
                        &E0100_UNEXPECTED_TOKEN,
                        Label::new(token.span, format!("expected {}", context_msg)),
                    )
                    .with_dynamic_message(format!(
                        "Expected {}, but found {}",
                        context_msg,
                        other.describe()
                    )),
                );
                Err(())
            }
        }
    }
}
