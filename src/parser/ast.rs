//! 抽象语法树（AST）的数据结构定义。
//!
//! 所有节点都包裹在携带 `Span` 的 `Node<T>` 中，诊断信息由此
//! 能指回源码的准确位置。

use crate::diagnostics::Span;

// --- 1. 通用包装 ---

/// 一个带有源码位置的 AST 节点。
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub kind: T,
    pub span: Span,
}

impl<T> Node<T> {
    pub fn new(kind: T, span: Span) -> Self {
        Self { kind, span }
    }

    /// 保留位置信息，变换内部的节点内容。
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Node<U> {
        Node {
            kind: f(self.kind),
            span: self.span,
        }
    }
}

/// 一个被命名的实体（变量名、函数名）。
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

// --- 2. 类型 ---

/// 语言的四个内建类型。
///
/// `Void` 同时承担两个职责：函数没有返回值，以及省略类型标注的
/// 声明在解析阶段的占位类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LType {
    #[default]
    Void,
    Int,
    Str,
    Bool,
}

impl LType {
    /// 寄存器运算使用的基础类型标记：整数和布尔走字宽 `w`，
    /// 字符串是指针走长字 `l`。
    pub fn base_tag(self) -> char {
        match self {
            LType::Str => 'l',
            LType::Int | LType::Bool | LType::Void => 'w',
        }
    }

    /// 变量初始化（let 绑定）使用的存储标记。布尔以字节 `b` 存储。
    pub fn store_tag(self) -> char {
        match self {
            LType::Str => 'l',
            LType::Bool => 'b',
            LType::Int | LType::Void => 'w',
        }
    }

    /// 函数签名中的返回类型标记；`Void` 没有标记。
    pub fn return_tag(self) -> Option<&'static str> {
        match self {
            LType::Int | LType::Bool => Some("w"),
            LType::Str => Some("l"),
            LType::Void => None,
        }
    }
}

// --- 3. 顶层结构 ---

/// 一个完整的翻译单元。
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub decls: Vec<Node<Decl>>,
}

/// 顶层可以出现的三种声明。
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Func(FuncDecl),
    Let(LetDecl),
    Stmt(Stmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: Identifier,
    pub params: Vec<Node<Param>>,
    pub return_type: LType,
    pub body: Node<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Identifier,
    pub ltype: LType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetDecl {
    pub name: Identifier,
    pub ltype: LType,
    pub initializer: Node<Expr>,
}

// --- 4. 语句 ---

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(LetDecl),
    Print(PrintStmt),
    Return(ReturnStmt),
    For(ForStmt),
    If(IfStmt),
    Expr(Node<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub value: Node<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Node<Expr>,
}

/// `for` 循环。有界形式携带起止表达式，无界形式两者皆空。
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub start: Option<Node<Expr>>,
    pub end: Option<Node<Expr>>,
    pub body: Node<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Node<Expr>,
    pub then_block: Node<Block>,
    pub else_block: Option<Node<Block>>,
}

/// 块的控制流分类。顶层含有 `return` 的块不需要（也不应当）
/// 在末尾补跳转。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Void,
    Returning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Node<Stmt>>,
    pub kind: BlockKind,
}

// --- 5. 表达式 ---

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(i64),
    Str(String),
    Bool(bool),
    Variable(VariableRef),
    Binary(BinaryExpr),
    Comparison(ComparisonExpr),
    Call(CallExpr),
}

impl Expr {
    /// 裸变量引用在代码生成中有专门的快路径（直接 copy，
    /// 不经过临时寄存器栈）。
    pub fn is_variable(&self) -> bool {
        matches!(self, Expr::Variable(_))
    }
}

/// 对一个已声明变量的引用。类型在解析时从当前作用域解析得到，
/// 查不到时退化为 `Void`。
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRef {
    pub name: Identifier,
    pub ltype: LType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Assign,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub lhs: Box<Node<Expr>>,
    pub rhs: Box<Node<Expr>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonExpr {
    pub op: CmpOp,
    pub lhs: Box<Node<Expr>>,
    pub rhs: Box<Node<Expr>>,
}

/// 函数调用。返回类型不存放在 AST 中：被调函数可能在调用点之后
/// 才定义，统一推迟到代码生成阶段查函数表。
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: Identifier,
    pub args: Vec<Node<Expr>>,
}
