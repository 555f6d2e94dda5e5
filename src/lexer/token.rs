use crate::diagnostics::Span;
use logos::Logos;
use std::fmt::{Display, Formatter, Result};

/// 主体 Token 定义，包含其种类和在源代码中的位置。
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

// logos 解析时需要使用的错误类型
#[derive(Debug, Default, Clone, PartialEq)]
pub enum LexingError {
    /// 使用 `#[default]` 来指定当 logos 需要创建一个默认错误实例时
    /// 应该使用哪个变体。
    #[default]
    UnrecognizedCharacter,
}

/// Della 语言中所有可能的词法单元。
///
/// Token 由 logos 一次性产出且不可变；整个流之后被移交给解析器独占使用。
/// 词法阶段永远不会失败：无法识别的字节降级为 `Illegal`，由解析器拒绝。
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(error = LexingError)]
// 跳过空白
#[logos(skip r"[ \t\r\n\f]+")]
// 跳过单行注释
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // 关键字
    #[token("func")]
    Func,
    #[token("let")]
    Let,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    #[token("print")]
    Print,

    // 布尔字面量
    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Boolean(bool),

    // 整数字面量
    // 先保留原文，到解析阶段再转换为 i64（溢出在那里报告）。
    #[regex("[0-9]+", |lex| lex.slice().to_string())]
    Integer(String),

    // 字符串字面量：定界引号被消费但不保存。
    #[regex(r#""[^"]*""#, |lex| {
        let slice = lex.slice();
        slice[1..slice.len() - 1].to_string()
    })]
    Str(String),

    // 标识符：按语言定义只由字母组成。
    // 关键字的拼写更短时 logos 按最长匹配优先处理，
    // 所以 `funcy` 是标识符而不是 `func` + `y`。
    #[regex("[a-zA-Z]+", |lex| lex.slice().to_string())]
    Ident(String),

    // 运算符。双字符形式必须在其单字符前缀之前被尝试，
    // logos 的最长匹配保证了这一点。
    #[token(":=")]
    Walrus,
    #[token("==")]
    EqEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("=")]
    Assign,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // 分割符号
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,

    // 哨兵。logos 永远不会产出这两个变体：
    // `Illegal` 由 `lex()` 在词法错误处插入，`Eof` 在流末尾补上。
    Illegal(char),
    Eof,
}

impl TokenKind {
    /// 一个用于错误报告的简单字符串表示。
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Ident(_) => "an identifier".to_string(),
            TokenKind::Integer(_) => "an integer literal".to_string(),
            TokenKind::Str(_) => "a string literal".to_string(),
            TokenKind::Boolean(_) => "a boolean literal".to_string(),
            TokenKind::Illegal(c) => format!("an illegal character `{}`", c),
            other => format!("`{}`", other),
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let s = match self {
            TokenKind::Func => "func",
            TokenKind::Let => "let",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Return => "return",
            TokenKind::Print => "print",
            TokenKind::Boolean(b) => return write!(f, "{}", b),
            TokenKind::Integer(text) => return write!(f, "{}", text),
            TokenKind::Str(text) => return write!(f, "\"{}\"", text),
            TokenKind::Ident(name) => return write!(f, "{}", name),
            TokenKind::Walrus => ":=",
            TokenKind::EqEq => "==",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Assign => "=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Illegal(c) => return write!(f, "{}", c),
            TokenKind::Eof => "<eof>",
        };
        write!(f, "{}", s)
    }
}
