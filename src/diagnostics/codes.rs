// src/diagnostics/codes.rs

use crate::diagnostics::DiagnosticLevel;

/// Represents a specific error code with its associated information.
/// This struct serves as the single source of truth for all compiler diagnostics.
#[derive(Debug, Clone)]
pub struct ErrorCode {
    pub code: &'static str,
    pub level: DiagnosticLevel,
    pub message: &'static str,
    pub explanation: &'static str,
}

/*
E00xx: 词法分析 (Lexical Analysis) 错误。

E01xx: 语法分析 (Parsing / Syntax) 错误。语法错误是致命的，编译立即停止。

E02xx: 语义规则 (Scope / Type Rules) 错误。在代码生成阶段检测，
       可恢复：报告后跳过对应指令，编译继续。
*/
// --- E00xx: Lexical Analysis Errors ---

pub const E0001_UNRECOGNIZED_CHARACTER: ErrorCode = ErrorCode {
    code: "E0001",
    level: DiagnosticLevel::Error,
    message: "Unrecognized character",
    explanation: "The scanner encountered a byte that is not part of the Della language definition. \
                  The byte is turned into an illegal token; compilation fails when the parser reaches it."
};

// --- E01xx: Syntax Analysis (Parsing) Errors ---

pub const E0100_UNEXPECTED_TOKEN: ErrorCode = ErrorCode {
    code: "E0100",
    level: DiagnosticLevel::Error,
    message: "Unexpected token",
    explanation: "The arrangement of tokens does not match any grammar rule in Della. \
                  The diagnostic label names the expected and the actually found token. \
                  Malformed syntax is the one fatal condition in the pipeline: no usable IR is produced."
};

pub const E0101_INVALID_INTEGER_LITERAL: ErrorCode = ErrorCode {
    code: "E0101",
    level: DiagnosticLevel::Error,
    message: "Invalid integer literal",
    explanation: "The value of the integer literal is too large to fit into a 64-bit signed integer."
};

// --- E02xx: Scope / Type Rule Errors (recoverable) ---

pub const E0200_DUPLICATE_DECLARATION: ErrorCode = ErrorCode {
    code: "E0200",
    level: DiagnosticLevel::Error,
    message: "Variable is already declared in this scope",
    explanation: "A `let` may introduce a name at most once per scope frame. The duplicate declaration \
                  is not registered and emits no instructions; the first declaration stays in effect."
};

pub const E0201_UNDECLARED_FUNCTION: ErrorCode = ErrorCode {
    code: "E0201",
    level: DiagnosticLevel::Error,
    message: "Call to an undeclared function",
    explanation: "The called name was never registered in the global function table by a `func` \
                  declaration. No call instruction is emitted for this call site."
};

pub const E0202_ASSIGNMENT_TYPE_MISMATCH: ErrorCode = ErrorCode {
    code: "E0202",
    level: DiagnosticLevel::Error,
    message: "Assignment type mismatch",
    explanation: "The type of the right-hand side expression differs from the declared type of the \
                  variable on the left-hand side. No store instruction is emitted for this assignment."
};
