pub mod codes;

use ariadne::{Color, Label as AriadneLabel, Report, ReportKind, Source};
use codes::ErrorCode; // 从子模块中导入 ErrorCode 结构体
use std::mem;
use std::ops;

// --- 1. Span: 源代码位置 ---

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// 把两个 Span 合并成一个覆盖区间，常用于拼接 AST 节点的位置。
    pub fn to(self, other: Span) -> Self {
        Self::new(self.start, other.end)
    }

    pub fn into_range(self) -> ops::Range<usize> {
        self.start..self.end
    }
}

impl From<ops::Range<usize>> for Span {
    fn from(range: ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

// --- 2. Diagnostic 及其相关类型 ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// 一条结构化的诊断信息。
/// 核心字段（错误码、级别、默认消息）直接取自 `ErrorCode` 常量，
/// 动态信息（比如具体的名字或类型）通过 `with_dynamic_message` 覆盖。
#[derive(Debug, Clone)]
pub struct Diagnostic {
    code: &'static str,
    level: DiagnosticLevel,
    message: String,
    labels: Vec<Label>,
    notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(error_code: &'static ErrorCode, primary_label: Label) -> Self {
        Self {
            code: error_code.code,
            level: error_code.level,
            message: error_code.message.to_string(),
            labels: vec![primary_label],
            notes: Vec::new(),
        }
    }

    pub fn error(error_code: &'static ErrorCode, primary_label: Label) -> Self {
        assert!(
            matches!(error_code.level, DiagnosticLevel::Error),
            "Tried to create an error diagnostic with a non-error code."
        );
        Self::new(error_code, primary_label)
    }

    /// 覆盖默认消息，插入动态信息（例如具体的变量名或类型名）。
    #[must_use]
    pub fn with_dynamic_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_secondary_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn code(&self) -> &str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// --- 3. DiagnosticBag: 收集器 ---

/// “诊断背包”。整个编译管道共享一个实例，各阶段把错误装进来，
/// 测试可以通过 `iter()` 对产生的诊断逐条断言。
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    source: String,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            diagnostics: Vec::new(),
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn print(&mut self, file_name: &str) {
        let diags_to_print = mem::take(&mut self.diagnostics);
        if !diags_to_print.is_empty() {
            print_all(file_name, &self.source, diags_to_print);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }
}

// --- 4. Printer: 内部打印逻辑 ---

fn print_all(file_name: &str, source_code: &str, diagnostics: Vec<Diagnostic>) {
    let cache = (file_name, Source::from(source_code));

    for diag in diagnostics {
        if diag.labels.is_empty() {
            continue;
        }

        let kind = match diag.level {
            DiagnosticLevel::Error => ReportKind::Error,
            DiagnosticLevel::Warning => ReportKind::Warning,
        };

        let color = match diag.level {
            DiagnosticLevel::Error => Color::Red,
            DiagnosticLevel::Warning => Color::Yellow,
        };

        let primary_label_info = &diag.labels[0];

        let mut report = Report::build(kind, (file_name, primary_label_info.span.into_range()))
            .with_message(&diag.message)
            .with_code(diag.code);

        for (i, label_info) in diag.labels.iter().enumerate() {
            let label = AriadneLabel::new((file_name, label_info.span.into_range()))
                .with_message(&label_info.message);

            let final_label = if i == 0 {
                label.with_color(color)
            } else {
                label.with_color(Color::Blue)
            };
            report.add_label(final_label);
        }

        for note in &diag.notes {
            report = report.with_note(note);
        }

        report.finish().print(cache.clone()).unwrap();
    }
}
