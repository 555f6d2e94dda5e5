//! 编译上下文：作用域栈、全局函数表和临时寄存器计数器。
//!
//! 解析器和代码生成器共享同一个 `Context`。解析阶段用它为变量引用
//! 解析类型、登记函数签名；代码生成阶段在 `begin_codegen` 重置作用域
//! 之后重新走一遍声明，此时才裁决重复声明等语义错误。


use crate::parser::ast::LType;
use std::collections::HashMap;

// --- 1. 作用域 ---

/// 一个作用域帧：当前帧内已声明的名字和它们的类型。
#[derive(Debug, Default)]
pub struct ScopeFrame {
    types: HashMap<String, LType>,
}

/// 作用域栈。
///
/// 查询只命中当前帧：外层帧的名字对内层不可见。这是语言目前
/// 的作用域模型（块各自独立），参数和函数体共享同一帧。
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![ScopeFrame::default()],
        }
    }

    pub fn enter(&mut self) {
        self.frames.push(ScopeFrame::default());
    }

    /// 离开当前帧。全局帧永远保留。
    pub fn exit(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// 在当前帧声明一个名字。
    ///
    /// 若名字已存在则返回 `false` 且不覆盖原有类型，
    /// 首个声明保持生效。
    pub fn declare(&mut self, name: &str, ltype: LType) -> bool {
        let frame = self.frames.last_mut().unwrap();
        if frame.types.contains_key(name) {
            return false;
        }
        frame.types.insert(name.to_string(), ltype);
        true
    }

    /// 在当前帧中查找名字的类型。
    pub fn lookup(&self, name: &str) -> Option<LType> {
        self.frames.last().unwrap().types.get(name).copied()
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

// --- 2. 函数表 ---

#[derive(Debug, Clone, Copy)]
pub struct FuncInfo {
    pub return_type: LType,
}

/// 全局函数表。解析阶段在进入函数体之前登记签名，
/// 因此同一文件内的调用不受定义顺序限制。
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: HashMap<String, FuncInfo>,
}

impl FunctionTable {
    pub fn declare(&mut self, name: &str, return_type: LType) {
        self.functions
            .insert(name.to_string(), FuncInfo { return_type });
    }

    pub fn lookup(&self, name: &str) -> Option<FuncInfo> {
        self.functions.get(name).copied()
    }
}

// --- 3. Context ---

/// 跨阶段共享的编译状态。
#[derive(Debug, Default)]
pub struct Context {
    /// 临时寄存器计数器（`%s0`, `%s1`, ...），同时为标签提供唯一 id。
    pub regs: u32,
    pub scopes: ScopeStack,
    pub functions: FunctionTable,
}

impl Context {
    pub fn new() -> Self {
        Self {
            regs: 0,
            scopes: ScopeStack::new(),
            functions: FunctionTable::default(),
        }
    }

    /// 为代码生成准备一份干净的状态。
    ///
    /// 作用域栈重置为单个空的全局帧，寄存器计数器清零；
    /// 函数表保留，解析阶段登记的签名在这里继续有效。
    pub fn begin_codegen(&mut self) {
        self.regs = 0;
        self.scopes = ScopeStack::new();
    }

    /// 取下一个空闲的临时寄存器编号。
    pub fn fresh_reg(&mut self) -> u32 {
        let id = self.regs;
        self.regs += 1;
        id
    }
}
