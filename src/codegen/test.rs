use super::codegen;
use crate::context::Context;
use crate::diagnostics::DiagnosticBag;
use crate::lexer::lex;
use crate::parser::parse;

/// 测试辅助：跑完整条管道，语法必须合法。
fn generate(source: &str) -> (String, DiagnosticBag) {
    let mut diagnostics = DiagnosticBag::new(source);
    let mut context = Context::new();
    let tokens = lex(source, &mut diagnostics);
    let program = parse(&tokens, &mut context, &mut diagnostics)
        .expect("test sources must be syntactically valid");
    let output = codegen(&program, &mut context, &mut diagnostics);
    (output, diagnostics)
}

fn generate_ok(source: &str) -> String {
    let (output, diagnostics) = generate(source);
    assert!(!diagnostics.has_errors(), "unexpected diagnostics");
    output
}

fn count_code(diagnostics: &DiagnosticBag, code: &str) -> usize {
    diagnostics.iter().filter(|d| d.code() == code).count()
}

#[test]
fn output_starts_with_the_format_string() {
    let output = generate_ok("let x: int = 1;");
    assert!(output.starts_with("data $fmt_int = { b \"%d\", b 10, b 0 }\n"));
}

#[test]
fn literal_lands_in_a_numbered_register() {
    let output = generate_ok("let x: int = 5;");
    assert!(output.contains("%s0 =w copy 5"));
    assert!(output.contains("%x =w copy %s0"));
}

#[test]
fn arithmetic_consumes_the_register_stack() {
    let output = generate_ok("let x: int = 2 + 3;");
    assert!(output.contains("%s0 =w copy 2"));
    assert!(output.contains("%s1 =w copy 3"));
    // 结果写回左操作数的槽位
    assert!(output.contains("%s0 =w add %s0, %s1"));
    assert!(output.contains("%x =w copy %s0"));
}

#[test]
fn string_literal_is_spilled_byte_by_byte() {
    let output = generate_ok("print(\"hi\");");
    assert!(output.contains("%A0 =l alloc4 2"));
    assert!(output.contains("storeb 104, %cp0"));
    assert!(output.contains("storeb 105, %cp0"));
    // 0 字节收尾
    assert!(output.contains("storeb 0, %cp0"));
    // 字符串直接作为指针交给 printf
    assert!(output.contains("call $printf(l %s0)"));
}

#[test]
fn print_of_an_integer_goes_through_fmt_int() {
    let output = generate_ok("let x: int = 7; print(x);");
    assert!(output.contains("call $printf(l $fmt_int, w %x)"));
}

#[test]
fn str_typed_variable_uses_long_registers() {
    let output = generate_ok("let s: str = \"a\"; print(s);");
    assert!(output.contains("%s =l copy %s0"));
    assert!(output.contains("call $printf(l %s)"));
}

#[test]
fn bool_let_stores_as_a_byte() {
    let output = generate_ok("let flag: bool = true;");
    assert!(output.contains("%s0 =w copy 1"));
    assert!(output.contains("%flag =b copy %s0"));
}

#[test]
fn comparison_stages_both_sides() {
    let output = generate_ok("let x: int = 1; let b: bool = x < 2;");
    assert!(output.contains("=w copy %x"));
    assert!(output.contains("csltw %le"));
}

#[test]
fn valid_program_produces_no_diagnostics() {
    // 解析阶段已经登记过的名字在代码生成阶段不得误报重复
    generate_ok(
        "func add(a: int, b: int): int { return a + b; } \
         func main(): int { let x: int = add(2, 3); print(x); return 0; }",
    );
}

#[test]
fn duplicate_let_reports_once_and_keeps_the_first() {
    let (output, diagnostics) = generate("let x: int = 1; let x: int = 2;");
    assert_eq!(count_code(&diagnostics, "E0200"), 1);
    assert!(output.contains("copy 1"));
    // 重复声明连初始化都不产出
    assert!(!output.contains("copy 2"));
}

#[test]
fn undeclared_function_call_emits_nothing() {
    let (output, diagnostics) = generate("foo();");
    assert_eq!(count_code(&diagnostics, "E0201"), 1);
    assert!(!output.contains("call"));
}

#[test]
fn forward_call_resolves_through_the_function_table() {
    let output = generate_ok("func main(): int { return helper(); } func helper(): int { return 7; }");
    assert!(output.contains("call $helper()"));
}

#[test]
fn call_result_lands_in_a_fresh_register() {
    let output = generate_ok("func one(): int { return 1; } let x: int = one();");
    assert!(output.contains("=w call $one()"));
    // 调用结果经由临时寄存器进入变量
    assert!(output.contains("%x =w copy %s"));
}

#[test]
fn variable_arguments_are_passed_directly() {
    let output = generate_ok(
        "func add(a: int, b: int): int { return a + b; } \
         let x: int = 1; let y: int = 2; let z: int = add(x, y);",
    );
    assert!(output.contains("call $add(w %x, w %y)"));
}

#[test]
fn void_call_has_no_result_register() {
    let output = generate_ok("func hello() { print(1); } hello();");
    assert!(output.contains("\ncall $hello()\n"));
    assert!(!output.contains("= call $hello()"));
}

#[test]
fn assignment_type_mismatch_suppresses_the_store() {
    let (output, diagnostics) = generate("let x: int = 0; x = \"hi\";");
    assert_eq!(count_code(&diagnostics, "E0202"), 1);
    // 右侧的求值也被跳过
    assert!(!output.contains("alloc4"));
    assert_eq!(output.matches("%x =").count(), 1);
}

#[test]
fn matching_assignment_copies_between_variables() {
    let output = generate_ok("let x: int = 0; let y: int = 1; x = y;");
    assert!(output.contains("%x =w copy %y"));
}

#[test]
fn function_header_and_epilogue() {
    let output = generate_ok("func main(): int { return 0; }");
    assert!(output.contains("export function w $main() {"));
    assert!(output.contains("@start"));
    assert!(output.contains("jmp @retstmt"));
    assert!(output.contains("@retstmt\nret %r\n}"));
}

#[test]
fn void_function_returns_without_a_value() {
    let output = generate_ok("func hello() { print(1); }");
    assert!(output.contains("function $hello() {"));
    assert!(output.contains("@retstmt\nret\n}"));
}

#[test]
fn parameters_carry_their_type_tags() {
    let output = generate_ok("func greet(name: str, times: int) { print(name); }");
    assert!(output.contains("function $greet(l %name, w %times) {"));
}

#[test]
fn returning_then_block_skips_the_end_jump() {
    let output = generate_ok("func main(): int { if (1 < 2) { return 1; } return 0; }");
    assert!(output.contains("jnz %cond0, @ift0, @iff0"));
    // then 分支以 return 收尾，不补跳转
    assert!(!output.contains("jmp @ifend0"));
    assert!(output.contains("@ifend0"));
}

#[test]
fn void_then_block_jumps_over_the_else() {
    let output = generate_ok("if (1 < 2) { print(1); } else { print(2); }");
    assert!(output.contains("jmp @ifend0"));
    assert!(output.contains("@iff0"));
}

#[test]
fn unbounded_for_counts_up_forever() {
    let output = generate_ok("for { print(1); }");
    assert!(output.contains("%lr0 =w copy 0"));
    assert!(output.contains("%lr0 =w add %lr0, 1"));
    assert!(output.contains("jnz %lr0, @loop0, @end0"));
}

#[test]
fn bounded_for_counts_down_the_difference() {
    let output = generate_ok("for (1, 5) { print(2); }");
    assert!(output.contains("%start0 =w copy %s1"));
    assert!(output.contains("%end0 =w copy %s2"));
    assert!(output.contains("%lr0 =w sub %end0, %start0"));
    assert!(output.contains("%lr0 =w sub %lr0, 1"));
    assert!(output.contains("jnz %lr0, @loop0, @end0"));
}

#[test]
fn sibling_loops_get_distinct_labels() {
    let output = generate_ok("for { print(1); } for { print(2); }");
    let loop_labels: Vec<&str> = output
        .lines()
        .filter(|l| l.starts_with("@loop"))
        .collect();
    assert_eq!(loop_labels.len(), 2);
    assert_ne!(loop_labels[0], loop_labels[1]);
}

#[test]
fn sibling_ifs_get_distinct_labels() {
    let output = generate_ok("let x: int = 1; if (x) { print(1); } if (x) { print(2); }");
    let end_labels: Vec<&str> = output
        .lines()
        .filter(|l| l.starts_with("@ifend"))
        .collect();
    assert_eq!(end_labels.len(), 2);
    assert_ne!(end_labels[0], end_labels[1]);
}

#[test]
fn undeclared_call_initializer_skips_the_whole_let() {
    let (output, diagnostics) = generate("let x: int = foo();");
    assert_eq!(count_code(&diagnostics, "E0201"), 1);
    // 初始化表达式没有产生值，变量的 copy 也被跳过
    assert!(!output.contains("call"));
    assert!(!output.contains("%x ="));
}

#[test]
fn void_call_initializer_skips_the_copy() {
    let output = generate_ok("func v() { print(1); } let x: int = v();");
    // 调用本身照常产出，但没有结果可以绑定
    assert!(output.contains("\ncall $v()\n"));
    assert!(!output.contains("%x ="));
}

#[test]
fn arithmetic_over_a_missing_operand_is_skipped() {
    let (output, diagnostics) = generate("let y: int = foo() + 1;");
    assert_eq!(count_code(&diagnostics, "E0201"), 1);
    assert!(output.contains("copy 1"));
    assert!(!output.contains("add"));
    assert!(!output.contains("%y ="));
}

#[test]
fn assignment_used_as_a_value_is_discarded() {
    let output = generate_ok("let x: int = 0; print(x = 2);");
    // 赋值照常执行，但它不产生值，print 没有可打印的操作数
    assert!(output.contains("%x =w copy %s1"));
    assert!(!output.contains("$printf"));
}

#[test]
fn inner_block_scope_is_independent() {
    // 块作用域独立：内层的 let 不与外层冲突
    let output = generate_ok("let x: int = 1; if (x) { let x: int = 2; print(x); }");
    assert!(output.contains("copy 2"));
}
