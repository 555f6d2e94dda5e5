use clap::Parser;
use della::diagnostics::DiagnosticBag;
use std::path::PathBuf;
use std::process;

/// Della 编译器：把 `.della` 源文件编译为 QBE 风格的 `.ssa` IR。
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// 要编译的源文件
    input_file: PathBuf,

    /// 输出文件路径，默认取输入文件名并换成 `.ssa` 后缀
    #[arg(short, long)]
    output_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let source = match std::fs::read_to_string(&cli.input_file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read `{}`: {}", cli.input_file.display(), err);
            process::exit(1);
        }
    };

    let output_path = cli
        .output_file
        .unwrap_or_else(|| cli.input_file.with_extension("ssa"));

    let file_name = cli.input_file.display().to_string();
    let mut diagnostics = DiagnosticBag::new(&source);

    let Some(output) = della::compile(&source, &mut diagnostics) else {
        // 语法错误：打印诊断后放弃，不产出文件
        diagnostics.print(&file_name);
        process::exit(1);
    };

    // 语义错误可恢复：输出带洞但仍然写盘，诊断照常打印
    let had_errors = diagnostics.has_errors();
    diagnostics.print(&file_name);

    if let Err(err) = std::fs::write(&output_path, output) {
        eprintln!("error: cannot write `{}`: {}", output_path.display(), err);
        process::exit(1);
    }

    if had_errors {
        process::exit(1);
    }
}
