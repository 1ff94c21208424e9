//! The Gorb compiler driver: runs every stage and writes the artifacts.

use gorb_cil::CilAssembly;
use gorb_parser::lexer::{Keywords, LexTables, Lexer};
use gorb_parser::parser::Parser;
use gorb_passes::{Analyzer, FunctionTable};
use gorb_postfix::PostfixProgram;
use gorb_source::{CompileError, CompileResult};
use log::{debug, info};
use snafu::{ResultExt, Snafu};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Snafu)]
pub enum DriverError {
    #[snafu(display("could not write {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("{source}"))]
    Compile { source: CompileError },
}

/// Settings of one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Assembly name and prefix of every output file.
    pub module: String,
    pub out_dir: PathBuf,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            module: "main".to_string(),
            out_dir: PathBuf::from("."),
        }
    }
}

/// Everything produced by a successful compilation.
#[derive(Debug)]
pub struct Artifacts {
    pub tables: LexTables,
    pub functions: FunctionTable,
    pub cil: CilAssembly,
    pub postfix: PostfixProgram,
}

impl Artifacts {
    /// Writes `<module>.il` and one `.postfix` file per module into `dir`.
    /// Returns the written paths.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, DriverError> {
        let mut written = Vec::new();

        let path = dir.join(format!("{}.il", self.cil.module));
        write_file(&path, &self.cil)?;
        written.push(path);

        for module in &self.postfix.modules {
            let path = dir.join(format!("{}.postfix", module.name));
            write_file(&path, module)?;
            written.push(path);
        }

        info!("wrote {} files to {}", written.len(), dir.display());
        Ok(written)
    }
}

fn write_file(path: &Path, contents: &impl std::fmt::Display) -> Result<(), DriverError> {
    let file = File::create(path).context(IoSnafu { path })?;
    let mut writer = BufWriter::new(file);
    write!(writer, "{}", contents).context(IoSnafu { path })?;
    writer.flush().context(IoSnafu { path })
}

/// Runs the whole pipeline over `source`. Nothing is written.
pub fn compile(source: &str, module: &str) -> CompileResult<Artifacts> {
    let keywords = Keywords::default();
    let mut lexer = Lexer::new(source, &keywords);
    let tokens = lexer.tokenize()?;
    debug!("lexed {} tokens", tokens.len());
    let tables = lexer.into_tables();

    let program = Parser::new(tokens).parse_program()?;
    debug!("parsed {} top level statements", program.len());

    let mut analyzer = Analyzer::new();
    analyzer.analyze_program(&program)?;
    let functions = analyzer.into_function_table();
    debug!("analysis done, {} functions", functions.len());

    let cil = gorb_cil::generate(module, &program, &functions)?;
    let postfix = gorb_postfix::generate(module, &program, &functions)?;

    Ok(Artifacts {
        tables,
        functions,
        cil,
        postfix,
    })
}

/// Compiles `source` and writes the artifacts as configured by `options`.
pub fn compile_to_files(source: &str, options: &CompileOptions) -> Result<Vec<PathBuf>, DriverError> {
    let artifacts = compile(source, &options.module).context(CompileSnafu)?;
    artifacts.write_to(&options.out_dir)
}
