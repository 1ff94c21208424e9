use clap::Parser;
use console::style;
use gorb::{compile, CompileOptions};
use gorb_source::{CompileError, Source};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

/// Compiles a Gorb program to CIL and postfix machine code.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source file to compile. Reads stdin when missing or `-`.
    input: Option<PathBuf>,
    /// Compile this text instead of a file.
    #[arg(short, long, conflicts_with = "input")]
    source: Option<String>,
    /// Assembly name and prefix of the output files.
    #[arg(short, long, default_value = "main")]
    module: String,
    /// Directory the artifacts are written to.
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// Print the symbol, identifier and constant tables of the lexer.
    #[arg(long)]
    dump_tables: bool,
}

impl Args {
    fn read_source(&self) -> io::Result<String> {
        if let Some(source) = &self.source {
            return Ok(source.clone());
        }
        match &self.input {
            Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path),
            _ => {
                let mut source = String::new();
                io::stdin().read_to_string(&mut source)?;
                Ok(source)
            }
        }
    }

    fn options(&self) -> CompileOptions {
        CompileOptions {
            module: self.module.clone(),
            out_dir: self.out_dir.clone(),
        }
    }
}

fn report(err: &CompileError, source: &Source) {
    eprintln!(
        "{} {}",
        style(format!("{} error:", err.stage())).red().bold(),
        err
    );
    if let Some(text) = source.line_text(err.line()) {
        eprintln!("{} {}", style(format!("{:>4} |", err.line())).black().bright(), text);
    }
}

fn run(args: &Args) -> Result<(), ()> {
    let content = args.read_source().map_err(|err| {
        eprintln!("{} {}", style("error:").red().bold(), err);
    })?;
    let options = args.options();

    let artifacts = compile(&content, &options.module).map_err(|err| {
        report(&err, &Source::new(&content));
    })?;

    if args.dump_tables {
        println!("{}", artifacts.tables);
    }

    match artifacts.write_to(&options.out_dir) {
        Ok(paths) => {
            for path in paths {
                eprintln!("{} {}", style("wrote").green(), path.display());
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{} {}", style("error:").red().bold(), err);
            Err(())
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if run(&args).is_err() {
        process::exit(1);
    }
}
