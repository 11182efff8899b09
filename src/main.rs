//! recsql command line entry point.
//!
//! Reads one source unit from a file (or stdin) and prints the generated SQL,
//! the AST, or the token stream.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use recsql::sql::parser::lexer::Lexer;
use recsql::{Compiler, Error, Result};
use tracing::info;

/// What to print for the compiled unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    Tokens,
    Ast,
    Sql,
}

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "recsql")]
#[command(about = "Compile record definitions and create statements into SQL")]
struct Args {
    /// Source file; stdin when absent
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output kind
    #[arg(long, value_enum, default_value_t = Emit::Sql)]
    emit: Emit,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(args.verbose);

    if let Err(err) = run(&args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let source = match &args.input {
        Some(path) => {
            info!(path = %path.display(), "reading source");
            std::fs::read_to_string(path)?
        }
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            source
        }
    };

    let mut compiler = Compiler::new();
    let output = match args.emit {
        Emit::Tokens => {
            for item in Lexer::new(&source) {
                match item {
                    Ok(token) => println!("{}:{}\t{:?}", token.line, token.column, token.kind),
                    Err(err) => report(&err),
                }
            }
            return Ok(());
        }
        Emit::Ast => compiler
            .parse(&source)
            .and_then(|stmt| Ok(serde_json::to_string_pretty(&stmt)?)),
        Emit::Sql => compiler.compile(&source),
    };
    for diagnostic in compiler.diagnostics() {
        report(diagnostic);
    }
    println!("{}", output?);
    Ok(())
}

fn report(err: &Error) {
    eprintln!("{}", err);
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
