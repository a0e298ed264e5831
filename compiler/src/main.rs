//! tacc command-line entry point.
//!
//! Usage:
//!   tacc lex     "<source>"   (tokens, aliases, transformed echo)
//!   tacc parse   "<source>"   (dump AST)
//!   tacc tree    "<source>"   (labeled tree)
//!   tacc tac     "<source>"   (three-address code)
//!   tacc compile "<source>"   (every stage)
//!
//! The source may also come from `--file` or stdin. Set `RUST_LOG` (or pass
//! `-v`) to see what each stage is doing.

use std::fs;
use std::io::{self, Read};
use std::process;

use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use log::{debug, error};
use miette::Report;
use serde_json::{json, Value};

use tacc_compiler::errors::CompileError;
use tacc_compiler::lexer::{tokenize, Lexed};
use tacc_compiler::validate::validate_input;
use tacc_compiler::{compile, compile_unchecked, Compilation};

const EXIT_DATA_ERROR: i32 = 65;
const EXIT_IO_ERROR: i32 = 74;

#[derive(ClapParser, Debug)]
#[command(version, about = "Compile an expression into three-address code", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = Format::Text)]
    format: Format,

    /// Skip the input checks that run before the lexer
    #[arg(long, global = true)]
    skip_validation: bool,

    /// Log stage summaries (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Lex,
    Parse,
    Tree,
    Tac,
    Compile,
}

#[derive(clap::Args, Debug)]
struct Input {
    /// Source text; read from --file or stdin when omitted
    source: Option<String>,

    /// Read the source from a file
    #[arg(short, long, conflicts_with = "source")]
    file: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump tokens, alias map and transformed expression
    Lex(Input),
    /// Dump the syntax tree
    Parse(Input),
    /// Draw the labeled tree
    Tree(Input),
    /// Print three-address code
    Tac(Input),
    /// Print every stage
    Compile(Input),
}

impl Command {
    fn split(&self) -> (Stage, &Input) {
        match self {
            Command::Lex(input) => (Stage::Lex, input),
            Command::Parse(input) => (Stage::Parse, input),
            Command::Tree(input) => (Stage::Tree, input),
            Command::Tac(input) => (Stage::Tac, input),
            Command::Compile(input) => (Stage::Compile, input),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let (stage, input) = args.command.split();
    let source = match read_source(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(EXIT_IO_ERROR);
        }
    };
    debug!("running {stage:?} on {} bytes", source.len());

    if let Err(err) = run(stage, &source, &args) {
        error!("{} failed", err.stage());
        if let CompileError::Parse(parse_err) = &err {
            if let Some(token) = parse_err.token() {
                debug!("offending token: {token}");
            }
        }
        report(err, source);
        process::exit(EXIT_DATA_ERROR);
    }
}

/// Run as many stages as `stage` needs and print the result.
fn run(stage: Stage, source: &str, args: &Args) -> Result<(), CompileError> {
    if stage == Stage::Lex {
        if !args.skip_validation {
            validate_input(source)?;
        }
        let lexed = tokenize(source)?;
        match args.format {
            Format::Text => print_lexed(&lexed),
            Format::Json => print_json(&json!(lexed)),
        }
        return Ok(());
    }

    let out = if args.skip_validation {
        compile_unchecked(source)?
    } else {
        compile(source)?
    };
    match args.format {
        Format::Text => print_text(stage, &out),
        Format::Json => print_json(&compilation_json(stage, &out)),
    }
    Ok(())
}

fn read_source(input: &Input) -> io::Result<String> {
    if let Some(source) = &input.source {
        return Ok(source.clone());
    }
    if let Some(path) = &input.file {
        return fs::read_to_string(path);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn report(err: CompileError, source: String) {
    let report = Report::new(err).with_source_code(source);
    eprintln!("{report:?}");
}

fn print_lexed(lexed: &Lexed) {
    println!("Tokens:");
    for token in &lexed.tokens {
        println!("  {token}");
    }
    println!("Aliases:");
    for (name, alias) in &lexed.aliases {
        println!("  {name} -> {alias}");
    }
    println!("Transformed: {}", lexed.transformed);
}

fn print_text(stage: Stage, out: &Compilation) {
    let all = stage == Stage::Compile;
    if all {
        print_lexed(&out.lexed);
    }
    if stage == Stage::Parse {
        println!("{:#?}", out.ast);
    }
    if all || stage == Stage::Tree {
        print!("{}", out.tree.render());
    }
    if all || stage == Stage::Tac {
        println!("{}", out.tac.render());
    }
}

fn compilation_json(stage: Stage, out: &Compilation) -> Value {
    match stage {
        Stage::Parse | Stage::Tree => json!(out.tree),
        Stage::Tac => json!(out.tac.lines()),
        _ => json!({
            "tokens": out.lexed.tokens,
            "transformed": out.lexed.transformed,
            "aliases": out.lexed.aliases,
            "ast": out.tree,
            "tac": out.tac.lines(),
        }),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error serializing output: {e}");
            process::exit(EXIT_IO_ERROR);
        }
    }
}
