use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tsenv_checker::ModuleResolution;
use tsenv_lexer::{Lexer, TokenKind};
use tsenv_serializer::{read_document, to_json};

use tsenv_driver::{compiler_options, logging, print_diagnostics, read_environment, report, root_files};
use tsenv_driver::{DiagnosticStyle, OptionOverrides, Profile, LIB_DIR_VAR};

#[derive(Parser)]
#[command(
    name = "tsenv",
    version = "0.1.0",
    about = "Produces JSON for an environment described by TypeScript declaration files"
)]
struct Cli {
    /// Log at debug level unless TSENV_LOG or RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize the type environment of a set of declaration files
    Read(ReadArgs),

    /// Check a serialized environment for dangling references
    Verify {
        /// JSON document written by `tsenv read`
        input: PathBuf,
    },

    /// Lex a file and show tokens (debug)
    Lex {
        input: PathBuf,

        /// Show token positions
        #[arg(short, long)]
        positions: bool,
    },

    /// Parse a file and show the syntax tree (debug)
    Parse { input: PathBuf },
}

#[derive(Args)]
struct ReadArgs {
    /// Declaration files, read after the profile's library files
    files: Vec<PathBuf>,

    /// Standard-library profile to read
    #[arg(long = "env", value_enum)]
    profile: Option<Profile>,

    /// Directory containing the standard library files
    #[arg(long)]
    lib_dir: Option<PathBuf>,

    /// JSON configuration file (bare options or tsconfig-style)
    #[arg(long)]
    config: Option<PathBuf>,

    /// The file to output to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// How checker diagnostics are printed
    #[arg(long, value_enum, default_value_t = DiagnosticStyle::Rich)]
    diagnostics: DiagnosticStyle,

    #[arg(long)]
    module_resolution: Option<ModuleResolution>,

    #[arg(long)]
    strict_null_checks: bool,

    #[arg(long)]
    no_implicit_any: bool,

    #[arg(long)]
    no_implicit_returns: bool,

    #[arg(long)]
    no_implicit_this: bool,

    /// Do not load lib.d.ts from the library directory
    #[arg(long)]
    no_lib: bool,

    #[arg(long)]
    allow_js: bool,

    #[arg(long)]
    skip_js_checking: bool,
}

impl ReadArgs {
    fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            lib_dir: self.lib_dir.clone(),
            module_resolution: self.module_resolution,
            strict_null_checks: self.strict_null_checks,
            no_implicit_any: self.no_implicit_any,
            no_implicit_returns: self.no_implicit_returns,
            no_implicit_this: self.no_implicit_this,
            no_lib: self.no_lib,
            allow_js: self.allow_js,
            skip_js_checking: self.skip_js_checking,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Read(args) => read_command(args),
        Commands::Verify { input } => verify_command(&input),
        Commands::Lex { input, positions } => lex_command(&input, positions),
        Commands::Parse { input } => parse_command(&input),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn read_command(args: ReadArgs) -> Result<ExitCode> {
    let env_lib_dir = std::env::var_os(LIB_DIR_VAR).map(PathBuf::from);
    let mut options = compiler_options(args.config.as_deref(), &args.overrides(), env_lib_dir)?;
    let roots = root_files(args.profile, &args.files, &mut options)?;

    let env = read_environment(&roots, options)?;
    print_diagnostics(&env.program, &env.diagnostics, args.diagnostics)?;

    let json = to_json(&env.document, args.pretty)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!("Output written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(ExitCode::SUCCESS)
}

fn verify_command(input: &Path) -> Result<ExitCode> {
    let text = read_source_file(input)?;
    let document = read_document(&text).with_context(|| format!("failed to read {}", input.display()))?;
    document.validate()?;

    println!("{} records", document.data.len());
    for (kind, count) in document.kind_counts() {
        println!("  {:<16} {}", kind, count);
    }
    println!(
        "{} globals, {} types, {} ambient",
        document.globals.len(),
        document.types.len(),
        document.ambient.len()
    );
    Ok(ExitCode::SUCCESS)
}

fn lex_command(input: &Path, positions: bool) -> Result<ExitCode> {
    let source = read_source_file(input)?;
    let filename = input.to_string_lossy().to_string();

    let tokens = Lexer::new(&source).tokenize();

    println!("Tokens for {}:\n", filename);
    println!("{}", "=".repeat(80));

    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::Eof {
            println!("\n{:4} | {:?}", i, token.kind);
            break;
        }

        if positions {
            println!(
                "{:4} | {:20?} | {:?} | {}..{}",
                i, token.kind, token.value, token.span.start, token.span.end
            );
        } else {
            println!("{:4} | {:20?} | {:?}", i, token.kind, token.value);
        }
    }

    println!("{}", "=".repeat(80));
    println!("\nTotal tokens: {}", tokens.len());

    let errors: Vec<_> = tokens.iter().filter(|t| t.kind == TokenKind::Error).collect();
    if !errors.is_empty() {
        println!("\nLexer errors found: {}", errors.len());
        for token in errors {
            report::print_lex_error(&token.value, token.span.start, token.span.end, &filename, &source)?;
        }
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

fn parse_command(input: &Path) -> Result<ExitCode> {
    let source = read_source_file(input)?;
    let filename = input.to_string_lossy().to_string();

    let (file, errors) = tsenv_parser::parse_source(&source, 0);
    println!("{:#?}", file);
    if errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        report::print_parse_errors(&errors, &filename, &source)?;
        Ok(ExitCode::FAILURE)
    }
}

fn read_source_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
