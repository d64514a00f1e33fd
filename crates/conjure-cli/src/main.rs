//! Conjure CLI
//!
//! Command-line compiler from Conjure YAML definitions to IR JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Compile a directory of definitions to stdout
//! conjure compile api/
//!
//! # Compile specific files to a file, without pretty-printing
//! conjure compile api/widgets.yml api/gadgets.yml --output ir.json --compact
//!
//! # Validate definitions without writing IR
//! conjure check api/
//! ```
//!
//! ## Exit Codes
//!
//! - 0: Success
//! - 1: Definitions failed to compile
//! - 2: Usage or I/O error

mod config;
mod loader;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

use conjure_core::{Assembler, ConjureError};

use crate::config::CompilerConfig;

/// Conjure: compile API definitions to the Conjure IR
#[derive(Parser)]
#[command(name = "conjure")]
#[command(version)]
#[command(about = "Compile Conjure YAML definitions to IR JSON", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./conjure.yml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log resolution and assembly progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile definitions into IR JSON
    Compile {
        /// Definition files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write compact rather than pretty-printed JSON
        #[arg(long)]
        compact: bool,
    },

    /// Compile definitions and report, without writing IR
    Check {
        /// Definition files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<ConjureError>() {
                Some(ConjureError::Io(_)) | None => ExitCode::from(2),
                Some(_) => ExitCode::from(1),
            }
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = CompilerConfig::load(cli.config.as_deref())?;
    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Compile {
            inputs,
            output,
            compact,
        } => compile_command(&config, &inputs, output, compact),
        Commands::Check { inputs } => check_command(&config, &inputs),
    }
}

fn compile_command(
    config: &CompilerConfig,
    inputs: &[PathBuf],
    output: Option<PathBuf>,
    compact: bool,
) -> Result<ExitCode> {
    let compilation = match compile_inputs(config, inputs)? {
        Ok(compilation) => compilation,
        Err(e) => return Ok(report_failure(&e)),
    };

    let definition = &compilation.definition;
    let json = if compact || !config.output.pretty {
        definition.to_json()?
    } else {
        definition.to_json_pretty()?
    };

    match output.or_else(|| config.output.path.clone()) {
        Some(path) => {
            write_output(&path, &json)?;
            eprintln!(
                "Wrote {} types, {} errors and {} services to {}",
                definition.types.len(),
                definition.errors.len(),
                definition.services.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(ExitCode::SUCCESS)
}

fn check_command(config: &CompilerConfig, inputs: &[PathBuf]) -> Result<ExitCode> {
    let compilation = match compile_inputs(config, inputs)? {
        Ok(compilation) => compilation,
        Err(e) => return Ok(report_failure(&e)),
    };

    let definition = &compilation.definition;
    println!("Definitions are valid");
    println!();
    println!("Types: {}", definition.types.len());
    println!("Errors: {}", definition.errors.len());
    println!("Services: {}", definition.services.len());
    println!(
        "Endpoints: {}",
        definition
            .services
            .iter()
            .map(|s| s.endpoints.len())
            .sum::<usize>()
    );
    if !compilation.defaults.is_empty() {
        println!();
        println!("Defaults:");
        for default in &compilation.defaults {
            println!("  - {}: {:?}", default.subject, default.value);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Load and compile `inputs`. The outer error is a usage or I/O problem, the
/// inner one a compile failure.
fn compile_inputs(
    config: &CompilerConfig,
    inputs: &[PathBuf],
) -> Result<Result<conjure_core::Compilation, ConjureError>> {
    let targets = loader::discover(inputs, &config.sources)?;
    if targets.is_empty() {
        anyhow::bail!("No definition files found in {:?}", inputs);
    }
    let sources = match loader::load(&targets, &config.sources) {
        Ok(sources) => sources,
        Err(e) => match e.downcast::<ConjureError>() {
            Ok(ConjureError::Io(io)) => return Err(io).context("Failed to read definitions"),
            Ok(compile_error) => return Ok(Err(compile_error)),
            Err(other) => return Err(other),
        },
    };
    Ok(Assembler::new(&sources).run())
}

fn report_failure(error: &ConjureError) -> ExitCode {
    eprintln!("Compilation failed: {}", error);
    if let Some(rule) = error.rule() {
        eprintln!("Rule: {}", rule);
    }
    ExitCode::from(1)
}

fn write_output(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    fs::write(path, json).with_context(|| format!("Failed to write IR to {:?}", path))
}
