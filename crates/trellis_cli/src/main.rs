//! Trellis CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments (reported by clap)
//! - 3: Compile error
//! - 4: Render error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trellis_engine::CompileError;
use trellis_runtime::RuntimeError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const COMPILE_ERROR: u8 = 3;
    pub const RENDER_ERROR: u8 = 4;
}

fn main() -> ExitCode {
    // Initialize logging; RUST_LOG overrides the default.
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile(args) => commands::compile::execute(args),
        Commands::Render(args) => commands::render::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if e.downcast_ref::<CompileError>().is_some() {
        return ExitCodes::COMPILE_ERROR;
    }
    if let Some(runtime) = e.downcast_ref::<RuntimeError>() {
        return match runtime {
            RuntimeError::Compile(_) => ExitCodes::COMPILE_ERROR,
            _ => ExitCodes::RENDER_ERROR,
        };
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("template name") || msg.contains("argument") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
