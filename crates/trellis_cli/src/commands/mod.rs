//! CLI command definitions.

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod compile;
pub mod render;

/// Trellis - template-to-render compiler
#[derive(Parser)]
#[command(name = "trellis")]
#[command(version, about = "Trellis - template-to-render compiler")]
#[command(long_about = r#"
Trellis compiles text templates with embedded {{…}} directives into
render programs that produce a node tree plus a map of named exports.

COMMANDS:
  compile  → Compile template files and print typedef docs and the
             render program (or the serialized artifact with --json)
  render   → Render a template file with optional JSON input data

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Compile error
  4 - Render error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile templates and print their artifacts
    Compile(compile::CompileArgs),

    /// Render a template with input data
    Render(render::RenderArgs),
}

/// Derive a template's registered name from its file path.
pub(crate) fn template_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("cannot derive template name from {:?}", path))
}
