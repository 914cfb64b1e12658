//! Compile command - Compile templates and print their artifacts.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use trellis_engine::{Engine, TemplateArtifact};

use crate::commands::template_name;

#[derive(Args)]
pub struct CompileArgs {
    /// Template files to compile
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Emit each serialized artifact as JSON instead of a report
    #[arg(long)]
    json: bool,
}

pub fn execute(args: CompileArgs) -> Result<()> {
    let mut engine = Engine::new();

    for path in &args.files {
        let name = template_name(path)?;
        let body =
            fs::read_to_string(path).with_context(|| format!("reading template {:?}", path))?;
        info!("Compiling template: {}", name);

        let artifact = engine.compile(&name, &body)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&artifact)?);
        } else {
            print_report(&artifact);
        }
    }
    Ok(())
}

fn print_report(artifact: &TemplateArtifact) {
    println!("template {}", artifact.name);
    if artifact.takes_data {
        println!("  signature: (data, options) -> exports");
    } else {
        println!("  signature: (options) -> exports");
    }
    if let Some(input) = &artifact.input_typedef {
        println!("  input: {}", indent_continuation(input));
    }
    println!("  output: {}", indent_continuation(&artifact.output_typedef));
    println!("  exports: {}", artifact.dispatch.names().join(", "));
    println!("  program:");
    for line in artifact.listing().lines() {
        println!("    {line}");
    }
    println!();
}

fn indent_continuation(text: &str) -> String {
    text.replace('\n', "\n  ")
}
