//! Render command - Render a template with input data.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tracing::info;

use trellis_runtime::{Namespace, RenderOptions, TemplateLoader};

use crate::commands::template_name;

#[derive(Args)]
pub struct RenderArgs {
    /// Template file to render
    file: PathBuf,

    /// JSON file with input data
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Directory of partial templates to register first
    #[arg(short, long)]
    templates: Option<PathBuf>,
}

pub fn execute(args: RenderArgs) -> Result<()> {
    let mut namespace = Namespace::new();

    if let Some(dir) = &args.templates {
        let registered = TemplateLoader::new(dir).load_all(&mut namespace)?;
        info!("Registered {} template(s) from {:?}", registered, dir);
    }

    let name = template_name(&args.file)?;
    let body = fs::read_to_string(&args.file)
        .with_context(|| format!("reading template {:?}", args.file))?;
    namespace.register(&name, &body)?;

    let data: Option<Value> = match &args.data {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading data file {:?}", path))?;
            Some(serde_json::from_str(&text).with_context(|| format!("parsing {:?}", path))?)
        }
        None => None,
    };

    let result = namespace.render(&name, data.as_ref(), &RenderOptions::new())?;
    println!("{}", result.html());

    for key in result.exports.names() {
        if key != "root" {
            println!("export: {key}");
        }
    }
    Ok(())
}
