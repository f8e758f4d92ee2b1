//! Listing of configured jurisdictions.

use std::path::PathBuf;

use clap::Args;
use console::style;

use citex_core::FieldMappingRegistry;

/// Arguments for the jurisdictions command.
#[derive(Args)]
pub struct JurisdictionsArgs {
    /// Custom field mapping file (replaces the built-in registry)
    #[arg(short, long)]
    mappings: Option<PathBuf>,
}

pub fn run(args: JurisdictionsArgs) -> anyhow::Result<()> {
    let registry = match &args.mappings {
        Some(path) => FieldMappingRegistry::from_file(path)?,
        None => FieldMappingRegistry::builtin(),
    };

    println!("{} Configured jurisdictions:", style("ℹ").blue());
    for jurisdiction in registry.list_jurisdictions() {
        let mapping = registry.get_mapping(&jurisdiction)?;
        println!("  {} ({} labels)", style(&jurisdiction).bold(), mapping.len());
    }
    Ok(())
}
