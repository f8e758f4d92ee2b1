//! Batch extraction command for multiple citation documents.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use citex_core::pipeline::PipelineOutcome;
use citex_core::validate::ValidationMode;
use citex_core::{FieldKey, VerdictStatus};

use super::extract::{
    build_pipeline, field_value_string, format_outcome_csv, format_outcome_text, load_config,
    load_document, status_str, OutputFormat,
};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Jurisdiction whose field mapping to apply
    #[arg(short, long)]
    jurisdiction: Option<String>,

    /// Escalate format, range and cross-field violations to errors
    #[arg(long)]
    strict: bool,

    /// Custom field mapping file (replaces the built-in registry)
    #[arg(short, long)]
    mappings: Option<PathBuf>,

    /// Output directory for per-file results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Stop at the first document that fails
    #[arg(long)]
    fail_fast: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    outcome: Option<PipelineOutcome>,
    error: Option<String>,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let pipeline = build_pipeline(&config, args.mappings.as_deref())?;
    let jurisdiction = args
        .jurisdiction
        .as_deref()
        .unwrap_or(&config.jurisdiction);
    let mode = if args.strict {
        ValidationMode::Strict
    } else {
        config.mode
    };

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "json" | "txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} documents to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let result = load_document(&path)
            .and_then(|doc| pipeline.run(&doc, jurisdiction, mode).map_err(Into::into));

        match result {
            Ok(outcome) => {
                results.push(FileResult {
                    path,
                    outcome: Some(outcome),
                    error: None,
                });
            }
            Err(e) => {
                if args.fail_fast {
                    pb.abandon();
                    anyhow::bail!("failed to process {}: {e}", path.display());
                }
                warn!("Failed to process {}: {e}", path.display());
                results.push(FileResult {
                    path,
                    outcome: None,
                    error: Some(e.to_string()),
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Complete");

    if let Some(ref output_dir) = args.output_dir {
        for result in &results {
            let Some(outcome) = &result.outcome else {
                continue;
            };
            let stem = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("citation");
            let extension = match args.format {
                OutputFormat::Json => "json",
                OutputFormat::Csv => "csv",
                OutputFormat::Text => "txt",
            };
            let output_path = output_dir.join(format!("{stem}.{extension}"));

            let content = match args.format {
                OutputFormat::Json => serde_json::to_string_pretty(outcome)?,
                OutputFormat::Csv => format_outcome_csv(outcome)?,
                OutputFormat::Text => format_outcome_text(outcome),
            };
            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let accepted = count_status(&results, VerdictStatus::Accepted);
    let with_warnings = count_status(&results, VerdictStatus::AcceptedWithWarnings);
    let rejected = count_status(&results, VerdictStatus::Rejected);
    let failed = results.iter().filter(|r| r.error.is_some()).count();

    println!();
    println!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} accepted, {} with warnings, {} rejected, {} failed",
        style(accepted).green(),
        style(with_warnings).yellow(),
        style(rejected).red(),
        style(failed).red()
    );

    if failed > 0 {
        println!();
        println!("{}", style("Failed documents:").red());
        for result in results.iter().filter(|r| r.error.is_some()) {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn count_status(results: &[FileResult], status: VerdictStatus) -> usize {
    results
        .iter()
        .filter(|r| {
            r.outcome
                .as_ref()
                .is_some_and(|o| o.verdict.status == status)
        })
        .count()
}

fn write_summary(path: &PathBuf, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "strategy",
        "fine_number",
        "license_plate",
        "violation_date",
        "amount",
        "errors",
        "warnings",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(outcome) = &result.outcome {
            let field = |key| {
                outcome
                    .record
                    .get(key)
                    .map(field_value_string)
                    .unwrap_or_default()
            };
            wtr.write_record([
                filename,
                status_str(outcome.verdict.status),
                outcome.strategy.as_str(),
                &field(FieldKey::FineNumber),
                &field(FieldKey::LicensePlate),
                &field(FieldKey::ViolationDate),
                &field(FieldKey::Amount),
                &outcome.verdict.errors.len().to_string(),
                &outcome.verdict.warnings.len().to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "failed",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
