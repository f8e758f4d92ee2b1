//! Extraction command for a single citation document.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use console::style;
use tracing::debug;

use citex_core::models::config::CitexConfig;
use citex_core::models::Document;
use citex_core::pipeline::{CitationPipeline, PipelineOutcome};
use citex_core::validate::ValidationMode;
use citex_core::{CitexError, FieldKey, FieldMappingRegistry, VerdictStatus};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input document (.json for decoded documents, anything else is read
    /// as plain text)
    input: PathBuf,

    /// Jurisdiction whose field mapping to apply
    #[arg(short, long)]
    jurisdiction: Option<String>,

    /// Escalate format, range and cross-field violations to errors
    #[arg(long)]
    strict: bool,

    /// Custom field mapping file (replaces the built-in registry)
    #[arg(short, long)]
    mappings: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    Text,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
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

    let document = load_document(&args.input)?;
    let outcome = match pipeline.run(&document, jurisdiction, mode) {
        Ok(outcome) => outcome,
        Err(CitexError::Extraction(failure)) => {
            eprintln!(
                "{} No strategy extracted a usable record from {}",
                style("✗").red(),
                args.input.display()
            );
            eprintln!(
                "  strategies tried: {}",
                failure
                    .tried
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            if let Some(partial) = &failure.partial {
                eprintln!("  partial fields:");
                for (key, capture) in partial.iter() {
                    eprintln!("    {key}: {}", capture.value);
                }
            }
            anyhow::bail!("extraction failed for {}", args.input.display());
        }
        Err(e) => return Err(e.into()),
    };

    let content = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&outcome)?,
        OutputFormat::Csv => format_outcome_csv(&outcome)?,
        OutputFormat::Text => format_outcome_text(&outcome),
    };

    match &args.output {
        Some(path) => {
            fs::write(path, content)?;
            debug!("Wrote output to {}", path.display());
        }
        None => println!("{content}"),
    }

    if outcome.verdict.is_rejected() {
        anyhow::bail!("record rejected by validation");
    }
    Ok(())
}

/// Load the effective pipeline configuration.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<CitexConfig> {
    Ok(match config_path {
        Some(path) => CitexConfig::from_file(Path::new(path))?,
        None => CitexConfig::default(),
    })
}

/// Build a pipeline from configuration and an optional mapping override.
pub fn build_pipeline(
    config: &CitexConfig,
    mappings: Option<&Path>,
) -> anyhow::Result<CitationPipeline> {
    let mut pipeline = CitationPipeline::from_config(config);
    if let Some(path) = mappings {
        let registry = FieldMappingRegistry::from_file(path)?;
        pipeline = pipeline.with_registry(std::sync::Arc::new(registry));
    }
    Ok(pipeline)
}

/// Read a document from disk. JSON files are decoded documents with pages
/// and tables; anything else is plain text, with form feeds as page breaks.
pub fn load_document(path: &Path) -> anyhow::Result<Document> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let content = fs::read_to_string(path)?;
    let document = if is_json {
        serde_json::from_str(&content)?
    } else if content.contains('\x0c') {
        Document::from_pages(content.split('\x0c').map(str::to_string).collect())
    } else {
        Document::from_text(content)
    };

    if document.is_blank() {
        anyhow::bail!("document {} contains no text", path.display());
    }
    Ok(document)
}

pub fn format_outcome_csv(outcome: &PipelineOutcome) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["jurisdiction", "strategy", "status"];
    header.extend(FieldKey::ALL.iter().map(|k| k.as_str()));
    wtr.write_record(&header)?;

    let mut row = vec![
        outcome.jurisdiction.clone(),
        outcome.strategy.as_str().to_string(),
        status_str(outcome.verdict.status).to_string(),
    ];
    for key in FieldKey::ALL {
        row.push(
            outcome
                .record
                .get(key)
                .map(field_value_string)
                .unwrap_or_default(),
        );
    }
    wtr.write_record(&row)?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

pub fn format_outcome_text(outcome: &PipelineOutcome) -> String {
    let mut output = String::new();

    let status = match outcome.verdict.status {
        VerdictStatus::Accepted => style("accepted").green(),
        VerdictStatus::AcceptedWithWarnings => style("accepted with warnings").yellow(),
        VerdictStatus::Rejected => style("rejected").red(),
    };
    output.push_str(&format!(
        "Status: {status} (jurisdiction {}, strategy {})\n\n",
        outcome.jurisdiction, outcome.strategy
    ));

    output.push_str("Fields:\n");
    for (key, value) in outcome.record.iter() {
        output.push_str(&format!("  {key}: {}\n", field_value_string(value)));
    }

    if !outcome.verdict.errors.is_empty() {
        output.push_str("\nErrors:\n");
        for finding in &outcome.verdict.errors {
            output.push_str(&format!("  [{}] {}\n", finding.rule, finding.message));
        }
    }
    if !outcome.verdict.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for finding in &outcome.verdict.warnings {
            output.push_str(&format!("  [{}] {}\n", finding.rule, finding.message));
        }
    }

    output
}

pub fn status_str(status: VerdictStatus) -> &'static str {
    match status {
        VerdictStatus::Accepted => "accepted",
        VerdictStatus::AcceptedWithWarnings => "accepted_with_warnings",
        VerdictStatus::Rejected => "rejected",
    }
}

pub fn field_value_string(value: &citex_core::models::FieldValue) -> String {
    use citex_core::models::FieldValue;
    match value {
        FieldValue::Date(d) => d.to_string(),
        FieldValue::Amount(a) => a.to_string(),
        FieldValue::Text(s) => s.clone(),
    }
}
