//! The `drape analyze` command for local image files.

use clap::{Args, ValueEnum};
use drape_core::{AnalysisRecord, Analyzer, Config, OutputFormat as CoreOutputFormat, ReportWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image files to analyze
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the analyze command.
///
/// Each file is staged as a private copy so the analyzer can remove it
/// afterwards without touching the original.
pub async fn execute(args: AnalyzeArgs, config: Config) -> anyhow::Result<()> {
    let analyzer = Analyzer::from_config(&config);
    if !analyzer.is_configured() {
        tracing::warn!("Provider credentials are incomplete; analysis will fail");
    }

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = ReportWriter::new(sink, args.format.into(), args.pretty);

    for file in &args.files {
        let record = analyze_file(&analyzer, file).await;
        writer.push(record)?;
    }

    let (total, failed) = (writer.records_written(), writer.records_failed());
    writer.finish()?;

    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {total} file(s) failed");
    }
    tracing::info!("Analyzed {total} file(s)");
    Ok(())
}

async fn analyze_file(analyzer: &Analyzer, file: &Path) -> AnalysisRecord {
    let bytes = match tokio::fs::read(file).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to read {:?}: {e}", file);
            return AnalysisRecord::failed(file, format!("Failed to read file: {e}"));
        }
    };

    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image");

    let upload = match analyzer.store().stage(file_name, None, &bytes).await {
        Ok(upload) => upload,
        Err(e) => {
            tracing::error!("Failed to stage {:?}: {e}", file);
            return AnalysisRecord::failed(file, format!("Failed to stage file: {e}"));
        }
    };

    AnalysisRecord::new(file, analyzer.analyze(upload).await)
}
