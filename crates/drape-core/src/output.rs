//! Report output for batch analysis.
//!
//! One [`AnalysisRecord`] per input file, written as a JSON array or as
//! JSON Lines.

use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AnalyzeError;
use crate::types::AnalysisResult;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A single JSON array of records
    Json,
    /// One record per line
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Outcome of analyzing one local file.
#[derive(Debug, Serialize)]
pub struct AnalysisRecord {
    pub file: PathBuf,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecordOutcome {
    Analyzed(AnalysisResult),
    Failed { error: String },
}

impl AnalysisRecord {
    pub fn new(file: &Path, result: Result<AnalysisResult, AnalyzeError>) -> Self {
        let outcome = match result {
            Ok(result) => RecordOutcome::Analyzed(result),
            Err(e) => RecordOutcome::Failed {
                error: e.to_string(),
            },
        };
        Self {
            file: file.to_path_buf(),
            outcome,
        }
    }

    /// A file that never reached the analyzer (unreadable, not staged).
    pub fn failed(file: &Path, error: impl Into<String>) -> Self {
        Self {
            file: file.to_path_buf(),
            outcome: RecordOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Analyzed(_))
    }
}

/// Streams records to a writer.
///
/// JSON Lines records are written as they arrive. JSON records are buffered
/// and written as one array by [`ReportWriter::finish`].
pub struct ReportWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    pending: Vec<AnalysisRecord>,
    written: usize,
    failed: usize,
}

impl<W: Write> ReportWriter<W> {
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
            written: 0,
            failed: 0,
        }
    }

    pub fn push(&mut self, record: AnalysisRecord) -> io::Result<()> {
        if !record.is_success() {
            self.failed += 1;
        }
        self.written += 1;

        match self.format {
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, &record).map_err(io::Error::other)?;
                writeln!(self.writer)?;
                self.writer.flush()
            }
            OutputFormat::Json => {
                self.pending.push(record);
                Ok(())
            }
        }
    }

    /// Write any buffered records and return the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json {
            if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, &self.pending)
                    .map_err(io::Error::other)?;
            } else {
                serde_json::to_writer(&mut self.writer, &self.pending).map_err(io::Error::other)?;
            }
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    pub fn records_written(&self) -> usize {
        self.written
    }

    pub fn records_failed(&self) -> usize {
        self.failed
    }
}
