//! # Batch Processing
//!
//! Drives many records through render and export against one shared layout.
//!
//! ## Flow
//!
//! ```text
//! records file ─→ load_records ─→ [SourceRow] ─→ process_records ─→ BatchReport
//!                 (CSV / JSON)      row n,          per row:          generated + failures
//!                                   Record or err   render → export
//! ```
//!
//! A bad row never stops the batch: its error is logged and kept in the
//! report. Only problems that would affect every row (an unreadable records
//! file, an output directory that cannot be created) abort the run.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde_json::Value;

use crate::error::{LabelError, Result};
use crate::export::{ExportedLabel, export_label};
use crate::layout::Layout;
use crate::record::Record;
use crate::render::render_label;

/// Row number of the first CSV record, counting the header as row 1.
pub const FIRST_DATA_ROW: usize = 2;

/// One input row and what became of parsing it.
#[derive(Debug)]
pub struct SourceRow {
    pub row: usize,
    pub record: Result<Record>,
}

impl SourceRow {
    /// Number already-built records as CSV data rows, from [`FIRST_DATA_ROW`].
    pub fn numbered(records: impl IntoIterator<Item = Record>) -> Vec<Self> {
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| Self {
                row: FIRST_DATA_ROW + i,
                record: Ok(record),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Render rows on the rayon thread pool
    pub parallel: bool,
}

/// A label that made it to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLabel {
    pub row: usize,
    pub identifier: String,
    pub files: ExportedLabel,
}

/// A row that produced no label.
#[derive(Debug)]
pub struct RowFailure {
    pub row: usize,
    pub identifier: Option<String>,
    pub error: LabelError,
}

/// Outcome of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub generated: Vec<GeneratedLabel>,
    pub failures: Vec<RowFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Generated {} label(s), {} row(s) failed",
            self.generated.len(),
            self.failures.len()
        )
    }
}

// ============================================================================
// PROCESSING
// ============================================================================

/// Render and export every row into `output_dir`, creating it if needed.
pub fn process_records(
    rows: Vec<SourceRow>,
    layout: &Layout,
    output_dir: &Path,
    options: &BatchOptions,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir)?;

    log::debug!(
        "Processing {} row(s) into {} ({})",
        rows.len(),
        output_dir.display(),
        if options.parallel { "parallel" } else { "sequential" }
    );

    let outcomes: Vec<std::result::Result<GeneratedLabel, RowFailure>> = if options.parallel {
        rows.into_par_iter()
            .map(|row| process_row(row, layout, output_dir))
            .collect()
    } else {
        rows.into_iter()
            .map(|row| process_row(row, layout, output_dir))
            .collect()
    };

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(label) => report.generated.push(label),
            Err(failure) => report.failures.push(failure),
        }
    }
    Ok(report)
}

fn process_row(
    source: SourceRow,
    layout: &Layout,
    output_dir: &Path,
) -> std::result::Result<GeneratedLabel, RowFailure> {
    let row = source.row;
    let record = match source.record {
        Ok(record) => record,
        Err(error) => {
            log::warn!("Skipping row {}: {}", row, error);
            return Err(RowFailure {
                row,
                identifier: None,
                error,
            });
        }
    };

    let identifier = record.identifier().unwrap_or("label").to_string();
    let base: PathBuf = output_dir.join(record.output_stem());

    match render_label(&record, layout).and_then(|label| export_label(&label, &base)) {
        Ok(files) => {
            log::info!("Generated {} and {}", file_name(&files.png), file_name(&files.pdf));
            Ok(GeneratedLabel {
                row,
                identifier,
                files,
            })
        }
        Err(error) => {
            log::error!("Row {} ({}): {}", row, identifier, error);
            Err(RowFailure {
                row,
                identifier: Some(identifier),
                error,
            })
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ============================================================================
// RECORD INPUT
// ============================================================================

/// Layout of a records file.
///
/// | Format | Row numbers |
/// |--------|-------------|
/// | CSV with a header row | from [`FIRST_DATA_ROW`], one per record |
/// | JSON array of objects | position in the array, from 1 |
/// | JSON Lines | line in the file, from 1 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Csv,
    Json,
}

impl RecordFormat {
    /// `.json`, `.jsonl` and `.ndjson` files are JSON; everything else is CSV.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" | "jsonl" | "ndjson" => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Read a records file in the format its extension names.
pub fn load_records(path: &Path) -> Result<Vec<SourceRow>> {
    let text = std::fs::read_to_string(path)?;
    let format = RecordFormat::from_path(path);
    log::debug!("Reading {} as {:?}", path.display(), format);
    match format {
        RecordFormat::Csv => parse_csv(&text),
        RecordFormat::Json => parse_json(&text),
    }
}

/// Parse CSV whose first row names the fields.
///
/// A leading byte-order mark is ignored and blank lines are skipped. Short
/// rows read as empty for their missing columns; cells beyond the header are
/// dropped. A row without an identifier is kept as a failed [`SourceRow`].
pub fn parse_csv(text: &str) -> Result<Vec<SourceRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(strip_bom(text).as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| LabelError::Input(e.to_string()))?
        .clone();

    reader
        .records()
        .enumerate()
        .map(|(i, result)| {
            let row = FIRST_DATA_ROW + i;
            let cells = result.map_err(|e| LabelError::Input(format!("row {}: {}", row, e)))?;
            let pairs = headers
                .iter()
                .enumerate()
                .map(|(column, name)| (name, cells.get(column).unwrap_or("")));
            Ok(SourceRow {
                row,
                record: Record::from_row(pairs),
            })
        })
        .collect()
}

/// Parse a JSON array of objects, or JSON Lines.
///
/// A leading byte-order mark is ignored. Malformed JSON or a non-object entry
/// fails the whole input. Blank lines in JSON Lines are skipped but still
/// counted, so row numbers match line numbers.
pub fn parse_json(text: &str) -> Result<Vec<SourceRow>> {
    let text = strip_bom(text);
    let objects: Vec<(usize, Value)> = if text.trim_start().starts_with('[') {
        let values: Vec<Value> =
            serde_json::from_str(text).map_err(|e| LabelError::Input(e.to_string()))?;
        values.into_iter().enumerate().map(|(i, v)| (i + 1, v)).collect()
    } else {
        text.lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(row, line)| {
                serde_json::from_str(line)
                    .map(|value| (row, value))
                    .map_err(|e| LabelError::Input(format!("line {}: {}", row, e)))
            })
            .collect::<Result<_>>()?
    };

    objects
        .into_iter()
        .map(|(row, value)| {
            let Value::Object(map) = value else {
                return Err(LabelError::Input(format!("row {} is not an object", row)));
            };
            let pairs = map.into_iter().map(|(k, v)| (k, scalar_text(v)));
            Ok(SourceRow {
                row,
                record: Record::from_row(pairs),
            })
        })
        .collect()
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Field text for a JSON value: strings as-is, `null` empty, anything else
/// in its JSON form.
fn scalar_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
