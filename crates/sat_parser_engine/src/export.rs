use std::collections::HashSet;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Serializes rows as CSV: every cell double-quoted, embedded quotes doubled,
/// rows separated by `\n`, no trailing newline.
pub fn csv_text(rows: &[Vec<String>]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// `report.v2.docx` -> `report.v2.csv`; only the last extension is dropped.
pub fn csv_file_name(source_name: &str) -> String {
    let stem = match source_name.rfind('.') {
        Some(idx) if !source_name[idx + 1..].is_empty() && !source_name[idx + 1..].contains('/') => {
            &source_name[..idx]
        }
        _ => source_name,
    };
    let cleaned: String = stem
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&[' ', '.'][..]);
    if cleaned.is_empty() {
        "export.csv".to_string()
    } else {
        format!("{cleaned}.csv")
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

#[derive(Debug, Default)]
pub struct BulkExportSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(String, ExportError)>,
}

/// Writes one CSV file per source document into an output directory.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    writer: AtomicFileWriter,
    stagger: Duration,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: AtomicFileWriter::new(output_dir),
            stagger: Duration::ZERO,
        }
    }

    /// Pause between files of a bulk export.
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn export(&self, source_name: &str, rows: &[Vec<String>]) -> Result<PathBuf, ExportError> {
        self.write_named(&csv_file_name(source_name), rows)
    }

    /// Exports every item in order. Files that would share a name within the
    /// batch get ` (2)`, ` (3)`, ... suffixes; one failure does not stop the rest.
    pub fn export_all<'a, I>(&self, items: I) -> BulkExportSummary
    where
        I: IntoIterator<Item = (&'a str, &'a [Vec<String>])>,
    {
        let mut summary = BulkExportSummary::default();
        let mut used: HashSet<String> = HashSet::new();
        for (index, (source_name, rows)) in items.into_iter().enumerate() {
            if index > 0 && !self.stagger.is_zero() {
                thread::sleep(self.stagger);
            }
            let filename = unused_name(&used, csv_file_name(source_name));
            used.insert(filename.clone());
            match self.write_named(&filename, rows) {
                Ok(path) => summary.written.push(path),
                Err(err) => {
                    engine_warn!("Export of {} failed: {}", source_name, err);
                    summary.failed.push((source_name.to_string(), err));
                }
            }
        }
        summary
    }

    fn write_named(&self, filename: &str, rows: &[Vec<String>]) -> Result<PathBuf, ExportError> {
        let text = csv_text(rows)?;
        let path = self.writer.write(filename, text.as_bytes())?;
        engine_info!("Exported {} rows to {:?}", rows.len(), path);
        Ok(path)
    }
}

/// First of `base`, `base (2)`, `base (3)`, ... not yet taken in this batch.
fn unused_name(used: &HashSet<String>, base: String) -> String {
    if !used.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| with_suffix(&base, n))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or(base)
}

fn with_suffix(filename: &str, n: usize) -> String {
    let stem = filename.strip_suffix(".csv").unwrap_or(filename);
    format!("{stem} ({n}).csv")
}
