use chrono::{DateTime, Utc};

use crate::{AppState, JobId, JobStatus, Tab, TablePreview};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub active_tab: Tab,
    /// Badge on the Processing tab: every job that has not completed, failed ones included.
    pub processing_count: usize,
    pub results_count: usize,
    pub staged: Vec<StagedRowView>,
    pub intake_error: Option<String>,
    pub processing: Vec<JobRowView>,
    pub results: Vec<ResultRowView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedRowView {
    pub index: usize,
    pub name: String,
    pub size_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub name: String,
    pub status: JobStatus,
    pub status_text: String,
    pub percent: u8,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRowView {
    pub job_id: JobId,
    pub name: String,
    pub record_count: usize,
    pub submitted_at: DateTime<Utc>,
    pub preview: Option<TablePreview>,
}

pub(crate) fn build(state: &AppState) -> AppViewModel {
    let staged = state
        .staged()
        .iter()
        .enumerate()
        .map(|(index, file)| StagedRowView {
            index,
            name: file.name.clone(),
            size_label: format_file_size(file.size_bytes),
        })
        .collect();

    let mut processing = Vec::new();
    let mut results = Vec::new();
    for job in state.jobs() {
        match job.result() {
            Some(table) => results.push(ResultRowView {
                job_id: job.id(),
                name: job.name().to_string(),
                record_count: table.record_count(),
                submitted_at: job.submitted_at(),
                preview: (state.previewed() == Some(job.id())).then(|| table.preview()),
            }),
            None => processing.push(JobRowView {
                job_id: job.id(),
                name: job.name().to_string(),
                status: job.status(),
                status_text: status_text(job.status(), job.error()),
                percent: job.progress().round() as u8,
                submitted_at: job.submitted_at(),
            }),
        }
    }

    AppViewModel {
        active_tab: state.active_tab(),
        processing_count: processing.len(),
        results_count: results.len(),
        staged,
        intake_error: state.intake_error().map(str::to_string),
        processing,
        results,
        dirty: state.is_dirty(),
    }
}

fn status_text(status: JobStatus, error: Option<&str>) -> String {
    match status {
        JobStatus::Uploading => "Uploading file...".to_string(),
        JobStatus::Processing => "Parsing document and extracting data...".to_string(),
        JobStatus::Error => error.unwrap_or("An error occurred").to_string(),
        JobStatus::Completed => "Completed".to_string(),
    }
}

/// Human-readable size with up to two decimals, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
