use std::time::Duration;

use rand::Rng;

use crate::{
    DocumentInput, EngineEvent, FailureKind, JobFailure, JobId, JobProgress, ProgressSink, Stage,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProcessError {
    #[error("document is empty")]
    EmptyDocument,
    #[error("malformed document: {0}")]
    Malformed(String),
}

impl From<ProcessError> for JobFailure {
    fn from(err: ProcessError) -> Self {
        let kind = match &err {
            ProcessError::EmptyDocument => FailureKind::EmptyDocument,
            ProcessError::Malformed(_) => FailureKind::Malformed,
        };
        JobFailure::new(kind, err.to_string())
    }
}

/// Turns raw document bytes into table rows (header first).
#[async_trait::async_trait]
pub trait DocumentProcessor: Send + Sync {
    async fn process(
        &self,
        job_id: JobId,
        document: &DocumentInput,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<Vec<String>>, ProcessError>;
}

#[derive(Debug, Clone)]
pub struct ProcessingSettings {
    pub tick: Duration,
    /// Upper bound of a single progress step, in percent.
    pub max_increment: f32,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(500),
            max_increment: 15.0,
        }
    }
}

/// Stand-in processor: advances in bounded random steps and returns [`canned_table`].
#[derive(Debug, Clone, Default)]
pub struct SimulatedProcessor {
    settings: ProcessingSettings,
}

impl SimulatedProcessor {
    pub fn new(settings: ProcessingSettings) -> Self {
        Self { settings }
    }

    fn next_step(&self) -> f32 {
        let max = self.settings.max_increment.max(MIN_INCREMENT);
        rand::thread_rng().gen_range(MIN_INCREMENT..=max)
    }
}

const MIN_INCREMENT: f32 = 0.1;

#[async_trait::async_trait]
impl DocumentProcessor for SimulatedProcessor {
    async fn process(
        &self,
        job_id: JobId,
        document: &DocumentInput,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<Vec<String>>, ProcessError> {
        if document.bytes.is_empty() {
            return Err(ProcessError::EmptyDocument);
        }

        let mut progress = 0.0_f32;
        emit(sink, job_id, progress);
        while progress < 100.0 {
            tokio::time::sleep(self.settings.tick).await;
            progress = (progress + self.next_step()).min(100.0);
            emit(sink, job_id, progress);
        }

        Ok(canned_table())
    }
}

fn emit(sink: &dyn ProgressSink, job_id: JobId, percent: f32) {
    sink.emit(EngineEvent::Progress(JobProgress {
        job_id,
        stage: Stage::Processing,
        percent,
    }));
}

/// The fixed sample table every simulated job yields.
pub fn canned_table() -> Vec<Vec<String>> {
    const ROWS: [[&str; 7]; 5] = [
        [
            "Student ID",
            "Name",
            "Test Date",
            "Math Score",
            "Reading Score",
            "Writing Score",
            "Total Score",
        ],
        ["12345", "John Doe", "2024-01-15", "650", "680", "640", "1970"],
        ["12346", "Jane Smith", "2024-01-15", "720", "700", "690", "2110"],
        ["12347", "Bob Johnson", "2024-01-15", "580", "620", "600", "1800"],
        ["12348", "Maria Garcia", "2024-01-15", "700", "710", "680", "2090"],
    ];
    ROWS.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}
