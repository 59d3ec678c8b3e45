use chrono::{DateTime, Utc};

use crate::{DocumentKind, ResultTable};

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Uploading,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Uploading => "Uploading",
            JobStatus::Processing => "Processing",
            JobStatus::Completed => "Completed",
            JobStatus::Error => "Error",
        }
    }
}

/// Pipeline stage reported with a progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uploading,
    Processing,
}

/// Lifecycle of a job. Result and error only exist in their terminal phase.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JobPhase {
    Uploading { progress: f32 },
    Processing { progress: f32 },
    Completed { table: ResultTable },
    Failed { progress: f32, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: JobId,
    name: String,
    kind: DocumentKind,
    size_bytes: u64,
    submitted_at: DateTime<Utc>,
    phase: JobPhase,
}

impl Job {
    pub(crate) fn new(
        id: JobId,
        name: String,
        kind: DocumentKind,
        size_bytes: u64,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            size_bytes,
            submitted_at,
            phase: JobPhase::Uploading { progress: 0.0 },
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn status(&self) -> JobStatus {
        match self.phase {
            JobPhase::Uploading { .. } => JobStatus::Uploading,
            JobPhase::Processing { .. } => JobStatus::Processing,
            JobPhase::Completed { .. } => JobStatus::Completed,
            JobPhase::Failed { .. } => JobStatus::Error,
        }
    }

    pub fn progress(&self) -> f32 {
        match &self.phase {
            JobPhase::Uploading { progress }
            | JobPhase::Processing { progress }
            | JobPhase::Failed { progress, .. } => *progress,
            JobPhase::Completed { .. } => 100.0,
        }
    }

    pub fn result(&self) -> Option<&ResultTable> {
        match &self.phase {
            JobPhase::Completed { table } => Some(table),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            JobPhase::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns true if the job changed.
    pub(crate) fn apply_progress(&mut self, stage: Stage, reported: f32) -> bool {
        let reported = clamp_percent(reported);
        if matches!(self.phase, JobPhase::Uploading { .. }) && stage == Stage::Processing {
            self.phase = JobPhase::Processing { progress: reported };
            return true;
        }
        match (&mut self.phase, stage) {
            (JobPhase::Uploading { progress }, Stage::Uploading)
            | (JobPhase::Processing { progress }, Stage::Processing) => {
                if reported > *progress {
                    *progress = reported;
                    true
                } else {
                    false
                }
            }
            // Stale upload ticks after processing started, or anything after a terminal phase.
            _ => false,
        }
    }

    /// Returns true if the job changed. Terminal jobs are never touched again.
    pub(crate) fn apply_done(&mut self, result: Result<ResultTable, String>) -> bool {
        if self.status().is_terminal() {
            return false;
        }
        self.phase = match result {
            Ok(table) => JobPhase::Completed { table },
            Err(message) => JobPhase::Failed {
                progress: self.progress(),
                message,
            },
        };
        true
    }
}

fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
