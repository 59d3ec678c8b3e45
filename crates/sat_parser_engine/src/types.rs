use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc;

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uploading,
    Processing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobProgress {
    pub job_id: JobId,
    pub stage: Stage,
    /// Percentage of the current stage, in `[0, 100]`.
    pub percent: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Progress(JobProgress),
    JobCompleted {
        job_id: JobId,
        result: Result<JobOutcome, JobFailure>,
    },
}

/// A staged file handed to the engine for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub name: String,
    pub mime_type: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Raw document contents after the upload stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInput {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub bytes_read: u64,
    /// Header row first.
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl JobFailure {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Io,
    TooLarge { max_bytes: u64, actual: u64 },
    EmptyDocument,
    Malformed,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Io => write!(f, "io error"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "document too large (max {max_bytes}, actual {actual})")
            }
            FailureKind::EmptyDocument => write!(f, "empty document"),
            FailureKind::Malformed => write!(f, "malformed document"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}
