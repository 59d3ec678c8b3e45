use crate::{JobId, StagedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartJob { job_id: JobId, file: StagedFile },
    ExportCsv(ExportRequest),
    ExportAll(Vec<ExportRequest>),
}

/// Everything the exporter needs to write one job's table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub job_id: JobId,
    pub source_name: String,
    /// Header row first.
    pub rows: Vec<Vec<String>>,
}
