use chrono::{DateTime, Utc};

use crate::{FileCandidate, JobId, ResultTable, Stage, Tab};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Files dropped on the intake area or picked in the file browser.
    FilesDropped(Vec<FileCandidate>),
    /// User removed one staged file before uploading.
    StagedFileRemoved { index: usize },
    /// User clicked Upload; `at` stamps the submitted jobs.
    UploadClicked { at: DateTime<Utc> },
    /// User switched tabs.
    TabSelected(Tab),
    /// Engine progress for a job, as a percentage of the current stage.
    JobProgress {
        job_id: JobId,
        stage: Stage,
        progress: f32,
    },
    /// Engine completion for a job.
    JobDone {
        job_id: JobId,
        result: Result<ResultTable, String>,
    },
    /// User toggled the table preview of a completed job.
    PreviewToggled { job_id: JobId },
    /// User asked for the CSV of one completed job.
    DownloadClicked { job_id: JobId },
    /// User asked for the CSV of every completed job.
    DownloadAllClicked,
    /// UI/render tick to coalesce rendering.
    Tick,
}
