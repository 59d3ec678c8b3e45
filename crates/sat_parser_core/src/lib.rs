//! SAT parser core: pure state machine and view-model helpers.
mod effect;
mod intake;
mod job;
mod msg;
mod state;
mod table;
mod update;
mod view_model;

pub use effect::{Effect, ExportRequest};
pub use intake::{
    validate_file, DocumentKind, FileCandidate, IntakePolicy, RejectReason, StagedFile,
    MAX_FILE_BYTES, UNKNOWN_MIME,
};
pub use job::{Job, JobId, JobStatus, Stage};
pub use msg::Msg;
pub use state::{AppState, Tab};
pub use table::{ResultTable, TablePreview, PREVIEW_ROW_LIMIT};
pub use update::update;
pub use view_model::{
    format_file_size, AppViewModel, JobRowView, ResultRowView, StagedRowView,
};
