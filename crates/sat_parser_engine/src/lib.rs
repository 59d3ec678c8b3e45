//! SAT parser engine: document intake, processing pipeline, and CSV export.
mod engine;
mod export;
mod intake;
mod persist;
mod processor;
mod schema;
mod types;

pub use engine::{EngineConfig, EngineError, EngineHandle};
pub use export::{csv_file_name, csv_text, BulkExportSummary, CsvExporter, ExportError};
pub use intake::{read_document, ReadError, ReadSettings};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use processor::{
    canned_table, DocumentProcessor, ProcessError, ProcessingSettings, SimulatedProcessor,
};
pub use schema::{sample_records, sample_table, schema_header, QuestionRecord, SchemaColumn, SCHEMA};
pub use types::{
    ChannelProgressSink, DocumentInput, EngineEvent, FailureKind, JobFailure, JobId, JobOutcome,
    JobProgress, JobRequest, ProgressSink, Stage,
};
