use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio::sync::Semaphore;

use crate::intake::{read_document, ReadSettings};
use crate::processor::{DocumentProcessor, ProcessingSettings, SimulatedProcessor};
use crate::{
    ChannelProgressSink, DocumentInput, EngineEvent, FailureKind, JobFailure, JobId, JobOutcome,
    JobRequest,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub read: ReadSettings,
    pub processing: ProcessingSettings,
    /// Jobs beyond this limit wait in the upload stage at 0%.
    pub max_concurrent_jobs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            read: ReadSettings::default(),
            processing: ProcessingSettings::default(),
            max_concurrent_jobs: 4,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum EngineCommand {
    Start { job_id: JobId, request: JobRequest },
}

/// Handle to the background pipeline. Dropping every handle shuts the engine down.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Starts the engine with the simulated processor.
    pub fn new(config: EngineConfig) -> Result<(Self, mpsc::Receiver<EngineEvent>), EngineError> {
        let processor = Arc::new(SimulatedProcessor::new(config.processing.clone()));
        Self::with_processor(config, processor)
    }

    pub fn with_processor(
        config: EngineConfig,
        processor: Arc<dyn DocumentProcessor>,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>), EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_time()
            .thread_name("sat-parser-engine")
            .build()?;
        let permits = Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1)));
        let read = Arc::new(config.read);

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Start { job_id, request } => {
                        let job = JobContext {
                            job_id,
                            request,
                            read: read.clone(),
                            processor: processor.clone(),
                            permits: permits.clone(),
                            event_tx: event_tx.clone(),
                        };
                        runtime.spawn(supervise(job));
                    }
                }
            }
            engine_debug!("Engine command channel closed; shutting down runtime");
        });

        Ok((Self { cmd_tx }, event_rx))
    }

    pub fn start(&self, job_id: JobId, request: JobRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Start { job_id, request });
    }
}

struct JobContext {
    job_id: JobId,
    request: JobRequest,
    read: Arc<ReadSettings>,
    processor: Arc<dyn DocumentProcessor>,
    permits: Arc<Semaphore>,
    event_tx: mpsc::Sender<EngineEvent>,
}

/// Runs the job in its own task so a panic still yields a terminal event.
async fn supervise(job: JobContext) {
    let job_id = job.job_id;
    let event_tx = job.event_tx.clone();
    let result = match tokio::spawn(run_job(job)).await {
        Ok(result) => result,
        Err(join_err) => {
            engine_warn!("Job {} aborted: {}", job_id, join_err);
            Err(JobFailure::new(
                FailureKind::Cancelled,
                "processing was interrupted",
            ))
        }
    };
    let _ = event_tx.send(EngineEvent::JobCompleted { job_id, result });
}

async fn run_job(job: JobContext) -> Result<JobOutcome, JobFailure> {
    let _permit = job.permits.clone().acquire_owned().await.map_err(|_| {
        JobFailure::new(FailureKind::Cancelled, "engine is shutting down")
    })?;
    engine_info!(
        "Job {} started name={} size={}",
        job.job_id,
        job.request.name,
        job.request.size_bytes
    );

    let sink = ChannelProgressSink::new(job.event_tx.clone());
    let bytes = read_document(job.job_id, &job.request.path, &job.read, &sink).await?;
    let bytes_read = bytes.len() as u64;
    let document = DocumentInput {
        name: job.request.name,
        mime_type: job.request.mime_type,
        bytes,
    };
    let rows = job.processor.process(job.job_id, &document, &sink).await?;

    engine_info!(
        "Job {} completed rows={} bytes_read={}",
        job.job_id,
        rows.len(),
        bytes_read
    );
    Ok(JobOutcome { bytes_read, rows })
}
