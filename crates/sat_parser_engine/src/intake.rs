use std::io;
use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::{EngineEvent, FailureKind, JobFailure, JobId, JobProgress, ProgressSink, Stage};

#[derive(Debug, Clone)]
pub struct ReadSettings {
    pub chunk_bytes: usize,
    pub max_bytes: u64,
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self {
            chunk_bytes: 64 * 1024,
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("document exceeds {max_bytes} bytes (read {actual})")]
    TooLarge { max_bytes: u64, actual: u64 },
}

impl From<ReadError> for JobFailure {
    fn from(err: ReadError) -> Self {
        let kind = match &err {
            ReadError::Io { .. } => FailureKind::Io,
            ReadError::TooLarge { max_bytes, actual } => FailureKind::TooLarge {
                max_bytes: *max_bytes,
                actual: *actual,
            },
        };
        JobFailure::new(kind, err.to_string())
    }
}

/// Upload stage: reads the whole document in chunks, reporting the share read so far.
///
/// The on-disk size is re-checked against `max_bytes` because the file may have
/// grown since it was staged.
pub async fn read_document(
    job_id: JobId,
    path: &Path,
    settings: &ReadSettings,
    sink: &dyn ProgressSink,
) -> Result<Vec<u8>, ReadError> {
    let io_err = |source: io::Error| ReadError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut file = tokio::fs::File::open(path).await.map_err(io_err)?;
    let total = file.metadata().await.map_err(io_err)?.len();
    if total > settings.max_bytes {
        return Err(ReadError::TooLarge {
            max_bytes: settings.max_bytes,
            actual: total,
        });
    }

    emit(sink, job_id, 0.0);

    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; settings.chunk_bytes.max(1)];
    loop {
        let n = file.read(&mut chunk).await.map_err(io_err)?;
        if n == 0 {
            break;
        }
        let next_len = bytes.len() as u64 + n as u64;
        if next_len > settings.max_bytes {
            return Err(ReadError::TooLarge {
                max_bytes: settings.max_bytes,
                actual: next_len,
            });
        }
        bytes.extend_from_slice(&chunk[..n]);
        emit(sink, job_id, percent_of(bytes.len() as u64, total));
    }

    emit(sink, job_id, 100.0);
    Ok(bytes)
}

fn emit(sink: &dyn ProgressSink, job_id: JobId, percent: f32) {
    sink.emit(EngineEvent::Progress(JobProgress {
        job_id,
        stage: Stage::Uploading,
        percent,
    }));
}

fn percent_of(done: u64, total: u64) -> f32 {
    if total == 0 {
        return 100.0;
    }
    ((done as f64 / total as f64) * 100.0).min(100.0) as f32
}
