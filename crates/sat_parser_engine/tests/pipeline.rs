use std::sync::mpsc::Receiver;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use sat_parser_engine::{
    canned_table, read_document, DocumentInput, DocumentProcessor, EngineConfig, EngineEvent,
    EngineHandle, FailureKind, JobFailure, JobId, JobOutcome, JobRequest, ProcessError,
    ProcessingSettings, ProgressSink, ReadError, ReadSettings, Stage,
};
use tempfile::TempDir;

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        read: ReadSettings {
            chunk_bytes: 256,
            ..ReadSettings::default()
        },
        processing: ProcessingSettings {
            tick: Duration::from_millis(1),
            max_increment: 40.0,
        },
        max_concurrent_jobs: 2,
    }
}

fn request(dir: &TempDir, name: &str, content: &[u8]) -> JobRequest {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    JobRequest {
        name: name.to_string(),
        mime_type: "text/plain".to_string(),
        path,
        size_bytes: content.len() as u64,
    }
}

/// Collects events until `expected` jobs have completed.
fn drain(rx: &Receiver<EngineEvent>, expected: usize) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    let mut done = 0;
    while done < expected {
        let event = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("engine event before timeout");
        if matches!(event, EngineEvent::JobCompleted { .. }) {
            done += 1;
        }
        events.push(event);
    }
    events
}

fn progress_of(events: &[EngineEvent], job_id: JobId) -> Vec<(Stage, f32)> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Progress(p) if p.job_id == job_id => Some((p.stage, p.percent)),
            _ => None,
        })
        .collect()
}

fn result_of(events: &[EngineEvent], job_id: JobId) -> Result<JobOutcome, JobFailure> {
    events
        .iter()
        .find_map(|event| match event {
            EngineEvent::JobCompleted { job_id: id, result } if *id == job_id => {
                Some(result.clone())
            }
            _ => None,
        })
        .expect("completion event")
}

#[test]
fn one_kilobyte_text_file_yields_canned_table() {
    let dir = TempDir::new().unwrap();
    let (engine, rx) = EngineHandle::new(fast_config()).unwrap();

    engine.start(1, request(&dir, "practice.txt", &[b'q'; 1024]));
    let events = drain(&rx, 1);

    let outcome = result_of(&events, 1).expect("job succeeds");
    assert_eq!(outcome.bytes_read, 1024);
    assert_eq!(outcome.rows, canned_table());

    let progress = progress_of(&events, 1);
    let first_processing = progress
        .iter()
        .position(|(stage, _)| *stage == Stage::Processing)
        .expect("processing stage reached");
    assert!(progress[..first_processing]
        .iter()
        .all(|(stage, _)| *stage == Stage::Uploading));
    assert_eq!(progress[first_processing - 1].1, 100.0);
    assert_eq!(progress.last().unwrap(), &(Stage::Processing, 100.0));

    for stage in [Stage::Uploading, Stage::Processing] {
        let values: Vec<f32> = progress
            .iter()
            .filter(|(s, _)| *s == stage)
            .map(|(_, v)| *v)
            .collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]), "{stage:?} regressed");
        assert!(values.iter().all(|v| (0.0..=100.0).contains(v)));
    }
}

#[test]
fn empty_document_fails_with_message() {
    let dir = TempDir::new().unwrap();
    let (engine, rx) = EngineHandle::new(fast_config()).unwrap();

    engine.start(7, request(&dir, "blank.txt", b""));
    let events = drain(&rx, 1);

    let failure = result_of(&events, 7).unwrap_err();
    assert_eq!(failure.kind, FailureKind::EmptyDocument);
    assert_eq!(failure.to_string(), "document is empty");
}

#[test]
fn missing_file_fails_with_io_error() {
    let dir = TempDir::new().unwrap();
    let (engine, rx) = EngineHandle::new(fast_config()).unwrap();

    engine.start(
        3,
        JobRequest {
            name: "gone.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            path: dir.path().join("gone.pdf"),
            size_bytes: 10,
        },
    );
    let events = drain(&rx, 1);

    let failure = result_of(&events, 3).unwrap_err();
    assert_eq!(failure.kind, FailureKind::Io);
    assert!(failure.message.contains("gone.pdf"));
}

#[test]
fn several_jobs_all_complete() {
    let dir = TempDir::new().unwrap();
    let (engine, rx) = EngineHandle::new(fast_config()).unwrap();

    for job_id in 1..=5 {
        engine.start(job_id, request(&dir, &format!("doc{job_id}.txt"), b"content"));
    }
    let events = drain(&rx, 5);

    for job_id in 1..=5 {
        assert!(result_of(&events, job_id).is_ok(), "job {job_id}");
    }
}

/// Tracks how many `process` calls overlap.
#[derive(Default)]
struct CountingProcessor {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait::async_trait]
impl DocumentProcessor for CountingProcessor {
    async fn process(
        &self,
        _job_id: JobId,
        _document: &DocumentInput,
        _sink: &dyn ProgressSink,
    ) -> Result<Vec<Vec<String>>, ProcessError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(canned_table())
    }
}

#[test]
fn concurrent_jobs_never_exceed_permit_count() {
    let dir = TempDir::new().unwrap();
    let processor = Arc::new(CountingProcessor::default());
    let (engine, rx) = EngineHandle::with_processor(fast_config(), processor.clone()).unwrap();

    for job_id in 1..=6 {
        engine.start(job_id, request(&dir, &format!("doc{job_id}.txt"), b"content"));
    }
    let events = drain(&rx, 6);

    for job_id in 1..=6 {
        assert!(result_of(&events, job_id).is_ok(), "job {job_id}");
    }
    let peak = processor.peak.load(Ordering::SeqCst);
    assert!((1..=2).contains(&peak), "peak concurrency {peak}");
    assert_eq!(processor.in_flight.load(Ordering::SeqCst), 0);
}

struct RejectingProcessor;

#[async_trait::async_trait]
impl DocumentProcessor for RejectingProcessor {
    async fn process(
        &self,
        _job_id: JobId,
        document: &DocumentInput,
        _sink: &dyn ProgressSink,
    ) -> Result<Vec<Vec<String>>, ProcessError> {
        Err(ProcessError::Malformed(format!(
            "no questions found in {}",
            document.name
        )))
    }
}

#[test]
fn processor_errors_become_malformed_failures() {
    let dir = TempDir::new().unwrap();
    let (engine, rx) =
        EngineHandle::with_processor(fast_config(), Arc::new(RejectingProcessor)).unwrap();

    engine.start(1, request(&dir, "odd.txt", b"???"));
    let events = drain(&rx, 1);

    let failure = result_of(&events, 1).unwrap_err();
    assert_eq!(failure.kind, FailureKind::Malformed);
    assert_eq!(failure.message, "malformed document: no questions found in odd.txt");
}

struct PanickingProcessor;

#[async_trait::async_trait]
impl DocumentProcessor for PanickingProcessor {
    async fn process(
        &self,
        _job_id: JobId,
        _document: &DocumentInput,
        _sink: &dyn ProgressSink,
    ) -> Result<Vec<Vec<String>>, ProcessError> {
        panic!("processor bug");
    }
}

#[test]
fn panicking_processor_still_reports_completion() {
    let dir = TempDir::new().unwrap();
    let (engine, rx) =
        EngineHandle::with_processor(fast_config(), Arc::new(PanickingProcessor)).unwrap();

    engine.start(9, request(&dir, "crash.txt", b"abc"));
    let events = drain(&rx, 1);

    assert_eq!(result_of(&events, 9).unwrap_err().kind, FailureKind::Cancelled);
}

#[tokio::test]
async fn reader_reports_chunked_progress() {
    let dir = TempDir::new().unwrap();
    let req = request(&dir, "big.txt", &[b'x'; 1000]);
    let sink = TestSink::default();
    let settings = ReadSettings {
        chunk_bytes: 250,
        max_bytes: 10_000,
    };

    let bytes = read_document(1, &req.path, &settings, &sink).await.unwrap();
    assert_eq!(bytes.len(), 1000);

    let percents: Vec<f32> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::Progress(p) => Some(p.percent),
            _ => None,
        })
        .collect();
    assert_eq!(percents.first(), Some(&0.0));
    assert_eq!(percents.last(), Some(&100.0));
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert!(percents.len() >= 3);
}

#[tokio::test]
async fn reader_enforces_size_ceiling() {
    let dir = TempDir::new().unwrap();
    let req = request(&dir, "huge.pdf", &[0u8; 2048]);
    let sink = TestSink::default();
    let settings = ReadSettings {
        chunk_bytes: 512,
        max_bytes: 1024,
    };

    let err = read_document(1, &req.path, &settings, &sink)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReadError::TooLarge {
            max_bytes: 1024,
            actual: 2048
        }
    ));
    assert!(sink.take().is_empty());
}
