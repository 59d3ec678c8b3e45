use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use engine_logging::{engine_error, engine_info, engine_warn};
use sat_parser_core::{Effect, ExportRequest, Msg, ResultTable, Stage};
use sat_parser_engine::{CsvExporter, EngineEvent, EngineHandle, JobRequest};

use crate::config::AppConfig;

#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(String, String)>,
}

pub struct EffectRunner {
    engine: EngineHandle,
    exporter: CsvExporter,
    report: ExportReport,
}

impl EffectRunner {
    pub fn new(config: &AppConfig, msg_tx: mpsc::Sender<Msg>) -> anyhow::Result<Self> {
        let (engine, events) = EngineHandle::new(config.engine_config())?;
        let exporter =
            CsvExporter::new(config.output_dir.clone()).with_stagger(config.export_stagger());
        spawn_event_loop(events, msg_tx);
        Ok(Self {
            engine,
            exporter,
            report: ExportReport::default(),
        })
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartJob { job_id, file } => {
                    engine_info!(
                        "StartJob job_id={} name={} size={}",
                        job_id,
                        file.name,
                        file.size_bytes
                    );
                    self.engine.start(
                        job_id,
                        JobRequest {
                            name: file.name,
                            mime_type: file.kind.mime_type().to_string(),
                            path: file.location,
                            size_bytes: file.size_bytes,
                        },
                    );
                }
                Effect::ExportCsv(request) => self.export_one(request),
                Effect::ExportAll(requests) => self.export_all(requests),
            }
        }
    }

    pub fn report(&self) -> &ExportReport {
        &self.report
    }

    fn export_one(&mut self, request: ExportRequest) {
        match self.exporter.export(&request.source_name, &request.rows) {
            Ok(path) => self.report.written.push(path),
            Err(err) => {
                engine_error!("Export of job {} failed: {}", request.job_id, err);
                self.report.failed.push((request.source_name, err.to_string()));
            }
        }
    }

    fn export_all(&mut self, requests: Vec<ExportRequest>) {
        engine_info!("ExportAll count={}", requests.len());
        let summary = self.exporter.export_all(
            requests
                .iter()
                .map(|r| (r.source_name.as_str(), r.rows.as_slice())),
        );
        self.report.written.extend(summary.written);
        self.report.failed.extend(
            summary
                .failed
                .into_iter()
                .map(|(name, err)| (name, err.to_string())),
        );
    }
}

/// Forwards engine events to the dispatch loop until either side hangs up.
fn spawn_event_loop(events: mpsc::Receiver<EngineEvent>, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Ok(event) = events.recv() {
            if msg_tx.send(map_event(event)).is_err() {
                break;
            }
        }
    });
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress(progress) => Msg::JobProgress {
            job_id: progress.job_id,
            stage: map_stage(progress.stage),
            progress: progress.percent,
        },
        EngineEvent::JobCompleted { job_id, result } => Msg::JobDone {
            job_id,
            result: match result {
                Ok(outcome) => Ok(ResultTable::from_rows(outcome.rows)),
                Err(failure) => {
                    engine_warn!("Job {} failed ({}): {}", job_id, failure.kind, failure);
                    Err(failure.to_string())
                }
            },
        },
    }
}

fn map_stage(stage: sat_parser_engine::Stage) -> Stage {
    match stage {
        sat_parser_engine::Stage::Uploading => Stage::Uploading,
        sat_parser_engine::Stage::Processing => Stage::Processing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sat_parser_engine::{FailureKind, JobFailure, JobOutcome, JobProgress};

    #[test]
    fn progress_events_keep_stage_and_percent() {
        let msg = map_event(EngineEvent::Progress(JobProgress {
            job_id: 4,
            stage: sat_parser_engine::Stage::Processing,
            percent: 42.5,
        }));
        assert_eq!(
            msg,
            Msg::JobProgress {
                job_id: 4,
                stage: Stage::Processing,
                progress: 42.5
            }
        );
    }

    #[test]
    fn completion_splits_header_from_rows() {
        let msg = map_event(EngineEvent::JobCompleted {
            job_id: 1,
            result: Ok(JobOutcome {
                bytes_read: 3,
                rows: sat_parser_engine::canned_table(),
            }),
        });
        match msg {
            Msg::JobDone { result: Ok(table), .. } => {
                assert_eq!(table.record_count(), 4);
                assert_eq!(table.header[0], "Student ID");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failure_becomes_error_message() {
        let msg = map_event(EngineEvent::JobCompleted {
            job_id: 2,
            result: Err(JobFailure {
                kind: FailureKind::EmptyDocument,
                message: "document is empty".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Msg::JobDone {
                job_id: 2,
                result: Err("document is empty".to_string())
            }
        );
    }
}
