use chrono::Utc;
use sat_parser_core::{
    update, AppState, Effect, FileCandidate, JobId, JobStatus, Msg, ResultTable, Stage,
};

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn submitted(names: &[&str]) -> AppState {
    let files = names
        .iter()
        .map(|name| FileCandidate::new(*name, "text/plain", 1024, format!("/docs/{name}")))
        .collect();
    let (state, _) = update(AppState::new(), Msg::FilesDropped(files));
    let (state, effects) = update(state, Msg::UploadClicked { at: Utc::now() });
    assert_eq!(effects.len(), names.len());
    state
}

fn progress(state: AppState, job_id: JobId, stage: Stage, progress: f32) -> AppState {
    update(
        state,
        Msg::JobProgress {
            job_id,
            stage,
            progress,
        },
    )
    .0
}

fn table() -> ResultTable {
    ResultTable::from_rows(vec![
        vec!["Student ID".to_string(), "Name".to_string()],
        vec!["12345".to_string(), "John Doe".to_string()],
    ])
}

#[test]
fn job_walks_uploading_processing_completed() {
    init_logging();
    let state = submitted(&["a.txt"]);

    let state = progress(state, 1, Stage::Uploading, 40.0);
    assert_eq!(state.job(1).unwrap().status(), JobStatus::Uploading);
    assert_eq!(state.job(1).unwrap().progress(), 40.0);

    let state = progress(state, 1, Stage::Uploading, 100.0);
    let state = progress(state, 1, Stage::Processing, 0.0);
    let job = state.job(1).unwrap();
    assert_eq!(job.status(), JobStatus::Processing);
    assert_eq!(job.progress(), 0.0);

    let state = progress(state, 1, Stage::Processing, 55.5);
    assert_eq!(state.view().processing[0].percent, 56);
    assert_eq!(
        state.view().processing[0].status_text,
        "Parsing document and extracting data..."
    );

    let (state, effects) = update(
        state,
        Msg::JobDone {
            job_id: 1,
            result: Ok(table()),
        },
    );
    assert!(effects.is_empty());
    let job = state.job(1).unwrap();
    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(job.progress(), 100.0);
    assert_eq!(job.result(), Some(&table()));
    assert!(job.error().is_none());

    let view = state.view();
    assert_eq!(view.processing_count, 0);
    assert_eq!(view.results_count, 1);
    assert_eq!(view.results[0].record_count, 1);
}

#[test]
fn progress_never_decreases_within_a_stage() {
    init_logging();
    let state = submitted(&["a.txt"]);
    let state = progress(state, 1, Stage::Uploading, 60.0);
    let (mut state, _) = update(
        state,
        Msg::JobProgress {
            job_id: 1,
            stage: Stage::Uploading,
            progress: 30.0,
        },
    );
    assert_eq!(state.job(1).unwrap().progress(), 60.0);
    assert!(state.consume_dirty());

    let state = progress(state, 1, Stage::Uploading, 250.0);
    assert_eq!(state.job(1).unwrap().progress(), 100.0);

    let state = progress(state, 1, Stage::Processing, -5.0);
    assert_eq!(state.job(1).unwrap().progress(), 0.0);

    let state = progress(state, 1, Stage::Processing, f32::NAN);
    assert_eq!(state.job(1).unwrap().progress(), 0.0);
}

#[test]
fn stale_upload_ticks_are_ignored_once_processing() {
    init_logging();
    let state = submitted(&["a.txt"]);
    let state = progress(state, 1, Stage::Processing, 20.0);
    let state = progress(state, 1, Stage::Uploading, 90.0);

    let job = state.job(1).unwrap();
    assert_eq!(job.status(), JobStatus::Processing);
    assert_eq!(job.progress(), 20.0);
}

#[test]
fn failure_moves_job_to_error_with_message() {
    init_logging();
    let state = submitted(&["a.txt"]);
    let state = progress(state, 1, Stage::Uploading, 35.0);
    let (state, _) = update(
        state,
        Msg::JobDone {
            job_id: 1,
            result: Err("document is empty".to_string()),
        },
    );

    let job = state.job(1).unwrap();
    assert_eq!(job.status(), JobStatus::Error);
    assert_eq!(job.error(), Some("document is empty"));
    assert!(job.result().is_none());
    assert_eq!(job.progress(), 35.0);

    let view = state.view();
    assert_eq!(view.processing_count, 1);
    assert_eq!(view.processing[0].status_text, "document is empty");
    assert_eq!(view.results_count, 0);
}

#[test]
fn terminal_jobs_ignore_further_events() {
    init_logging();
    let state = submitted(&["a.txt", "b.txt"]);
    let (state, _) = update(
        state,
        Msg::JobDone {
            job_id: 1,
            result: Ok(table()),
        },
    );
    let (state, _) = update(
        state,
        Msg::JobDone {
            job_id: 2,
            result: Err("boom".to_string()),
        },
    );

    let (state, _) = update(
        state,
        Msg::JobDone {
            job_id: 1,
            result: Err("late failure".to_string()),
        },
    );
    let (mut state, _) = update(
        state,
        Msg::JobDone {
            job_id: 2,
            result: Ok(table()),
        },
    );
    assert!(state.consume_dirty());
    let state = progress(state, 2, Stage::Processing, 80.0);

    assert_eq!(state.job(1).unwrap().status(), JobStatus::Completed);
    assert!(state.job(1).unwrap().error().is_none());
    assert_eq!(state.job(2).unwrap().status(), JobStatus::Error);
    assert_eq!(state.job(2).unwrap().error(), Some("boom"));
    assert!(state.job(2).unwrap().result().is_none());
    assert!(state.all_jobs_settled());
}

#[test]
fn events_for_unknown_jobs_are_ignored() {
    init_logging();
    let mut state = submitted(&["a.txt"]);
    assert!(state.consume_dirty());

    let state = progress(state, 42, Stage::Uploading, 10.0);
    let (mut state, effects) = update(
        state,
        Msg::JobDone {
            job_id: 42,
            result: Ok(table()),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state.jobs().count(), 1);
}

#[test]
fn jobs_interleave_independently() {
    init_logging();
    let state = submitted(&["a.txt", "b.txt"]);
    let state = progress(state, 2, Stage::Processing, 10.0);
    let state = progress(state, 1, Stage::Uploading, 70.0);

    let view = state.view();
    let statuses: Vec<_> = view.processing.iter().map(|row| row.status).collect();
    assert_eq!(statuses, vec![JobStatus::Uploading, JobStatus::Processing]);
    assert!(!state.all_jobs_settled());
}

#[test]
fn empty_state_is_not_settled() {
    assert!(!AppState::new().all_jobs_settled());
    let (_, effects) = update(AppState::new(), Msg::UploadClicked { at: Utc::now() });
    assert!(!effects.iter().any(|e| matches!(e, Effect::StartJob { .. })));
}
