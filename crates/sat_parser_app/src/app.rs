use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use sat_parser_core::{update, AppState, JobStatus, Msg, Tab};

use crate::cli::{Cli, Command, ProcessArgs};
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::files::candidate_from_path;
use crate::render;

const RENDER_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Schema => {
            for line in render::render_schema() {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Process(args) => {
            config.apply_overrides(&args);
            engine_logging::initialize(
                config.log_destination,
                engine_logging::parse_level(&config.log_level),
                &config.log_file,
            );
            run_process(&config, &args)
        }
    }
}

fn run_process(config: &AppConfig, args: &ProcessArgs) -> Result<ExitCode> {
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let mut session = Session {
        state: AppState::with_policy(config.intake_policy()),
        runner: EffectRunner::new(config, msg_tx.clone())?,
    };

    let mut candidates = Vec::with_capacity(args.files.len());
    for path in &args.files {
        match candidate_from_path(path) {
            Ok(candidate) => candidates.push(candidate),
            Err(err) => {
                engine_warn!("Skipping {:?}: {:#}", path, err);
                eprintln!("Skipping {}: {err:#}", path.display());
            }
        }
    }

    // The view keeps only the latest rejection, so report each one as it happens.
    for candidate in candidates {
        session.dispatch(Msg::FilesDropped(vec![candidate]));
        if let Some(error) = session.state.intake_error() {
            eprintln!("{error}");
        }
    }
    session.render();

    if session.state.staged().is_empty() {
        eprintln!("No supported documents to process.");
        return Ok(ExitCode::FAILURE);
    }

    session.dispatch(Msg::UploadClicked { at: Utc::now() });
    session.dispatch(Msg::TabSelected(Tab::Processing));

    // Background tick to throttle rendering.
    let tick_tx = msg_tx.clone();
    thread::spawn(move || {
        while tick_tx.send(Msg::Tick).is_ok() {
            thread::sleep(RENDER_INTERVAL);
        }
    });
    drop(msg_tx);

    while !session.state.all_jobs_settled() {
        let Ok(msg) = msg_rx.recv() else {
            break;
        };
        let is_tick = matches!(msg, Msg::Tick);
        session.dispatch(msg);
        if is_tick {
            session.render_if_dirty();
        }
    }
    session.render_if_dirty();

    session.dispatch(Msg::TabSelected(Tab::Results));
    if args.preview {
        let completed: Vec<_> = session.state.completed_jobs().map(|job| job.id()).collect();
        for job_id in completed {
            session.dispatch(Msg::PreviewToggled { job_id });
            session.render();
        }
    }
    if !args.no_export {
        session.dispatch(Msg::DownloadAllClicked);
        let report = session.runner.report();
        for path in &report.written {
            println!("Wrote {}", path.display());
        }
        for (name, err) in &report.failed {
            eprintln!("Export of {name} failed: {err}");
        }
    }

    let failed = session
        .state
        .jobs()
        .filter(|job| job.status() == JobStatus::Error)
        .count();
    engine_info!(
        "Session finished jobs={} failed={}",
        session.state.jobs().count(),
        failed
    );
    let export_failed = !args.no_export && !session.runner.report().failed.is_empty();
    Ok(if failed > 0 || export_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

struct Session {
    state: AppState,
    runner: EffectRunner,
}

impl Session {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn render_if_dirty(&mut self) {
        if self.state.consume_dirty() {
            self.print();
        }
    }

    fn render(&mut self) {
        self.state.consume_dirty();
        self.print();
    }

    fn print(&self) {
        for line in render::render(&self.state.view()) {
            println!("{line}");
        }
    }
}
