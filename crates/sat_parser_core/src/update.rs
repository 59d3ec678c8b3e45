use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesDropped(candidates) => {
            state.stage_files(candidates);
            Vec::new()
        }
        Msg::StagedFileRemoved { index } => {
            state.remove_staged(index);
            Vec::new()
        }
        Msg::UploadClicked { at } => state
            .submit_staged(at)
            .into_iter()
            .map(|(job_id, file)| Effect::StartJob { job_id, file })
            .collect(),
        Msg::TabSelected(tab) => {
            state.select_tab(tab);
            Vec::new()
        }
        Msg::JobProgress {
            job_id,
            stage,
            progress,
        } => {
            state.apply_progress(job_id, stage, progress);
            Vec::new()
        }
        Msg::JobDone { job_id, result } => {
            state.apply_done(job_id, result);
            Vec::new()
        }
        Msg::PreviewToggled { job_id } => {
            state.toggle_preview(job_id);
            Vec::new()
        }
        Msg::DownloadClicked { job_id } => state
            .export_request(job_id)
            .map(Effect::ExportCsv)
            .into_iter()
            .collect(),
        Msg::DownloadAllClicked => {
            let requests = state.export_all_requests();
            if requests.is_empty() {
                Vec::new()
            } else {
                vec![Effect::ExportAll(requests)]
            }
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
