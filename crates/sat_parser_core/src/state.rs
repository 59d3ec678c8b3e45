use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::view_model::{self, AppViewModel};
use crate::{
    validate_file, ExportRequest, FileCandidate, IntakePolicy, Job, JobId, JobStatus, ResultTable,
    Stage, StagedFile,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Upload,
    Processing,
    Results,
    Schema,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    policy: IntakePolicy,
    staged: Vec<StagedFile>,
    intake_error: Option<String>,
    jobs: BTreeMap<JobId, Job>,
    next_job_id: JobId,
    active_tab: Tab,
    previewed: Option<JobId>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: IntakePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self)
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    pub fn intake_error(&self) -> Option<&str> {
        self.intake_error.as_deref()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn previewed(&self) -> Option<JobId> {
        self.previewed
    }

    pub fn job(&self, job_id: JobId) -> Option<&Job> {
        self.jobs.get(&job_id)
    }

    /// Jobs in submission order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn completed_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs
            .values()
            .filter(|job| job.status() == JobStatus::Completed)
    }

    /// True once at least one job exists and none is still in flight.
    pub fn all_jobs_settled(&self) -> bool {
        !self.jobs.is_empty() && self.jobs.values().all(|job| job.status().is_terminal())
    }

    /// Validates each candidate; accepted files are appended, the last rejection is kept.
    pub(crate) fn stage_files(&mut self, candidates: Vec<FileCandidate>) {
        self.intake_error = None;
        for candidate in candidates {
            match validate_file(&candidate, &self.policy) {
                Ok(kind) => self.staged.push(StagedFile {
                    name: candidate.name,
                    kind,
                    size_bytes: candidate.size_bytes,
                    location: candidate.location,
                }),
                Err(reason) => self.intake_error = Some(reason.to_string()),
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn remove_staged(&mut self, index: usize) -> bool {
        if index >= self.staged.len() {
            return false;
        }
        self.staged.remove(index);
        self.mark_dirty();
        true
    }

    /// Turns every staged file into a job and clears the staging list.
    pub(crate) fn submit_staged(&mut self, at: DateTime<Utc>) -> Vec<(JobId, StagedFile)> {
        let staged = std::mem::take(&mut self.staged);
        let mut submitted = Vec::with_capacity(staged.len());
        for file in staged {
            self.next_job_id += 1;
            let job_id = self.next_job_id;
            self.jobs.insert(
                job_id,
                Job::new(job_id, file.name.clone(), file.kind, file.size_bytes, at),
            );
            submitted.push((job_id, file));
        }
        if !submitted.is_empty() {
            self.mark_dirty();
        }
        submitted
    }

    pub(crate) fn select_tab(&mut self, tab: Tab) {
        if self.active_tab != tab {
            self.active_tab = tab;
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_progress(&mut self, job_id: JobId, stage: Stage, progress: f32) {
        if let Some(job) = self.jobs.get_mut(&job_id) {
            if job.apply_progress(stage, progress) {
                self.mark_dirty();
            }
        }
    }

    pub(crate) fn apply_done(&mut self, job_id: JobId, result: Result<ResultTable, String>) {
        if let Some(job) = self.jobs.get_mut(&job_id) {
            if job.apply_done(result) {
                self.mark_dirty();
            }
        }
    }

    /// Only completed jobs can be previewed; toggling the open one closes it.
    pub(crate) fn toggle_preview(&mut self, job_id: JobId) {
        let completed = self
            .jobs
            .get(&job_id)
            .is_some_and(|job| job.status() == JobStatus::Completed);
        if !completed {
            return;
        }
        self.previewed = if self.previewed == Some(job_id) {
            None
        } else {
            Some(job_id)
        };
        self.mark_dirty();
    }

    pub(crate) fn export_request(&self, job_id: JobId) -> Option<ExportRequest> {
        let job = self.jobs.get(&job_id)?;
        let table = job.result()?;
        Some(ExportRequest {
            job_id,
            source_name: job.name().to_string(),
            rows: table.to_rows(),
        })
    }

    pub(crate) fn export_all_requests(&self) -> Vec<ExportRequest> {
        self.completed_jobs()
            .filter_map(|job| self.export_request(job.id()))
            .collect()
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
