//! Single-flight background scan jobs.
//!
//! A [`ScanController`] owns at most one running job. The check-and-set in
//! [`ScanController::start`] and every later status transition happen under
//! one mutex, so two concurrent starts can never both succeed. The audit runs
//! in a worker task watched by a supervisor task; whatever the worker does
//! (finish, error out, panic) the supervisor records a terminal state.

use crate::audit::{AuditOutcome, Auditor, ScanRequest};
use crate::config::ScanSettings;
use crate::logbuffer::LogBuffer;
use crate::model::Issue;
use crate::report::{self, ReportError, ReportFormat, SavedReport};
use crate::rules::{RuleEngine, panic_message};
use chrono::{DateTime, Utc};
use lumen_scanner::error::ScanError;
use lumen_scanner::normalize::normalize_url;
use lumen_scanner::{CancellationToken, ExclusionMatcher, HttpFetcher};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("A scan is already running")]
    AlreadyRunning,

    #[error("No scan is running")]
    NotRunning,

    #[error("Invalid scan request: {0}")]
    InvalidRequest(#[from] ScanError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Idle,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Idle => "idle",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanJob {
    pub id: Uuid,
    pub status: JobStatus,
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub pages_scanned: usize,
    pub issues_found: usize,
}

#[derive(Default)]
struct JobState {
    job: Option<ScanJob>,
    cancel: Option<CancellationToken>,
    result: Option<Arc<Vec<Issue>>>,
    /// Target of the job that produced `result`.
    result_target: Option<String>,
}

struct Inner {
    auditor: Auditor,
    reports_dir: std::path::PathBuf,
    state: Mutex<JobState>,
    status_tx: watch::Sender<JobStatus>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, JobState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn finish(&self, id: Uuid, outcome: Result<AuditOutcome, String>) {
        let mut guard = self.lock();
        let state = &mut *guard;
        let Some(job) = state.job.as_mut().filter(|job| job.id == id) else {
            return;
        };

        job.finished_at = Some(Utc::now());
        match outcome {
            Ok(outcome) => {
                job.status = JobStatus::Done;
                job.pages_scanned = outcome.pages_scanned();
                job.issues_found = outcome.issues.len();
                state.result = Some(Arc::new(outcome.issues));
                state.result_target = Some(job.target.clone());
                info!(
                    "Scan {} finished: {} pages, {} issues",
                    id, job.pages_scanned, job.issues_found
                );
            }
            Err(message) => {
                error!("Scan {} failed: {}", id, message);
                self.auditor
                    .log()
                    .push(format!("[scan] failed: {}", message));
                job.status = JobStatus::Failed;
                job.error = Some(message);
            }
        }
        state.cancel = None;
        self.status_tx.send_replace(job.status);
    }
}

/// Owns the current scan job and the most recent completed result.
#[derive(Clone)]
pub struct ScanController {
    inner: Arc<Inner>,
}

impl ScanController {
    pub fn new(auditor: Auditor) -> Self {
        let reports_dir = auditor.settings().reports_dir.clone();
        let (status_tx, _) = watch::channel(JobStatus::Idle);
        Self {
            inner: Arc::new(Inner {
                auditor,
                reports_dir,
                state: Mutex::new(JobState::default()),
                status_tx,
            }),
        }
    }

    /// Controller backed by the reqwest fetcher and the standard rule set,
    /// or the extended one when `settings.structure_checks` is set.
    pub fn from_settings(settings: ScanSettings) -> Result<Self, ScanError> {
        let fetcher = HttpFetcher::with_timeout(
            settings.fetch_timeout.as_secs().max(1),
            &settings.user_agent,
        )?;
        let log = Arc::new(LogBuffer::new(settings.log_capacity));
        let engine = if settings.structure_checks {
            RuleEngine::extended()
        } else {
            RuleEngine::standard()
        };
        let auditor = Auditor::new(Arc::new(fetcher), Arc::new(engine), log)
            .with_settings(settings);
        Ok(Self::new(auditor))
    }

    pub fn auditor(&self) -> &Auditor {
        &self.inner.auditor
    }

    pub fn log(&self) -> &Arc<LogBuffer> {
        self.inner.auditor.log()
    }

    /// Starts a background scan and returns its job id.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// [`ControllerError::AlreadyRunning`] while another job is running, and
    /// with [`ControllerError::InvalidRequest`] for an unparseable URL or
    /// exclusion pattern; neither failure touches the current job.
    pub fn start(&self, request: ScanRequest) -> Result<Uuid, ControllerError> {
        normalize_url(&request.url)?;
        ExclusionMatcher::new(&request.exclude)?;

        let (id, cancel) = {
            let mut state = self.inner.lock();
            if state
                .job
                .as_ref()
                .is_some_and(|job| job.status == JobStatus::Running)
            {
                return Err(ControllerError::AlreadyRunning);
            }

            let id = Uuid::new_v4();
            let cancel = CancellationToken::new();
            state.job = Some(ScanJob {
                id,
                status: JobStatus::Running,
                target: request.url.clone(),
                started_at: Utc::now(),
                finished_at: None,
                error: None,
                pages_scanned: 0,
                issues_found: 0,
            });
            state.cancel = Some(cancel.clone());
            self.inner.status_tx.send_replace(JobStatus::Running);
            (id, cancel)
        };

        info!("Scan {} started for {}", id, request.url);

        let worker_inner = Arc::clone(&self.inner);
        let worker =
            tokio::spawn(async move { worker_inner.auditor.run(&request, cancel).await });

        let supervisor_inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = match worker.await {
                Ok(Ok(outcome)) => Ok(outcome),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) if e.is_panic() => Err(format!(
                    "Scan worker panicked: {}",
                    panic_message(e.into_panic().as_ref())
                )),
                Err(_) => Err("Scan worker was aborted".to_string()),
            };
            supervisor_inner.finish(id, outcome);
        });

        Ok(id)
    }

    /// Snapshot of the current (or last) job.
    pub fn status(&self) -> Option<ScanJob> {
        self.inner.lock().job.clone()
    }

    pub fn job_status(&self) -> JobStatus {
        self.inner
            .lock()
            .job
            .as_ref()
            .map(|job| job.status)
            .unwrap_or(JobStatus::Idle)
    }

    pub fn is_running(&self) -> bool {
        self.job_status() == JobStatus::Running
    }

    /// Issues of the most recent job that reached `Done`.
    pub fn result(&self) -> Option<Arc<Vec<Issue>>> {
        self.inner.lock().result.clone()
    }

    /// Target URL of the job behind [`ScanController::result`].
    pub fn last_target(&self) -> Option<String> {
        self.inner.lock().result_target.clone()
    }

    /// Asks the running job to stop. Pages fetched so far are still audited
    /// and the job ends as `Done` with a partial result.
    pub fn cancel(&self) -> Result<(), ControllerError> {
        let state = self.inner.lock();
        match (&state.job, &state.cancel) {
            (Some(job), Some(token)) if job.status == JobStatus::Running => {
                info!("Cancelling scan {}", job.id);
                token.cancel();
                Ok(())
            }
            _ => Err(ControllerError::NotRunning),
        }
    }

    /// Resolves once no job is running.
    pub async fn wait(&self) -> JobStatus {
        let mut rx = self.inner.status_tx.subscribe();
        match rx.wait_for(|status| *status != JobStatus::Running).await {
            Ok(status) => *status,
            Err(_) => self.job_status(),
        }
    }

    /// Renders the latest result and writes it to the reports directory.
    pub fn export(&self, format: ReportFormat) -> Result<SavedReport, ReportError> {
        let (issues, target) = {
            let state = self.inner.lock();
            match (&state.result, &state.result_target) {
                (Some(issues), Some(target)) => (Arc::clone(issues), target.clone()),
                _ => return Err(ReportError::NoData),
            }
        };
        let saved = report::save_report(&self.inner.reports_dir, format, &issues, &target)?;
        info!("Report written to {}", saved.path.display());
        Ok(saved)
    }
}
