pub mod audit;
pub mod config;
pub mod controller;
pub mod dedupe;
pub mod logbuffer;
pub mod model;
pub mod report;
pub mod rules;

pub use audit::{AuditOutcome, Auditor, ScanRequest, audit_markup};
pub use config::ScanSettings;
pub use controller::{ControllerError, JobStatus, ScanController, ScanJob};
pub use dedupe::dedupe;
pub use logbuffer::LogBuffer;
pub use model::{ElementKind, Issue, IssueKind};
pub use report::{ReportError, ReportFormat};
pub use rules::RuleEngine;
