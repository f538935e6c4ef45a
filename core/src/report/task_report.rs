use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diagnostic::Diagnostic;

/// Status shared by task reports and the run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Started,
    Passed,
    Failed,
}

impl ReportStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

/// An opaque artifact a task attaches to its report (e.g. the tool's stderr tail).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub mime_type: Option<String>,
    pub content: String,
}

/// A suggested change a task attaches to its report, in unified diff format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub name: String,
    pub content: String,
}

/// Per-task result record.
///
/// Created by the scheduler when the task is admitted and handed to the task on every call
/// until it finishes. Diagnostics, attachments and diffs are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    name: String,
    status: ReportStatus,
    started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
    diagnostics: Vec<Diagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    diffs: Vec<Diff>,
}

impl TaskReport {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ReportStatus::Started,
            started_at: Utc::now(),
            finished_at: None,
            diagnostics: Vec::new(),
            attachments: Vec::new(),
            diffs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn is_passed(&self) -> bool {
        self.status == ReportStatus::Passed
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn diffs(&self) -> &[Diff] {
        &self.diffs
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn add_diff(&mut self, diff: Diff) {
        self.diffs.push(diff);
    }

    /// Set the terminal status. Passing `Started` is ignored.
    pub fn close(&mut self, status: ReportStatus) {
        if !status.is_terminal() {
            return;
        }
        self.status = status;
        self.finished_at = Some(Utc::now());
    }

    /// Abnormal termination path, used by the scheduler only.
    pub(crate) fn force_failed(&mut self) {
        self.close(ReportStatus::Failed);
    }
}
