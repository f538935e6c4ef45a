use std::ops::{Index, IndexMut};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ReportError;

use super::task_report::{ReportStatus, TaskReport};

/// Handle to a task report inside the [`Report`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskReportId(usize);

/// Result of one scheduler run.
///
/// Task reports are kept in admission order. Completion (timestamp and terminal status)
/// happens exactly once; afterwards the report is read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    run_id: String,
    status: ReportStatus,
    started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    tasks: Vec<TaskReport>,
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl Report {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            status: ReportStatus::Started,
            started_at: Utc::now(),
            completed_at: None,
            tasks: Vec::new(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn task_reports(&self) -> &[TaskReport] {
        &self.tasks
    }

    pub fn task_report(&self, name: &str) -> Option<&TaskReport> {
        self.tasks.iter().find(|t| t.name() == name)
    }

    /// Register a new task report in `Started` state.
    pub fn add_task_report(&mut self, name: impl Into<String>) -> Result<TaskReportId, ReportError> {
        if self.is_completed() {
            return Err(ReportError::Completed);
        }
        self.tasks.push(TaskReport::new(name));
        Ok(TaskReportId(self.tasks.len() - 1))
    }

    /// Logical AND over all task report statuses. An empty report passes.
    pub fn aggregate_status(&self) -> ReportStatus {
        if self.tasks.iter().all(TaskReport::is_passed) {
            ReportStatus::Passed
        } else {
            ReportStatus::Failed
        }
    }

    /// Stamp completion and fix the terminal status from the task reports.
    pub fn complete(&mut self) -> Result<ReportStatus, ReportError> {
        if self.is_completed() {
            return Err(ReportError::AlreadyCompleted);
        }
        self.status = self.aggregate_status();
        self.completed_at = Some(Utc::now());
        Ok(self.status)
    }
}

impl Index<TaskReportId> for Report {
    type Output = TaskReport;

    fn index(&self, id: TaskReportId) -> &TaskReport {
        &self.tasks[id.0]
    }
}

impl IndexMut<TaskReportId> for Report {
    fn index_mut(&mut self, id: TaskReportId) -> &mut TaskReport {
        &mut self.tasks[id.0]
    }
}
