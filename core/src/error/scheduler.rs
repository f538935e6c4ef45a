use thiserror::Error;

use super::ReportError;

/// Errors surfaced by the task scheduler itself.
///
/// Failures raised by individual tasks never end up here: they are folded into the task's
/// report and the aggregate verdict.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("scheduler already run; a scheduler instance runs exactly once")]
    AlreadyRun,

    #[error("concurrency budget must be at least 1")]
    InvalidBudget,

    #[error("task '{task}' declares cost 0; costs must be at least 1")]
    InvalidCost { task: String },

    #[error("task '{task}' costs {cost} but the budget is {budget}; it can never be admitted")]
    CostExceedsBudget {
        task: String,
        cost: u32,
        budget: u32,
    },

    #[error("report error: {0}")]
    Report(#[from] ReportError),
}
