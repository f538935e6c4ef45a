use crate::report::ReportStatus;

/// Run lifecycle events emitted by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    RunStart {
        budget: u32,
    },
    TaskAdmitted {
        task: String,
        /// `None` for blocking tasks, which run outside the budget.
        cost: Option<u32>,
        running_cost: u32,
    },
    TaskFinished {
        task: String,
        status: ReportStatus,
        duration_ms: u64,
    },
    /// Emitted once when a failure stops further admissions.
    Stopping {
        task: String,
    },
    RunEnd {
        success: bool,
        duration_ms: u64,
    },
}

/// Receives scheduler events (progress display, event logs, tests).
pub trait RunObserver: Send + Sync {
    fn on_event(&self, event: &RunEvent);
}
