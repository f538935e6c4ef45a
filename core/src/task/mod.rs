//! Schedulable units of work.
//!
//! A task is either *blocking* (runs to completion once started, exclusively) or *parallel*
//! (started, then polled until it reports completion; occupies `cost` units of the
//! concurrency budget while active).
//!
//! Task methods return `anyhow::Result`. An `Err` means the task implementation itself broke;
//! a tool that ran and found problems reports that through its [`TaskReport`] status instead.

use async_trait::async_trait;

use crate::report::TaskReport;

/// A task polled to completion alongside other parallel tasks.
pub trait ParallelTask: Send {
    fn name(&self) -> &str;

    /// Budget units this task occupies while active. Must be at least 1 and must not change.
    fn cost(&self) -> u32 {
        1
    }

    /// Kick off the work. Must not block.
    fn start(&mut self, report: &mut TaskReport) -> anyhow::Result<()>;

    /// Make progress without blocking. Returns `true` while still running, `false` once done.
    fn poll(&mut self, report: &mut TaskReport) -> anyhow::Result<bool>;
}

/// A task that must run alone; the scheduler awaits it inline.
#[async_trait]
pub trait BlockingTask: Send {
    fn name(&self) -> &str;

    async fn run(&mut self, report: &mut TaskReport) -> anyhow::Result<()>;
}

pub enum Task {
    Blocking(Box<dyn BlockingTask>),
    Parallel(Box<dyn ParallelTask>),
}

impl Task {
    pub fn blocking(task: impl BlockingTask + 'static) -> Self {
        Self::Blocking(Box::new(task))
    }

    pub fn parallel(task: impl ParallelTask + 'static) -> Self {
        Self::Parallel(Box::new(task))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Blocking(task) => task.name(),
            Self::Parallel(task) => task.name(),
        }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, Self::Parallel(_))
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocking(task) => f.debug_tuple("Blocking").field(&task.name()).finish(),
            Self::Parallel(task) => f
                .debug_struct("Parallel")
                .field("name", &task.name())
                .field("cost", &task.cost())
                .finish(),
        }
    }
}
