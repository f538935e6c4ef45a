use qcheck_core::{ConfigError, SchedulerError};
use qcheck_plugins::{RenderError, TaskBuildError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("task list error: {0}")]
    TaskBuild(#[from] TaskBuildError),

    #[error("report error: {0}")]
    Render(#[from] RenderError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code.
    ///
    /// 0 success, 1 aggregate failure (not an error), 11 configuration, 20 task list or io,
    /// 50 internal.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Logging(_) | Self::UnknownTask(_) => 11,
            Self::Render(RenderError::UnknownFormat(_)) => 11,
            Self::TaskBuild(_) | Self::Render(_) | Self::Io(_) => 20,
            Self::Scheduler(_) => 50,
        }
    }
}
