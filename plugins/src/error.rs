use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskBuildError {
    #[error("task '{task}': working directory {path} does not exist")]
    Workdir { task: String, path: PathBuf },

    #[error("task '{task}': invalid path pattern '{pattern}': {source}")]
    Pattern {
        task: String,
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown report format: {0}")]
    UnknownFormat(String),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
