#[allow(clippy::module_inception)]
pub mod error;
pub mod scheduler;

pub use error::{ConfigError, ReportError};
pub use scheduler::SchedulerError;
