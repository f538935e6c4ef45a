//! qcheck core: runs a list of analysis tasks under a cost budget and orders the
//! diagnostics they report.
//!
//! # Architecture
//!
//! ```text
//! Iterator<Task>
//!   ↓
//! Scheduler::run()            admission against the budget, polling, fast-finish drain
//!   ↓
//! Report { TaskReport { Diagnostic { FileRange } } }
//!   ↓
//! DiagnosticPipeline          severity filter → chained sort stages
//!   ↓
//! renderers (qcheck-plugins)
//! ```

pub mod config;
pub mod error;
pub mod ordering;
pub mod report;
pub mod scheduler;
pub mod task;

pub use error::{ConfigError, ReportError, SchedulerError};
pub use ordering::{DiagnosticEntry, DiagnosticPipeline};
pub use report::{Diagnostic, FileRange, Report, ReportStatus, Severity, TaskReport};
pub use scheduler::{RunEvent, RunObserver, Scheduler, SchedulerOpts};
pub use task::{BlockingTask, ParallelTask, Task};
