//! In-memory report model.
//!
//! ```text
//! Report
//!   └─ TaskReport (one per admitted task, admission order)
//!        └─ Diagnostic (addition order)
//!             └─ FileRange (zero or more)
//! ```

mod diagnostic;
mod model;
mod task_report;

pub use diagnostic::{Diagnostic, FileRange, Severity};
pub use model::{Report, TaskReportId};
pub use task_report::{Attachment, Diff, ReportStatus, TaskReport};
