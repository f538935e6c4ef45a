//! qcheck plugins: process-backed tasks, tool output parsers, report renderers and the
//! progress display.

pub mod error;
pub mod factory;
pub mod parsers;
pub mod progress;
pub mod renderers;
pub mod runner;
pub mod tasklist;

pub use error::{RenderError, TaskBuildError};
pub use factory::{build_renderer, RENDERER_NAMES};
pub use progress::ProgressObserver;
pub use renderers::{write_reports, ReportRenderer};
pub use runner::{ToolSpec, ToolTask};
pub use tasklist::{build_tasks, build_tool};
