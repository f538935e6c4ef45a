//! Report renderers. Each one reads the completed report through the ordering pipeline.

mod checkstyle;
mod codeclimate;
mod console;
mod file_xml;
mod github;
mod json;
mod task_xml;
mod xml;

pub use checkstyle::CheckstyleRenderer;
pub use codeclimate::CodeClimateRenderer;
pub use console::ConsoleRenderer;
pub use file_xml::FileXmlRenderer;
pub use github::GithubRenderer;
pub use json::JsonRenderer;
pub use task_xml::TaskXmlRenderer;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use qcheck_core::{FileRange, Report, Severity};
use tracing::info;

use crate::error::RenderError;
use crate::factory::build_renderer;

pub trait ReportRenderer: Send {
    fn name(&self) -> &str;

    /// File name under the output directory, or `None` for renderers that write to stdout.
    fn file_name(&self) -> Option<&str> {
        None
    }

    fn render(
        &self,
        report: &Report,
        minimum: Severity,
        out: &mut dyn Write,
    ) -> Result<(), RenderError>;
}

/// Render every named report. File renderers land in `output_dir`; the rest go to `stdout`.
///
/// Returns the paths of the files written.
pub fn write_reports(
    report: &Report,
    names: &[String],
    minimum: Severity,
    output_dir: &Path,
    stdout: &mut dyn Write,
) -> Result<Vec<PathBuf>, RenderError> {
    let mut written = Vec::new();
    for name in names {
        let renderer = build_renderer(name)?;
        match renderer.file_name() {
            Some(file_name) => {
                std::fs::create_dir_all(output_dir)?;
                let path = output_dir.join(file_name);
                let mut out = BufWriter::new(File::create(&path)?);
                renderer.render(report, minimum, &mut out)?;
                out.flush()?;
                info!(target: "qcheck::report", renderer = renderer.name(), path = %path.display(), "report written");
                written.push(path);
            }
            None => {
                renderer.render(report, minimum, stdout)?;
                stdout.flush()?;
            }
        }
    }
    Ok(written)
}

/// `line[:column]` of a range start, or `-` when the range covers the whole file.
pub(crate) fn position(range: &FileRange) -> String {
    match (range.start_line, range.start_column) {
        (Some(line), Some(column)) => format!("{line}:{column}"),
        (Some(line), None) => line.to_string(),
        _ => "-".to_string(),
    }
}
