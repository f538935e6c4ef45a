use std::io::Write;

use qcheck_core::{DiagnosticPipeline, Report, Severity};

use super::xml::{attr, opt_attr, DECLARATION};
use super::ReportRenderer;
use crate::error::RenderError;

/// Checkstyle XML. Global diagnostics go under a `<file>` named after the reporting task.
pub struct CheckstyleRenderer;

fn severity_name(severity: Severity) -> &'static str {
    match severity {
        Severity::Fatal | Severity::Major => "error",
        Severity::Minor | Severity::Marginal => "warning",
        Severity::Info => "info",
        Severity::None => "ignore",
    }
}

impl ReportRenderer for CheckstyleRenderer {
    fn name(&self) -> &str {
        "checkstyle"
    }

    fn file_name(&self) -> Option<&str> {
        Some("checkstyle.xml")
    }

    fn render(
        &self,
        report: &Report,
        minimum: Severity,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        writeln!(out, "{DECLARATION}")?;
        writeln!(out, r#"<checkstyle version="4.3">"#)?;

        let entries = DiagnosticPipeline::filter_by_minimum_severity(report, minimum)
            .sort_by_file_and_range()
            .then_sort_by_tool();

        let mut open_file: Option<&str> = None;
        for entry in entries.produce() {
            let group = entry.file().unwrap_or(entry.task.name());
            if open_file != Some(group) {
                if open_file.is_some() {
                    writeln!(out, "  </file>")?;
                }
                writeln!(out, "  <file{}>", attr("name", group))?;
                open_file = Some(group);
            }

            let range = entry.range;
            let diagnostic = entry.diagnostic;
            writeln!(
                out,
                "    <error{}{}{}{}{}/>",
                opt_attr("line", range.and_then(|r| r.start_line)),
                opt_attr("column", range.and_then(|r| r.start_column)),
                attr("severity", severity_name(diagnostic.severity)),
                attr("message", &diagnostic.message),
                attr(
                    "source",
                    diagnostic.source.as_deref().unwrap_or(entry.task.name())
                ),
            )?;
        }
        if open_file.is_some() {
            writeln!(out, "  </file>")?;
        }

        writeln!(out, "</checkstyle>")?;
        Ok(())
    }
}
