use std::io::Write;

use qcheck_core::{DiagnosticPipeline, Report, Severity};

use super::{position, ReportRenderer};
use crate::error::RenderError;

/// Human-readable listing grouped by file, followed by a per-task summary and the verdict.
pub struct ConsoleRenderer;

impl ReportRenderer for ConsoleRenderer {
    fn name(&self) -> &str {
        "console"
    }

    fn render(
        &self,
        report: &Report,
        minimum: Severity,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        let entries = DiagnosticPipeline::filter_by_minimum_severity(report, minimum)
            .sort_by_file_and_range()
            .then_sort_by_tool();

        let mut current_file: Option<Option<&str>> = None;
        for entry in entries.produce() {
            let file = entry.file();
            if current_file != Some(file) {
                writeln!(out, "{}", file.unwrap_or("(global)"))?;
                current_file = Some(file);
            }
            match entry.range {
                Some(range) => write!(out, "  {} ", position(range))?,
                None => write!(out, "  ")?,
            }
            writeln!(
                out,
                "{} [{}] {}",
                entry.diagnostic.severity,
                entry.task.name(),
                entry.diagnostic.message
            )?;
        }
        if current_file.is_some() {
            writeln!(out)?;
        }

        let mut passed = 0;
        for task in report.task_reports() {
            let count = task.diagnostics().len();
            writeln!(
                out,
                "{}: {} ({} diagnostic{})",
                task.name(),
                task.status().as_str(),
                count,
                if count == 1 { "" } else { "s" }
            )?;
            if task.is_passed() {
                passed += 1;
            }
        }
        writeln!(
            out,
            "{}: {} of {} tasks passed",
            report.status().as_str().to_uppercase(),
            passed,
            report.task_reports().len()
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::fixtures::{render_to_string, sample_report};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_console_groups_by_file() {
        let report = sample_report();
        let text = render_to_string(&ConsoleRenderer, &report, Severity::Info);

        let expected = "\
(global)
  info [phpcs] 3 files checked
src/a.php
  - fatal [phpstan] Syntax error
  12 minor [phpcs] Line exceeds 120 characters
src/b.php
  7:3 major [phpstan] Undefined variable $x

phpstan: failed (2 diagnostics)
phpcs: passed (2 diagnostics)
FAILED: 1 of 2 tasks passed
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_console_threshold_hides_low_severities() {
        let report = sample_report();
        let text = render_to_string(&ConsoleRenderer, &report, Severity::Fatal);

        assert!(text.starts_with("src/a.php\n  - fatal [phpstan] Syntax error\n\n"));
        assert!(!text.contains("(global)"));
    }
}
