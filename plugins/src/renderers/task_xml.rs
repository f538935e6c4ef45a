use std::io::Write;

use qcheck_core::{DiagnosticEntry, DiagnosticPipeline, Report, Severity, TaskReport};

use super::xml::{attr, diagnostic_element, escape, opt_attr, DECLARATION};
use super::ReportRenderer;
use crate::error::RenderError;

/// One `<task>` element per task report, ordered by task name.
pub struct TaskXmlRenderer;

pub(crate) fn report_open_tag(report: &Report) -> String {
    format!(
        "<report{}{}{}{}>",
        attr("run-id", report.run_id()),
        attr("status", report.status().as_str()),
        attr("started-at", &report.started_at().to_rfc3339()),
        opt_attr("completed-at", report.completed_at().map(|t| t.to_rfc3339())),
    )
}

impl ReportRenderer for TaskXmlRenderer {
    fn name(&self) -> &str {
        "task-xml"
    }

    fn file_name(&self) -> Option<&str> {
        Some("task-report.xml")
    }

    fn render(
        &self,
        report: &Report,
        minimum: Severity,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        writeln!(out, "{DECLARATION}")?;
        writeln!(out, "{}", report_open_tag(report))?;

        let pipeline = DiagnosticPipeline::filter_by_minimum_severity(report, minimum)
            .sort_by_tool()
            .then_sort_by_file_and_range();
        let entries: Vec<DiagnosticEntry<'_>> = pipeline.produce().collect();

        // Same stable order the pipeline applies. Reports sharing a name stay separate
        // elements, each with only its own entries.
        let mut tasks: Vec<&TaskReport> = report.task_reports().iter().collect();
        tasks.sort_by(|a, b| a.name().cmp(b.name()));

        for task in tasks {
            writeln!(
                out,
                "  <task{}{}>",
                attr("name", task.name()),
                attr("status", task.status().as_str())
            )?;
            for entry in entries.iter().filter(|e| std::ptr::eq(e.task, task)) {
                writeln!(out, "    {}", diagnostic_element(entry, false, true))?;
            }
            for attachment in task.attachments() {
                writeln!(
                    out,
                    "    <attachment{}{}>{}</attachment>",
                    attr("name", &attachment.name),
                    opt_attr("mime-type", attachment.mime_type.as_deref()),
                    escape(&attachment.content)
                )?;
            }
            for diff in task.diffs() {
                writeln!(
                    out,
                    "    <diff{}>{}</diff>",
                    attr("name", &diff.name),
                    escape(&diff.content)
                )?;
            }
            writeln!(out, "  </task>")?;
        }

        writeln!(out, "</report>")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::fixtures::{render_to_string, sample_report};
    use pretty_assertions::assert_eq;
    use qcheck_core::report::{Attachment, Diff, ReportStatus};
    use qcheck_core::{Diagnostic, FileRange};

    #[test]
    fn test_task_xml_orders_by_tool_then_file() {
        let report = sample_report();
        let text = render_to_string(&TaskXmlRenderer, &report, Severity::Info);
        let body: Vec<&str> = text.lines().skip(2).collect();

        let expected = vec![
            r#"  <task name="phpcs" status="passed">"#,
            r#"    <diagnostic severity="info">3 files checked</diagnostic>"#,
            r#"    <diagnostic severity="minor" source="phpcs" file="src/a.php" start-line="12" end-line="12" end-column="140">Line exceeds 120 characters</diagnostic>"#,
            r#"  </task>"#,
            r#"  <task name="phpstan" status="failed">"#,
            r#"    <diagnostic severity="fatal" file="src/a.php">Syntax error</diagnostic>"#,
            r#"    <diagnostic severity="major" source="phpstan" file="src/b.php" start-line="7" start-column="3">Undefined variable $x</diagnostic>"#,
            r#"  </task>"#,
            r#"</report>"#,
        ];
        assert_eq!(body, expected);
        assert!(text.lines().nth(1).unwrap().contains(r#"status="failed""#));
    }

    #[test]
    fn test_task_xml_keeps_same_named_reports_apart() {
        let mut report = Report::new();
        for (file, line) in [("src/b.php", 1), ("src/a.php", 2)] {
            let id = report.add_task_report("lint").unwrap();
            report[id].add_diagnostic(
                Diagnostic::new(Severity::Minor, format!("{file} finding"))
                    .with_file_range(FileRange::at(file, line)),
            );
            report[id].close(ReportStatus::Passed);
        }
        report.complete().unwrap();

        let text = render_to_string(&TaskXmlRenderer, &report, Severity::Info);
        let body: Vec<&str> = text.lines().skip(2).collect();
        let expected = vec![
            r#"  <task name="lint" status="passed">"#,
            r#"    <diagnostic severity="minor" file="src/b.php" start-line="1">src/b.php finding</diagnostic>"#,
            r#"  </task>"#,
            r#"  <task name="lint" status="passed">"#,
            r#"    <diagnostic severity="minor" file="src/a.php" start-line="2">src/a.php finding</diagnostic>"#,
            r#"  </task>"#,
            r#"</report>"#,
        ];
        assert_eq!(body, expected);
    }

    #[test]
    fn test_task_xml_includes_attachments_and_diffs() {
        let mut report = Report::new();
        let id = report.add_task_report("fixer").unwrap();
        report[id].add_attachment(Attachment {
            name: "fixer.stderr.log".to_string(),
            mime_type: Some("text/plain".to_string()),
            content: "warn: <deprecated>".to_string(),
        });
        report[id].add_diff(Diff {
            name: "a.php".to_string(),
            content: "-a\n+b".to_string(),
        });
        report[id].close(ReportStatus::Passed);
        report.complete().unwrap();

        let text = render_to_string(&TaskXmlRenderer, &report, Severity::Info);
        assert!(text.contains(
            r#"<attachment name="fixer.stderr.log" mime-type="text/plain">warn: &lt;deprecated&gt;</attachment>"#
        ));
        assert!(text.contains(r#"<diff name="a.php">-a&#10;+b</diff>"#));
    }
}
