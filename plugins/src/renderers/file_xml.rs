use std::io::Write;

use qcheck_core::{DiagnosticPipeline, Report, Severity};

use super::task_xml::report_open_tag;
use super::xml::{attr, diagnostic_element, DECLARATION};
use super::ReportRenderer;
use crate::error::RenderError;

/// One `<file>` element per file, preceded by a `<global>` element for range-less findings.
pub struct FileXmlRenderer;

impl ReportRenderer for FileXmlRenderer {
    fn name(&self) -> &str {
        "file-xml"
    }

    fn file_name(&self) -> Option<&str> {
        Some("file-report.xml")
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
            .sort_by_file_and_range()
            .then_sort_by_tool();
        let mut entries = pipeline.produce().peekable();

        // Range-less entries sort first.
        writeln!(out, "  <global>")?;
        while let Some(entry) = entries.next_if(|e| e.range.is_none()) {
            writeln!(out, "    {}", diagnostic_element(&entry, true, false))?;
        }
        writeln!(out, "  </global>")?;

        let mut open_file: Option<&str> = None;
        for entry in entries {
            let file = entry.file();
            if file != open_file {
                if open_file.is_some() {
                    writeln!(out, "  </file>")?;
                }
                writeln!(out, "  <file{}>", attr("name", file.unwrap_or_default()))?;
                open_file = file;
            }
            writeln!(out, "    {}", diagnostic_element(&entry, true, false))?;
        }
        if open_file.is_some() {
            writeln!(out, "  </file>")?;
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

    #[test]
    fn test_file_xml_groups_by_file() {
        let report = sample_report();
        let text = render_to_string(&FileXmlRenderer, &report, Severity::Info);
        let body: Vec<&str> = text.lines().skip(2).collect();

        let expected = vec![
            r#"  <global>"#,
            r#"    <diagnostic task="phpcs" severity="info">3 files checked</diagnostic>"#,
            r#"  </global>"#,
            r#"  <file name="src/a.php">"#,
            r#"    <diagnostic task="phpstan" severity="fatal">Syntax error</diagnostic>"#,
            r#"    <diagnostic task="phpcs" severity="minor" source="phpcs" start-line="12" end-line="12" end-column="140">Line exceeds 120 characters</diagnostic>"#,
            r#"  </file>"#,
            r#"  <file name="src/b.php">"#,
            r#"    <diagnostic task="phpstan" severity="major" source="phpstan" start-line="7" start-column="3">Undefined variable $x</diagnostic>"#,
            r#"  </file>"#,
            r#"</report>"#,
        ];
        assert_eq!(body, expected);
    }

    #[test]
    fn test_file_xml_keeps_empty_global() {
        let report = sample_report();
        let text = render_to_string(&FileXmlRenderer, &report, Severity::Major);
        assert!(text.contains("  <global>\n  </global>\n"));
    }
}
