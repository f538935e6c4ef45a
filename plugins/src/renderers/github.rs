use std::io::Write;

use qcheck_core::{DiagnosticPipeline, Report, Severity};

use super::ReportRenderer;
use crate::error::RenderError;

/// GitHub Actions workflow commands, one annotation per entry.
pub struct GithubRenderer;

fn command_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Fatal | Severity::Major => "error",
        Severity::Minor | Severity::Marginal => "warning",
        Severity::Info | Severity::None => "notice",
    }
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

impl ReportRenderer for GithubRenderer {
    fn name(&self) -> &str {
        "github"
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

        for entry in entries.produce() {
            let mut props = Vec::new();
            if let Some(range) = entry.range {
                props.push(format!("file={}", escape_property(&range.file)));
                let bounds = [
                    ("line", range.start_line),
                    ("col", range.start_column),
                    ("endLine", range.end_line),
                    ("endColumn", range.end_column),
                ];
                for (key, value) in bounds {
                    if let Some(value) = value {
                        props.push(format!("{key}={value}"));
                    }
                }
            }
            props.push(format!("title={}", escape_property(entry.task.name())));

            writeln!(
                out,
                "::{} {}::{}",
                command_for(entry.diagnostic.severity),
                props.join(","),
                escape_data(&entry.diagnostic.message)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::fixtures::{render_to_string, sample_report};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_github_annotations() {
        let report = sample_report();
        let text = render_to_string(&GithubRenderer, &report, Severity::Info);

        let expected = "\
::notice title=phpcs::3 files checked
::error file=src/a.php,title=phpstan::Syntax error
::warning file=src/a.php,line=12,endLine=12,endColumn=140,title=phpcs::Line exceeds 120 characters
::error file=src/b.php,line=7,col=3,title=phpstan::Undefined variable $x
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_github_escapes_messages() {
        assert_eq!(escape_data("50% done\nnext"), "50%25 done%0Anext");
        assert_eq!(escape_property("a:b,c"), "a%3Ab%2Cc");
    }
}
