use std::io::Write;

use qcheck_core::{DiagnosticEntry, DiagnosticPipeline, Report, Severity};
use serde::Serialize;
use uuid::Uuid;

use super::ReportRenderer;
use crate::error::RenderError;

/// CodeClimate issue list, as consumed by GitLab code quality widgets.
pub struct CodeClimateRenderer;

#[derive(Debug, Serialize)]
struct Issue<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    check_name: &'a str,
    description: &'a str,
    categories: Vec<&'a str>,
    severity: &'static str,
    fingerprint: String,
    location: Location<'a>,
}

#[derive(Debug, Serialize)]
struct Location<'a> {
    path: &'a str,
    lines: Lines,
}

#[derive(Debug, Serialize)]
struct Lines {
    begin: u32,
    end: u32,
}

fn severity_name(severity: Severity) -> &'static str {
    match severity {
        Severity::None | Severity::Info => "info",
        Severity::Marginal => "minor",
        Severity::Minor => "major",
        Severity::Major => "critical",
        Severity::Fatal => "blocker",
    }
}

/// Stable across runs for the same task, file, line and message.
fn fingerprint(entry: &DiagnosticEntry<'_>) -> String {
    let line = entry
        .range
        .and_then(|r| r.start_line)
        .map(|l| l.to_string())
        .unwrap_or_default();
    let key = [
        entry.task.name(),
        entry.file().unwrap_or_default(),
        line.as_str(),
        entry.diagnostic.message.as_str(),
    ]
    .join("\u{1f}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
        .simple()
        .to_string()
}

fn issue<'a>(entry: &DiagnosticEntry<'a>) -> Issue<'a> {
    let diagnostic = entry.diagnostic;
    let begin = entry.range.and_then(|r| r.start_line).unwrap_or(1);
    let end = entry.range.and_then(|r| r.end_line).unwrap_or(begin);
    let mut categories: Vec<&str> = diagnostic.categories.iter().map(String::as_str).collect();
    if categories.is_empty() {
        categories.push("Bug Risk");
    }

    Issue {
        kind: "issue",
        check_name: diagnostic.source.as_deref().unwrap_or(entry.task.name()),
        description: &diagnostic.message,
        categories,
        severity: severity_name(diagnostic.severity),
        fingerprint: fingerprint(entry),
        location: Location {
            path: entry.file().unwrap_or("."),
            lines: Lines { begin, end },
        },
    }
}

impl ReportRenderer for CodeClimateRenderer {
    fn name(&self) -> &str {
        "codeclimate"
    }

    fn file_name(&self) -> Option<&str> {
        Some("codeclimate.json")
    }

    fn render(
        &self,
        report: &Report,
        minimum: Severity,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        let issues: Vec<Issue<'_>> = DiagnosticPipeline::filter_by_minimum_severity(report, minimum)
            .sort_by_file_and_range()
            .then_sort_by_tool()
            .produce()
            .map(|entry| issue(&entry))
            .collect();

        serde_json::to_writer_pretty(&mut *out, &issues)?;
        writeln!(out)?;
        Ok(())
    }
}
