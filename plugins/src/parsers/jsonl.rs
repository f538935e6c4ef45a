use qcheck_core::{Diagnostic, FileRange, Severity};
use serde::Deserialize;

use super::OutputParser;

#[derive(Debug, Deserialize)]
struct JsonDiagnostic {
    #[serde(default)]
    severity: Option<String>,
    message: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default, alias = "external_info_url")]
    url: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    ranges: Vec<FileRange>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    column: Option<u32>,
}

/// Parses one JSON diagnostic object per line; anything else is skipped.
pub struct JsonlLineParser {
    source: String,
}

impl JsonlLineParser {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl OutputParser for JsonlLineParser {
    fn parse_line(&mut self, line: &str) -> Option<Diagnostic> {
        let line = line.trim();
        if !line.starts_with('{') {
            return None;
        }
        let raw: JsonDiagnostic = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::trace!(target: "qcheck::task", error = %e, "skipping malformed jsonl line");
                return None;
            }
        };

        let severity = raw
            .severity
            .as_deref()
            .and_then(|s| s.parse::<Severity>().ok())
            .unwrap_or(Severity::Major);

        let mut diagnostic = Diagnostic::new(severity, raw.message)
            .with_source(raw.source.unwrap_or_else(|| self.source.clone()));
        if let Some(url) = raw.url {
            diagnostic = diagnostic.with_external_info_url(url);
        }
        for category in raw.categories {
            diagnostic = diagnostic.with_category(category);
        }
        for range in raw.ranges {
            diagnostic = diagnostic.with_file_range(range);
        }
        if let Some(file) = raw.file {
            let mut range = FileRange::file(file);
            range.start_line = raw.line;
            range.start_column = raw.column;
            diagnostic = diagnostic.with_file_range(range);
        }

        Some(diagnostic)
    }
}
