use std::sync::OnceLock;

use qcheck_core::{Diagnostic, FileRange, Severity};
use regex::Regex;

use super::OutputParser;

/// Severity of lines that do not name one, as in GNU tooling.
const DEFAULT_SEVERITY: Severity = Severity::Major;

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<file>[^:\s][^:]*):(?P<line>\d+)(?::(?P<col>\d+))?:\s*(?:(?P<sev>[A-Za-z]+):\s*)?(?P<msg>\S.*)$",
        )
        .expect("static regex")
    })
}

/// Parses `file:line[:column]: [severity:] message` lines.
pub struct GnuLineParser {
    source: String,
}

impl GnuLineParser {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl OutputParser for GnuLineParser {
    fn parse_line(&mut self, line: &str) -> Option<Diagnostic> {
        let caps = line_regex().captures(line.trim_end())?;

        let file = caps.name("file")?.as_str();
        let line_no = caps.name("line")?.as_str().parse::<u32>().ok()?;
        let mut range = FileRange::at(file, line_no);
        if let Some(col) = caps.name("col").and_then(|c| c.as_str().parse::<u32>().ok()) {
            range = range.with_start_column(col);
        }

        let msg = caps.name("msg")?.as_str();
        let (severity, message) = match caps.name("sev") {
            Some(sev) => match sev.as_str().parse::<Severity>() {
                Ok(severity) => (severity, msg.to_string()),
                // Not a severity after all, e.g. "Undefined: variable".
                Err(_) => (DEFAULT_SEVERITY, format!("{}: {}", sev.as_str(), msg)),
            },
            None => (DEFAULT_SEVERITY, msg.to_string()),
        };

        Some(
            Diagnostic::new(severity, message)
                .with_source(self.source.clone())
                .with_file_range(range),
        )
    }
}
