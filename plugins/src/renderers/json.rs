use std::io::Write;

use qcheck_core::{Report, Severity};

use super::ReportRenderer;
use crate::error::RenderError;

/// The whole report, unfiltered, as pretty-printed JSON.
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn file_name(&self) -> Option<&str> {
        Some("report.json")
    }

    fn render(
        &self,
        report: &Report,
        _minimum: Severity,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        Ok(())
    }
}
