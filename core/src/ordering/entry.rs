use crate::report::{Diagnostic, FileRange, Report, TaskReport};

/// One (task, diagnostic, range) tuple of the ordered diagnostic stream.
///
/// A diagnostic with several file ranges yields one entry per range; a global diagnostic
/// yields a single entry without range.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticEntry<'a> {
    pub task: &'a TaskReport,
    pub diagnostic: &'a Diagnostic,
    pub range: Option<&'a FileRange>,
}

impl<'a> DiagnosticEntry<'a> {
    pub fn file(&self) -> Option<&'a str> {
        self.range.map(|r| r.file.as_str())
    }
}

/// Base enumeration: task reports in creation order, diagnostics in addition order,
/// ranges in addition order.
pub fn enumerate(report: &Report) -> impl Iterator<Item = DiagnosticEntry<'_>> + '_ {
    report.task_reports().iter().flat_map(|task| {
        task.diagnostics().iter().flat_map(move |diagnostic| {
            let global = diagnostic.file_ranges.is_empty().then_some(None);
            let ranges = diagnostic.file_ranges.iter().map(Some);
            global.into_iter().chain(ranges).map(move |range| DiagnosticEntry {
                task,
                diagnostic,
                range,
            })
        })
    })
}
