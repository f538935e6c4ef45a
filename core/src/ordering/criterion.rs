use std::cmp::Ordering;

use super::entry::DiagnosticEntry;

/// A single sort key of the ordering pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriterion {
    /// Task name.
    Tool,
    /// File path; entries without range sort before any file.
    File,
    /// Start line, start column, end line, end column; unset before set.
    Range,
}

impl SortCriterion {
    pub fn compare(&self, a: &DiagnosticEntry<'_>, b: &DiagnosticEntry<'_>) -> Ordering {
        match self {
            Self::Tool => a.task.name().cmp(b.task.name()),
            Self::File => a.file().cmp(&b.file()),
            Self::Range => match (a.range, b.range) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => (x.start_line, x.start_column, x.end_line, x.end_column)
                    .cmp(&(y.start_line, y.start_column, y.end_line, y.end_column)),
            },
        }
    }
}

/// Lexicographic comparison over a chain of criteria.
pub(crate) fn compare_chain(
    criteria: &[SortCriterion],
    a: &DiagnosticEntry<'_>,
    b: &DiagnosticEntry<'_>,
) -> Ordering {
    criteria
        .iter()
        .map(|c| c.compare(a, b))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}
