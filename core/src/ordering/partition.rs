use std::iter::Peekable;

use super::criterion::{compare_chain, SortCriterion};
use super::entry::DiagnosticEntry;

/// Refines an already-sorted stream by one more criterion.
///
/// Only runs of entries that the upstream criteria consider equal are buffered and re-sorted;
/// everything else streams through. Upstream output going backwards is an ordering defect
/// and panics.
pub(crate) struct PartitionSort<'a, I>
where
    I: Iterator<Item = DiagnosticEntry<'a>>,
{
    input: Peekable<I>,
    parent: Vec<SortCriterion>,
    criterion: SortCriterion,
    partition: std::vec::IntoIter<DiagnosticEntry<'a>>,
}

impl<'a, I> PartitionSort<'a, I>
where
    I: Iterator<Item = DiagnosticEntry<'a>>,
{
    pub(crate) fn new(input: I, parent: Vec<SortCriterion>, criterion: SortCriterion) -> Self {
        Self {
            input: input.peekable(),
            parent,
            criterion,
            partition: Vec::new().into_iter(),
        }
    }

    fn next_partition(&mut self) -> Option<Vec<DiagnosticEntry<'a>>> {
        let first = self.input.next()?;
        let mut buffer = vec![first];

        while let Some(next) = self.input.peek() {
            let last = buffer[buffer.len() - 1];
            match compare_chain(&self.parent, &last, next) {
                std::cmp::Ordering::Equal => buffer.extend(self.input.next()),
                std::cmp::Ordering::Less => break,
                std::cmp::Ordering::Greater => panic!(
                    "diagnostic ordering violated: upstream stage sorted by {:?} went backwards \
                     between '{}' and '{}'",
                    self.parent, last.diagnostic.message, next.diagnostic.message
                ),
            }
        }

        let criterion = self.criterion;
        buffer.sort_by(|a, b| criterion.compare(a, b));
        Some(buffer)
    }
}

impl<'a, I> Iterator for PartitionSort<'a, I>
where
    I: Iterator<Item = DiagnosticEntry<'a>>,
{
    type Item = DiagnosticEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(entry) = self.partition.next() {
            return Some(entry);
        }
        self.partition = self.next_partition()?.into_iter();
        self.partition.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Diagnostic, FileRange, Report, ReportStatus, Severity};

    fn report() -> Report {
        let mut report = Report::new();
        let b = report.add_task_report("b").unwrap();
        report[b].add_diagnostic(
            Diagnostic::new(Severity::Info, "b2").with_file_range(FileRange::at("x.php", 2)),
        );
        let a = report.add_task_report("a").unwrap();
        report[a].add_diagnostic(
            Diagnostic::new(Severity::Info, "a1").with_file_range(FileRange::at("x.php", 1)),
        );
        report[a].close(ReportStatus::Passed);
        report[b].close(ReportStatus::Passed);
        report
    }

    #[test]
    fn test_partitions_are_resorted_locally() {
        let report = report();
        // Both entries share the file, so they form one partition re-sorted by range.
        let sorted = PartitionSort::new(
            crate::ordering::entry::enumerate(&report),
            vec![SortCriterion::File],
            SortCriterion::Range,
        );
        let messages: Vec<_> = sorted.map(|e| e.diagnostic.message.as_str()).collect();
        assert_eq!(messages, vec!["a1", "b2"]);
    }

    #[test]
    #[should_panic(expected = "diagnostic ordering violated")]
    fn test_unsorted_parent_panics() {
        let report = report();
        // Enumeration order is b, a: not sorted by tool.
        let sorted = PartitionSort::new(
            crate::ordering::entry::enumerate(&report),
            vec![SortCriterion::Tool],
            SortCriterion::Range,
        );
        let _ = sorted.count();
    }
}
