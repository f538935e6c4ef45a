//! Diagnostic ordering pipeline.
//!
//! Renderers read the completed [`Report`] through a chain of lazy stages: a minimum
//! severity filter at the root, then any number of sort stages. The first sort stage is the
//! primary key; every later stage only breaks ties left by the ones before it.
//!
//! ```text
//! Filter(min severity)                 enumerate + filter, streaming
//!   -> Sort(Tool)                      materialise once, stable sort
//!     -> Sort(File)                    re-sort runs equal by Tool
//!       -> Sort(Range)                 re-sort runs equal by (Tool, File)
//! ```
//!
//! ```
//! use qcheck_core::ordering::DiagnosticPipeline;
//! use qcheck_core::report::{Report, Severity};
//!
//! let mut report = Report::new();
//! report.complete().unwrap();
//! let entries = DiagnosticPipeline::filter_by_minimum_severity(&report, Severity::Minor)
//!     .sort_by_tool()
//!     .then_sort_by_file_and_range()
//!     .produce()
//!     .count();
//! assert_eq!(entries, 0);
//! ```

mod criterion;
mod entry;
mod partition;

pub use criterion::SortCriterion;
pub use entry::{enumerate, DiagnosticEntry};

use crate::report::{Report, Severity};

use partition::PartitionSort;

#[derive(Debug, Clone)]
enum Stage {
    Filter {
        threshold: Severity,
    },
    Sort {
        parent: Box<Stage>,
        criterion: SortCriterion,
    },
}

type EntryIter<'a> = Box<dyn Iterator<Item = DiagnosticEntry<'a>> + 'a>;

/// A composable, lazily evaluated view over a report's diagnostics.
///
/// Every call to [`produce`](Self::produce) re-derives the sequence from the report.
#[derive(Debug, Clone)]
pub struct DiagnosticPipeline<'a> {
    report: &'a Report,
    stage: Stage,
}

impl<'a> DiagnosticPipeline<'a> {
    /// Root stage: every entry whose severity is at least `threshold`, in report order.
    pub fn filter_by_minimum_severity(report: &'a Report, threshold: Severity) -> Self {
        Self {
            report,
            stage: Stage::Filter { threshold },
        }
    }

    /// Order by task name. Primary key when this is the first sort applied.
    pub fn sort_by_tool(self) -> Self {
        self.sort_by(SortCriterion::Tool)
    }

    /// Order by file, then by range. Primary key when this is the first sort applied.
    pub fn sort_by_file_and_range(self) -> Self {
        self.sort_by(SortCriterion::File)
            .sort_by(SortCriterion::Range)
    }

    /// Break remaining ties by task name.
    pub fn then_sort_by_tool(self) -> Self {
        self.sort_by_tool()
    }

    /// Break remaining ties by file, then by range.
    pub fn then_sort_by_file_and_range(self) -> Self {
        self.sort_by_file_and_range()
    }

    /// Append an arbitrary criterion to the chain.
    pub fn sort_by(self, criterion: SortCriterion) -> Self {
        Self {
            report: self.report,
            stage: Stage::Sort {
                parent: Box::new(self.stage),
                criterion,
            },
        }
    }

    /// Stream the ordered entries.
    pub fn produce(&self) -> impl Iterator<Item = DiagnosticEntry<'a>> + 'a {
        build(&self.stage, self.report).0
    }
}

/// Returns the stage's iterator and the criteria its output is already sorted by.
fn build<'a>(stage: &Stage, report: &'a Report) -> (EntryIter<'a>, Vec<SortCriterion>) {
    match stage {
        Stage::Filter { threshold } => {
            let threshold = *threshold;
            let iter = enumerate(report).filter(move |e| e.diagnostic.severity >= threshold);
            (Box::new(iter), Vec::new())
        }
        Stage::Sort { parent, criterion } => {
            let criterion = *criterion;
            let (input, established) = build(parent, report);

            let iter: EntryIter<'a> = if established.is_empty() {
                let mut all: Vec<_> = input.collect();
                all.sort_by(|a, b| criterion.compare(a, b));
                Box::new(all.into_iter())
            } else {
                Box::new(PartitionSort::new(input, established.clone(), criterion))
            };

            let mut sorted_by = established;
            sorted_by.push(criterion);
            (iter, sorted_by)
        }
    }
}
