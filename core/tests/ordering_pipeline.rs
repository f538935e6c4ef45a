use pretty_assertions::assert_eq;
use qcheck_core::ordering::DiagnosticPipeline;
use qcheck_core::{Diagnostic, FileRange, Report, ReportStatus, Severity};

fn describe(pipeline: &DiagnosticPipeline<'_>) -> Vec<String> {
    pipeline
        .produce()
        .map(|e| {
            let location = match e.range {
                None => "-".to_string(),
                Some(r) => format!(
                    "{}:{}:{}",
                    r.file,
                    r.start_line.map(|l| l.to_string()).unwrap_or_default(),
                    r.start_column.map(|c| c.to_string()).unwrap_or_default()
                ),
            };
            format!("{} {} {}", e.task.name(), location, e.diagnostic.message)
        })
        .collect()
}

fn report() -> Report {
    let mut report = Report::new();

    let phpcs = report.add_task_report("phpcs").unwrap();
    report[phpcs].add_diagnostic(
        Diagnostic::new(Severity::Minor, "line too long")
            .with_file_range(FileRange::at("src/b.php", 12).with_start_column(81)),
    );
    report[phpcs].add_diagnostic(
        Diagnostic::new(Severity::Minor, "missing doc")
            .with_file_range(FileRange::at("src/b.php", 12)),
    );
    report[phpcs].add_diagnostic(Diagnostic::new(Severity::Info, "standard PSR12"));
    report[phpcs].close(ReportStatus::Passed);

    let phpstan = report.add_task_report("phpstan").unwrap();
    report[phpstan].add_diagnostic(
        Diagnostic::new(Severity::Major, "duplicated code")
            .with_file_range(FileRange::at("src/b.php", 40).with_end(60, None))
            .with_file_range(FileRange::at("src/a.php", 3).with_end(23, None)),
    );
    report[phpstan].add_diagnostic(
        Diagnostic::new(Severity::Fatal, "whole file unreadable")
            .with_file_range(FileRange::file("src/a.php")),
    );
    report[phpstan].close(ReportStatus::Failed);

    report.complete().unwrap();
    report
}

#[test]
fn base_enumeration_duplicates_multi_range_diagnostics() {
    let report = report();
    let pipeline = DiagnosticPipeline::filter_by_minimum_severity(&report, Severity::None);
    assert_eq!(
        describe(&pipeline),
        vec![
            "phpcs src/b.php:12:81 line too long",
            "phpcs src/b.php:12: missing doc",
            "phpcs - standard PSR12",
            "phpstan src/b.php:40: duplicated code",
            "phpstan src/a.php:3: duplicated code",
            "phpstan src/a.php:: whole file unreadable",
        ]
    );
}

#[test]
fn minimum_severity_filter() {
    let report = report();
    let pipeline = DiagnosticPipeline::filter_by_minimum_severity(&report, Severity::Major);
    let entries: Vec<_> = pipeline.produce().collect();
    assert_eq!(entries.len(), 3);
    assert!(entries
        .iter()
        .all(|e| e.diagnostic.severity >= Severity::Major));
}

#[test]
fn file_and_range_then_tool() {
    let report = report();
    let pipeline = DiagnosticPipeline::filter_by_minimum_severity(&report, Severity::None)
        .sort_by_file_and_range()
        .then_sort_by_tool();
    assert_eq!(
        describe(&pipeline),
        vec![
            "phpcs - standard PSR12",
            "phpstan src/a.php:: whole file unreadable",
            "phpstan src/a.php:3: duplicated code",
            "phpcs src/b.php:12: missing doc",
            "phpcs src/b.php:12:81 line too long",
            "phpstan src/b.php:40: duplicated code",
        ]
    );
}

#[test]
fn tool_then_file_and_range() {
    let report = report();
    let pipeline = DiagnosticPipeline::filter_by_minimum_severity(&report, Severity::Minor)
        .sort_by_tool()
        .then_sort_by_file_and_range();
    assert_eq!(
        describe(&pipeline),
        vec![
            "phpcs src/b.php:12: missing doc",
            "phpcs src/b.php:12:81 line too long",
            "phpstan src/a.php:: whole file unreadable",
            "phpstan src/a.php:3: duplicated code",
            "phpstan src/b.php:40: duplicated code",
        ]
    );
}

#[test]
fn minor_threshold_over_every_severity_keeps_relative_order() {
    let shuffled = [
        Severity::Major,
        Severity::None,
        Severity::Fatal,
        Severity::Marginal,
        Severity::Info,
        Severity::Minor,
    ];
    assert!(Severity::ALL.iter().all(|s| shuffled.contains(s)));

    let mut report = Report::new();
    for (index, task) in ["lint", "types"].into_iter().enumerate() {
        let id = report.add_task_report(task).unwrap();
        for (n, severity) in shuffled.iter().enumerate() {
            let diagnostic = Diagnostic::new(*severity, format!("{task} {severity} {n}"));
            let diagnostic = if (n + index) % 2 == 0 {
                diagnostic.with_file_range(FileRange::at("src/a.php", n as u32 + 1))
            } else {
                diagnostic
            };
            report[id].add_diagnostic(diagnostic);
        }
        report[id].close(ReportStatus::Passed);
    }
    report.complete().unwrap();

    let pipeline = DiagnosticPipeline::filter_by_minimum_severity(&report, Severity::Minor);
    let messages: Vec<_> = pipeline
        .produce()
        .map(|e| e.diagnostic.message.clone())
        .collect();
    assert_eq!(
        messages,
        vec![
            "lint major 0",
            "lint fatal 2",
            "lint minor 5",
            "types major 0",
            "types fatal 2",
            "types minor 5",
        ]
    );
}
