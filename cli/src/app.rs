use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use qcheck_core::config::{self, AppConfig};
use qcheck_core::{Report, Scheduler, SchedulerOpts};
use qcheck_plugins::{build_tasks, write_reports, ProgressObserver, RENDERER_NAMES};
use tracing::{info, warn};

use crate::commands::cli::RunArgs;
use crate::error::CliError;

/// Fold command line options into the loaded configuration and re-validate it.
pub fn apply_overrides(cfg: &mut AppConfig, run: &RunArgs) -> Result<(), CliError> {
    if let Some(threads) = run.threads {
        cfg.run.threads = threads;
    }
    if run.fast_finish {
        cfg.run.fast_finish = true;
    }
    if !run.reports.is_empty() {
        cfg.run.reports = run.reports.clone();
    }
    if let Some(dir) = &run.output_dir {
        cfg.run.output_dir = dir.to_string_lossy().to_string();
    }
    if let Some(severity) = run.minimum_severity {
        cfg.run.minimum_severity = severity;
    }
    select_tasks(cfg, &run.tasks)?;
    config::validate(cfg)?;
    Ok(())
}

/// Keep only the named tasks enabled. An empty selection keeps the configuration as is.
pub fn select_tasks(cfg: &mut AppConfig, names: &[String]) -> Result<(), CliError> {
    if names.is_empty() {
        return Ok(());
    }
    if let Some(unknown) = names
        .iter()
        .find(|name| !cfg.tasks.iter().any(|t| &t.name == *name))
    {
        return Err(CliError::UnknownTask(unknown.clone()));
    }
    for task in &mut cfg.tasks {
        task.enabled = names.contains(&task.name);
    }
    Ok(())
}

/// Whether the progress display would be readable: an interactive stderr and no CI
/// annotation stream sharing the terminal.
pub fn progress_wanted(cfg: &AppConfig, run: &RunArgs) -> bool {
    !run.no_progress
        && atty::is(atty::Stream::Stderr)
        && !cfg.run.reports.iter().any(|r| r == "github")
}

/// Run every enabled task, render the configured reports and map the verdict to an exit code.
pub async fn run_checks(
    cfg: &AppConfig,
    progress: bool,
    stdout: &mut dyn Write,
) -> Result<i32, CliError> {
    let tasks = build_tasks(cfg)?;
    let total = tasks.len();
    info!(tasks = total, budget = cfg.run.threads, "starting run");

    let opts = SchedulerOpts {
        budget: cfg.run.threads,
        fast_finish: cfg.run.fast_finish,
        idle_wait: Duration::from_millis(cfg.run.idle_wait_ms),
    };
    let mut scheduler = Scheduler::new(tasks, opts)?
        .with_observer(Arc::new(ProgressObserver::new(total, progress)));

    let mut report = Report::new();
    let outcome = scheduler.run(&mut report).await;
    drop(scheduler);

    // The report is completed even when the run ends in an error; render what was collected.
    let written = write_reports(
        &report,
        &cfg.run.reports,
        cfg.run.minimum_severity,
        Path::new(&cfg.run.output_dir),
        stdout,
    )?;
    for path in &written {
        info!(path = %path.display(), "report file written");
    }

    let success = outcome?;
    if !success {
        warn!(run_id = report.run_id(), "run failed");
    }
    Ok(if success { 0 } else { 1 })
}

/// Where the log file goes: `logging.directory` when set, else `<run.output_dir>/logs`.
pub fn log_directory(cfg: &AppConfig) -> PathBuf {
    match cfg
        .logging
        .directory
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(&cfg.run.output_dir).join("logs"),
    }
}

pub fn list_tasks(cfg: &AppConfig, out: &mut dyn Write) -> std::io::Result<()> {
    for task in &cfg.tasks {
        let mode = if task.parallel {
            format!("cost {}", task.cost)
        } else {
            "exclusive".to_string()
        };
        let state = if task.enabled { "" } else { " (disabled)" };
        writeln!(
            out,
            "{}: {} {} [{}]{}",
            task.name,
            task.command,
            task.args.join(" "),
            mode,
            state
        )?;
    }
    Ok(())
}

pub fn list_formats(out: &mut dyn Write) -> std::io::Result<()> {
    for name in RENDERER_NAMES {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qcheck_core::config::TaskConfig;
    use qcheck_core::Severity;

    fn two_tasks() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.run.threads = 2;
        cfg.tasks.push(TaskConfig::new("phpcs", "phpcs"));
        let mut composer = TaskConfig::new("composer", "composer");
        composer.args = vec!["validate".to_string()];
        composer.parallel = false;
        cfg.tasks.push(composer);
        cfg
    }

    #[test]
    fn test_apply_overrides() {
        let mut cfg = two_tasks();
        let run = RunArgs {
            threads: Some(4),
            fast_finish: true,
            reports: vec!["checkstyle".to_string()],
            minimum_severity: Some(Severity::Major),
            tasks: vec!["composer".to_string()],
            ..RunArgs::default()
        };
        apply_overrides(&mut cfg, &run).unwrap();

        assert_eq!(cfg.run.threads, 4);
        assert!(cfg.run.fast_finish);
        assert_eq!(cfg.run.reports, vec!["checkstyle"]);
        assert_eq!(cfg.run.minimum_severity, Severity::Major);
        assert!(!cfg.tasks[0].enabled);
        assert!(cfg.tasks[1].enabled);
    }

    #[test]
    fn test_overrides_are_validated() {
        let mut cfg = two_tasks();
        let run = RunArgs {
            threads: Some(0),
            ..RunArgs::default()
        };
        assert!(matches!(
            apply_overrides(&mut cfg, &run),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_task_selection() {
        let mut cfg = two_tasks();
        let err = select_tasks(&mut cfg, &["psalm".to_string()]).unwrap_err();
        assert!(matches!(err, CliError::UnknownTask(name) if name == "psalm"));
    }

    #[test]
    fn test_log_directory_defaults_under_output_dir() {
        let mut cfg = AppConfig::default();
        cfg.run.output_dir = "build/qa".to_string();
        assert_eq!(log_directory(&cfg), Path::new("build/qa").join("logs"));

        cfg.logging.directory = Some("  ".to_string());
        assert_eq!(log_directory(&cfg), Path::new("build/qa").join("logs"));

        cfg.logging.directory = Some("/var/log/qcheck".to_string());
        assert_eq!(log_directory(&cfg), PathBuf::from("/var/log/qcheck"));
    }

    #[test]
    fn test_list_tasks() {
        let mut cfg = two_tasks();
        cfg.tasks[0].enabled = false;
        let mut out = Vec::new();
        list_tasks(&cfg, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "phpcs: phpcs  [cost 1] (disabled)\ncomposer: composer validate [exclusive]\n"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_checks_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = AppConfig::default();
        cfg.run.threads = 2;
        cfg.run.workdir = dir.path().to_string_lossy().to_string();
        cfg.run.output_dir = dir.path().join("out").to_string_lossy().to_string();
        cfg.run.reports = vec!["console".to_string(), "json".to_string()];
        let mut ok = TaskConfig::new("ok", "sh");
        ok.args = vec!["-c".to_string(), "echo 'a.php:1: warning: w'".to_string()];
        cfg.tasks.push(ok);

        let mut out = Vec::new();
        assert_eq!(run_checks(&cfg, false, &mut out).await.unwrap(), 0);
        assert!(dir.path().join("out/report.json").is_file());
        assert!(String::from_utf8(out).unwrap().contains("PASSED"));

        let mut bad = TaskConfig::new("bad", "sh");
        bad.args = vec!["-c".to_string(), "exit 1".to_string()];
        cfg.tasks.push(bad);
        let mut out = Vec::new();
        assert_eq!(run_checks(&cfg, false, &mut out).await.unwrap(), 1);
    }
}
