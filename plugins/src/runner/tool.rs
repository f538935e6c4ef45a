use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use qcheck_core::report::{Attachment, ReportStatus};
use qcheck_core::{BlockingTask, Diagnostic, ParallelTask, Severity, TaskReport};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, trace};

use super::io_pump::{pump, LineStream, LineTap};
use super::ring::RingBytes;
use crate::parsers::OutputParser;

const TARGET: &str = "qcheck::task";
const LINE_CHANNEL_CAPACITY: usize = 1024;

/// Everything needed to launch one tool and judge its outcome.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub workdir: PathBuf,
    pub cost: u32,
    pub success_exit_codes: Vec<i32>,
    pub fail_on: Option<Severity>,
    pub capture_bytes: usize,
}

struct RunningProcess {
    child: Child,
    lines: mpsc::Receiver<LineTap>,
    lines_open: bool,
    stderr_tail: Arc<RingBytes>,
    exit: Option<ExitStatus>,
    started: Instant,
}

/// An external analysis tool run as a child process.
///
/// Usable as a parallel task (spawned, then polled without blocking) or as a blocking task
/// (spawned and awaited inline).
pub struct ToolTask {
    spec: ToolSpec,
    parser: Box<dyn OutputParser>,
    process: Option<RunningProcess>,
}

impl ToolTask {
    pub fn new(spec: ToolSpec, parser: Box<dyn OutputParser>) -> Self {
        Self {
            spec,
            parser,
            process: None,
        }
    }

    pub fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn spawn(&mut self) -> Result<()> {
        if self.process.is_some() {
            anyhow::bail!("task '{}' started twice", self.spec.name);
        }

        info!(
            target: TARGET,
            task = %self.spec.name,
            program = %self.spec.program,
            args = ?self.spec.args,
            workdir = %self.spec.workdir.display(),
            "spawning tool"
        );

        let mut child = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .envs(&self.spec.env)
            .current_dir(&self.spec.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn '{}' for task '{}'", self.spec.program, self.spec.name))?;

        let stdout = child.stdout.take().context("child stdout not captured")?;
        let stderr = child.stderr.take().context("child stderr not captured")?;

        let (line_tx, lines) = mpsc::channel(LINE_CHANNEL_CAPACITY);
        let stderr_tail = RingBytes::new(self.spec.capture_bytes);
        pump(
            stdout,
            LineStream::Stdout,
            None,
            line_tx.clone(),
            self.spec.name.clone(),
        );
        pump(
            stderr,
            LineStream::Stderr,
            Some(stderr_tail.clone()),
            line_tx,
            self.spec.name.clone(),
        );

        self.process = Some(RunningProcess {
            child,
            lines,
            lines_open: true,
            stderr_tail,
            exit: None,
            started: Instant::now(),
        });
        Ok(())
    }

    /// Record the exit, attach the stderr tail and close the report.
    fn conclude(&mut self, report: &mut TaskReport) -> Result<()> {
        let process = self.process.as_ref().context("task concluded before start")?;
        let status = process.exit.context("task concluded before exit")?;
        let exit_code = status.code().unwrap_or(-1);

        if !process.stderr_tail.is_empty() {
            report.add_attachment(Attachment {
                name: format!("{}.stderr.log", self.spec.name),
                mime_type: Some("text/plain".to_string()),
                content: process.stderr_tail.to_string_lossy(),
            });
        }

        let exit_ok = self.spec.success_exit_codes.contains(&exit_code);
        if !exit_ok && report.diagnostics().is_empty() {
            report.add_diagnostic(
                Diagnostic::new(
                    Severity::Fatal,
                    format!("{} exited with code {}", self.spec.program, exit_code),
                )
                .with_source(self.spec.name.clone()),
            );
        }

        let threshold_hit = self.spec.fail_on.is_some_and(|threshold| {
            report
                .diagnostics()
                .iter()
                .any(|d| d.severity >= threshold)
        });

        let outcome = if exit_ok && !threshold_hit {
            ReportStatus::Passed
        } else {
            ReportStatus::Failed
        };
        report.close(outcome);

        debug!(
            target: TARGET,
            task = %self.spec.name,
            exit_code,
            status = outcome.as_str(),
            elapsed_ms = process.started.elapsed().as_millis() as u64,
            "tool exited"
        );
        Ok(())
    }
}

fn handle_line(
    name: &str,
    parser: &mut dyn OutputParser,
    tap: LineTap,
    report: &mut TaskReport,
) {
    trace!(target: TARGET, task = name, stream = ?tap.stream, line = %tap.line);
    if tap.stream == LineStream::Stdout {
        if let Some(diagnostic) = parser.parse_line(&tap.line) {
            report.add_diagnostic(diagnostic);
        }
    }
}

impl ParallelTask for ToolTask {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn cost(&self) -> u32 {
        self.spec.cost
    }

    fn start(&mut self, _report: &mut TaskReport) -> Result<()> {
        self.spawn()
    }

    fn poll(&mut self, report: &mut TaskReport) -> Result<bool> {
        let Self {
            spec,
            parser,
            process,
        } = self;
        let process = process.as_mut().context("task polled before start")?;

        while process.lines_open {
            match process.lines.try_recv() {
                Ok(tap) => handle_line(&spec.name, parser.as_mut(), tap, report),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => process.lines_open = false,
            }
        }

        if process.exit.is_none() {
            process.exit = process
                .child
                .try_wait()
                .with_context(|| format!("wait for task '{}'", spec.name))?;
        }

        if process.exit.is_none() || process.lines_open {
            return Ok(true);
        }

        self.conclude(report)?;
        Ok(false)
    }
}

#[async_trait]
impl BlockingTask for ToolTask {
    fn name(&self) -> &str {
        &self.spec.name
    }

    async fn run(&mut self, report: &mut TaskReport) -> Result<()> {
        self.spawn()?;

        let Self {
            spec,
            parser,
            process,
        } = self;
        let process = process.as_mut().context("task not spawned")?;

        while let Some(tap) = process.lines.recv().await {
            handle_line(&spec.name, parser.as_mut(), tap, report);
        }
        process.lines_open = false;
        process.exit = Some(
            process
                .child
                .wait()
                .await
                .with_context(|| format!("wait for task '{}'", spec.name))?,
        );

        self.conclude(report)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::parsers::GnuLineParser;
    use qcheck_core::Report;
    use std::time::Duration;

    fn sh(name: &str, script: &str) -> ToolTask {
        let spec = ToolSpec {
            name: name.to_string(),
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            env: BTreeMap::new(),
            workdir: PathBuf::from("."),
            cost: 1,
            success_exit_codes: vec![0],
            fail_on: None,
            capture_bytes: 1024,
        };
        ToolTask::new(spec, Box::new(GnuLineParser::new(name)))
    }

    #[tokio::test]
    async fn test_poll_until_exit_collects_diagnostics() {
        let mut report = Report::new();
        let id = report.add_task_report("lint").unwrap();
        let mut task = sh("lint", "echo 'a.php:3:1: warning: spaces'; echo oops >&2; exit 0");

        ParallelTask::start(&mut task, &mut report[id]).unwrap();
        while ParallelTask::poll(&mut task, &mut report[id]).unwrap() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let task_report = &report[id];
        assert_eq!(task_report.status(), ReportStatus::Passed);
        assert_eq!(task_report.diagnostics().len(), 1);
        assert_eq!(task_report.diagnostics()[0].severity, Severity::Minor);
        assert_eq!(task_report.attachments()[0].content, "oops\n");
    }

    #[tokio::test]
    async fn test_blocking_run_fails_on_exit_code() {
        let mut report = Report::new();
        let id = report.add_task_report("broken").unwrap();
        let mut task = sh("broken", "exit 3");

        BlockingTask::run(&mut task, &mut report[id]).await.unwrap();

        let task_report = &report[id];
        assert_eq!(task_report.status(), ReportStatus::Failed);
        assert_eq!(task_report.diagnostics()[0].message, "sh exited with code 3");
    }

    #[tokio::test]
    async fn test_fail_on_threshold() {
        let mut report = Report::new();
        let id = report.add_task_report("strict").unwrap();
        let mut task = sh("strict", "echo 'b.php:1: error: broken'");
        task.spec.fail_on = Some(Severity::Major);

        BlockingTask::run(&mut task, &mut report[id]).await.unwrap();
        assert_eq!(report[id].status(), ReportStatus::Failed);
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let mut report = Report::new();
        let id = report.add_task_report("ghost").unwrap();
        let mut task = sh("ghost", "true");
        task.spec.program = "/nonexistent/qcheck-tool".to_string();

        assert!(ParallelTask::start(&mut task, &mut report[id]).is_err());
    }
}
