use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::report::Severity;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Concurrency budget: total cost of parallel tasks allowed to run at once.
    #[serde(default = "default_threads")]
    pub threads: u32,

    /// Stop admitting tasks after the first failure.
    #[serde(default)]
    pub fast_finish: bool,

    /// Diagnostics below this severity are left out of rendered reports.
    #[serde(default = "default_minimum_severity")]
    pub minimum_severity: Severity,

    /// Sleep between poll cycles in which no task finished.
    #[serde(default = "default_idle_wait_ms")]
    pub idle_wait_ms: u64,

    /// Working directory tasks run in unless they set their own.
    #[serde(default = "default_workdir")]
    pub workdir: String,

    /// Where file-based reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Renderer names, e.g. "console", "github", "checkstyle", "codeclimate".
    #[serde(default = "default_reports")]
    pub reports: Vec<String>,
}

fn default_threads() -> u32 {
    num_cpus::get().max(1) as u32
}

fn default_minimum_severity() -> Severity {
    Severity::Info
}

fn default_idle_wait_ms() -> u64 {
    10
}

fn default_workdir() -> String {
    ".".to_string()
}

fn default_output_dir() -> String {
    "./qcheck-report".to_string()
}

fn default_reports() -> Vec<String> {
    vec!["console".to_string()]
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            fast_finish: false,
            minimum_severity: default_minimum_severity(),
            idle_wait_ms: default_idle_wait_ms(),
            workdir: default_workdir(),
            output_dir: default_output_dir(),
            reports: default_reports(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or `<run.output_dir>/logs` if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "qcheck::scheduler=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses `<run.output_dir>/logs`.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// How a tool's stdout is turned into diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `file:line[:column]: [severity:] message`
    #[default]
    Gnu,
    /// One JSON diagnostic object per line.
    Jsonl,
    /// Output is not parsed; only the exit code matters.
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub name: String,

    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub workdir: Option<String>,

    #[serde(default = "default_cost")]
    pub cost: u32,

    /// `false` forces the task to run alone, outside the concurrency budget.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    #[serde(default)]
    pub format: OutputFormat,

    /// Diagnostic source label; defaults to the task name.
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default = "default_success_exit_codes")]
    pub success_exit_codes: Vec<i32>,

    /// Fail the task when any diagnostic reaches this severity.
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Glob patterns, expanded relative to the working directory and appended to `args`.
    #[serde(default)]
    pub paths: Vec<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Bytes of stderr kept for the report.
    #[serde(default = "default_capture_bytes")]
    pub capture_bytes: usize,
}

fn default_cost() -> u32 {
    1
}

fn default_parallel() -> bool {
    true
}

fn default_success_exit_codes() -> Vec<i32> {
    vec![0]
}

fn default_enabled() -> bool {
    true
}

fn default_capture_bytes() -> usize {
    64 * 1024
}

impl TaskConfig {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            workdir: None,
            cost: default_cost(),
            parallel: default_parallel(),
            format: OutputFormat::default(),
            source: None,
            success_exit_codes: default_success_exit_codes(),
            fail_on: None,
            paths: Vec::new(),
            enabled: default_enabled(),
            capture_bytes: default_capture_bytes(),
        }
    }

    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }
}
