use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use qcheck_core::report::ReportStatus;
use qcheck_core::{RunEvent, RunObserver};

/// Progress bars for a scheduler run: an overall bar plus one spinner per active task.
pub struct ProgressObserver {
    multi: MultiProgress,
    overall: ProgressBar,
    task_bars: Mutex<HashMap<String, ProgressBar>>,
    enabled: bool,
}

impl ProgressObserver {
    /// `enabled = false` yields an observer that draws nothing (non-TTY stderr, CI output).
    pub fn new(total_tasks: usize, enabled: bool) -> Self {
        if !enabled {
            return Self {
                multi: MultiProgress::new(),
                overall: ProgressBar::hidden(),
                task_bars: Mutex::new(HashMap::new()),
                enabled: false,
            };
        }

        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(total_tasks as u64));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tasks {msg}")
        {
            overall.set_style(style.progress_chars("█▓▒░  "));
        }
        overall.set_message("starting");

        Self {
            multi,
            overall,
            task_bars: Mutex::new(HashMap::new()),
            enabled: true,
        }
    }

    fn bars(&self) -> std::sync::MutexGuard<'_, HashMap<String, ProgressBar>> {
        match self.task_bars.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn add_task(&self, task: &str, cost: Option<u32>) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.green} {msg}") {
            bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        match cost {
            Some(cost) => bar.set_message(format!("{task} (cost {cost})")),
            None => bar.set_message(format!("{task} (exclusive)")),
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bars().insert(task.to_string(), bar);
    }

    fn complete_task(&self, task: &str, status: ReportStatus, duration_ms: u64) {
        if let Some(bar) = self.bars().remove(task) {
            let icon = if status == ReportStatus::Passed { "✅" } else { "❌" };
            bar.finish_with_message(format!("{icon} {task} ({duration_ms}ms)"));
        }
        self.overall.inc(1);
    }
}

impl RunObserver for ProgressObserver {
    fn on_event(&self, event: &RunEvent) {
        if !self.enabled {
            return;
        }
        match event {
            RunEvent::RunStart { budget } => {
                self.overall.set_message(format!("budget {budget}"));
            }
            RunEvent::TaskAdmitted { task, cost, .. } => self.add_task(task, *cost),
            RunEvent::TaskFinished {
                task,
                status,
                duration_ms,
            } => self.complete_task(task, *status, *duration_ms),
            RunEvent::Stopping { task } => {
                self.overall
                    .set_message(format!("{task} failed, draining"));
            }
            RunEvent::RunEnd { success, .. } => {
                let msg = if *success { "✅ all tasks passed" } else { "❌ run failed" };
                self.overall.finish_with_message(msg);
            }
        }
    }
}

impl Drop for ProgressObserver {
    fn drop(&mut self) {
        for (_, bar) in self.bars().drain() {
            bar.finish_and_clear();
        }
    }
}
