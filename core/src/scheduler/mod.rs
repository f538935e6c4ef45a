//! Cost-bounded task scheduler.
//!
//! A single-threaded, cooperative reactor loop: parallel tasks are admitted in list order
//! while their summed cost fits the budget and are then polled round-robin; blocking tasks
//! run inline and only while no parallel task is active.
//!
//! ```text
//! run()
//!   fill_up()            admit while running_cost < budget and !stop
//!   loop {
//!     tick()             poll every active task, retire finished ones
//!     stop? -> break
//!     fill_up()
//!   }
//!   drain()              tick until running_cost == 0
//!   Report::complete()
//! ```

mod observer;

pub use observer::{RunEvent, RunObserver};

use std::iter::Peekable;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::SchedulerError;
use crate::report::{Report, ReportStatus, TaskReportId};
use crate::task::{BlockingTask, ParallelTask, Task};

const TARGET: &str = "qcheck::scheduler";

/// Scheduler knobs.
#[derive(Debug, Clone)]
pub struct SchedulerOpts {
    /// Total admissible cost of concurrently active parallel tasks.
    pub budget: u32,

    /// Stop admitting new tasks after the first failure.
    pub fast_finish: bool,

    /// Sleep between poll cycles in which no task finished.
    pub idle_wait: Duration,
}

impl Default for SchedulerOpts {
    fn default() -> Self {
        Self {
            budget: num_cpus::get().max(1) as u32,
            fast_finish: false,
            idle_wait: Duration::from_millis(10),
        }
    }
}

struct ActiveTask {
    task: Box<dyn ParallelTask>,
    report: TaskReportId,
    cost: u32,
    started: Instant,
}

/// Runs a lazily produced task list once, filling a [`Report`].
pub struct Scheduler<I: Iterator<Item = Task>> {
    tasks: Peekable<I>,
    opts: SchedulerOpts,
    observer: Option<Arc<dyn RunObserver>>,
    has_run: bool,
    running_cost: u32,
    active: Vec<ActiveTask>,
    stop: bool,
    success: bool,
}

impl<I: Iterator<Item = Task>> Scheduler<I> {
    pub fn new(
        tasks: impl IntoIterator<IntoIter = I>,
        opts: SchedulerOpts,
    ) -> Result<Self, SchedulerError> {
        if opts.budget == 0 {
            return Err(SchedulerError::InvalidBudget);
        }
        Ok(Self {
            tasks: tasks.into_iter().peekable(),
            opts,
            observer: None,
            has_run: false,
            running_cost: 0,
            active: Vec::new(),
            stop: false,
            success: true,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Execute every admissible task and complete `report`.
    ///
    /// Returns the aggregate verdict. Errors are reserved for misuse (a second call) and for
    /// task lists that can never be fully admitted; task failures only affect the verdict.
    pub async fn run(&mut self, report: &mut Report) -> Result<bool, SchedulerError> {
        if self.has_run {
            return Err(SchedulerError::AlreadyRun);
        }
        self.has_run = true;

        if self.tasks.peek().is_none() {
            report.complete()?;
            return Ok(true);
        }

        let started = Instant::now();
        self.emit(RunEvent::RunStart {
            budget: self.opts.budget,
        });
        debug!(target: TARGET, budget = self.opts.budget, fast_finish = self.opts.fast_finish, "run starting");

        let mut outcome = self.fill_up(report).await;
        if outcome.is_ok() {
            while self.running_cost > 0 || self.tasks.peek().is_some() {
                let finished = self.tick(report);
                if self.stop {
                    break;
                }
                if let Err(e) = self.fill_up(report).await {
                    outcome = Err(e);
                    break;
                }
                self.idle(finished).await;
            }
        }

        self.drain(report).await;
        let status = report.complete()?;
        debug!(target: "qcheck::report", status = status.as_str(), tasks = report.task_reports().len(), "report completed");

        self.emit(RunEvent::RunEnd {
            success: self.success && outcome.is_ok(),
            duration_ms: started.elapsed().as_millis() as u64,
        });

        outcome?;
        Ok(self.success)
    }

    /// Admit tasks while budget remains and nothing requested a stop.
    async fn fill_up(&mut self, report: &mut Report) -> Result<(), SchedulerError> {
        let budget = self.opts.budget;

        while self.running_cost < budget && !self.stop {
            if let Some(Task::Parallel(next)) = self.tasks.peek() {
                let cost = next.cost();
                if cost == 0 {
                    self.stop = true;
                    return Err(SchedulerError::InvalidCost {
                        task: next.name().to_string(),
                    });
                }
                if cost > budget {
                    self.stop = true;
                    return Err(SchedulerError::CostExceedsBudget {
                        task: next.name().to_string(),
                        cost,
                        budget,
                    });
                }
            }

            let running_cost = self.running_cost;
            let admitted = self.tasks.next_if(|task| match task {
                Task::Parallel(t) => running_cost + t.cost() <= budget,
                Task::Blocking(_) => running_cost == 0,
            });

            match admitted {
                Some(Task::Parallel(task)) => self.start_parallel(task, report)?,
                Some(Task::Blocking(task)) => self.run_blocking(task, report).await?,
                // Exhausted, or the next task has to wait for capacity.
                None => break,
            }
        }

        Ok(())
    }

    fn start_parallel(
        &mut self,
        mut task: Box<dyn ParallelTask>,
        report: &mut Report,
    ) -> Result<(), SchedulerError> {
        let cost = task.cost();
        let id = report.add_task_report(task.name())?;
        info!(target: TARGET, task = task.name(), cost, "task starting");

        let started = Instant::now();
        match task.start(&mut report[id]) {
            Ok(()) => {
                self.running_cost += cost;
                debug!(target: TARGET, task = task.name(), running_cost = self.running_cost, budget = self.opts.budget, "task admitted");
                self.emit(RunEvent::TaskAdmitted {
                    task: task.name().to_string(),
                    cost: Some(cost),
                    running_cost: self.running_cost,
                });
                self.active.push(ActiveTask {
                    task,
                    report: id,
                    cost,
                    started,
                });
            }
            Err(e) => {
                self.internal_error(task.name(), id, &e, report);
                self.finish(task.name(), id, started, report);
            }
        }
        Ok(())
    }

    async fn run_blocking(
        &mut self,
        mut task: Box<dyn BlockingTask>,
        report: &mut Report,
    ) -> Result<(), SchedulerError> {
        let id = report.add_task_report(task.name())?;
        info!(target: TARGET, task = task.name(), "task starting (exclusive)");
        self.emit(RunEvent::TaskAdmitted {
            task: task.name().to_string(),
            cost: None,
            running_cost: self.running_cost,
        });

        let started = Instant::now();
        if let Err(e) = task.run(&mut report[id]).await {
            self.internal_error(task.name(), id, &e, report);
        }
        self.finish(task.name(), id, started, report);
        Ok(())
    }

    /// Poll every active task once. Returns how many finished.
    fn tick(&mut self, report: &mut Report) -> usize {
        let mut finished = 0;
        let mut index = 0;

        while index < self.active.len() {
            let polled = {
                let active = &mut self.active[index];
                active.task.poll(&mut report[active.report])
            };

            match polled {
                Ok(true) => {
                    index += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    let active = &self.active[index];
                    self.internal_error(active.task.name(), active.report, &e, report);
                }
            }

            let done = self.active.remove(index);
            self.running_cost -= done.cost;
            self.finish(done.task.name(), done.report, done.started, report);
            finished += 1;
        }

        finished
    }

    /// Let already-started work run to its natural end.
    async fn drain(&mut self, report: &mut Report) {
        if !self.active.is_empty() {
            debug!(target: TARGET, active = self.active.len(), "draining active tasks");
        }
        while self.running_cost > 0 {
            let finished = self.tick(report);
            self.idle(finished).await;
        }
    }

    async fn idle(&self, finished: usize) {
        if self.running_cost == 0 {
            return;
        }
        if finished == 0 && !self.opts.idle_wait.is_zero() {
            tokio::time::sleep(self.opts.idle_wait).await;
        } else {
            tokio::task::yield_now().await;
        }
    }

    /// Fold a finished task's report into the verdict.
    fn finish(&mut self, name: &str, id: TaskReportId, started: Instant, report: &mut Report) {
        let task_report = &mut report[id];
        if !task_report.status().is_terminal() {
            warn!(target: TARGET, task = name, "task finished without closing its report; marking it failed");
            task_report.force_failed();
        }

        let status = task_report.status();
        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            target: TARGET,
            task = name,
            status = status.as_str(),
            diagnostics = task_report.diagnostics().len(),
            duration_ms,
            "task finished"
        );
        self.emit(RunEvent::TaskFinished {
            task: name.to_string(),
            status,
            duration_ms,
        });

        if status != ReportStatus::Passed {
            self.success = false;
            if self.opts.fast_finish && !self.stop {
                self.stop = true;
                info!(target: TARGET, task = name, "fast finish: no further tasks will be admitted");
                self.emit(RunEvent::Stopping {
                    task: name.to_string(),
                });
            }
        }
    }

    fn internal_error(
        &self,
        name: &str,
        id: TaskReportId,
        error: &anyhow::Error,
        report: &mut Report,
    ) {
        warn!(target: TARGET, task = name, error = %format!("{error:#}"), "task raised an internal error");
        debug!(target: TARGET, task = name, "{error:?}");
        report[id].force_failed();
    }

    fn emit(&self, event: RunEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
    }
}
