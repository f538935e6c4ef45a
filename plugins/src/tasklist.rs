//! Turn the `[[tasks]]` section of the configuration into schedulable tasks.

use std::path::{Path, PathBuf};

use qcheck_core::config::{AppConfig, RunConfig, TaskConfig};
use qcheck_core::Task;
use tracing::{debug, warn};

use crate::error::TaskBuildError;
use crate::parsers::build_parser;
use crate::runner::{ToolSpec, ToolTask};

/// Build the task list in configuration order, skipping disabled entries.
pub fn build_tasks(cfg: &AppConfig) -> Result<Vec<Task>, TaskBuildError> {
    let mut tasks = Vec::with_capacity(cfg.tasks.len());
    for task_cfg in &cfg.tasks {
        if !task_cfg.enabled {
            debug!(target: "qcheck::task", task = %task_cfg.name, "task disabled, skipping");
            continue;
        }
        let tool = build_tool(&cfg.run, task_cfg)?;
        tasks.push(if task_cfg.parallel {
            Task::parallel(tool)
        } else {
            Task::blocking(tool)
        });
    }
    Ok(tasks)
}

pub fn build_tool(run: &RunConfig, task_cfg: &TaskConfig) -> Result<ToolTask, TaskBuildError> {
    let workdir = resolve_workdir(run, task_cfg);
    if !workdir.is_dir() {
        return Err(TaskBuildError::Workdir {
            task: task_cfg.name.clone(),
            path: workdir,
        });
    }

    let mut args = task_cfg.args.clone();
    for pattern in &task_cfg.paths {
        args.extend(expand_pattern(&task_cfg.name, &workdir, pattern)?);
    }

    let spec = ToolSpec {
        name: task_cfg.name.clone(),
        program: task_cfg.command.clone(),
        args,
        env: task_cfg.env.clone(),
        workdir,
        cost: task_cfg.cost,
        success_exit_codes: task_cfg.success_exit_codes.clone(),
        fail_on: task_cfg.fail_on,
        capture_bytes: task_cfg.capture_bytes,
    };
    let parser = build_parser(task_cfg.format, task_cfg.source_label());
    Ok(ToolTask::new(spec, parser))
}

fn resolve_workdir(run: &RunConfig, task_cfg: &TaskConfig) -> PathBuf {
    let base = Path::new(&run.workdir);
    match task_cfg.workdir.as_deref() {
        Some(dir) => base.join(dir),
        None => base.to_path_buf(),
    }
}

/// Expand one glob pattern relative to `workdir`, returning matches relative to it, sorted.
fn expand_pattern(
    task: &str,
    workdir: &Path,
    pattern: &str,
) -> Result<Vec<String>, TaskBuildError> {
    let pattern_str = workdir.join(pattern).to_string_lossy().to_string();
    let paths = glob::glob(&pattern_str).map_err(|source| TaskBuildError::Pattern {
        task: task.to_string(),
        pattern: pattern.to_string(),
        source,
    })?;

    let mut matched = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                let rel = path.strip_prefix(workdir).unwrap_or(&path);
                matched.push(rel.to_string_lossy().to_string());
            }
            Err(e) => warn!(target: "qcheck::task", task, "glob error: {}", e),
        }
    }
    matched.sort();

    if matched.is_empty() {
        debug!(target: "qcheck::task", task, pattern, "path pattern matched nothing");
    }
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cfg_in(dir: &Path) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.run.workdir = dir.to_string_lossy().to_string();
        cfg
    }

    #[test]
    fn test_disabled_tasks_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = cfg_in(dir.path());
        cfg.tasks.push(TaskConfig::new("a", "true"));
        let mut off = TaskConfig::new("b", "true");
        off.enabled = false;
        cfg.tasks.push(off);
        let mut exclusive = TaskConfig::new("c", "true");
        exclusive.parallel = false;
        cfg.tasks.push(exclusive);

        let tasks = build_tasks(&cfg).unwrap();
        let names: Vec<_> = tasks.iter().map(|t| (t.name().to_string(), t.is_parallel())).collect();
        assert_eq!(
            names,
            vec![("a".to_string(), true), ("c".to_string(), false)]
        );
    }

    #[test]
    fn test_paths_expand_relative_to_workdir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/b.php"), "").unwrap();
        std::fs::write(dir.path().join("src/a.php"), "").unwrap();
        std::fs::write(dir.path().join("src/c.txt"), "").unwrap();

        let cfg = cfg_in(dir.path());
        let mut task_cfg = TaskConfig::new("lint", "phplint");
        task_cfg.args = vec!["--strict".to_string()];
        task_cfg.paths = vec!["src/*.php".to_string()];

        let tool = build_tool(&cfg.run, &task_cfg).unwrap();
        let expected = vec![
            "--strict".to_string(),
            Path::new("src").join("a.php").to_string_lossy().to_string(),
            Path::new("src").join("b.php").to_string_lossy().to_string(),
        ];
        assert_eq!(tool.spec().args, expected);
    }

    #[test]
    fn test_missing_workdir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(dir.path());
        let mut task_cfg = TaskConfig::new("lint", "phplint");
        task_cfg.workdir = Some("nope".to_string());

        let err = build_tool(&cfg.run, &task_cfg).err().unwrap();
        assert!(matches!(err, TaskBuildError::Workdir { .. }));
    }

    #[test]
    fn test_bad_pattern_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(dir.path());
        let mut task_cfg = TaskConfig::new("lint", "phplint");
        task_cfg.paths = vec!["src/[".to_string()];

        let err = build_tool(&cfg.run, &task_cfg).err().unwrap();
        assert!(matches!(err, TaskBuildError::Pattern { .. }));
    }
}
