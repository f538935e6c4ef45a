use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::AppConfig;

pub const DEFAULT_CONFIG_FILE: &str = "qcheck.toml";

/// Load configuration.
///
/// Priority: the explicit `path`, else `./qcheck.toml`, else defaults; then the
/// `QCHECK_*` environment overrides. The result is validated.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let local_config = Path::new(DEFAULT_CONFIG_FILE);

    let mut cfg = match path {
        Some(p) => read(p)?,
        None if local_config.exists() => read(local_config)?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut cfg, |var| std::env::var(var).ok())?;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn from_toml_str(s: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str::<AppConfig>(s).map_err(|source| ConfigError::Parse {
        path: PathBuf::from("<inline>"),
        source,
    })
}

fn read(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(
    cfg: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("QCHECK_THREADS") {
        cfg.run.threads = v.trim().parse().map_err(|_| ConfigError::Env {
            var: "QCHECK_THREADS",
            value: v.clone(),
        })?;
    }
    if let Some(v) = non_empty("QCHECK_FAST_FINISH") {
        cfg.run.fast_finish = match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => {
                return Err(ConfigError::Env {
                    var: "QCHECK_FAST_FINISH",
                    value: v,
                })
            }
        };
    }
    if let Some(v) = non_empty("QCHECK_LOG_LEVEL") {
        cfg.logging.level = v;
    }

    Ok(())
}

pub fn validate(cfg: &AppConfig) -> Result<(), ConfigError> {
    if cfg.run.threads == 0 {
        return Err(ConfigError::Invalid("run.threads must be at least 1".into()));
    }

    let mut seen = HashSet::new();
    for task in &cfg.tasks {
        if task.name.trim().is_empty() {
            return Err(ConfigError::Invalid("task name must not be empty".into()));
        }
        if !seen.insert(task.name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "duplicate task name: {}",
                task.name
            )));
        }
        if task.command.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "task '{}' has an empty command",
                task.name
            )));
        }
        if task.cost == 0 {
            return Err(ConfigError::Invalid(format!(
                "task '{}' must cost at least 1",
                task.name
            )));
        }
        if task.enabled && task.parallel && task.cost > cfg.run.threads {
            return Err(ConfigError::Invalid(format!(
                "task '{}' costs {} but run.threads is {}",
                task.name, task.cost, cfg.run.threads
            )));
        }
    }

    Ok(())
}
