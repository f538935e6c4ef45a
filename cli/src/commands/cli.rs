use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use qcheck_core::Severity;

#[derive(Parser, Debug)]
#[command(name = "qcheck", version, about = "Run code quality tools and collect their findings")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (default: ./qcheck.toml if present).
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the configured tasks (the default when no subcommand is given).
    Run(RunArgs),
    /// Print the configured tasks without running them.
    List,
    /// Print the available report formats.
    Formats,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct RunArgs {
    /// Concurrency budget; overrides run.threads.
    #[arg(long, short = 'j')]
    pub threads: Option<u32>,

    /// Stop starting tasks after the first failure.
    #[arg(long)]
    pub fast_finish: bool,

    /// Report format; may be repeated. Overrides run.reports.
    #[arg(long = "report", short = 'r', action = clap::ArgAction::Append)]
    pub reports: Vec<String>,

    /// Directory for file-based reports; overrides run.output_dir.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Hide diagnostics below this severity (none, info, marginal, minor, major, fatal).
    #[arg(long, value_parser = parse_severity)]
    pub minimum_severity: Option<Severity>,

    /// Run only the named task; may be repeated.
    #[arg(long = "task", short = 't', action = clap::ArgAction::Append)]
    pub tasks: Vec<String>,

    /// Disable the progress display.
    #[arg(long)]
    pub no_progress: bool,
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    s.parse()
}

impl RunArgs {
    /// Options given here win; anything left unset falls back to `outer`.
    pub fn merged_with(&self, outer: &RunArgs) -> RunArgs {
        let pick_vec = |inner: &Vec<String>, outer: &Vec<String>| {
            if inner.is_empty() {
                outer.clone()
            } else {
                inner.clone()
            }
        };
        RunArgs {
            threads: self.threads.or(outer.threads),
            fast_finish: self.fast_finish || outer.fast_finish,
            reports: pick_vec(&self.reports, &outer.reports),
            output_dir: self.output_dir.clone().or_else(|| outer.output_dir.clone()),
            minimum_severity: self.minimum_severity.or(outer.minimum_severity),
            tasks: pick_vec(&self.tasks, &outer.tasks),
            no_progress: self.no_progress || outer.no_progress,
        }
    }
}

impl Args {
    /// Effective run options: those after `run` layered over those before it.
    pub fn run_args(&self) -> RunArgs {
        match &self.command {
            Some(Commands::Run(run)) => run.merged_with(&self.run),
            _ => self.run.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_invocation_runs() {
        let args = Args::parse_from(["qcheck", "-j", "3", "--report", "github", "-r", "json"]);
        assert!(args.command.is_none());
        assert_eq!(args.run_args().threads, Some(3));
        assert_eq!(args.run_args().reports, vec!["github", "json"]);
    }

    #[test]
    fn test_run_subcommand_options() {
        let args = Args::parse_from([
            "qcheck",
            "run",
            "--fast-finish",
            "--minimum-severity",
            "warning",
            "--task",
            "phpcs",
            "--config",
            "ci.toml",
        ]);
        let run = args.run_args();
        assert!(run.fast_finish);
        assert_eq!(run.minimum_severity, Some(Severity::Minor));
        assert_eq!(run.tasks, vec!["phpcs"]);
        assert_eq!(args.config, Some(PathBuf::from("ci.toml")));
    }

    #[test]
    fn test_options_before_run_subcommand_are_kept() {
        let args = Args::parse_from([
            "qcheck", "-j", "3", "-r", "github", "run", "--fast-finish", "-r", "json",
        ]);
        let run = args.run_args();
        assert_eq!(run.threads, Some(3));
        assert!(run.fast_finish);
        assert_eq!(run.reports, vec!["json"]);

        let args = Args::parse_from(["qcheck", "-j", "3", "run", "-j", "5"]);
        assert_eq!(args.run_args().threads, Some(5));
    }

    #[test]
    fn test_rejects_unknown_severity() {
        let res = Args::try_parse_from(["qcheck", "--minimum-severity", "loud"]);
        assert!(res.is_err());
    }
}
