use clap::Parser;
use qcheck_cli::app;
use qcheck_cli::commands::cli::{self, Commands};
use qcheck_cli::error::CliError;
use qcheck_core::config::{self, AppConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("qcheck: {e}");
            e.exit_code()
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let mut cfg = config::load(args.config.as_deref())?;
    let run = args.run_args();
    let runs_checks = matches!(args.command, Some(Commands::Run(_)) | None);
    if runs_checks {
        app::apply_overrides(&mut cfg, &run)?;
    }
    init_tracing(&cfg).map_err(CliError::Logging)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match &args.command {
        Some(Commands::List) => {
            app::list_tasks(&cfg, &mut out)?;
            Ok(0)
        }
        Some(Commands::Formats) => {
            app::list_formats(&mut out)?;
            Ok(0)
        }
        Some(Commands::Run(_)) | None => {
            let progress = app::progress_wanted(&cfg, &run);
            app::run_checks(&cfg, progress, &mut out).await
        }
    }
}

fn init_tracing(cfg: &AppConfig) -> Result<(), String> {
    let logging = &cfg.logging;
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    // Keep the log next to the reports of the run it describes.
    let maybe_writer = if logging.file {
        let dir = app::log_directory(cfg);
        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let appender = tracing_appender::rolling::never(&dir, format!("qcheck.{}.log", std::process::id()));
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        Some(non_blocking)
    } else {
        None
    };

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    // Targets name the channel (qcheck::scheduler, qcheck::task, qcheck::report).
    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_target(true)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
