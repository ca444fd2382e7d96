use clap::Parser;
use conductor_cli::commands::{cli, run};
use conductor_cli::http;
use conductor_core::api::{AppConfig, CliError, LoggingConfig};
use conductor_core::config::{apply_env_overrides, load_default, load_from_path};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let cfg = load_config(&args).map_err(|e| CliError::Config(e.to_string()))?;
    init_tracing(&cfg.logging).map_err(CliError::Config)?;

    let orchestrator = conductor_plugins::factory::build_orchestrator(&cfg)
        .map_err(|e| CliError::Config(format!("failed to build job runner: {e}")))?;

    match args.command {
        None => {
            http::handle_serve(cli::ServeArgs::default(), cfg, orchestrator).await?;
            Ok(0)
        }
        Some(cli::Commands::Serve(serve_args)) => {
            http::handle_serve(serve_args, cfg, orchestrator).await?;
            Ok(0)
        }
        Some(cli::Commands::Run(run_args)) => run::handle_run(run_args, &orchestrator).await,
        Some(cli::Commands::Script(script_args)) => {
            run::handle_script(script_args, &orchestrator).await
        }
    }
}

fn load_config(args: &cli::Args) -> anyhow::Result<AppConfig> {
    match &args.config {
        Some(path) => {
            let mut cfg = load_from_path(path)?;
            apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
            Ok(cfg)
        }
        None => load_default(),
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(&logging.level).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("conductor")
                .join("logs"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let appender = tracing_appender::rolling::daily(dir, "conductor.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
