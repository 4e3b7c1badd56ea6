//! Continuity entrypoint.
use anyhow::Result;
use clap::{Parser, Subcommand};
use core_config::load_from;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

mod commands;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "continuity", version, about = "Block diff and model reconciliation")]
struct Args {
    /// Optional configuration file path (overrides discovery of `continuity.toml`).
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,
    /// Language id used for per-language EOL settings.
    #[arg(long = "language", global = true)]
    language: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the single block edit turning OLD into NEW.
    Diff { old: PathBuf, new: PathBuf },
    /// Load FILE as a model, reconcile it with NEW, and verify undo.
    Reload { file: PathBuf, new: PathBuf },
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("continuity.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "continuity.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        // Otherwise a global subscriber is already installed; the guard drops here.
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }

    fn run(&mut self, args: Args) -> Result<String> {
        self.configure_logging()?;
        Self::install_panic_hook();
        info!(target: "runtime", config_override = args.config.is_some(), "startup");

        let config = load_from(args.config)?;
        let language = args.language.as_deref();
        let json = match args.command {
            Command::Diff { old, new } => {
                serde_json::to_string_pretty(&commands::run_diff(&config, &old, &new, language)?)?
            }
            Command::Reload { file, new } => {
                serde_json::to_string_pretty(&commands::run_reload(config, &file, &new, language)?)?
            }
        };
        info!(target: "runtime", "shutdown");
        Ok(json)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    let json = startup.run(args)?;
    println!("{json}");
    Ok(())
}
