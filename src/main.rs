use bubbletea_rs::Program;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use timer_grid::alert::{Alert, Silent, SineTone};
use timer_grid::app::{self, App, Settings};
use timer_grid::config::Config;
use timer_grid::error::{Error, Result};
use timer_grid::logging;
use timer_grid::store::{FileStore, MemoryStore, Store};

/// A grid of countdown timers in the terminal.
#[derive(Parser, Debug)]
#[command(name = "timer-grid", version, about)]
struct Cli {
    /// Configuration file (default: ~/.config/timer-grid/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of timers
    #[arg(short = 'n', long, value_name = "N")]
    timers: Option<usize>,

    /// Timers per row
    #[arg(short = 'r', long, value_name = "N")]
    per_row: Option<usize>,

    /// Store file for finished durations
    #[arg(long, value_name = "PATH", conflicts_with = "no_store")]
    store: Option<PathBuf>,

    /// Keep finished durations in memory only
    #[arg(long)]
    no_store: bool,

    /// Do not play the alert when a timer finishes
    #[arg(long)]
    mute: bool,

    /// Append logs to this file (filter with TIMER_GRID_LOG)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Write the effective settings to the configuration file and exit
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(n) = self.timers {
            config.timer_count = n;
        }
        if let Some(n) = self.per_row {
            config.timers_per_row = n;
        }
        if let Some(path) = &self.store {
            config.store_path = Some(path.clone());
        }
        if self.no_store {
            config.persist = false;
        }
        if self.mute {
            config.bell = false;
        }
        config.normalized()
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn Store>> {
    if !config.persist {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let path = match &config.store_path {
        Some(p) => p.clone(),
        None => FileStore::default_path()?,
    };
    match FileStore::open(&path) {
        Ok(store) => Ok(Arc::new(store)),
        Err(err) => {
            // A damaged store should not keep the timers from running.
            tracing::warn!(error = %err, "falling back to an in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref())?;

    let config = cli.apply(Config::load(cli.config.clone())?);
    if cli.save_config {
        config.save(cli.config.clone())?;
        tracing::info!(?config, "saved configuration");
        return Ok(());
    }
    tracing::info!(?config, "starting");

    let alert: Arc<dyn Alert> = if config.bell {
        Arc::new(SineTone::new())
    } else {
        Arc::new(Silent)
    };
    app::configure(Settings {
        timer_count: config.timer_count,
        timers_per_row: config.timers_per_row,
        store: open_store(&config)?,
        alert,
    });

    let program = Program::<App>::builder()
        .alt_screen(true)
        .build()
        .map_err(|e| Error::Runtime(e.to_string()))?;
    program
        .run()
        .await
        .map_err(|e| Error::Runtime(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["timer-grid", "-n", "6", "--per-row", "3", "--mute"]);
        let config = cli.apply(Config::default());
        assert_eq!(config.timer_count, 6);
        assert_eq!(config.timers_per_row, 3);
        assert!(!config.bell);
        assert!(config.persist);
    }

    #[test]
    fn test_cli_values_normalized() {
        let cli = Cli::parse_from(["timer-grid", "--timers", "2", "--per-row", "5"]);
        let config = cli.apply(Config::default());
        assert_eq!(config.timer_count, 2);
        assert_eq!(config.timers_per_row, 2);
    }

    #[test]
    fn test_store_and_no_store_conflict() {
        let result = Cli::try_parse_from(["timer-grid", "--store", "x.json", "--no-store"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_config_writes_merged_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cli = Cli::parse_from([
            "timer-grid",
            "--config",
            path.to_str().unwrap(),
            "-n",
            "9",
            "-r",
            "3",
            "--save-config",
        ]);
        assert!(cli.save_config);

        let config = cli.apply(Config::load(cli.config.clone()).unwrap());
        config.save(cli.config.clone()).unwrap();

        let reloaded = Config::load(Some(path)).unwrap();
        assert_eq!(reloaded.timer_count, 9);
        assert_eq!(reloaded.timers_per_row, 3);
    }

    #[test]
    fn test_no_store_uses_memory() {
        let cli = Cli::parse_from(["timer-grid", "--no-store"]);
        let config = cli.apply(Config::default());
        let store = open_store(&config).unwrap();
        assert!(store.get("timer-0-seconds-left").is_none());
    }
}
