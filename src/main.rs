use std::path::{Path, PathBuf};
use std::time::Duration;

use barkeep::collector::ClockCollector;
use barkeep::config::{self, ConfigWatcher};
use barkeep::logging::{self, LogSettings};
use barkeep::repl::{self, Command};
use barkeep_core::{BarManager, Monitor, RedrawMode};
use barkeep_types::AppConfig;
use clap::Parser;
use tokio::sync::mpsc::Receiver;
use tokio::time::{Interval, MissedTickBehavior, interval};

#[derive(Parser)]
#[command(version, about = "Per-monitor status bars driven through an external renderer")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not read control commands from stdin
    #[arg(long)]
    no_stdin: bool,

    /// Log filter directive, e.g. `debug` or `barkeep_core=trace`
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let config_path = config::resolve_path(cli.config.as_deref()).ok();
    let _log_guard = logging::init(&LogSettings::beside_config(
        config_path.as_deref(),
        cli.log_level.clone(),
    ));

    let config = config::load(cli.config.as_deref()).map_err(|e| e.to_string())?;

    let username = config
        .username
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_default();

    let collector = ClockCollector::new(config.clock_format.clone());
    let mut manager = BarManager::new(&config, username, Box::new(collector));
    manager.initialize(config.monitors.len());

    manager.update_content().await;
    manager.redraw_all(RedrawMode::Immediate).await;
    tracing::info!(monitors = config.monitors.len(), "Bars drawn");

    let mut watcher = config_path.as_deref().and_then(|path| match ConfigWatcher::new(path) {
        Ok(w) => {
            tracing::info!(path = %w.path().display(), "Watching configuration");
            Some(w)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Config hot reload disabled");
            None
        }
    });
    let mut commands = (!cli.no_stdin).then(repl::spawn_reader);
    let mut ticker = update_ticker(config.update_interval_secs);
    let mut update_interval = config.update_interval_secs;

    loop {
        tokio::select! {
            _ = ticker.tick() => manager.update_content().await,
            changed = next_change(&mut watcher), if watcher.is_some() => {
                match changed {
                    Some(()) => {
                        if let Some(reloaded) = reload(&mut manager, cli.config.as_deref()).await
                            && reloaded.update_interval_secs != update_interval
                        {
                            update_interval = reloaded.update_interval_secs;
                            ticker = update_ticker(update_interval);
                        }
                    }
                    None => watcher = None,
                }
            }
            line = next_line(&mut commands), if commands.is_some() => {
                let Some(line) = line else {
                    commands = None;
                    continue;
                };
                match repl::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => run(command, &mut manager, cli.config.as_deref()).await,
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    manager.shutdown().await;
    Ok(())
}

fn update_ticker(secs: u64) -> Interval {
    let mut ticker = interval(Duration::from_secs(secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn next_change(watcher: &mut Option<ConfigWatcher>) -> Option<()> {
    match watcher {
        Some(w) => w.changed().await,
        None => std::future::pending().await,
    }
}

async fn next_line(commands: &mut Option<Receiver<String>>) -> Option<String> {
    match commands {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn run(command: Command, manager: &mut BarManager, config_path: Option<&Path>) {
    match command {
        Command::Toggle { monitor } => {
            if let Err(e) = manager.toggle_visibility(monitor).await {
                println!("{e}");
            }
        }
        Command::Redraw => manager.redraw_all(RedrawMode::Immediate).await,
        Command::Reload => {
            reload(manager, config_path).await;
        }
        Command::Update => manager.update_content().await,
        Command::Refresh { keys } => {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            manager.reload_content(&keys).await;
        }
        Command::Status => {
            for monitor in manager.monitors() {
                let state = if manager.is_visible(monitor.index) {
                    "visible"
                } else {
                    "hidden"
                };
                println!(
                    "monitor {} ({}x{}): {}",
                    monitor.index, monitor.width, monitor.height, state
                );
            }
            println!("layout: {:?}", manager.layout());
        }
        Command::Quit => {}
    }
}

/// Re-read the config and redraw everything with the settle delay.
async fn reload(manager: &mut BarManager, path: Option<&Path>) -> Option<AppConfig> {
    let config = match config::load(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Config reload failed, keeping current bars");
            return None;
        }
    };

    let monitors = Monitor::from_configs(&config.monitors);
    if monitors.len() != manager.slot_count() {
        manager.close_all(false).await;
        manager.initialize(monitors.len());
    }
    manager.set_monitors(monitors);
    manager.apply_config(&config);
    manager.redraw_all(RedrawMode::Settle).await;

    tracing::info!("Configuration reloaded");
    Some(config)
}
