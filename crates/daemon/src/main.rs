// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bluesnap Daemon (bluesnapd)
//!
//! Keeps one Bluetooth speaker connected and one snapclient running
//! against it, and answers the `bluesnap` CLI over a Unix socket.
//!
//! Architecture:
//! - Supervisor tasks: link watchdog and keepalive, stream client monitor
//! - Listener task: socket I/O, dispatches commands onto the bridge
//! - Telemetry task: periodic and event-driven status snapshots
//! - Main task: waits for a signal or a shutdown request

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bluesnap_daemon::config::Settings;
use bluesnap_daemon::env;
use bluesnap_daemon::lifecycle::{self, LifecycleError, Paths, StartupResult};
use bluesnap_daemon::listener::Listener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

const USAGE: &str = "Usage: bluesnapd [--config <path>] [--foreground] [--help | --version]";

/// What the command line asked for
#[derive(Debug, Clone, PartialEq, Eq)]
enum Invocation {
    Help,
    Version,
    Run(RunOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RunOptions {
    config: Option<PathBuf>,
    /// Mirror logs to stderr
    foreground: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Invocation, String> {
    let mut options = RunOptions::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" | "-v" => return Ok(Invocation::Version),
            "--help" | "-h" | "help" => return Ok(Invocation::Help),
            "--foreground" | "-f" => options.foreground = true,
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| format!("'{arg}' requires a path"))?;
                options.config = Some(PathBuf::from(path));
            }
            other => match other.strip_prefix("--config=") {
                Some(path) => options.config = Some(PathBuf::from(path)),
                None => return Err(format!("unexpected argument '{other}'")),
            },
        }
    }
    Ok(Invocation::Run(options))
}

fn print_help() {
    println!("bluesnapd {}", env!("CARGO_PKG_VERSION"));
    println!("Bluesnap Daemon - keeps a Bluetooth speaker connected and a snapclient playing to it");
    println!();
    println!("{USAGE}");
    println!();
    println!("The daemon is normally run by a service manager. It listens on a Unix");
    println!("socket for commands from `bluesnap`.");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <path>  Config file (default: $BLUESNAP_CONFIG, then");
    println!("                         ~/.config/bluesnap/bluesnap.toml, then");
    println!("                         {})", env::SYSTEM_CONFIG_PATH);
    println!("    -f, --foreground     Also log to stderr");
    println!("    -h, --help           Print help information");
    println!("    -v, --version        Print version information");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(Invocation::Version) => {
            println!("bluesnapd {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Ok(Invocation::Help) => {
            print_help();
            return Ok(());
        }
        Ok(Invocation::Run(options)) => options,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    let config_path = options.config.clone().unwrap_or_else(env::config_path);
    let settings = match Settings::load(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("bluesnapd: {e}");
            std::process::exit(1);
        }
    };
    let paths = Paths::load()?;

    // Startup marker goes in before tracing so the CLI can find it
    std::fs::create_dir_all(&paths.state_dir)?;
    rotate_log_if_needed(&paths.log_path);
    write_startup_marker(&paths.log_path)?;

    let log_guard = setup_logging(&paths.log_path, &settings, options.foreground)?;

    info!(config = %config_path.display(), "Starting bluesnapd");

    let StartupResult {
        mut daemon,
        listener: unix_listener,
    } = match lifecycle::startup(&paths, &settings).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&paths.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("bluesnapd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            // Tracing is non-blocking and may not flush before exit
            write_startup_error(&paths.log_path, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            eprintln!("bluesnapd: {e}");
            std::process::exit(1);
        }
    };

    let shutdown_notify = Arc::new(Notify::new());

    let listener = Listener::new(
        unix_listener,
        Arc::clone(&daemon.bridge),
        Arc::clone(&shutdown_notify),
        env::ipc_timeout(),
    );
    tokio::spawn(listener.run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("Daemon ready, listening on {}", paths.socket_path.display());

    // Signal ready for parent process (e.g., systemd, test harness)
    println!("READY");

    tokio::select! {
        _ = shutdown_notify.notified() => info!("Shutdown requested via command"),
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }

    daemon.shutdown().await;
    info!(uptime_secs = daemon.start_time.elapsed().as_secs(), "Daemon stopped");
    Ok(())
}

/// Rotate once the log passes this size
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Rotated files kept beside the live log (`.1` is newest)
const MAX_ROTATED_LOGS: u32 = 3;

/// Shift `log.1..log.N` up by one, dropping the oldest, and move the live
/// log to `log.1` when it has grown past [`MAX_LOG_SIZE`].
fn rotate_log_if_needed(log_path: &Path) {
    let Ok(meta) = std::fs::metadata(log_path) else {
        return;
    };
    if meta.len() <= MAX_LOG_SIZE {
        return;
    }

    let rotated = |n: u32| {
        let mut name = log_path.as_os_str().to_owned();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    };
    let _ = std::fs::remove_file(rotated(MAX_ROTATED_LOGS));
    for n in (1..MAX_ROTATED_LOGS).rev() {
        let from = rotated(n);
        if from.exists() {
            let _ = std::fs::rename(&from, rotated(n + 1));
        }
    }
    let _ = std::fs::rename(log_path, rotated(1));
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- bluesnapd: starting (pid: 12345) ---"
const STARTUP_MARKER_PREFIX: &str = "--- bluesnapd: starting (pid: ";

fn write_startup_marker(log_path: &Path) -> Result<(), LifecycleError> {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

fn write_startup_error(log_path: &Path, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    log_path: &Path,
    settings: &Settings,
    foreground: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never(
        log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        log_path.file_name().ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(foreground.then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
