//! Auto Fish - demo driver
//!
//! Runs the fishing agent against a simulated pond at 20 ticks per second.
//! Stops on Ctrl-C, or after `AUTOFISH_SIM_SECONDS` seconds when set.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use auto_fish::host::{EntityId, SimulatedPond};
use auto_fish::log_main::{end_session, get_sessions_path, start_session};
use auto_fish::utils::path::get_data_dir;
use auto_fish::{get_settings, Fisher};

const TICK_INTERVAL: Duration = Duration::from_millis(50);
const STATUS_INTERVAL: Duration = Duration::from_secs(5);
/// How long a simulated fish takes to bite after the lure lands
const BITE_DELAY: Duration = Duration::from_secs(9);

// Log filter configuration:
// - Sets default level to 'info'
// - Keeps the tokio runtime quiet
const LOG_FILTER: &str = "info,auto_fish=info,tokio=warn,mio=warn";

fn init_logging(base: &Path) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_dir = base.join("debug").join("log");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_file_path = log_dir.join("debug.log");
    let file_result = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LOG_FILTER));

    match file_result {
        Ok(file) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE);

            let stdout_layer = tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(stdout_layer)
                .init();

            tracing::info!("[INIT] Logging initialized, file: {:?}", log_file_path);
        }
        Err(e) => {
            // Fallback: stdout-only logging with same filter
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new(LOG_FILTER))
                .init();
            eprintln!(
                "[INIT] Failed to create debug log file at {:?}: {}",
                log_file_path, e
            );
        }
    }
}

fn run_limit() -> Option<Duration> {
    let raw = std::env::var("AUTOFISH_SIM_SECONDS").ok()?;
    match raw.parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            tracing::warn!("[INIT] Ignoring AUTOFISH_SIM_SECONDS={:?}: {}", raw, e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base = get_data_dir();
    init_logging(&base);

    println!("Auto Fish v{}", env!("CARGO_PKG_VERSION"));
    println!("================================");

    let settings = get_settings();
    println!(
        "Settings: keep rotation={}, sensitivity={:?}, reaction speed={:?}",
        settings.keep_rotation, settings.sensitivity, settings.reaction_speed
    );

    let sessions_path = get_sessions_path();
    if let Err(e) = start_session(&sessions_path) {
        tracing::warn!("[SESSION] Failed to record session start: {}", e);
    }

    let pond = Arc::new(SimulatedPond::new());
    let fisher = Fisher::start(pond.clone(), settings).context("Failed to start fisher")?;
    let status = fisher.status();

    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    let mut report = tokio::time::interval(STATUS_INTERVAL);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let limit = run_limit();
    let time_up = async move {
        match limit {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(time_up);

    let mut last_lure: Option<EntityId> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                pond.tick();
                let lure = pond.lure();
                if lure.is_some() && lure != last_lure {
                    pond.bite_after(BITE_DELAY);
                }
                last_lure = lure;
            }
            _ = report.tick() => {
                tracing::info!("[STATUS] {}", status.to_json());
            }
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    tracing::warn!("[INIT] Ctrl-C handler failed: {}", e);
                }
                println!("Ctrl-C received, stopping...");
                break;
            }
            _ = &mut time_up => {
                println!("Simulation time is up, stopping...");
                break;
            }
        }
    }

    fisher.stop();
    fisher.join().await.context("Fishing task panicked")?;

    let stats = status.get_stats();
    println!(
        "Session: casts={}, bites={}, timeouts={}, lure failures={}, rate={:.1}%",
        stats.casts,
        stats.bites,
        stats.timeouts,
        stats.lure_failures,
        stats.bite_rate()
    );

    match end_session(&sessions_path, stats) {
        Ok(true) => {}
        Ok(false) => tracing::warn!("[SESSION] No open session to close"),
        Err(e) => tracing::warn!("[SESSION] Failed to record session stop: {}", e),
    }

    Ok(())
}
