//! Session command handler.
//!
//! Runs a breathing session in the terminal: builds a store-backed
//! timer engine, starts it, and renders every published sample until
//! the optional deadline passes or the session is interrupted.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::args::SessionRunArgs;
use crate::config::loader;
use crate::error::BreathboxError;
use crate::store::{FileStore, SettingsStore};
use crate::timer::engine::{TimerEngine, TimerOptions, TimerSample};
use crate::timer::phase::PhaseDuration;

/// Run a breathing session in the terminal.
///
/// # Errors
///
/// Returns a configuration error if the config file fails to load.
pub async fn run(args: &SessionRunArgs, cancel: CancellationToken) -> Result<(), BreathboxError> {
    let loaded = loader::load_or_default(args.config.as_deref())?;
    for warning in &loaded.warnings {
        warn!(location = %warning.path, "{}", warning.message);
    }
    let config = loaded.config;

    let store: Arc<dyn SettingsStore> = Arc::new(FileStore::new(&config.store.dir));
    let engine = Arc::new(TimerEngine::new(
        store,
        TimerOptions {
            default_duration: PhaseDuration::from_secs_f64(config.timer.default_phase_seconds),
            sample_interval: Duration::from_millis(config.timer.sample_interval_ms),
        },
    ));

    if let Some(seconds) = args.phase_seconds {
        let duration = engine.set_phase_duration(seconds);
        info!(%duration, "phase duration overridden");
    }

    println!(
        "box breathing — {}s per phase (inhale, hold, exhale, hold)",
        engine.phase_duration()
    );

    let mut samples = engine.subscribe();
    engine.start();

    let deadline = args.run_for.map(|d| tokio::time::Instant::now() + d);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            () = sleep_until_deadline(deadline) => break,
            changed = samples.changed() => {
                if changed.is_err() {
                    break;
                }
                render(*samples.borrow_and_update());
            }
        }
    }

    engine.pause();
    let final_sample = engine.sample();
    println!("\nsession ended at {}", format_mm_ss(final_sample.elapsed));
    info!(elapsed = ?final_sample.elapsed, "session ended");
    Ok(())
}

async fn sleep_until_deadline(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn render(sample: TimerSample) {
    let marker = if sample.is_hold { "HOLD" } else { sample.phase.label() };
    print!("\r{}  {:<6}", format_mm_ss(sample.elapsed), marker);
    let _ = std::io::stdout().flush();
}

/// Formats elapsed session time as `m:ss`.
fn format_mm_ss(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(Duration::ZERO), "0:00");
        assert_eq!(format_mm_ss(Duration::from_secs(5)), "0:05");
        assert_eq!(format_mm_ss(Duration::from_secs(65)), "1:05");
        assert_eq!(format_mm_ss(Duration::from_secs(600)), "10:00");
        assert_eq!(format_mm_ss(Duration::from_millis(59_999)), "0:59");
    }
}
