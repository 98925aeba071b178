//! Match runner binary for the Bakunawa round engine.
//!
//! Loads configuration and the effect catalog, builds a [`RoundEngine`],
//! and runs one match under the async runner until it ends or the
//! operator presses Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `bakunawa-config.yaml`
//! 3. Load the effect catalog (YAML file or built-in pools)
//! 4. Build the round engine and attach listeners
//! 5. Install the Ctrl-C stop handler
//! 6. Run the match
//! 7. Log the result and export the final snapshot
//!
//! [`RoundEngine`]: bakunawa_core::engine::RoundEngine

mod error;
mod match_log;

use std::path::Path;
use std::sync::{Arc, Mutex};

use bakunawa_core::catalog::{BuiltinCatalog, CatalogLoader, EffectCatalog, YamlCatalog};
use bakunawa_core::config::EngineConfig;
use bakunawa_core::control::MatchControl;
use bakunawa_core::engine::RoundEngine;
use bakunawa_core::{runner, snapshot};
use bakunawa_events::EffectHistoryLog;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::match_log::MatchLogListener;

/// Name of the configuration file, relative to the working directory.
const CONFIG_FILE: &str = "bakunawa-config.yaml";

/// Application entry point for the match runner.
///
/// # Errors
///
/// Returns an error if configuration, catalog loading, the match run,
/// or the snapshot export fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("bakunawa-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        max_rounds = config.rounds.max_rounds,
        favor_min = config.favor.min,
        favor_max = config.favor.max,
        time_unit_ms = config.timing.time_unit_ms,
        seed = ?config.random.seed,
        "Configuration loaded"
    );

    // 3. Load the effect catalog.
    let catalog = load_catalog(&config)?;
    info!(
        normal_effects = catalog.normal_effects().len(),
        neutral_effects = catalog.neutral_effects().len(),
        phenomena = catalog.phenomena().len(),
        "Effect catalog loaded"
    );

    // 4. Build the engine.
    let snapshot_path = config.files.snapshot_path.clone();
    let mut engine = RoundEngine::new(config, catalog)?;
    let history = Arc::new(Mutex::new(EffectHistoryLog::new()));
    engine.add_listener(MatchLogListener::new());
    engine.add_listener(Arc::clone(&history));
    info!(match_id = %engine.match_id(), "Round engine initialized");

    // 5. Stop cleanly on Ctrl-C.
    let control = Arc::new(MatchControl::new());
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping match");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    // 6. Run the match.
    let result = runner::run_match(&mut engine, &control)
        .await
        .map_err(EngineError::from)?;

    // 7. Log results.
    runner::log_match_end(&result);
    if let Ok(log) = history.lock() {
        for entry in log.entries() {
            info!(
                round = entry.round,
                source = ?entry.source,
                effect = %entry.name,
                "Effect history"
            );
        }
    }

    if let Some(path) = snapshot_path {
        export_snapshot(&engine, &path)?;
    }

    info!(
        end_reason = ?result.end_reason,
        elapsed_seconds = control.elapsed_seconds(),
        "bakunawa-engine shutdown complete"
    );

    Ok(())
}

/// Load the engine configuration from `bakunawa-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<EngineConfig, EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        let config = EngineConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        let mut config = EngineConfig::default();
        config.random.apply_env_overrides();
        Ok(config)
    }
}

/// Load the effect catalog named in the config, or the built-in pools.
fn load_catalog(config: &EngineConfig) -> Result<EffectCatalog, EngineError> {
    let loader: Box<dyn CatalogLoader> = match &config.files.catalog_path {
        Some(path) => {
            info!(path = %path.display(), "Loading effect catalog");
            Box::new(YamlCatalog::new(path.clone()))
        }
        None => Box::new(BuiltinCatalog),
    };
    Ok(EffectCatalog::load(loader.as_ref())?)
}

/// Write the engine's final state as a JSON snapshot.
fn export_snapshot(engine: &RoundEngine, path: &Path) -> Result<(), EngineError> {
    snapshot::save(path, &engine.snapshot())?;
    info!(path = %path.display(), round = engine.current_round(), "Snapshot written");
    Ok(())
}
