//! # minifenced — minifence daemon
//!
//! Composition root that wires the adapters into the rule engine and runs it.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Load the stored rules through the trigger registry
//! - Construct the adapters and the rule engine, injecting them via port traits
//! - Tick the engine until SIGINT, then write the rules back
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod store;

use minifence_adapter_virtual::{LoggingActionExecutor, VirtualLocationProvider};
use minifence_app::event_bus::InProcessEventBus;
use minifence_app::ports::SystemClock;
use minifence_app::rule_engine::RuleEngine;
use minifence_domain::trigger::TriggerRegistry;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    let loaded = store::load(&config.rules.path, TriggerRegistry::builtin())?;
    let persist = !loaded.is_lossy();
    if !persist {
        tracing::warn!(
            dropped = loaded.dropped,
            "some rules or nested triggers could not be decoded, the rule file will not be rewritten"
        );
    }

    // Adapters
    let location = VirtualLocationProvider::default();
    if let Some(point) = config.location.position() {
        location.set_position(point);
    }
    let executor = LoggingActionExecutor::default();

    // Event bus
    let event_bus = InProcessEventBus::new(256);
    let mut events = event_bus.subscribe();
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            tracing::debug!(
                id = %event.id,
                event_type = %event.event_type,
                rule_id = ?event.rule_id,
                data = %event.data,
                "event"
            );
        }
    });

    let engine = RuleEngine::new(loaded.rules, location, SystemClock, executor, event_bus);
    engine.run(config.interval(), shutdown_signal()).await;

    if persist && !engine.rules().is_empty() {
        store::save(&config.rules.path, engine.rules())?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
