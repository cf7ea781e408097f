//! # hkbridged — hkbridge daemon
//!
//! Composition root that wires the bridge runtime to its adapters.
//!
//! ## Responsibilities
//! - Load configuration (`hkbridge.toml`, env vars)
//! - Initialise `tracing`
//! - Start the upstream integrations publishing on the event bus
//! - Bind configured entities to accessories on the bridge
//! - Drive the debounce windows with a periodic time-changed signal
//! - Run the bridge loop until SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use hkbridge_adapter_virtual::{LogPresenter, VirtualHome, VirtualPeer};
use hkbridge_app::accessories::AccessoryTypeRegistry;
use hkbridge_app::bridge::HomeBridge;
use hkbridge_app::driver::HomeDriver;
use hkbridge_app::event_bus::InProcessEventBus;
use hkbridge_app::home_accessory::{AccessoryOverrides, HomeAccessory};
use hkbridge_app::ports::{EventPublisher, SystemClock};
use hkbridge_app::runtime::BridgeRuntime;
use hkbridge_domain::entity::Entity;
use hkbridge_domain::event::Event;
use hkbridge_domain::id::AccessoryId;
use hkbridge_domain::time::now;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    let event_bus = InProcessEventBus::default();

    // Upstream
    let home = if config.integrations.virtual_enabled {
        let home = Arc::new(VirtualHome::with_demo_entities(event_bus.clone())?);
        let events = event_bus.subscribe();
        let runner = Arc::clone(&home);
        tokio::spawn(async move { runner.run(events).await });
        tracing::info!(entities = home.entities().len(), "virtual home started");
        Some(home)
    } else {
        None
    };
    let entities = home.as_ref().map(|h| h.entities()).unwrap_or_default();

    // Bridge
    let mut bridge = HomeBridge::new(config.bridge.name.clone())?;
    bind_accessories(&mut bridge, &config, &entities);

    let driver = HomeDriver::new(
        config.bridge.context.clone(),
        config.bridge.name.clone(),
        config.pairing_state()?,
        Arc::new(VirtualPeer::default()),
        Arc::new(LogPresenter::default()),
    );

    // Time signal
    let ticker = {
        let bus = event_bus.clone();
        let period = config.tick_interval();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(err) = bus.publish(Event::time_changed(now())).await {
                    tracing::warn!(error = %err, "failed to publish time signal");
                }
            }
        })
    };

    // No protocol transport is attached to the virtual peer, so nothing
    // sends inbound requests yet.
    let (_inbound_tx, inbound_rx) = mpsc::channel(32);

    let runtime = BridgeRuntime::new(
        bridge,
        driver,
        event_bus.clone(),
        SystemClock,
        config.quiet_period(),
    );
    let runtime = runtime
        .run(event_bus.subscribe(), inbound_rx, shutdown_signal())
        .await;

    ticker.abort();
    tracing::info!(
        accessories = runtime.bridge().len(),
        paired = runtime.driver().state().is_paired(),
        "hkbridged stopped"
    );
    Ok(())
}

/// Add an accessory for every configured entity, or for every known entity
/// when none is configured. Entities that cannot be bound are skipped.
fn bind_accessories(bridge: &mut HomeBridge, config: &Config, entities: &[Entity]) {
    let registry = AccessoryTypeRegistry::default();

    let wanted: Vec<(&Entity, AccessoryId, AccessoryOverrides)> = if config.accessories.is_empty() {
        entities
            .iter()
            .map(|e| (e, AccessoryId::for_entity(&e.entity_id), AccessoryOverrides::default()))
            .collect()
    } else {
        config
            .accessories
            .iter()
            .filter_map(|acc| {
                let entity_id = acc.entity_id().ok()?;
                let Some(entity) = entities.iter().find(|e| e.entity_id == entity_id) else {
                    tracing::warn!(%entity_id, "configured entity is unknown, skipping");
                    return None;
                };
                Some((entity, acc.aid(&entity_id), acc.overrides()))
            })
            .collect()
    };

    for (entity, aid, overrides) in wanted {
        let result = HomeAccessory::from_registry(&registry, aid, entity, &overrides)
            .and_then(|accessory| bridge.add(accessory));
        match result {
            Ok(()) => tracing::info!(%aid, entity_id = %entity.entity_id, "accessory bound"),
            Err(err) => {
                tracing::warn!(%aid, entity_id = %entity.entity_id, error = %err, "cannot bind entity");
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
