//! # boschhubd — boschhub daemon
//!
//! Composition root that wires all adapters together and runs the Bosch
//! climate integration until interrupted.
//!
//! ## Responsibilities
//! - Load configuration (`boschhub.toml`, env vars) and install logging
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Set up the Bosch integration against the configured gateway
//! - Log every domain event published on the bus
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use boschhub_adapter_bosch::BoschIntegration;
use boschhub_adapter_storage_memory::{MemoryDeviceRepository, MemoryEntityRepository};
use boschhub_adapter_virtual::VirtualGateway;
use boschhub_app::dispatcher::Dispatcher;
use boschhub_app::event_bus::InProcessEventBus;
use boschhub_app::ports::Integration;
use boschhub_app::services::device_service::DeviceService;
use boschhub_app::services::entity_service::EntityService;
use boschhub_app::services::integration_context::ServiceContext;
use boschhub_domain::event::Event;

use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Event bus
    let event_bus = InProcessEventBus::new(256);
    let event_log = tokio::spawn(log_events(event_bus.subscribe()));

    // Services
    let entity_service = Arc::new(EntityService::new(
        MemoryEntityRepository::new(),
        event_bus.clone(),
    ));
    let device_service = Arc::new(DeviceService::new(MemoryDeviceRepository::new()));
    let ctx = ServiceContext::new(device_service, entity_service, event_bus);

    // Bosch integration
    let gateway = Arc::new(VirtualGateway::new(&config.gateway));
    let mut bosch = BoschIntegration::new(config.bosch, gateway, Dispatcher::new());
    bosch.setup(&ctx).await?;
    bosch.start_background(ctx.clone()).await?;
    let devices = ctx.devices().list_devices().await?;
    let entities = ctx.entities().list_entities().await?;
    tracing::info!(
        integration = bosch.name(),
        devices = devices.len(),
        entities = entities.len(),
        "boschhubd running"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");

    bosch.teardown().await?;
    for id in bosch.entity_ids() {
        let entity = ctx.entities().get_entity(id).await?;
        let device = match entity.device_id {
            Some(device_id) => Some(ctx.devices().get_device(device_id).await?.name),
            None => None,
        };
        tracing::info!(
            entity_id = %entity.entity_id,
            device = ?device,
            state = %entity.state,
            last_changed = %entity.last_changed,
            "final state"
        );
    }
    event_log.abort();
    Ok(())
}

async fn log_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => tracing::info!(
                event_type = ?event.event_type,
                entity = ?event.entity_id,
                data = %event.data,
                "event"
            ),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
