//! Integration port — lifecycle and service-call handling for device integrations.
//!
//! An integration bridges an external device client (Bosch gateway, simulated
//! hardware, …) into the hub. It discovers devices/entities on startup,
//! keeps their state current, and handles service calls directed at entities
//! it owns.

use std::future::Future;

use boschhub_domain::device::Device;
use boschhub_domain::entity::Entity;
use boschhub_domain::error::HubError;
use boschhub_domain::event::Event;
use boschhub_domain::id::EntityId;

/// Context provided to integrations for persisting discoveries and
/// committing state.
///
/// This is a **port**: adapters call it to persist devices and entities
/// they discover. `ServiceContext` is the concrete implementation,
/// backed by `DeviceService` and `EntityService`.
pub trait IntegrationContext: Send + Sync {
    /// Persist a discovered device (create or update by `integration`+`unique_id`).
    fn upsert_device(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, HubError>> + Send;

    /// Commit an entity snapshot (create or update by `entity_id` string).
    ///
    /// Also publishes `StateChanged` / `EntityCreated` events through the
    /// event bus when appropriate (delegated to `EntityService`).
    fn upsert_entity(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, HubError>> + Send;

    /// Publish a domain event to the event bus.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Convenience: persist a full [`DiscoveredDevice`] (device + all entities).
    fn persist_discovered(
        &self,
        dd: DiscoveredDevice,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        async move {
            self.upsert_device(dd.device).await?;
            for entity in dd.entities {
                self.upsert_entity(entity).await?;
            }
            Ok(())
        }
    }
}

/// A pluggable device integration.
///
/// The binary crate calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup) — discover and persist devices, seed state
/// 2. [`start_background`](Self::start_background) — spawn long-running tasks
/// 3. (the hub runs, forwarding service calls via [`handle_service_call`](Self::handle_service_call))
/// 4. [`teardown`](Self::teardown) — clean up resources
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"bosch"`).
    fn name(&self) -> &'static str;

    /// Discover devices and persist them via `ctx`.
    fn setup(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Start long-running background tasks (polling, signal listeners).
    ///
    /// Spawned tasks commit state via `ctx` and this returns immediately.
    /// The default implementation is a no-op.
    fn start_background(
        &mut self,
        _ctx: impl IntegrationContext + Clone + 'static,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        async { Ok(()) }
    }

    /// Handle a service call (e.g. `set_temperature`) for an entity owned by
    /// this integration.
    ///
    /// Returns the new [`Entity`] state after handling the call; the caller
    /// commits it.
    fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, HubError>> + Send;

    /// Called on graceful shutdown. Clean up any background tasks or connections.
    fn teardown(&mut self) -> impl Future<Output = Result<(), HubError>> + Send;
}

/// A device and its associated entities discovered during integration setup.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub device: Device,
    pub entities: Vec<Entity>,
}
