//! Host side of the integration boundary.

use std::sync::Arc;

use boschhub_domain::device::Device;
use boschhub_domain::entity::Entity;
use boschhub_domain::error::HubError;
use boschhub_domain::event::Event;

use crate::ports::{DeviceRepository, EntityRepository, EventPublisher, IntegrationContext};
use crate::services::device_service::DeviceService;
use crate::services::entity_service::EntityService;

/// [`IntegrationContext`] that commits through the device and entity
/// services.
///
/// Entity commits go through [`EntityService::upsert_entity`], so the
/// `EntityCreated` / `StateChanged` events reach the bus without the
/// integration publishing them itself. Clones share the same services.
pub struct ServiceContext<DR, ER, EP> {
    devices: Arc<DeviceService<DR>>,
    entities: Arc<EntityService<ER, EP>>,
    events: EP,
}

impl<DR, ER, EP> ServiceContext<DR, ER, EP> {
    pub fn new(
        devices: Arc<DeviceService<DR>>,
        entities: Arc<EntityService<ER, EP>>,
        events: EP,
    ) -> Self {
        Self {
            devices,
            entities,
            events,
        }
    }

    #[must_use]
    pub fn entities(&self) -> &EntityService<ER, EP> {
        &self.entities
    }

    #[must_use]
    pub fn devices(&self) -> &DeviceService<DR> {
        &self.devices
    }
}

impl<DR, ER, EP: Clone> Clone for ServiceContext<DR, ER, EP> {
    fn clone(&self) -> Self {
        Self::new(
            Arc::clone(&self.devices),
            Arc::clone(&self.entities),
            self.events.clone(),
        )
    }
}

impl<DR, ER, EP> IntegrationContext for ServiceContext<DR, ER, EP>
where
    DR: DeviceRepository + Send + Sync + 'static,
    ER: EntityRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    async fn upsert_device(&self, device: Device) -> Result<Device, HubError> {
        self.devices.upsert_device(device).await
    }

    async fn upsert_entity(&self, entity: Entity) -> Result<Entity, HubError> {
        let committed = self.entities.upsert_entity(entity).await?;
        tracing::trace!(entity_id = %committed.entity_id, state = %committed.state, "entity committed");
        Ok(committed)
    }

    async fn publish(&self, event: Event) -> Result<(), HubError> {
        self.events.publish(event).await
    }
}
