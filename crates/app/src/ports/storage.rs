//! Storage port — repository traits for entities and devices.

use std::future::Future;

use boschhub_domain::device::Device;
use boschhub_domain::entity::Entity;
use boschhub_domain::error::HubError;
use boschhub_domain::id::{DeviceId, EntityId};

/// Storage for [`Entity`] records.
pub trait EntityRepository {
    fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send;

    fn get_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send;

    /// Look up by the human-readable `entity_id` (e.g. `climate.bosch_hc1`).
    fn find_by_entity_id(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, HubError>> + Send;

    fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send;
}

/// Storage for [`Device`] records.
pub trait DeviceRepository {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send;

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HubError>> + Send;

    fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, HubError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send;

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send;
}
