//! # boschhub-adapter-storage-memory
//!
//! Repository implementations that keep everything in process memory.
//! State is lost on restart; integrations rediscover their devices on every
//! startup anyway.
//!
//! Both repositories are cheaply cloneable handles onto shared maps.

use std::collections::HashMap;
use std::future::{Future, ready};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use boschhub_app::ports::{DeviceRepository, EntityRepository};
use boschhub_domain::device::Device;
use boschhub_domain::entity::Entity;
use boschhub_domain::error::HubError;
use boschhub_domain::id::{DeviceId, EntityId};

fn lock<K, V>(store: &Mutex<HashMap<K, V>>) -> MutexGuard<'_, HashMap<K, V>> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory [`EntityRepository`].
#[derive(Clone, Default)]
pub struct MemoryEntityRepository {
    store: Arc<Mutex<HashMap<EntityId, Entity>>>,
}

impl MemoryEntityRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntityRepository for MemoryEntityRepository {
    fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send {
        lock(&self.store).insert(entity.id, entity.clone());
        ready(Ok(entity))
    }

    fn get_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send {
        ready(Ok(lock(&self.store).get(&id).cloned()))
    }

    fn find_by_entity_id(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send {
        let found = lock(&self.store)
            .values()
            .find(|ent| ent.entity_id == entity_id)
            .cloned();
        ready(Ok(found))
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, HubError>> + Send {
        let mut all: Vec<Entity> = lock(&self.store).values().cloned().collect();
        all.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        ready(Ok(all))
    }

    fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send {
        lock(&self.store).insert(entity.id, entity.clone());
        ready(Ok(entity))
    }
}

/// In-memory [`DeviceRepository`].
#[derive(Clone, Default)]
pub struct MemoryDeviceRepository {
    store: Arc<Mutex<HashMap<DeviceId, Device>>>,
}

impl MemoryDeviceRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceRepository for MemoryDeviceRepository {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send {
        lock(&self.store).insert(device.id, device.clone());
        ready(Ok(device))
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HubError>> + Send {
        ready(Ok(lock(&self.store).get(&id).cloned()))
    }

    fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, HubError>> + Send {
        let found = lock(&self.store)
            .values()
            .find(|dev| dev.integration == integration && dev.unique_id == unique_id)
            .cloned();
        ready(Ok(found))
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send {
        let mut all: Vec<Device> = lock(&self.store).values().cloned().collect();
        all.sort_by(|a, b| a.unique_id.cmp(&b.unique_id));
        ready(Ok(all))
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send {
        lock(&self.store).insert(device.id, device.clone());
        ready(Ok(device))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boschhub_domain::entity::EntityState;

    fn entity(entity_id: &str) -> Entity {
        Entity::builder()
            .entity_id(entity_id)
            .friendly_name("hc")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_find_entity_by_entity_id() {
        let repo = MemoryEntityRepository::new();
        let created = repo.create(entity("climate.bosch_hc1")).await.unwrap();

        let found = repo.find_by_entity_id("climate.bosch_hc1").await.unwrap();
        assert_eq!(found.map(|e| e.id), Some(created.id));
        assert!(repo.find_by_entity_id("climate.other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_replace_entity_on_update() {
        let repo = MemoryEntityRepository::new();
        let mut stored = repo.create(entity("climate.bosch_hc1")).await.unwrap();
        stored.state = EntityState::On;
        repo.update(stored.clone()).await.unwrap();

        let fetched = repo.get_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.state, EntityState::On);
    }

    #[tokio::test]
    async fn should_list_entities_sorted_by_entity_id() {
        let repo = MemoryEntityRepository::new();
        repo.create(entity("climate.bosch_hc2")).await.unwrap();
        repo.create(entity("climate.bosch_hc1")).await.unwrap();

        let ids: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.entity_id)
            .collect();
        assert_eq!(ids, ["climate.bosch_hc1", "climate.bosch_hc2"]);
    }

    #[tokio::test]
    async fn should_share_store_between_clones() {
        let repo = MemoryDeviceRepository::new();
        let device = Device::builder()
            .name("Heating circuit hc1")
            .integration("bosch")
            .unique_id("hc1gw")
            .build()
            .unwrap();
        repo.clone().create(device).await.unwrap();

        let found = repo
            .find_by_integration_unique_id("bosch", "hc1gw")
            .await
            .unwrap();
        assert!(found.is_some());
        assert!(
            repo.find_by_integration_unique_id("virtual", "hc1gw")
                .await
                .unwrap()
                .is_none()
        );
    }
}
