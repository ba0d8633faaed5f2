//! Entity service — use-cases for managing entities.

use boschhub_domain::entity::Entity;
use boschhub_domain::error::{HubError, NotFoundError};
use boschhub_domain::event::{Event, EventType};
use boschhub_domain::id::EntityId;
use boschhub_domain::time::now;

use crate::ports::{EntityRepository, EventPublisher};

/// Application service for entity storage and state changes.
///
/// Every create or effective change is published on the event bus.
pub struct EntityService<R, P> {
    repo: R,
    publisher: P,
}

impl<R: EntityRepository, P: EventPublisher> EntityService<R, P> {
    /// Create a new service backed by the given repository and publisher.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// Look up an entity by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when no entity with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_entity(&self, id: EntityId) -> Result<Entity, HubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Entity",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all entities.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_entities(&self) -> Result<Vec<Entity>, HubError> {
        self.repo.get_all().await
    }

    /// Create or update an entity by its `entity_id` string.
    ///
    /// An existing record keeps its stored id. `EntityCreated` is published
    /// for new entities, `StateChanged` only when state or attributes
    /// differ from the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if invariants fail, or a storage or
    /// publish error.
    #[tracing::instrument(skip(self, entity), fields(entity_id = %entity.entity_id))]
    pub async fn upsert_entity(&self, entity: Entity) -> Result<Entity, HubError> {
        entity.validate()?;

        let Some(existing) = self.repo.find_by_entity_id(&entity.entity_id).await? else {
            let created = self.repo.create(entity).await?;
            tracing::debug!("entity created");
            self.publisher
                .publish(Event::new(
                    EventType::EntityCreated,
                    Some(created.id),
                    serde_json::json!({ "entity_id": created.entity_id }),
                ))
                .await?;
            return Ok(created);
        };

        if !existing.differs_from(&entity) {
            return Ok(existing);
        }

        let from = existing.state;
        let mut updated = existing;
        updated.update_state(entity.state, now());
        updated.friendly_name = entity.friendly_name;
        updated.attributes = entity.attributes;
        updated.device_id = entity.device_id.or(updated.device_id);
        let updated = self.repo.update(updated).await?;

        tracing::debug!(from = %from, to = %updated.state, "entity state changed");
        self.publisher
            .publish(Event::new(
                EventType::StateChanged,
                Some(updated.id),
                serde_json::json!({
                    "entity_id": updated.entity_id,
                    "from": from,
                    "to": updated.state,
                    "attributes": updated.attributes,
                }),
            ))
            .await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boschhub_domain::entity::{AttributeValue, EntityState};
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    use crate::event_bus::InProcessEventBus;

    #[derive(Default)]
    struct InMemoryEntityRepo {
        store: Mutex<HashMap<EntityId, Entity>>,
    }

    impl EntityRepository for InMemoryEntityRepo {
        fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send {
            self.store.lock().unwrap().insert(entity.id, entity.clone());
            async { Ok(entity) }
        }

        fn get_by_id(
            &self,
            id: EntityId,
        ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send {
            let result = self.store.lock().unwrap().get(&id).cloned();
            async { Ok(result) }
        }

        fn find_by_entity_id(
            &self,
            entity_id: &str,
        ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send {
            let result = self
                .store
                .lock()
                .unwrap()
                .values()
                .find(|ent| ent.entity_id == entity_id)
                .cloned();
            async { Ok(result) }
        }

        fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, HubError>> + Send {
            let result: Vec<Entity> = self.store.lock().unwrap().values().cloned().collect();
            async { Ok(result) }
        }

        fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send {
            self.store.lock().unwrap().insert(entity.id, entity.clone());
            async { Ok(entity) }
        }
    }

    fn make_service() -> (
        EntityService<InMemoryEntityRepo, InProcessEventBus>,
        InProcessEventBus,
    ) {
        let bus = InProcessEventBus::new(16);
        (
            EntityService::new(InMemoryEntityRepo::default(), bus.clone()),
            bus,
        )
    }

    fn thermostat(state: EntityState) -> Entity {
        Entity::builder()
            .entity_id("climate.bosch_hc1")
            .friendly_name("hc1")
            .state(state)
            .attribute("temperature", AttributeValue::Float(21.0))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_publish_when_entity_is_new() {
        let (svc, bus) = make_service();
        let mut rx = bus.subscribe();

        let created = svc.upsert_entity(thermostat(EntityState::Unknown)).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::EntityCreated);
        assert_eq!(event.entity_id, Some(created.id));
        assert_eq!(svc.list_entities().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_publish_state_changed_and_keep_stored_id() {
        let (svc, bus) = make_service();
        let created = svc.upsert_entity(thermostat(EntityState::Unknown)).await.unwrap();
        let mut rx = bus.subscribe();

        let updated = svc.upsert_entity(thermostat(EntityState::On)).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.state, EntityState::On);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::StateChanged);
        assert_eq!(event.data["from"], "unknown");
        assert_eq!(event.data["to"], "on");
    }

    #[tokio::test]
    async fn should_not_publish_when_nothing_changed() {
        let (svc, bus) = make_service();
        svc.upsert_entity(thermostat(EntityState::On)).await.unwrap();
        let mut rx = bus.subscribe();

        svc.upsert_entity(thermostat(EntityState::On)).await.unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn should_publish_when_only_attributes_changed() {
        let (svc, bus) = make_service();
        svc.upsert_entity(thermostat(EntityState::On)).await.unwrap();
        let mut rx = bus.subscribe();

        let mut warmer = thermostat(EntityState::On);
        warmer.set_attribute("temperature", AttributeValue::Float(22.5));
        let updated = svc.upsert_entity(warmer).await.unwrap();

        assert_eq!(
            updated.get_attribute("temperature"),
            Some(&AttributeValue::Float(22.5))
        );
        assert_eq!(rx.recv().await.unwrap().event_type, EventType::StateChanged);
    }

    #[tokio::test]
    async fn should_return_not_found_when_entity_missing() {
        let (svc, _bus) = make_service();
        let result = svc.get_entity(EntityId::new()).await;
        assert!(matches!(result, Err(HubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_reject_invalid_entity() {
        let (svc, _bus) = make_service();
        let mut entity = thermostat(EntityState::On);
        entity.entity_id = String::new();

        let result = svc.upsert_entity(entity).await;
        assert!(matches!(result, Err(HubError::Validation(_))));
    }
}
