//! # boschhub-adapter-bosch
//!
//! Bosch heating-circuit integration. Every heating circuit behind a Bosch
//! gateway is exposed as one `climate.*` entity.
//!
//! ## How it works
//!
//! | Step | Trigger | Effect |
//! |------|---------|--------|
//! | Setup | [`Integration::setup`] | one [`BoschThermostat`] per circuit, device + entity persisted, first refresh |
//! | Poll | every `update_interval_secs` | each circuit refreshed from the gateway, then [`SIGNAL_CLIMATE_UPDATE`] dispatched |
//! | Update cycle | [`SIGNAL_CLIMATE_UPDATE`] | snapshot + mode map rebuilt, changed entities committed |
//! | Service call | `set_temperature` / `set_hvac_mode` | command forwarded upstream, new entity returned |
//!
//! A successful mode change additionally schedules one refresh
//! `mode_refresh_delay_ms` later, since the gateway reports the new mode
//! with some lag.
//!
//! The client that talks to the gateway is abstracted behind the traits in
//! [`upstream`].
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `boschhub-app` and `boschhub-domain`.

mod config;
mod error;
pub mod mode_map;
mod refresh;
pub mod snapshot;
mod thermostat;
pub mod upstream;

#[cfg(test)]
mod fake;

pub use config::BoschConfig;
pub use error::BoschError;
pub use thermostat::{BoschThermostat, UpdateOutcome};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use boschhub_app::dispatcher::Dispatcher;
use boschhub_app::ports::{DiscoveredDevice, Integration, IntegrationContext};
use boschhub_domain::entity::Entity;
use boschhub_domain::error::{HubError, NotFoundError};
use boschhub_domain::id::EntityId;
use boschhub_domain::service::ClimateCommand;

use refresh::{ClimateListener, GatewayPoller, SharedThermostat};
use upstream::{Gateway, GatewayInfo};

/// Integration name, also used as the device `integration` field.
pub const DOMAIN: &str = "bosch";

/// Signal telling every thermostat to run an update cycle.
pub const SIGNAL_CLIMATE_UPDATE: &str = "bosch.climate.update";

/// Climate integration for the heating circuits of one Bosch gateway.
pub struct BoschIntegration<G: Gateway> {
    config: BoschConfig,
    gateway: Arc<G>,
    dispatcher: Dispatcher,
    thermostats: HashMap<EntityId, SharedThermostat<G::Circuit>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<G: Gateway + 'static> BoschIntegration<G> {
    #[must_use]
    pub fn new(config: BoschConfig, gateway: Arc<G>, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            gateway,
            dispatcher,
            thermostats: HashMap::new(),
            tasks: Vec::new(),
        }
    }

    /// Check whether this integration owns the given entity.
    #[must_use]
    pub fn owns_entity(&self, entity_id: EntityId) -> bool {
        self.thermostats.contains_key(&entity_id)
    }

    /// Ids of every climate entity created during setup.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.thermostats.keys().copied().collect()
    }

    fn shared_thermostats(&self) -> Vec<SharedThermostat<G::Circuit>> {
        self.thermostats.values().cloned().collect()
    }
}

impl<G: Gateway + 'static> Integration for BoschIntegration<G> {
    fn name(&self) -> &'static str {
        DOMAIN
    }

    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), HubError> {
        let gateway = GatewayInfo::from_gateway(self.gateway.as_ref());
        let circuits = self.gateway.heating_circuits();
        tracing::info!(
            gateway = %gateway.uuid,
            circuits = circuits.len(),
            "setting up bosch climate entities"
        );

        self.thermostats.clear();
        for circuit in circuits {
            let thermostat = BoschThermostat::new(circuit, gateway.clone());
            ctx.persist_discovered(DiscoveredDevice {
                device: thermostat.device()?,
                entities: vec![thermostat.to_entity()?],
            })
            .await?;
            tracing::debug!(
                circuit = %thermostat.name(),
                unique_id = %thermostat.unique_id(),
                "climate entity registered"
            );
            self.thermostats
                .insert(thermostat.entity_id(), Arc::new(Mutex::new(thermostat)));
        }

        refresh::refresh_thermostats(ctx, &self.shared_thermostats()).await;
        Ok(())
    }

    async fn start_background(
        &mut self,
        ctx: impl IntegrationContext + Clone + 'static,
    ) -> Result<(), HubError> {
        let listener = ClimateListener::start(
            ctx,
            self.dispatcher.connect(SIGNAL_CLIMATE_UPDATE),
            self.shared_thermostats(),
        );
        let period = Duration::from_secs(u64::from(self.config.update_interval_secs.max(1)));
        let poller = GatewayPoller::start(Arc::clone(&self.gateway), self.dispatcher.clone(), period);
        self.tasks.extend([listener, poller]);

        tracing::info!(
            interval_secs = self.config.update_interval_secs,
            "bosch refresh loop started"
        );
        Ok(())
    }

    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, HubError> {
        let thermostat = self.thermostats.get(&entity_id).ok_or_else(|| NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        })?;
        let command = ClimateCommand::parse(service, data)?;

        let mut thermostat = thermostat.lock().await;
        match command {
            ClimateCommand::SetTemperature { temperature } => {
                thermostat.set_temperature(temperature).await?;
            }
            ClimateCommand::SetHvacMode { hvac_mode } => {
                if thermostat.set_hvac_mode(hvac_mode).await? {
                    refresh::schedule_refresh(
                        self.dispatcher.clone(),
                        Duration::from_millis(self.config.mode_refresh_delay_ms),
                    );
                }
            }
        }
        thermostat.to_entity()
    }

    async fn teardown(&mut self) -> Result<(), HubError> {
        for handle in self.tasks.drain(..) {
            handle.abort();
        }
        tracing::info!("bosch integration stopped");
        Ok(())
    }
}
