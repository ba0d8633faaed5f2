//! Climate entity for one Bosch heating circuit.
//!
//! [`BoschThermostat`] mirrors the circuit into a [`ThermostatSnapshot`] on
//! every update cycle, keeps the [`ModeMap`] in step with the modes the
//! device currently allows, and forwards host commands to the circuit.

use std::sync::Arc;

use boschhub_domain::climate::{ClimateFeatures, HvacMode, TemperatureUnit};
use boschhub_domain::device::Device;
use boschhub_domain::entity::{AttributeValue, Entity, EntityState};
use boschhub_domain::error::HubError;
use boschhub_domain::id::{DeviceId, EntityId};

use crate::DOMAIN;
use crate::error::BoschError;
use crate::mode_map::ModeMap;
use crate::snapshot::ThermostatSnapshot;
use crate::upstream::{GatewayInfo, HeatingCircuit, OperationMode};

/// Result of one [`BoschThermostat::update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The circuit is not loaded yet; nothing was touched.
    NotReady,
    /// First cycle after the circuit became ready.
    Initialized,
    Changed,
    Unchanged,
}

impl UpdateOutcome {
    /// Whether the host should be handed the new entity state.
    #[must_use]
    pub fn needs_commit(self) -> bool {
        matches!(self, Self::Initialized | Self::Changed)
    }
}

/// Climate adapter around one heating circuit.
pub struct BoschThermostat<C> {
    circuit: Arc<C>,
    name: String,
    unique_id: String,
    gateway: GatewayInfo,
    device_id: DeviceId,
    entity_id: EntityId,
    modes: ModeMap,
    mode: OperationMode,
    snapshot: ThermostatSnapshot,
    ready: bool,
    commit_pending: bool,
}

impl<C: HeatingCircuit> BoschThermostat<C> {
    pub fn new(circuit: Arc<C>, gateway: GatewayInfo) -> Self {
        let name = circuit.name();
        let unique_id = format!("{name}{}", gateway.uuid);
        let modes = ModeMap::fallback(&circuit.strings());
        Self {
            circuit,
            name,
            unique_id,
            gateway,
            device_id: DeviceId::new(),
            entity_id: EntityId::new(),
            modes,
            mode: OperationMode::default(),
            snapshot: ThermostatSnapshot::default(),
            ready: false,
            commit_pending: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Circuit name followed by the gateway uuid.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Human-readable entity handle, e.g. `climate.bosch_gw_42_hc1`.
    #[must_use]
    pub fn object_id(&self) -> String {
        format!(
            "climate.{DOMAIN}_{}_{}",
            slug(&self.gateway.uuid),
            slug(&self.name)
        )
    }

    #[must_use]
    pub fn supported_features(&self) -> ClimateFeatures {
        ClimateFeatures::TARGET_TEMPERATURE
    }

    #[must_use]
    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.snapshot.temperature_unit
    }

    #[must_use]
    pub fn current_temperature(&self) -> Option<f64> {
        self.circuit.current_temperature()
    }

    #[must_use]
    pub fn target_temperature(&self) -> Option<f64> {
        self.circuit.target_temperature()
    }

    /// Host mode of the cached upstream mode, `Off` when it has no mapping.
    #[must_use]
    pub fn hvac_mode(&self) -> HvacMode {
        self.mode
            .value
            .as_deref()
            .and_then(|value| self.modes.host_for(value))
            .unwrap_or(HvacMode::Off)
    }

    #[must_use]
    pub fn hvac_modes(&self) -> Vec<HvacMode> {
        self.modes.modes()
    }

    #[must_use]
    pub fn mode_map(&self) -> &ModeMap {
        &self.modes
    }

    #[must_use]
    pub fn snapshot(&self) -> &ThermostatSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Mirror the circuit into the local snapshot.
    ///
    /// Does nothing until the client reports both the scheme loaded and one
    /// update completed. The first ready cycle always asks for a commit;
    /// later ones only when the snapshot changed or the previous commit was
    /// rejected (see [`commit_failed`](Self::commit_failed)).
    pub fn update(&mut self) -> UpdateOutcome {
        if !self.circuit.is_scheme_ready() || !self.circuit.is_update_initialized() {
            tracing::debug!(circuit = %self.name, "heating circuit not ready yet");
            return UpdateOutcome::NotReady;
        }

        let mode = self.circuit.operation_mode();
        let modes = ModeMap::rebuild(
            &self.circuit.strings(),
            mode.allowed_values.as_deref(),
            mode.value.as_deref(),
        );
        let snapshot = ThermostatSnapshot {
            temperature_unit: TemperatureUnit::from_indicator(
                self.circuit.temperature_units().as_deref(),
            ),
            current_temperature: self.circuit.current_temperature(),
            target_temperature: self.circuit.target_temperature(),
            state: self.circuit.status(),
            hvac_modes: modes.modes(),
            hvac_mode: mode.value.as_deref().and_then(|value| modes.host_for(value)),
        };
        tracing::debug!(circuit = %self.name, mode = ?mode.value, "retrieved mode");

        self.mode = mode;
        self.modes = modes;
        let changed = snapshot != self.snapshot;
        self.snapshot = snapshot;

        if !self.ready {
            self.ready = true;
            self.commit_pending = false;
            return UpdateOutcome::Initialized;
        }
        if changed || std::mem::take(&mut self.commit_pending) {
            UpdateOutcome::Changed
        } else {
            UpdateOutcome::Unchanged
        }
    }

    /// Record that the host rejected the last requested commit, so the next
    /// ready cycle asks for it again even without changes.
    pub fn commit_failed(&mut self) {
        self.commit_pending = true;
    }

    /// Switch the circuit to the upstream mode mapped to `mode`.
    ///
    /// Returns `true` when a change was sent. A mode without a mapping, or
    /// one the circuit is already in, re-reads the current mode instead and
    /// returns `false`.
    ///
    /// # Errors
    ///
    /// Returns [`BoschError::Upstream`] when the client call fails.
    pub async fn set_hvac_mode(&mut self, mode: HvacMode) -> Result<bool, BoschError> {
        tracing::debug!(circuit = %self.name, %mode, "setting hvac mode");
        let target = self
            .modes
            .upstream_for(mode)
            .filter(|target| self.mode.value.as_deref() != Some(*target))
            .map(str::to_string);

        let Some(target) = target else {
            self.mode = self.circuit.operation_mode();
            return Ok(false);
        };

        tracing::debug!(circuit = %self.name, upstream = %target, "setting bosch operation mode");
        let reported = self
            .circuit
            .set_operation_mode(&target)
            .await
            .map_err(|source| BoschError::Upstream {
                circuit: self.name.clone(),
                operation: "set_operation_mode",
                source,
            })?;
        tracing::debug!(circuit = %self.name, mode = ?reported, "operation mode set");
        self.mode.value = reported;
        Ok(true)
    }

    /// Forward a new target temperature.
    ///
    /// A missing value, a circuit without a target temperature, or a value
    /// equal to the current target sends nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BoschError::Upstream`] when the client call fails.
    #[allow(clippy::float_cmp)]
    pub async fn set_temperature(&self, temperature: Option<f64>) -> Result<(), BoschError> {
        let (Some(current), Some(temperature)) = (self.circuit.target_temperature(), temperature)
        else {
            return Ok(());
        };
        if temperature == current {
            return Ok(());
        }

        tracing::debug!(circuit = %self.name, temperature, "setting target temperature");
        self.circuit
            .set_temperature(temperature)
            .await
            .map_err(|source| BoschError::Upstream {
                circuit: self.name.clone(),
                operation: "set_temperature",
                source,
            })
    }

    /// Device record: one device per circuit, linked to its gateway.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the builder fails.
    pub fn device(&self) -> Result<Device, HubError> {
        Device::builder()
            .id(self.device_id)
            .name(format!("Heating circuit {}", self.name))
            .integration(DOMAIN)
            .unique_id(self.unique_id.clone())
            .manufacturer(self.gateway.brand.clone())
            .model(self.gateway.model.clone())
            .sw_version(self.gateway.firmware.clone())
            .via_device(self.gateway.uuid.clone())
            .build()
    }

    /// Current entity state as the host sees it.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the builder fails.
    pub fn to_entity(&self) -> Result<Entity, HubError> {
        let hvac_mode = self.hvac_mode();
        let state = match (self.ready, hvac_mode) {
            (false, _) => EntityState::Unknown,
            (true, HvacMode::Off) => EntityState::Off,
            (true, _) => EntityState::On,
        };
        let hvac_modes: Vec<&str> = self.hvac_modes().into_iter().map(HvacMode::as_str).collect();

        let mut builder = Entity::builder()
            .id(self.entity_id)
            .device_id(self.device_id)
            .entity_id(self.object_id())
            .friendly_name(self.name.clone())
            .state(state)
            .attribute("hvac_mode", AttributeValue::from(hvac_mode.as_str()))
            .attribute("hvac_modes", AttributeValue::Json(serde_json::json!(hvac_modes)))
            .attribute(
                "temperature_unit",
                AttributeValue::from(self.temperature_unit().symbol()),
            )
            .attribute(
                "supported_features",
                AttributeValue::Int(i64::from(self.supported_features().bits())),
            );
        if let Some(current) = self.current_temperature() {
            builder = builder.attribute("current_temperature", AttributeValue::Float(current));
        }
        if let Some(target) = self.target_temperature() {
            builder = builder.attribute("temperature", AttributeValue::Float(target));
        }
        if let Some(status) = &self.snapshot.state {
            builder = builder.attribute("status", AttributeValue::from(status.as_str()));
        }
        builder.build()
    }
}

fn slug(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
