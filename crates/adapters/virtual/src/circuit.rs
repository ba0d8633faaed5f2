//! Simulated heating circuit.

use std::sync::{Mutex, MutexGuard, PoisonError};

use boschhub_adapter_bosch::upstream::{HeatingCircuit, ModeStrings, OperationMode};
use boschhub_domain::error::BoxError;

use crate::config::VirtualCircuitConfig;
use crate::error::VirtualError;

/// Range the simulated controller accepts for setpoints.
const MIN_SETPOINT: f64 = 5.0;
const MAX_SETPOINT: f64 = 30.0;

/// How far the room temperature moves toward the setpoint per update.
const DRIFT_STEP: f64 = 0.5;

#[derive(Debug)]
struct CircuitState {
    current_temperature: f64,
    target_temperature: f64,
    mode: String,
    update_initialized: bool,
}

/// A heating circuit whose room temperature drifts toward its setpoint.
///
/// The data scheme is available immediately; the first [`update`] marks the
/// circuit as initialized, like a real client after its first full read.
///
/// [`update`]: HeatingCircuit::update
#[derive(Debug)]
pub struct VirtualHeatingCircuit {
    name: String,
    units: String,
    allowed_modes: Vec<String>,
    strings: ModeStrings,
    state: Mutex<CircuitState>,
}

impl VirtualHeatingCircuit {
    #[must_use]
    pub fn new(config: &VirtualCircuitConfig) -> Self {
        Self {
            name: config.name.clone(),
            units: config.units.clone(),
            allowed_modes: config.allowed_modes.clone(),
            strings: ModeStrings::default(),
            state: Mutex::new(CircuitState {
                current_temperature: config.current_temperature,
                target_temperature: config.target_temperature,
                mode: config.initial_mode.clone(),
                update_initialized: false,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, CircuitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_allowed(&self, mode: &str) -> bool {
        self.allowed_modes
            .iter()
            .filter_map(|key| self.strings.get(key))
            .any(|display| display == mode)
    }
}

impl HeatingCircuit for VirtualHeatingCircuit {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn current_temperature(&self) -> Option<f64> {
        Some(self.state().current_temperature)
    }

    fn target_temperature(&self) -> Option<f64> {
        Some(self.state().target_temperature)
    }

    fn status(&self) -> Option<String> {
        Some("ok".to_string())
    }

    fn temperature_units(&self) -> Option<String> {
        Some(self.units.clone())
    }

    fn strings(&self) -> ModeStrings {
        self.strings.clone()
    }

    fn operation_mode(&self) -> OperationMode {
        OperationMode {
            value: Some(self.state().mode.clone()),
            allowed_values: Some(self.allowed_modes.clone()),
        }
    }

    fn is_scheme_ready(&self) -> bool {
        true
    }

    fn is_update_initialized(&self) -> bool {
        self.state().update_initialized
    }

    async fn set_temperature(&self, temperature: f64) -> Result<(), BoxError> {
        if !(MIN_SETPOINT..=MAX_SETPOINT).contains(&temperature) {
            return Err(VirtualError::SetpointOutOfRange(temperature).into());
        }
        self.state().target_temperature = temperature;
        tracing::debug!(circuit = %self.name, temperature, "virtual setpoint changed");
        Ok(())
    }

    async fn set_operation_mode(&self, mode: &str) -> Result<Option<String>, BoxError> {
        if !self.is_allowed(mode) {
            return Err(VirtualError::UnsupportedMode(mode.to_string()).into());
        }
        let mut state = self.state();
        state.mode = mode.to_string();
        tracing::debug!(circuit = %self.name, mode, "virtual operation mode changed");
        Ok(Some(state.mode.clone()))
    }

    async fn update(&self) -> Result<(), BoxError> {
        let mut state = self.state();
        if state.mode != self.strings.off {
            let delta = state.target_temperature - state.current_temperature;
            state.current_temperature += delta.clamp(-DRIFT_STEP, DRIFT_STEP);
        }
        state.update_initialized = true;
        Ok(())
    }
}
