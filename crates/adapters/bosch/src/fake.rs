//! In-memory upstream and host doubles shared by the unit tests.

use std::sync::{Arc, Mutex, MutexGuard};

use boschhub_app::ports::IntegrationContext;
use boschhub_domain::device::Device;
use boschhub_domain::entity::Entity;
use boschhub_domain::error::{BoxError, HubError};
use boschhub_domain::event::Event;

use crate::upstream::{Gateway, HeatingCircuit, ModeStrings, OperationMode};

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub current_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub status: Option<String>,
    pub units: Option<String>,
    pub strings: ModeStrings,
    pub mode: OperationMode,
    pub scheme_ready: bool,
    pub update_initialized: bool,
    pub fail_calls: bool,
    pub set_temperature_calls: Vec<f64>,
    pub set_mode_calls: Vec<String>,
    pub update_calls: usize,
}

pub(crate) struct FakeCircuit {
    name: String,
    state: Mutex<FakeState>,
}

impl FakeCircuit {
    /// A circuit whose client has not finished loading yet.
    pub fn pending(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Mutex::new(FakeState::default()),
        }
    }

    /// A loaded circuit in `auto`, allowing `auto` and `off`.
    pub fn ready(name: &str) -> Self {
        let circuit = Self::pending(name);
        circuit.with(|s| {
            s.scheme_ready = true;
            s.update_initialized = true;
            s.current_temperature = Some(20.5);
            s.target_temperature = Some(21.0);
            s.status = Some("ok".to_string());
            s.units = Some("C".to_string());
            s.mode = OperationMode {
                value: Some("auto".to_string()),
                allowed_values: Some(vec!["auto".to_string(), "off".to_string()]),
            };
        });
        circuit
    }

    pub fn with(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.state());
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl HeatingCircuit for FakeCircuit {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn current_temperature(&self) -> Option<f64> {
        self.state().current_temperature
    }

    fn target_temperature(&self) -> Option<f64> {
        self.state().target_temperature
    }

    fn status(&self) -> Option<String> {
        self.state().status.clone()
    }

    fn temperature_units(&self) -> Option<String> {
        self.state().units.clone()
    }

    fn strings(&self) -> ModeStrings {
        self.state().strings.clone()
    }

    fn operation_mode(&self) -> OperationMode {
        self.state().mode.clone()
    }

    fn is_scheme_ready(&self) -> bool {
        self.state().scheme_ready
    }

    fn is_update_initialized(&self) -> bool {
        self.state().update_initialized
    }

    async fn set_temperature(&self, temperature: f64) -> Result<(), BoxError> {
        let mut state = self.state();
        state.set_temperature_calls.push(temperature);
        if state.fail_calls {
            return Err("gateway timeout".into());
        }
        state.target_temperature = Some(temperature);
        Ok(())
    }

    async fn set_operation_mode(&self, mode: &str) -> Result<Option<String>, BoxError> {
        let mut state = self.state();
        state.set_mode_calls.push(mode.to_string());
        if state.fail_calls {
            return Err("gateway timeout".into());
        }
        state.mode.value = Some(mode.to_string());
        Ok(state.mode.value.clone())
    }

    async fn update(&self) -> Result<(), BoxError> {
        let mut state = self.state();
        state.update_calls += 1;
        if state.fail_calls {
            return Err("gateway timeout".into());
        }
        Ok(())
    }
}

pub(crate) struct FakeGateway {
    pub circuits: Vec<Arc<FakeCircuit>>,
}

impl Gateway for FakeGateway {
    type Circuit = FakeCircuit;

    fn uuid(&self) -> String {
        "gw-42".to_string()
    }

    fn brand(&self) -> Option<String> {
        Some("Buderus".to_string())
    }

    fn model(&self) -> Option<String> {
        Some("KM200".to_string())
    }

    fn firmware(&self) -> Option<String> {
        Some("04.08.02".to_string())
    }

    fn heating_circuits(&self) -> Vec<Arc<FakeCircuit>> {
        self.circuits.clone()
    }
}

#[derive(Default)]
struct Recorded {
    devices: Vec<Device>,
    entities: Vec<Entity>,
    events: Vec<Event>,
    fail_entity_commits: bool,
}

/// Integration context that keeps everything it is handed.
#[derive(Clone, Default)]
pub(crate) struct RecordingContext {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingContext {
    pub fn devices(&self) -> Vec<Device> {
        self.recorded.lock().unwrap().devices.clone()
    }

    /// Every committed entity, in commit order.
    pub fn entities(&self) -> Vec<Entity> {
        self.recorded.lock().unwrap().entities.clone()
    }

    pub fn fail_entity_commits(&self, fail: bool) {
        self.recorded.lock().unwrap().fail_entity_commits = fail;
    }
}

impl IntegrationContext for RecordingContext {
    async fn upsert_device(&self, device: Device) -> Result<Device, HubError> {
        self.recorded.lock().unwrap().devices.push(device.clone());
        Ok(device)
    }

    async fn upsert_entity(&self, entity: Entity) -> Result<Entity, HubError> {
        let mut recorded = self.recorded.lock().unwrap();
        if recorded.fail_entity_commits {
            return Err(HubError::Storage("store offline".into()));
        }
        recorded.entities.push(entity.clone());
        Ok(entity)
    }

    async fn publish(&self, event: Event) -> Result<(), HubError> {
        self.recorded.lock().unwrap().events.push(event);
        Ok(())
    }
}
