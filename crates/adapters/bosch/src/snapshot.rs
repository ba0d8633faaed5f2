//! Locally cached view of a heating circuit, used for change detection.

use boschhub_domain::climate::{HvacMode, TemperatureUnit};

/// The subset of circuit state mirrored on every update cycle.
///
/// Replaced wholesale each cycle; two snapshots are compared field by field
/// to decide whether the host needs to hear about the new state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThermostatSnapshot {
    pub temperature_unit: TemperatureUnit,
    pub current_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub state: Option<String>,
    pub hvac_modes: Vec<HvacMode>,
    pub hvac_mode: Option<HvacMode>,
}
