//! Service — a callable command routed to the integration owning an entity.
//!
//! Climate entities accept `set_temperature` and `set_hvac_mode`.

use serde::Deserialize;

use crate::climate::HvacMode;
use crate::error::ValidationError;

pub const SET_TEMPERATURE: &str = "set_temperature";
pub const SET_HVAC_MODE: &str = "set_hvac_mode";

/// A parsed climate service call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClimateCommand {
    /// `temperature` may be absent; the call is then a no-op.
    SetTemperature { temperature: Option<f64> },
    SetHvacMode { hvac_mode: HvacMode },
}

#[derive(Deserialize)]
struct SetTemperatureData {
    #[serde(default)]
    temperature: Option<f64>,
}

#[derive(Deserialize)]
struct SetHvacModeData {
    hvac_mode: String,
}

impl ClimateCommand {
    /// Parse a service name and its JSON payload.
    ///
    /// A `null` payload is treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedService`] for unknown service
    /// names, [`ValidationError::InvalidServiceData`] when the payload does
    /// not match, and [`ValidationError::UnknownHvacMode`] for an
    /// unrecognised mode.
    pub fn parse(service: &str, data: serde_json::Value) -> Result<Self, ValidationError> {
        let data = if data.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            data
        };
        match service {
            SET_TEMPERATURE => {
                let payload: SetTemperatureData =
                    serde_json::from_value(data).map_err(ValidationError::InvalidServiceData)?;
                Ok(Self::SetTemperature {
                    temperature: payload.temperature,
                })
            }
            SET_HVAC_MODE => {
                let payload: SetHvacModeData =
                    serde_json::from_value(data).map_err(ValidationError::InvalidServiceData)?;
                Ok(Self::SetHvacMode {
                    hvac_mode: payload.hvac_mode.parse()?,
                })
            }
            other => Err(ValidationError::UnsupportedService(other.to_string())),
        }
    }
}
