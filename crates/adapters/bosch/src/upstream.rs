//! Contract of the upstream Bosch device client.
//!
//! The client that speaks to the gateway over the network lives outside this
//! crate. The integration only reads the attributes it mirrors and forwards
//! commands through these traits.

use std::future::Future;
use std::sync::Arc;

use boschhub_domain::error::BoxError;

/// Display strings a heating circuit uses for its operating modes.
///
/// Allowed-mode keys reported by the device are resolved through
/// [`get`](Self::get) before being matched against host modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeStrings {
    pub auto: String,
    pub manual: String,
    pub off: String,
    pub on: String,
}

impl ModeStrings {
    /// Resolve a mode key (`auto`, `manual`, `off`, `on`) to its display string.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "auto" => Some(&self.auto),
            "manual" => Some(&self.manual),
            "off" => Some(&self.off),
            "on" => Some(&self.on),
            _ => None,
        }
    }
}

impl Default for ModeStrings {
    fn default() -> Self {
        Self {
            auto: "auto".to_string(),
            manual: "manual".to_string(),
            off: "off".to_string(),
            on: "on".to_string(),
        }
    }
}

/// The circuit's operation-mode property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationMode {
    /// Mode currently active on the device.
    pub value: Option<String>,
    /// Mode keys the device currently accepts, if it reports any.
    pub allowed_values: Option<Vec<String>>,
}

/// One heating circuit as seen through the upstream client.
pub trait HeatingCircuit: Send + Sync {
    fn name(&self) -> String;

    fn current_temperature(&self) -> Option<f64>;

    fn target_temperature(&self) -> Option<f64>;

    /// Free-form status string reported by the device.
    fn status(&self) -> Option<String>;

    /// Temperature unit indicator, `"C"` or `"F"`.
    fn temperature_units(&self) -> Option<String>;

    fn strings(&self) -> ModeStrings;

    fn operation_mode(&self) -> OperationMode;

    /// The client has loaded the device's data scheme.
    fn is_scheme_ready(&self) -> bool;

    /// The client has completed at least one full update.
    fn is_update_initialized(&self) -> bool;

    fn set_temperature(
        &self,
        temperature: f64,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Switch the operating mode, returning the value the device now reports.
    fn set_operation_mode(
        &self,
        mode: &str,
    ) -> impl Future<Output = Result<Option<String>, BoxError>> + Send;

    /// Refresh the circuit's attributes from the device.
    fn update(&self) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// The physical Bosch hub.
pub trait Gateway: Send + Sync {
    type Circuit: HeatingCircuit + 'static;

    /// Stable identifier of this gateway.
    fn uuid(&self) -> String;

    fn brand(&self) -> Option<String>;

    fn model(&self) -> Option<String>;

    fn firmware(&self) -> Option<String>;

    fn heating_circuits(&self) -> Vec<Arc<Self::Circuit>>;
}

/// Gateway metadata copied onto every circuit's device record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayInfo {
    pub uuid: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub firmware: Option<String>,
}

impl GatewayInfo {
    #[must_use]
    pub fn from_gateway<G: Gateway + ?Sized>(gateway: &G) -> Self {
        Self {
            uuid: gateway.uuid(),
            brand: gateway.brand(),
            model: gateway.model(),
            firmware: gateway.firmware(),
        }
    }
}
