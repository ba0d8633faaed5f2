//! Virtual gateway configuration.

use serde::Deserialize;

/// Identity of the simulated gateway and the circuits behind it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VirtualGatewayConfig {
    /// Stable gateway identifier, suffixed to every circuit's unique id.
    pub uuid: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub firmware: Option<String>,
    pub circuits: Vec<VirtualCircuitConfig>,
}

/// One simulated heating circuit.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VirtualCircuitConfig {
    pub name: String,
    pub current_temperature: f64,
    pub target_temperature: f64,
    /// `"C"` or `"F"`.
    pub units: String,
    /// Mode keys the circuit accepts (`auto`, `manual`, `off`, `on`).
    pub allowed_modes: Vec<String>,
    pub initial_mode: String,
}

impl Default for VirtualGatewayConfig {
    fn default() -> Self {
        Self {
            uuid: "virtual-gateway".to_string(),
            brand: Some("Bosch".to_string()),
            model: Some("Virtual KM200".to_string()),
            firmware: Some("04.08.02".to_string()),
            circuits: vec![
                VirtualCircuitConfig {
                    name: "hc1".to_string(),
                    ..VirtualCircuitConfig::default()
                },
                VirtualCircuitConfig {
                    name: "hc2".to_string(),
                    current_temperature: 18.0,
                    target_temperature: 19.5,
                    allowed_modes: vec!["auto".to_string(), "off".to_string()],
                    ..VirtualCircuitConfig::default()
                },
            ],
        }
    }
}

impl Default for VirtualCircuitConfig {
    fn default() -> Self {
        Self {
            name: "hc1".to_string(),
            current_temperature: 20.0,
            target_temperature: 21.0,
            units: "C".to_string(),
            allowed_modes: vec![
                "auto".to_string(),
                "manual".to_string(),
                "off".to_string(),
            ],
            initial_mode: "auto".to_string(),
        }
    }
}
