//! # boschhub-adapter-virtual
//!
//! Simulated Bosch gateway for running the hub without hardware.
//!
//! [`VirtualGateway`] implements the upstream client traits of
//! `boschhub-adapter-bosch`, so the real integration drives it exactly like
//! a physical gateway.
//!
//! | Behaviour | Detail |
//! |-----------|--------|
//! | Readiness | scheme loaded at once, initialized after the first `update` |
//! | Temperature | room drifts 0.5° per update toward the setpoint, unless `off` |
//! | Setpoint | accepted between 5 and 30 |
//! | Modes | only the configured `allowed_modes` are accepted |
//!
//! ## Dependency rule
//!
//! Depends on `boschhub-adapter-bosch` (upstream traits) and
//! `boschhub-domain` only.

mod circuit;
mod config;
mod error;

pub use circuit::VirtualHeatingCircuit;
pub use config::{VirtualCircuitConfig, VirtualGatewayConfig};
pub use error::VirtualError;

use std::sync::Arc;

use boschhub_adapter_bosch::upstream::Gateway;

/// A simulated gateway built from configuration.
#[derive(Debug)]
pub struct VirtualGateway {
    uuid: String,
    brand: Option<String>,
    model: Option<String>,
    firmware: Option<String>,
    circuits: Vec<Arc<VirtualHeatingCircuit>>,
}

impl VirtualGateway {
    #[must_use]
    pub fn new(config: &VirtualGatewayConfig) -> Self {
        let circuits = config
            .circuits
            .iter()
            .map(|circuit| Arc::new(VirtualHeatingCircuit::new(circuit)))
            .collect();
        Self {
            uuid: config.uuid.clone(),
            brand: config.brand.clone(),
            model: config.model.clone(),
            firmware: config.firmware.clone(),
            circuits,
        }
    }
}

impl Default for VirtualGateway {
    fn default() -> Self {
        Self::new(&VirtualGatewayConfig::default())
    }
}

impl Gateway for VirtualGateway {
    type Circuit = VirtualHeatingCircuit;

    fn uuid(&self) -> String {
        self.uuid.clone()
    }

    fn brand(&self) -> Option<String> {
        self.brand.clone()
    }

    fn model(&self) -> Option<String> {
        self.model.clone()
    }

    fn firmware(&self) -> Option<String> {
        self.firmware.clone()
    }

    fn heating_circuits(&self) -> Vec<Arc<VirtualHeatingCircuit>> {
        self.circuits.clone()
    }
}
