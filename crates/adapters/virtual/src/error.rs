//! Virtual gateway error types.

/// Commands the simulated controller refuses.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    #[error("setpoint {0} outside the supported range")]
    SetpointOutOfRange(f64),

    #[error("operation mode {0:?} is not allowed on this circuit")]
    UnsupportedMode(String),
}
