//! Bosch adapter error types.

use boschhub_domain::error::{BoxError, HubError};

/// Errors specific to the Bosch adapter.
#[derive(Debug, thiserror::Error)]
pub enum BoschError {
    /// A call into the upstream device client failed.
    #[error("upstream {operation} failed for heating circuit {circuit}")]
    Upstream {
        circuit: String,
        operation: &'static str,
        #[source]
        source: BoxError,
    },
}

impl BoschError {
    /// Convert into a [`HubError::Integration`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> HubError {
        HubError::Integration(Box::new(self))
    }
}

impl From<BoschError> for HubError {
    fn from(err: BoschError) -> Self {
        err.into_domain()
    }
}
