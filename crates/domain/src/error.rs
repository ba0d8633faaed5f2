//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HubError`]
//! via `#[from]` (or an explicit `into_domain`) at port boundaries.

/// Boxed source error carried across port boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error returned by services and ports.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("storage error")]
    Storage(#[source] BoxError),

    #[error("integration error")]
    Integration(#[source] BoxError),
}

/// A domain invariant was violated.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity id must not be empty")]
    EmptyEntityId,

    #[error("entity id must have the form `<domain>.<object_id>`")]
    InvalidEntityIdFormat,

    #[error("unknown hvac mode {0:?}")]
    UnknownHvacMode(String),

    #[error("service {0:?} is not supported")]
    UnsupportedService(String),

    #[error("invalid service data")]
    InvalidServiceData(#[source] serde_json::Error),
}

/// A lookup by id returned nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
