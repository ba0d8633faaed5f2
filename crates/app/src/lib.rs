//! # boschhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `EntityRepository` — storage for entities
//!   - `DeviceRepository` — storage for devices
//!   - `EventPublisher` — publish domain events
//!   - `Integration` / `IntegrationContext` — device integration lifecycle
//! - Define **driving/inbound** use-case structs:
//!   - `EntityService` — upsert with change detection, list, get
//!   - `DeviceService` — upsert by `(integration, unique_id)`, list, get
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (event bus, signal dispatcher)
//!
//! ## Dependency rule
//! Depends on `boschhub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod dispatcher;
pub mod event_bus;
pub mod ports;
pub mod services;
