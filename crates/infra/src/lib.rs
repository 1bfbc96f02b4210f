//! `priceguard-infra` — persistence port and the lifecycle orchestrator.
//!
//! The domain crates are pure; this crate owns the side-effectful pieces:
//! the [`status_store::StatusStore`] port (with an in-memory implementation
//! standing in for a transactional backend) and the
//! [`lifecycle_service::LifecycleService`] that drives transitions through it.

pub mod lifecycle_service;
pub mod status_store;

pub use lifecycle_service::{CancelFlag, LifecycleService};
pub use status_store::{InMemoryStatusStore, StatusStore, StoreError, VersionedRecord};
