//! `priceguard-catalog` — the status catalog and lifecycle configuration.
//!
//! The catalog is an immutable-per-load registry of status definitions:
//! identity, display metadata, urgency, whether a status requires operator
//! action, and the set of statuses it may legally transition into. It is
//! loaded once (from JSON configuration or the builtin default) and treated
//! as read-only afterwards.

pub mod config;
pub mod status;

pub use config::{LifecycleConfig, RuleCondition, TransitionRuleConfig, ValidityDefaults};
pub use status::{well_known, StatusCatalog, StatusDefinition, StatusId, UrgencyLevel};
