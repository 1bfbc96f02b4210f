//! Service wiring and external collaborator ports.

use std::sync::Arc;

use serde::Serialize;

use priceguard_catalog::{LifecycleConfig, StatusCatalog};
use priceguard_core::{Clock, SystemClock};
use priceguard_infra::{InMemoryStatusStore, LifecycleService};

/// Port to the external validity-reporting collaborator (trends, risk).
///
/// The engine does not own these analytics; the metrics endpoint merges
/// whatever this port supplies into its response.
pub trait ValidityReporting: Send + Sync {
    fn validity_summary(&self) -> serde_json::Value;
}

/// Default wiring until a real reporting collaborator is attached.
#[derive(Debug, Default)]
pub struct NoopValidityReporting;

impl ValidityReporting for NoopValidityReporting {
    fn validity_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "trends": [],
            "risk_analysis": {},
        })
    }
}

/// Outcome of the sibling renewal collaborator's automatic sweep.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RenewalSweepOutcome {
    pub processed_count: usize,
    pub transition_count: usize,
}

/// Port to the sibling renewal/forecast collaborator.
///
/// `process-automatic-transitions` runs this sweep alongside the engine's
/// own and merges both counts into one response.
pub trait RenewalSweep: Send + Sync {
    fn process_renewals(&self) -> RenewalSweepOutcome;
}

/// Default wiring until a real renewal collaborator is attached.
#[derive(Debug, Default)]
pub struct NoopRenewalSweep;

impl RenewalSweep for NoopRenewalSweep {
    fn process_renewals(&self) -> RenewalSweepOutcome {
        RenewalSweepOutcome::default()
    }
}

/// Everything the handlers need, injected via `Extension<Arc<AppServices>>`.
pub struct AppServices {
    pub catalog: Arc<StatusCatalog>,
    pub lifecycle_config: Arc<LifecycleConfig>,
    pub store: Arc<InMemoryStatusStore>,
    pub lifecycle: LifecycleService<Arc<InMemoryStatusStore>>,
    pub reporting: Arc<dyn ValidityReporting>,
    pub renewal: Arc<dyn RenewalSweep>,
}

/// Default wiring: builtin catalog/config, empty in-memory store, wall clock,
/// no-op collaborators.
pub fn build_services() -> AppServices {
    let catalog = Arc::new(StatusCatalog::builtin());
    let store = Arc::new(InMemoryStatusStore::new());
    let lifecycle = LifecycleService::new(
        catalog.clone(),
        store.clone(),
        Arc::new(SystemClock) as Arc<dyn Clock>,
    );

    AppServices {
        catalog,
        lifecycle_config: Arc::new(LifecycleConfig::builtin()),
        store,
        lifecycle,
        reporting: Arc::new(NoopValidityReporting),
        renewal: Arc::new(NoopRenewalSweep),
    }
}
