//! The lifecycle orchestrator.
//!
//! Executes single transitions, bulk transitions, and the automatic
//! date-driven sweep against the status store. Public operations never
//! panic and never propagate domain failures as errors: every transition
//! attempt comes back as a structured [`TransitionResult`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use priceguard_catalog::{StatusCatalog, StatusId, UrgencyLevel};
use priceguard_core::{Clock, ExpectedVersion, PriceItemId};
use priceguard_lifecycle::{
    build_dashboard, compute_metrics, evaluate, validate_transition, AppliedTransition,
    BulkItemResult, BulkTransitionOutcome, BulkTransitionRequest, PriceStatusRecord,
    PriceStatusView, StatusDashboard, StatusHistoryEntry, StatusMetricsSnapshot, SweepOutcome,
    TransitionRequest, TransitionResult,
};

use crate::status_store::{StatusStore, StoreError};

/// Best-effort cancellation token for bulk batches.
///
/// Checked between per-record iterations only; transitions already applied
/// stay applied (the batch is not transactional).
#[derive(Debug, Default, Clone)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Stateless orchestrator over the status store.
///
/// Holds its collaborators explicitly (catalog, store, clock) so tests can
/// supply deterministic time and isolated state.
pub struct LifecycleService<S> {
    catalog: Arc<StatusCatalog>,
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: StatusStore> LifecycleService<S> {
    pub fn new(catalog: Arc<StatusCatalog>, store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            store,
            clock,
        }
    }

    pub fn catalog(&self) -> &Arc<StatusCatalog> {
        &self.catalog
    }

    /// Execute one manual transition.
    ///
    /// Failure modes are kept distinct: validation failures never touch the
    /// store, a missing record is `not_found` (not a validation error), and
    /// a record that moved on since the caller read it is a `conflict`.
    pub fn update_price_status(&self, request: &TransitionRequest) -> TransitionResult {
        let validation = validate_transition(&self.catalog, request);
        if !validation.is_valid {
            return TransitionResult::validation_failure(validation.errors);
        }

        let versioned = match self.store.get(request.price_item_id) {
            Ok(Some(v)) => v,
            Ok(None) => return TransitionResult::not_found(request.price_item_id),
            Err(e) => {
                tracing::error!(price_item_id = %request.price_item_id, error = %e, "status store read failed");
                return TransitionResult::system(format!("status store read failed: {e}"));
            }
        };

        if versioned.record.current_status != request.from_status {
            return TransitionResult::conflict(format!(
                "record '{}' is in status '{}', not '{}'",
                request.price_item_id, versioned.record.current_status, request.from_status
            ));
        }

        let transition_date = request
            .effective_date
            .unwrap_or_else(|| self.clock.now());
        let entry = StatusHistoryEntry {
            status: request.to_status.clone(),
            timestamp: transition_date,
            changed_by: request.changed_by.trim().to_string(),
            reason: request.reason.trim().to_string(),
        };

        match self.store.append_history(
            request.price_item_id,
            entry,
            ExpectedVersion::Exact(versioned.version),
        ) {
            Ok(updated) => {
                tracing::info!(
                    price_item_id = %request.price_item_id,
                    from = %request.from_status,
                    to = %request.to_status,
                    changed_by = %request.changed_by,
                    "status transition applied"
                );
                TransitionResult::applied(
                    &request.from_status,
                    updated.record.current_status.clone(),
                    transition_date,
                )
            }
            Err(StoreError::Concurrency(msg)) => TransitionResult::conflict(msg),
            Err(StoreError::NotFound(id)) => TransitionResult::not_found(id),
            Err(e) => {
                tracing::error!(price_item_id = %request.price_item_id, error = %e, "status store append failed");
                TransitionResult::system(format!("status store append failed: {e}"))
            }
        }
    }

    /// Execute a bulk transition over the filtered candidate set.
    pub fn bulk_update_status(&self, request: &BulkTransitionRequest) -> BulkTransitionOutcome {
        self.bulk_update_status_cancellable(request, &CancelFlag::new())
    }

    /// Bulk transition with best-effort cancellation between records.
    pub fn bulk_update_status_cancellable(
        &self,
        request: &BulkTransitionRequest,
        cancel: &CancelFlag,
    ) -> BulkTransitionOutcome {
        let records = match self.store.list() {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "status store list failed; bulk update aborted");
                return BulkTransitionOutcome {
                    success: false,
                    message: format!("bulk update aborted: {e}"),
                    updated_count: 0,
                    failed_count: 0,
                    results: Vec::new(),
                };
            }
        };

        let candidates: Vec<&PriceStatusRecord> = records
            .iter()
            .filter(|r| request.filters.as_ref().is_none_or(|f| f.matches(r)))
            .filter(|r| {
                request.price_item_ids.is_empty() || request.price_item_ids.contains(&r.id)
            })
            .collect();
        let candidate_count = candidates.len();

        let mut results = Vec::with_capacity(candidate_count);
        let mut updated_count = 0;
        let mut failed_count = 0;
        let mut cancelled = false;

        for record in candidates {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            // Each candidate transitions from its *own* current status.
            let item_request = TransitionRequest {
                price_item_id: record.id,
                from_status: record.current_status.clone(),
                to_status: request.target_status.clone(),
                reason: request.reason.clone(),
                changed_by: request.changed_by.clone(),
                effective_date: None,
                additional_data: None,
            };

            let result = self.update_price_status(&item_request);
            if result.success {
                updated_count += 1;
            } else {
                failed_count += 1;
            }
            results.push(BulkItemResult {
                price_item_id: record.id,
                result,
            });
        }

        let message = if cancelled {
            format!(
                "bulk update cancelled after {} of {candidate_count} records: {updated_count} updated, {failed_count} failed",
                results.len()
            )
        } else {
            format!("bulk update completed: {updated_count} updated, {failed_count} failed")
        };

        BulkTransitionOutcome {
            success: failed_count == 0 && !cancelled,
            message,
            updated_count,
            failed_count,
            results,
        }
    }

    /// The automatic sweep: evaluate every record against the date-driven
    /// rule table and apply each due transition as actor `system`.
    ///
    /// Idempotent — once a record has moved, re-evaluation yields nothing
    /// until the next date boundary is crossed. A single record's failure is
    /// logged and never halts the sweep.
    pub fn check_and_update_automatic_statuses(&self) -> SweepOutcome {
        let records = match self.store.list() {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "status store list failed; sweep skipped");
                return SweepOutcome::default();
            }
        };

        let now = self.clock.now();
        let mut updates = Vec::new();

        for record in &records {
            let Some(auto) = evaluate(record, now) else {
                continue;
            };
            if auto.to_status == record.current_status {
                continue;
            }

            let request = TransitionRequest {
                price_item_id: record.id,
                from_status: record.current_status.clone(),
                to_status: auto.to_status.clone(),
                reason: auto.reason.clone(),
                changed_by: "system".to_string(),
                effective_date: Some(now),
                additional_data: None,
            };

            let result = self.update_price_status(&request);
            if result.success {
                updates.push(AppliedTransition {
                    price_item_id: record.id,
                    from_status: record.current_status.clone(),
                    to_status: auto.to_status,
                    reason: auto.reason,
                });
            } else {
                tracing::warn!(
                    price_item_id = %record.id,
                    from = %record.current_status,
                    to = %auto.to_status,
                    message = %result.message,
                    "automatic transition failed; continuing sweep"
                );
            }
        }

        SweepOutcome {
            checked_count: records.len(),
            updated_count: updates.len(),
            updates,
        }
    }

    /// Filtered record projections (all filters AND-combined).
    pub fn status_data(
        &self,
        ids: Option<&[PriceItemId]>,
        statuses: Option<&[StatusId]>,
        urgency: Option<UrgencyLevel>,
    ) -> Result<Vec<PriceStatusView>, StoreError> {
        let records = self.store.list()?;
        let now = self.clock.now();

        let urgency_statuses: Option<Vec<StatusId>> = urgency.map(|u| {
            self.catalog
                .action_statuses(Some(u))
                .iter()
                .map(|def| def.id.clone())
                .collect()
        });

        Ok(records
            .iter()
            .filter(|r| ids.is_none_or(|ids| ids.contains(&r.id)))
            .filter(|r| statuses.is_none_or(|s| s.contains(&r.current_status)))
            .filter(|r| {
                urgency_statuses
                    .as_ref()
                    .is_none_or(|s| s.contains(&r.current_status))
            })
            .map(|r| r.to_view(now))
            .collect())
    }

    /// Records whose current status requires operator action.
    pub fn items_requiring_action(
        &self,
        urgency: Option<UrgencyLevel>,
    ) -> Result<Vec<PriceStatusView>, StoreError> {
        let action_statuses: Vec<StatusId> = self
            .catalog
            .action_statuses(urgency)
            .iter()
            .map(|def| def.id.clone())
            .collect();

        let records = self.store.list()?;
        let now = self.clock.now();
        Ok(records
            .iter()
            .filter(|r| action_statuses.contains(&r.current_status))
            .map(|r| r.to_view(now))
            .collect())
    }

    /// Status history of one record; `None` when the record does not exist.
    pub fn status_history(
        &self,
        id: PriceItemId,
    ) -> Result<Option<Vec<StatusHistoryEntry>>, StoreError> {
        Ok(self.store.get(id)?.map(|v| v.record.status_history))
    }

    pub fn status_metrics(&self) -> Result<StatusMetricsSnapshot, StoreError> {
        let records = self.store.list()?;
        Ok(compute_metrics(&self.catalog, &records, self.clock.now()))
    }

    pub fn status_dashboard(&self) -> Result<StatusDashboard, StoreError> {
        let records = self.store.list()?;
        Ok(build_dashboard(&self.catalog, &records, self.clock.now()))
    }
}
