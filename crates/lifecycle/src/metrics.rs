//! Read-side metrics and dashboard projections.
//!
//! Everything here is a derived, disposable view recomputed on demand from
//! the current record population. Nothing is authoritative.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use priceguard_catalog::{StatusCatalog, StatusId, UrgencyLevel};
use priceguard_core::PriceItemId;

use crate::record::{PriceStatusRecord, PriceStatusView};

/// Recent-changes window for the dashboard feed.
const RECENT_WINDOW_DAYS: i64 = 7;
/// Dashboard feed limits.
const RECENT_CHANGES_LIMIT: usize = 10;
const ACTION_ITEMS_LIMIT: usize = 5;

/// Fallback swatch for statuses missing from the catalog.
const UNKNOWN_STATUS_COLOR: &str = "#6B7280";

/// Aggregate counts over the current record population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMetricsSnapshot {
    pub total_prices: usize,
    pub status_counts: BTreeMap<StatusId, usize>,
    pub requires_action_count: usize,
    pub high_urgency_count: usize,
    pub medium_urgency_count: usize,
    pub low_urgency_count: usize,
    pub auto_renewal_enabled: usize,
    pub average_days_until_expiration: f64,
    pub generated_at: DateTime<Utc>,
}

/// One slice of the status distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDistributionEntry {
    pub status: StatusId,
    pub count: usize,
    /// Rounded percentage of the total population; 0 when the population is empty.
    pub percentage: u32,
    pub color: String,
}

/// One entry in the dashboard's recent-changes feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentStatusChange {
    pub price_item_id: PriceItemId,
    pub status: StatusId,
    pub timestamp: DateTime<Utc>,
    pub changed_by: String,
    pub reason: String,
}

/// The composed dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDashboard {
    pub metrics: StatusMetricsSnapshot,
    pub recent_changes: Vec<RecentStatusChange>,
    pub action_items: Vec<PriceStatusView>,
    pub status_distribution: Vec<StatusDistributionEntry>,
}

/// Compute the metrics snapshot for the given population.
pub fn compute_metrics(
    catalog: &StatusCatalog,
    records: &[PriceStatusRecord],
    now: DateTime<Utc>,
) -> StatusMetricsSnapshot {
    let mut status_counts: BTreeMap<StatusId, usize> = BTreeMap::new();
    let mut requires_action_count = 0;
    let mut high_urgency_count = 0;
    let mut medium_urgency_count = 0;
    let mut low_urgency_count = 0;
    let mut auto_renewal_enabled = 0;
    let mut remaining_days_total = 0i64;

    for record in records {
        *status_counts.entry(record.current_status.clone()).or_default() += 1;

        if let Some(def) = catalog.get(&record.current_status) {
            if def.requires_action {
                requires_action_count += 1;
            }
            match def.urgency_level {
                Some(UrgencyLevel::High) => high_urgency_count += 1,
                Some(UrgencyLevel::Medium) => medium_urgency_count += 1,
                Some(UrgencyLevel::Low) => low_urgency_count += 1,
                None => {}
            }
        }

        if record.auto_renewal {
            auto_renewal_enabled += 1;
        }
        remaining_days_total += record.days_until_expiration(now);
    }

    let average_days_until_expiration = if records.is_empty() {
        0.0
    } else {
        remaining_days_total as f64 / records.len() as f64
    };

    StatusMetricsSnapshot {
        total_prices: records.len(),
        status_counts,
        requires_action_count,
        high_urgency_count,
        medium_urgency_count,
        low_urgency_count,
        auto_renewal_enabled,
        average_days_until_expiration,
        generated_at: now,
    }
}

/// Build the per-status distribution from a snapshot.
///
/// Catalog order first, then any counted statuses missing from the catalog
/// (configuration drift) in identifier order. Zero-count statuses are omitted.
pub fn status_distribution(
    catalog: &StatusCatalog,
    snapshot: &StatusMetricsSnapshot,
) -> Vec<StatusDistributionEntry> {
    let total = snapshot.total_prices;
    let percentage_of = |count: usize| -> u32 {
        if total == 0 {
            // Empty population: report 0 rather than dividing by zero.
            0
        } else {
            ((count as f64 / total as f64) * 100.0).round() as u32
        }
    };

    let mut entries = Vec::new();

    for def in catalog.list() {
        if let Some(&count) = snapshot.status_counts.get(&def.id) {
            entries.push(StatusDistributionEntry {
                status: def.id.clone(),
                count,
                percentage: percentage_of(count),
                color: def.color.clone(),
            });
        }
    }

    for (status, &count) in &snapshot.status_counts {
        if catalog.get(status).is_none() {
            entries.push(StatusDistributionEntry {
                status: status.clone(),
                count,
                percentage: percentage_of(count),
                color: UNKNOWN_STATUS_COLOR.to_string(),
            });
        }
    }

    entries
}

/// Compose the full dashboard payload.
///
/// Action items are ordered by catalog order of their status (not by
/// urgency); see DESIGN.md for the rationale behind that choice.
pub fn build_dashboard(
    catalog: &StatusCatalog,
    records: &[PriceStatusRecord],
    now: DateTime<Utc>,
) -> StatusDashboard {
    let metrics = compute_metrics(catalog, records, now);
    let distribution = status_distribution(catalog, &metrics);

    let window_start = now - Duration::days(RECENT_WINDOW_DAYS);
    let mut recent_changes: Vec<RecentStatusChange> = records
        .iter()
        .flat_map(|record| {
            record
                .status_history
                .iter()
                .filter(|entry| entry.timestamp >= window_start)
                .map(|entry| RecentStatusChange {
                    price_item_id: record.id,
                    status: entry.status.clone(),
                    timestamp: entry.timestamp,
                    changed_by: entry.changed_by.clone(),
                    reason: entry.reason.clone(),
                })
        })
        .collect();
    recent_changes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent_changes.truncate(RECENT_CHANGES_LIMIT);

    let mut action_items = Vec::new();
    'outer: for def in catalog.action_statuses(None) {
        for record in records.iter().filter(|r| r.current_status == def.id) {
            action_items.push(record.to_view(now));
            if action_items.len() == ACTION_ITEMS_LIMIT {
                break 'outer;
            }
        }
    }

    StatusDashboard {
        metrics,
        recent_changes,
        action_items,
        status_distribution: distribution,
    }
}
