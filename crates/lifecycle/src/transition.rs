//! Transition requests, results, and bulk/sweep payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use priceguard_catalog::StatusId;
use priceguard_core::{PriceItemId, VendorId};

use crate::record::PriceStatusRecord;

/// A request to move one price record to a new status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub price_item_id: PriceItemId,
    /// The status the caller observed; the transition is rejected as stale
    /// if the record has moved on since.
    pub from_status: StatusId,
    pub to_status: StatusId,
    pub reason: String,
    pub changed_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<JsonValue>,
}

/// Classification of a failed transition, so callers can map failures
/// without re-deriving them from the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionFailure {
    /// Illegal transition, unknown status, or missing reason/actor.
    Validation,
    /// The referenced price record does not exist.
    NotFound,
    /// The record changed under the caller (stale expected status or
    /// optimistic concurrency miss).
    Conflict,
    /// Storage or other unexpected failure.
    System,
}

/// Outcome of a single transition attempt. Never thrown, always returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_status: Option<StatusId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<TransitionFailure>,
}

impl TransitionResult {
    pub fn applied(
        from_status: &StatusId,
        new_status: StatusId,
        transition_date: DateTime<Utc>,
    ) -> Self {
        Self {
            success: true,
            message: format!("status updated from '{from_status}' to '{new_status}'"),
            new_status: Some(new_status),
            transition_date: Some(transition_date),
            validation_errors: Vec::new(),
            failure: None,
        }
    }

    pub fn validation_failure(errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: "status transition validation failed".to_string(),
            new_status: None,
            transition_date: None,
            validation_errors: errors,
            failure: Some(TransitionFailure::Validation),
        }
    }

    pub fn not_found(id: PriceItemId) -> Self {
        Self {
            success: false,
            message: format!("price record '{id}' not found"),
            new_status: None,
            transition_date: None,
            validation_errors: Vec::new(),
            failure: Some(TransitionFailure::NotFound),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            new_status: None,
            transition_date: None,
            validation_errors: Vec::new(),
            failure: Some(TransitionFailure::Conflict),
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            new_status: None,
            transition_date: None,
            validation_errors: Vec::new(),
            failure: Some(TransitionFailure::System),
        }
    }
}

/// Closed date interval used by bulk filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start_date && instant <= self.end_date
    }
}

/// Candidate filters for a bulk transition; filters are AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_status: Option<Vec<StatusId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_ids: Option<Vec<VendorId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date_range: Option<DateRange>,
}

impl BulkFilters {
    pub fn matches(&self, record: &PriceStatusRecord) -> bool {
        if let Some(statuses) = &self.current_status {
            if !statuses.is_empty() && !statuses.contains(&record.current_status) {
                return false;
            }
        }
        if let Some(vendors) = &self.vendor_ids {
            if !vendors.is_empty() && !vendors.contains(&record.vendor_id) {
                return false;
            }
        }
        if let Some(range) = &self.expiration_date_range {
            if !range.contains(record.expiration_date) {
                return false;
            }
        }
        true
    }
}

/// A request to move many records to the same target status.
///
/// Created per API call, never persisted. An empty `price_item_ids` list
/// means "derive the candidate set from the filters alone".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkTransitionRequest {
    #[serde(default)]
    pub price_item_ids: Vec<PriceItemId>,
    pub target_status: StatusId,
    pub reason: String,
    pub changed_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<BulkFilters>,
}

/// Per-candidate outcome inside a bulk result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemResult {
    pub price_item_id: PriceItemId,
    pub result: TransitionResult,
}

/// Outcome of a bulk transition: partial-failure tolerant, full breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkTransitionOutcome {
    /// True only when every candidate succeeded (and the batch ran to completion).
    pub success: bool,
    pub message: String,
    pub updated_count: usize,
    pub failed_count: usize,
    pub results: Vec<BulkItemResult>,
}

/// One transition actually applied by the automatic sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedTransition {
    pub price_item_id: PriceItemId,
    pub from_status: StatusId,
    pub to_status: StatusId,
    pub reason: String,
}

/// Outcome of one automatic sweep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub checked_count: usize,
    pub updated_count: usize,
    pub updates: Vec<AppliedTransition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use priceguard_catalog::well_known;
    use priceguard_core::ProductId;

    fn record(status: &str, vendor_id: VendorId, expires: DateTime<Utc>) -> PriceStatusRecord {
        PriceStatusRecord::new(
            PriceItemId::new(),
            ProductId::new(),
            "Olive Oil 5L",
            vendor_id,
            "Mediterranean Imports",
            StatusId::new(status),
            expires - Duration::days(180),
            expires,
            14,
        )
    }

    #[test]
    fn empty_filters_match_everything() {
        let filters = BulkFilters::default();
        let r = record(well_known::ACTIVE, VendorId::new(), Utc::now());
        assert!(filters.matches(&r));
    }

    #[test]
    fn filters_are_and_combined() {
        let vendor = VendorId::new();
        let now = Utc::now();
        let filters = BulkFilters {
            current_status: Some(vec![StatusId::new(well_known::ACTIVE)]),
            vendor_ids: Some(vec![vendor]),
            expiration_date_range: Some(DateRange {
                start_date: now,
                end_date: now + Duration::days(30),
            }),
        };

        let matching = record(well_known::ACTIVE, vendor, now + Duration::days(10));
        assert!(filters.matches(&matching));

        let wrong_status = record(well_known::EXPIRED, vendor, now + Duration::days(10));
        assert!(!filters.matches(&wrong_status));

        let wrong_vendor = record(well_known::ACTIVE, VendorId::new(), now + Duration::days(10));
        assert!(!filters.matches(&wrong_vendor));

        let out_of_range = record(well_known::ACTIVE, vendor, now + Duration::days(60));
        assert!(!filters.matches(&out_of_range));
    }

    #[test]
    fn result_constructors_classify_failures() {
        let validation = TransitionResult::validation_failure(vec!["bad".to_string()]);
        assert!(!validation.success);
        assert_eq!(validation.failure, Some(TransitionFailure::Validation));
        assert_eq!(validation.validation_errors.len(), 1);

        let not_found = TransitionResult::not_found(PriceItemId::new());
        assert_eq!(not_found.failure, Some(TransitionFailure::NotFound));
        assert!(not_found.validation_errors.is_empty());

        let applied = TransitionResult::applied(
            &StatusId::new(well_known::ACTIVE),
            StatusId::new(well_known::EXPIRING),
            Utc::now(),
        );
        assert!(applied.success);
        assert!(applied.failure.is_none());
        assert_eq!(applied.new_status, Some(StatusId::new(well_known::EXPIRING)));
    }
}
