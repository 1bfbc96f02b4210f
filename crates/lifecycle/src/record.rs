//! Price status records and their audit history.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use priceguard_catalog::StatusId;
use priceguard_core::{PriceItemId, ProductId, VendorId};

/// One entry in a record's append-only status history.
///
/// Entries are immutable once appended and non-decreasing in timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: StatusId,
    pub timestamp: DateTime<Utc>,
    pub changed_by: String,
    pub reason: String,
}

/// The validity state of one priced item (product + vendor).
///
/// `status_history` is the source of truth; `current_status` is a cached
/// projection of the last entry and is kept in sync by the store on append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceStatusRecord {
    pub id: PriceItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub vendor_id: VendorId,
    pub vendor_name: String,
    pub current_status: StatusId,
    pub status_history: Vec<StatusHistoryEntry>,
    pub effective_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    /// Days before expiration at which the warning state is due.
    pub warning_threshold_days: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period_end: Option<DateTime<Utc>>,
    pub auto_renewal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspension_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status_check: Option<DateTime<Utc>>,
    #[serde(default)]
    pub renewal_notification_sent: bool,
}

impl PriceStatusRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PriceItemId,
        product_id: ProductId,
        product_name: impl Into<String>,
        vendor_id: VendorId,
        vendor_name: impl Into<String>,
        current_status: StatusId,
        effective_date: DateTime<Utc>,
        expiration_date: DateTime<Utc>,
        warning_threshold_days: i64,
    ) -> Self {
        Self {
            id,
            product_id,
            product_name: product_name.into(),
            vendor_id,
            vendor_name: vendor_name.into(),
            current_status,
            status_history: Vec::new(),
            effective_date,
            expiration_date,
            warning_threshold_days,
            grace_period_end: None,
            auto_renewal: false,
            suspension_reason: None,
            last_status_check: None,
            renewal_notification_sent: false,
        }
    }

    pub fn with_grace_period_end(mut self, end: DateTime<Utc>) -> Self {
        self.grace_period_end = Some(end);
        self
    }

    pub fn with_auto_renewal(mut self, enabled: bool) -> Self {
        self.auto_renewal = enabled;
        self
    }

    pub fn with_history_entry(mut self, entry: StatusHistoryEntry) -> Self {
        self.current_status = entry.status.clone();
        self.status_history.push(entry);
        self
    }

    /// Whole days until expiration, rounded up; negative once expired.
    ///
    /// A price expiring later today still counts as 1 day remaining, which is
    /// what the warning-window rule expects.
    pub fn days_until_expiration(&self, now: DateTime<Utc>) -> i64 {
        let delta = self.expiration_date - now;
        div_ceil_ms(delta, Duration::days(1))
    }

    /// Whole days since expiration, if expired.
    pub fn days_since_expiration(&self, now: DateTime<Utc>) -> Option<i64> {
        if now > self.expiration_date {
            Some((now - self.expiration_date).num_days())
        } else {
            None
        }
    }

    /// Inside the warning window: close to expiration but not yet past it.
    pub fn is_in_warning_period(&self, now: DateTime<Utc>) -> bool {
        let days = self.days_until_expiration(now);
        days > 0 && days <= self.warning_threshold_days
    }

    /// History consistency invariant: the cached `current_status` must equal
    /// the status of the last history entry (when history is non-empty).
    pub fn history_is_consistent(&self) -> bool {
        match self.status_history.last() {
            Some(last) => last.status == self.current_status,
            None => true,
        }
    }

    /// Read-side projection with derived day counts against `now`.
    pub fn to_view(&self, now: DateTime<Utc>) -> PriceStatusView {
        PriceStatusView {
            price_item_id: self.id,
            product_id: self.product_id,
            product_name: self.product_name.clone(),
            vendor_id: self.vendor_id,
            vendor_name: self.vendor_name.clone(),
            current_status: self.current_status.clone(),
            status_history: self.status_history.clone(),
            effective_date: self.effective_date,
            expiration_date: self.expiration_date,
            days_until_expiration: self.days_until_expiration(now),
            days_since_expiration: self.days_since_expiration(now),
            warning_threshold_days: self.warning_threshold_days,
            is_in_warning_period: self.is_in_warning_period(now),
            grace_period_end: self.grace_period_end,
            auto_renewal: self.auto_renewal,
            suspension_reason: self.suspension_reason.clone(),
            last_status_check: self.last_status_check,
            renewal_notification_sent: self.renewal_notification_sent,
        }
    }
}

/// Ceiling division of one duration by another, in milliseconds.
fn div_ceil_ms(delta: Duration, unit: Duration) -> i64 {
    let delta_ms = delta.num_milliseconds();
    let unit_ms = unit.num_milliseconds();
    delta_ms.div_euclid(unit_ms) + i64::from(delta_ms.rem_euclid(unit_ms) != 0)
}

/// API-facing projection of a [`PriceStatusRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceStatusView {
    pub price_item_id: PriceItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub vendor_id: VendorId,
    pub vendor_name: String,
    pub current_status: StatusId,
    pub status_history: Vec<StatusHistoryEntry>,
    pub effective_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub days_until_expiration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_since_expiration: Option<i64>,
    pub warning_threshold_days: i64,
    pub is_in_warning_period: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period_end: Option<DateTime<Utc>>,
    pub auto_renewal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspension_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status_check: Option<DateTime<Utc>>,
    #[serde(default)]
    pub renewal_notification_sent: bool,
}
