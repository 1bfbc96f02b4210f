//! Date-driven automatic transition rules.

use chrono::{DateTime, Utc};

use priceguard_catalog::{well_known, StatusId};

use crate::record::PriceStatusRecord;

/// A transition the automatic sweep should apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoTransition {
    pub to_status: StatusId,
    pub reason: String,
}

/// Evaluate the automatic rule table against one record.
///
/// Pure and deterministic. Rules key off the record's *current* status, so a
/// record that already moved yields `None` until the next date boundary is
/// crossed — this is what makes the sweep idempotent.
///
/// Rule table:
/// - `active`   -> `expiring`     when days-until-expiration <= warning threshold
/// - `expiring` -> `expired`      when days-until-expiration <= 0
/// - `expired`  -> `grace_period` when a grace period is configured and still open
/// - anything else -> no transition
pub fn evaluate(record: &PriceStatusRecord, now: DateTime<Utc>) -> Option<AutoTransition> {
    let days_until = record.days_until_expiration(now);

    match record.current_status.as_str() {
        well_known::ACTIVE if days_until <= record.warning_threshold_days => {
            Some(AutoTransition {
                to_status: StatusId::new(well_known::EXPIRING),
                reason: format!("entered warning period ({days_until} days remaining)"),
            })
        }
        well_known::EXPIRING if days_until <= 0 => Some(AutoTransition {
            to_status: StatusId::new(well_known::EXPIRED),
            reason: "reached expiration date".to_string(),
        }),
        well_known::EXPIRED => match record.grace_period_end {
            Some(end) if now <= end => Some(AutoTransition {
                to_status: StatusId::new(well_known::GRACE_PERIOD),
                reason: "entered grace period".to_string(),
            }),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use priceguard_core::{PriceItemId, ProductId, VendorId};

    fn record(status: &str, now: DateTime<Utc>, expires_in: Duration) -> PriceStatusRecord {
        PriceStatusRecord::new(
            PriceItemId::new(),
            ProductId::new(),
            "Basmati Rice 25kg",
            VendorId::new(),
            "Golden Harvest Ltd",
            StatusId::new(status),
            now - Duration::days(300),
            now + expires_in,
            7,
        )
    }

    #[test]
    fn active_enters_warning_window() {
        let now = Utc::now();
        let r = record(well_known::ACTIVE, now, Duration::days(5));

        let auto = evaluate(&r, now).expect("transition due");
        assert_eq!(auto.to_status, StatusId::new(well_known::EXPIRING));
        assert!(auto.reason.contains("5 days remaining"), "reason: {}", auto.reason);
    }

    #[test]
    fn active_outside_warning_window_stays_put() {
        let now = Utc::now();
        let r = record(well_known::ACTIVE, now, Duration::days(30));
        assert_eq!(evaluate(&r, now), None);
    }

    #[test]
    fn expiring_becomes_expired_past_the_date() {
        let now = Utc::now();
        let r = record(well_known::EXPIRING, now, Duration::days(-1));

        let auto = evaluate(&r, now).expect("transition due");
        assert_eq!(auto.to_status, StatusId::new(well_known::EXPIRED));
        assert_eq!(auto.reason, "reached expiration date");
    }

    #[test]
    fn expiring_before_the_date_stays_put() {
        let now = Utc::now();
        let r = record(well_known::EXPIRING, now, Duration::days(2));
        assert_eq!(evaluate(&r, now), None);
    }

    #[test]
    fn expired_enters_open_grace_period() {
        let now = Utc::now();
        let r = record(well_known::EXPIRED, now, Duration::days(-3))
            .with_grace_period_end(now + Duration::days(11));

        let auto = evaluate(&r, now).expect("transition due");
        assert_eq!(auto.to_status, StatusId::new(well_known::GRACE_PERIOD));
    }

    #[test]
    fn expired_without_grace_period_stays_put() {
        let now = Utc::now();
        let r = record(well_known::EXPIRED, now, Duration::days(-3));
        assert_eq!(evaluate(&r, now), None);
    }

    #[test]
    fn expired_past_grace_window_stays_put() {
        let now = Utc::now();
        let r = record(well_known::EXPIRED, now, Duration::days(-30))
            .with_grace_period_end(now - Duration::days(2));
        assert_eq!(evaluate(&r, now), None);
    }

    #[test]
    fn terminal_and_manual_statuses_never_auto_transition() {
        let now = Utc::now();
        for status in [
            well_known::DRAFT,
            well_known::PENDING_APPROVAL,
            well_known::GRACE_PERIOD,
            well_known::SUSPENDED,
        ] {
            let r = record(status, now, Duration::days(-10));
            assert_eq!(evaluate(&r, now), None, "status '{status}' must not auto-transition");
        }
    }

    #[test]
    fn evaluation_is_stable_across_calls() {
        let now = Utc::now();
        let r = record(well_known::ACTIVE, now, Duration::days(3));
        assert_eq!(evaluate(&r, now), evaluate(&r, now));
    }
}
