//! Transition legality validation.

use priceguard_catalog::StatusCatalog;

use crate::transition::TransitionRequest;

/// Result of validating a transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate a proposed transition against the catalog.
///
/// Pure and repeatable; all rule violations are collected (not
/// short-circuited) so a caller sees every problem at once. Record existence
/// is *not* checked here — that happens at the persistence boundary.
pub fn validate_transition(
    catalog: &StatusCatalog,
    request: &TransitionRequest,
) -> ValidationOutcome {
    let mut errors = Vec::new();

    let from = catalog.get(&request.from_status);
    if from.is_none() {
        errors.push(format!("unknown current status '{}'", request.from_status));
    }

    let to = catalog.get(&request.to_status);
    if to.is_none() {
        errors.push(format!("unknown target status '{}'", request.to_status));
    }

    if let (Some(from), Some(_)) = (from, to) {
        if !from.allows_transition_to(&request.to_status) {
            errors.push(format!(
                "transition from '{}' to '{}' is not allowed",
                request.from_status, request.to_status
            ));
        }
    }

    if request.reason.trim().is_empty() {
        errors.push("reason is required for status transitions".to_string());
    }

    if request.changed_by.trim().is_empty() {
        errors.push("changed_by is required for status transitions".to_string());
    }

    ValidationOutcome::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use priceguard_catalog::{well_known, StatusId};
    use priceguard_core::PriceItemId;
    use proptest::prelude::*;

    fn request(from: &str, to: &str, reason: &str, changed_by: &str) -> TransitionRequest {
        TransitionRequest {
            price_item_id: PriceItemId::new(),
            from_status: StatusId::new(from),
            to_status: StatusId::new(to),
            reason: reason.to_string(),
            changed_by: changed_by.to_string(),
            effective_date: None,
            additional_data: None,
        }
    }

    #[test]
    fn legal_transition_passes() {
        let catalog = StatusCatalog::builtin();
        let outcome = validate_transition(
            &catalog,
            &request(well_known::ACTIVE, well_known::EXPIRING, "warning window", "alice"),
        );
        assert!(outcome.is_valid);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn illegal_transition_and_empty_reason_collect_two_errors() {
        // active -> expired is not in the builtin table, and the reason is
        // blank: exactly those two violations must be reported.
        let catalog = StatusCatalog::builtin();
        let outcome = validate_transition(
            &catalog,
            &request(well_known::ACTIVE, well_known::EXPIRED, "", "alice"),
        );

        assert!(!outcome.is_valid);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors[0].contains("not allowed"));
        assert!(outcome.errors[1].contains("reason is required"));
    }

    #[test]
    fn unknown_statuses_are_each_reported() {
        let catalog = StatusCatalog::builtin();
        let outcome = validate_transition(&catalog, &request("ghost", "phantom", "r", "alice"));

        assert!(!outcome.is_valid);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors[0].contains("unknown current status"));
        assert!(outcome.errors[1].contains("unknown target status"));
    }

    #[test]
    fn whitespace_only_actor_is_rejected() {
        let catalog = StatusCatalog::builtin();
        let outcome = validate_transition(
            &catalog,
            &request(well_known::ACTIVE, well_known::EXPIRING, "reason", "   "),
        );

        assert!(!outcome.is_valid);
        assert_eq!(outcome.errors, vec!["changed_by is required for status transitions"]);
    }

    #[test]
    fn validation_is_repeatable() {
        let catalog = StatusCatalog::builtin();
        let req = request(well_known::ACTIVE, well_known::EXPIRED, "", "");
        let first = validate_transition(&catalog, &req);
        let second = validate_transition(&catalog, &req);
        assert_eq!(first, second);
    }

    proptest! {
        /// is_valid must always agree with the collected error list.
        #[test]
        fn is_valid_iff_no_errors(
            from in "[a-z_]{0,12}",
            to in "[a-z_]{0,12}",
            reason in ".{0,16}",
            changed_by in ".{0,16}",
        ) {
            let catalog = StatusCatalog::builtin();
            let outcome = validate_transition(
                &catalog,
                &request(&from, &to, &reason, &changed_by),
            );
            prop_assert_eq!(outcome.is_valid, outcome.errors.is_empty());
        }
    }
}
