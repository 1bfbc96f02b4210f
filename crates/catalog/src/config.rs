//! Externally-owned lifecycle configuration.
//!
//! Transition rules and validity defaults are owned by a separate
//! lifecycle-configuration collaborator; the engine serves them alongside the
//! catalog (see the `lifecycle-states` endpoint) but does not interpret them.
//! The automatic transition rule table the engine *executes* lives in
//! `priceguard-lifecycle::evaluator` and is deliberately hardcoded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use priceguard_core::{DomainError, DomainResult};

use crate::status::StatusId;

/// Condition under which a configured transition rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    WithinWarningPeriod,
    PastExpirationDate,
    WithinGracePeriod,
    Approved,
    Manual,
}

/// One configured transition rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRuleConfig {
    pub from_status: StatusId,
    pub to_status: StatusId,
    pub condition: RuleCondition,
    pub required_role: String,
    pub auto_transition: bool,
}

/// Default validity windows applied when a price record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityDefaults {
    pub default_validity_days: i64,
    pub warning_threshold_days: i64,
    pub grace_period_days: i64,
}

/// The complete externally-owned configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    pub transition_rules: Vec<TransitionRuleConfig>,
    pub validity_defaults: ValidityDefaults,
}

impl LifecycleConfig {
    pub fn from_json_str(json: &str) -> DomainResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("lifecycle config parse failed: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DomainError::validation(format!(
                "lifecycle config read failed ({}): {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Configuration mirroring the builtin catalog's transition table.
    pub fn builtin() -> Self {
        use crate::status::well_known as wk;

        let rule = |from: &str, to: &str, condition, required_role: &str, auto| {
            TransitionRuleConfig {
                from_status: StatusId::new(from),
                to_status: StatusId::new(to),
                condition,
                required_role: required_role.to_string(),
                auto_transition: auto,
            }
        };

        Self {
            transition_rules: vec![
                rule(wk::DRAFT, wk::PENDING_APPROVAL, RuleCondition::Manual, "editor", false),
                rule(wk::PENDING_APPROVAL, wk::ACTIVE, RuleCondition::Approved, "approver", false),
                rule(wk::ACTIVE, wk::EXPIRING, RuleCondition::WithinWarningPeriod, "system", true),
                rule(wk::EXPIRING, wk::EXPIRED, RuleCondition::PastExpirationDate, "system", true),
                rule(wk::EXPIRING, wk::ACTIVE, RuleCondition::Manual, "editor", false),
                rule(wk::EXPIRED, wk::GRACE_PERIOD, RuleCondition::WithinGracePeriod, "system", true),
                rule(wk::EXPIRED, wk::ACTIVE, RuleCondition::Manual, "editor", false),
                rule(wk::GRACE_PERIOD, wk::ACTIVE, RuleCondition::Manual, "editor", false),
                rule(wk::SUSPENDED, wk::ACTIVE, RuleCondition::Manual, "approver", false),
            ],
            validity_defaults: ValidityDefaults {
                default_validity_days: 365,
                warning_threshold_days: 30,
                grace_period_days: 14,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_marks_date_driven_rules_automatic() {
        let config = LifecycleConfig::builtin();
        let auto: Vec<_> = config
            .transition_rules
            .iter()
            .filter(|r| r.auto_transition)
            .collect();

        assert_eq!(auto.len(), 3);
        assert!(auto.iter().all(|r| r.required_role == "system"));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = LifecycleConfig::builtin();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = LifecycleConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
