//! Status definitions and the catalog that holds them.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use priceguard_core::{DomainError, DomainResult};

/// Well-known status identifiers.
///
/// The catalog accepts arbitrary configured identifiers; these constants name
/// the ones the automatic transition rules know about.
pub mod well_known {
    pub const DRAFT: &str = "draft";
    pub const PENDING_APPROVAL: &str = "pending_approval";
    pub const ACTIVE: &str = "active";
    pub const EXPIRING: &str = "expiring";
    pub const EXPIRED: &str = "expired";
    pub const GRACE_PERIOD: &str = "grace_period";
    pub const SUSPENDED: &str = "suspended";
}

/// Identifier of one validity status (a node in the lifecycle graph).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(String);

impl StatusId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for StatusId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StatusId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StatusId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// How urgently a status that requires action should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

impl FromStr for UrgencyLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(UrgencyLevel::Low),
            "medium" => Ok(UrgencyLevel::Medium),
            "high" => Ok(UrgencyLevel::High),
            other => Err(DomainError::validation(format!(
                "urgency must be one of: low, medium, high (got '{other}')"
            ))),
        }
    }
}

/// One catalog entry: identity, display metadata, and the transitions a
/// record in this status may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDefinition {
    pub id: StatusId,
    pub name: String,
    pub description: String,
    pub color: String,
    pub background_color: String,
    pub icon: String,
    pub priority: u32,
    pub display_text: String,
    pub badge_variant: String,
    pub allowed_transitions: Vec<StatusId>,
    pub requires_action: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency_level: Option<UrgencyLevel>,
}

impl StatusDefinition {
    pub fn allows_transition_to(&self, target: &StatusId) -> bool {
        self.allowed_transitions.contains(target)
    }
}

/// JSON configuration file shape.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    status_indicators: Vec<StatusDefinition>,
}

/// Immutable-per-load registry of status definitions.
///
/// Lookups are by identifier; list order is the load order and is stable.
#[derive(Debug, Clone)]
pub struct StatusCatalog {
    statuses: Vec<StatusDefinition>,
    index: HashMap<StatusId, usize>,
}

impl StatusCatalog {
    /// Build a catalog from definitions. Duplicate identifiers are rejected;
    /// unknown transition *targets* are tolerated here (configuration drift)
    /// and dropped with a warning at resolution time.
    pub fn new(statuses: Vec<StatusDefinition>) -> DomainResult<Self> {
        let mut index = HashMap::with_capacity(statuses.len());
        for (pos, def) in statuses.iter().enumerate() {
            if index.insert(def.id.clone(), pos).is_some() {
                return Err(DomainError::invariant(format!(
                    "duplicate status identifier '{}' in catalog",
                    def.id
                )));
            }
        }
        Ok(Self { statuses, index })
    }

    /// Parse a catalog from its JSON configuration document.
    pub fn from_json_str(json: &str) -> DomainResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("catalog config parse failed: {e}")))?;
        Self::new(file.status_indicators)
    }

    /// Load a catalog from a JSON configuration file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DomainError::validation(format!("catalog config read failed ({}): {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// The full catalog, stable order.
    pub fn list(&self) -> &[StatusDefinition] {
        &self.statuses
    }

    /// Lookup by identifier. Absent is a normal, expected outcome.
    pub fn get(&self, id: &StatusId) -> Option<&StatusDefinition> {
        self.index.get(id).map(|&pos| &self.statuses[pos])
    }

    pub fn contains(&self, id: &StatusId) -> bool {
        self.index.contains_key(id)
    }

    /// Resolve the configured transition identifiers of `id` into full
    /// definitions. Identifiers that do not exist in the catalog are dropped
    /// with a warning (they indicate configuration drift, not a hard error).
    pub fn allowed_transitions(&self, id: &StatusId) -> Vec<&StatusDefinition> {
        let Some(def) = self.get(id) else {
            return Vec::new();
        };

        def.allowed_transitions
            .iter()
            .filter_map(|target| {
                let resolved = self.get(target);
                if resolved.is_none() {
                    tracing::warn!(
                        status = %id,
                        target = %target,
                        "allowed transition target missing from catalog; dropping"
                    );
                }
                resolved
            })
            .collect()
    }

    /// Statuses flagged as requiring action, optionally narrowed by urgency.
    /// Order follows the catalog order.
    pub fn action_statuses(&self, urgency: Option<UrgencyLevel>) -> Vec<&StatusDefinition> {
        self.statuses
            .iter()
            .filter(|def| def.requires_action)
            .filter(|def| urgency.is_none_or(|u| def.urgency_level == Some(u)))
            .collect()
    }

    /// The default catalog used when no configuration file is supplied.
    pub fn builtin() -> Self {
        let statuses = vec![
            StatusDefinition {
                id: StatusId::new(well_known::DRAFT),
                name: "Draft".to_string(),
                description: "Price entered but not yet submitted for approval".to_string(),
                color: "#6B7280".to_string(),
                background_color: "#F3F4F6".to_string(),
                icon: "pencil".to_string(),
                priority: 10,
                display_text: "Draft".to_string(),
                badge_variant: "secondary".to_string(),
                allowed_transitions: vec![
                    StatusId::new(well_known::PENDING_APPROVAL),
                    StatusId::new(well_known::ACTIVE),
                ],
                requires_action: false,
                action_text: None,
                urgency_level: None,
            },
            StatusDefinition {
                id: StatusId::new(well_known::PENDING_APPROVAL),
                name: "Pending Approval".to_string(),
                description: "Awaiting approval before becoming active".to_string(),
                color: "#F59E0B".to_string(),
                background_color: "#FEF3C7".to_string(),
                icon: "clock".to_string(),
                priority: 20,
                display_text: "Pending Approval".to_string(),
                badge_variant: "warning".to_string(),
                allowed_transitions: vec![
                    StatusId::new(well_known::ACTIVE),
                    StatusId::new(well_known::DRAFT),
                ],
                requires_action: true,
                action_text: Some("Review and approve".to_string()),
                urgency_level: Some(UrgencyLevel::Medium),
            },
            StatusDefinition {
                id: StatusId::new(well_known::ACTIVE),
                name: "Active".to_string(),
                description: "Price is valid and in effect".to_string(),
                color: "#10B981".to_string(),
                background_color: "#D1FAE5".to_string(),
                icon: "check-circle".to_string(),
                priority: 30,
                display_text: "Active".to_string(),
                badge_variant: "success".to_string(),
                allowed_transitions: vec![
                    StatusId::new(well_known::EXPIRING),
                    StatusId::new(well_known::SUSPENDED),
                ],
                requires_action: false,
                action_text: None,
                urgency_level: None,
            },
            StatusDefinition {
                id: StatusId::new(well_known::EXPIRING),
                name: "Expiring Soon".to_string(),
                description: "Price is inside its warning window before expiration".to_string(),
                color: "#F59E0B".to_string(),
                background_color: "#FEF3C7".to_string(),
                icon: "alert-triangle".to_string(),
                priority: 40,
                display_text: "Expiring Soon".to_string(),
                badge_variant: "warning".to_string(),
                allowed_transitions: vec![
                    StatusId::new(well_known::EXPIRED),
                    StatusId::new(well_known::ACTIVE),
                    StatusId::new(well_known::SUSPENDED),
                ],
                requires_action: true,
                action_text: Some("Renew before expiration".to_string()),
                urgency_level: Some(UrgencyLevel::High),
            },
            StatusDefinition {
                id: StatusId::new(well_known::EXPIRED),
                name: "Expired".to_string(),
                description: "Price has passed its expiration date".to_string(),
                color: "#EF4444".to_string(),
                background_color: "#FEE2E2".to_string(),
                icon: "x-circle".to_string(),
                priority: 50,
                display_text: "Expired".to_string(),
                badge_variant: "destructive".to_string(),
                allowed_transitions: vec![
                    StatusId::new(well_known::GRACE_PERIOD),
                    StatusId::new(well_known::ACTIVE),
                ],
                requires_action: true,
                action_text: Some("Renew or retire".to_string()),
                urgency_level: Some(UrgencyLevel::High),
            },
            StatusDefinition {
                id: StatusId::new(well_known::GRACE_PERIOD),
                name: "Grace Period".to_string(),
                description: "Expired but still honored pending renewal".to_string(),
                color: "#8B5CF6".to_string(),
                background_color: "#EDE9FE".to_string(),
                icon: "hourglass".to_string(),
                priority: 60,
                display_text: "Grace Period".to_string(),
                badge_variant: "outline".to_string(),
                allowed_transitions: vec![
                    StatusId::new(well_known::ACTIVE),
                    StatusId::new(well_known::SUSPENDED),
                ],
                requires_action: true,
                action_text: Some("Complete renewal".to_string()),
                urgency_level: Some(UrgencyLevel::High),
            },
            StatusDefinition {
                id: StatusId::new(well_known::SUSPENDED),
                name: "Suspended".to_string(),
                description: "Price temporarily withdrawn from use".to_string(),
                color: "#6B7280".to_string(),
                background_color: "#F3F4F6".to_string(),
                icon: "pause-circle".to_string(),
                priority: 70,
                display_text: "Suspended".to_string(),
                badge_variant: "secondary".to_string(),
                allowed_transitions: vec![StatusId::new(well_known::ACTIVE)],
                requires_action: true,
                action_text: Some("Review suspension".to_string()),
                urgency_level: Some(UrgencyLevel::Medium),
            },
        ];

        Self::new(statuses).expect("builtin catalog has unique identifiers")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(id: &str, transitions: &[&str]) -> StatusDefinition {
        StatusDefinition {
            id: StatusId::new(id),
            name: id.to_string(),
            description: String::new(),
            color: "#000000".to_string(),
            background_color: "#FFFFFF".to_string(),
            icon: "dot".to_string(),
            priority: 1,
            display_text: id.to_string(),
            badge_variant: "secondary".to_string(),
            allowed_transitions: transitions.iter().map(|t| StatusId::new(*t)).collect(),
            requires_action: false,
            action_text: None,
            urgency_level: None,
        }
    }

    #[test]
    fn builtin_catalog_resolves_every_transition_target() {
        let catalog = StatusCatalog::builtin();
        for def in catalog.list() {
            let resolved = catalog.allowed_transitions(&def.id);
            assert_eq!(
                resolved.len(),
                def.allowed_transitions.len(),
                "builtin transition targets of '{}' must all resolve",
                def.id
            );
        }
    }

    #[test]
    fn builtin_active_does_not_allow_direct_expired() {
        let catalog = StatusCatalog::builtin();
        let active = catalog.get(&StatusId::new(well_known::ACTIVE)).unwrap();
        assert!(!active.allows_transition_to(&StatusId::new(well_known::EXPIRED)));
        assert!(active.allows_transition_to(&StatusId::new(well_known::EXPIRING)));
    }

    #[test]
    fn get_returns_none_for_unknown_status() {
        let catalog = StatusCatalog::builtin();
        assert!(catalog.get(&StatusId::new("nonexistent")).is_none());
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let result = StatusCatalog::new(vec![status("a", &[]), status("a", &[])]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_transition_targets_are_dropped_on_resolution() {
        let catalog =
            StatusCatalog::new(vec![status("a", &["b", "ghost"]), status("b", &[])]).unwrap();

        let resolved = catalog.allowed_transitions(&StatusId::new("a"));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, StatusId::new("b"));
    }

    #[test]
    fn allowed_transitions_of_unknown_status_is_empty() {
        let catalog = StatusCatalog::builtin();
        assert!(catalog.allowed_transitions(&StatusId::new("ghost")).is_empty());
    }

    #[test]
    fn action_statuses_filter_by_urgency() {
        let catalog = StatusCatalog::builtin();

        let all_action = catalog.action_statuses(None);
        assert!(all_action.iter().all(|d| d.requires_action));
        assert!(all_action.len() >= 4);

        let high = catalog.action_statuses(Some(UrgencyLevel::High));
        assert!(high.iter().all(|d| d.urgency_level == Some(UrgencyLevel::High)));
        assert!(high.len() < all_action.len());
    }

    #[test]
    fn catalog_parses_json_config() {
        let json = r##"{
            "status_indicators": [
                {
                    "id": "active",
                    "name": "Active",
                    "description": "in effect",
                    "color": "#10B981",
                    "background_color": "#D1FAE5",
                    "icon": "check-circle",
                    "priority": 1,
                    "display_text": "Active",
                    "badge_variant": "success",
                    "allowed_transitions": ["expiring"],
                    "requires_action": false
                },
                {
                    "id": "expiring",
                    "name": "Expiring",
                    "description": "warning window",
                    "color": "#F59E0B",
                    "background_color": "#FEF3C7",
                    "icon": "alert-triangle",
                    "priority": 2,
                    "display_text": "Expiring Soon",
                    "badge_variant": "warning",
                    "allowed_transitions": ["active"],
                    "requires_action": true,
                    "urgency_level": "high"
                }
            ]
        }"##;

        let catalog = StatusCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.list().len(), 2);

        let expiring = catalog.get(&StatusId::new("expiring")).unwrap();
        assert_eq!(expiring.urgency_level, Some(UrgencyLevel::High));
        assert!(expiring.requires_action);
    }
}
