use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use priceguard_catalog::{StatusId, UrgencyLevel};
use priceguard_core::{PriceItemId, VendorId};
use priceguard_lifecycle::{BulkFilters, BulkTransitionRequest, DateRange, TransitionRequest};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub price_item_id: String,
    pub from_status: String,
    pub to_status: String,
    pub reason: String,
    pub changed_by: String,
    #[serde(default)]
    pub effective_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub additional_data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    #[serde(default)]
    pub price_item_ids: Vec<String>,
    pub target_status: String,
    pub reason: String,
    pub changed_by: String,
    #[serde(default)]
    pub filters: Option<BulkFiltersRequest>,
}

#[derive(Debug, Deserialize)]
pub struct BulkFiltersRequest {
    #[serde(default)]
    pub current_status: Option<Vec<String>>,
    #[serde(default)]
    pub vendor_ids: Option<Vec<String>>,
    #[serde(default)]
    pub expiration_date_range: Option<DateRangeRequest>,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeRequest {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Query parameters of `GET /price-validity/status-data`.
/// List parameters are comma-separated, mirroring the caller's contract.
#[derive(Debug, Deserialize)]
pub struct StatusDataQuery {
    #[serde(default)]
    pub price_item_ids: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
}

// -------------------------
// Parsing helpers
// -------------------------

pub fn parse_price_item_id(s: &str) -> Result<PriceItemId, axum::response::Response> {
    s.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            format!("invalid price item id '{s}'"),
        )
    })
}

pub fn parse_price_item_ids(
    csv: &str,
) -> Result<Vec<PriceItemId>, axum::response::Response> {
    csv.split(',')
        .filter(|s| !s.is_empty())
        .map(parse_price_item_id)
        .collect()
}

pub fn parse_statuses(csv: &str) -> Vec<StatusId> {
    csv.split(',')
        .filter(|s| !s.is_empty())
        .map(StatusId::new)
        .collect()
}

pub fn parse_urgency(s: &str) -> Result<UrgencyLevel, axum::response::Response> {
    s.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_urgency",
            "urgency must be one of: low, medium, high",
        )
    })
}

impl UpdateStatusRequest {
    pub fn into_domain(self) -> Result<TransitionRequest, axum::response::Response> {
        Ok(TransitionRequest {
            price_item_id: parse_price_item_id(&self.price_item_id)?,
            from_status: StatusId::new(self.from_status),
            to_status: StatusId::new(self.to_status),
            reason: self.reason,
            changed_by: self.changed_by,
            effective_date: self.effective_date,
            additional_data: self.additional_data,
        })
    }
}

impl BulkUpdateRequest {
    pub fn into_domain(self) -> Result<BulkTransitionRequest, axum::response::Response> {
        let price_item_ids = self
            .price_item_ids
            .iter()
            .map(|s| parse_price_item_id(s))
            .collect::<Result<Vec<_>, _>>()?;

        let filters = match self.filters {
            Some(f) => Some(f.into_domain()?),
            None => None,
        };

        Ok(BulkTransitionRequest {
            price_item_ids,
            target_status: StatusId::new(self.target_status),
            reason: self.reason,
            changed_by: self.changed_by,
            filters,
        })
    }
}

impl BulkFiltersRequest {
    fn into_domain(self) -> Result<BulkFilters, axum::response::Response> {
        let vendor_ids = match self.vendor_ids {
            Some(ids) => Some(
                ids.iter()
                    .map(|s| {
                        s.parse::<VendorId>().map_err(|_| {
                            errors::json_error(
                                StatusCode::BAD_REQUEST,
                                "invalid_id",
                                format!("invalid vendor id '{s}'"),
                            )
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        Ok(BulkFilters {
            current_status: self
                .current_status
                .map(|statuses| statuses.into_iter().map(StatusId::new).collect()),
            vendor_ids,
            expiration_date_range: self.expiration_date_range.map(|r| DateRange {
                start_date: r.start_date,
                end_date: r.end_date,
            }),
        })
    }
}
