use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/status-data", get(status_data))
        .route("/status-data/:id/history", get(status_history))
        .route("/metrics", get(metrics))
        .route("/lifecycle-states", get(lifecycle_states))
        .route("/update-status", post(update_status))
        .route("/bulk-update", post(bulk_update))
        .route("/process-automatic-transitions", put(process_automatic_transitions))
}

pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.lifecycle.status_dashboard() {
        Ok(dashboard) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "data": dashboard })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn status_data(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::StatusDataQuery>,
) -> axum::response::Response {
    let ids = match query.price_item_ids.as_deref() {
        Some(csv) => match dto::parse_price_item_ids(csv) {
            Ok(ids) => Some(ids),
            Err(resp) => return resp,
        },
        None => None,
    };

    let statuses = query.status.as_deref().map(dto::parse_statuses);

    let urgency = match query.urgency.as_deref() {
        Some(s) => match dto::parse_urgency(s) {
            Ok(u) => Some(u),
            Err(resp) => return resp,
        },
        None => None,
    };

    match services
        .lifecycle
        .status_data(ids.as_deref(), statuses.as_deref(), urgency)
    {
        Ok(items) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "data": items })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn status_history(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_price_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.lifecycle.status_history(id) {
        Ok(Some(history)) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "data": history })),
        )
            .into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("price record '{id}' not found"),
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn metrics(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let status_metrics = match services.lifecycle.status_metrics() {
        Ok(m) => m,
        Err(e) => return errors::store_error_to_response(e),
    };

    // Trend/risk summaries come from the external reporting collaborator;
    // the engine only merges them into the payload.
    let validity = services.reporting.validity_summary();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "data": {
                "status_metrics": status_metrics,
                "validity": validity,
            },
        })),
    )
        .into_response()
}

pub async fn lifecycle_states(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "data": {
                "states": services.catalog.list(),
                "transition_rules": services.lifecycle_config.transition_rules,
                "validity_defaults": services.lifecycle_config.validity_defaults,
            },
        })),
    )
        .into_response()
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::UpdateStatusRequest>,
) -> axum::response::Response {
    let request = match body.into_domain() {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let result = services.lifecycle.update_price_status(&request);
    let status = errors::transition_status_code(&result);
    (
        status,
        Json(serde_json::json!({
            "success": result.success,
            "message": result.message,
            "data": result,
        })),
    )
        .into_response()
}

pub async fn bulk_update(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::BulkUpdateRequest>,
) -> axum::response::Response {
    let request = match body.into_domain() {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    // Per-item failures are part of the payload, not an HTTP failure.
    let outcome = services.lifecycle.bulk_update_status(&request);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": outcome.success,
            "message": outcome.message,
            "data": outcome,
        })),
    )
        .into_response()
}

pub async fn process_automatic_transitions(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let sweep = services.lifecycle.check_and_update_automatic_statuses();
    let renewal = services.renewal.process_renewals();
    let total = sweep.updated_count + renewal.transition_count;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "message": format!("processed {total} automatic transitions"),
            "data": {
                "status": sweep,
                "renewal": renewal,
            },
        })),
    )
        .into_response()
}
