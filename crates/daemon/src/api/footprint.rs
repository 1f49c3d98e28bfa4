// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Footprint queue endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use oz_cache::set_with_retry;
use oz_core::{Clock, FootprintRequest, FootprintTarget};

use super::{ApiCtx, ApiError};

pub async fn list<C: Clock + 'static>(
    State(ctx): State<Arc<ApiCtx<C>>>,
) -> Result<Json<Vec<FootprintRequest>>, ApiError> {
    let requests = ctx
        .provisioner
        .footprint_queue()
        .get_all()
        .await
        .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;
    Ok(Json(requests))
}

/// A footprint job as submitted by an operator.
#[derive(Debug, Deserialize)]
pub struct FootprintRequestBody {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub footprint_all_services: bool,
    #[serde(default)]
    pub services: Vec<FootprintTarget>,
}

/// POST `/srv/services/footprint`: queue a measurement job.
///
/// Admitted only when the system is unloaded; otherwise 409.
pub async fn request<C: Clock + 'static>(
    State(ctx): State<Arc<ApiCtx<C>>>,
    Json(body): Json<FootprintRequestBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let active = ctx
        .provisioner
        .active_services()
        .get()
        .await
        .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;
    if !active.is_empty() {
        return Err(ApiError::Conflict(
            "Footprinting requires an unloaded system (no active services)".to_string(),
        ));
    }

    let request = FootprintRequest {
        request_id: body
            .request_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string()),
        footprint_all_services: body.footprint_all_services,
        services: body.services,
        requested_at: ctx.provisioner.clock().now(),
        footprint_started_at: None,
        footprint_in_progress: false,
    };

    let queue = ctx.provisioner.footprint_queue();
    if let Err(e) = set_with_retry(|| queue.append(&request)).await {
        warn!(error = %e, "failed to queue footprinting request");
        return Err(ApiError::ServiceUnavailable(format!(
            "Failed to queue footprinting request: {e}"
        )));
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "status": "accepted",
            "request_id": request.request_id,
        })),
    ))
}
