// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configured/active service queries and the dynamic update endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use oz_catalog::ServiceDefinition;
use oz_core::{Clock, ServiceInformation};

use crate::provisioner::{DesiredInstance, UpdateError};

use super::{ApiCtx, ApiError};

pub async fn configured<C: Clock + 'static>(
    State(ctx): State<Arc<ApiCtx<C>>>,
) -> Json<Vec<ServiceDefinition>> {
    Json(ctx.provisioner.catalog().services.clone())
}

pub async fn active<C: Clock + 'static>(
    State(ctx): State<Arc<ApiCtx<C>>>,
) -> Result<Json<Vec<ServiceInformation>>, ApiError> {
    let services = ctx
        .provisioner
        .active_services()
        .get()
        .await
        .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;
    Ok(Json(services))
}

/// POST `/srv/services/dynamic/update/`: replace the desired state.
///
/// Instances in the payload are activated (or stay active); active
/// instances missing from it are deactivated.
pub async fn update<C: Clock + 'static>(
    State(ctx): State<Arc<ApiCtx<C>>>,
    Json(updates): Json<Vec<DesiredInstance>>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    match ctx.provisioner.update_services(updates).await {
        Ok(()) => Ok((
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "status": "accepted",
                "message": "Service update request accepted",
            })),
        )),
        Err(UpdateError::Invalid(e)) => Err(ApiError::BadRequest(e.to_string())),
        Err(UpdateError::Persist(e)) => Err(ApiError::ServiceUnavailable(format!(
            "Service update could not be persisted: {e}"
        ))),
    }
}
