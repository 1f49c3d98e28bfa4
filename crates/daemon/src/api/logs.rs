// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cached runner logs for a service's container.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use oz_core::{container_name, Clock, DEFAULT_REALM};

use super::{ApiCtx, ApiError};

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub realm: Option<String>,
    pub profile: Option<String>,
    pub variety: Option<String>,
    /// Keep only the first N lines.
    pub top: Option<usize>,
    /// Keep only the last N lines.
    pub last: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LogLines {
    pub service_name: String,
    pub profile: Option<String>,
    pub variety: Option<String>,
    pub request_datetime: DateTime<Utc>,
    pub is_top_n: bool,
    pub is_bottom_n: bool,
    pub lines: Vec<String>,
}

/// GET `/srv/services/logs/{service}/`.
///
/// Resolves the instance name from the active services when possible and
/// falls back to the raw service name, matching how containers are named.
pub async fn service_logs<C: Clock + 'static>(
    State(ctx): State<Arc<ApiCtx<C>>>,
    Path(service): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogLines>, ApiError> {
    let realm = query.realm.clone().unwrap_or_else(|| DEFAULT_REALM.to_string());

    let active = ctx
        .provisioner
        .active_services()
        .get()
        .await
        .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;

    let instance_name = active
        .iter()
        .find(|s| {
            s.service == service
                && s.realm == realm
                && query.profile.as_ref().is_none_or(|p| s.profile.as_ref() == Some(p))
                && query.variety.as_ref().is_none_or(|v| s.variety.as_ref() == Some(v))
        })
        .map(|s| s.name.clone())
        .unwrap_or_else(|| service.clone());

    let container = container_name(&realm, &instance_name);
    let mut lines = ctx.provisioner.runner_logs().lines(&container).await;

    if let Some(top) = query.top {
        lines.truncate(top);
    }
    if let Some(last) = query.last {
        if lines.len() > last {
            lines.drain(..lines.len() - last);
        }
    }

    Ok(Json(LogLines {
        service_name: service,
        profile: query.profile,
        variety: query.variety,
        request_datetime: ctx.provisioner.clock().now(),
        is_top_n: query.top.is_some(),
        is_bottom_n: query.last.is_some(),
        lines,
    }))
}
