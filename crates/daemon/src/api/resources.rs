// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host resource reporting, primarily for troubleshooting.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use oz_core::{Clock, HostSnapshot, Resource};

use super::ApiCtx;

pub async fn available<C: Clock + 'static>(
    State(ctx): State<Arc<ApiCtx<C>>>,
) -> Json<Vec<Resource>> {
    let snapshot = ctx.provisioner.host().snapshot().await;
    Json(Resource::from_snapshot(&snapshot))
}

/// GET `/srv/host/resources`: the raw snapshot, for troubleshooting.
pub async fn host_resources<C: Clock + 'static>(
    State(ctx): State<Arc<ApiCtx<C>>>,
) -> Json<HostSnapshot> {
    Json(ctx.provisioner.host().snapshot().await)
}
