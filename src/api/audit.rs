use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::PaginatedResponse;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::audit::{AuditLogQuery, AuditLogResponse};
use crate::services::gradebook::{self, AuditEntry};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_audit_logs))
}

async fn list_audit_logs(
    Query(params): Query<AuditLogQuery>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<PaginatedResponse<AuditLogResponse>>, ApiError> {
    let skip = params.skip.max(0);
    let limit = params.limit.clamp(1, 500);
    let (entries, total_count) = repositories::audit_logs::list(
        state.db(),
        repositories::audit_logs::ListAudit {
            actor_id: params.actor_id,
            entity_type: params.entity_type,
            entity_id: params.entity_id,
            skip,
            limit,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list audit logs"))?;

    Ok(Json(PaginatedResponse {
        items: entries.into_iter().map(AuditLogResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

/// Appends an audit entry for an already committed change; failures are logged only.
pub(crate) async fn record(
    state: &AppState,
    actor_id: &str,
    action: &'static str,
    entity_type: &'static str,
    entity_id: &str,
    details: serde_json::Value,
) {
    gradebook::record_audit(
        state.grades(),
        AuditEntry {
            actor_id: actor_id.to_string(),
            action,
            entity_type,
            entity_id: entity_id.to_string(),
            details,
            created_at: primitive_now_utc(),
        },
    )
    .await;
}
