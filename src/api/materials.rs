use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::json::ApiJson;
use crate::api::guards::{require_class_owner, require_class_viewer, CurrentTeacher, CurrentUser};
use crate::api::submissions;
use crate::core::state::AppState;
use crate::core::time::{parse_rfc3339_utc, primitive_now_utc};
use crate::db::models::Material;
use crate::repositories;
use crate::schemas::material::{MaterialCreate, MaterialListQuery, MaterialResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:material_id", get(get_material)).route(
        "/:material_id/submissions",
        get(submissions::list_material_submissions).post(submissions::submit),
    )
}

pub(crate) async fn load_material(state: &AppState, material_id: &str) -> Result<Material, ApiError> {
    repositories::materials::find_by_id(state.db(), material_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch material"))?
        .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))
}

pub(crate) async fn create_material(
    Path(class_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<MaterialCreate>,
) -> Result<(StatusCode, Json<MaterialResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let class = require_class_owner(&state, &teacher, &class_id).await?;
    if class.is_archived {
        return Err(ApiError::BadRequest("Class is archived".to_string()));
    }

    let due_at = match payload.due_at.as_deref() {
        Some(raw) => Some(parse_rfc3339_utc(raw).ok_or_else(|| {
            ApiError::BadRequest("due_at must be an RFC 3339 timestamp".to_string())
        })?),
        None => None,
    };

    let material = repositories::materials::create(
        state.db(),
        repositories::materials::CreateMaterial {
            id: &Uuid::new_v4().to_string(),
            class_id: &class.id,
            material_type: payload.material_type,
            title: payload.title.trim(),
            description: payload.description.as_deref(),
            max_score: payload.max_score,
            due_at,
            created_by: &teacher.id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create material"))?;

    tracing::info!(
        teacher_id = %teacher.id,
        class_id = %class.id,
        material_id = %material.id,
        material_type = ?material.material_type,
        action = "material.create",
        "Material created"
    );

    Ok((StatusCode::CREATED, Json(MaterialResponse::from_db(material))))
}

pub(crate) async fn list_materials(
    Path(class_id): Path<String>,
    Query(params): Query<MaterialListQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<MaterialResponse>>, ApiError> {
    require_class_viewer(&state, &user, &class_id).await?;

    let materials =
        repositories::materials::list_by_class(state.db(), &class_id, params.material_type)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list materials"))?;

    Ok(Json(materials.into_iter().map(MaterialResponse::from_db).collect()))
}

async fn get_material(
    Path(material_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MaterialResponse>, ApiError> {
    let material = load_material(&state, &material_id).await?;
    require_class_viewer(&state, &user, &material.class_id).await?;
    Ok(Json(MaterialResponse::from_db(material)))
}
