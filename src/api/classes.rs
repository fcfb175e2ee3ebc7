use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::api::audit;
use crate::api::errors::ApiError;
use crate::api::json::ApiJson;
use crate::api::grades;
use crate::api::guards::{require_class_manager, require_class_viewer, CurrentUser};
use crate::api::materials;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::class::{
    ClassCreate, ClassListQuery, ClassResponse, EnrollRequest, EnrolledStudentResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_classes).post(create_class))
        .route("/:class_id", get(get_class))
        .route("/:class_id/archive", post(archive_class))
        .route("/:class_id/restore", post(restore_class))
        .route("/:class_id/students", get(list_students).post(enroll_student))
        .route(
            "/:class_id/materials",
            get(materials::list_materials).post(materials::create_material),
        )
        .route(
            "/:class_id/grade-settings",
            get(grades::get_grade_settings).put(grades::update_grade_settings),
        )
        .route("/:class_id/gradebook", get(grades::class_gradebook))
        .route("/:class_id/students/:student_id/grade", get(grades::student_grade))
        .route("/:class_id/my-grade", get(grades::my_grade))
}

async fn create_class(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ClassCreate>,
) -> Result<(StatusCode, Json<ClassResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let teacher_id = match user.role {
        UserRole::Teacher => match payload.teacher_id.as_deref() {
            Some(requested) if requested != user.id => {
                return Err(ApiError::Forbidden("Teachers can only create their own classes"));
            }
            _ => user.id.clone(),
        },
        UserRole::Admin => {
            let Some(teacher_id) = payload.teacher_id.clone() else {
                return Err(ApiError::BadRequest("teacher_id is required".to_string()));
            };
            let teacher = repositories::users::find_by_id(state.db(), &teacher_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to fetch teacher"))?;
            if !matches!(teacher, Some(ref t) if t.role == UserRole::Teacher && t.is_active) {
                return Err(ApiError::BadRequest("teacher_id must be an active teacher".to_string()));
            }
            teacher_id
        }
        UserRole::Student => return Err(ApiError::Forbidden("Students cannot create classes")),
    };

    let class = repositories::classes::create(
        state.db(),
        repositories::classes::CreateClass {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            description: payload.description.as_deref(),
            teacher_id: &teacher_id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create class"))?;

    audit::record(
        &state,
        &user.id,
        "class.create",
        "class",
        &class.id,
        json!({ "name": class.name, "teacher_id": class.teacher_id }),
    )
    .await;

    tracing::info!(
        actor_id = %user.id,
        class_id = %class.id,
        teacher_id = %class.teacher_id,
        action = "class.create",
        "Class created"
    );

    Ok((StatusCode::CREATED, Json(ClassResponse::from_db(class))))
}

async fn list_classes(
    Query(params): Query<ClassListQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassResponse>>, ApiError> {
    let classes = match user.role {
        UserRole::Admin => {
            repositories::classes::list_all(state.db(), params.include_archived).await
        }
        UserRole::Teacher => {
            repositories::classes::list_for_teacher(state.db(), &user.id, params.include_archived)
                .await
        }
        UserRole::Student => {
            repositories::classes::list_for_student(state.db(), &user.id, params.include_archived)
                .await
        }
    }
    .map_err(|e| ApiError::internal(e, "Failed to list classes"))?;

    Ok(Json(classes.into_iter().map(ClassResponse::from_db).collect()))
}

async fn get_class(
    Path(class_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ClassResponse>, ApiError> {
    let class = require_class_viewer(&state, &user, &class_id).await?;
    Ok(Json(ClassResponse::from_db(class)))
}

async fn archive_class(
    path: Path<String>,
    user: CurrentUser,
    state: State<AppState>,
) -> Result<Json<ClassResponse>, ApiError> {
    set_archived(path, user, state, true).await
}

async fn restore_class(
    path: Path<String>,
    user: CurrentUser,
    state: State<AppState>,
) -> Result<Json<ClassResponse>, ApiError> {
    set_archived(path, user, state, false).await
}

async fn set_archived(
    Path(class_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    archived: bool,
) -> Result<Json<ClassResponse>, ApiError> {
    require_class_manager(&state, &user, &class_id).await?;

    let class =
        repositories::classes::set_archived(state.db(), &class_id, archived, primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update class"))?
            .ok_or_else(|| ApiError::NotFound("Class not found".to_string()))?;

    let action = if archived { "class.archive" } else { "class.restore" };
    audit::record(&state, &user.id, action, "class", &class.id, json!({})).await;

    tracing::info!(actor_id = %user.id, class_id = %class.id, action, "Class archive state changed");

    Ok(Json(ClassResponse::from_db(class)))
}

async fn enroll_student(
    Path(class_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<EnrollRequest>,
) -> Result<(StatusCode, Json<EnrolledStudentResponse>), ApiError> {
    let class = require_class_manager(&state, &user, &class_id).await?;
    if class.is_archived {
        return Err(ApiError::BadRequest("Class is archived".to_string()));
    }

    let student = repositories::users::find_by_id(state.db(), &payload.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student"))?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;
    if student.role != UserRole::Student {
        return Err(ApiError::BadRequest("Only students can be enrolled".to_string()));
    }

    let now = primitive_now_utc();
    let inserted = repositories::enrollments::enroll(state.db(), &class.id, &student.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to enroll student"))?;
    if !inserted {
        return Err(ApiError::Conflict("Student is already enrolled".to_string()));
    }

    audit::record(
        &state,
        &user.id,
        "class.enroll",
        "class",
        &class.id,
        json!({ "student_id": student.id }),
    )
    .await;

    tracing::info!(
        actor_id = %user.id,
        class_id = %class.id,
        student_id = %student.id,
        action = "class.enroll",
        "Student enrolled"
    );

    Ok((
        StatusCode::CREATED,
        Json(EnrolledStudentResponse {
            student_id: student.id,
            username: student.username,
            full_name: student.full_name,
            enrolled_at: crate::core::time::format_primitive(now),
        }),
    ))
}

async fn list_students(
    Path(class_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrolledStudentResponse>>, ApiError> {
    require_class_manager(&state, &user, &class_id).await?;

    let students = repositories::enrollments::list_students(state.db(), &class_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;

    Ok(Json(students.into_iter().map(EnrolledStudentResponse::from_db).collect()))
}
