use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::json::ApiJson;
use crate::api::guards::{require_class_viewer, CurrentStudent, CurrentTeacher, CurrentUser};
use crate::api::materials::load_material;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::submission::{
    GradeRequest, MaterialSubmissionsQuery, MySubmissionsQuery, SubmissionResponse, SubmitRequest,
};
use crate::services::gradebook::{self, GradeInput, OwnedResource};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/mine", get(my_submissions))
        .route("/:submission_id", get(get_submission))
        .route("/:submission_id/grade", post(grade_submission))
}

/// Creates the student's submission or resubmits it while it is still ungraded.
pub(crate) async fn submit(
    Path(material_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SubmitRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let material = load_material(&state, &material_id).await?;
    let class = require_class_viewer(&state, &student, &material.class_id).await?;
    if class.is_archived {
        return Err(ApiError::BadRequest("Class is archived".to_string()));
    }

    let submission = repositories::submissions::submit(
        state.db(),
        repositories::submissions::SubmitWork {
            id: &Uuid::new_v4().to_string(),
            material_id: &material.id,
            student_id: &student.id,
            content: payload.content.as_deref(),
            max_score: material.max_score,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save submission"))?
    .ok_or_else(|| ApiError::Conflict("Submission has already been graded".to_string()))?;

    tracing::info!(
        student_id = %student.id,
        material_id = %material.id,
        submission_id = %submission.id,
        action = "submission.submit",
        "Submission received"
    );

    Ok(Json(SubmissionResponse::from_db(submission)))
}

pub(crate) async fn list_material_submissions(
    Path(material_id): Path<String>,
    Query(params): Query<MaterialSubmissionsQuery>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let material = load_material(&state, &material_id).await?;
    let access = state
        .ownership()
        .resolve_ownership(&teacher.id, OwnedResource::Material(&material.id))
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve material ownership"))?;
    if !access.is_allowed() {
        return Err(ApiError::Forbidden("Only the class teacher can view submissions"));
    }

    let submissions =
        repositories::submissions::list_by_material(state.db(), &material.id, params.status)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    Ok(Json(submissions.into_iter().map(SubmissionResponse::from_db).collect()))
}

async fn my_submissions(
    Query(params): Query<MySubmissionsQuery>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let submissions = repositories::submissions::list_by_student(
        state.db(),
        &student.id,
        params.class_id.as_deref(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    Ok(Json(submissions.into_iter().map(SubmissionResponse::from_db).collect()))
}

async fn get_submission(
    Path(submission_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let submission = repositories::submissions::find_by_id(state.db(), &submission_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch submission"))?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    if submission.student_id != user.id {
        let access = state
            .ownership()
            .resolve_ownership(&user.id, OwnedResource::Submission(&submission.id))
            .await
            .map_err(|e| ApiError::internal(e, "Failed to resolve submission ownership"))?;
        if !access.is_allowed() {
            return Err(ApiError::Forbidden("Not allowed to view this submission"));
        }
    }

    Ok(Json(SubmissionResponse::from_db(submission)))
}

async fn grade_submission(
    Path(submission_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<GradeRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let graded = gradebook::grade_submission(
        state.grades(),
        state.ownership(),
        &teacher.id,
        &submission_id,
        GradeInput {
            score: payload.score,
            max_score: payload.max_score,
            feedback: payload.feedback,
        },
    )
    .await?;

    Ok(Json(SubmissionResponse::from_db(graded)))
}
