use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::errors::ApiError;
use crate::api::json::ApiJson;
use crate::api::guards::{CurrentStudent, CurrentTeacher, CurrentUser};
use crate::core::state::AppState;
use crate::schemas::grade::{
    AggregatedGradeResponse, GradeSettingsResponse, GradeSettingsUpdate, GradebookResponse,
};
use crate::services::gradebook;

pub(crate) async fn get_grade_settings(
    Path(class_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<GradeSettingsResponse>, ApiError> {
    let settings =
        gradebook::view_settings(state.grades(), state.ownership(), &user.id, &class_id).await?;
    Ok(Json(GradeSettingsResponse::from_db(settings)))
}

pub(crate) async fn update_grade_settings(
    Path(class_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<GradeSettingsUpdate>,
) -> Result<Json<GradeSettingsResponse>, ApiError> {
    let settings = gradebook::set_settings(
        state.grades(),
        state.ownership(),
        &teacher.id,
        &class_id,
        payload.weights(),
    )
    .await?;
    Ok(Json(GradeSettingsResponse::from_db(settings)))
}

pub(crate) async fn class_gradebook(
    Path(class_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<GradebookResponse>, ApiError> {
    let grades =
        gradebook::class_gradebook(state.grades(), state.ownership(), &teacher.id, &class_id)
            .await?;
    Ok(Json(GradebookResponse {
        class_id,
        students: grades.into_iter().map(AggregatedGradeResponse::from).collect(),
    }))
}

pub(crate) async fn student_grade(
    Path((class_id, student_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AggregatedGradeResponse>, ApiError> {
    let grade = gradebook::compute_overall_grade(
        state.grades(),
        state.ownership(),
        &user.id,
        &class_id,
        &student_id,
    )
    .await?;
    Ok(Json(grade.into()))
}

pub(crate) async fn my_grade(
    Path(class_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<AggregatedGradeResponse>, ApiError> {
    let grade = gradebook::compute_overall_grade(
        state.grades(),
        state.ownership(),
        &student.id,
        &class_id,
        &student.id,
    )
    .await?;
    Ok(Json(grade.into()))
}
