use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Submission;
use crate::db::types::SubmissionStatus;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    #[validate(length(max = 20000, message = "content is too long"))]
    pub(crate) content: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GradeRequest {
    pub(crate) score: f64,
    #[serde(default)]
    #[serde(alias = "maxScore")]
    pub(crate) max_score: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 5000, message = "feedback is too long"))]
    pub(crate) feedback: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MaterialSubmissionsQuery {
    #[serde(default)]
    pub(crate) status: Option<SubmissionStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MySubmissionsQuery {
    #[serde(default)]
    #[serde(alias = "classId")]
    pub(crate) class_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) material_id: String,
    pub(crate) student_id: String,
    pub(crate) content: Option<String>,
    pub(crate) score: Option<f64>,
    pub(crate) max_score: f64,
    pub(crate) is_graded: bool,
    pub(crate) status: SubmissionStatus,
    pub(crate) feedback: Option<String>,
    pub(crate) submitted_at: Option<String>,
    pub(crate) graded_at: Option<String>,
    pub(crate) graded_by: Option<String>,
}

impl SubmissionResponse {
    pub(crate) fn from_db(submission: Submission) -> Self {
        Self {
            id: submission.id,
            material_id: submission.material_id,
            student_id: submission.student_id,
            content: submission.content,
            score: submission.score,
            max_score: submission.max_score,
            is_graded: submission.is_graded,
            status: submission.status,
            feedback: submission.feedback,
            submitted_at: submission.submitted_at.map(format_primitive),
            graded_at: submission.graded_at.map(format_primitive),
            graded_by: submission.graded_by,
        }
    }
}
