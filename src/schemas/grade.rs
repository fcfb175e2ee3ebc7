use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::ClassGradeSettings;
use crate::services::gradebook::{AggregatedGrade, Weights};

#[derive(Debug, Deserialize)]
pub(crate) struct GradeSettingsUpdate {
    #[serde(alias = "quizWeight")]
    pub(crate) quiz_weight: i32,
    #[serde(alias = "assignmentWeight")]
    pub(crate) assignment_weight: i32,
    #[serde(alias = "examWeight")]
    pub(crate) exam_weight: i32,
}

impl GradeSettingsUpdate {
    pub(crate) fn weights(&self) -> Weights {
        Weights {
            quiz: self.quiz_weight,
            assignment: self.assignment_weight,
            exam: self.exam_weight,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GradeSettingsResponse {
    pub(crate) class_id: String,
    pub(crate) quiz_weight: i32,
    pub(crate) assignment_weight: i32,
    pub(crate) exam_weight: i32,
    pub(crate) updated_by: Option<String>,
    pub(crate) updated_at: String,
}

impl GradeSettingsResponse {
    pub(crate) fn from_db(settings: ClassGradeSettings) -> Self {
        Self {
            class_id: settings.class_id,
            quiz_weight: settings.quiz_weight,
            assignment_weight: settings.assignment_weight,
            exam_weight: settings.exam_weight,
            updated_by: settings.updated_by,
            updated_at: format_primitive(settings.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AggregatedGradeResponse {
    pub(crate) student_id: String,
    pub(crate) class_id: String,
    pub(crate) quiz_average: Option<f64>,
    pub(crate) assignment_average: Option<f64>,
    pub(crate) exam_average: Option<f64>,
    pub(crate) overall: Option<f64>,
    pub(crate) graded_count: usize,
    pub(crate) weights: Weights,
}

impl From<AggregatedGrade> for AggregatedGradeResponse {
    fn from(grade: AggregatedGrade) -> Self {
        Self {
            student_id: grade.student_id,
            class_id: grade.class_id,
            quiz_average: grade.quiz_average,
            assignment_average: grade.assignment_average,
            exam_average: grade.exam_average,
            overall: grade.overall,
            graded_count: grade.graded_count,
            weights: grade.weights,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GradebookResponse {
    pub(crate) class_id: String,
    pub(crate) students: Vec<AggregatedGradeResponse>,
}
