use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{MaterialType, SubmissionStatus, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Class {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) teacher_id: String,
    pub(crate) is_archived: bool,
    pub(crate) archived_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub(crate) struct ClassGradeSettings {
    pub(crate) class_id: String,
    pub(crate) quiz_weight: i32,
    pub(crate) assignment_weight: i32,
    pub(crate) exam_weight: i32,
    pub(crate) updated_by: Option<String>,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Material {
    pub(crate) id: String,
    pub(crate) class_id: String,
    pub(crate) material_type: MaterialType,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) max_score: f64,
    pub(crate) due_at: Option<PrimitiveDateTime>,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Submission {
    pub(crate) id: String,
    pub(crate) material_id: String,
    pub(crate) student_id: String,
    pub(crate) content: Option<String>,
    pub(crate) score: Option<f64>,
    pub(crate) max_score: f64,
    pub(crate) is_graded: bool,
    pub(crate) status: SubmissionStatus,
    pub(crate) feedback: Option<String>,
    pub(crate) submitted_at: Option<PrimitiveDateTime>,
    pub(crate) graded_at: Option<PrimitiveDateTime>,
    pub(crate) graded_by: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AuditLog {
    pub(crate) id: String,
    pub(crate) actor_id: String,
    pub(crate) action: String,
    pub(crate) entity_type: String,
    pub(crate) entity_id: String,
    pub(crate) details: Json<serde_json::Value>,
    pub(crate) created_at: PrimitiveDateTime,
}

/// One graded submission reduced to what the aggregator needs.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub(crate) struct GradedScore {
    pub(crate) student_id: String,
    pub(crate) material_type: MaterialType,
    pub(crate) score: f64,
    pub(crate) max_score: f64,
}
