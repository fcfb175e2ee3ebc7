use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Class;
use crate::repositories::enrollments::EnrolledStudent;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ClassCreate {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    /// Required when an admin creates the class on behalf of a teacher.
    #[serde(default)]
    #[serde(alias = "teacherId")]
    pub(crate) teacher_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ClassListQuery {
    #[serde(default)]
    #[serde(alias = "includeArchived")]
    pub(crate) include_archived: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollRequest {
    #[serde(alias = "studentId")]
    pub(crate) student_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClassResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) teacher_id: String,
    pub(crate) is_archived: bool,
    pub(crate) archived_at: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ClassResponse {
    pub(crate) fn from_db(class: Class) -> Self {
        Self {
            id: class.id,
            name: class.name,
            description: class.description,
            teacher_id: class.teacher_id,
            is_archived: class.is_archived,
            archived_at: class.archived_at.map(format_primitive),
            created_at: format_primitive(class.created_at),
            updated_at: format_primitive(class.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrolledStudentResponse {
    pub(crate) student_id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) enrolled_at: String,
}

impl EnrolledStudentResponse {
    pub(crate) fn from_db(student: EnrolledStudent) -> Self {
        Self {
            student_id: student.student_id,
            username: student.username,
            full_name: student.full_name,
            enrolled_at: format_primitive(student.enrolled_at),
        }
    }
}
