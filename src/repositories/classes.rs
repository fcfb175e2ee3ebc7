use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Class;

pub(crate) const COLUMNS: &str =
    "id, name, description, teacher_id, is_archived, archived_at, created_at, updated_at";

pub(crate) struct CreateClass<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) teacher_id: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateClass<'_>) -> Result<Class, sqlx::Error> {
    sqlx::query_as::<_, Class>(&format!(
        "INSERT INTO classes (
            id, name, description, teacher_id, is_archived, archived_at, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,FALSE,NULL,$5,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.teacher_id)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, class_id: &str) -> Result<Option<Class>, sqlx::Error> {
    sqlx::query_as::<_, Class>(&format!("SELECT {COLUMNS} FROM classes WHERE id = $1"))
        .bind(class_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_owner_id(
    pool: &PgPool,
    class_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT teacher_id FROM classes WHERE id = $1")
        .bind(class_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_all(
    pool: &PgPool,
    include_archived: bool,
) -> Result<Vec<Class>, sqlx::Error> {
    sqlx::query_as::<_, Class>(&format!(
        "SELECT {COLUMNS}
         FROM classes
         WHERE ($1 OR NOT is_archived)
         ORDER BY created_at DESC"
    ))
    .bind(include_archived)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_teacher(
    pool: &PgPool,
    teacher_id: &str,
    include_archived: bool,
) -> Result<Vec<Class>, sqlx::Error> {
    sqlx::query_as::<_, Class>(&format!(
        "SELECT {COLUMNS}
         FROM classes
         WHERE teacher_id = $1 AND ($2 OR NOT is_archived)
         ORDER BY created_at DESC"
    ))
    .bind(teacher_id)
    .bind(include_archived)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
    include_archived: bool,
) -> Result<Vec<Class>, sqlx::Error> {
    sqlx::query_as::<_, Class>(
        "SELECT c.id, c.name, c.description, c.teacher_id, c.is_archived, c.archived_at,
                c.created_at, c.updated_at
         FROM classes c
         JOIN class_enrollments e ON e.class_id = c.id
         WHERE e.student_id = $1 AND ($2 OR NOT c.is_archived)
         ORDER BY c.created_at DESC",
    )
    .bind(student_id)
    .bind(include_archived)
    .fetch_all(pool)
    .await
}

/// Archiving is reversible; `archived_at` is cleared on restore.
pub(crate) async fn set_archived(
    pool: &PgPool,
    class_id: &str,
    archived: bool,
    now: PrimitiveDateTime,
) -> Result<Option<Class>, sqlx::Error> {
    sqlx::query_as::<_, Class>(&format!(
        "UPDATE classes
         SET is_archived = $1,
             archived_at = CASE WHEN $1 THEN $2 ELSE NULL END,
             updated_at = $2
         WHERE id = $3
         RETURNING {COLUMNS}"
    ))
    .bind(archived)
    .bind(now)
    .bind(class_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_owner_of_material(
    pool: &PgPool,
    material_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT c.teacher_id
         FROM materials m
         JOIN classes c ON c.id = m.class_id
         WHERE m.id = $1",
    )
    .bind(material_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_owner_of_submission(
    pool: &PgPool,
    submission_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT c.teacher_id
         FROM submissions s
         JOIN materials m ON m.id = s.material_id
         JOIN classes c ON c.id = m.class_id
         WHERE s.id = $1",
    )
    .bind(submission_id)
    .fetch_optional(pool)
    .await
}
