use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::ClassGradeSettings;

const COLUMNS: &str = "class_id, quiz_weight, assignment_weight, exam_weight, updated_by, updated_at";

pub(crate) struct WeightsRow {
    pub(crate) quiz_weight: i32,
    pub(crate) assignment_weight: i32,
    pub(crate) exam_weight: i32,
}

pub(crate) async fn find_by_class(
    pool: &PgPool,
    class_id: &str,
) -> Result<Option<ClassGradeSettings>, sqlx::Error> {
    sqlx::query_as::<_, ClassGradeSettings>(&format!(
        "SELECT {COLUMNS} FROM class_grade_settings WHERE class_id = $1"
    ))
    .bind(class_id)
    .fetch_optional(pool)
    .await
}

/// Inserts the defaults unless a row already exists, then returns whatever is stored.
pub(crate) async fn insert_default(
    pool: &PgPool,
    class_id: &str,
    defaults: WeightsRow,
    now: PrimitiveDateTime,
) -> Result<ClassGradeSettings, sqlx::Error> {
    sqlx::query(
        "INSERT INTO class_grade_settings (
            class_id, quiz_weight, assignment_weight, exam_weight, updated_by, updated_at
         ) VALUES ($1,$2,$3,$4,NULL,$5)
         ON CONFLICT (class_id) DO NOTHING",
    )
    .bind(class_id)
    .bind(defaults.quiz_weight)
    .bind(defaults.assignment_weight)
    .bind(defaults.exam_weight)
    .bind(now)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, ClassGradeSettings>(&format!(
        "SELECT {COLUMNS} FROM class_grade_settings WHERE class_id = $1"
    ))
    .bind(class_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn upsert(
    pool: &PgPool,
    class_id: &str,
    weights: WeightsRow,
    updated_by: &str,
    now: PrimitiveDateTime,
) -> Result<ClassGradeSettings, sqlx::Error> {
    sqlx::query_as::<_, ClassGradeSettings>(&format!(
        "INSERT INTO class_grade_settings (
            class_id, quiz_weight, assignment_weight, exam_weight, updated_by, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6)
         ON CONFLICT (class_id)
         DO UPDATE SET quiz_weight = EXCLUDED.quiz_weight,
                       assignment_weight = EXCLUDED.assignment_weight,
                       exam_weight = EXCLUDED.exam_weight,
                       updated_by = EXCLUDED.updated_by,
                       updated_at = EXCLUDED.updated_at
         RETURNING {COLUMNS}"
    ))
    .bind(class_id)
    .bind(weights.quiz_weight)
    .bind(weights.assignment_weight)
    .bind(weights.exam_weight)
    .bind(updated_by)
    .bind(now)
    .fetch_one(pool)
    .await
}
