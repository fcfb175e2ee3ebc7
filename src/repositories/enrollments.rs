use sqlx::PgPool;
use time::PrimitiveDateTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct EnrolledStudent {
    pub(crate) student_id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) enrolled_at: PrimitiveDateTime,
}

/// Returns `false` when the student was already enrolled.
pub(crate) async fn enroll(
    pool: &PgPool,
    class_id: &str,
    student_id: &str,
    enrolled_at: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query(
        "INSERT INTO class_enrollments (class_id, student_id, enrolled_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (class_id, student_id) DO NOTHING",
    )
    .bind(class_id)
    .bind(student_id)
    .bind(enrolled_at)
    .execute(pool)
    .await?;

    Ok(inserted.rows_affected() > 0)
}

pub(crate) async fn is_enrolled(
    pool: &PgPool,
    class_id: &str,
    student_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
            SELECT 1 FROM class_enrollments WHERE class_id = $1 AND student_id = $2
         )",
    )
    .bind(class_id)
    .bind(student_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_students(
    pool: &PgPool,
    class_id: &str,
) -> Result<Vec<EnrolledStudent>, sqlx::Error> {
    sqlx::query_as::<_, EnrolledStudent>(
        "SELECT u.id AS student_id, u.username, u.full_name, e.enrolled_at
         FROM class_enrollments e
         JOIN users u ON u.id = e.student_id
         WHERE e.class_id = $1
         ORDER BY u.full_name, u.username",
    )
    .bind(class_id)
    .fetch_all(pool)
    .await
}
