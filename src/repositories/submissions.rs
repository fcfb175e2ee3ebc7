use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{GradedScore, Submission};
use crate::db::types::SubmissionStatus;

pub(crate) const COLUMNS: &str = "\
    id, material_id, student_id, content, score, max_score, is_graded, status, feedback, \
    submitted_at, graded_at, graded_by, created_at, updated_at";

pub(crate) async fn find_by_id(
    pool: &PgPool,
    submission_id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!("SELECT {COLUMNS} FROM submissions WHERE id = $1"))
        .bind(submission_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_for_material_student(
    pool: &PgPool,
    material_id: &str,
    student_id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE material_id = $1 AND student_id = $2"
    ))
    .bind(material_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct SubmitWork<'a> {
    pub(crate) id: &'a str,
    pub(crate) material_id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) content: Option<&'a str>,
    pub(crate) max_score: f64,
    pub(crate) now: PrimitiveDateTime,
}

/// Inserts or resubmits the student's work. Returns `None` when the existing
/// submission is already graded, since status never moves backwards.
pub(crate) async fn submit(
    pool: &PgPool,
    params: SubmitWork<'_>,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (
            id, material_id, student_id, content, score, max_score, is_graded, status,
            feedback, submitted_at, graded_at, graded_by, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,NULL,$5,FALSE,$6,NULL,$7,NULL,NULL,$7,$7)
         ON CONFLICT (material_id, student_id) DO UPDATE
         SET content = EXCLUDED.content,
             status = EXCLUDED.status,
             submitted_at = EXCLUDED.submitted_at,
             updated_at = EXCLUDED.updated_at
         WHERE submissions.status <> $8
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.material_id)
    .bind(params.student_id)
    .bind(params.content)
    .bind(params.max_score)
    .bind(SubmissionStatus::Submitted)
    .bind(params.now)
    .bind(SubmissionStatus::Graded)
    .fetch_optional(pool)
    .await
}

pub(crate) struct RecordGrade<'a> {
    pub(crate) score: f64,
    pub(crate) max_score: Option<f64>,
    pub(crate) feedback: Option<&'a str>,
    pub(crate) graded_by: &'a str,
    pub(crate) graded_at: PrimitiveDateTime,
}

/// Single-row atomic update; `max_score` is kept unless a new one is supplied.
pub(crate) async fn record_grade(
    pool: &PgPool,
    submission_id: &str,
    params: RecordGrade<'_>,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "UPDATE submissions
         SET score = $1,
             max_score = COALESCE($2, max_score),
             feedback = COALESCE($3, feedback),
             is_graded = TRUE,
             status = $4,
             graded_at = $5,
             graded_by = $6,
             updated_at = $5
         WHERE id = $7
         RETURNING {COLUMNS}"
    ))
    .bind(params.score)
    .bind(params.max_score)
    .bind(params.feedback)
    .bind(SubmissionStatus::Graded)
    .bind(params.graded_at)
    .bind(params.graded_by)
    .bind(submission_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_by_material(
    pool: &PgPool,
    material_id: &str,
    status: Option<SubmissionStatus>,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS}
         FROM submissions
         WHERE material_id = $1 AND ($2::submissionstatus IS NULL OR status = $2)
         ORDER BY submitted_at NULLS LAST, created_at"
    ))
    .bind(material_id)
    .bind(status)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_student(
    pool: &PgPool,
    student_id: &str,
    class_id: Option<&str>,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        "SELECT s.id, s.material_id, s.student_id, s.content, s.score, s.max_score,
                s.is_graded, s.status, s.feedback, s.submitted_at, s.graded_at, s.graded_by,
                s.created_at, s.updated_at
         FROM submissions s
         JOIN materials m ON m.id = s.material_id
         WHERE s.student_id = $1 AND ($2::text IS NULL OR m.class_id = $2)
         ORDER BY s.created_at DESC",
    )
    .bind(student_id)
    .bind(class_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_graded_scores(
    pool: &PgPool,
    class_id: &str,
    student_id: Option<&str>,
) -> Result<Vec<GradedScore>, sqlx::Error> {
    sqlx::query_as::<_, GradedScore>(
        "SELECT s.student_id, m.material_type, s.score, s.max_score
         FROM submissions s
         JOIN materials m ON m.id = s.material_id
         WHERE m.class_id = $1
           AND ($2::text IS NULL OR s.student_id = $2)
           AND s.is_graded
           AND s.score IS NOT NULL",
    )
    .bind(class_id)
    .bind(student_id)
    .fetch_all(pool)
    .await
}
