use async_trait::async_trait;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{ClassGradeSettings, GradedScore, Material, Submission};
use crate::repositories;

use super::weights::Weights;

pub(crate) struct GradeUpdate<'a> {
    pub(crate) score: f64,
    pub(crate) max_score: Option<f64>,
    pub(crate) feedback: Option<&'a str>,
    pub(crate) graded_by: &'a str,
    pub(crate) graded_at: PrimitiveDateTime,
}

#[derive(Debug, Clone)]
pub(crate) struct AuditEntry {
    pub(crate) actor_id: String,
    pub(crate) action: &'static str,
    pub(crate) entity_type: &'static str,
    pub(crate) entity_id: String,
    pub(crate) details: serde_json::Value,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Persistence used by the gradebook operations.
#[async_trait]
pub(crate) trait GradeStore: Send + Sync {
    async fn class_exists(&self, class_id: &str) -> Result<bool, sqlx::Error>;

    async fn is_enrolled(&self, class_id: &str, student_id: &str) -> Result<bool, sqlx::Error>;

    async fn enrolled_student_ids(&self, class_id: &str) -> Result<Vec<String>, sqlx::Error>;

    async fn find_settings(&self, class_id: &str)
        -> Result<Option<ClassGradeSettings>, sqlx::Error>;

    async fn insert_default_settings(
        &self,
        class_id: &str,
        defaults: Weights,
        now: PrimitiveDateTime,
    ) -> Result<ClassGradeSettings, sqlx::Error>;

    async fn upsert_settings(
        &self,
        class_id: &str,
        weights: Weights,
        updated_by: &str,
        now: PrimitiveDateTime,
    ) -> Result<ClassGradeSettings, sqlx::Error>;

    async fn find_submission(&self, submission_id: &str)
        -> Result<Option<Submission>, sqlx::Error>;

    async fn find_material(&self, material_id: &str) -> Result<Option<Material>, sqlx::Error>;

    async fn record_grade(
        &self,
        submission_id: &str,
        update: GradeUpdate<'_>,
    ) -> Result<Option<Submission>, sqlx::Error>;

    async fn graded_scores(
        &self,
        class_id: &str,
        student_id: Option<&str>,
    ) -> Result<Vec<GradedScore>, sqlx::Error>;

    async fn append_audit(&self, entry: AuditEntry) -> Result<(), sqlx::Error>;
}

#[derive(Clone)]
pub(crate) struct PgGradeStore {
    pool: PgPool,
}

impl PgGradeStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn weights_row(weights: Weights) -> repositories::grade_settings::WeightsRow {
    repositories::grade_settings::WeightsRow {
        quiz_weight: weights.quiz,
        assignment_weight: weights.assignment,
        exam_weight: weights.exam,
    }
}

#[async_trait]
impl GradeStore for PgGradeStore {
    async fn class_exists(&self, class_id: &str) -> Result<bool, sqlx::Error> {
        Ok(repositories::classes::find_owner_id(&self.pool, class_id).await?.is_some())
    }

    async fn is_enrolled(&self, class_id: &str, student_id: &str) -> Result<bool, sqlx::Error> {
        repositories::enrollments::is_enrolled(&self.pool, class_id, student_id).await
    }

    async fn enrolled_student_ids(&self, class_id: &str) -> Result<Vec<String>, sqlx::Error> {
        let students = repositories::enrollments::list_students(&self.pool, class_id).await?;
        Ok(students.into_iter().map(|student| student.student_id).collect())
    }

    async fn find_settings(
        &self,
        class_id: &str,
    ) -> Result<Option<ClassGradeSettings>, sqlx::Error> {
        repositories::grade_settings::find_by_class(&self.pool, class_id).await
    }

    async fn insert_default_settings(
        &self,
        class_id: &str,
        defaults: Weights,
        now: PrimitiveDateTime,
    ) -> Result<ClassGradeSettings, sqlx::Error> {
        repositories::grade_settings::insert_default(&self.pool, class_id, weights_row(defaults), now)
            .await
    }

    async fn upsert_settings(
        &self,
        class_id: &str,
        weights: Weights,
        updated_by: &str,
        now: PrimitiveDateTime,
    ) -> Result<ClassGradeSettings, sqlx::Error> {
        repositories::grade_settings::upsert(
            &self.pool,
            class_id,
            weights_row(weights),
            updated_by,
            now,
        )
        .await
    }

    async fn find_submission(
        &self,
        submission_id: &str,
    ) -> Result<Option<Submission>, sqlx::Error> {
        repositories::submissions::find_by_id(&self.pool, submission_id).await
    }

    async fn find_material(&self, material_id: &str) -> Result<Option<Material>, sqlx::Error> {
        repositories::materials::find_by_id(&self.pool, material_id).await
    }

    async fn record_grade(
        &self,
        submission_id: &str,
        update: GradeUpdate<'_>,
    ) -> Result<Option<Submission>, sqlx::Error> {
        repositories::submissions::record_grade(
            &self.pool,
            submission_id,
            repositories::submissions::RecordGrade {
                score: update.score,
                max_score: update.max_score,
                feedback: update.feedback,
                graded_by: update.graded_by,
                graded_at: update.graded_at,
            },
        )
        .await
    }

    async fn graded_scores(
        &self,
        class_id: &str,
        student_id: Option<&str>,
    ) -> Result<Vec<GradedScore>, sqlx::Error> {
        repositories::submissions::list_graded_scores(&self.pool, class_id, student_id).await
    }

    async fn append_audit(&self, entry: AuditEntry) -> Result<(), sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        repositories::audit_logs::append(
            &self.pool,
            repositories::audit_logs::AppendAudit {
                id: &id,
                actor_id: &entry.actor_id,
                action: entry.action,
                entity_type: entry.entity_type,
                entity_id: &entry.entity_id,
                details: entry.details,
                created_at: entry.created_at,
            },
        )
        .await
    }
}
