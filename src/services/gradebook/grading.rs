use serde_json::json;

use crate::core::{metrics, time::primitive_now_utc};
use crate::db::models::Submission;
use crate::db::types::SubmissionStatus;

use super::error::GradebookError;
use super::ownership::{OwnedResource, OwnershipResolver};
use super::record_audit;
use super::store::{AuditEntry, GradeStore, GradeUpdate};

#[derive(Debug, Clone, Default)]
pub(crate) struct GradeInput {
    pub(crate) score: f64,
    pub(crate) max_score: Option<f64>,
    pub(crate) feedback: Option<String>,
}

fn validate_inputs(input: &GradeInput) -> Result<(), GradebookError> {
    if !input.score.is_finite() || input.score < 0.0 {
        return Err(GradebookError::InvalidScore(
            "Score must be a non-negative number".to_string(),
        ));
    }
    if let Some(max_score) = input.max_score {
        if !max_score.is_finite() || max_score <= 0.0 {
            return Err(GradebookError::InvalidScore(
                "Max score must be greater than zero".to_string(),
            ));
        }
    }
    Ok(())
}

/// Grades (or regrades) a submission on behalf of the teacher who owns its class.
pub(crate) async fn grade_submission(
    store: &dyn GradeStore,
    ownership: &dyn OwnershipResolver,
    teacher_id: &str,
    submission_id: &str,
    input: GradeInput,
) -> Result<Submission, GradebookError> {
    validate_inputs(&input)?;

    let submission = store
        .find_submission(submission_id)
        .await?
        .ok_or(GradebookError::NotFound("Submission"))?;

    let access = ownership
        .resolve_ownership(teacher_id, OwnedResource::Submission(submission_id))
        .await?;
    if !access.is_allowed() {
        return Err(GradebookError::Forbidden("Not allowed to grade this submission"));
    }

    let effective_max = input.max_score.unwrap_or(submission.max_score);
    if input.score > effective_max {
        return Err(GradebookError::InvalidScore(format!(
            "Score {} exceeds max score {}",
            input.score, effective_max
        )));
    }
    debug_assert!(submission.status.can_transition_to(SubmissionStatus::Graded));

    let regrade = submission.is_graded;
    let now = primitive_now_utc();
    let graded = store
        .record_grade(
            submission_id,
            GradeUpdate {
                score: input.score,
                max_score: input.max_score,
                feedback: input.feedback.as_deref(),
                graded_by: teacher_id,
                graded_at: now,
            },
        )
        .await?
        .ok_or(GradebookError::NotFound("Submission"))?;

    record_audit(
        store,
        AuditEntry {
            actor_id: teacher_id.to_string(),
            action: "submission.grade",
            entity_type: "submission",
            entity_id: submission_id.to_string(),
            details: json!({
                "student_id": graded.student_id,
                "material_id": graded.material_id,
                "score": graded.score,
                "max_score": graded.max_score,
                "regrade": regrade,
            }),
            created_at: now,
        },
    )
    .await;

    match store.find_material(&graded.material_id).await {
        Ok(Some(material)) => metrics::record_grade(material.material_type, regrade),
        Ok(None) => {}
        Err(error) => tracing::warn!(error = %error, "Failed to load material for grade metrics"),
    }

    tracing::info!(
        teacher_id = %teacher_id,
        submission_id = %submission_id,
        student_id = %graded.student_id,
        score = input.score,
        max_score = graded.max_score,
        regrade,
        action = "submission.grade",
        "Graded submission"
    );

    Ok(graded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::MaterialType;
    use crate::services::gradebook::memory::MemoryGradeStore;

    fn graded_store() -> MemoryGradeStore {
        let store = MemoryGradeStore::new();
        store.add_class("class-1", "teacher-1");
        store.add_class("class-2", "teacher-2");
        store.enroll("class-1", "student-1");
        store.add_material("quiz-1", "class-1", MaterialType::Quiz, 100.0);
        store.add_submission("sub-1", "quiz-1", "student-1", SubmissionStatus::Submitted);
        store
    }

    fn input(score: f64) -> GradeInput {
        GradeInput { score, ..GradeInput::default() }
    }

    #[tokio::test]
    async fn grading_marks_submission_graded() {
        let store = graded_store();

        let graded = grade_submission(&store, &store, "teacher-1", "sub-1", input(85.0))
            .await
            .expect("graded");
        assert!(graded.is_graded);
        assert_eq!(graded.status, SubmissionStatus::Graded);
        assert_eq!(graded.graded_by.as_deref(), Some("teacher-1"));
        assert!(graded.graded_at.is_some());

        let reread = store.submission("sub-1").expect("stored");
        assert_eq!(reread.score, Some(85.0));
        assert_eq!(reread.max_score, 100.0);
        assert_eq!(reread.status, SubmissionStatus::Graded);
    }

    #[tokio::test]
    async fn negative_score_is_rejected() {
        let store = graded_store();
        let err = grade_submission(&store, &store, "teacher-1", "sub-1", input(-1.0))
            .await
            .expect_err("invalid");
        assert!(matches!(err, GradebookError::InvalidScore(_)));
        assert!(!store.submission("sub-1").expect("stored").is_graded);
    }

    #[tokio::test]
    async fn non_positive_or_non_finite_max_score_is_rejected() {
        let store = graded_store();
        for max_score in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let payload = GradeInput { score: 0.0, max_score: Some(max_score), feedback: None };
            let err = grade_submission(&store, &store, "teacher-1", "sub-1", payload)
                .await
                .expect_err("invalid");
            assert!(matches!(err, GradebookError::InvalidScore(_)));
        }
    }

    #[tokio::test]
    async fn score_above_effective_max_is_rejected() {
        let store = graded_store();
        let err = grade_submission(&store, &store, "teacher-1", "sub-1", input(120.0))
            .await
            .expect_err("too high");
        assert!(matches!(err, GradebookError::InvalidScore(_)));

        let payload = GradeInput { score: 120.0, max_score: Some(150.0), feedback: None };
        let graded = grade_submission(&store, &store, "teacher-1", "sub-1", payload)
            .await
            .expect("raised max");
        assert_eq!(graded.score, Some(120.0));
        assert_eq!(graded.max_score, 150.0);
    }

    #[tokio::test]
    async fn non_owning_teacher_is_forbidden() {
        let store = graded_store();
        let err = grade_submission(&store, &store, "teacher-2", "sub-1", input(50.0))
            .await
            .expect_err("forbidden");
        assert!(matches!(err, GradebookError::Forbidden(_)));
        assert!(store.audit_entries().is_empty());
    }

    #[tokio::test]
    async fn missing_submission_is_not_found() {
        let store = graded_store();
        let err = grade_submission(&store, &store, "teacher-1", "missing", input(50.0))
            .await
            .expect_err("missing");
        assert!(matches!(err, GradebookError::NotFound("Submission")));
    }

    #[tokio::test]
    async fn regrading_updates_in_place_and_keeps_feedback() {
        let store = graded_store();
        let first = GradeInput {
            score: 60.0,
            max_score: None,
            feedback: Some("Show your work".to_string()),
        };
        grade_submission(&store, &store, "teacher-1", "sub-1", first).await.expect("first");

        let regraded = grade_submission(&store, &store, "teacher-1", "sub-1", input(75.0))
            .await
            .expect("regraded");
        assert_eq!(regraded.score, Some(75.0));
        assert_eq!(regraded.status, SubmissionStatus::Graded);
        assert_eq!(regraded.feedback.as_deref(), Some("Show your work"));

        let audit = store.audit_entries();
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[1].action, "submission.grade");
        assert_eq!(audit[1].details["regrade"], true);
    }

    #[tokio::test]
    async fn pending_submission_can_be_graded_directly() {
        let store = graded_store();
        store.add_submission("sub-2", "quiz-1", "student-2", SubmissionStatus::Pending);

        let graded = grade_submission(&store, &store, "teacher-1", "sub-2", input(0.0))
            .await
            .expect("graded");
        assert_eq!(graded.status, SubmissionStatus::Graded);
        assert_eq!(graded.score, Some(0.0));
    }

    #[tokio::test]
    async fn store_outage_is_reported() {
        let store = graded_store();
        store.set_unavailable(true);
        let err = grade_submission(&store, &store, "teacher-1", "sub-1", input(10.0))
            .await
            .expect_err("unavailable");
        assert!(matches!(err, GradebookError::StoreUnavailable(_)));
    }
}
