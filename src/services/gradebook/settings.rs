use serde_json::json;

use crate::core::{metrics, time::primitive_now_utc};
use crate::db::models::ClassGradeSettings;

use super::error::GradebookError;
use super::ownership::{OwnedResource, OwnershipResolver};
use super::store::{AuditEntry, GradeStore};
use super::weights::{Weights, DEFAULT_WEIGHTS};
use super::record_audit;

/// Returns the stored weights of a class, inserting the defaults on first access.
pub(crate) async fn get_or_create_settings(
    store: &dyn GradeStore,
    class_id: &str,
) -> Result<ClassGradeSettings, GradebookError> {
    if let Some(existing) = store.find_settings(class_id).await? {
        return Ok(existing);
    }
    if !store.class_exists(class_id).await? {
        return Err(GradebookError::NotFound("Class"));
    }

    Ok(store.insert_default_settings(class_id, DEFAULT_WEIGHTS, primitive_now_utc()).await?)
}

/// Settings are readable by the owning teacher and by enrolled students.
pub(crate) async fn view_settings(
    store: &dyn GradeStore,
    ownership: &dyn OwnershipResolver,
    caller_id: &str,
    class_id: &str,
) -> Result<ClassGradeSettings, GradebookError> {
    let access = ownership.resolve_ownership(caller_id, OwnedResource::Class(class_id)).await?;
    if !access.is_allowed() && !store.is_enrolled(class_id, caller_id).await? {
        return Err(GradebookError::NotFound("Class"));
    }

    get_or_create_settings(store, class_id).await
}

pub(crate) async fn set_settings(
    store: &dyn GradeStore,
    ownership: &dyn OwnershipResolver,
    teacher_id: &str,
    class_id: &str,
    weights: Weights,
) -> Result<ClassGradeSettings, GradebookError> {
    let access = ownership.resolve_ownership(teacher_id, OwnedResource::Class(class_id)).await?;
    if !access.is_allowed() {
        return Err(GradebookError::NotFound("Class"));
    }
    let weights = weights.validate()?;

    let now = primitive_now_utc();
    let stored = store.upsert_settings(class_id, weights, teacher_id, now).await?;

    record_audit(
        store,
        AuditEntry {
            actor_id: teacher_id.to_string(),
            action: "grade_settings.update",
            entity_type: "class",
            entity_id: class_id.to_string(),
            details: json!({
                "quiz_weight": weights.quiz,
                "assignment_weight": weights.assignment,
                "exam_weight": weights.exam,
            }),
            created_at: now,
        },
    )
    .await;
    metrics::record_settings_update();

    tracing::info!(
        teacher_id = %teacher_id,
        class_id = %class_id,
        quiz_weight = weights.quiz,
        assignment_weight = weights.assignment,
        exam_weight = weights.exam,
        action = "grade_settings.update",
        "Updated class grade settings"
    );

    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gradebook::memory::MemoryGradeStore;

    fn weights(quiz: i32, assignment: i32, exam: i32) -> Weights {
        Weights { quiz, assignment, exam }
    }

    fn class_store() -> MemoryGradeStore {
        let store = MemoryGradeStore::new();
        store.add_class("class-1", "teacher-1");
        store
    }

    #[tokio::test]
    async fn first_read_creates_default_weights() {
        let store = class_store();

        let created = get_or_create_settings(&store, "class-1").await.expect("settings");
        assert_eq!(Weights::from(&created), DEFAULT_WEIGHTS);
        assert_eq!(created.updated_by, None);

        let again = get_or_create_settings(&store, "class-1").await.expect("settings");
        assert_eq!(again, created);
    }

    #[tokio::test]
    async fn unknown_class_has_no_settings() {
        let store = MemoryGradeStore::new();
        let err = get_or_create_settings(&store, "missing").await.expect_err("not found");
        assert!(matches!(err, GradebookError::NotFound("Class")));
    }

    #[tokio::test]
    async fn set_then_get_returns_stored_triple() {
        let store = class_store();

        for (q, a, e) in [(20, 30, 50), (100, 0, 0), (0, 0, 100), (34, 33, 33)] {
            let stored = set_settings(&store, &store, "teacher-1", "class-1", weights(q, a, e))
                .await
                .expect("stored");
            assert_eq!(Weights::from(&stored), weights(q, a, e));
            assert_eq!(stored.updated_by.as_deref(), Some("teacher-1"));

            let read = get_or_create_settings(&store, "class-1").await.expect("read");
            assert_eq!(Weights::from(&read), weights(q, a, e));
        }
    }

    #[tokio::test]
    async fn repeating_the_same_update_is_idempotent() {
        let store = class_store();
        let first = set_settings(&store, &store, "teacher-1", "class-1", weights(25, 25, 50))
            .await
            .expect("first");
        let second = set_settings(&store, &store, "teacher-1", "class-1", weights(25, 25, 50))
            .await
            .expect("second");

        assert_eq!(Weights::from(&first), Weights::from(&second));
        assert_eq!(store.settings_count(), 1);
    }

    #[tokio::test]
    async fn invalid_sum_is_rejected_and_nothing_changes() {
        let store = class_store();
        set_settings(&store, &store, "teacher-1", "class-1", weights(20, 30, 50))
            .await
            .expect("seed");

        let err = set_settings(&store, &store, "teacher-1", "class-1", weights(40, 40, 10))
            .await
            .expect_err("invalid");
        assert!(matches!(
            err,
            GradebookError::InvalidWeights { quiz: 40, assignment: 40, exam: 10 }
        ));

        let read = get_or_create_settings(&store, "class-1").await.expect("read");
        assert_eq!(Weights::from(&read), weights(20, 30, 50));
    }

    #[tokio::test]
    async fn other_teachers_cannot_change_weights() {
        let store = class_store();
        store.add_class("class-2", "teacher-2");

        let err = set_settings(&store, &store, "teacher-2", "class-1", weights(20, 30, 50))
            .await
            .expect_err("denied");
        assert!(matches!(err, GradebookError::NotFound("Class")));

        let err = set_settings(&store, &store, "teacher-1", "missing", weights(20, 30, 50))
            .await
            .expect_err("missing");
        assert!(matches!(err, GradebookError::NotFound("Class")));
        assert_eq!(store.settings_count(), 0);
    }

    #[tokio::test]
    async fn update_is_audited() {
        let store = class_store();
        set_settings(&store, &store, "teacher-1", "class-1", weights(10, 40, 50))
            .await
            .expect("stored");

        let audit = store.audit_entries();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, "grade_settings.update");
        assert_eq!(audit[0].entity_id, "class-1");
        assert_eq!(audit[0].details["exam_weight"], 50);
    }

    #[tokio::test]
    async fn enrolled_students_can_read_but_strangers_cannot() {
        let store = class_store();
        store.enroll("class-1", "student-1");

        let read = view_settings(&store, &store, "student-1", "class-1").await.expect("read");
        assert_eq!(Weights::from(&read), DEFAULT_WEIGHTS);

        let err = view_settings(&store, &store, "student-2", "class-1").await.expect_err("hidden");
        assert!(matches!(err, GradebookError::NotFound("Class")));
    }

    #[tokio::test]
    async fn store_failures_surface_as_unavailable() {
        let store = class_store();
        store.set_unavailable(true);

        let err = get_or_create_settings(&store, "class-1").await.expect_err("unavailable");
        assert!(matches!(err, GradebookError::StoreUnavailable(_)));
    }
}
