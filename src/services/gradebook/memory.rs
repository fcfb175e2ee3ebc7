use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::PrimitiveDateTime;

use crate::core::time::primitive_now_utc;
use crate::db::models::{ClassGradeSettings, GradedScore, Material, Submission};
use crate::db::types::{MaterialType, SubmissionStatus};

use super::ownership::{OwnedResource, Ownership, OwnershipResolver};
use super::store::{AuditEntry, GradeStore, GradeUpdate};
use super::weights::Weights;

#[derive(Default)]
struct Inner {
    class_owners: HashMap<String, String>,
    enrollments: HashSet<(String, String)>,
    materials: HashMap<String, Material>,
    submissions: HashMap<String, Submission>,
    settings: HashMap<String, ClassGradeSettings>,
    audit: Vec<AuditEntry>,
    unavailable: bool,
}

impl Inner {
    fn available(&self) -> Result<(), sqlx::Error> {
        if self.unavailable {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }

    fn owner_of_material(&self, material_id: &str) -> Option<&String> {
        let material = self.materials.get(material_id)?;
        self.class_owners.get(&material.class_id)
    }
}

/// Test double for both the grade store and the ownership resolver.
#[derive(Default)]
pub(crate) struct MemoryGradeStore {
    inner: Mutex<Inner>,
}

impl MemoryGradeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store lock")
    }

    pub(crate) fn add_class(&self, class_id: &str, teacher_id: &str) {
        self.lock().class_owners.insert(class_id.to_string(), teacher_id.to_string());
    }

    pub(crate) fn enroll(&self, class_id: &str, student_id: &str) {
        self.lock().enrollments.insert((class_id.to_string(), student_id.to_string()));
    }

    pub(crate) fn add_material(
        &self,
        material_id: &str,
        class_id: &str,
        material_type: MaterialType,
        max_score: f64,
    ) {
        let now = primitive_now_utc();
        let mut inner = self.lock();
        let created_by = inner.class_owners.get(class_id).cloned().unwrap_or_default();
        inner.materials.insert(
            material_id.to_string(),
            Material {
                id: material_id.to_string(),
                class_id: class_id.to_string(),
                material_type,
                title: format!("Material {material_id}"),
                description: None,
                max_score,
                due_at: None,
                created_by,
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub(crate) fn add_submission(
        &self,
        submission_id: &str,
        material_id: &str,
        student_id: &str,
        status: SubmissionStatus,
    ) {
        let now = primitive_now_utc();
        let mut inner = self.lock();
        let max_score = inner.materials.get(material_id).map_or(100.0, |m| m.max_score);
        inner.submissions.insert(
            submission_id.to_string(),
            Submission {
                id: submission_id.to_string(),
                material_id: material_id.to_string(),
                student_id: student_id.to_string(),
                content: Some("answer".to_string()),
                score: None,
                max_score,
                is_graded: false,
                status,
                feedback: None,
                submitted_at: (status != SubmissionStatus::Pending).then_some(now),
                graded_at: None,
                graded_by: None,
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub(crate) fn add_graded(
        &self,
        submission_id: &str,
        material_id: &str,
        student_id: &str,
        score: f64,
    ) {
        self.add_submission(submission_id, material_id, student_id, SubmissionStatus::Submitted);
        let now = primitive_now_utc();
        if let Some(submission) = self.lock().submissions.get_mut(submission_id) {
            submission.score = Some(score);
            submission.is_graded = true;
            submission.status = SubmissionStatus::Graded;
            submission.graded_at = Some(now);
        }
    }

    pub(crate) fn submission(&self, submission_id: &str) -> Option<Submission> {
        self.lock().submissions.get(submission_id).cloned()
    }

    pub(crate) fn audit_entries(&self) -> Vec<AuditEntry> {
        self.lock().audit.clone()
    }

    pub(crate) fn settings_count(&self) -> usize {
        self.lock().settings.len()
    }

    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }
}

fn settings_row(
    class_id: &str,
    weights: Weights,
    updated_by: Option<&str>,
    now: PrimitiveDateTime,
) -> ClassGradeSettings {
    ClassGradeSettings {
        class_id: class_id.to_string(),
        quiz_weight: weights.quiz,
        assignment_weight: weights.assignment,
        exam_weight: weights.exam,
        updated_by: updated_by.map(str::to_string),
        updated_at: now,
    }
}

#[async_trait]
impl GradeStore for MemoryGradeStore {
    async fn class_exists(&self, class_id: &str) -> Result<bool, sqlx::Error> {
        let inner = self.lock();
        inner.available()?;
        Ok(inner.class_owners.contains_key(class_id))
    }

    async fn is_enrolled(&self, class_id: &str, student_id: &str) -> Result<bool, sqlx::Error> {
        let inner = self.lock();
        inner.available()?;
        Ok(inner.enrollments.contains(&(class_id.to_string(), student_id.to_string())))
    }

    async fn enrolled_student_ids(&self, class_id: &str) -> Result<Vec<String>, sqlx::Error> {
        let inner = self.lock();
        inner.available()?;
        let mut students: Vec<String> = inner
            .enrollments
            .iter()
            .filter(|(class, _)| class == class_id)
            .map(|(_, student)| student.clone())
            .collect();
        students.sort();
        Ok(students)
    }

    async fn find_settings(
        &self,
        class_id: &str,
    ) -> Result<Option<ClassGradeSettings>, sqlx::Error> {
        let inner = self.lock();
        inner.available()?;
        Ok(inner.settings.get(class_id).cloned())
    }

    async fn insert_default_settings(
        &self,
        class_id: &str,
        defaults: Weights,
        now: PrimitiveDateTime,
    ) -> Result<ClassGradeSettings, sqlx::Error> {
        let mut inner = self.lock();
        inner.available()?;
        Ok(inner
            .settings
            .entry(class_id.to_string())
            .or_insert_with(|| settings_row(class_id, defaults, None, now))
            .clone())
    }

    async fn upsert_settings(
        &self,
        class_id: &str,
        weights: Weights,
        updated_by: &str,
        now: PrimitiveDateTime,
    ) -> Result<ClassGradeSettings, sqlx::Error> {
        let mut inner = self.lock();
        inner.available()?;
        let row = settings_row(class_id, weights, Some(updated_by), now);
        inner.settings.insert(class_id.to_string(), row.clone());
        Ok(row)
    }

    async fn find_submission(
        &self,
        submission_id: &str,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let inner = self.lock();
        inner.available()?;
        Ok(inner.submissions.get(submission_id).cloned())
    }

    async fn find_material(&self, material_id: &str) -> Result<Option<Material>, sqlx::Error> {
        let inner = self.lock();
        inner.available()?;
        Ok(inner.materials.get(material_id).cloned())
    }

    async fn record_grade(
        &self,
        submission_id: &str,
        update: GradeUpdate<'_>,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let mut inner = self.lock();
        inner.available()?;
        let Some(submission) = inner.submissions.get_mut(submission_id) else {
            return Ok(None);
        };
        submission.score = Some(update.score);
        if let Some(max_score) = update.max_score {
            submission.max_score = max_score;
        }
        if let Some(feedback) = update.feedback {
            submission.feedback = Some(feedback.to_string());
        }
        submission.is_graded = true;
        submission.status = SubmissionStatus::Graded;
        submission.graded_at = Some(update.graded_at);
        submission.graded_by = Some(update.graded_by.to_string());
        submission.updated_at = update.graded_at;
        Ok(Some(submission.clone()))
    }

    async fn graded_scores(
        &self,
        class_id: &str,
        student_id: Option<&str>,
    ) -> Result<Vec<GradedScore>, sqlx::Error> {
        let inner = self.lock();
        inner.available()?;
        Ok(inner
            .submissions
            .values()
            .filter(|s| s.is_graded)
            .filter(|s| student_id.map_or(true, |id| s.student_id == id))
            .filter_map(|s| {
                let material = inner.materials.get(&s.material_id)?;
                (material.class_id == class_id).then_some(GradedScore {
                    student_id: s.student_id.clone(),
                    material_type: material.material_type,
                    score: s.score?,
                    max_score: s.max_score,
                })
            })
            .collect())
    }

    async fn append_audit(&self, entry: AuditEntry) -> Result<(), sqlx::Error> {
        let mut inner = self.lock();
        inner.available()?;
        inner.audit.push(entry);
        Ok(())
    }
}

#[async_trait]
impl OwnershipResolver for MemoryGradeStore {
    async fn resolve_ownership(
        &self,
        caller_id: &str,
        resource: OwnedResource<'_>,
    ) -> Result<Ownership, sqlx::Error> {
        let inner = self.lock();
        inner.available()?;
        let owner = match resource {
            OwnedResource::Class(id) => inner.class_owners.get(id),
            OwnedResource::Material(id) => inner.owner_of_material(id),
            OwnedResource::Submission(id) => inner
                .submissions
                .get(id)
                .and_then(|submission| inner.owner_of_material(&submission.material_id)),
        };
        Ok(match owner {
            Some(owner) if owner == caller_id => Ownership::Allowed,
            _ => Ownership::Denied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ownership_follows_submission_material_class_chain() {
        let store = MemoryGradeStore::new();
        store.add_class("class-1", "teacher-1");
        store.add_material("m-1", "class-1", MaterialType::Assignment, 20.0);
        store.add_submission("s-1", "m-1", "student-1", SubmissionStatus::Submitted);

        for resource in [
            OwnedResource::Class("class-1"),
            OwnedResource::Material("m-1"),
            OwnedResource::Submission("s-1"),
        ] {
            let allowed = store.resolve_ownership("teacher-1", resource).await.expect("resolve");
            assert_eq!(allowed, Ownership::Allowed);
            let denied = store.resolve_ownership("teacher-2", resource).await.expect("resolve");
            assert_eq!(denied, Ownership::Denied);
        }

        let missing = store
            .resolve_ownership("teacher-1", OwnedResource::Submission("nope"))
            .await
            .expect("resolve");
        assert_eq!(missing, Ownership::Denied);
    }
}
