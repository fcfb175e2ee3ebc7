//! Grade settings, submission grading and grade aggregation for classes.

mod aggregate;
mod error;
mod grading;
#[cfg(test)]
mod memory;
mod ownership;
mod settings;
mod store;
mod weights;

pub(crate) use aggregate::{class_gradebook, compute_overall_grade, AggregatedGrade};
pub(crate) use error::GradebookError;
pub(crate) use grading::{grade_submission, GradeInput};
pub(crate) use ownership::{OwnedResource, OwnershipResolver, PgOwnershipResolver};
pub(crate) use settings::{set_settings, view_settings};
pub(crate) use store::{AuditEntry, GradeStore, PgGradeStore};
pub(crate) use weights::Weights;

/// The audited change is already committed, so a failed append is logged, not returned.
pub(crate) async fn record_audit(store: &dyn GradeStore, entry: AuditEntry) {
    let action = entry.action;
    let entity_id = entry.entity_id.clone();
    if let Err(error) = store.append_audit(entry).await {
        tracing::error!(error = %error, action, entity_id = %entity_id, "Failed to append audit log");
    }
}
