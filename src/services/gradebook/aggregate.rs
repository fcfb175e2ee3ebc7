use crate::db::models::GradedScore;
use crate::db::types::MaterialType;

use super::error::GradebookError;
use super::ownership::{OwnedResource, OwnershipResolver};
use super::settings::get_or_create_settings;
use super::store::GradeStore;
use super::weights::Weights;

/// A student's standing in one class. Categories without graded work are `None`
/// and take no part in the weighted overall.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AggregatedGrade {
    pub(crate) student_id: String,
    pub(crate) class_id: String,
    pub(crate) quiz_average: Option<f64>,
    pub(crate) assignment_average: Option<f64>,
    pub(crate) exam_average: Option<f64>,
    pub(crate) overall: Option<f64>,
    pub(crate) graded_count: usize,
    pub(crate) weights: Weights,
}

#[derive(Debug, Default, Clone, Copy)]
struct CategoryTotals {
    sum: f64,
    count: usize,
}

impl CategoryTotals {
    fn push(&mut self, percent: f64) {
        self.sum += percent;
        self.count += 1;
    }

    fn average(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn percent(score: &GradedScore) -> Option<f64> {
    if !score.score.is_finite() || !score.max_score.is_finite() || score.max_score <= 0.0 {
        return None;
    }
    Some((score.score / score.max_score * 100.0).clamp(0.0, 100.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn aggregate(
    student_id: &str,
    class_id: &str,
    weights: Weights,
    scores: &[GradedScore],
) -> AggregatedGrade {
    let mut quiz = CategoryTotals::default();
    let mut assignment = CategoryTotals::default();
    let mut exam = CategoryTotals::default();
    let mut graded_count = 0;

    for score in scores.iter().filter(|score| score.student_id == student_id) {
        let Some(percent) = percent(score) else {
            continue;
        };
        graded_count += 1;
        match score.material_type {
            MaterialType::Quiz => quiz.push(percent),
            MaterialType::Assignment => assignment.push(percent),
            MaterialType::Exam => exam.push(percent),
        }
    }

    let averages = [
        (MaterialType::Quiz, quiz.average()),
        (MaterialType::Assignment, assignment.average()),
        (MaterialType::Exam, exam.average()),
    ];
    let (weighted_sum, weight_total) = averages
        .iter()
        .filter_map(|(kind, average)| average.map(|avg| (avg, weights.for_type(*kind))))
        .fold((0.0, 0_i64), |(sum, total), (avg, weight)| {
            (sum + avg * f64::from(weight), total + i64::from(weight))
        });
    let overall =
        (weight_total > 0).then(|| round2((weighted_sum / weight_total as f64).clamp(0.0, 100.0)));

    AggregatedGrade {
        student_id: student_id.to_string(),
        class_id: class_id.to_string(),
        quiz_average: quiz.average().map(round2),
        assignment_average: assignment.average().map(round2),
        exam_average: exam.average().map(round2),
        overall,
        graded_count,
        weights,
    }
}

/// Visible to the student themselves and to the teacher who owns the class.
pub(crate) async fn compute_overall_grade(
    store: &dyn GradeStore,
    ownership: &dyn OwnershipResolver,
    caller_id: &str,
    class_id: &str,
    student_id: &str,
) -> Result<AggregatedGrade, GradebookError> {
    if caller_id != student_id {
        let access = ownership.resolve_ownership(caller_id, OwnedResource::Class(class_id)).await?;
        if !access.is_allowed() {
            return Err(GradebookError::NotFound("Class"));
        }
    }
    if !store.is_enrolled(class_id, student_id).await? {
        return Err(GradebookError::NotFound("Enrollment"));
    }

    let settings = get_or_create_settings(store, class_id).await?;
    let scores = store.graded_scores(class_id, Some(student_id)).await?;
    Ok(aggregate(student_id, class_id, Weights::from(&settings), &scores))
}

/// Aggregated grades of every enrolled student, for the owning teacher.
pub(crate) async fn class_gradebook(
    store: &dyn GradeStore,
    ownership: &dyn OwnershipResolver,
    teacher_id: &str,
    class_id: &str,
) -> Result<Vec<AggregatedGrade>, GradebookError> {
    let access = ownership.resolve_ownership(teacher_id, OwnedResource::Class(class_id)).await?;
    if !access.is_allowed() {
        return Err(GradebookError::NotFound("Class"));
    }

    let weights = Weights::from(&get_or_create_settings(store, class_id).await?);
    let students = store.enrolled_student_ids(class_id).await?;
    let scores = store.graded_scores(class_id, None).await?;

    Ok(students
        .iter()
        .map(|student_id| aggregate(student_id, class_id, weights, &scores))
        .collect())
}
