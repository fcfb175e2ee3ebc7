use serde::{Deserialize, Serialize};

use crate::db::models::ClassGradeSettings;
use crate::db::types::MaterialType;

use super::error::GradebookError;

pub(crate) const DEFAULT_WEIGHTS: Weights = Weights { quiz: 30, assignment: 30, exam: 40 };

/// Percentage contribution of each material category to the overall grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Weights {
    pub(crate) quiz: i32,
    pub(crate) assignment: i32,
    pub(crate) exam: i32,
}

impl Weights {
    pub(crate) fn validate(self) -> Result<Self, GradebookError> {
        let non_negative = self.quiz >= 0 && self.assignment >= 0 && self.exam >= 0;
        let total = i64::from(self.quiz) + i64::from(self.assignment) + i64::from(self.exam);

        if non_negative && total == 100 {
            Ok(self)
        } else {
            Err(GradebookError::InvalidWeights {
                quiz: self.quiz,
                assignment: self.assignment,
                exam: self.exam,
            })
        }
    }

    pub(crate) fn for_type(self, material_type: MaterialType) -> i32 {
        match material_type {
            MaterialType::Quiz => self.quiz,
            MaterialType::Assignment => self.assignment,
            MaterialType::Exam => self.exam,
        }
    }
}

impl From<&ClassGradeSettings> for Weights {
    fn from(settings: &ClassGradeSettings) -> Self {
        Self {
            quiz: settings.quiz_weight,
            assignment: settings.assignment_weight,
            exam: settings.exam_weight,
        }
    }
}
