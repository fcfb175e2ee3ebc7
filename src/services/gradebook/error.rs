use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum GradebookError {
    #[error(
        "weights must be non-negative and sum to 100 \
         (quiz={quiz}, assignment={assignment}, exam={exam})"
    )]
    InvalidWeights { quiz: i32, assignment: i32, exam: i32 },
    #[error("{0}")]
    InvalidScore(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("grade store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}
