use thiserror::Error;

/// Rejections raised by the labeling core.
///
/// Every variant is locally recoverable: the rejected operation leaves the
/// workspace exactly as it was, apart from the status line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelingError {
    #[error("Label '{0}' already exists")]
    DuplicateName(String),

    #[error("Label name cannot be empty")]
    InvalidName,

    #[error("{0} not found")]
    NotFound(String),

    #[error("No label selected")]
    NoActiveLabel,

    #[error("{0}")]
    EmptyOperation(&'static str),

    #[error("Labels for job post {0} are being saved")]
    SubmissionPending(String),
}

pub type LabelingResult<T> = Result<T, LabelingError>;
