use crate::tasks::TaskId;
use pets_types::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    /// One or more fields of the submitted section failed validation. The
    /// caller maps this to a 400-class response carrying every field error.
    #[error("submission failed validation: {0}")]
    Validation(ValidationErrors),
    /// The submitted section belongs to a task whose prerequisites are not
    /// yet complete. A recognized application fault, not a validation error.
    #[error("the {task} task cannot be started yet")]
    SubmissionOutOfOrder { task: TaskId },
    #[error("failed to issue certificate: {0}")]
    Certificate(#[from] pets_certificates::CertificateError),
}

pub type ScreeningResult<T> = std::result::Result<T, ScreeningError>;
