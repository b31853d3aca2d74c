//! Core business rules for TB pre-entry screening.
//!
//! Everything here is pure: field validation against the error-message
//! catalogue, date normalization, the X-ray/sputum decision engine, task
//! status derivation for the progress tracker, and section submission
//! handling. Persistence and the HTTP surface live with the caller.

pub mod dates;
pub mod decision;
pub mod error;
pub mod record;
pub mod submission;
pub mod tasks;
pub mod validation;

pub use dates::{validate_date, DateFieldId, DateParts};
pub use decision::{decide, Decision};
pub use error::{ScreeningError, ScreeningResult};
pub use record::{ScreeningRecord, YesOrNo};
pub use submission::{apply_submission, SectionSubmission};
pub use tasks::{derive_statuses, TaskId, TaskStatus};
pub use validation::validate_text;
