//! The clinical workflow decision engine.
//!
//! Re-evaluated on every submission, the engine derives from the accumulated
//! record whether an X-ray is required, whether sputum collection is
//! required, and whether the applicant is a child under 11. It is total and
//! idempotent: absent answers default to "not yet decided" and read as
//! task-not-complete downstream, never as an error.

use crate::record::{ScreeningRecord, XrayNotTakenReason, YesOrNo};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

/// Age threshold, in whole years, below which an applicant is screened as a
/// child and requires no chest X-ray.
pub const CHILD_AGE_LIMIT: u32 = 11;

/// Decision outputs consumed by the task status deriver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub xray_required: bool,
    pub reason_xray_not_taken: Option<XrayNotTakenReason>,
    /// The clinician's explicit answer to the sputum question; `None` until
    /// the question has been answered.
    pub sputum_required: Option<bool>,
    pub is_child_under_11: bool,
}

/// Whole years elapsed from `date_of_birth` to `on`. Zero when the birth
/// date is not yet in the past.
pub fn age_in_years(date_of_birth: NaiveDate, on: NaiveDate) -> u32 {
    let mut years = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Derives the screening decision from the current record.
///
/// The screening date is the medical-history completion date when recorded,
/// otherwise `today`. An X-ray is not required exactly when the applicant is
/// a child under 11 or pregnant; the not-taken reason then reflects which,
/// with child taking precedence. Sputum requirement is never inferred from
/// symptoms; it mirrors the clinician's explicit answer.
pub fn decide(record: &ScreeningRecord, today: NaiveDate) -> Decision {
    let screening_date = record
        .medical_history
        .as_ref()
        .map(|m| m.completion_date)
        .unwrap_or(today);

    let is_child_under_11 = record
        .applicant
        .as_ref()
        .is_some_and(|a| age_in_years(a.date_of_birth, screening_date) < CHILD_AGE_LIMIT);

    let pregnant = record
        .medical_history
        .as_ref()
        .is_some_and(|m| m.pregnant == Some(YesOrNo::Yes));

    let xray_required = !(is_child_under_11 || pregnant);
    let reason_xray_not_taken = if is_child_under_11 {
        Some(XrayNotTakenReason::Child)
    } else if pregnant {
        Some(XrayNotTakenReason::Pregnant)
    } else {
        None
    };

    Decision {
        xray_required,
        reason_xray_not_taken,
        sputum_required: record.sputum_required.map(|a| a == YesOrNo::Yes),
        is_child_under_11,
    }
}
