//! Task status derivation for the screening progress tracker.
//!
//! Each workflow task owns exactly one status at any time, computed from the
//! record and the current decision. Statuses are never stored. Availability
//! is strictly sequential (visa details, travel, medical history) before the
//! screening tasks; a task queried before its prerequisites are met reports
//! `CannotStartYet`, never an error.

use crate::decision::Decision;
use crate::record::{ScreeningRecord, XrayOutcome, YesOrNo};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

/// The workflow tasks shown on the progress tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TaskId {
    VisaApplicantDetails,
    TravelInformation,
    MedicalHistory,
    ChestXray,
    SputumCollection,
    TbCertificate,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskId::VisaApplicantDetails => "Visa applicant details",
            TaskId::TravelInformation => "UK travel information",
            TaskId::MedicalHistory => "Medical history and TB symptoms",
            TaskId::ChestXray => "Chest X-ray and radiological outcome",
            TaskId::SputumCollection => "Sputum collection and results",
            TaskId::TbCertificate => "TB certificate outcome",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    NotYetStarted,
    CannotStartYet,
    InProgress,
    Completed,
    NotRequired,
    CertificateNotIssued,
}

impl TaskStatus {
    /// Whether this status satisfies a downstream task's prerequisite.
    pub fn satisfies_prerequisite(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::NotRequired | TaskStatus::CertificateNotIssued
        )
    }
}

/// Whether the sputum decision question is available: the X-ray outcome
/// (findings or the not-taken reason) must have been recorded.
pub fn sputum_question_available(record: &ScreeningRecord, xray_status: TaskStatus) -> bool {
    xray_status.satisfies_prerequisite() && record.xray_outcome.is_some()
}

fn chest_xray_status(record: &ScreeningRecord, decision: &Decision) -> TaskStatus {
    if !decision.xray_required {
        // Permanent: a not-required X-ray never transitions further.
        return TaskStatus::NotRequired;
    }
    match (&record.chest_xray, &record.xray_outcome) {
        (_, Some(XrayOutcome::Findings(_))) | (_, Some(XrayOutcome::NotTaken(_))) => {
            TaskStatus::Completed
        }
        (Some(_), None) => TaskStatus::InProgress,
        (None, None) => TaskStatus::NotYetStarted,
    }
}

fn sputum_status(record: &ScreeningRecord, xray_status: TaskStatus) -> TaskStatus {
    if !sputum_question_available(record, xray_status) {
        return TaskStatus::CannotStartYet;
    }
    match record.sputum_required {
        None => TaskStatus::CannotStartYet,
        Some(YesOrNo::No) => TaskStatus::NotRequired,
        Some(YesOrNo::Yes) => {
            let all_complete = record
                .sputum_samples
                .iter()
                .all(|s| s.as_ref().is_some_and(|s| s.has_results()));
            let any_started = record.sputum_samples.iter().any(|s| s.is_some());
            if all_complete {
                TaskStatus::Completed
            } else if any_started {
                TaskStatus::InProgress
            } else {
                TaskStatus::NotYetStarted
            }
        }
    }
}

fn certificate_status(record: &ScreeningRecord, prerequisites: &[TaskStatus]) -> TaskStatus {
    if !prerequisites.iter().all(|s| s.satisfies_prerequisite()) {
        return TaskStatus::CannotStartYet;
    }
    match &record.certificate_outcome {
        None => TaskStatus::NotYetStarted,
        Some(crate::record::CertificateOutcome::NotIssued { .. }) => {
            TaskStatus::CertificateNotIssued
        }
        Some(crate::record::CertificateOutcome::Issued(_)) => TaskStatus::Completed,
    }
}

/// Computes the status of every workflow task from the record and decision.
///
/// Never fails: missing upstream data reads as `CannotStartYet`.
pub fn derive_statuses(
    record: &ScreeningRecord,
    decision: &Decision,
) -> BTreeMap<TaskId, TaskStatus> {
    let visa = if record.applicant.is_some() {
        TaskStatus::Completed
    } else {
        TaskStatus::NotYetStarted
    };

    let travel = if visa != TaskStatus::Completed {
        TaskStatus::CannotStartYet
    } else if record.travel.is_some() {
        TaskStatus::Completed
    } else {
        TaskStatus::NotYetStarted
    };

    let medical = if travel != TaskStatus::Completed {
        TaskStatus::CannotStartYet
    } else if record.medical_history.is_some() {
        TaskStatus::Completed
    } else {
        TaskStatus::NotYetStarted
    };

    let xray = if medical != TaskStatus::Completed {
        TaskStatus::CannotStartYet
    } else {
        chest_xray_status(record, decision)
    };

    let sputum = if medical != TaskStatus::Completed {
        TaskStatus::CannotStartYet
    } else {
        sputum_status(record, xray)
    };

    let certificate = if medical != TaskStatus::Completed {
        TaskStatus::CannotStartYet
    } else {
        certificate_status(record, &[visa, travel, medical, xray, sputum])
    };

    BTreeMap::from([
        (TaskId::VisaApplicantDetails, visa),
        (TaskId::TravelInformation, travel),
        (TaskId::MedicalHistory, medical),
        (TaskId::ChestXray, xray),
        (TaskId::SputumCollection, sputum),
        (TaskId::TbCertificate, certificate),
    ])
}
