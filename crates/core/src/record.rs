//! The screening record for one applicant episode.
//!
//! The record accumulates the applicant's answers across the workflow. It is
//! append-only within an episode: a section may be corrected by replacing it,
//! but nothing is ever rolled back by a later submission. Task completion
//! gates forward navigation only. Task statuses are always derived from the
//! record, never stored on it.

use chrono::NaiveDate;
use pets_certificates::TbCertificate;
use pets_types::SampleNumber;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// A recorded yes/no answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum YesOrNo {
    Yes,
    No,
}

impl FromStr for YesOrNo {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(YesOrNo::Yes),
            "No" => Ok(YesOrNo::No),
            _ => Err(()),
        }
    }
}

impl fmt::Display for YesOrNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YesOrNo::Yes => write!(f, "Yes"),
            YesOrNo::No => write!(f, "No"),
        }
    }
}

/// A laboratory result for a sputum smear or culture test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SampleResult {
    Positive,
    Negative,
}

impl FromStr for SampleResult {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Positive" => Ok(SampleResult::Positive),
            "Negative" => Ok(SampleResult::Negative),
            _ => Err(()),
        }
    }
}

/// Why a chest X-ray was not taken. Free-text elaboration is permitted only
/// for `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum XrayNotTakenReason {
    Child,
    Pregnant,
    Other,
}

/// Visa applicant identity, passport and home-address details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDetails {
    pub full_name: String,
    pub sex: String,
    pub date_of_birth: NaiveDate,
    pub country_of_nationality: String,
    pub passport_number: String,
    pub country_of_issue: String,
    pub passport_issue_date: NaiveDate,
    pub passport_expiry_date: NaiveDate,
    pub home_address_1: String,
    pub home_address_2: Option<String>,
    pub home_address_3: Option<String>,
    pub town_or_city: String,
    pub province_or_state: String,
    pub country: String,
    pub postcode: Option<String>,
    pub photo_file_name: Option<String>,
}

/// Proposed UK travel details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelInformation {
    pub visa_category: String,
    pub uk_address_1: Option<String>,
    pub uk_address_2: Option<String>,
    pub uk_address_3: Option<String>,
    pub uk_town_or_city: Option<String>,
    pub uk_postcode: Option<String>,
    pub uk_mobile_number: Option<String>,
    pub uk_email: Option<String>,
}

/// Medical history and TB symptom answers recorded by the clinician.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistory {
    pub completion_date: NaiveDate,
    pub age: u32,
    pub tb_symptoms: YesOrNo,
    pub tb_symptoms_list: Vec<String>,
    pub other_symptoms_detail: Option<String>,
    pub under_eleven_conditions: Vec<String>,
    pub under_eleven_conditions_detail: Option<String>,
    pub previous_tb: YesOrNo,
    pub previous_tb_detail: Option<String>,
    pub close_contact_with_tb: YesOrNo,
    pub close_contact_with_tb_detail: Option<String>,
    /// Asked only where applicable; `None` when the question did not apply.
    pub pregnant: Option<YesOrNo>,
    pub menstrual_periods: Option<YesOrNo>,
    pub physical_exam_notes: Option<String>,
}

/// Uploaded chest X-ray images and the date they were taken.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChestXrayImages {
    pub postero_anterior_file: String,
    pub apical_lordotic_file: Option<String>,
    pub lateral_decubitus_file: Option<String>,
    pub date_taken: NaiveDate,
}

/// Radiological findings recorded after reviewing the X-ray images.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiologicalFindings {
    pub result: String,
    pub result_detail: Option<String>,
    pub minor_findings: Vec<String>,
}

/// The recorded reason an X-ray was not taken.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayNotTaken {
    pub reason: XrayNotTakenReason,
    pub further_details: Option<String>,
}

/// The chest X-ray outcome: either reviewed findings or a not-taken reason.
/// The sputum decision question becomes available once either is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum XrayOutcome {
    Findings(RadiologicalFindings),
    NotTaken(XrayNotTaken),
}

/// One collected sputum sample. Collection data may be saved before the
/// laboratory results arrive ("partial confirmation"); the sample is complete
/// once both smear and culture results are recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SputumSample {
    pub collection_date: NaiveDate,
    pub collection_method: String,
    pub smear_result: Option<SampleResult>,
    pub culture_result: Option<SampleResult>,
}

impl SputumSample {
    pub fn has_results(&self) -> bool {
        self.smear_result.is_some() && self.culture_result.is_some()
    }
}

/// The issuing decision for the TB clearance certificate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CertificateOutcome {
    Issued(TbCertificate),
    NotIssued {
        reason: String,
        physician_name: String,
        comments: Option<String>,
    },
}

/// The accumulating record for one screening episode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningRecord {
    pub applicant: Option<ApplicantDetails>,
    pub travel: Option<TravelInformation>,
    pub medical_history: Option<MedicalHistory>,
    pub chest_xray: Option<ChestXrayImages>,
    pub xray_outcome: Option<XrayOutcome>,
    /// The clinician's answer to the dedicated sputum decision question.
    pub sputum_required: Option<YesOrNo>,
    pub sputum_samples: [Option<SputumSample>; 3],
    pub certificate_outcome: Option<CertificateOutcome>,
}

impl ScreeningRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&self, number: SampleNumber) -> Option<&SputumSample> {
        self.sputum_samples[number.index()].as_ref()
    }

    pub fn sample_mut(&mut self, number: SampleNumber) -> Option<&mut SputumSample> {
        self.sputum_samples[number.index()].as_mut()
    }

    pub fn set_sample(&mut self, number: SampleNumber, sample: SputumSample) {
        self.sputum_samples[number.index()] = Some(sample);
    }

    /// Whether the applicant's close contact with active pulmonary TB was
    /// recorded in the medical history. Drives the reduced certificate
    /// validity.
    pub fn close_contact_with_tb(&self) -> bool {
        self.medical_history
            .as_ref()
            .is_some_and(|m| m.close_contact_with_tb == YesOrNo::Yes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_or_no_parses_exact_answers_only() {
        assert_eq!("Yes".parse(), Ok(YesOrNo::Yes));
        assert_eq!("No".parse(), Ok(YesOrNo::No));
        assert!("yes".parse::<YesOrNo>().is_err());
        assert!("".parse::<YesOrNo>().is_err());
    }

    #[test]
    fn samples_are_addressed_by_sample_number() {
        let mut record = ScreeningRecord::new();
        let sample = SputumSample {
            collection_date: NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date"),
            collection_method: "Coughed up".into(),
            smear_result: None,
            culture_result: None,
        };
        record.set_sample(SampleNumber::Two, sample.clone());

        assert!(record.sample(SampleNumber::One).is_none());
        assert_eq!(record.sample(SampleNumber::Two), Some(&sample));
        assert!(!sample.has_results());
    }

    #[test]
    fn close_contact_defaults_to_false_before_medical_history() {
        let record = ScreeningRecord::new();
        assert!(!record.close_contact_with_tb());
    }
}
