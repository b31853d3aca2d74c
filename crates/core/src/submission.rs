//! Section submission: raw form payloads validated and merged into the
//! screening record.
//!
//! Each workflow section arrives as its own tagged form of raw strings,
//! exactly as captured by the UI. Validation collects every field failure
//! for the section before reporting, so the error summary can list them all
//! at once; only a fully valid section is merged into the record. A section
//! submitted before its task is available is a recognized application fault,
//! `SubmissionOutOfOrder`, distinct from validation failure.

use crate::dates::{validate_date, DateFieldId, DateParts};
use crate::decision::decide;
use crate::error::{ScreeningError, ScreeningResult};
use crate::record::{
    ApplicantDetails, CertificateOutcome, ChestXrayImages, MedicalHistory, RadiologicalFindings,
    SampleResult, ScreeningRecord, SputumSample, TravelInformation, XrayNotTaken, XrayOutcome,
    XrayNotTakenReason, YesOrNo,
};
use crate::tasks::{derive_statuses, sputum_question_available, TaskId, TaskStatus};
use crate::validation::validate_text;
use chrono::NaiveDate;
use pets_certificates::TbCertificate;
use pets_types::{FieldError, FieldKey, SampleNumber, ValidationErrors};
use serde::Deserialize;
use tracing::debug;
use utoipa::ToSchema;

fn check_text(key: FieldKey, raw: &str, errors: &mut ValidationErrors) -> Option<String> {
    match validate_text(key, raw) {
        Ok(value) => Some(value),
        Err(error) => {
            errors.push(error);
            None
        }
    }
}

/// Optional fields pass when empty but still apply their character rule.
/// `Some(None)` is a valid absent answer.
fn check_optional_text(
    key: FieldKey,
    raw: &str,
    errors: &mut ValidationErrors,
) -> Option<Option<String>> {
    match validate_text(key, raw) {
        Ok(value) if value.is_empty() => Some(None),
        Ok(value) => Some(Some(value)),
        Err(error) => {
            errors.push(error);
            None
        }
    }
}

fn check_date(
    parts: &DateParts,
    field: DateFieldId,
    today: NaiveDate,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    match validate_date(parts, field, today) {
        Ok(date) => Some(date),
        Err(error) => {
            errors.push(error);
            None
        }
    }
}

fn check_yes_or_no(
    key: FieldKey,
    raw: &str,
    message: &str,
    errors: &mut ValidationErrors,
) -> Option<YesOrNo> {
    match raw.parse() {
        Ok(answer) => Some(answer),
        Err(()) => {
            errors.push(FieldError::new(key, message));
            None
        }
    }
}

fn check_sample_result(
    key: FieldKey,
    raw: &str,
    message: &str,
    errors: &mut ValidationErrors,
) -> Option<SampleResult> {
    match raw.parse() {
        Ok(result) => Some(result),
        Err(()) => {
            errors.push(FieldError::new(key, message));
            None
        }
    }
}

/// Visa applicant details as captured by the UI.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicantDetailsForm {
    pub full_name: String,
    pub sex: String,
    pub date_of_birth: DateParts,
    pub country_of_nationality: String,
    pub passport_number: String,
    pub country_of_issue: String,
    pub passport_issue_date: DateParts,
    pub passport_expiry_date: DateParts,
    pub home_address_1: String,
    pub home_address_2: String,
    pub home_address_3: String,
    pub town_or_city: String,
    pub province_or_state: String,
    pub country: String,
    pub postcode: String,
    pub photo_file_name: Option<String>,
}

impl ApplicantDetailsForm {
    pub fn validate(&self, today: NaiveDate) -> Result<ApplicantDetails, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let full_name = check_text(FieldKey::FullName, &self.full_name, &mut errors);
        let sex = check_text(FieldKey::Sex, &self.sex, &mut errors);
        let date_of_birth = check_date(
            &self.date_of_birth,
            DateFieldId::DateOfBirth,
            today,
            &mut errors,
        );
        let country_of_nationality = check_text(
            FieldKey::CountryOfNationality,
            &self.country_of_nationality,
            &mut errors,
        );
        let passport_number =
            check_text(FieldKey::PassportNumber, &self.passport_number, &mut errors);
        let country_of_issue =
            check_text(FieldKey::CountryOfIssue, &self.country_of_issue, &mut errors);
        let passport_issue_date = check_date(
            &self.passport_issue_date,
            DateFieldId::PassportIssueDate,
            today,
            &mut errors,
        );
        let passport_expiry_date = check_date(
            &self.passport_expiry_date,
            DateFieldId::PassportExpiryDate,
            today,
            &mut errors,
        );
        let home_address_1 =
            check_text(FieldKey::HomeAddress1, &self.home_address_1, &mut errors);
        let home_address_2 =
            check_optional_text(FieldKey::HomeAddress2, &self.home_address_2, &mut errors);
        let home_address_3 =
            check_optional_text(FieldKey::HomeAddress3, &self.home_address_3, &mut errors);
        let town_or_city = check_text(FieldKey::TownOrCity, &self.town_or_city, &mut errors);
        let province_or_state =
            check_text(FieldKey::ProvinceOrState, &self.province_or_state, &mut errors);
        let country = check_text(FieldKey::Country, &self.country, &mut errors);
        let postcode = check_optional_text(FieldKey::Postcode, &self.postcode, &mut errors);

        let (
            Some(full_name),
            Some(sex),
            Some(date_of_birth),
            Some(country_of_nationality),
            Some(passport_number),
            Some(country_of_issue),
            Some(passport_issue_date),
            Some(passport_expiry_date),
            Some(home_address_1),
            Some(home_address_2),
            Some(home_address_3),
            Some(town_or_city),
            Some(province_or_state),
            Some(country),
            Some(postcode),
        ) = (
            full_name,
            sex,
            date_of_birth,
            country_of_nationality,
            passport_number,
            country_of_issue,
            passport_issue_date,
            passport_expiry_date,
            home_address_1,
            home_address_2,
            home_address_3,
            town_or_city,
            province_or_state,
            country,
            postcode,
        )
        else {
            return Err(errors);
        };

        Ok(ApplicantDetails {
            full_name,
            sex,
            date_of_birth,
            country_of_nationality,
            passport_number,
            country_of_issue,
            passport_issue_date,
            passport_expiry_date,
            home_address_1,
            home_address_2,
            home_address_3,
            town_or_city,
            province_or_state,
            country,
            postcode,
            photo_file_name: self.photo_file_name.clone(),
        })
    }
}

/// Proposed UK travel details. Only the visa category is mandatory.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TravelInformationForm {
    pub visa_category: String,
    pub uk_address_1: String,
    pub uk_address_2: String,
    pub uk_address_3: String,
    pub uk_town_or_city: String,
    pub uk_postcode: String,
    pub uk_mobile_number: String,
    pub uk_email: String,
}

impl TravelInformationForm {
    pub fn validate(&self) -> Result<TravelInformation, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let visa_category = check_text(FieldKey::VisaCategory, &self.visa_category, &mut errors);
        let uk_address_1 =
            check_optional_text(FieldKey::UkAddress1, &self.uk_address_1, &mut errors);
        let uk_address_2 =
            check_optional_text(FieldKey::UkAddress2, &self.uk_address_2, &mut errors);
        let uk_address_3 =
            check_optional_text(FieldKey::UkAddress3, &self.uk_address_3, &mut errors);
        let uk_town_or_city =
            check_optional_text(FieldKey::UkTownOrCity, &self.uk_town_or_city, &mut errors);
        let uk_postcode =
            check_optional_text(FieldKey::UkPostcode, &self.uk_postcode, &mut errors);
        let uk_mobile_number = check_optional_text(
            FieldKey::UkMobileNumber,
            &self.uk_mobile_number,
            &mut errors,
        );
        let uk_email = check_optional_text(FieldKey::UkEmail, &self.uk_email, &mut errors);

        let (
            Some(visa_category),
            Some(uk_address_1),
            Some(uk_address_2),
            Some(uk_address_3),
            Some(uk_town_or_city),
            Some(uk_postcode),
            Some(uk_mobile_number),
            Some(uk_email),
        ) = (
            visa_category,
            uk_address_1,
            uk_address_2,
            uk_address_3,
            uk_town_or_city,
            uk_postcode,
            uk_mobile_number,
            uk_email,
        )
        else {
            return Err(errors);
        };

        Ok(TravelInformation {
            visa_category,
            uk_address_1,
            uk_address_2,
            uk_address_3,
            uk_town_or_city,
            uk_postcode,
            uk_mobile_number,
            uk_email,
        })
    }
}

/// Medical history and TB symptom answers.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalHistoryForm {
    pub completion_date: DateParts,
    pub age: String,
    pub tb_symptoms: String,
    pub tb_symptoms_list: Vec<String>,
    pub other_symptoms_detail: String,
    pub under_eleven_conditions: Vec<String>,
    pub under_eleven_conditions_detail: String,
    pub previous_tb: String,
    pub previous_tb_detail: String,
    pub close_contact_with_tb: String,
    pub close_contact_with_tb_detail: String,
    /// Absent where the question did not apply.
    pub pregnant: Option<String>,
    pub menstrual_periods: Option<String>,
    pub physical_exam_notes: String,
}

impl MedicalHistoryForm {
    pub fn validate(&self, today: NaiveDate) -> Result<MedicalHistory, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let completion_date = check_date(
            &self.completion_date,
            DateFieldId::MedicalScreeningDate,
            today,
            &mut errors,
        );
        let age = check_text(FieldKey::Age, &self.age, &mut errors)
            .and_then(|age| match age.parse::<u32>() {
                Ok(age) => Some(age),
                Err(_) => {
                    errors.push(FieldError::new(FieldKey::Age, "Age must contain only numbers."));
                    None
                }
            });
        let tb_symptoms = check_yes_or_no(
            FieldKey::TbSymptoms,
            &self.tb_symptoms,
            "Select whether the applicant has any symptoms of TB.",
            &mut errors,
        );
        let other_symptoms_detail = check_optional_text(
            FieldKey::OtherSymptomsDetail,
            &self.other_symptoms_detail,
            &mut errors,
        );
        let under_eleven_conditions_detail = check_optional_text(
            FieldKey::UnderElevenConditionsDetail,
            &self.under_eleven_conditions_detail,
            &mut errors,
        );
        let previous_tb = check_yes_or_no(
            FieldKey::PreviousTb,
            &self.previous_tb,
            "Select whether the applicant has previously had TB.",
            &mut errors,
        );
        let previous_tb_detail = check_optional_text(
            FieldKey::PreviousTbDetail,
            &self.previous_tb_detail,
            &mut errors,
        );
        let close_contact_with_tb = check_yes_or_no(
            FieldKey::CloseContactWithTb,
            &self.close_contact_with_tb,
            "Select whether the applicant has been in close contact with someone with \
             active pulmonary TB.",
            &mut errors,
        );
        let close_contact_with_tb_detail = check_optional_text(
            FieldKey::CloseContactWithTbDetail,
            &self.close_contact_with_tb_detail,
            &mut errors,
        );
        let pregnant = match &self.pregnant {
            None => Some(None),
            Some(raw) => check_yes_or_no(
                FieldKey::Pregnant,
                raw,
                "Select whether the applicant is pregnant.",
                &mut errors,
            )
            .map(Some),
        };
        let menstrual_periods = match &self.menstrual_periods {
            None => Some(None),
            Some(raw) => check_yes_or_no(
                FieldKey::MenstrualPeriods,
                raw,
                "Select whether the applicant has menstrual periods.",
                &mut errors,
            )
            .map(Some),
        };
        let physical_exam_notes = check_optional_text(
            FieldKey::PhysicalExamNotes,
            &self.physical_exam_notes,
            &mut errors,
        );

        let (
            Some(completion_date),
            Some(age),
            Some(tb_symptoms),
            Some(other_symptoms_detail),
            Some(under_eleven_conditions_detail),
            Some(previous_tb),
            Some(previous_tb_detail),
            Some(close_contact_with_tb),
            Some(close_contact_with_tb_detail),
            Some(pregnant),
            Some(menstrual_periods),
            Some(physical_exam_notes),
        ) = (
            completion_date,
            age,
            tb_symptoms,
            other_symptoms_detail,
            under_eleven_conditions_detail,
            previous_tb,
            previous_tb_detail,
            close_contact_with_tb,
            close_contact_with_tb_detail,
            pregnant,
            menstrual_periods,
            physical_exam_notes,
        )
        else {
            return Err(errors);
        };

        Ok(MedicalHistory {
            completion_date,
            age,
            tb_symptoms,
            tb_symptoms_list: self.tb_symptoms_list.clone(),
            other_symptoms_detail,
            under_eleven_conditions: self.under_eleven_conditions.clone(),
            under_eleven_conditions_detail,
            previous_tb,
            previous_tb_detail,
            close_contact_with_tb,
            close_contact_with_tb_detail,
            pregnant,
            menstrual_periods,
            physical_exam_notes,
        })
    }
}

/// Chest X-ray upload details. File handling happens elsewhere; only the
/// recorded file names and the date taken arrive here.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ChestXrayForm {
    pub date_taken: DateParts,
    pub postero_anterior_file: String,
    pub apical_lordotic_file: Option<String>,
    pub lateral_decubitus_file: Option<String>,
}

impl ChestXrayForm {
    pub fn validate(&self, today: NaiveDate) -> Result<ChestXrayImages, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let date_taken = check_date(&self.date_taken, DateFieldId::XrayDate, today, &mut errors);
        if self.postero_anterior_file.is_empty() {
            errors.push(FieldError::new(
                FieldKey::PosteroAnteriorXray,
                "Select the postero-anterior X-ray image.",
            ));
        }

        let Some(date_taken) = date_taken else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ChestXrayImages {
            postero_anterior_file: self.postero_anterior_file.clone(),
            apical_lordotic_file: self.apical_lordotic_file.clone(),
            lateral_decubitus_file: self.lateral_decubitus_file.clone(),
            date_taken,
        })
    }
}

/// Radiological findings recorded after reviewing the images.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RadiologicalOutcomeForm {
    pub result: String,
    pub result_detail: String,
    pub minor_findings: Vec<String>,
}

impl RadiologicalOutcomeForm {
    pub fn validate(&self) -> Result<RadiologicalFindings, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.result.is_empty() {
            errors.push(FieldError::new(
                FieldKey::XrayResult,
                "Select the result of the X-ray.",
            ));
        }
        let result_detail = check_optional_text(
            FieldKey::XrayResultDetail,
            &self.result_detail,
            &mut errors,
        );

        let Some(result_detail) = result_detail else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(RadiologicalFindings {
            result: self.result.clone(),
            result_detail,
            minor_findings: self.minor_findings.clone(),
        })
    }
}

/// The recorded reason an X-ray was not taken.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct XrayNotTakenForm {
    pub reason: String,
    pub further_details: String,
}

impl XrayNotTakenForm {
    pub fn validate(&self) -> Result<XrayNotTaken, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let reason = match self.reason.as_str() {
            "Child" => Some(XrayNotTakenReason::Child),
            "Pregnant" => Some(XrayNotTakenReason::Pregnant),
            "Other" => Some(XrayNotTakenReason::Other),
            _ => {
                errors.push(FieldError::new(
                    FieldKey::ReasonXrayNotTaken,
                    "Select the reason an X-ray was not taken.",
                ));
                None
            }
        };
        let further_details = check_optional_text(
            FieldKey::XrayNotTakenFurtherDetails,
            &self.further_details,
            &mut errors,
        );

        let (Some(reason), Some(further_details)) = (reason, further_details) else {
            return Err(errors);
        };

        // Free-text elaboration is carried only for the "Other" reason.
        let further_details = match reason {
            XrayNotTakenReason::Other => further_details,
            _ => None,
        };

        Ok(XrayNotTaken {
            reason,
            further_details,
        })
    }
}

/// The clinician's answer to the dedicated sputum decision question.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SputumDecisionForm {
    pub sputum_required: String,
}

impl SputumDecisionForm {
    pub fn validate(&self) -> Result<YesOrNo, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let answer = check_yes_or_no(
            FieldKey::SputumRequired,
            &self.sputum_required,
            "Select whether sputum samples are required.",
            &mut errors,
        );
        answer.ok_or(errors)
    }
}

/// One sputum sample's collection details. Laboratory results may be left
/// blank at collection and confirmed later.
#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SputumSampleForm {
    #[schema(value_type = u8)]
    pub sample: SampleNumber,
    #[serde(default)]
    pub collection_date: DateParts,
    #[serde(default)]
    pub collection_method: String,
    #[serde(default)]
    pub smear_result: String,
    #[serde(default)]
    pub culture_result: String,
}

impl SputumSampleForm {
    pub fn validate(&self, today: NaiveDate) -> Result<SputumSample, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let collection_date = check_date(
            &self.collection_date,
            DateFieldId::SputumSampleDate(self.sample),
            today,
            &mut errors,
        );
        let collection_method = check_text(
            FieldKey::SampleCollectionMethod(self.sample),
            &self.collection_method,
            &mut errors,
        );
        let smear_result = if self.smear_result.is_empty() {
            Some(None)
        } else {
            check_sample_result(
                FieldKey::SampleSmearResult(self.sample),
                &self.smear_result,
                "Select result of smear test",
                &mut errors,
            )
            .map(Some)
        };
        let culture_result = if self.culture_result.is_empty() {
            Some(None)
        } else {
            check_sample_result(
                FieldKey::SampleCultureResult(self.sample),
                &self.culture_result,
                "Select result of culture test",
                &mut errors,
            )
            .map(Some)
        };

        let (
            Some(collection_date),
            Some(collection_method),
            Some(smear_result),
            Some(culture_result),
        ) = (collection_date, collection_method, smear_result, culture_result)
        else {
            return Err(errors);
        };

        Ok(SputumSample {
            collection_date,
            collection_method,
            smear_result,
            culture_result,
        })
    }
}

/// Laboratory results confirmed for an already-collected sample. Both
/// results are mandatory here.
#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SputumResultsForm {
    #[schema(value_type = u8)]
    pub sample: SampleNumber,
    #[serde(default)]
    pub smear_result: String,
    #[serde(default)]
    pub culture_result: String,
}

impl SputumResultsForm {
    pub fn validate(&self) -> Result<(SampleResult, SampleResult), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let smear = check_sample_result(
            FieldKey::SampleSmearResult(self.sample),
            &self.smear_result,
            "Select result of smear test",
            &mut errors,
        );
        let culture = check_sample_result(
            FieldKey::SampleCultureResult(self.sample),
            &self.culture_result,
            "Select result of culture test",
            &mut errors,
        );

        let (Some(smear), Some(culture)) = (smear, culture) else {
            return Err(errors);
        };
        Ok((smear, culture))
    }
}

/// The certificate issuing decision. Certificate fields are required only
/// when issuing; the refusal reason only when not.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateOutcomeForm {
    pub is_issued: String,
    pub certificate_date: DateParts,
    pub certificate_number: String,
    pub physician_name: String,
    pub reason_not_issued: String,
    pub physician_comments: String,
}

/// The validated certificate decision, before the certificate itself is
/// constructed against the record.
#[derive(Debug)]
pub enum CertificateDecision {
    Issue {
        certificate_number: String,
        issue_date: NaiveDate,
        physician_name: String,
        comments: Option<String>,
    },
    Refuse {
        reason: String,
        physician_name: String,
        comments: Option<String>,
    },
}

impl CertificateOutcomeForm {
    pub fn validate(&self, today: NaiveDate) -> Result<CertificateDecision, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let is_issued = check_yes_or_no(
            FieldKey::IsIssued,
            &self.is_issued,
            "Select whether a TB clearance certificate has been issued.",
            &mut errors,
        );
        let Some(is_issued) = is_issued else {
            return Err(errors);
        };

        let physician_name =
            check_text(FieldKey::PhysicianName, &self.physician_name, &mut errors);
        let comments = check_optional_text(
            FieldKey::PhysicianComments,
            &self.physician_comments,
            &mut errors,
        );

        match is_issued {
            YesOrNo::Yes => {
                let issue_date = check_date(
                    &self.certificate_date,
                    DateFieldId::CertificateDate,
                    today,
                    &mut errors,
                );
                let certificate_number = check_text(
                    FieldKey::CertificateNumber,
                    &self.certificate_number,
                    &mut errors,
                );

                let (
                    Some(issue_date),
                    Some(certificate_number),
                    Some(physician_name),
                    Some(comments),
                ) = (issue_date, certificate_number, physician_name, comments)
                else {
                    return Err(errors);
                };

                Ok(CertificateDecision::Issue {
                    certificate_number,
                    issue_date,
                    physician_name,
                    comments,
                })
            }
            YesOrNo::No => {
                if self.reason_not_issued.is_empty() {
                    errors.push(FieldError::new(
                        FieldKey::ReasonNotIssued,
                        "Enter the reason a certificate has not been issued.",
                    ));
                }

                let (Some(physician_name), Some(comments)) = (physician_name, comments) else {
                    return Err(errors);
                };
                if !errors.is_empty() {
                    return Err(errors);
                }

                Ok(CertificateDecision::Refuse {
                    reason: self.reason_not_issued.clone(),
                    physician_name,
                    comments,
                })
            }
        }
    }
}

/// One workflow section submission, tagged by section.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "section", rename_all = "camelCase")]
pub enum SectionSubmission {
    ApplicantDetails(ApplicantDetailsForm),
    TravelInformation(TravelInformationForm),
    MedicalHistory(MedicalHistoryForm),
    ChestXray(ChestXrayForm),
    RadiologicalOutcome(RadiologicalOutcomeForm),
    XrayNotTaken(XrayNotTakenForm),
    SputumDecision(SputumDecisionForm),
    SputumSample(SputumSampleForm),
    SputumResults(SputumResultsForm),
    CertificateOutcome(CertificateOutcomeForm),
}

impl SectionSubmission {
    /// The workflow task this section belongs to.
    pub fn task(&self) -> TaskId {
        match self {
            SectionSubmission::ApplicantDetails(_) => TaskId::VisaApplicantDetails,
            SectionSubmission::TravelInformation(_) => TaskId::TravelInformation,
            SectionSubmission::MedicalHistory(_) => TaskId::MedicalHistory,
            SectionSubmission::ChestXray(_)
            | SectionSubmission::RadiologicalOutcome(_)
            | SectionSubmission::XrayNotTaken(_) => TaskId::ChestXray,
            SectionSubmission::SputumDecision(_)
            | SectionSubmission::SputumSample(_)
            | SectionSubmission::SputumResults(_) => TaskId::SputumCollection,
            SectionSubmission::CertificateOutcome(_) => TaskId::TbCertificate,
        }
    }
}

fn out_of_order(task: TaskId) -> ScreeningError {
    debug!(%task, "submission rejected: task not yet available");
    ScreeningError::SubmissionOutOfOrder { task }
}

/// Validates a section submission against the record's current state and,
/// on success, merges it in.
///
/// The task the section belongs to must be available: `CannotStartYet` and
/// `NotRequired` both reject the submission as out of order, except that
/// the X-ray not-taken reason records against a `NotRequired` X-ray task
/// and the sputum decision question follows its own availability rule.
/// Validation failures carry every failing field of the section.
pub fn apply_submission(
    record: &mut ScreeningRecord,
    submission: &SectionSubmission,
    today: NaiveDate,
) -> ScreeningResult<()> {
    let decision = decide(record, today);
    let statuses = derive_statuses(record, &decision);
    let task = submission.task();
    let status = statuses[&task];
    match submission {
        // The decision question answers before the sputum task can hold any
        // other status, so it is gated on its own availability rule.
        SectionSubmission::SputumDecision(_) => {
            if !sputum_question_available(record, statuses[&TaskId::ChestXray]) {
                return Err(out_of_order(task));
            }
        }
        // A not-required X-ray is exactly when the Child/Pregnant reasons
        // apply, so the not-taken reason must still be recordable then.
        SectionSubmission::XrayNotTaken(_) => {
            if status == TaskStatus::CannotStartYet {
                return Err(out_of_order(task));
            }
        }
        _ => {
            if status == TaskStatus::CannotStartYet || status == TaskStatus::NotRequired {
                return Err(out_of_order(task));
            }
        }
    }

    match submission {
        SectionSubmission::ApplicantDetails(form) => {
            record.applicant = Some(form.validate(today).map_err(ScreeningError::Validation)?);
        }
        SectionSubmission::TravelInformation(form) => {
            record.travel = Some(form.validate().map_err(ScreeningError::Validation)?);
        }
        SectionSubmission::MedicalHistory(form) => {
            record.medical_history =
                Some(form.validate(today).map_err(ScreeningError::Validation)?);
        }
        SectionSubmission::ChestXray(form) => {
            record.chest_xray = Some(form.validate(today).map_err(ScreeningError::Validation)?);
        }
        SectionSubmission::RadiologicalOutcome(form) => {
            let findings = form.validate().map_err(ScreeningError::Validation)?;
            record.xray_outcome = Some(XrayOutcome::Findings(findings));
        }
        SectionSubmission::XrayNotTaken(form) => {
            let not_taken = form.validate().map_err(ScreeningError::Validation)?;
            record.xray_outcome = Some(XrayOutcome::NotTaken(not_taken));
        }
        SectionSubmission::SputumDecision(form) => {
            record.sputum_required =
                Some(form.validate().map_err(ScreeningError::Validation)?);
        }
        SectionSubmission::SputumSample(form) => {
            if record.sputum_required != Some(YesOrNo::Yes) {
                return Err(out_of_order(TaskId::SputumCollection));
            }
            let sample = form.validate(today).map_err(ScreeningError::Validation)?;
            record.set_sample(form.sample, sample);
        }
        SectionSubmission::SputumResults(form) => {
            let (smear, culture) = form.validate().map_err(ScreeningError::Validation)?;
            let Some(sample) = record.sample_mut(form.sample) else {
                return Err(out_of_order(TaskId::SputumCollection));
            };
            sample.smear_result = Some(smear);
            sample.culture_result = Some(culture);
        }
        SectionSubmission::CertificateOutcome(form) => {
            let outcome = match form.validate(today).map_err(ScreeningError::Validation)? {
                CertificateDecision::Issue {
                    certificate_number,
                    issue_date,
                    physician_name,
                    comments,
                } => CertificateOutcome::Issued(TbCertificate::issue(
                    certificate_number,
                    issue_date,
                    physician_name,
                    comments,
                    record.close_contact_with_tb(),
                )?),
                CertificateDecision::Refuse {
                    reason,
                    physician_name,
                    comments,
                } => CertificateOutcome::NotIssued {
                    reason,
                    physician_name,
                    comments,
                },
            };
            record.certificate_outcome = Some(outcome);
        }
    }

    debug!(%task, "section merged into record");
    Ok(())
}
