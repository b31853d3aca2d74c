//! Shared field-naming contract for the PETS screening service.
//!
//! Every screening form field has a logical key used when submitting data and
//! a UI component identifier used when reporting errors. The external UI
//! anchors its error-summary links to the component identifier, so the mapping
//! here is part of the external contract and must stay stable.
//!
//! Key types:
//! - [`FieldKey`]: closed enumeration of every validated form field.
//! - [`SampleNumber`]: which of the three sputum samples a field belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one of the three sputum samples collected during screening.
///
/// Serialised as the plain sample number (`1`, `2` or `3`) on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SampleNumber {
    One,
    Two,
    Three,
}

impl SampleNumber {
    pub const ALL: [SampleNumber; 3] = [SampleNumber::One, SampleNumber::Two, SampleNumber::Three];

    /// Zero-based index, suitable for indexing the sample array.
    pub fn index(self) -> usize {
        match self {
            SampleNumber::One => 0,
            SampleNumber::Two => 1,
            SampleNumber::Three => 2,
        }
    }

    /// One-based number as presented to clinic staff.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl TryFrom<u8> for SampleNumber {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SampleNumber::One),
            2 => Ok(SampleNumber::Two),
            3 => Ok(SampleNumber::Three),
            other => Err(format!("sample number must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<SampleNumber> for u8 {
    fn from(value: SampleNumber) -> u8 {
        value.number()
    }
}

impl fmt::Display for SampleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Logical key of a validated screening form field.
///
/// The variants form a closed set: validation rules are registered per key
/// rather than dispatched through string lookups, and every error a validator
/// produces is attributed to exactly one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKey {
    // Visa applicant details
    FullName,
    Sex,
    DateOfBirth,
    CountryOfNationality,
    PassportNumber,
    CountryOfIssue,
    PassportIssueDate,
    PassportExpiryDate,
    HomeAddress1,
    HomeAddress2,
    HomeAddress3,
    TownOrCity,
    ProvinceOrState,
    Country,
    Postcode,
    ApplicantPhoto,

    // UK travel information
    VisaCategory,
    UkAddress1,
    UkAddress2,
    UkAddress3,
    UkTownOrCity,
    UkPostcode,
    UkMobileNumber,
    UkEmail,

    // Medical history and TB symptoms
    MedicalScreeningDate,
    Age,
    TbSymptoms,
    TbSymptomsList,
    OtherSymptomsDetail,
    UnderElevenConditions,
    UnderElevenConditionsDetail,
    PreviousTb,
    PreviousTbDetail,
    CloseContactWithTb,
    CloseContactWithTbDetail,
    Pregnant,
    MenstrualPeriods,
    PhysicalExamNotes,

    // Chest X-ray and radiological outcome
    ChestXrayTaken,
    DateXrayTaken,
    PosteroAnteriorXray,
    ApicalLordoticXray,
    LateralDecubitusXray,
    XrayResult,
    XrayResultDetail,
    XrayMinorFindings,
    ReasonXrayNotTaken,
    XrayNotTakenFurtherDetails,

    // Sputum decision, collection and results
    SputumRequired,
    SampleDate(SampleNumber),
    SampleCollectionMethod(SampleNumber),
    SampleSmearResult(SampleNumber),
    SampleCultureResult(SampleNumber),

    // TB certificate outcome
    IsIssued,
    CertificateDate,
    CertificateNumber,
    PhysicianName,
    ReasonNotIssued,
    PhysicianComments,
}

impl FieldKey {
    /// UI component identifier the error summary anchors to.
    ///
    /// Identifiers are shared with the external UI layer; two keys may map to
    /// the same identifier when the corresponding inputs live on different
    /// pages (for example home and UK address lines).
    pub fn component_id(&self) -> String {
        match self {
            FieldKey::FullName => "name".into(),
            FieldKey::Sex => "sex".into(),
            FieldKey::DateOfBirth => "birth-date".into(),
            FieldKey::CountryOfNationality => "country-of-nationality".into(),
            FieldKey::PassportNumber => "passport-number".into(),
            FieldKey::CountryOfIssue => "country-of-issue".into(),
            FieldKey::PassportIssueDate => "passport-issue-date".into(),
            FieldKey::PassportExpiryDate => "passport-expiry-date".into(),
            FieldKey::HomeAddress1 => "address-1".into(),
            FieldKey::HomeAddress2 => "address-2".into(),
            FieldKey::HomeAddress3 => "address-3".into(),
            FieldKey::TownOrCity => "town-or-city".into(),
            FieldKey::ProvinceOrState => "province-or-state".into(),
            FieldKey::Country => "address-country".into(),
            FieldKey::Postcode => "postcode".into(),
            FieldKey::ApplicantPhoto => "applicant-photo".into(),
            FieldKey::VisaCategory => "visa-category".into(),
            FieldKey::UkAddress1 => "address-1".into(),
            FieldKey::UkAddress2 => "address-2".into(),
            FieldKey::UkAddress3 => "address-3".into(),
            FieldKey::UkTownOrCity => "town-or-city".into(),
            FieldKey::UkPostcode => "postcode".into(),
            FieldKey::UkMobileNumber => "mobile-number".into(),
            FieldKey::UkEmail => "email".into(),
            FieldKey::MedicalScreeningDate => "medical-screening-completion-date".into(),
            FieldKey::Age => "age".into(),
            FieldKey::TbSymptoms => "tb-symptoms".into(),
            FieldKey::TbSymptomsList => "tb-symptoms-list".into(),
            FieldKey::OtherSymptomsDetail => "other-symptoms-detail".into(),
            FieldKey::UnderElevenConditions => "under-eleven-conditions".into(),
            FieldKey::UnderElevenConditionsDetail => "under-eleven-conditions-detail".into(),
            FieldKey::PreviousTb => "previous-tb".into(),
            FieldKey::PreviousTbDetail => "previous-tb-detail".into(),
            FieldKey::CloseContactWithTb => "close-contact-with-tb".into(),
            FieldKey::CloseContactWithTbDetail => "close-contact-with-tb-detail".into(),
            FieldKey::Pregnant => "pregnant".into(),
            FieldKey::MenstrualPeriods => "menstrual-periods".into(),
            FieldKey::PhysicalExamNotes => "physical-exam-notes".into(),
            FieldKey::ChestXrayTaken => "chest-xray-taken".into(),
            FieldKey::DateXrayTaken => "date-xray-taken".into(),
            FieldKey::PosteroAnteriorXray => "postero-anterior-xray".into(),
            FieldKey::ApicalLordoticXray => "apical-lordotic-xray".into(),
            FieldKey::LateralDecubitusXray => "lateral-decubitus-xray".into(),
            FieldKey::XrayResult => "xray-result".into(),
            FieldKey::XrayResultDetail => "xray-result-detail".into(),
            FieldKey::XrayMinorFindings => "xray-minor-findings".into(),
            FieldKey::ReasonXrayNotTaken => "reason-xray-not-taken".into(),
            FieldKey::XrayNotTakenFurtherDetails => "xray-not-taken-further-details".into(),
            FieldKey::SputumRequired => "sputum-required".into(),
            FieldKey::SampleDate(n) => format!("date-sample-{n}-taken"),
            FieldKey::SampleCollectionMethod(n) => format!("collection-method-sample-{n}"),
            FieldKey::SampleSmearResult(n) => format!("sample{n}-smear-result"),
            FieldKey::SampleCultureResult(n) => format!("sample{n}-culture-result"),
            FieldKey::IsIssued => "tb-clearance-issued".into(),
            FieldKey::CertificateDate => "tb-certificate-date".into(),
            FieldKey::CertificateNumber => "tb-certificate-number".into(),
            FieldKey::PhysicianName => "physician-name".into(),
            FieldKey::ReasonNotIssued => "reason-not-issued".into(),
            FieldKey::PhysicianComments => "physician-comments".into(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.component_id())
    }
}

/// A single field-attributable validation failure.
///
/// The message is one of the pre-defined sentences from the error catalogue
/// and is displayed verbatim by the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub key: FieldKey,
    pub message: String,
}

impl FieldError {
    pub fn new(key: FieldKey, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("FieldError", 2)?;
        s.serialize_field("field", &self.key.component_id())?;
        s.serialize_field("message", &self.message)?;
        s.end()
    }
}

/// Aggregated validation failures for one form submission.
///
/// Errors are collected per field rather than short-circuited at the first
/// failure, so a single submission attempt reports every problem at once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Message recorded for the given field, if any.
    pub fn message_for(&self, key: FieldKey) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.key.component_id(), error.message)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_numbers_round_trip_through_u8() {
        for n in SampleNumber::ALL {
            let raw: u8 = n.into();
            assert_eq!(SampleNumber::try_from(raw), Ok(n));
        }
        assert!(SampleNumber::try_from(0).is_err());
        assert!(SampleNumber::try_from(4).is_err());
    }

    #[test]
    fn sample_field_keys_embed_the_sample_number() {
        assert_eq!(
            FieldKey::SampleDate(SampleNumber::One).component_id(),
            "date-sample-1-taken"
        );
        assert_eq!(
            FieldKey::SampleCollectionMethod(SampleNumber::Two).component_id(),
            "collection-method-sample-2"
        );
        assert_eq!(
            FieldKey::SampleSmearResult(SampleNumber::Three).component_id(),
            "sample3-smear-result"
        );
        assert_eq!(
            FieldKey::SampleCultureResult(SampleNumber::One).component_id(),
            "sample1-culture-result"
        );
    }

    #[test]
    fn field_errors_serialise_with_component_id_anchor() {
        let error = FieldError::new(FieldKey::FullName, "Full name must contain only letters and spaces.");
        let json = serde_json::to_value(&error).expect("serialises");
        assert_eq!(json["field"], "name");
        assert_eq!(
            json["message"],
            "Full name must contain only letters and spaces."
        );
    }

    #[test]
    fn validation_errors_collect_per_field() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());
        errors.push(FieldError::new(FieldKey::Postcode, "Postcode must contain only letters, numbers and spaces."));
        errors.push(FieldError::new(FieldKey::PassportNumber, "Passport number must contain only letters and numbers."));
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.message_for(FieldKey::Postcode),
            Some("Postcode must contain only letters, numbers and spaces.")
        );
        assert_eq!(errors.message_for(FieldKey::FullName), None);
    }
}
