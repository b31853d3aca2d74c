use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when issuing a TB clearance certificate.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CertificateError {
    #[error("certificate number cannot be empty")]
    EmptyCertificateNumber,
    #[error("declaring physician name cannot be empty")]
    EmptyPhysicianName,
}

/// Validity of a certificate when the applicant has no recorded TB risk
/// factors, in calendar months.
pub const STANDARD_VALIDITY_MONTHS: u32 = 6;

/// Reduced validity applied when the applicant had close contact with a
/// person with active pulmonary TB within the past year.
pub const CLOSE_CONTACT_VALIDITY_MONTHS: u32 = 3;

/// Adds whole calendar months to a date, keeping the day-of-month.
///
/// This is exact calendar arithmetic rather than a fixed day count: 19 March
/// plus six months is 19 September regardless of the lengths of the months in
/// between. When the target month is shorter than the source day the result
/// clamps to the last day of the target month (31 March + 3 months = 30 June).
pub fn add_calendar_months(date: NaiveDate, months: u32) -> NaiveDate {
    let zero_based = date.month0() + months;
    let year = date.year() + (zero_based / 12) as i32;
    let month = zero_based % 12 + 1;

    let mut day = date.day();
    loop {
        if let Some(result) = NaiveDate::from_ymd_opt(year, month, day) {
            return result;
        }
        // Every month has at least 28 days, so this terminates.
        day -= 1;
    }
}

/// Computes the expiry date of a TB clearance certificate.
///
/// Certificates are valid for six calendar months from the issue date, or
/// three when the applicant's medical history recorded close contact with a
/// person with active pulmonary TB.
pub fn expiry_date(issue_date: NaiveDate, close_contact_with_tb: bool) -> NaiveDate {
    let months = if close_contact_with_tb {
        CLOSE_CONTACT_VALIDITY_MONTHS
    } else {
        STANDARD_VALIDITY_MONTHS
    };
    add_calendar_months(issue_date, months)
}

/// An issued TB clearance certificate.
///
/// Created only once the issuing decision answers "Yes". The expiry date is
/// always derived from the issue date and the applicant's close-contact risk
/// factor, never entered manually.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TbCertificate {
    pub certificate_number: String,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub physician_name: String,
    pub comments: Option<String>,
}

impl TbCertificate {
    /// Issues a new certificate, deriving the expiry date from the issue date
    /// and the applicant's close-contact risk factor.
    ///
    /// # Errors
    ///
    /// Returns a `CertificateError` if the certificate number or physician
    /// name is empty or whitespace-only.
    pub fn issue(
        certificate_number: impl Into<String>,
        issue_date: NaiveDate,
        physician_name: impl Into<String>,
        comments: Option<String>,
        close_contact_with_tb: bool,
    ) -> Result<Self, CertificateError> {
        let certificate_number = certificate_number.into();
        if certificate_number.trim().is_empty() {
            return Err(CertificateError::EmptyCertificateNumber);
        }

        let physician_name = physician_name.into();
        if physician_name.trim().is_empty() {
            return Err(CertificateError::EmptyPhysicianName);
        }

        Ok(Self {
            certificate_number,
            issue_date,
            expiry_date: expiry_date(issue_date, close_contact_with_tb),
            physician_name,
            comments,
        })
    }
}
