//! Date field validation and normalization.
//!
//! Screening forms capture dates as separate day/month/year text inputs. This
//! module canonicalises those triples into a [`chrono::NaiveDate`] and
//! produces the exact error-catalogue sentences when they cannot be. The
//! month input is tolerant: full month names, three-letter abbreviations
//! (case-insensitive), and padded or unpadded numerals are all accepted. Day
//! and year must be purely numeric.

use chrono::NaiveDate;
use pets_types::{FieldError, FieldKey, SampleNumber};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raw day/month/year tokens as captured by a date input, prior to
/// normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateParts {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub year: String,
}

impl DateParts {
    pub fn new(day: impl Into<String>, month: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            month: month.into(),
            year: year.into(),
        }
    }
}

/// Whether a date field carries a temporal business rule on top of basic
/// calendar validity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateBound {
    None,
    TodayOrPast,
    Future,
}

/// The date fields of the screening workflow. Each carries its own entry
/// name (used to compose error messages), error-summary key, and temporal
/// bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateFieldId {
    DateOfBirth,
    PassportIssueDate,
    PassportExpiryDate,
    MedicalScreeningDate,
    XrayDate,
    SputumSampleDate(SampleNumber),
    CertificateDate,
}

impl DateFieldId {
    pub fn key(self) -> FieldKey {
        match self {
            DateFieldId::DateOfBirth => FieldKey::DateOfBirth,
            DateFieldId::PassportIssueDate => FieldKey::PassportIssueDate,
            DateFieldId::PassportExpiryDate => FieldKey::PassportExpiryDate,
            DateFieldId::MedicalScreeningDate => FieldKey::MedicalScreeningDate,
            DateFieldId::XrayDate => FieldKey::DateXrayTaken,
            DateFieldId::SputumSampleDate(n) => FieldKey::SampleDate(n),
            DateFieldId::CertificateDate => FieldKey::CertificateDate,
        }
    }

    /// Human-readable entry name used as the subject of every message for
    /// this field.
    pub fn entry_name(self) -> String {
        match self {
            DateFieldId::DateOfBirth => "Date of birth".into(),
            DateFieldId::PassportIssueDate => "Passport issue date".into(),
            DateFieldId::PassportExpiryDate => "Passport expiry date".into(),
            DateFieldId::MedicalScreeningDate => {
                "The date the medical screening took place".into()
            }
            DateFieldId::XrayDate => "The date the X-ray was taken".into(),
            DateFieldId::SputumSampleDate(n) => format!("Sputum sample {n} date"),
            DateFieldId::CertificateDate => "TB clearance certificate date".into(),
        }
    }

    pub fn bound(self) -> DateBound {
        match self {
            DateFieldId::PassportExpiryDate => DateBound::Future,
            _ => DateBound::TodayOrPast,
        }
    }
}

const MONTH_NAMES: [(&str, &str, u32); 12] = [
    ("january", "jan", 1),
    ("february", "feb", 2),
    ("march", "mar", 3),
    ("april", "apr", 4),
    ("may", "may", 5),
    ("june", "jun", 6),
    ("july", "jul", 7),
    ("august", "aug", 8),
    ("september", "sep", 9),
    ("october", "oct", 10),
    ("november", "nov", 11),
    ("december", "dec", 12),
];

fn month_name_number(token: &str) -> Option<u32> {
    let lowered = token.to_ascii_lowercase();
    MONTH_NAMES
        .iter()
        .find(|(full, abbrev, _)| lowered == *full || lowered == *abbrev)
        .map(|(_, _, n)| *n)
}

/// Canonicalises a day or month token to a stable two-digit numeric form.
///
/// Single-digit numerals gain a leading zero and recognised month names map
/// to their number; anything else passes through unchanged, so the function
/// is total and idempotent.
pub fn standardise_day_or_month(token: &str) -> String {
    if let Some(n) = month_name_number(token) {
        return format!("{n:02}");
    }
    if token.len() == 1 && token.bytes().all(|b| b.is_ascii_digit()) {
        return format!("0{token}");
    }
    token.to_string()
}

fn all_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Message naming exactly the missing parts, in day -> month -> year order.
///
/// When everything is missing the full sentence carries a terminating stop;
/// partial messages do not. That asymmetry is part of the displayed contract.
fn missing_parts_message(entry_name: &str, missing: &[&str]) -> String {
    match missing {
        [a] => format!("{entry_name} must include a {a}"),
        [a, b] => format!("{entry_name} must include a {a} and {b}"),
        _ => format!("{entry_name} must include a day, month and year."),
    }
}

fn is_valid_calendar_date(day: u32, month: u32, year: i32) -> bool {
    if year <= 1900 || year >= 2100 {
        return false;
    }
    if !(1..=31).contains(&day) {
        return false;
    }
    // Year-divisible-by-four leap rule, as the service has always behaved.
    // The permitted year range contains no centurial-exception years.
    let february_cap = if year % 4 == 0 { 29 } else { 28 };
    match month {
        2 => day <= february_cap,
        4 | 6 | 9 | 11 => day <= 30,
        _ => true,
    }
}

/// Validates a day/month/year triple against the field's rules and returns
/// the canonical date.
///
/// Rules apply in priority order: missing parts, invalid characters (with
/// the accepted month formats explained), calendar validity, then the
/// field's temporal bound relative to `today`. Exactly one message is
/// produced for a failing field.
pub fn validate_date(
    parts: &DateParts,
    field: DateFieldId,
    today: NaiveDate,
) -> Result<NaiveDate, FieldError> {
    let entry_name = field.entry_name();
    let fail = |message: String| FieldError::new(field.key(), message);

    let mut missing = Vec::new();
    if parts.day.is_empty() {
        missing.push("day");
    }
    if parts.month.is_empty() {
        missing.push("month");
    }
    if parts.year.is_empty() {
        missing.push("year");
    }
    if !missing.is_empty() {
        return Err(fail(missing_parts_message(&entry_name, &missing)));
    }

    // A numeric month that is out of range is a bad date, not bad characters.
    let month_is_recognised = all_digits(&parts.month) || month_name_number(&parts.month).is_some();
    if !all_digits(&parts.day) || !all_digits(&parts.year) || !month_is_recognised {
        return Err(fail(format!(
            "{entry_name} day and year must contain only numbers. {entry_name} month must be \
             a number, or the name of the month, or the first three letters of the month."
        )));
    }

    let invalid_date = || fail(format!("{entry_name} must be a valid date."));
    let month = match month_name_number(&parts.month) {
        Some(n) => n,
        None => parts.month.parse().map_err(|_| invalid_date())?,
    };
    let day: u32 = parts.day.parse().map_err(|_| invalid_date())?;
    let year: i32 = parts.year.parse().map_err(|_| invalid_date())?;
    if !(1..=12).contains(&month) || !is_valid_calendar_date(day, month, year) {
        return Err(invalid_date());
    }
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid_date)?;

    match field.bound() {
        DateBound::TodayOrPast if date > today => Err(fail(format!(
            "{entry_name} must be today or in the past."
        ))),
        DateBound::Future if date <= today => {
            Err(fail(format!("{entry_name} must be in the future.")))
        }
        _ => Ok(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn today() -> NaiveDate {
        date(2025, 6, 15)
    }

    fn message(parts: DateParts, field: DateFieldId) -> String {
        validate_date(&parts, field, today())
            .expect_err("expected a validation failure")
            .message
    }

    #[test]
    fn fully_empty_input_reports_all_three_parts() {
        assert_eq!(
            message(DateParts::default(), DateFieldId::DateOfBirth),
            "Date of birth must include a day, month and year."
        );
        assert_eq!(
            message(DateParts::default(), DateFieldId::CertificateDate),
            "TB clearance certificate date must include a day, month and year."
        );
    }

    #[test]
    fn partial_input_names_the_missing_parts_in_order() {
        let cases = [
            (DateParts::new("", "3", "1990"), "Date of birth must include a day"),
            (DateParts::new("12", "", "1990"), "Date of birth must include a month"),
            (DateParts::new("12", "3", ""), "Date of birth must include a year"),
            (DateParts::new("", "", "1990"), "Date of birth must include a day and month"),
            (DateParts::new("", "3", ""), "Date of birth must include a day and year"),
            (DateParts::new("12", "", ""), "Date of birth must include a month and year"),
        ];
        for (parts, expected) in cases {
            assert_eq!(message(parts, DateFieldId::DateOfBirth), expected);
        }
    }

    #[test]
    fn non_numeric_day_or_year_explains_accepted_month_formats() {
        let expected = "Date of birth day and year must contain only numbers. Date of birth \
                        month must be a number, or the name of the month, or the first three \
                        letters of the month.";
        assert_eq!(
            message(DateParts::new("1st", "3", "1990"), DateFieldId::DateOfBirth),
            expected
        );
        assert_eq!(
            message(DateParts::new("12", "3", "199O"), DateFieldId::DateOfBirth),
            expected
        );
        assert_eq!(
            message(DateParts::new("12", "Mars", "1990"), DateFieldId::DateOfBirth),
            expected
        );
    }

    #[test]
    fn month_parsing_is_tolerant() {
        for month in ["3", "03", "March", "march", "MAR", "mar"] {
            let parsed = validate_date(
                &DateParts::new("19", month, "1990"),
                DateFieldId::DateOfBirth,
                today(),
            )
            .expect("valid date");
            assert_eq!(parsed, date(1990, 3, 19));
        }
    }

    #[test]
    fn numeric_day_out_of_range_is_an_invalid_date_not_invalid_characters() {
        assert_eq!(
            message(DateParts::new("32", "3", "1990"), DateFieldId::DateOfBirth),
            "Date of birth must be a valid date."
        );
        assert_eq!(
            message(DateParts::new("0", "3", "1990"), DateFieldId::DateOfBirth),
            "Date of birth must be a valid date."
        );
        assert_eq!(
            message(DateParts::new("12", "13", "1990"), DateFieldId::DateOfBirth),
            "Date of birth must be a valid date."
        );
    }

    #[test]
    fn per_month_day_caps_are_enforced() {
        assert!(validate_date(
            &DateParts::new("31", "April", "1990"),
            DateFieldId::DateOfBirth,
            today()
        )
        .is_err());
        assert!(validate_date(
            &DateParts::new("30", "jun", "1990"),
            DateFieldId::DateOfBirth,
            today()
        )
        .is_ok());
    }

    #[test]
    fn february_uses_the_divisible_by_four_leap_rule() {
        assert!(validate_date(
            &DateParts::new("29", "2", "2024"),
            DateFieldId::DateOfBirth,
            today()
        )
        .is_ok());
        assert_eq!(
            message(DateParts::new("29", "2", "2023"), DateFieldId::DateOfBirth),
            "Date of birth must be a valid date."
        );
        assert_eq!(
            message(DateParts::new("30", "feb", "2024"), DateFieldId::DateOfBirth),
            "Date of birth must be a valid date."
        );
    }

    #[test]
    fn year_must_lie_strictly_between_1900_and_2100() {
        assert!(validate_date(
            &DateParts::new("1", "1", "1901"),
            DateFieldId::DateOfBirth,
            today()
        )
        .is_ok());
        assert_eq!(
            message(DateParts::new("1", "1", "1900"), DateFieldId::DateOfBirth),
            "Date of birth must be a valid date."
        );
        assert_eq!(
            message(DateParts::new("1", "1", "2100"), DateFieldId::PassportExpiryDate),
            "Passport expiry date must be a valid date."
        );
    }

    #[test]
    fn temporal_bounds_apply_after_basic_validity() {
        assert_eq!(
            message(
                DateParts::new("16", "6", "2025"),
                DateFieldId::SputumSampleDate(SampleNumber::One)
            ),
            "Sputum sample 1 date must be today or in the past."
        );
        // Today itself satisfies a today-or-past bound.
        assert!(validate_date(
            &DateParts::new("15", "6", "2025"),
            DateFieldId::SputumSampleDate(SampleNumber::One),
            today()
        )
        .is_ok());
        assert_eq!(
            message(DateParts::new("15", "6", "2025"), DateFieldId::PassportExpiryDate),
            "Passport expiry date must be in the future."
        );
        assert!(validate_date(
            &DateParts::new("16", "6", "2025"),
            DateFieldId::PassportExpiryDate,
            today()
        )
        .is_ok());
    }

    #[test]
    fn standardise_day_or_month_pads_and_maps_months() {
        for (input, expected) in [
            ("1", "01"),
            ("9", "09"),
            ("10", "10"),
            ("31", "31"),
            ("01", "01"),
            ("jan", "01"),
            ("January", "01"),
            ("FEB", "02"),
            ("september", "09"),
            ("dec", "12"),
        ] {
            assert_eq!(standardise_day_or_month(input), expected);
        }
    }

    #[test]
    fn standardise_day_or_month_is_total_and_idempotent() {
        for input in ["1", "09", "31", "march", "Sep", "not-a-month", ""] {
            let once = standardise_day_or_month(input);
            assert_eq!(standardise_day_or_month(&once), once);
        }
        assert_eq!(standardise_day_or_month("not-a-month"), "not-a-month");
    }

    #[test]
    fn normalized_dates_round_trip_to_their_parts() {
        let parsed = validate_date(
            &DateParts::new("19", "march", "1990"),
            DateFieldId::DateOfBirth,
            today(),
        )
        .expect("valid date");
        use chrono::Datelike;
        assert_eq!(
            (parsed.day(), parsed.month(), parsed.year()),
            (19, 3, 1990)
        );
    }
}
