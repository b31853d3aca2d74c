//! Free-text and identifier field validation.
//!
//! Each form field is validated against a character-class rule registered for
//! its [`FieldKey`]. Rules are checked with plain byte/char whitelists and
//! every failure maps to one fixed sentence from the error catalogue: those
//! sentences are displayed verbatim by the UI and must not be paraphrased.
//! A mandatory field's emptiness always reports before its character rule.

use pets_types::{FieldError, FieldKey};

/// Character classes a text field may be restricted to.
///
/// Each field's rule is independently configured: town names disallow digits
/// while home-address lines allow them, so no rule is shared by assumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterRule {
    LettersAndSpaces,
    LettersAndNumbers,
    LettersNumbersAndSpaces,
    LettersSpacesAndPunctuation,
    LettersNumbersSpacesAndPunctuation,
    NumbersOnly,
    EmailAddress,
}

/// Edge punctuation accepted by the punctuation rules.
fn is_permitted_punctuation(c: char) -> bool {
    matches!(c, ',' | '-' | '/' | '(' | ')' | '\'')
}

fn is_email_shaped(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
    });
    labels_ok && labels.last().is_some_and(|tld| tld.len() >= 2)
}

impl CharacterRule {
    /// Whether every character of `raw` belongs to this rule's class.
    pub fn permits(self, raw: &str) -> bool {
        match self {
            CharacterRule::LettersAndSpaces => raw
                .chars()
                .all(|c| c.is_ascii_alphabetic() || c.is_ascii_whitespace()),
            CharacterRule::LettersAndNumbers => raw.chars().all(|c| c.is_ascii_alphanumeric()),
            CharacterRule::LettersNumbersAndSpaces => raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace()),
            CharacterRule::LettersSpacesAndPunctuation => raw.chars().all(|c| {
                c.is_ascii_alphabetic() || c.is_ascii_whitespace() || is_permitted_punctuation(c)
            }),
            CharacterRule::LettersNumbersSpacesAndPunctuation => raw.chars().all(|c| {
                c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || is_permitted_punctuation(c)
            }),
            CharacterRule::NumbersOnly => raw.bytes().all(|b| b.is_ascii_digit()),
            CharacterRule::EmailAddress => is_email_shaped(raw),
        }
    }
}

/// Validation rule for one text field: a character class, whether the field
/// is mandatory, and the catalogue sentences for each failure.
#[derive(Clone, Copy, Debug)]
pub struct TextRule {
    pub rule: CharacterRule,
    pub mandatory: bool,
    pub empty_message: &'static str,
    pub character_message: &'static str,
}

/// The rule registered for a text field, or `None` for fields that are not
/// free-text validated (dates, radios, checklists).
pub fn text_rule(key: FieldKey) -> Option<TextRule> {
    let rule = match key {
        FieldKey::FullName => TextRule {
            rule: CharacterRule::LettersAndSpaces,
            mandatory: true,
            empty_message: "Enter the applicant's full name.",
            character_message: "Full name must contain only letters and spaces.",
        },
        FieldKey::PassportNumber => TextRule {
            rule: CharacterRule::LettersAndNumbers,
            mandatory: true,
            empty_message: "Enter the applicant's passport number.",
            character_message: "Passport number must contain only letters and numbers.",
        },
        FieldKey::HomeAddress1 => TextRule {
            rule: CharacterRule::LettersNumbersSpacesAndPunctuation,
            mandatory: true,
            empty_message: "Enter the first line of the applicant's home address.",
            character_message:
                "Home address must contain only letters, numbers, spaces and punctuation.",
        },
        FieldKey::HomeAddress2 | FieldKey::HomeAddress3 => TextRule {
            rule: CharacterRule::LettersNumbersSpacesAndPunctuation,
            mandatory: false,
            empty_message: "",
            character_message:
                "Home address must contain only letters, numbers, spaces and punctuation.",
        },
        FieldKey::TownOrCity => TextRule {
            rule: CharacterRule::LettersSpacesAndPunctuation,
            mandatory: true,
            empty_message: "Enter the town or city of the applicant's home address.",
            character_message: "Town name must contain only letters, spaces and punctuation.",
        },
        FieldKey::ProvinceOrState => TextRule {
            rule: CharacterRule::LettersSpacesAndPunctuation,
            mandatory: true,
            empty_message: "Enter the province or state of the applicant's home address.",
            character_message:
                "Province/state name must contain only letters, spaces and punctuation.",
        },
        FieldKey::Country => TextRule {
            rule: CharacterRule::LettersSpacesAndPunctuation,
            mandatory: true,
            empty_message: "Select the country of the applicant's home address.",
            character_message: "Country must contain only letters, spaces and punctuation.",
        },
        FieldKey::CountryOfNationality => TextRule {
            rule: CharacterRule::LettersSpacesAndPunctuation,
            mandatory: true,
            empty_message: "Select the applicant's country of nationality.",
            character_message:
                "Country of nationality must contain only letters, spaces and punctuation.",
        },
        FieldKey::CountryOfIssue => TextRule {
            rule: CharacterRule::LettersSpacesAndPunctuation,
            mandatory: true,
            empty_message: "Select the passport's country of issue.",
            character_message:
                "Country of issue must contain only letters, spaces and punctuation.",
        },
        FieldKey::Postcode => TextRule {
            rule: CharacterRule::LettersNumbersAndSpaces,
            mandatory: false,
            empty_message: "",
            character_message: "Postcode must contain only letters, numbers and spaces.",
        },
        FieldKey::Sex => TextRule {
            rule: CharacterRule::LettersAndSpaces,
            mandatory: true,
            empty_message: "Select the applicant's sex.",
            character_message: "Sex must contain only letters and spaces.",
        },
        FieldKey::VisaCategory => TextRule {
            rule: CharacterRule::LettersNumbersSpacesAndPunctuation,
            mandatory: true,
            empty_message: "Select the applicant's proposed visa category.",
            character_message:
                "Visa category must contain only letters, numbers, spaces and punctuation.",
        },
        FieldKey::UkAddress1 | FieldKey::UkAddress2 | FieldKey::UkAddress3 => TextRule {
            rule: CharacterRule::LettersNumbersSpacesAndPunctuation,
            mandatory: false,
            empty_message: "",
            character_message:
                "UK address must contain only letters, numbers, spaces and punctuation.",
        },
        FieldKey::UkTownOrCity => TextRule {
            rule: CharacterRule::LettersSpacesAndPunctuation,
            mandatory: false,
            empty_message: "",
            character_message: "Town name must contain only letters, spaces and punctuation.",
        },
        FieldKey::UkPostcode => TextRule {
            rule: CharacterRule::LettersNumbersAndSpaces,
            mandatory: false,
            empty_message: "",
            character_message: "Postcode must contain only letters, numbers and spaces.",
        },
        FieldKey::UkMobileNumber => TextRule {
            rule: CharacterRule::NumbersOnly,
            mandatory: false,
            empty_message: "",
            character_message: "UK mobile number must contain only numbers.",
        },
        FieldKey::UkEmail => TextRule {
            rule: CharacterRule::EmailAddress,
            mandatory: false,
            empty_message: "",
            character_message:
                "Enter an email address in the correct format, like name@example.com.",
        },
        FieldKey::Age => TextRule {
            rule: CharacterRule::NumbersOnly,
            mandatory: true,
            empty_message: "Enter the applicant's age.",
            character_message: "Age must contain only numbers.",
        },
        FieldKey::OtherSymptomsDetail
        | FieldKey::UnderElevenConditionsDetail
        | FieldKey::PreviousTbDetail
        | FieldKey::CloseContactWithTbDetail
        | FieldKey::PhysicalExamNotes
        | FieldKey::XrayResultDetail
        | FieldKey::XrayNotTakenFurtherDetails => TextRule {
            rule: CharacterRule::LettersNumbersSpacesAndPunctuation,
            mandatory: false,
            empty_message: "",
            character_message:
                "Further detail must contain only letters, numbers, spaces and punctuation.",
        },
        FieldKey::SampleCollectionMethod(_) => TextRule {
            rule: CharacterRule::LettersSpacesAndPunctuation,
            mandatory: true,
            empty_message: "Select how the sputum sample was collected.",
            character_message:
                "Collection method must contain only letters, spaces and punctuation.",
        },
        FieldKey::CertificateNumber => TextRule {
            rule: CharacterRule::LettersAndNumbers,
            mandatory: true,
            empty_message: "Enter the TB clearance certificate number.",
            character_message:
                "TB clearance certificate number must contain only letters and numbers.",
        },
        FieldKey::PhysicianName => TextRule {
            rule: CharacterRule::LettersAndSpaces,
            mandatory: true,
            empty_message: "Enter the name of the declaring physician.",
            character_message: "Physician name must contain only letters and spaces.",
        },
        FieldKey::PhysicianComments => TextRule {
            rule: CharacterRule::LettersNumbersSpacesAndPunctuation,
            mandatory: false,
            empty_message: "",
            character_message:
                "Physician comments must contain only letters, numbers, spaces and punctuation.",
        },
        _ => return None,
    };
    Some(rule)
}

/// Validates one text field and returns the accepted value.
///
/// Emptiness reports before the character rule; optional fields skip the
/// emptiness check but still apply their character rule when non-empty.
/// Fields with no registered rule are accepted as-is.
pub fn validate_text(key: FieldKey, raw: &str) -> Result<String, FieldError> {
    let Some(rule) = text_rule(key) else {
        return Ok(raw.to_string());
    };

    if raw.is_empty() {
        if rule.mandatory {
            return Err(FieldError::new(key, rule.empty_message));
        }
        return Ok(String::new());
    }

    if !rule.rule.permits(raw) {
        return Err(FieldError::new(key, rule.character_message));
    }

    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pets_types::SampleNumber;

    #[test]
    fn full_name_rejects_digits_and_punctuation() {
        assert!(validate_text(FieldKey::FullName, "Amina Diallo").is_ok());
        for bad in ["Amina3 Diallo", "Amina-Diallo", "Amina_Diallo"] {
            let err = validate_text(FieldKey::FullName, bad).expect_err("should fail");
            assert_eq!(err.message, "Full name must contain only letters and spaces.");
        }
    }

    #[test]
    fn mandatory_emptiness_reports_before_character_class() {
        let err = validate_text(FieldKey::FullName, "").expect_err("should fail");
        assert_eq!(err.message, "Enter the applicant's full name.");
    }

    #[test]
    fn passport_number_is_letters_and_numbers_only() {
        assert!(validate_text(FieldKey::PassportNumber, "AB1234567").is_ok());
        let err = validate_text(FieldKey::PassportNumber, "AB 1234567").expect_err("should fail");
        assert_eq!(
            err.message,
            "Passport number must contain only letters and numbers."
        );
    }

    #[test]
    fn address_lines_accept_digits_and_edge_punctuation() {
        for line in ["12, Harbour Road", "Flat 3/2 (rear)", "O'Connell Street"] {
            assert!(validate_text(FieldKey::HomeAddress1, line).is_ok());
        }
        for bad in ["Flat @3", "Unit_4"] {
            let err = validate_text(FieldKey::HomeAddress1, bad).expect_err("should fail");
            assert_eq!(
                err.message,
                "Home address must contain only letters, numbers, spaces and punctuation."
            );
        }
    }

    #[test]
    fn each_offending_address_line_reports_independently() {
        let err2 = validate_text(FieldKey::HomeAddress2, "block_b").expect_err("should fail");
        let err3 = validate_text(FieldKey::HomeAddress3, "east@side").expect_err("should fail");
        assert_eq!(err2.key, FieldKey::HomeAddress2);
        assert_eq!(err3.key, FieldKey::HomeAddress3);
        assert_eq!(err2.message, err3.message);
    }

    #[test]
    fn town_names_disallow_digits_but_home_address_lines_allow_them() {
        assert!(validate_text(FieldKey::HomeAddress1, "221B Baker Street").is_ok());
        let err = validate_text(FieldKey::TownOrCity, "District 9").expect_err("should fail");
        assert_eq!(
            err.message,
            "Town name must contain only letters, spaces and punctuation."
        );
    }

    #[test]
    fn optional_fields_skip_emptiness_but_not_the_character_rule() {
        assert_eq!(validate_text(FieldKey::Postcode, ""), Ok(String::new()));
        let err = validate_text(FieldKey::Postcode, "AB1-2CD").expect_err("should fail");
        assert_eq!(
            err.message,
            "Postcode must contain only letters, numbers and spaces."
        );
    }

    #[test]
    fn email_must_be_local_at_domain_shaped() {
        for good in ["name@example.com", "first.last@clinic-one.org.uk"] {
            assert!(validate_text(FieldKey::UkEmail, good).is_ok());
        }
        for bad in ["name", "name@", "@example.com", "name@example", "name@example.c"] {
            let err = validate_text(FieldKey::UkEmail, bad).expect_err("should fail");
            assert_eq!(
                err.message,
                "Enter an email address in the correct format, like name@example.com."
            );
        }
    }

    #[test]
    fn collection_method_is_keyed_to_its_sample() {
        let err = validate_text(FieldKey::SampleCollectionMethod(SampleNumber::Two), "")
            .expect_err("should fail");
        assert_eq!(err.key.component_id(), "collection-method-sample-2");
        assert_eq!(err.message, "Select how the sputum sample was collected.");
    }
}
