use chrono::{NaiveDate, NaiveDateTime};
use email_address::EmailAddress;
use url::Url;

use crate::types::{FieldDefinition, FieldType, split_selections};

/// Rejection reason for a missing or empty required field. Checked before
/// any type-specific validation.
pub const REASON_REQUIRED: &str = "required";

/// Fixed wire format for `Date` fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// `DateTime` accepts the date format optionally followed by one of these.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Checks one submitted value against one field definition.
///
/// `None` means the key was absent from the submission. Returns `Ok(())` on
/// acceptance, `Err(reason)` on rejection. Stateless; the raw value is never
/// mutated; trimming here only decides emptiness and option membership.
pub fn check_value(definition: &FieldDefinition, submitted: Option<&str>) -> Result<(), &'static str> {
    let raw = submitted.unwrap_or("");
    if raw.trim().is_empty() {
        return if definition.is_required {
            Err(REASON_REQUIRED)
        } else {
            Ok(())
        };
    }

    match definition.field_type {
        FieldType::Text | FieldType::LongText | FieldType::PhoneNumber => Ok(()),
        FieldType::Email => check(is_valid_email(raw), "invalid email"),
        FieldType::Url => check(is_valid_url(raw), "invalid url"),
        FieldType::Integer => check(raw.trim().parse::<i64>().is_ok(), "invalid integer"),
        FieldType::Decimal | FieldType::YearOfBirth => {
            check(raw.trim().parse::<f64>().is_ok(), "invalid number")
        }
        FieldType::Boolean => check(is_valid_boolean(raw), "invalid boolean"),
        FieldType::Date => check(is_valid_date(raw), "invalid date"),
        FieldType::DateTime => check(is_valid_date_time(raw), "invalid date time"),
        FieldType::Dropdown => {
            let candidate = raw.trim();
            check(
                definition.options().iter().any(|option| *option == candidate),
                "invalid option",
            )
        }
        FieldType::MultipleChoice => {
            let options = definition.options();
            let selections = split_selections(raw);
            if selections.is_empty() {
                // A delimiter-only payload carries no selection.
                return if definition.is_required {
                    Err(REASON_REQUIRED)
                } else {
                    Ok(())
                };
            }
            check(
                selections.iter().all(|selection| options.contains(selection)),
                "invalid option",
            )
        }
    }
}

fn check(accepted: bool, reason: &'static str) -> Result<(), &'static str> {
    if accepted { Ok(()) } else { Err(reason) }
}

/// Returns `true` if the provided string is a syntactically valid email address.
pub fn is_valid_email(value: &str) -> bool {
    EmailAddress::is_valid(value.trim())
}

/// Returns `true` if the provided string parses as an absolute URL.
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value.trim()).is_ok()
}

/// Case-insensitive `"true"` / `"false"`.
pub fn is_valid_boolean(value: &str) -> bool {
    let candidate = value.trim();
    candidate.eq_ignore_ascii_case("true") || candidate.eq_ignore_ascii_case("false")
}

pub fn is_valid_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).is_ok()
}

/// A date, optionally followed by a time of day.
pub fn is_valid_date_time(value: &str) -> bool {
    let candidate = value.trim();
    DATETIME_FORMATS
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(candidate, format).is_ok())
        || is_valid_date(candidate)
}
