use crate::consts::DEFAULT_COUNTRY_CODE;
use crate::error::AppError;

use serde::Serialize;
use std::fmt;

/// Longest digit run E.164 allows after the `+`.
const MAX_E164_DIGITS: usize = 15;

/// A phone number in E.164 form: `+` followed by 1 to 15 digits, country code first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedPhoneNumber(String);

impl NormalizedPhoneNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a free-form phone string into E.164.
///
/// Numbers with an explicit `+` are kept as dialled. Without one, ten digits are read as a
/// North American number and get `+1`, and 11 to 15 digits are assumed to already start with a
/// country code. The 11-15 digit case is a heuristic; a local number from a country with long
/// national numbers will be mis-read as carrying a country code.
pub fn normalize(input: &str) -> Result<NormalizedPhoneNumber, AppError> {
    let invalid = || AppError::InvalidPhoneNumber(input.to_string());

    let has_plus = input.trim_start().starts_with('+');
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();

    let canonical = if has_plus {
        if digits.is_empty() || digits.len() > MAX_E164_DIGITS {
            return Err(invalid());
        }
        format!("+{digits}")
    } else {
        match digits.len() {
            10 => format!("+{DEFAULT_COUNTRY_CODE}{digits}"),
            11..=MAX_E164_DIGITS => format!("+{digits}"),
            _ => return Err(invalid()),
        }
    };

    Ok(NormalizedPhoneNumber(canonical))
}
