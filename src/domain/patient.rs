//! Patient - Contact Details and Phone Number Rules
//!
//! Phone numbers follow the Kazakhstan mobile plan: `+7 7XX XXX-XX-XX`,
//! where `7XX` is the operator code (700-799).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Total digits in a full mobile number, including the country code
const PHONE_DIGITS: usize = 11;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl std::str::FromStr for Gender {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(crate::error::Error::invalid(format!("unknown gender: {other}"))),
        }
    }
}

/// Patient fields collected on the details step
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientInfo {
    pub first_name: String,
    pub last_name: String,
    /// Phone as typed (formatted for display)
    pub phone: String,
    pub gender: Gender,
    pub comment: String,
}

impl PatientInfo {
    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Whether the required fields are filled and the phone is well formed
    pub fn is_valid(&self) -> bool {
        !self.first_name.trim().is_empty()
            && !self.last_name.trim().is_empty()
            && is_valid_phone(&self.phone)
    }

    /// Comment as optional notes for the booking payload
    pub fn notes(&self) -> Option<String> {
        let comment = self.comment.trim();
        (!comment.is_empty()).then(|| comment.to_string())
    }
}

fn digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Reduce user input to the canonical 11-digit form (best effort, may be partial)
pub fn normalize_phone(input: &str) -> String {
    let mut value = digits(input);

    // Legacy trunk prefix 8 -> country code 7
    if value.starts_with('8') && value.len() <= PHONE_DIGITS {
        value.replace_range(0..1, "7");
    }

    value.truncate(PHONE_DIGITS);

    if !value.is_empty() && !value.starts_with('7') {
        value.insert(0, '7');
        value.truncate(PHONE_DIGITS);
    }

    value
}

/// Progressive display format: `+7 7XX XXX-XX-XX`
pub fn format_phone(input: &str) -> String {
    let value = normalize_phone(input);
    if value.is_empty() {
        return String::new();
    }

    let part = |from: usize, to: usize| &value[from.min(value.len())..to.min(value.len())];

    let mut formatted = format!("+{}", part(0, 1));
    if value.len() > 1 {
        formatted.push(' ');
        formatted.push_str(part(1, 4));
    }
    if value.len() > 4 {
        formatted.push(' ');
        formatted.push_str(part(4, 7));
    }
    if value.len() > 7 {
        formatted.push('-');
        formatted.push_str(part(7, 9));
    }
    if value.len() > 9 {
        formatted.push('-');
        formatted.push_str(part(9, 11));
    }
    formatted
}

/// 11 digits, country code 7, operator code 700-799
pub fn is_valid_phone(input: &str) -> bool {
    let value = digits(input);
    if value.len() != PHONE_DIGITS || !value.starts_with('7') {
        return false;
    }
    value[1..4]
        .parse::<u32>()
        .map(|code| (700..=799).contains(&code))
        .unwrap_or(false)
}

/// Submission format: `+` followed by the digits
pub fn e164(input: &str) -> String {
    format!("+{}", digits(input))
}
