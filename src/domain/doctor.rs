//! Doctor - Directory Entry and Working Hours

use std::collections::BTreeMap;

use chrono::Weekday;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::slot::SlotTime;

/// Unique identifier for a doctor
#[derive(
    Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct DoctorId(pub u32);

impl DoctorId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for DoctorId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DoctorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current availability status shown in the directory
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DoctorStatus {
    #[default]
    Available,
    Busy,
    Offline,
}

/// Start/end of a working day
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DayHours {
    pub start: SlotTime,
    pub end: SlotTime,
}

impl DayHours {
    pub fn new(start: SlotTime, end: SlotTime) -> Self {
        Self { start, end }
    }

    /// Length of the working day in minutes (zero if inverted)
    pub fn minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    /// Whether `time` falls in `[start, end)`
    pub fn contains(&self, time: SlotTime) -> bool {
        self.start <= time && time < self.end
    }
}

/// Day of week key used in working-hours maps
#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for Day {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }
}

/// A doctor as listed in the clinic directory
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub specialty: String,
    pub experience: String,
    pub rating: f32,
    pub reviews: u32,
    /// Consultation price in tenge
    pub price: u32,
    #[serde(default)]
    pub status: DoctorStatus,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub working_hours: BTreeMap<Day, DayHours>,
}

impl Doctor {
    /// Working hours for a given weekday, if the doctor works that day
    pub fn hours_on(&self, day: Weekday) -> Option<&DayHours> {
        self.working_hours.get(&Day::from(day))
    }

    /// Rendered price, e.g. "12 000 ₸"
    pub fn price_label(&self) -> String {
        price_label(self.price)
    }

    /// Shortened display name
    pub fn short_name(&self) -> String {
        short_name(&self.name)
    }
}

/// Fields an administrator supplies when creating or editing a doctor
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDraft {
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub status: DoctorStatus,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub working_hours: BTreeMap<Day, DayHours>,
}

impl DoctorDraft {
    /// Build a doctor record with the given id; rating/reviews start empty
    pub fn into_doctor(self, id: DoctorId) -> Doctor {
        Doctor {
            id,
            name: self.name,
            specialty: self.specialty,
            experience: self.experience,
            rating: 0.0,
            reviews: 0,
            price: self.price,
            status: self.status,
            email: self.email,
            phone: self.phone,
            bio: self.bio,
            education: self.education,
            languages: self.languages,
            working_hours: self.working_hours,
        }
    }

    /// Overwrite the editable fields of an existing doctor
    pub fn apply_to(self, doctor: &mut Doctor) {
        doctor.name = self.name;
        doctor.specialty = self.specialty;
        doctor.experience = self.experience;
        doctor.price = self.price;
        doctor.status = self.status;
        doctor.email = self.email;
        doctor.phone = self.phone;
        doctor.bio = self.bio;
        doctor.education = self.education;
        doctor.languages = self.languages;
        doctor.working_hours = self.working_hours;
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.name.trim().is_empty() {
            return Err(crate::error::Error::invalid("doctor name is required"));
        }
        if self.specialty.trim().is_empty() {
            return Err(crate::error::Error::invalid("doctor specialty is required"));
        }
        Ok(())
    }
}

/// Format a tenge amount with thin grouping: 12000 -> "12 000 ₸"
pub fn price_label(price: u32) -> String {
    let digits = price.to_string();
    let mut grouped = String::with_capacity(digits.len() + 4);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    format!("{grouped} ₸")
}

/// "Surname Name Patronymic" -> "Surname N.P."
pub fn short_name(full_name: &str) -> String {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    let initial = |s: &str| s.chars().next().map(|c| format!("{c}.")).unwrap_or_default();

    match parts.as_slice() {
        [] => full_name.trim().to_string(),
        [only] => only.to_string(),
        [surname, name] => format!("{surname} {}", initial(name)),
        [surname, name, patronymic, ..] => {
            format!("{surname} {}{}", initial(name), initial(patronymic))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_label_grouping() {
        assert_eq!(price_label(12000), "12 000 ₸");
        assert_eq!(price_label(800), "800 ₸");
        assert_eq!(price_label(1_500_000), "1 500 000 ₸");
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("Zhanibekova Aigul Serikbaevna"), "Zhanibekova A.S.");
        assert_eq!(short_name("Kassymova Dinara"), "Kassymova D.");
        assert_eq!(short_name("Madonna"), "Madonna");
    }

    #[test]
    fn test_draft_validation() {
        let draft = DoctorDraft {
            name: "  ".into(),
            specialty: "Pediatrician".into(),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }
}
