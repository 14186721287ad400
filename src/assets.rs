//! Embedded seed data for Clinic Booking
//!
//! Uses rust-embed to bundle the initial doctor directory and appointment list
//! that the mock backend serves.

use chrono::{Days, NaiveDate, Utc};
use rust_embed::RustEmbed;
use serde::Deserialize;

use crate::constants::APPOINTMENT_DURATION_MINUTES;
use crate::domain::appointment::{Appointment, AppointmentId, AppointmentStatus};
use crate::domain::doctor::{Doctor, DoctorId};
use crate::domain::slot::SlotTime;
use crate::error::{Error, Result};

/// Embedded seed files from the assets directory
#[derive(RustEmbed)]
#[folder = "assets/seed"]
pub struct SeedAssets;

fn load_json<T: for<'de> Deserialize<'de>>(path: &str) -> Result<T> {
    let file = SeedAssets::get(path).ok_or_else(|| Error::not_found("seed asset", path))?;
    Ok(serde_json::from_slice(&file.data)?)
}

/// Seed appointment with a date relative to the day the data is loaded
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedAppointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_phone: String,
    #[serde(default)]
    pub patient_email: String,
    pub doctor_id: DoctorId,
    pub day_offset: i64,
    pub time: SlotTime,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SeedAppointment {
    /// Materialize against `today`, resolving doctor details when known
    pub fn into_appointment(self, today: NaiveDate, doctor: Option<&Doctor>) -> Appointment {
        let offset = Days::new(self.day_offset.unsigned_abs());
        let date = if self.day_offset >= 0 {
            today.checked_add_days(offset)
        } else {
            today.checked_sub_days(offset)
        }
        .unwrap_or(today);

        let now = Utc::now();
        Appointment {
            id: AppointmentId::new(self.id),
            patient_id: self.patient_id,
            patient_name: self.patient_name,
            patient_phone: self.patient_phone,
            patient_email: self.patient_email,
            doctor_id: self.doctor_id,
            doctor_name: doctor.map(|d| d.name.clone()).unwrap_or_default(),
            doctor_specialty: doctor.map(|d| d.specialty.clone()).unwrap_or_default(),
            date,
            time: self.time,
            duration: APPOINTMENT_DURATION_MINUTES,
            status: self.status,
            price: doctor.map(|d| d.price).unwrap_or_default(),
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Initial doctor directory
pub fn seed_doctors() -> Result<Vec<Doctor>> {
    load_json("doctors.json")
}

/// Initial appointment list
pub fn seed_appointments() -> Result<Vec<SeedAppointment>> {
    load_json("appointments.json")
}
