//! Appointment Store
//!
//! In-memory appointment list backing the mock backend. Slot availability is
//! derived from it, so a time booked through the wizard stops being offered.

use chrono::{NaiveDate, Utc};

use crate::assets::seed_appointments;
use crate::constants::APPOINTMENT_DURATION_MINUTES;
use crate::domain::appointment::{
    Appointment, AppointmentId, AppointmentPartition, AppointmentStats, AppointmentStatus,
    CreateAppointmentRequest,
};
use crate::domain::doctor::{Doctor, DoctorId};
use crate::domain::slot::SlotTime;
use crate::error::{Error, Result};
use crate::services::directory::DoctorDirectory;

#[derive(Clone, Debug, Default)]
pub struct AppointmentStore {
    appointments: Vec<Appointment>,
}

impl AppointmentStore {
    pub fn new(appointments: Vec<Appointment>) -> Self {
        Self { appointments }
    }

    /// Seed appointments relative to `today`, resolving doctors from `directory`
    pub fn seeded(today: NaiveDate, directory: &DoctorDirectory) -> Result<Self> {
        let appointments = seed_appointments()?
            .into_iter()
            .map(|seed| {
                let doctor = directory.get(seed.doctor_id);
                seed.into_appointment(today, doctor)
            })
            .collect();
        Ok(Self::new(appointments))
    }

    /// Next `APT-<n>` identifier, one past the highest numeric suffix in use
    fn next_id(&self) -> AppointmentId {
        let max = self
            .appointments
            .iter()
            .filter_map(|a| a.id.as_str().strip_prefix("APT-"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        AppointmentId::new(format!("APT-{:03}", max + 1))
    }

    // ==================== Queries ====================

    pub fn all(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    pub fn get(&self, id: &AppointmentId) -> Option<&Appointment> {
        self.appointments.iter().find(|a| &a.id == id)
    }

    /// Appointments for a doctor, optionally restricted to one date
    pub fn by_doctor(&self, doctor: DoctorId, date: Option<NaiveDate>) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.doctor_id == doctor && date.is_none_or(|d| a.date == d))
            .collect()
    }

    pub fn today(&self, today: NaiveDate) -> Vec<&Appointment> {
        self.appointments.iter().filter(|a| a.date == today).collect()
    }

    pub fn partition(&self, today: NaiveDate) -> AppointmentPartition {
        AppointmentPartition::split(&self.appointments, today)
    }

    pub fn stats(&self, today: NaiveDate) -> AppointmentStats {
        AppointmentStats::compute(&self.appointments, today)
    }

    /// Whether a non-cancelled appointment occupies the slot
    pub fn is_booked(&self, doctor: DoctorId, date: NaiveDate, time: SlotTime) -> bool {
        self.appointments
            .iter()
            .any(|a| a.doctor_id == doctor && a.date == date && a.time == time && a.holds_slot())
    }

    // ==================== Mutations ====================

    /// Store a new pending appointment for the request
    pub fn create(
        &mut self,
        request: CreateAppointmentRequest,
        doctor: Option<&Doctor>,
    ) -> Result<Appointment> {
        if self.is_booked(request.doctor_id, request.date, request.time) {
            return Err(Error::invalid(format!(
                "slot {} {} is already booked for doctor {}",
                request.date, request.time, request.doctor_id
            )));
        }

        let now = Utc::now();
        let patient_id = request
            .patient_id
            .unwrap_or_else(|| format!("PAT-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]));
        let appointment = Appointment {
            id: self.next_id(),
            patient_id,
            patient_name: request.patient_name,
            patient_phone: request.patient_phone,
            patient_email: request.patient_email,
            doctor_id: request.doctor_id,
            doctor_name: doctor.map(|d| d.name.clone()).unwrap_or_default(),
            doctor_specialty: doctor.map(|d| d.specialty.clone()).unwrap_or_default(),
            date: request.date,
            time: request.time,
            duration: APPOINTMENT_DURATION_MINUTES,
            status: AppointmentStatus::Pending,
            price: doctor.map(|d| d.price).unwrap_or_default(),
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        tracing::info!(
            appointment_id = %appointment.id,
            doctor_id = %appointment.doctor_id,
            date = %appointment.date,
            time = %appointment.time,
            "Appointment created"
        );
        self.appointments.push(appointment.clone());
        Ok(appointment)
    }

    /// Insert or replace by id (used when mirroring backend results)
    pub fn upsert(&mut self, appointment: Appointment) {
        match self.appointments.iter_mut().find(|a| a.id == appointment.id) {
            Some(existing) => *existing = appointment,
            None => self.appointments.push(appointment),
        }
    }

    /// Move an appointment to `status`; terminal appointments are frozen
    pub fn set_status(&mut self, id: &AppointmentId, status: AppointmentStatus) -> Result<Appointment> {
        let appointment = self
            .appointments
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| Error::not_found("appointment", id))?;

        if appointment.status.is_terminal() && appointment.status != status {
            return Err(Error::invalid(format!(
                "appointment {id} is {:?} and cannot become {status:?}",
                appointment.status
            )));
        }

        appointment.status = status;
        appointment.updated_at = Utc::now();
        tracing::info!(appointment_id = %id, status = ?status, "Appointment status changed");
        Ok(appointment.clone())
    }

    pub fn confirm(&mut self, id: &AppointmentId) -> Result<Appointment> {
        self.set_status(id, AppointmentStatus::Confirmed)
    }

    pub fn cancel(&mut self, id: &AppointmentId) -> Result<Appointment> {
        self.set_status(id, AppointmentStatus::Cancelled)
    }

    pub fn complete(&mut self, id: &AppointmentId) -> Result<Appointment> {
        self.set_status(id, AppointmentStatus::Completed)
    }

    pub fn mark_no_show(&mut self, id: &AppointmentId) -> Result<Appointment> {
        self.set_status(id, AppointmentStatus::NoShow)
    }

    pub fn delete(&mut self, id: &AppointmentId) -> Result<()> {
        let before = self.appointments.len();
        self.appointments.retain(|a| &a.id != id);
        if self.appointments.len() == before {
            return Err(Error::not_found("appointment", id));
        }
        tracing::info!(appointment_id = %id, "Appointment deleted");
        Ok(())
    }
}
