//! Service Events
//!
//! Domain events emitted by the service layer to be consumed by the state layer.
//! These events represent backend results: loaded lists, created or changed
//! records, and failed requests.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::appointment::Appointment;
use crate::domain::doctor::{Doctor, DoctorId};
use crate::domain::schedule::ScheduleConfig;
use crate::domain::slot::TimeSlot;

/// What happened to a doctor record
#[derive(Clone, Debug)]
pub enum DoctorChange {
    Upserted(Doctor),
    Removed(DoctorId),
}

/// Events emitted by the service layer
#[derive(Clone, Debug)]
pub enum ServiceEvent {
    // ==================== Doctors ====================
    /// Full doctor list fetched
    DoctorsLoaded(Vec<Doctor>),

    /// A doctor was created, updated or deleted
    DoctorChanged(DoctorChange),

    /// A doctor's weekly schedule or date exceptions were saved
    ScheduleSaved {
        doctor: DoctorId,
        schedule: ScheduleConfig,
    },

    // ==================== Slots ====================
    /// Slots for a doctor/date pair
    SlotsLoaded {
        doctor: DoctorId,
        date: NaiveDate,
        slots: Vec<TimeSlot>,
    },

    // ==================== Appointments ====================
    /// Full appointment list fetched
    AppointmentsLoaded(Vec<Appointment>),

    /// A booking went through
    AppointmentCreated(Appointment),

    /// An appointment changed status
    AppointmentUpdated(Appointment),

    // ==================== Failures ====================
    /// A backend call failed or timed out
    RequestFailed {
        /// Operation name (e.g., "create_appointment")
        operation: &'static str,
        /// Rendered error
        message: Arc<str>,
    },
}

impl ServiceEvent {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceEvent::DoctorsLoaded(_) => "doctors_loaded",
            ServiceEvent::DoctorChanged(_) => "doctor_changed",
            ServiceEvent::ScheduleSaved { .. } => "schedule_saved",
            ServiceEvent::SlotsLoaded { .. } => "slots_loaded",
            ServiceEvent::AppointmentsLoaded(_) => "appointments_loaded",
            ServiceEvent::AppointmentCreated(_) => "appointment_created",
            ServiceEvent::AppointmentUpdated(_) => "appointment_updated",
            ServiceEvent::RequestFailed { .. } => "request_failed",
        }
    }
}
