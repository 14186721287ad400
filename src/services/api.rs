//! Clinic API
//!
//! Request/response contract between the booking flow and a backend. The
//! state layer only talks to [`ClinicApi`]; [`MockApi`](super::MockApi) and
//! [`HttpApi`](super::HttpApi) are the two implementations.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::appointment::{
    Appointment, AppointmentId, AppointmentStatus, CreateAppointmentRequest,
};
use crate::domain::doctor::{Doctor, DoctorDraft, DoctorId};
use crate::domain::schedule::ScheduleConfig;
use crate::domain::slot::TimeSlot;
use crate::error::Result;

#[async_trait]
pub trait ClinicApi: Send + Sync {
    // ==================== Doctors ====================

    async fn list_doctors(&self) -> Result<Vec<Doctor>>;

    async fn get_doctor(&self, id: DoctorId) -> Result<Doctor>;

    async fn create_doctor(&self, draft: DoctorDraft) -> Result<Doctor>;

    async fn update_doctor(&self, id: DoctorId, draft: DoctorDraft) -> Result<Doctor>;

    async fn delete_doctor(&self, id: DoctorId) -> Result<()>;

    // ==================== Schedules ====================

    /// Weekly schedule with date exceptions; `None` when none was saved
    async fn doctor_schedule(&self, id: DoctorId) -> Result<Option<ScheduleConfig>>;

    async fn save_doctor_schedule(
        &self,
        id: DoctorId,
        schedule: ScheduleConfig,
    ) -> Result<ScheduleConfig>;

    // ==================== Slots ====================

    /// Ordered slots for the doctor on `date`
    async fn time_slots(&self, doctor: DoctorId, date: NaiveDate) -> Result<Vec<TimeSlot>>;

    // ==================== Appointments ====================

    async fn list_appointments(&self) -> Result<Vec<Appointment>>;

    async fn create_appointment(&self, request: CreateAppointmentRequest) -> Result<Appointment>;

    async fn update_appointment_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment>;
}
