//! Mock Backend
//!
//! In-memory [`ClinicApi`] seeded from the embedded JSON data, with a fixed
//! simulated round-trip on every call.

use std::time::Duration;

use ahash::AHashMap;
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};

use crate::domain::appointment::{
    Appointment, AppointmentId, AppointmentStatus, CreateAppointmentRequest,
};
use crate::domain::config::AppConfig;
use crate::domain::doctor::{Doctor, DoctorDraft, DoctorId};
use crate::domain::schedule::ScheduleConfig;
use crate::domain::slot::TimeSlot;
use crate::error::{Error, Result};
use crate::helpers::today;
use crate::services::api::ClinicApi;
use crate::services::appointments::AppointmentStore;
use crate::services::directory::DoctorDirectory;
use crate::services::slots::SlotGenerator;

pub struct MockApi {
    directory: RwLock<DoctorDirectory>,
    appointments: RwLock<AppointmentStore>,
    /// Doctors without an entry work the full slot window every day
    schedules: RwLock<AHashMap<DoctorId, ScheduleConfig>>,
    slots: Mutex<SlotGenerator>,
    latency: Duration,
    today: fn() -> NaiveDate,
}

impl MockApi {
    pub fn new(
        directory: DoctorDirectory,
        appointments: AppointmentStore,
        slots: SlotGenerator,
        latency: Duration,
    ) -> Self {
        Self {
            directory: RwLock::new(directory),
            appointments: RwLock::new(appointments),
            schedules: RwLock::new(AHashMap::new()),
            slots: Mutex::new(slots),
            latency,
            today,
        }
    }

    /// Backend seeded with the embedded doctors and appointments
    pub fn seeded(config: &AppConfig) -> Result<Self> {
        let directory = DoctorDirectory::seeded()?;
        let appointments = AppointmentStore::seeded(today(), &directory)?;
        tracing::info!(
            doctors = directory.len(),
            appointments = appointments.len(),
            "Mock backend seeded"
        );
        Ok(Self::new(
            directory,
            appointments,
            SlotGenerator::new(config.slots.clone()),
            config.api.latency(),
        ))
    }

    /// Override the calendar used for horizon checks
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn doctor(&self, id: DoctorId) -> Result<Doctor> {
        self.directory
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("doctor", id))
    }
}

#[async_trait]
impl ClinicApi for MockApi {
    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        self.round_trip().await;
        Ok(self.directory.read().to_vec())
    }

    async fn get_doctor(&self, id: DoctorId) -> Result<Doctor> {
        self.round_trip().await;
        self.doctor(id)
    }

    async fn create_doctor(&self, draft: DoctorDraft) -> Result<Doctor> {
        self.round_trip().await;
        self.directory.write().create(draft)
    }

    async fn update_doctor(&self, id: DoctorId, draft: DoctorDraft) -> Result<Doctor> {
        self.round_trip().await;
        self.directory.write().update(id, draft)
    }

    async fn delete_doctor(&self, id: DoctorId) -> Result<()> {
        self.round_trip().await;
        self.directory.write().delete(id)?;
        self.schedules.write().remove(&id);
        Ok(())
    }

    async fn doctor_schedule(&self, id: DoctorId) -> Result<Option<ScheduleConfig>> {
        self.round_trip().await;
        self.doctor(id)?;
        Ok(self.schedules.read().get(&id).cloned())
    }

    async fn save_doctor_schedule(
        &self,
        id: DoctorId,
        schedule: ScheduleConfig,
    ) -> Result<ScheduleConfig> {
        self.round_trip().await;
        self.doctor(id)?;
        schedule.validate()?;
        self.schedules.write().insert(id, schedule.clone());
        Ok(schedule)
    }

    async fn time_slots(&self, doctor: DoctorId, date: NaiveDate) -> Result<Vec<TimeSlot>> {
        self.round_trip().await;
        self.doctor(doctor)?;

        let schedules = self.schedules.read();
        let appointments = self.appointments.read();
        let slots = self.slots.lock().generate(
            date,
            (self.today)(),
            schedules.get(&doctor),
            |time| appointments.is_booked(doctor, date, time),
        );
        Ok(slots)
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        self.round_trip().await;
        Ok(self.appointments.read().all().to_vec())
    }

    async fn create_appointment(&self, request: CreateAppointmentRequest) -> Result<Appointment> {
        self.round_trip().await;
        let doctor = self.doctor(request.doctor_id)?;

        {
            let slots = self.slots.lock();
            if !slots.is_bookable_date(request.date, (self.today)()) {
                return Err(Error::invalid(format!(
                    "date {} is outside the booking window",
                    request.date
                )));
            }
            if !slots.window().contains(&request.time) {
                return Err(Error::invalid(format!(
                    "time {} is not a bookable slot",
                    request.time
                )));
            }
        }
        let closed = self
            .schedules
            .read()
            .get(&request.doctor_id)
            .is_some_and(|s| !s.is_open_at(request.date, request.time));
        if closed {
            return Err(Error::invalid(format!(
                "doctor does not receive patients on {} at {}",
                request.date, request.time
            )));
        }

        self.appointments.write().create(request, Some(&doctor))
    }

    async fn update_appointment_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        self.round_trip().await;
        self.appointments.write().set_status(id, status)
    }
}

impl std::fmt::Debug for MockApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockApi")
            .field("doctors", &self.directory.read().len())
            .field("appointments", &self.appointments.read().len())
            .field("schedules", &self.schedules.read().len())
            .field("latency", &self.latency)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::SlotConfig;
    use crate::domain::patient::Gender;
    use chrono::Days;

    fn api(ratio: f64) -> MockApi {
        let directory = DoctorDirectory::seeded().expect("doctors");
        let appointments = AppointmentStore::seeded(today(), &directory).expect("appointments");
        let slots = SlotGenerator::with_seed(
            SlotConfig {
                availability_ratio: ratio,
                ..Default::default()
            },
            11,
        );
        MockApi::new(directory, appointments, slots, Duration::from_millis(300))
    }

    fn tomorrow() -> NaiveDate {
        today().checked_add_days(Days::new(1)).expect("tomorrow")
    }

    fn request(time: &str, date: NaiveDate) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            patient_id: None,
            patient_name: "Ivan Petrov".into(),
            patient_phone: "+77771234567".into(),
            patient_email: String::new(),
            patient_gender: Gender::Male,
            doctor_id: DoctorId(3),
            date,
            time: time.parse().expect("time"),
            notes: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_booked_slot_becomes_unavailable() {
        let api = api(1.0);
        let slots = api.time_slots(DoctorId(3), tomorrow()).await.expect("slots");
        assert_eq!(slots.len(), 18);
        assert!(slots.iter().all(|s| s.available));

        api.create_appointment(request("10:30", tomorrow()))
            .await
            .expect("create");

        let slots = api.time_slots(DoctorId(3), tomorrow()).await.expect("slots");
        let booked = slots
            .iter()
            .find(|s| s.time.to_string() == "10:30")
            .expect("10:30 slot");
        assert!(!booked.available);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_doctor_is_not_found() {
        let api = api(0.7);
        assert!(matches!(
            api.time_slots(DoctorId(99), tomorrow()).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(api.get_doctor(DoctorId(99)).await, Err(Error::NotFound { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_rejects_past_date_and_off_grid_time() {
        let api = api(0.7);
        let yesterday = today().pred_opt().expect("yesterday");
        assert!(api.create_appointment(request("10:30", yesterday)).await.is_err());
        assert!(api.create_appointment(request("10:15", tomorrow())).await.is_err());
        assert!(api.create_appointment(request("18:00", tomorrow())).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_update_and_listing() {
        let api = api(0.7);
        let created = api
            .create_appointment(request("15:00", tomorrow()))
            .await
            .expect("create");
        let updated = api
            .update_appointment_status(&created.id, AppointmentStatus::Confirmed)
            .await
            .expect("confirm");
        assert_eq!(updated.status, AppointmentStatus::Confirmed);
        assert_eq!(api.list_appointments().await.expect("list").len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_date_has_no_slots() {
        let api = api(1.0);
        assert_eq!(api.doctor_schedule(DoctorId(3)).await.expect("schedule"), None);

        let mut schedule = ScheduleConfig::default();
        // open every day so only the exception decides
        for day in &mut schedule.work_days {
            day.enabled = true;
            day.work_hours = schedule_hours();
        }
        schedule.block_date(tomorrow());
        api.save_doctor_schedule(DoctorId(3), schedule.clone())
            .await
            .expect("save");
        assert_eq!(
            api.doctor_schedule(DoctorId(3)).await.expect("schedule"),
            Some(schedule)
        );

        assert!(api.time_slots(DoctorId(3), tomorrow()).await.expect("slots").is_empty());
        assert!(api.create_appointment(request("10:30", tomorrow())).await.is_err());
        // other doctors are unaffected
        assert_eq!(api.time_slots(DoctorId(1), tomorrow()).await.expect("slots").len(), 18);

        api.delete_doctor(DoctorId(3)).await.expect("delete");
        assert!(matches!(
            api.doctor_schedule(DoctorId(3)).await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_schedule_rejected() {
        let api = api(1.0);
        let schedule = ScheduleConfig {
            slot_duration: 20,
            ..Default::default()
        };
        assert!(matches!(
            api.save_doctor_schedule(DoctorId(3), schedule).await,
            Err(Error::Invalid { .. })
        ));
    }

    fn schedule_hours() -> Vec<crate::domain::doctor::DayHours> {
        vec![crate::domain::doctor::DayHours::new(
            "08:00".parse().expect("time"),
            "20:00".parse().expect("time"),
        )]
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let api = api(0.7);
        let started = tokio::time::Instant::now();
        api.list_doctors().await.expect("doctors");
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
