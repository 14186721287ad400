//! Service Hub
//!
//! Central entry point for backend calls. Wraps every [`ClinicApi`] request in
//! a timeout, logs failures and multiplexes results into a single
//! [`ServiceEvent`] channel for the state layer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use crossbeam_channel::{Receiver, Sender};

use crate::domain::appointment::{
    Appointment, AppointmentId, AppointmentStatus, CreateAppointmentRequest,
};
use crate::domain::config::{AppConfig, Backend};
use crate::domain::doctor::{Doctor, DoctorDraft, DoctorId};
use crate::domain::schedule::ScheduleConfig;
use crate::domain::slot::TimeSlot;
use crate::error::{Error, Result};
use crate::services::api::ClinicApi;
use crate::services::events::{DoctorChange, ServiceEvent};
use crate::services::http_api::HttpApi;
use crate::services::mock_api::MockApi;
use crate::services::verification::VerificationService;

/// Central hub for all backend services
#[derive(Clone)]
pub struct ServiceHub {
    api: Arc<dyn ClinicApi>,
    verification: Arc<VerificationService>,
    timeout: Duration,
    /// Event sender (for internal use)
    tx: Sender<ServiceEvent>,
    /// Event receiver (for state layer)
    rx: Receiver<ServiceEvent>,
}

impl ServiceHub {
    pub fn new(
        api: Arc<dyn ClinicApi>,
        verification: Arc<VerificationService>,
        timeout: Duration,
    ) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            api,
            verification,
            timeout,
            tx,
            rx,
        }
    }

    /// Build the backend selected in `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api: Arc<dyn ClinicApi> = match config.api.backend {
            Backend::Mock => Arc::new(MockApi::seeded(config)?),
            Backend::Http => Arc::new(HttpApi::new(&config.api)?),
        };
        tracing::info!(backend = ?config.api.backend, "Service hub ready");
        Ok(Self::new(
            api,
            Arc::new(VerificationService::with_log_sender(
                config.verification.clone(),
            )),
            config.api.request_timeout(),
        ))
    }

    /// Get the event receiver for the state layer
    ///
    /// Events from all calls are multiplexed into this single channel.
    pub fn events(&self) -> Receiver<ServiceEvent> {
        self.rx.clone()
    }

    pub fn verification(&self) -> &Arc<VerificationService> {
        &self.verification
    }

    fn publish(&self, event: ServiceEvent) {
        tracing::debug!(event = event.kind(), "Publishing service event");
        if self.tx.send(event).is_err() {
            tracing::warn!("Service event dropped, no receiver");
        }
    }

    /// Run `call` under the request timeout, reporting failures as events
    async fn request<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                message: format!("{operation} exceeded {}ms", self.timeout.as_millis()),
            }),
        };

        if let Err(e) = &result {
            tracing::error!(operation, error = %e, "Backend request failed");
            self.publish(ServiceEvent::RequestFailed {
                operation,
                message: e.to_string().into(),
            });
        }
        result
    }

    // ==================== Doctor Operations ====================

    pub async fn fetch_doctors(&self) -> Result<Vec<Doctor>> {
        let doctors = self.request("list_doctors", self.api.list_doctors()).await?;
        self.publish(ServiceEvent::DoctorsLoaded(doctors.clone()));
        Ok(doctors)
    }

    pub async fn fetch_doctor(&self, id: DoctorId) -> Result<Doctor> {
        self.request("get_doctor", self.api.get_doctor(id)).await
    }

    pub async fn create_doctor(&self, draft: DoctorDraft) -> Result<Doctor> {
        let doctor = self.request("create_doctor", self.api.create_doctor(draft)).await?;
        self.publish(ServiceEvent::DoctorChanged(DoctorChange::Upserted(doctor.clone())));
        Ok(doctor)
    }

    pub async fn update_doctor(&self, id: DoctorId, draft: DoctorDraft) -> Result<Doctor> {
        let doctor = self
            .request("update_doctor", self.api.update_doctor(id, draft))
            .await?;
        self.publish(ServiceEvent::DoctorChanged(DoctorChange::Upserted(doctor.clone())));
        Ok(doctor)
    }

    pub async fn delete_doctor(&self, id: DoctorId) -> Result<()> {
        self.request("delete_doctor", self.api.delete_doctor(id)).await?;
        self.publish(ServiceEvent::DoctorChanged(DoctorChange::Removed(id)));
        Ok(())
    }

    // ==================== Schedule Operations ====================

    pub async fn fetch_schedule(&self, id: DoctorId) -> Result<Option<ScheduleConfig>> {
        self.request("doctor_schedule", self.api.doctor_schedule(id)).await
    }

    pub async fn save_schedule(&self, id: DoctorId, schedule: ScheduleConfig) -> Result<ScheduleConfig> {
        let schedule = self
            .request("save_doctor_schedule", self.api.save_doctor_schedule(id, schedule))
            .await?;
        self.publish(ServiceEvent::ScheduleSaved {
            doctor: id,
            schedule: schedule.clone(),
        });
        Ok(schedule)
    }

    // ==================== Slot Operations ====================

    pub async fn fetch_slots(&self, doctor: DoctorId, date: NaiveDate) -> Result<Vec<TimeSlot>> {
        let slots = self
            .request("time_slots", self.api.time_slots(doctor, date))
            .await?;
        self.publish(ServiceEvent::SlotsLoaded {
            doctor,
            date,
            slots: slots.clone(),
        });
        Ok(slots)
    }

    // ==================== Appointment Operations ====================

    pub async fn fetch_appointments(&self) -> Result<Vec<Appointment>> {
        let appointments = self
            .request("list_appointments", self.api.list_appointments())
            .await?;
        self.publish(ServiceEvent::AppointmentsLoaded(appointments.clone()));
        Ok(appointments)
    }

    pub async fn create_appointment(&self, request: CreateAppointmentRequest) -> Result<Appointment> {
        let appointment = self
            .request("create_appointment", self.api.create_appointment(request))
            .await?;
        self.publish(ServiceEvent::AppointmentCreated(appointment.clone()));
        Ok(appointment)
    }

    pub async fn update_appointment_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let appointment = self
            .request(
                "update_appointment_status",
                self.api.update_appointment_status(id, status),
            )
            .await?;
        self.publish(ServiceEvent::AppointmentUpdated(appointment.clone()));
        Ok(appointment)
    }

    /// Load doctors and appointments concurrently
    pub async fn refresh(&self) -> Result<(Vec<Doctor>, Vec<Appointment>)> {
        futures::try_join!(self.fetch_doctors(), self.fetch_appointments())
    }
}

impl std::fmt::Debug for ServiceHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHub")
            .field("timeout", &self.timeout)
            .field("pending_events", &self.rx.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::VerificationConfig;
    use async_trait::async_trait;

    /// Backend that never answers
    struct StalledApi;

    #[async_trait]
    impl ClinicApi for StalledApi {
        async fn list_doctors(&self) -> Result<Vec<Doctor>> {
            futures::future::pending().await
        }
        async fn get_doctor(&self, _id: DoctorId) -> Result<Doctor> {
            futures::future::pending().await
        }
        async fn create_doctor(&self, _draft: DoctorDraft) -> Result<Doctor> {
            futures::future::pending().await
        }
        async fn update_doctor(&self, _id: DoctorId, _draft: DoctorDraft) -> Result<Doctor> {
            futures::future::pending().await
        }
        async fn delete_doctor(&self, _id: DoctorId) -> Result<()> {
            futures::future::pending().await
        }
        async fn doctor_schedule(&self, _id: DoctorId) -> Result<Option<ScheduleConfig>> {
            futures::future::pending().await
        }
        async fn save_doctor_schedule(
            &self,
            _id: DoctorId,
            _schedule: ScheduleConfig,
        ) -> Result<ScheduleConfig> {
            futures::future::pending().await
        }
        async fn time_slots(&self, _doctor: DoctorId, _date: NaiveDate) -> Result<Vec<TimeSlot>> {
            futures::future::pending().await
        }
        async fn list_appointments(&self) -> Result<Vec<Appointment>> {
            futures::future::pending().await
        }
        async fn create_appointment(&self, _request: CreateAppointmentRequest) -> Result<Appointment> {
            futures::future::pending().await
        }
        async fn update_appointment_status(
            &self,
            _id: &AppointmentId,
            _status: AppointmentStatus,
        ) -> Result<Appointment> {
            futures::future::pending().await
        }
    }

    fn verification() -> Arc<VerificationService> {
        Arc::new(VerificationService::with_log_sender(VerificationConfig::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_request_times_out() {
        let hub = ServiceHub::new(Arc::new(StalledApi), verification(), Duration::from_secs(10));
        let events = hub.events();

        let result = hub.fetch_doctors().await;
        assert!(matches!(result, Err(Error::Timeout { .. })));
        match events.try_recv() {
            Ok(ServiceEvent::RequestFailed { operation, .. }) => assert_eq!(operation, "list_doctors"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_refresh_publishes_events() {
        let hub = ServiceHub::from_config(&AppConfig::default()).expect("hub");
        let events = hub.events();

        let (doctors, appointments) = hub.refresh().await.expect("refresh");
        assert_eq!(doctors.len(), 5);
        assert_eq!(appointments.len(), 4);

        let kinds: Vec<_> = events.try_iter().map(|e| e.kind()).collect();
        assert!(kinds.contains(&"doctors_loaded"));
        assert!(kinds.contains(&"appointments_loaded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delete_reports_not_found() {
        let hub = ServiceHub::from_config(&AppConfig::default()).expect("hub");
        let events = hub.events();
        assert!(matches!(
            hub.delete_doctor(DoctorId(42)).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(events.try_recv(), Ok(ServiceEvent::RequestFailed { .. })));
    }
}
