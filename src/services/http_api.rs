//! HTTP Backend
//!
//! [`ClinicApi`] over a JSON REST API:
//!
//! ```text
//! GET    {base}/api/doctors
//! POST   {base}/api/doctors
//! GET    {base}/api/doctors/{id}
//! PUT    {base}/api/doctors/{id}
//! DELETE {base}/api/doctors/{id}
//! GET    {base}/api/doctors/{id}/schedule
//! PUT    {base}/api/doctors/{id}/schedule
//! GET    {base}/api/doctors/{id}/slots?date=YYYY-MM-DD
//! GET    {base}/api/appointments
//! POST   {base}/api/appointments
//! PATCH  {base}/api/appointments/{id}
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::domain::appointment::{
    Appointment, AppointmentId, AppointmentStatus, CreateAppointmentRequest, StatusUpdate,
};
use crate::domain::config::ApiConfig;
use crate::domain::doctor::{Doctor, DoctorDraft, DoctorId};
use crate::domain::schedule::ScheduleConfig;
use crate::domain::slot::TimeSlot;
use crate::error::{Error, Result};
use crate::services::api::ClinicApi;

#[derive(Clone, Debug)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Map 404 to `NotFound`, other non-2xx statuses to `Http`
    fn check(response: Response, entity: &'static str, id: impl ToString) -> Result<Response> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::not_found(entity, id));
        }
        Ok(response.error_for_status()?)
    }

    async fn json<T: DeserializeOwned>(
        response: Response,
        entity: &'static str,
        id: impl ToString,
    ) -> Result<T> {
        Ok(Self::check(response, entity, id)?.json().await?)
    }
}

#[async_trait]
impl ClinicApi for HttpApi {
    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        let response = self.client.get(self.url("doctors")).send().await?;
        Self::json(response, "doctors", "*").await
    }

    async fn get_doctor(&self, id: DoctorId) -> Result<Doctor> {
        let response = self.client.get(self.url(&format!("doctors/{id}"))).send().await?;
        Self::json(response, "doctor", id).await
    }

    async fn create_doctor(&self, draft: DoctorDraft) -> Result<Doctor> {
        let response = self
            .client
            .post(self.url("doctors"))
            .json(&draft)
            .send()
            .await?;
        Self::json(response, "doctors", "*").await
    }

    async fn update_doctor(&self, id: DoctorId, draft: DoctorDraft) -> Result<Doctor> {
        let response = self
            .client
            .put(self.url(&format!("doctors/{id}")))
            .json(&draft)
            .send()
            .await?;
        Self::json(response, "doctor", id).await
    }

    async fn delete_doctor(&self, id: DoctorId) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("doctors/{id}")))
            .send()
            .await?;
        Self::check(response, "doctor", id)?;
        Ok(())
    }

    async fn doctor_schedule(&self, id: DoctorId) -> Result<Option<ScheduleConfig>> {
        let response = self
            .client
            .get(self.url(&format!("doctors/{id}/schedule")))
            .send()
            .await?;
        Self::json(response, "doctor", id).await
    }

    async fn save_doctor_schedule(
        &self,
        id: DoctorId,
        schedule: ScheduleConfig,
    ) -> Result<ScheduleConfig> {
        let response = self
            .client
            .put(self.url(&format!("doctors/{id}/schedule")))
            .json(&schedule)
            .send()
            .await?;
        Self::json(response, "doctor", id).await
    }

    async fn time_slots(&self, doctor: DoctorId, date: NaiveDate) -> Result<Vec<TimeSlot>> {
        let response = self
            .client
            .get(self.url(&format!("doctors/{doctor}/slots")))
            .query(&[("date", date.format("%Y-%m-%d").to_string())])
            .send()
            .await?;
        Self::json(response, "doctor", doctor).await
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        let response = self.client.get(self.url("appointments")).send().await?;
        Self::json(response, "appointments", "*").await
    }

    async fn create_appointment(&self, request: CreateAppointmentRequest) -> Result<Appointment> {
        let response = self
            .client
            .post(self.url("appointments"))
            .json(&request)
            .send()
            .await?;
        Self::json(response, "doctor", request.doctor_id).await
    }

    async fn update_appointment_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let response = self
            .client
            .patch(self.url(&format!("appointments/{id}")))
            .json(&StatusUpdate { status })
            .send()
            .await?;
        Self::json(response, "appointment", id).await
    }
}
