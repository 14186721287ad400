//! Doctors Controller
//!
//! Admin CRUD over the doctor directory and each doctor's schedule. Backend
//! results reach the [`DirectoryState`] through the service event channel.

use chrono::NaiveDate;

use crate::domain::doctor::{Doctor, DoctorDraft, DoctorId};
use crate::domain::schedule::{ScheduleConfig, SpecialDate};
use crate::error::Result;
use crate::services::ServiceHub;
use crate::states::{DirectoryState, Store, UIEvent};

/// Doctor directory controller
pub struct DoctorsController {
    hub: ServiceHub,
    directory: Store<DirectoryState>,
}

impl DoctorsController {
    pub fn new(hub: ServiceHub, directory: Store<DirectoryState>) -> Self {
        Self { hub, directory }
    }

    pub fn directory(&self) -> &Store<DirectoryState> {
        &self.directory
    }

    /// Reload the full list
    pub async fn load(&self) -> Result<()> {
        self.directory.update(|state, cx| state.set_loading(true, cx));
        let result = self.hub.fetch_doctors().await;
        if result.is_err() {
            self.directory.update(|state, cx| state.set_loading(false, cx));
        }
        result.map(|_| ())
    }

    pub async fn create(&self, draft: DoctorDraft) -> Result<Doctor> {
        self.validated(&draft)?;
        let doctor = self.hub.create_doctor(draft).await?;
        tracing::info!(doctor_id = %doctor.id, name = %doctor.name, "Doctor created");
        Ok(doctor)
    }

    pub async fn update(&self, id: DoctorId, draft: DoctorDraft) -> Result<Doctor> {
        self.validated(&draft)?;
        let doctor = self.hub.update_doctor(id, draft).await?;
        tracing::info!(doctor_id = %doctor.id, "Doctor updated");
        Ok(doctor)
    }

    pub async fn delete(&self, id: DoctorId) -> Result<()> {
        self.hub.delete_doctor(id).await?;
        tracing::info!(doctor_id = %id, "Doctor deleted");
        Ok(())
    }

    fn validated(&self, draft: &DoctorDraft) -> Result<()> {
        draft.validate().inspect_err(|e| {
            let message = e.to_string();
            self.directory
                .update(|_, cx| cx.emit(UIEvent::error("toast-doctor-invalid", message)));
        })
    }

    // ==================== Schedules ====================

    /// Current schedule, or the default week when none was saved yet
    pub async fn load_schedule(&self, id: DoctorId) -> Result<ScheduleConfig> {
        let schedule = self.hub.fetch_schedule(id).await?.unwrap_or_default();
        let cached = schedule.clone();
        self.directory
            .update(|state, cx| state.set_schedule(id, cached, cx));
        Ok(schedule)
    }

    pub async fn save_schedule(&self, id: DoctorId, schedule: ScheduleConfig) -> Result<ScheduleConfig> {
        schedule.validate().inspect_err(|e| {
            let message = e.to_string();
            self.directory
                .update(|_, cx| cx.emit(UIEvent::error("toast-schedule-invalid", message)));
        })?;
        let saved = self.hub.save_schedule(id, schedule).await?;
        tracing::info!(
            doctor_id = %id,
            blocked = saved.blocked_dates.len(),
            special = saved.special_dates.len(),
            "Schedule saved"
        );
        Ok(saved)
    }

    async fn edit_schedule(
        &self,
        id: DoctorId,
        edit: impl FnOnce(&mut ScheduleConfig),
    ) -> Result<ScheduleConfig> {
        let mut schedule = self.load_schedule(id).await?;
        edit(&mut schedule);
        self.save_schedule(id, schedule).await
    }

    /// Close a whole date for bookings
    pub async fn block_date(&self, id: DoctorId, date: NaiveDate) -> Result<ScheduleConfig> {
        self.edit_schedule(id, |s| {
            s.block_date(date);
        })
        .await
    }

    pub async fn unblock_date(&self, id: DoctorId, date: NaiveDate) -> Result<ScheduleConfig> {
        self.edit_schedule(id, |s| {
            s.unblock_date(date);
        })
        .await
    }

    /// Record an absence; replaces any other absence on the same date
    pub async fn add_special_date(&self, id: DoctorId, special: SpecialDate) -> Result<ScheduleConfig> {
        self.edit_schedule(id, |s| s.set_special_date(special)).await
    }

    pub async fn remove_special_date(&self, id: DoctorId, date: NaiveDate) -> Result<ScheduleConfig> {
        self.edit_schedule(id, |s| {
            s.remove_special_date(date);
        })
        .await
    }

    // ==================== View Filters ====================

    pub fn set_query(&self, query: &str) {
        self.directory.update(|state, cx| state.set_query(query, cx));
    }

    pub fn set_specialty(&self, specialty: &str) {
        self.directory
            .update(|state, cx| state.set_specialty(specialty, cx));
    }

    pub fn select(&self, id: Option<DoctorId>) {
        self.directory.update(|state, cx| state.select(id, cx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::AppConfig;
    use crate::domain::schedule::SpecialDateKind;
    use crate::helpers::today;
    use crate::services::ServiceEvent;
    use chrono::{Datelike, Days, Weekday};

    fn controller() -> DoctorsController {
        let hub = ServiceHub::from_config(&AppConfig::default()).expect("hub");
        DoctorsController::new(hub, Store::new(DirectoryState::default()))
    }

    /// Feed pending service events into the store, as the ingest loop does
    fn drain(ctl: &DoctorsController) {
        let batch: Vec<ServiceEvent> = ctl.hub.events().try_iter().collect();
        ctl.directory.update(|state, cx| {
            for event in &batch {
                state.apply_event(event, cx);
            }
        });
    }

    fn draft(name: &str, specialty: &str) -> DoctorDraft {
        DoctorDraft {
            name: name.to_string(),
            specialty: specialty.to_string(),
            price: 9000,
            ..DoctorDraft::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_create_update_delete() {
        let ctl = controller();
        ctl.load().await.expect("load");
        drain(&ctl);
        assert_eq!(ctl.directory().read(|s| s.len()), 5);
        assert!(!ctl.directory().read(|s| s.loading()));

        let created = ctl
            .create(draft("Aigerim Sadykova", "Dermatologist"))
            .await
            .expect("create");
        assert_eq!(created.id, DoctorId(6));

        let mut edit = draft("Aigerim Sadykova", "Dermatologist");
        edit.price = 11000;
        ctl.update(created.id, edit).await.expect("update");
        drain(&ctl);
        let price = ctl
            .directory()
            .read(|s| s.get(DoctorId(6)).map(|d| d.price));
        assert_eq!(price, Some(11000));

        ctl.delete(DoctorId(6)).await.expect("delete");
        drain(&ctl);
        assert_eq!(ctl.directory().read(|s| s.len()), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_draft_never_reaches_backend() {
        let ctl = controller();
        let toasts = ctl.directory().subscribe_events();

        assert!(ctl.create(draft("  ", "Therapist")).await.is_err());
        assert!(ctl.hub.events().try_recv().is_err());
        assert!(matches!(
            toasts.try_recv(),
            Ok(UIEvent::Toast { key: "toast-doctor-invalid", is_error: true, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_date_closes_slots() {
        let ctl = controller();
        let date = today().checked_add_days(Days::new(7)).expect("date");

        let schedule = ctl.load_schedule(DoctorId(3)).await.expect("schedule");
        assert_eq!(schedule, ScheduleConfig::default());

        let saved = ctl.block_date(DoctorId(3), date).await.expect("block");
        assert_eq!(saved.blocked_dates, vec![date]);
        drain(&ctl);
        let cached = ctl
            .directory()
            .read(|s| s.schedule(DoctorId(3)).map(|s| s.blocked_dates.clone()));
        assert_eq!(cached, Some(vec![date]));
        assert!(ctl.hub.fetch_slots(DoctorId(3), date).await.expect("slots").is_empty());

        ctl.unblock_date(DoctorId(3), date).await.expect("unblock");
        let reopened = ctl.hub.fetch_slots(DoctorId(3), date).await.expect("slots");
        // a weekend stays closed under the default week
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        assert_eq!(reopened.is_empty(), weekend);
    }

    #[tokio::test(start_paused = true)]
    async fn test_special_dates_replace_per_day() {
        let ctl = controller();
        let date = today().checked_add_days(Days::new(3)).expect("date");

        ctl.add_special_date(DoctorId(2), SpecialDate::full_day(date, SpecialDateKind::Conference))
            .await
            .expect("conference");
        let saved = ctl
            .add_special_date(DoctorId(2), SpecialDate::full_day(date, SpecialDateKind::SickLeave))
            .await
            .expect("sick leave");
        assert_eq!(saved.special_dates.len(), 1);
        assert_eq!(saved.special_dates[0].kind, SpecialDateKind::SickLeave);

        let cleared = ctl.remove_special_date(DoctorId(2), date).await.expect("remove");
        assert!(cleared.special_dates.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_schedule_never_reaches_backend() {
        let ctl = controller();
        let toasts = ctl.directory().subscribe_events();
        let schedule = ScheduleConfig {
            slot_duration: 25,
            ..Default::default()
        };
        assert!(ctl.save_schedule(DoctorId(1), schedule).await.is_err());
        assert!(ctl.hub.events().try_recv().is_err());
        assert!(matches!(
            toasts.try_recv(),
            Ok(UIEvent::Toast { key: "toast-schedule-invalid", is_error: true, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_unknown_doctor_reports_failure() {
        let ctl = controller();
        assert!(ctl.delete(DoctorId(99)).await.is_err());
        let failed = ctl
            .hub
            .events()
            .try_iter()
            .any(|e| matches!(e, ServiceEvent::RequestFailed { operation: "delete_doctor", .. }));
        assert!(failed);
    }
}
