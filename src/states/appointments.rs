//! Appointments Board State
//!
//! Admin overview of appointments: today/upcoming/past split, dashboard
//! counters and a bounded log of recent activity.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::constants::RECENT_ACTIVITY_CAPACITY;
use crate::domain::appointment::{
    Appointment, AppointmentId, AppointmentPartition, AppointmentStats, AppointmentStatus,
};
use crate::helpers::BoundedDeque;
use crate::services::{AppointmentStore, ServiceEvent};
use crate::states::UIEvent;
use crate::states::store::Context;

/// A line in the recent-activity log
#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub at: DateTime<Utc>,
    pub message: Arc<str>,
    pub is_error: bool,
}

#[derive(Clone, Debug)]
pub struct AppointmentsBoard {
    store: AppointmentStore,
    today: NaiveDate,
    status_filter: Option<AppointmentStatus>,
    activity: BoundedDeque<Activity>,
    loading: bool,
}

impl AppointmentsBoard {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            store: AppointmentStore::default(),
            today,
            status_filter: None,
            activity: BoundedDeque::new(RECENT_ACTIVITY_CAPACITY),
            loading: false,
        }
    }

    // ==================== Getters ====================

    pub fn all(&self) -> &[Appointment] {
        self.store.all()
    }

    pub fn get(&self, id: &AppointmentId) -> Option<&Appointment> {
        self.store.get(id)
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn status_filter(&self) -> Option<AppointmentStatus> {
        self.status_filter
    }

    /// Appointments passing the status filter, ordered by date and time
    pub fn visible(&self) -> Vec<&Appointment> {
        let mut list: Vec<&Appointment> = self
            .store
            .all()
            .iter()
            .filter(|a| self.status_filter.is_none_or(|s| a.status == s))
            .collect();
        list.sort_by_key(|a| (a.date, a.time));
        list
    }

    pub fn partition(&self) -> AppointmentPartition {
        self.store.partition(self.today)
    }

    pub fn stats(&self) -> AppointmentStats {
        self.store.stats(self.today)
    }

    /// Newest first
    pub fn recent_activity(&self) -> impl Iterator<Item = &Activity> {
        self.activity.iter_rev()
    }

    // ==================== Mutations ====================

    pub fn set_today(&mut self, today: NaiveDate, cx: &mut Context) {
        self.today = today;
        cx.notify();
    }

    pub fn set_status_filter(&mut self, status: Option<AppointmentStatus>, cx: &mut Context) {
        self.status_filter = status;
        cx.notify();
    }

    pub fn set_loading(&mut self, loading: bool, cx: &mut Context) {
        self.loading = loading;
        cx.notify();
    }

    fn log(&mut self, message: String, is_error: bool) {
        self.activity.push(Activity {
            at: Utc::now(),
            message: message.into(),
            is_error,
        });
    }

    /// Apply a service event; unrelated events are ignored
    pub fn apply_event(&mut self, event: &ServiceEvent, cx: &mut Context) {
        match event {
            ServiceEvent::AppointmentsLoaded(list) => {
                self.store = AppointmentStore::new(list.clone());
                self.loading = false;
            }
            ServiceEvent::AppointmentCreated(apt) => {
                self.store.upsert(apt.clone());
                self.log(
                    format!("{} booked {} {} with {}", apt.patient_name, apt.date, apt.time, apt.doctor_name),
                    false,
                );
            }
            ServiceEvent::AppointmentUpdated(apt) => {
                self.store.upsert(apt.clone());
                self.log(format!("{} is now {:?}", apt.id, apt.status), false);
                cx.emit(UIEvent::info("toast-status-updated"));
            }
            ServiceEvent::RequestFailed { operation, message } => {
                self.loading = false;
                self.log(format!("{operation} failed: {message}"), true);
            }
            _ => return,
        }
        cx.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::DoctorDirectory;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 20).expect("date")
    }

    fn loaded() -> (AppointmentsBoard, Context) {
        let directory = DoctorDirectory::seeded().expect("doctors");
        let store = AppointmentStore::seeded(today(), &directory).expect("appointments");
        let mut board = AppointmentsBoard::new(today());
        let mut cx = Context::default();
        board.apply_event(&ServiceEvent::AppointmentsLoaded(store.all().to_vec()), &mut cx);
        (board, cx)
    }

    #[test]
    fn test_partition_and_stats() {
        let (board, _) = loaded();
        let partition = board.partition();
        assert_eq!(partition.today.len(), 3);
        assert_eq!(partition.past.len(), 1);
        assert!(partition.upcoming.is_empty());
        assert_eq!(board.stats().total, 4);
    }

    #[test]
    fn test_update_event_replaces_and_logs() {
        let (mut board, mut cx) = loaded();
        let mut apt = board
            .get(&AppointmentId::from("APT-002"))
            .cloned()
            .expect("APT-002");
        apt.status = AppointmentStatus::Cancelled;

        board.apply_event(&ServiceEvent::AppointmentUpdated(apt), &mut cx);
        assert_eq!(board.all().len(), 4);
        assert_eq!(board.stats().cancelled, 1);
        assert_eq!(board.recent_activity().count(), 1);

        board.set_status_filter(Some(AppointmentStatus::Cancelled), &mut cx);
        assert_eq!(board.visible().len(), 1);
    }

    #[test]
    fn test_failures_are_logged() {
        let (mut board, mut cx) = loaded();
        board.apply_event(
            &ServiceEvent::RequestFailed {
                operation: "update_appointment_status",
                message: "timeout".into(),
            },
            &mut cx,
        );
        let last = board.recent_activity().next().expect("activity");
        assert!(last.is_error);
        assert!(last.message.contains("timeout"));
    }
}
